//! Document lifecycle around the single open session.

use crate::document::{StoredDocument, title_or_untitled};
use crate::store::DocumentStore;
use crate::{ModelError, now_millis};
use anyhow::{Context, Result};
use core_actions::{Action, DispatchResult, Dispatcher};
use core_layers::{LayerRegistry, RegistryOptions};
use core_state::{Session, UNDO_HISTORY_MAX};
use core_text::Body;
use tracing::{debug, info};

/// Settings applied to every document the workbench creates or opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbenchOptions {
    pub registry: RegistryOptions,
    /// Names of the three stock layers of a new document.
    pub default_names: [String; 3],
    pub history_limit: usize,
}

impl Default for WorkbenchOptions {
    fn default() -> Self {
        Self {
            registry: RegistryOptions::default(),
            default_names: ["Default".into(), "Dialogue".into(), "Description".into()],
            history_limit: UNDO_HISTORY_MAX,
        }
    }
}

struct OpenDocument {
    record: StoredDocument,
    session: Session,
}

pub struct Workbench<S: DocumentStore> {
    store: S,
    options: WorkbenchOptions,
    clock: fn() -> u64,
    open: Option<OpenDocument>,
}

impl<S: DocumentStore> Workbench<S> {
    pub fn new(store: S, options: WorkbenchOptions) -> Self {
        Self {
            store,
            options,
            clock: now_millis,
            open: None,
        }
    }

    /// Replace the timestamp source (epoch milliseconds).
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &WorkbenchOptions {
        &self.options
    }

    /// Create an empty document, persist it and make it the open one.
    pub fn create(&mut self, title: &str) -> Result<String> {
        self.flush()?;
        let now = (self.clock)();
        let id = self.unique_id(now)?;
        let names = self.options.default_names.each_ref().map(String::as_str);
        let registry = LayerRegistry::with_defaults(names, self.options.registry.clone());
        let record = StoredDocument::new(id.clone(), title, &registry, now);
        self.store.save(&record)?;
        let session = Session::with_history_limit(registry, Body::default(), self.options.history_limit);
        info!(target: "model.workbench", id = %id, "document_created");
        self.open = Some(OpenDocument { record, session });
        Ok(id)
    }

    fn unique_id(&self, now: u64) -> Result<String> {
        let base = format!("memo-{now}");
        if self.store.load(&base)?.is_none() {
            return Ok(base);
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{base}-{n}");
            if self.store.load(&candidate)?.is_none() {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Open `id`, flushing the current document first. Opening the open document is a no-op.
    pub fn open(&mut self, id: &str) -> Result<()> {
        if self.open.as_ref().is_some_and(|o| o.record.id == id) {
            return Ok(());
        }
        self.flush()?;
        let record = self
            .store
            .load(id)?
            .ok_or_else(|| ModelError::NotFound(id.to_string()))?;
        let registry = record
            .registry(self.options.registry.clone())
            .with_context(|| format!("restoring layers of {id}"))?;
        let body = record.body().with_context(|| format!("parsing content of {id}"))?;
        let session = Session::open(registry, body, self.options.history_limit);
        info!(target: "model.workbench", id, runs = session.body().run_count(), "document_opened");
        self.open = Some(OpenDocument { record, session });
        Ok(())
    }

    pub fn current(&self) -> Option<&StoredDocument> {
        self.open.as_ref().map(|o| &o.record)
    }

    pub fn session(&self) -> Option<&Session> {
        self.open.as_ref().map(|o| &o.session)
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.open.as_mut().map(|o| &mut o.session)
    }

    fn open_mut(&mut self) -> Result<&mut OpenDocument, ModelError> {
        self.open.as_mut().ok_or(ModelError::NoOpenDocument)
    }

    /// Route an action to the open session.
    pub fn apply(&mut self, dispatcher: &Dispatcher, action: Action) -> Result<DispatchResult> {
        let open = self.open_mut()?;
        Ok(dispatcher.dispatch(action, &mut open.session))
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        let open = self.open_mut()?;
        open.record.title = title_or_untitled(title).to_string();
        open.session.dirty = true;
        Ok(())
    }

    pub fn set_category(&mut self, category: Option<String>) -> Result<()> {
        let open = self.open_mut()?;
        open.record.category = category;
        open.session.dirty = true;
        Ok(())
    }

    /// Persist the open document if it has unsaved changes. Returns whether it wrote.
    pub fn flush(&mut self) -> Result<bool> {
        let dirty = self.open.as_ref().is_some_and(|o| o.session.dirty);
        if !dirty {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Persist the open document unconditionally.
    pub fn save(&mut self) -> Result<()> {
        let now = (self.clock)();
        let Some(open) = self.open.as_mut() else {
            return Err(ModelError::NoOpenDocument.into());
        };
        open.record.capture(&open.session, now);
        self.store.save(&open.record)?;
        open.session.dirty = false;
        debug!(target: "model.workbench", id = %open.record.id, updated_at = open.record.updated_at, "document_flushed");
        Ok(())
    }

    /// Flush and close the open document.
    pub fn close(&mut self) -> Result<()> {
        self.flush()?;
        self.open = None;
        Ok(())
    }

    /// Delete `id`. Deleting the open document discards its session without saving.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        if self.open.as_ref().is_some_and(|o| o.record.id == id) {
            self.open = None;
        }
        let removed = self.store.delete(id)?;
        if removed {
            info!(target: "model.workbench", id, "document_deleted");
        }
        Ok(removed)
    }

    /// Every stored document, most recently updated first.
    pub fn list(&self) -> Result<Vec<StoredDocument>> {
        let mut all = self.store.list()?;
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }
}
