//! Persistence collaborator seam and its two implementations.

use crate::document::StoredDocument;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub trait DocumentStore {
    /// Insert or replace by id.
    fn save(&mut self, document: &StoredDocument) -> Result<()>;
    fn load(&self, id: &str) -> Result<Option<StoredDocument>>;
    /// Every stored document, in storage order.
    fn list(&self) -> Result<Vec<StoredDocument>>;
    /// Returns whether a document was removed.
    fn delete(&mut self, id: &str) -> Result<bool>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    documents: Vec<StoredDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn save(&mut self, document: &StoredDocument) -> Result<()> {
        upsert(&mut self.documents, document);
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<StoredDocument>> {
        Ok(self.documents.iter().find(|d| d.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<StoredDocument>> {
        Ok(self.documents.clone())
    }

    fn delete(&mut self, id: &str) -> Result<bool> {
        let before = self.documents.len();
        self.documents.retain(|d| d.id != id);
        Ok(self.documents.len() != before)
    }
}

fn upsert(documents: &mut Vec<StoredDocument>, document: &StoredDocument) {
    match documents.iter_mut().find(|d| d.id == document.id) {
        Some(slot) => *slot = document.clone(),
        None => documents.push(document.clone()),
    }
}

/// One JSON array per user scope: `<dir>/memos-<scope>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>, scope: &str) -> Self {
        let scope: String = scope
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let scope = if scope.is_empty() { "default".to_string() } else { scope };
        Self {
            path: dir.as_ref().join(format!("memos-{scope}.json")),
        }
    }

    /// Platform data directory (`<data_dir>/layerpad`), falling back to the working directory.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("layerpad"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Vec<StoredDocument>> {
        if !self.path.exists() {
            debug!(target: "model.store", path = %self.path.display(), "store_file_missing");
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", self.path.display()))
    }

    fn write_all(&self, documents: &[StoredDocument]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(documents).context("encoding documents")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn save(&mut self, document: &StoredDocument) -> Result<()> {
        let mut all = self.read_all()?;
        upsert(&mut all, document);
        self.write_all(&all)?;
        info!(target: "model.store", id = %document.id, total = all.len(), "document_saved");
        Ok(())
    }

    fn load(&self, id: &str) -> Result<Option<StoredDocument>> {
        Ok(self.read_all()?.into_iter().find(|d| d.id == id))
    }

    fn list(&self) -> Result<Vec<StoredDocument>> {
        self.read_all()
    }

    fn delete(&mut self, id: &str) -> Result<bool> {
        let mut all = self.read_all()?;
        let before = all.len();
        all.retain(|d| d.id != id);
        if all.len() == before {
            debug!(target: "model.store", id, "delete_unknown_document");
            return Ok(false);
        }
        self.write_all(&all)?;
        info!(target: "model.store", id, total = all.len(), "document_deleted");
        Ok(true)
    }
}
