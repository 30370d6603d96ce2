//! Dispatcher applying `Action` to a `Session`.
//!
//! Decomposed into focused sub-modules:
//! * `edit`     - typing, deletion, newline
//! * `compose`  - composed (IME) input window and commit
//! * `clipboard`- paste and cut
//! * `retag`    - layer reassignment of the selection
//! * `format`   - decoration and block formatting through a `FormatPrimitive`
//! * `layer`    - layer registry commands
//! * `undo`     - undo / redo
//!
//! Every handler leaves the body normalized (except inside a composition
//! window, where normalization is withheld). Observers run after each
//! committed action that changed something. Any mutation other than undo/redo
//! invalidates the redo stack, including the edits that record no snapshot.

use crate::format::{FormatPrimitive, LayerPreservingFormatter};
use crate::{Action, ActionObserver};
use core_state::Session;
use tracing::{debug, trace};

mod clipboard;
mod compose;
mod edit;
mod format;
mod layer;
mod retag;
mod undo;

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    /// Something observable changed (body, layers, selection).
    pub dirty: bool,
    /// Block structure or layer set changed; derived projections must rebuild fully.
    pub structural: bool,
    /// Text produced for the clipboard collaborator (cut).
    pub clipboard: Option<String>,
}

impl DispatchResult {
    pub fn clean() -> Self {
        Self::default()
    }
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }
    pub fn structural() -> Self {
        Self {
            dirty: true,
            structural: true,
            clipboard: None,
        }
    }
    pub fn with_clipboard(mut self, text: String) -> Self {
        self.clipboard = Some(text);
        self
    }
}

pub struct Dispatcher {
    formatter: Box<dyn FormatPrimitive>,
    observers: Vec<Box<dyn ActionObserver>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_formatter(Box::new(LayerPreservingFormatter))
    }

    pub fn with_formatter(formatter: Box<dyn FormatPrimitive>) -> Self {
        Self {
            formatter,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn ActionObserver>) {
        self.observers.push(observer);
    }

    /// Apply an action. While a composition is open only composition events are accepted.
    pub fn dispatch(&self, action: Action, session: &mut Session) -> DispatchResult {
        if session.is_composing() && !matches!(action, Action::Composition(_)) {
            debug!(target: "actions.dispatch", op = action.name(), "rejected_during_composition");
            return DispatchResult::clean();
        }

        let result = match &action {
            Action::Edit(kind) => edit::handle_edit(kind, session),
            Action::Composition(event) => compose::handle_composition(event, session),
            Action::Paste(text) => clipboard::handle_paste(text, session),
            Action::Cut => clipboard::handle_cut(session),
            Action::SetSelection(sel) => {
                let before = session.selection();
                session.set_selection(*sel);
                if session.selection() != before {
                    DispatchResult::dirty()
                } else {
                    DispatchResult::clean()
                }
            }
            Action::ApplyLayer(layer) => retag::handle_apply_layer(layer, session),
            Action::Format(cmd) => format::handle_format(*cmd, self.formatter.as_ref(), session),
            Action::Layer(cmd) => layer::handle_layer(cmd, session),
            Action::Undo => undo::handle_undo(session),
            Action::Redo => undo::handle_redo(session),
        };

        if result.dirty {
            session.dirty = true;
            if invalidates_redo(&action) {
                session.clear_redo();
            }
            trace!(
                target: "actions.dispatch",
                op = action.name(),
                structural = result.structural,
                runs = session.body().run_count(),
                caret = session.selection().head,
                "committed"
            );
            for obs in &self.observers {
                obs.on_action(&action, &result, session);
            }
        }
        result
    }
}

/// Every committed change except selection moves and history navigation.
fn invalidates_redo(action: &Action) -> bool {
    !matches!(action, Action::SetSelection(_) | Action::Undo | Action::Redo)
}
