//! Edit intents and the engine applying them to a `Session`.
//!
//! Every intent goes through `dispatcher::Dispatcher::dispatch`, which mutates
//! the body (two-phase: layer-unaware primitive first, then repair) and leaves
//! it normalized. Failures never surface as errors: invalid references are
//! no-ops, structural anomalies are absorbed by the normalizer and logged.

use core_layers::{LayerId, Rgb};
use core_state::{Selection, Session};
use core_text::{Alignment, ListKind, Marks};

pub mod context;
pub mod dispatcher;
pub mod format;

pub use context::{CursorContext, cursor_context};
pub use dispatcher::{DispatchResult, Dispatcher};
pub use format::{FormatPrimitive, LayerPreservingFormatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditKind {
    /// Text typed at the caret (replacing a non-empty selection).
    InsertText(String),
    Backspace,
    DeleteForward,
    Newline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionEvent {
    Start,
    /// Current in-progress composed string.
    Update(String),
    /// Final committed string.
    End(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatCommand {
    /// Toggle marks over the selection.
    Decoration(Marks),
    Align(Alignment),
    /// Toggle the lines touched by the selection into (or out of) a list.
    List(ListKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerCommand {
    Add,
    Delete(LayerId),
    ToggleVisibility(LayerId),
    SetColor(LayerId, Rgb),
    Rename(LayerId, String),
    CycleColorMode(LayerId),
    Activate(LayerId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Edit(EditKind),
    Composition(CompositionEvent),
    /// Plain-text paste at the caret, replacing the selection.
    Paste(String),
    Cut,
    SetSelection(Selection),
    /// Retag the selection to a layer.
    ApplyLayer(LayerId),
    Format(FormatCommand),
    Layer(LayerCommand),
    Undo,
    Redo,
}

impl Action {
    /// Short operation name for tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Edit(EditKind::InsertText(_)) => "insert_text",
            Action::Edit(EditKind::Backspace) => "backspace",
            Action::Edit(EditKind::DeleteForward) => "delete_forward",
            Action::Edit(EditKind::Newline) => "newline",
            Action::Composition(CompositionEvent::Start) => "composition_start",
            Action::Composition(CompositionEvent::Update(_)) => "composition_update",
            Action::Composition(CompositionEvent::End(_)) => "composition_end",
            Action::Paste(_) => "paste",
            Action::Cut => "cut",
            Action::SetSelection(_) => "set_selection",
            Action::ApplyLayer(_) => "apply_layer",
            Action::Format(_) => "format",
            Action::Layer(_) => "layer",
            Action::Undo => "undo",
            Action::Redo => "redo",
        }
    }
}

/// Post-commit hook: persistence and statistics collaborators register here.
pub trait ActionObserver {
    fn on_action(&self, action: &Action, result: &DispatchResult, session: &Session);
}
