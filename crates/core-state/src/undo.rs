//! Snapshot-based linear history.
//!
//! Each entry deep-copies the layer registry (definitions plus active id), the
//! body and the selection. Pushing clears the redo stack, as does
//! `clear_redo` for edits that do not snapshot; the undo stack is
//! capped and drops its oldest entry when full. A push identical to the
//! current top is skipped, but still counts as a new edit for redo purposes.

use crate::Selection;
use core_layers::LayerRegistry;
use core_text::Body;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::trace;

/// Default number of entries retained per stack.
pub const UNDO_HISTORY_MAX: usize = 50;

/// Which operation captured the entry (diagnostics only; restore is uniform).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotKind {
    Retag,
    LayerChange,
    Paste,
    Cut,
    Format,
}

impl SnapshotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotKind::Retag => "retag",
            SnapshotKind::LayerChange => "layer_change",
            SnapshotKind::Paste => "paste",
            SnapshotKind::Cut => "cut",
            SnapshotKind::Format => "format",
        }
    }
}

#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub kind: SnapshotKind,
    pub layers: LayerRegistry,
    pub body: Body,
    pub selection: Selection,
    pub hash: u64,
}

pub struct UndoEngine {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_entries: usize,
    snapshots_skipped: u64,
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new(UNDO_HISTORY_MAX)
    }
}

impl UndoEngine {
    pub fn new(max_entries: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_entries: max_entries.max(1),
            snapshots_skipped: 0,
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
    pub fn snapshots_skipped(&self) -> u64 {
        self.snapshots_skipped
    }
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Forget undone entries without recording a snapshot.
    pub fn clear_redo(&mut self) {
        if !self.redo_stack.is_empty() {
            trace!(target: "state.undo", dropped = self.redo_stack.len(), "redo_cleared");
            self.redo_stack.clear();
        }
    }

    pub fn push_snapshot(
        &mut self,
        kind: SnapshotKind,
        layers: &LayerRegistry,
        body: &Body,
        selection: Selection,
    ) {
        self.redo_stack.clear();
        let current_hash = state_hash(layers, body);
        if let Some(last) = self.undo_stack.last()
            && last.hash == current_hash
        {
            self.snapshots_skipped += 1;
            trace!(target: "state.undo", kind = kind.as_str(), undo_depth = self.undo_stack.len(), hash = current_hash, "snapshot_dedupe_skip");
            return;
        }
        self.undo_stack.push(HistoryEntry {
            kind,
            layers: layers.clone(),
            body: body.clone(),
            selection,
            hash: current_hash,
        });
        trace!(target: "state.undo", kind = kind.as_str(), undo_depth = self.undo_stack.len(), runs = body.run_count(), hash = current_hash, "push_snapshot");
        if self.undo_stack.len() > self.max_entries {
            let _ = self.undo_stack.remove(0);
            trace!(target: "state.undo", "undo_stack_trimmed");
        }
    }

    pub fn undo(
        &mut self,
        layers: &mut LayerRegistry,
        body: &mut Body,
        selection: &mut Selection,
    ) -> bool {
        let Some(last) = self.undo_stack.pop() else {
            return false;
        };
        trace!(target: "state.undo", undo_depth = self.undo_stack.len(), redo_depth = self.redo_stack.len(), "undo_pop");
        let current = capture(last.kind, layers, body, *selection);
        push_capped(&mut self.redo_stack, current, self.max_entries);
        restore(last, layers, body, selection);
        true
    }

    pub fn redo(
        &mut self,
        layers: &mut LayerRegistry,
        body: &mut Body,
        selection: &mut Selection,
    ) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        trace!(target: "state.undo", redo_depth = self.redo_stack.len(), undo_depth = self.undo_stack.len(), "redo_pop");
        let current = capture(next.kind, layers, body, *selection);
        push_capped(&mut self.undo_stack, current, self.max_entries);
        restore(next, layers, body, selection);
        true
    }
}

fn capture(kind: SnapshotKind, layers: &LayerRegistry, body: &Body, selection: Selection) -> HistoryEntry {
    HistoryEntry {
        kind,
        layers: layers.clone(),
        body: body.clone(),
        selection,
        hash: state_hash(layers, body),
    }
}

fn restore(entry: HistoryEntry, layers: &mut LayerRegistry, body: &mut Body, selection: &mut Selection) {
    *layers = entry.layers;
    *body = entry.body;
    *selection = entry.selection;
}

fn push_capped(stack: &mut Vec<HistoryEntry>, entry: HistoryEntry, max: usize) {
    stack.push(entry);
    if stack.len() > max {
        let _ = stack.remove(0);
    }
}

fn state_hash(layers: &LayerRegistry, body: &Body) -> u64 {
    let mut h = DefaultHasher::new();
    layers.layers().hash(&mut h);
    layers.active_id().hash(&mut h);
    body.hash(&mut h);
    h.finish()
}
