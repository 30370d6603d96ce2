//! Per-document editing session: layers, body, selection, composition and history.
//!
//! A `Session` is the explicit state object every edit operation receives; the
//! process keeps no global editor state. The session owns the body exclusively
//! while the document is open.
//!
//! Normalization:
//! - `normalize` runs the structural repair and refreshes statistics.
//! - While a composition is in progress normalization is withheld: intermediate
//!   composition states are not valid run structures.
//!
//! History:
//! - `push_snapshot` must be called *before* a snapshotting operation mutates,
//!   so undo restores the pre-edit state. Typing does not snapshot.
//! - Undo/redo emit `state.undo` trace events from `undo::UndoEngine`.

use core_layers::{LayerId, LayerRegistry};
use core_text::{Body, NormalizeReport, Normalizer, Stats};
use std::ops::Range;
use tracing::{debug, trace};

pub mod undo;
use undo::UndoEngine;
pub use undo::{HistoryEntry, SnapshotKind, UNDO_HISTORY_MAX};

/// Caller-supplied selection in global body positions. `anchor == head` is a caret.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn caret(at: usize) -> Self {
        Self { anchor: at, head: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Ordered half-open range.
    pub fn range(&self) -> Range<usize> {
        self.anchor.min(self.head)..self.anchor.max(self.head)
    }

    pub fn clamped(self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            head: self.head.min(len),
        }
    }
}

/// In-progress composed input. Text typed while composing lives natively in the
/// host run at `[start, start + len)` until commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Composition {
    pub start: usize,
    pub len: usize,
}

pub struct Session {
    layers: LayerRegistry,
    body: Body,
    selection: Selection,
    composition: Option<Composition>,
    undo: UndoEngine,
    normalizer: Normalizer,
    stats: Stats,
    pub dirty: bool,
}

impl Session {
    pub fn new(layers: LayerRegistry, body: Body) -> Self {
        Self::with_history_limit(layers, body, UNDO_HISTORY_MAX)
    }

    pub fn with_history_limit(layers: LayerRegistry, body: Body, max_entries: usize) -> Self {
        let mut session = Self {
            layers,
            body,
            selection: Selection::default(),
            composition: None,
            undo: UndoEngine::new(max_entries),
            normalizer: Normalizer::default(),
            stats: Stats::default(),
            dirty: false,
        };
        session.normalize();
        session
    }

    /// Open a stored body: runs owned by layers the registry does not know are
    /// untagged and re-wrapped into the active layer.
    pub fn open(layers: LayerRegistry, mut body: Body, max_entries: usize) -> Self {
        let mut orphaned = Vec::new();
        for run in body.runs() {
            collect_unknown(run, &layers, &mut orphaned);
        }
        for id in &orphaned {
            body.reassign_layer(id, None);
        }
        if !orphaned.is_empty() {
            debug!(target: "state.session", orphaned = orphaned.len(), "unknown_layers_untagged_on_open");
        }
        let session = Self::with_history_limit(layers, body, max_entries);
        trace!(target: "state.session", runs = session.body.run_count(), layers = session.layers.len(), "session_opened");
        session
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }
    pub fn layers_mut(&mut self) -> &mut LayerRegistry {
        &mut self.layers
    }
    pub fn active_layer(&self) -> &LayerId {
        self.layers.active_id()
    }
    pub fn body(&self) -> &Body {
        &self.body
    }
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
    /// Both halves at once for operations reading layers while editing the body.
    pub fn parts_mut(&mut self) -> (&mut LayerRegistry, &mut Body) {
        (&mut self.layers, &mut self.body)
    }
    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Set the selection, clamped to the body.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamped(self.body.char_len());
    }

    pub fn set_caret(&mut self, at: usize) {
        self.set_selection(Selection::caret(at));
    }

    pub fn composition(&self) -> Option<Composition> {
        self.composition
    }
    pub fn composition_mut(&mut self) -> Option<&mut Composition> {
        self.composition.as_mut()
    }
    pub fn is_composing(&self) -> bool {
        self.composition.is_some()
    }

    /// Enter the composition window at the current caret.
    pub fn begin_composition(&mut self) -> Composition {
        let comp = Composition {
            start: self.selection.head,
            len: 0,
        };
        self.composition = Some(comp);
        trace!(target: "state.session", start = comp.start, "composition_started");
        comp
    }

    pub fn end_composition(&mut self) -> Option<Composition> {
        let ended = self.composition.take();
        if let Some(c) = ended {
            trace!(target: "state.session", start = c.start, len = c.len, "composition_ended");
        }
        ended
    }

    /// Run the structural repair and refresh statistics. Withheld while composing.
    pub fn normalize(&mut self) -> NormalizeReport {
        if self.composition.is_some() {
            trace!(target: "state.session", "normalize_withheld_during_composition");
            return NormalizeReport::default();
        }
        let active = self.layers.active_id().clone();
        let report = self.normalizer.run(&mut self.body, &active);
        self.refresh();
        report
    }

    /// Recompute derived state (statistics, selection bounds) without repairing.
    pub fn refresh(&mut self) {
        self.stats = Stats::of(&self.body);
        self.selection = self.selection.clamped(self.body.char_len());
    }

    pub fn push_snapshot(&mut self, kind: SnapshotKind) {
        self.undo
            .push_snapshot(kind, &self.layers, &self.body, self.selection);
    }

    /// Invalidate redo after a mutation that records no snapshot (typing, composition).
    pub fn clear_redo(&mut self) {
        self.undo.clear_redo();
    }

    pub fn undo(&mut self) -> bool {
        let restored = self
            .undo
            .undo(&mut self.layers, &mut self.body, &mut self.selection);
        if restored {
            self.refresh();
        }
        restored
    }

    pub fn redo(&mut self) -> bool {
        let restored = self
            .undo
            .redo(&mut self.layers, &mut self.body, &mut self.selection);
        if restored {
            self.refresh();
        }
        restored
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }
    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }
    pub fn undo_snapshots_skipped(&self) -> u64 {
        self.undo.snapshots_skipped()
    }
}

fn collect_unknown(run: &core_text::Run, layers: &LayerRegistry, out: &mut Vec<LayerId>) {
    if let Some(id) = &run.layer
        && !layers.contains(id)
        && !out.contains(id)
    {
        out.push(id.clone());
    }
    for child in &run.nested {
        collect_unknown(child, layers, out);
    }
}
