//! Formatting primitive seam and layer-provenance repair.
//!
//! A `FormatPrimitive` applies decoration and block formatting with its own
//! logic and may know nothing about layers: it is allowed to leave runs
//! untagged or to duplicate tags. The engine always repairs afterwards.
//! Decoration changes record (layer, text) provenance for the selected runs
//! first; untagged text left behind is matched back to that provenance by
//! substring containment, falling back to the active layer. The match is best
//! effort: with duplicate text across layers the first recorded entry wins.

use core_layers::LayerId;
use core_text::{Alignment, BlockKind, Body, Marks, PLACEHOLDER, Run};
use std::ops::Range;
use tracing::trace;

pub trait FormatPrimitive {
    /// Set (`on`) or clear `marks` over the characters of `range`.
    fn toggle_marks(&self, body: &mut Body, range: Range<usize>, marks: Marks, on: bool);
    fn set_alignment(&self, body: &mut Body, blocks: Range<usize>, align: Alignment);
    fn set_block_kind(&self, body: &mut Body, blocks: Range<usize>, kind: BlockKind);
}

/// Default primitive operating directly on runs; it never drops layer tags.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayerPreservingFormatter;

impl FormatPrimitive for LayerPreservingFormatter {
    fn toggle_marks(&self, body: &mut Body, range: Range<usize>, marks: Marks, on: bool) {
        for (bi, runs) in body.isolate_runs(range) {
            for run in &mut body.blocks_mut()[bi].runs[runs] {
                let len = run.text.len();
                run.decoration.toggle(0..len, marks, on);
            }
        }
    }

    fn set_alignment(&self, body: &mut Body, blocks: Range<usize>, align: Alignment) {
        for block in clamp_blocks(body, blocks) {
            block.align = Some(align);
        }
    }

    fn set_block_kind(&self, body: &mut Body, blocks: Range<usize>, kind: BlockKind) {
        for block in clamp_blocks(body, blocks) {
            block.kind = kind;
        }
    }
}

fn clamp_blocks(body: &mut Body, blocks: Range<usize>) -> &mut [core_text::Block] {
    let all = body.blocks_mut();
    let end = blocks.end.min(all.len());
    let start = blocks.start.min(end);
    &mut all[start..end]
}

/// (layer, text) of a run overlapping a formatted selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub layer: LayerId,
    pub text: String,
}

/// Record the layer and text of every tagged run piece inside `range`.
pub fn record_provenance(body: &Body, range: Range<usize>) -> Vec<Provenance> {
    let mut scratch = body.clone();
    let mut out = Vec::new();
    for (bi, runs) in scratch.isolate_runs(range) {
        for run in &scratch.blocks()[bi].runs[runs] {
            if let Some(layer) = &run.layer
                && !run.text.is_empty()
            {
                out.push(Provenance {
                    layer: layer.clone(),
                    text: run.text.clone(),
                });
            }
        }
    }
    out
}

/// Re-tag untagged runs from `provenance`; returns how many fell back to `fallback`.
pub fn restore_provenance(body: &mut Body, provenance: &[Provenance], fallback: &LayerId) -> usize {
    let mut fell_back = 0;
    let mut restored = 0;
    for run in body.blocks_mut().iter_mut().flat_map(|b| b.runs.iter_mut()) {
        if run.layer.is_some() {
            continue;
        }
        match match_provenance(run, provenance) {
            Some(layer) => {
                run.layer = Some(layer.clone());
                restored += 1;
            }
            None => {
                run.layer = Some(fallback.clone());
                fell_back += 1;
            }
        }
    }
    if restored + fell_back > 0 {
        trace!(target: "actions.format", restored, fell_back, "provenance_repair");
    }
    fell_back
}

fn match_provenance<'a>(run: &Run, provenance: &'a [Provenance]) -> Option<&'a LayerId> {
    let text = run.text.replace(PLACEHOLDER, "");
    if text.is_empty() {
        return None;
    }
    provenance
        .iter()
        .find(|p| p.text.contains(&text) || text.contains(&p.text))
        .map(|p| &p.layer)
}

/// True when every selected character already carries `marks`.
pub fn marks_cover(body: &Body, range: Range<usize>, marks: Marks) -> bool {
    let mut scratch = body.clone();
    let mut any = false;
    for (bi, runs) in scratch.isolate_runs(range) {
        for run in &scratch.blocks()[bi].runs[runs] {
            if run.text.is_empty() || run.is_placeholder() {
                continue;
            }
            any = true;
            if !run.decoration.covers(0..run.text.len(), marks) {
                return false;
            }
        }
    }
    any
}
