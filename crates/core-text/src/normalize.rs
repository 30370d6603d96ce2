//! Structural repair of a body after any mutation.
//!
//! Passes, in order, each over the output of the previous one:
//! 1. flatten nested ownership (inner layer wins, bounded rounds)
//! 2. wrap untagged runs into the active layer
//! 3. drop empty runs
//! 4. merge adjacent same-layer runs on the same line (bounded rounds)
//!
//! Running the normalizer on its own output is a no-op. Exceeding a bound is a
//! structural anomaly: the pass stops, a warning is logged and the remaining
//! passes still run on whatever state the aborted pass left.

use crate::block::{Block, BlockKind};
use crate::body::Body;
use crate::run::Run;
use core_layers::LayerId;
use tracing::{trace, warn};

pub const FLATTEN_BOUND: usize = 500;
pub const MERGE_BOUND: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    Flatten,
    Merge,
}

impl Pass {
    pub fn name(self) -> &'static str {
        match self {
            Pass::Flatten => "flatten",
            Pass::Merge => "merge",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub flattened: usize,
    pub wrapped: usize,
    pub removed: usize,
    pub merged: usize,
    pub aborted: Option<Pass>,
}

impl NormalizeReport {
    pub fn changed(&self) -> bool {
        self.flattened + self.wrapped + self.removed + self.merged > 0
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Normalizer {
    pub flatten_bound: usize,
    pub merge_bound: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            flatten_bound: FLATTEN_BOUND,
            merge_bound: MERGE_BOUND,
        }
    }
}

impl Normalizer {
    pub fn run(&self, body: &mut Body, active: &LayerId) -> NormalizeReport {
        let mut report = NormalizeReport::default();
        body.ensure_block();
        let blocks = body.blocks_mut();

        match flatten(blocks, self.flatten_bound) {
            Ok(n) => report.flattened = n,
            Err(n) => {
                report.flattened = n;
                report.aborted = Some(Pass::Flatten);
                warn!(target: "text.normalize", pass = Pass::Flatten.name(), bound = self.flatten_bound, "structural_anomaly_pass_aborted");
            }
        }
        report.wrapped = wrap_untagged(blocks, active);
        report.removed = remove_empty(blocks);
        match merge(blocks, self.merge_bound) {
            Ok(n) => report.merged = n,
            Err(n) => {
                report.merged = n;
                if report.aborted.is_none() {
                    report.aborted = Some(Pass::Merge);
                }
                warn!(target: "text.normalize", pass = Pass::Merge.name(), bound = self.merge_bound, "structural_anomaly_pass_aborted");
            }
        }

        if report.changed() {
            trace!(
                target: "text.normalize",
                flattened = report.flattened,
                wrapped = report.wrapped,
                removed = report.removed,
                merged = report.merged,
                runs = body.run_count(),
                "normalized"
            );
        }
        report
    }
}

/// Normalize with the default bounds.
pub fn normalize(body: &mut Body, active: &LayerId) -> NormalizeReport {
    Normalizer::default().run(body, active)
}

/// List-item repair after a block split: untagged runs inside list items go to
/// `layer`, and an item left with nothing gets a placeholder in `layer`.
pub fn anchor_list_items(body: &mut Body, layer: &LayerId) -> usize {
    let mut repaired = 0;
    for block in body.blocks_mut().iter_mut() {
        if !matches!(block.kind, BlockKind::ListItem(_)) {
            continue;
        }
        for run in &mut block.runs {
            if run.layer.is_none() {
                run.layer = Some(layer.clone());
                repaired += 1;
            }
        }
        if block.runs.iter().all(Run::is_empty) {
            block.runs = vec![Run::placeholder(layer.clone())];
            repaired += 1;
        }
    }
    repaired
}

/// One nesting level per round. `Err` carries the count reached before the bound hit.
fn flatten(blocks: &mut [Block], bound: usize) -> Result<usize, usize> {
    let mut total = 0;
    for _ in 0..bound {
        let mut round = 0;
        for block in blocks.iter_mut() {
            if !block.runs.iter().any(Run::is_nested) {
                continue;
            }
            let runs = std::mem::take(&mut block.runs);
            for run in runs {
                if run.is_nested() {
                    round += 1;
                    block.runs.extend(unnest(run));
                } else {
                    block.runs.push(run);
                }
            }
        }
        if round == 0 {
            return Ok(total);
        }
        total += round;
    }
    if blocks.iter().any(|b| b.runs.iter().any(Run::is_nested)) {
        Err(total)
    } else {
        Ok(total)
    }
}

/// Lift the children of `outer` one level. The outer text keeps the outer layer,
/// untagged children inherit it and the outer break moves to the last piece.
fn unnest(mut outer: Run) -> Vec<Run> {
    let children = std::mem::take(&mut outer.nested);
    let line_break = outer.line_break;
    outer.line_break = false;
    let layer = outer.layer.clone();

    let mut out = Vec::with_capacity(children.len() + 1);
    if !outer.text.is_empty() {
        out.push(outer);
    }
    for mut child in children {
        if child.layer.is_none() {
            child.layer = layer.clone();
        }
        out.push(child);
    }
    if line_break {
        match out.last_mut() {
            Some(last) if !last.line_break => last.line_break = true,
            _ => out.push(Run::line_break(layer)),
        }
    }
    out
}

fn wrap_untagged(blocks: &mut [Block], active: &LayerId) -> usize {
    let mut wrapped = 0;
    for run in blocks.iter_mut().flat_map(|b| b.runs.iter_mut()) {
        if run.layer.is_none() {
            run.layer = Some(active.clone());
            wrapped += 1;
        }
    }
    wrapped
}

fn remove_empty(blocks: &mut [Block]) -> usize {
    let mut removed = 0;
    for block in blocks.iter_mut() {
        let before = block.runs.len();
        block.runs.retain(|r| !r.is_empty());
        removed += before - block.runs.len();
    }
    removed
}

fn merge(blocks: &mut [Block], bound: usize) -> Result<usize, usize> {
    let mut total = 0;
    for _ in 0..bound {
        let mut round = 0;
        for block in blocks.iter_mut() {
            round += merge_block(block);
        }
        if round == 0 {
            return Ok(total);
        }
        total += round;
    }
    if blocks.iter().any(has_mergeable_pair) {
        Err(total)
    } else {
        Ok(total)
    }
}

fn merge_block(block: &mut Block) -> usize {
    let mut merged = 0;
    let runs = std::mem::take(&mut block.runs);
    for run in runs {
        match block.runs.last_mut() {
            Some(prev) if mergeable(prev, &run) => {
                prev.absorb(run);
                merged += 1;
            }
            _ => block.runs.push(run),
        }
    }
    merged
}

fn mergeable(prev: &Run, next: &Run) -> bool {
    !prev.line_break && !prev.is_nested() && !next.is_nested() && prev.layer == next.layer
}

fn has_mergeable_pair(block: &Block) -> bool {
    block.runs.windows(2).any(|w| mergeable(&w[0], &w[1]))
}
