//! The document body: an ordered, never-empty list of blocks.
//!
//! Global positions count every run character, every line break and every
//! block boundary as one. `plain_text` renders breaks and boundaries as `\n`,
//! so its characters line up one-to-one with positions.
//!
//! Edit primitives here are layer-unaware apart from `retag_range` and
//! `reassign_layer`; they may leave untagged, empty or mergeable runs behind,
//! which the normalizer repairs.

use std::ops::Range;

use crate::block::{Block, Locate};
use crate::run::Run;
use core_layers::LayerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextPosition {
    pub block: usize,
    pub offset: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Body {
    blocks: Vec<Block>,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            blocks: vec![Block::paragraph(Vec::new())],
        }
    }
}

impl Body {
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            Self::default()
        } else {
            Self { blocks }
        }
    }

    /// Single paragraph holding `runs`.
    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self {
            blocks: vec![Block::paragraph(runs)],
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Mutable access for primitives living outside this module. Callers must
    /// not leave the list empty; `ensure_block` restores that if they do.
    pub fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub fn ensure_block(&mut self) {
        if self.blocks.is_empty() {
            self.blocks.push(Block::paragraph(Vec::new()));
        }
    }

    /// Top-level runs in document order.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.blocks.iter().flat_map(|b| b.runs.iter())
    }

    pub fn run_count(&self) -> usize {
        self.blocks.iter().map(|b| b.runs.len()).sum()
    }

    pub fn char_len(&self) -> usize {
        self.blocks.iter().map(Block::char_len).sum::<usize>() + self.blocks.len() - 1
    }

    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Plain text of positions `[start, end)`.
    pub fn text_in(&self, range: Range<usize>) -> String {
        self.plain_text()
            .chars()
            .skip(range.start)
            .take(range.end.saturating_sub(range.start))
            .collect()
    }

    /// Map a global offset to (block, offset within block), clamping to the end.
    pub fn resolve(&self, offset: usize) -> TextPosition {
        let mut rest = offset;
        for (block, b) in self.blocks.iter().enumerate() {
            let len = b.char_len();
            if rest <= len {
                return TextPosition { block, offset: rest };
            }
            rest -= len + 1;
        }
        let last = self.blocks.len() - 1;
        TextPosition {
            block: last,
            offset: self.blocks[last].char_len(),
        }
    }

    pub fn offset_of(&self, pos: TextPosition) -> usize {
        self.blocks[..pos.block.min(self.blocks.len())]
            .iter()
            .map(|b| b.char_len() + 1)
            .sum::<usize>()
            + pos.offset
    }

    /// The run a caret at `offset` attaches to, if any.
    pub fn run_at(&self, offset: usize) -> Option<(TextPosition, &Run, usize)> {
        let pos = self.resolve(offset);
        match self.blocks[pos.block].locate(pos.offset) {
            Locate::InRun { index, offset } => Some((pos, &self.blocks[pos.block].runs[index], offset)),
            Locate::Gap { .. } => None,
        }
    }

    /// Delete positions `[start, end)`, joining blocks whose boundary falls inside.
    pub fn remove_range(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        let s = self.resolve(range.start);
        let e = self.resolve(range.end);
        if s.block == e.block {
            self.blocks[s.block].remove_range(s.offset, e.offset);
            return;
        }
        let first_len = self.blocks[s.block].char_len();
        self.blocks[s.block].remove_range(s.offset, first_len);
        self.blocks[e.block].remove_range(0, e.offset);
        let mut removed = self.blocks.drain(s.block + 1..=e.block);
        let tail = removed.next_back();
        drop(removed);
        if let Some(tail) = tail {
            self.blocks[s.block].runs.extend(tail.runs);
        }
    }

    /// Split the block containing `offset`; returns the index of the new (tail) block.
    pub fn split_block_at(&mut self, offset: usize) -> usize {
        let pos = self.resolve(offset);
        let tail = self.blocks[pos.block].split_off(pos.offset);
        self.blocks.insert(pos.block + 1, tail);
        pos.block + 1
    }

    /// Split runs at the edges of `range` so it covers whole runs; returns, per
    /// touched block, the block index and the run indices inside the range.
    pub fn isolate_runs(&mut self, range: Range<usize>) -> Vec<(usize, Range<usize>)> {
        if range.start >= range.end {
            return Vec::new();
        }
        let s = self.resolve(range.start);
        let e = self.resolve(range.end);
        let mut out = Vec::new();
        for bi in s.block..=e.block {
            let block = &mut self.blocks[bi];
            let start = if bi == s.block { s.offset } else { 0 };
            let end = if bi == e.block { e.offset } else { block.char_len() };
            if start >= end {
                continue;
            }
            // splitting never moves positions, so the second split sees the same offsets
            let lo = block.split_run_at(start);
            let hi = block.split_run_at(end).max(lo);
            out.push((bi, lo..hi));
        }
        out
    }

    /// Give every character in `range` to `layer`, discarding interior subdivisions.
    /// Breaks inside the range stay where they are. Returns the number of runs touched.
    pub fn retag_range(&mut self, range: Range<usize>, layer: &LayerId) -> usize {
        let mut touched = 0;
        for (bi, runs) in self.isolate_runs(range) {
            for run in &mut self.blocks[bi].runs[runs] {
                set_layer_deep(run, layer);
                touched += 1;
            }
        }
        touched
    }

    /// The run a caret at `offset` attaches to, mutably, with the caret's offset in it.
    pub fn run_at_mut(&mut self, offset: usize) -> Option<(&mut Run, usize)> {
        let pos = self.resolve(offset);
        let block = &mut self.blocks[pos.block];
        match block.locate(pos.offset) {
            Locate::InRun { index, offset } => Some((&mut block.runs[index], offset)),
            Locate::Gap { .. } => None,
        }
    }

    /// Move every run owned by `from` to `to` (`None` leaves them untagged).
    pub fn reassign_layer(&mut self, from: &LayerId, to: Option<&LayerId>) -> usize {
        let mut count = 0;
        for block in &mut self.blocks {
            for run in &mut block.runs {
                count += reassign_deep(run, from, to);
            }
        }
        count
    }

    /// Splice `runs` in at `offset`. Returns the offset just past the inserted content.
    pub fn insert_runs(&mut self, offset: usize, runs: Vec<Run>) -> usize {
        let pos = self.resolve(offset);
        let runs = runs.into_iter().filter(|r| !r.is_empty()).collect::<Vec<_>>();
        let inserted = runs.iter().map(Run::char_len).sum::<usize>();
        let block = &mut self.blocks[pos.block];
        let at = block.split_run_at(pos.offset);
        block.runs.splice(at..at, runs);
        offset + inserted
    }

    /// Insert `text` into whatever run the caret attaches to, keeping that run's
    /// layer. With no run to attach to the text goes in untagged. Returns the host layer.
    pub fn insert_native(&mut self, offset: usize, text: &str) -> Option<LayerId> {
        let pos = self.resolve(offset);
        let block = &mut self.blocks[pos.block];
        match block.locate(pos.offset) {
            Locate::InRun { index, offset } => {
                let run = &mut block.runs[index];
                run.insert_str(offset, text);
                run.layer.clone()
            }
            Locate::Gap { index } => {
                block.runs.insert(index, Run::untagged(text));
                None
            }
        }
    }

    /// Explode every block touched by `range` into one block per line and return
    /// the indices of the blocks now covering it. Positions are unchanged because
    /// each break becomes a block boundary.
    pub fn isolate_lines(&mut self, range: Range<usize>) -> Range<usize> {
        let s = self.resolve(range.start);
        let e = self.resolve(range.end.max(range.start));
        let mut exploded = Vec::with_capacity(self.blocks.len());
        let mut first = 0;
        let mut last = 0;
        for (bi, block) in std::mem::take(&mut self.blocks).into_iter().enumerate() {
            if bi < s.block || bi > e.block {
                exploded.push(block);
                continue;
            }
            let mut line_start = 0;
            for line in block.explode_lines() {
                let line_end = line_start + line.char_len();
                let idx = exploded.len();
                if bi == s.block && s.offset >= line_start && s.offset <= line_end {
                    first = idx;
                }
                if bi == e.block && e.offset >= line_start && e.offset <= line_end {
                    last = idx;
                }
                line_start = line_end + 1;
                exploded.push(line);
            }
        }
        self.blocks = exploded;
        self.ensure_block();
        first..last.max(first) + 1
    }
}

fn set_layer_deep(run: &mut Run, layer: &LayerId) {
    run.layer = Some(layer.clone());
    for child in &mut run.nested {
        set_layer_deep(child, layer);
    }
}

fn reassign_deep(run: &mut Run, from: &LayerId, to: Option<&LayerId>) -> usize {
    let mut count = 0;
    if run.layer.as_ref() == Some(from) {
        run.layer = to.cloned();
        count += 1;
    }
    for child in &mut run.nested {
        count += reassign_deep(child, from, to);
    }
    count
}
