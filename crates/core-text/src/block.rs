//! Block containers: paragraphs and list items, each holding a run sequence.
//!
//! Offsets inside a block are character positions over the block's runs where
//! every text character and every line break occupies one position.

use crate::run::Run;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    Bullet,
    Numbered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn as_css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }

    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim() {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            "justify" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    ListItem(ListKind),
}

/// Where an offset lands inside a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Locate {
    /// Inside (or at either edge of) the text of run `index`, `offset` characters in.
    InRun { index: usize, offset: usize },
    /// Between runs, with no run to attach to; `index` is the insertion index.
    Gap { index: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    pub kind: BlockKind,
    pub align: Option<Alignment>,
    pub runs: Vec<Run>,
}

impl Block {
    pub fn paragraph(runs: Vec<Run>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            align: None,
            runs,
        }
    }

    pub fn list_item(kind: ListKind, runs: Vec<Run>) -> Self {
        Self {
            kind: BlockKind::ListItem(kind),
            align: None,
            runs,
        }
    }

    /// Same kind and alignment, different content.
    pub fn sibling(&self, runs: Vec<Run>) -> Self {
        Self {
            kind: self.kind,
            align: self.align,
            runs,
        }
    }

    pub fn is_list_item(&self) -> bool {
        matches!(self.kind, BlockKind::ListItem(_))
    }

    pub fn char_len(&self) -> usize {
        self.runs.iter().map(Run::char_len).sum()
    }

    pub fn plain_text(&self) -> String {
        self.runs.iter().map(Run::plain_text).collect()
    }

    /// No visible characters: only placeholders, or nothing at all.
    pub fn is_blank(&self) -> bool {
        self.plain_text()
            .chars()
            .all(|c| c == crate::PLACEHOLDER || c == '\n')
    }

    /// Resolve `offset`. A caret between two runs belongs to the left one unless
    /// that run ends in a line break.
    pub fn locate(&self, offset: usize) -> Locate {
        let mut pos = 0;
        for (index, run) in self.runs.iter().enumerate() {
            let len = run.text_len();
            if offset <= pos + len {
                return Locate::InRun {
                    index,
                    offset: offset - pos,
                };
            }
            pos += run.char_len();
        }
        Locate::Gap {
            index: self.runs.len(),
        }
    }

    /// Offset of the first position of run `index`.
    pub fn run_start(&self, index: usize) -> usize {
        self.runs[..index.min(self.runs.len())]
            .iter()
            .map(Run::char_len)
            .sum()
    }

    /// Ensure a run boundary at `offset`; returns the index of the first run at or after it.
    /// At the end of a run's text a trailing break is split off into its own run so that
    /// content inserted at the returned index lands before the break.
    pub fn split_run_at(&mut self, offset: usize) -> usize {
        match self.locate(offset) {
            Locate::Gap { index } => index,
            Locate::InRun { index, offset: 0 } => index,
            Locate::InRun { index, offset }
                if offset >= self.runs[index].text_len() && !self.runs[index].line_break =>
            {
                index + 1
            }
            Locate::InRun { index, offset } => {
                let tail = self.runs[index].split_off(offset);
                self.runs.insert(index + 1, tail);
                index + 1
            }
        }
    }

    /// Split at `offset`; `self` keeps the head, the returned block holds the tail.
    pub fn split_off(&mut self, offset: usize) -> Block {
        let tail_runs = match self.locate(offset) {
            Locate::Gap { index } => self.runs.split_off(index),
            Locate::InRun { index, offset } => {
                let mut rest = self.runs.split_off(index + 1);
                let tail = self.runs[index].split_off(offset);
                if !tail.is_empty() {
                    rest.insert(0, tail);
                }
                if self.runs[index].is_empty() {
                    self.runs.remove(index);
                }
                rest
            }
        };
        self.sibling(tail_runs)
    }

    /// Delete positions `[start, end)`, clearing line breaks that fall inside the range.
    pub fn remove_range(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let mut pos = 0;
        for run in &mut self.runs {
            let len = run.text_len();
            let full = run.char_len();
            let text_start = pos;
            let a = start.clamp(text_start, text_start + len) - text_start;
            let b = end.clamp(text_start, text_start + len) - text_start;
            let break_pos = text_start + full.saturating_sub(1);
            let clears_break = run.line_break && start <= break_pos && break_pos < end;
            run.remove_chars(a, b);
            if clears_break {
                run.line_break = false;
            }
            pos += full;
        }
        self.runs.retain(|r| !r.is_empty());
    }

    /// Explode at every line break into one block per line (breaks become block boundaries).
    pub fn explode_lines(self) -> Vec<Block> {
        let mut out = Vec::new();
        let mut line = Vec::new();
        for mut run in self.runs {
            let ends_line = run.line_break;
            run.line_break = false;
            if !run.is_empty() {
                line.push(run);
            }
            if ends_line {
                out.push(Block {
                    kind: self.kind,
                    align: self.align,
                    runs: std::mem::take(&mut line),
                });
            }
        }
        out.push(Block {
            kind: self.kind,
            align: self.align,
            runs: line,
        });
        out
    }
}
