//! A run: a span of text owned by (at most) one layer.
//!
//! Well-formed runs have `layer: Some(_)` and no `nested` children. The two
//! degenerate shapes exist only transiently and are repaired by the normalizer:
//! - untagged text (`layer: None`), produced by layer-unaware primitives or
//!   by deleting a layer while runs still referenced it;
//! - nested ownership (`nested` non-empty), produced by imported markup or by
//!   formatting primitives. A nested run's content is exactly its children;
//!   its own `text` is expected to be empty.
//!
//! Offsets taken by run methods are character (Unicode scalar) offsets.

use crate::PLACEHOLDER;
use crate::decoration::Decoration;
use core_layers::LayerId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Run {
    pub layer: Option<LayerId>,
    pub text: String,
    pub decoration: Decoration,
    /// A line break follows this run's text.
    pub line_break: bool,
    pub nested: Vec<Run>,
}

impl Run {
    pub fn new(layer: LayerId, text: impl Into<String>) -> Self {
        Self {
            layer: Some(layer),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn untagged(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Zero-width anchor for the cursor on an otherwise empty line.
    pub fn placeholder(layer: LayerId) -> Self {
        Self::new(layer, PLACEHOLDER.to_string())
    }

    /// An empty-text run carrying only a line break.
    pub fn line_break(layer: Option<LayerId>) -> Self {
        Self {
            layer,
            line_break: true,
            ..Self::default()
        }
    }

    /// Container run whose children are owned by their own layers (or inherit `layer`).
    pub fn nesting(layer: Option<LayerId>, children: Vec<Run>) -> Self {
        Self {
            layer,
            nested: children,
            ..Self::default()
        }
    }

    pub fn with_break(mut self) -> Self {
        self.line_break = true;
        self
    }

    pub fn with_decoration(mut self, decoration: Decoration) -> Self {
        self.decoration = decoration;
        self
    }

    pub fn is_tagged(&self, layer: &LayerId) -> bool {
        self.layer.as_ref() == Some(layer)
    }

    pub fn is_nested(&self) -> bool {
        !self.nested.is_empty()
    }

    pub fn is_placeholder(&self) -> bool {
        let mut chars = self.text.chars();
        chars.next() == Some(PLACEHOLDER) && chars.next().is_none()
    }

    /// No text, no break marker and no children.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && !self.line_break && self.nested.is_empty()
    }

    /// Characters of this run's own text.
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Positions occupied by this run: text, children and a trailing break.
    pub fn char_len(&self) -> usize {
        self.text_len()
            + self.nested.iter().map(Run::char_len).sum::<usize>()
            + usize::from(self.line_break)
    }

    /// Text with breaks rendered as `\n`.
    pub fn plain_text(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.nested {
            out.push_str(&child.plain_text());
        }
        if self.line_break {
            out.push('\n');
        }
        out
    }

    /// Split at character offset `at` (clamped to the text). `self` keeps the head;
    /// the tail keeps layer and takes over the trailing break.
    pub fn split_off(&mut self, at: usize) -> Run {
        let byte = byte_index(&self.text, at);
        let tail_text = self.text.split_off(byte);
        let tail_decoration = self.decoration.split_off(byte);
        let tail = Run {
            layer: self.layer.clone(),
            text: tail_text,
            decoration: tail_decoration,
            line_break: self.line_break,
            nested: Vec::new(),
        };
        self.line_break = false;
        tail
    }

    pub fn insert_str(&mut self, at: usize, s: &str) {
        let byte = byte_index(&self.text, at);
        self.text.insert_str(byte, s);
        self.decoration.insert_gap(byte, s.len());
    }

    /// Remove characters `[start, end)` of the text.
    pub fn remove_chars(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let a = byte_index(&self.text, start);
        let b = byte_index(&self.text, end);
        self.text.replace_range(a..b, "");
        self.decoration.remove(a..b);
    }

    /// Append `other` (same layer assumed). Placeholders give way to real text.
    pub fn absorb(&mut self, mut other: Run) {
        if self.is_placeholder() && !other.text.is_empty() && !other.is_placeholder() {
            self.text.clear();
            self.decoration = Decoration::default();
        } else if other.is_placeholder() && !self.text.is_empty() {
            other.text.clear();
            other.decoration = Decoration::default();
        }
        let shift = self.text.len();
        self.text.push_str(&other.text);
        self.decoration.append(other.decoration, shift);
        self.line_break = other.line_break;
    }
}

/// Byte index of character `at` in `text`, clamped to the end.
pub(crate) fn byte_index(text: &str, at: usize) -> usize {
    text.char_indices()
        .nth(at)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}
