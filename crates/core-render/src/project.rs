//! Pure projection of a body into styled line segments.
//!
//! The body is the source of truth; this module only reads it. Each block
//! starts a line and each line break ends one. Placeholders render as nothing,
//! and runs of collapsed layers are dropped from the projection entirely.

use crate::style::{RunStyle, Visibility, compute_run_style, compute_run_visibility};
use core_layers::{DisplayMode, LayerId, LayerRegistry};
use core_text::{Alignment, BlockKind, Body, Marks, PLACEHOLDER, Run};
use tracing::trace;
use unicode_width::UnicodeWidthStr;

#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub layer: Option<LayerId>,
    pub text: String,
    pub marks: Marks,
    pub style: RunStyle,
    pub visibility: Visibility,
}

impl Segment {
    /// Display columns the segment occupies.
    pub fn width(&self) -> usize {
        self.text.width()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub block: usize,
    pub kind: BlockKind,
    pub align: Option<Alignment>,
    /// First visual line of its block (list markers go here).
    pub starts_block: bool,
    pub segments: Vec<Segment>,
}

impl Line {
    /// Text of the segments that take layout space (hidden text included).
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn width(&self) -> usize {
        self.segments.iter().map(Segment::width).sum()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
    pub lines: Vec<Line>,
}

pub fn project(body: &Body, layers: &LayerRegistry, mode: DisplayMode) -> Projection {
    let mut lines = Vec::new();
    let mut dropped = 0usize;
    for (bi, block) in body.blocks().iter().enumerate() {
        let mut line = Line {
            block: bi,
            kind: block.kind,
            align: block.align,
            starts_block: true,
            segments: Vec::new(),
        };
        for run in &block.runs {
            dropped += push_run(&mut line.segments, run, None, layers, mode);
            if run.line_break {
                let next = Line {
                    starts_block: false,
                    segments: Vec::new(),
                    ..line.clone()
                };
                lines.push(std::mem::replace(&mut line, next));
            }
        }
        lines.push(line);
    }
    trace!(target: "render.project", lines = lines.len(), dropped, "projected");
    Projection { lines }
}

/// Append the segments of `run`; returns how many runs were dropped as collapsed.
fn push_run(
    out: &mut Vec<Segment>,
    run: &Run,
    inherited: Option<&LayerId>,
    layers: &LayerRegistry,
    mode: DisplayMode,
) -> usize {
    let layer_id = run.layer.as_ref().or(inherited);
    let layer = layer_id.and_then(|id| layers.get(id));
    let visibility = compute_run_visibility(layer, mode);
    if visibility == Visibility::Collapsed {
        return 1;
    }
    let style = layer.map(compute_run_style).unwrap_or(RunStyle::plain());
    for (range, marks) in run.decoration.segments(run.text.len()) {
        let text = run
            .text
            .get(range)
            .unwrap_or_default()
            .replace(PLACEHOLDER, "");
        if text.is_empty() {
            continue;
        }
        out.push(Segment {
            layer: layer_id.cloned(),
            text,
            marks,
            style,
            visibility,
        });
    }
    run.nested
        .iter()
        .map(|child| push_run(out, child, layer_id, layers, mode))
        .sum()
}
