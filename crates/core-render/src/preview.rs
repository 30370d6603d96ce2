//! ANSI preview of a projected body.
//!
//! Highlight tints are alpha-blended over a white page so the output needs no
//! terminal transparency. Hidden-but-kept text prints as blanks of equal
//! display width; collapsed text is already absent from the projection.
//! List items get a `- ` or `N. ` marker on their first line.

use crate::project::{Line, Projection, project};
use crate::style::Visibility;
use crate::writer::Writer;
use anyhow::Result;
use core_layers::{DisplayMode, LayerRegistry, Rgb};
use core_text::{BlockKind, Body, ListKind};

pub const PAGE: Rgb = Rgb::new(0xff, 0xff, 0xff);

/// Translate a projection into writer commands.
pub fn render(projection: &Projection) -> Writer {
    let mut w = Writer::new();
    let mut number = 0usize;
    for (i, line) in projection.lines.iter().enumerate() {
        if i > 0 {
            w.new_line();
        }
        number = next_number(line, number);
        if line.starts_block {
            match line.kind {
                BlockKind::ListItem(ListKind::Bullet) => w.print("- "),
                BlockKind::ListItem(ListKind::Numbered) => w.print(format!("{number}. ")),
                BlockKind::Paragraph => {}
            }
        }
        for seg in &line.segments {
            match seg.visibility {
                Visibility::Hidden => w.print(" ".repeat(seg.width())),
                _ => {
                    let bg = (!seg.style.background.is_transparent())
                        .then(|| seg.style.background.over(PAGE));
                    w.colors(seg.style.foreground.over(PAGE), bg);
                    w.marks(seg.marks);
                    w.print(seg.text.as_str());
                    w.reset();
                }
            }
        }
    }
    w.new_line();
    w
}

/// Numbering restarts whenever a numbered list is interrupted.
fn next_number(line: &Line, current: usize) -> usize {
    match line.kind {
        BlockKind::ListItem(ListKind::Numbered) if line.starts_block => current + 1,
        BlockKind::ListItem(ListKind::Numbered) => current,
        _ => 0,
    }
}

/// Project and render `body` into a string of ANSI-styled text.
pub fn preview_string(body: &Body, layers: &LayerRegistry, mode: DisplayMode) -> Result<String> {
    let mut out = Vec::new();
    render(&project(body, layers, mode)).flush_to(&mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
