//! Terminal writer: an ordered command list flushed through crossterm.
//!
//! Invariants:
//! * Commands preserve ordering; nothing is emitted before `flush_to`.
//! * Colors are always 24-bit; a `None` background leaves the terminal default.
//! * The writer owns no global state and targets any `io::Write`.

use anyhow::Result;
use core_layers::Rgb;
use core_text::Marks;
use crossterm::{
    queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor,
        SetForegroundColor,
    },
};
use std::io::{Write, stdout};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Colors { fg: Rgb, bg: Option<Rgb> },
    Marks(Marks),
    Reset,
    Print(String),
    NewLine,
}

#[derive(Default)]
pub struct Writer {
    cmds: Vec<Command>,
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

impl Writer {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }
    pub fn colors(&mut self, fg: Rgb, bg: Option<Rgb>) {
        self.cmds.push(Command::Colors { fg, bg });
    }
    pub fn marks(&mut self, marks: Marks) {
        if !marks.is_empty() {
            self.cmds.push(Command::Marks(marks));
        }
    }
    pub fn reset(&mut self) {
        self.cmds.push(Command::Reset);
    }
    pub fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }
    pub fn new_line(&mut self) {
        self.cmds.push(Command::NewLine);
    }
    pub fn commands(&self) -> &[Command] {
        &self.cmds
    }

    pub fn flush_to<W: Write>(self, out: &mut W) -> Result<()> {
        for c in self.cmds {
            match c {
                Command::Colors { fg, bg } => {
                    queue!(out, SetForegroundColor(color(fg)))?;
                    if let Some(bg) = bg {
                        queue!(out, SetBackgroundColor(color(bg)))?;
                    }
                }
                Command::Marks(marks) => {
                    for (mark, attr) in [
                        (Marks::BOLD, Attribute::Bold),
                        (Marks::ITALIC, Attribute::Italic),
                        (Marks::UNDERLINE, Attribute::Underlined),
                        (Marks::STRIKETHROUGH, Attribute::CrossedOut),
                    ] {
                        if marks.contains(mark) {
                            queue!(out, SetAttribute(attr))?;
                        }
                    }
                }
                Command::Reset => {
                    queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;
                }
                Command::Print(s) => {
                    queue!(out, Print(s))?;
                }
                Command::NewLine => {
                    queue!(out, Print("\n"))?;
                }
            }
        }
        out.flush()?;
        Ok(())
    }

    pub fn flush(self) -> Result<()> {
        let mut out = stdout();
        self.flush_to(&mut out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prints_and_marks_are_skipped() {
        let mut w = Writer::new();
        w.print("");
        w.marks(Marks::empty());
        w.print("x");
        assert_eq!(w.commands(), &[Command::Print("x".into())]);
    }

    #[test]
    fn emits_truecolor_sequences() {
        let mut w = Writer::new();
        w.colors(Rgb::new(1, 2, 3), Some(Rgb::new(4, 5, 6)));
        w.marks(Marks::BOLD);
        w.print("hi");
        w.reset();
        let mut out = Vec::new();
        w.flush_to(&mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("\x1b[38;2;1;2;3m"));
        assert!(s.contains("\x1b[48;2;4;5;6m"));
        assert!(s.contains("\x1b[1m"));
        assert!(s.contains("hi"));
    }
}
