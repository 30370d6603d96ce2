//! Markup codec for document content.
//!
//! Shape written by `serialize`:
//!
//! ```text
//! <p style="text-align:center"><span class="layer-text" data-layer="layer-1">Hi <b>there</b></span><br/>...</p>
//! <ul><li>...</li></ul>
//! ```
//!
//! `parse` is lenient about what it accepts (bare text, spans nested inside
//! spans, spans without a layer, unknown elements) and leaves the result for
//! the normalizer. Only malformed XML and span nesting deeper than the flatten
//! bound are errors.

use core_layers::LayerId;
use core_text::normalize::FLATTEN_BOUND;
use core_text::{Alignment, Block, BlockKind, Body, Decoration, ListKind, Marks, Run};
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

pub const SPAN_CLASS: &str = "layer-text";

const MARK_TAGS: [(Marks, &str); 4] = [
    (Marks::BOLD, "b"),
    (Marks::ITALIC, "i"),
    (Marks::UNDERLINE, "u"),
    (Marks::STRIKETHROUGH, "s"),
];

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed markup: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("spans nested deeper than {bound} levels")]
    TooDeep { bound: usize },
}

pub fn serialize(body: &Body) -> String {
    let mut out = String::new();
    let mut open_list: Option<ListKind> = None;
    for block in body.blocks() {
        let list = match block.kind {
            BlockKind::ListItem(kind) => Some(kind),
            BlockKind::Paragraph => None,
        };
        if open_list != list {
            if let Some(kind) = open_list {
                out.push_str(&format!("</{}>", list_tag(kind)));
            }
            if let Some(kind) = list {
                out.push_str(&format!("<{}>", list_tag(kind)));
            }
            open_list = list;
        }
        let tag = if list.is_some() { "li" } else { "p" };
        match block.align {
            Some(align) => out.push_str(&format!("<{tag} style=\"text-align:{}\">", align.as_css())),
            None => out.push_str(&format!("<{tag}>")),
        }
        for run in &block.runs {
            write_run(&mut out, run);
        }
        out.push_str(&format!("</{tag}>"));
    }
    if let Some(kind) = open_list {
        out.push_str(&format!("</{}>", list_tag(kind)));
    }
    out
}

fn list_tag(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Bullet => "ul",
        ListKind::Numbered => "ol",
    }
}

fn write_run(out: &mut String, run: &Run) {
    match &run.layer {
        Some(id) => out.push_str(&format!(
            "<span class=\"{SPAN_CLASS}\" data-layer=\"{}\">",
            escape(id.as_str())
        )),
        None => out.push_str(&format!("<span class=\"{SPAN_CLASS}\">")),
    }
    for (range, marks) in run.decoration.segments(run.text.len()) {
        let Some(piece) = run.text.get(range) else {
            continue;
        };
        for (mark, tag) in MARK_TAGS {
            if marks.contains(mark) {
                out.push_str(&format!("<{tag}>"));
            }
        }
        out.push_str(&escape(piece));
        for (mark, tag) in MARK_TAGS.iter().rev() {
            if marks.contains(*mark) {
                out.push_str(&format!("</{tag}>"));
            }
        }
    }
    for child in &run.nested {
        write_run(out, child);
    }
    out.push_str("</span>");
    if run.line_break {
        out.push_str("<br/>");
    }
}

pub fn parse(markup: &str) -> Result<Body, MarkupError> {
    let mut reader = Reader::from_str(markup);
    reader.trim_text(false);
    let mut parser = Parser::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => parser.open(&e)?,
            Event::Empty(e) => {
                parser.open(&e)?;
                parser.close(&element_name(&e));
            }
            Event::End(e) => parser.close(&e.name().as_ref().to_ascii_lowercase()),
            Event::Text(t) => parser.text(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(parser.finish())
}

fn element_name(e: &BytesStart<'_>) -> Vec<u8> {
    e.name().as_ref().to_ascii_lowercase()
}

fn mark_for(name: &[u8]) -> Option<Marks> {
    match name {
        b"b" | b"strong" => Some(Marks::BOLD),
        b"i" | b"em" => Some(Marks::ITALIC),
        b"u" => Some(Marks::UNDERLINE),
        b"s" | b"strike" | b"del" => Some(Marks::STRIKETHROUGH),
        _ => None,
    }
}

#[derive(Default)]
struct Parser {
    blocks: Vec<Block>,
    current: Option<Block>,
    lists: Vec<ListKind>,
    /// Open spans, innermost last.
    spans: Vec<Run>,
    marks: Vec<Marks>,
}

impl Parser {
    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), MarkupError> {
        let name = element_name(e);
        match name.as_slice() {
            b"p" | b"div" => self.start_block(BlockKind::Paragraph, alignment(e)?),
            b"li" => {
                let kind = self.lists.last().copied().unwrap_or(ListKind::Bullet);
                self.start_block(BlockKind::ListItem(kind), alignment(e)?);
            }
            b"ul" | b"ol" => {
                self.finish_block();
                self.lists.push(if name == b"ol" { ListKind::Numbered } else { ListKind::Bullet });
            }
            b"span" => {
                if self.spans.len() >= FLATTEN_BOUND {
                    return Err(MarkupError::TooDeep { bound: FLATTEN_BOUND });
                }
                let mut layer = None;
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.as_ref() == b"data-layer" {
                        layer = Some(LayerId::new(attr.unescape_value()?.into_owned()));
                    }
                }
                self.ensure_block();
                self.spans.push(Run {
                    layer,
                    ..Run::default()
                });
            }
            b"br" => self.line_break(),
            other => {
                if let Some(mark) = mark_for(other) {
                    self.marks.push(mark);
                }
            }
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"p" | b"div" | b"li" => self.finish_block(),
            b"ul" | b"ol" => {
                self.finish_block();
                self.lists.pop();
            }
            b"span" => {
                if let Some(run) = self.spans.pop() {
                    self.attach(run);
                }
            }
            other => {
                if let Some(mark) = mark_for(other)
                    && let Some(pos) = self.marks.iter().rposition(|m| *m == mark)
                {
                    self.marks.remove(pos);
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        let text: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        if text.is_empty() || (self.current.is_none() && self.spans.is_empty() && text.trim().is_empty()) {
            return;
        }
        let marks = self.marks.iter().fold(Marks::empty(), |acc, m| acc | *m);
        match self.spans.last_mut() {
            Some(span) if span.nested.is_empty() && !span.line_break => append_text(span, &text, marks),
            Some(span) => {
                let mut child = Run::untagged("");
                append_text(&mut child, &text, marks);
                span.nested.push(child);
            }
            None => {
                let mut run = Run::untagged("");
                append_text(&mut run, &text, marks);
                self.attach(run);
            }
        }
    }

    fn line_break(&mut self) {
        if let Some(span) = self.spans.last_mut() {
            span.nested.push(Run::line_break(None));
            return;
        }
        let block = self.ensure_block();
        match block.runs.last_mut() {
            Some(last) if !last.line_break => last.line_break = true,
            _ => block.runs.push(Run::line_break(None)),
        }
    }

    /// Hand a finished run to the enclosing span, or to the current block.
    fn attach(&mut self, run: Run) {
        match self.spans.last_mut() {
            Some(parent) => parent.nested.push(run),
            None => self.ensure_block().runs.push(run),
        }
    }

    fn ensure_block(&mut self) -> &mut Block {
        self.current.get_or_insert_with(|| Block::paragraph(Vec::new()))
    }

    fn start_block(&mut self, kind: BlockKind, align: Option<Alignment>) {
        self.finish_block();
        self.current = Some(Block {
            kind,
            align,
            runs: Vec::new(),
        });
    }

    fn finish_block(&mut self) {
        while let Some(run) = self.spans.pop() {
            self.attach(run);
        }
        if let Some(block) = self.current.take() {
            self.blocks.push(block);
        }
    }

    fn finish(mut self) -> Body {
        self.finish_block();
        Body::from_blocks(self.blocks)
    }
}

fn append_text(run: &mut Run, text: &str, marks: Marks) {
    let shift = run.text.len();
    run.text.push_str(text);
    if !marks.is_empty() {
        run.decoration.append(Decoration::uniform(text.len(), marks), shift);
    }
}

fn alignment(e: &BytesStart<'_>) -> Result<Option<Alignment>, MarkupError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() != b"style" {
            continue;
        }
        let style = attr.unescape_value()?;
        let align = style
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("text-align"))
            .and_then(|(_, value)| Alignment::from_css(value));
        return Ok(align);
    }
    Ok(None)
}
