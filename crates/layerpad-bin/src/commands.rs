//! Subcommands: each opens at most one memo, applies actions and lets the caller flush.

use anyhow::{Result, bail};
use clap::{Subcommand, ValueEnum};
use core_actions::{Action, Dispatcher, LayerCommand};
use core_layers::{DisplayMode, LayerId};
use core_model::{DocumentStore, Workbench};
use core_state::{Selection, Session};
use core_text::PLACEHOLDER;
use std::io::{Read, Write};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Keep,
    Collapse,
}

impl From<ModeArg> for DisplayMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Keep => DisplayMode::Keep,
            ModeArg::Collapse => DisplayMode::Collapse,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create an empty memo and print its id.
    New {
        #[arg(long, default_value = "")]
        title: String,
    },
    /// List memos, most recently updated first.
    List,
    /// Print a memo with layer colors.
    Show {
        id: String,
        /// Hidden-layer policy (defaults to `[display] mode`).
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Print plain text without colors.
        #[arg(long)]
        plain: bool,
    },
    /// Print character and word counts.
    Stats { id: String },
    /// Paste text (argument or stdin) into a memo.
    Paste {
        id: String,
        text: Option<String>,
        /// Layer receiving the text (defaults to the memo's active layer).
        #[arg(long)]
        layer: Option<String>,
        /// Caret position (defaults to the end of the memo).
        #[arg(long)]
        at: Option<usize>,
    },
    /// Move the range `[start, end)` to a layer.
    Retag {
        id: String,
        start: usize,
        end: usize,
        layer: String,
    },
    /// Print a memo's layers; the active one is starred.
    Layers { id: String },
    /// Delete a memo.
    Delete { id: String },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::New { .. } => "new",
            Command::List => "list",
            Command::Show { .. } => "show",
            Command::Stats { .. } => "stats",
            Command::Paste { .. } => "paste",
            Command::Retag { .. } => "retag",
            Command::Layers { .. } => "layers",
            Command::Delete { .. } => "delete",
        }
    }
}

pub fn execute<S: DocumentStore>(
    workbench: &mut Workbench<S>,
    command: Command,
    display: DisplayMode,
    out: &mut dyn Write,
) -> Result<()> {
    let dispatcher = Dispatcher::new();
    match command {
        Command::New { title } => {
            let id = workbench.create(&title)?;
            writeln!(out, "{id}")?;
        }
        Command::List => {
            for doc in workbench.list()? {
                writeln!(out, "{}\t{}\t{}", doc.id, doc.updated_at, doc.title)?;
            }
        }
        Command::Show { id, mode, plain } => {
            workbench.open(&id)?;
            let session = open_session(workbench)?;
            if plain {
                writeln!(out, "{}", session.body().plain_text().replace(PLACEHOLDER, ""))?;
            } else {
                let mode = mode.map(DisplayMode::from).unwrap_or(display);
                write!(out, "{}", core_render::preview_string(session.body(), session.layers(), mode)?)?;
            }
        }
        Command::Stats { id } => {
            workbench.open(&id)?;
            let stats = open_session(workbench)?.stats();
            writeln!(out, "chars\t{}\nwords\t{}", stats.chars, stats.words)?;
        }
        Command::Paste { id, text, layer, at } => {
            let text = match text {
                Some(t) => t,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            workbench.open(&id)?;
            if let Some(layer) = layer {
                let layer = known_layer(open_session(workbench)?, &layer)?;
                workbench.apply(&dispatcher, Action::Layer(LayerCommand::Activate(layer)))?;
            }
            let end = open_session(workbench)?.body().char_len();
            let caret = at.unwrap_or(end).min(end);
            workbench.apply(&dispatcher, Action::SetSelection(Selection::caret(caret)))?;
            let result = workbench.apply(&dispatcher, Action::Paste(text))?;
            debug!(target: "runtime.cli", dirty = result.dirty, caret, "paste_applied");
            workbench.save()?;
        }
        Command::Retag { id, start, end, layer } => {
            workbench.open(&id)?;
            let layer = known_layer(open_session(workbench)?, &layer)?;
            workbench.apply(&dispatcher, Action::SetSelection(Selection::new(start, end)))?;
            let result = workbench.apply(&dispatcher, Action::ApplyLayer(layer))?;
            if !result.dirty {
                writeln!(out, "nothing to retag")?;
            }
            workbench.save()?;
        }
        Command::Layers { id } => {
            workbench.open(&id)?;
            let session = open_session(workbench)?;
            for layer in session.layers().layers() {
                let marker = if &layer.id == session.active_layer() { "*" } else { " " };
                let shown = if layer.visible { "visible" } else { "hidden" };
                writeln!(out, "{marker} {}\t{}\t{}\t{shown}", layer.id, layer.name, layer.color)?;
            }
        }
        Command::Delete { id } => {
            if !workbench.delete(&id)? {
                bail!("no memo with id `{id}`");
            }
        }
    }
    Ok(())
}

fn open_session<S: DocumentStore>(workbench: &Workbench<S>) -> Result<&Session> {
    workbench
        .session()
        .ok_or_else(|| core_model::ModelError::NoOpenDocument.into())
}

fn known_layer(session: &Session, id: &str) -> Result<LayerId> {
    let id = LayerId::from(id);
    if !session.layers().contains(&id) {
        bail!("unknown layer `{id}`");
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::{MemoryStore, WorkbenchOptions};
    use pretty_assertions::assert_eq;

    fn run(wb: &mut Workbench<MemoryStore>, command: Command) -> Result<String> {
        let mut out = Vec::new();
        execute(wb, command, DisplayMode::Keep, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn workbench_with_memo() -> (Workbench<MemoryStore>, String) {
        let mut wb = Workbench::new(MemoryStore::new(), WorkbenchOptions::default());
        let id = run(&mut wb, Command::New { title: "t".into() }).unwrap().trim().to_string();
        (wb, id)
    }

    fn paste(id: &str, text: &str, layer: Option<&str>) -> Command {
        Command::Paste {
            id: id.to_string(),
            text: Some(text.to_string()),
            layer: layer.map(str::to_string),
            at: None,
        }
    }

    #[test]
    fn new_prints_a_memo_id() {
        let (wb, id) = workbench_with_memo();
        assert!(id.starts_with("memo-"));
        assert_eq!(wb.current().unwrap().id, id);
    }

    #[test]
    fn paste_then_show_and_stats() {
        let (mut wb, id) = workbench_with_memo();
        run(&mut wb, paste(&id, "line1\nline2", Some("layer-2"))).unwrap();

        let plain = run(&mut wb, Command::Show { id: id.clone(), mode: None, plain: true }).unwrap();
        assert_eq!(plain, "line1\nline2\n");
        let stats = run(&mut wb, Command::Stats { id: id.clone() }).unwrap();
        assert_eq!(stats, "chars\t10\nwords\t2\n");

        let stored = wb.store().load(&id).unwrap().unwrap();
        assert_eq!(stored.active_layer_id.as_str(), "layer-2");
        assert!(stored.content.contains("data-layer=\"layer-2\">line1</span><br/>"));
    }

    #[test]
    fn retag_moves_the_range_and_persists() {
        let (mut wb, id) = workbench_with_memo();
        run(&mut wb, paste(&id, "Hello world", None)).unwrap();
        let out = run(
            &mut wb,
            Command::Retag { id: id.clone(), start: 0, end: 5, layer: "layer-0".into() },
        )
        .unwrap();
        assert_eq!(out, "");
        let session = wb.session().unwrap();
        let first = session.body().runs().next().unwrap();
        assert_eq!(first.layer.as_ref().map(LayerId::as_str), Some("layer-0"));
        assert_eq!(first.text, "Hello");
        let stored = wb.store().load(&id).unwrap().unwrap();
        assert!(stored.content.contains("data-layer=\"layer-0\">Hello</span>"));
    }

    #[test]
    fn unknown_layers_are_reported() {
        let (mut wb, id) = workbench_with_memo();
        let err = run(&mut wb, paste(&id, "x", Some("layer-9"))).unwrap_err();
        assert!(err.to_string().contains("unknown layer `layer-9`"));
        let err = run(
            &mut wb,
            Command::Retag { id, start: 0, end: 1, layer: "nope".into() },
        )
        .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn layers_lists_active_with_star() {
        let (mut wb, id) = workbench_with_memo();
        let out = run(&mut wb, Command::Layers { id }).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  layer-0\tDefault\t#94a3b8"));
        assert!(lines[1].starts_with("* layer-1\tDialogue"));
    }

    #[test]
    fn list_and_delete() {
        let (mut wb, id) = workbench_with_memo();
        let listed = run(&mut wb, Command::List).unwrap();
        assert!(listed.starts_with(&format!("{id}\t")));
        assert!(listed.trim_end().ends_with("\tt"));
        run(&mut wb, Command::Delete { id: id.clone() }).unwrap();
        assert_eq!(run(&mut wb, Command::List).unwrap(), "");
        assert!(run(&mut wb, Command::Delete { id }).is_err());
    }

    #[test]
    fn show_renders_colors_by_default() {
        let (mut wb, id) = workbench_with_memo();
        run(&mut wb, paste(&id, "hey", None)).unwrap();
        let out = run(&mut wb, Command::Show { id, mode: Some(ModeArg::Collapse), plain: false }).unwrap();
        assert!(out.contains("\x1b["));
        assert!(out.contains("hey"));
    }
}
