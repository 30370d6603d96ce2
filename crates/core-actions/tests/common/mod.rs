#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{Action, DispatchResult, Dispatcher, EditKind};
use core_layers::{LayerId, LayerRegistry, RegistryOptions};
use core_state::{Selection, Session};
use core_text::{Block, Body, Run};
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;

pub const DEFAULT: &str = "layer-0";
pub const DIALOGUE: &str = "layer-1";
pub const DESCRIPTION: &str = "layer-2";

pub fn l(id: &str) -> LayerId {
    LayerId::from(id)
}

/// Default / Dialogue / Description with Dialogue active.
pub fn registry() -> LayerRegistry {
    LayerRegistry::with_defaults(
        ["Default", "Dialogue", "Description"],
        RegistryOptions::default(),
    )
}

pub fn session_with_runs(runs: Vec<Run>) -> Session {
    Session::new(registry(), Body::from_runs(runs))
}

pub fn session_with_blocks(blocks: Vec<Block>) -> Session {
    Session::new(registry(), Body::from_blocks(blocks))
}

pub fn empty_session() -> Session {
    Session::new(registry(), Body::default())
}

/// (layer, text, ends in break) per top-level run, in order.
pub fn runs_of(session: &Session) -> Vec<(String, String, bool)> {
    session
        .body()
        .runs()
        .map(|r| {
            (
                r.layer.as_ref().map(|id| id.to_string()).unwrap_or_default(),
                r.text.clone(),
                r.line_break,
            )
        })
        .collect()
}

pub fn run(layer: &str, text: &str) -> (String, String, bool) {
    (layer.to_string(), text.to_string(), false)
}

pub fn run_br(layer: &str, text: &str) -> (String, String, bool) {
    (layer.to_string(), text.to_string(), true)
}

pub fn dispatch(session: &mut Session, action: Action) -> DispatchResult {
    Dispatcher::new().dispatch(action, session)
}

pub fn caret(session: &mut Session, at: usize) {
    dispatch(session, Action::SetSelection(Selection::caret(at)));
}

pub fn select(session: &mut Session, anchor: usize, head: usize) {
    dispatch(session, Action::SetSelection(Selection::new(anchor, head)));
}

pub fn type_text(session: &mut Session, text: &str) -> DispatchResult {
    dispatch(session, Action::Edit(EditKind::InsertText(text.to_string())))
}

#[derive(Clone)]
pub struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl BufferWriter {
    pub fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        (Self { inner: buf.clone() }, buf)
    }
}

pub struct LockedWriter<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl<'a> Write for LockedWriter<'a> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for BufferWriter {
    type Writer = LockedWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            guard: self.inner.lock().expect("log buffer poisoned"),
        }
    }
}

/// Run `f` under a TRACE-level subscriber and return everything it logged.
pub fn capture_logs(f: impl FnOnce()) -> String {
    let (writer, buffer) = BufferWriter::new();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_target(true)
        .with_ansi(false)
        .without_time()
        .with_writer(writer)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.lock().expect("log buffer poisoned").clone();
    String::from_utf8(bytes).expect("utf8 log output")
}
