//! Paste and cut.
//!
//! Pasted text is plain (clipboard formatting is discarded): each line becomes
//! an active-layer run, lines separated by breaks. Both operations snapshot.

use super::DispatchResult;
use super::edit::drop_placeholder_at;
use core_state::{Session, SnapshotKind};
use core_text::{PLACEHOLDER, Run, normalize_input};
use tracing::trace;

pub(crate) fn handle_paste(raw: &str, session: &mut Session) -> DispatchResult {
    let text = normalize_input(raw);
    let range = session.selection().range();
    if text.is_empty() && range.is_empty() {
        return DispatchResult::clean();
    }
    session.push_snapshot(SnapshotKind::Paste);
    if !range.is_empty() {
        session.body_mut().remove_range(range.clone());
        session.set_caret(range.start);
    }

    let active = session.active_layer().clone();
    let lines = text.split('\n').collect::<Vec<_>>();
    let last = lines.len() - 1;
    let runs = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let run = Run::new(active.clone(), *line);
            if i < last { run.with_break() } else { run }
        })
        .collect::<Vec<_>>();

    let caret = session.selection().head;
    let at = drop_placeholder_at(session, caret);
    let end = session.body_mut().insert_runs(at, runs);
    session.set_caret(end);
    session.normalize();
    trace!(target: "actions.dispatch", op = "paste", lines = lines.len(), chars = text.chars().count(), "paste");
    if lines.len() > 1 {
        DispatchResult::structural()
    } else {
        DispatchResult::dirty()
    }
}

pub(crate) fn handle_cut(session: &mut Session) -> DispatchResult {
    let range = session.selection().range();
    if range.is_empty() {
        return DispatchResult::clean();
    }
    session.push_snapshot(SnapshotKind::Cut);
    let text = session
        .body()
        .text_in(range.clone())
        .replace(PLACEHOLDER, "");
    session.body_mut().remove_range(range.clone());
    session.set_caret(range.start);
    session.normalize();
    trace!(target: "actions.dispatch", op = "cut", start = range.start, end = range.end, "cut");
    let result = if text.contains('\n') {
        DispatchResult::structural()
    } else {
        DispatchResult::dirty()
    };
    result.with_clipboard(text)
}
