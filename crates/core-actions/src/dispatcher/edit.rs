//! Typing, deletion and newline.
//!
//! Typed text always belongs to the active layer:
//! * caret inside an active-layer run: inserted in place (a lone placeholder
//!   is replaced rather than kept next to the text);
//! * caret inside another layer's run: the run is split and the text becomes
//!   a new active-layer run between the halves (a placeholder of that layer
//!   is dropped first);
//! * caret outside any run: the text is wrapped in a new active-layer run.
//!
//! None of these snapshot history.

use super::DispatchResult;
use crate::context::{CursorContext, cursor_context};
use crate::EditKind;
use core_state::Session;
use core_text::segment::{next_boundary, prev_boundary};
use core_text::{BlockKind, Decoration, Run, anchor_list_items, normalize_input};
use tracing::trace;

pub(crate) fn handle_edit(kind: &EditKind, session: &mut Session) -> DispatchResult {
    match kind {
        EditKind::InsertText(text) => insert_text(text, session),
        EditKind::Backspace => delete_step(session, false),
        EditKind::DeleteForward => delete_step(session, true),
        EditKind::Newline => {
            delete_selection(session);
            newline(session);
            session.normalize();
            DispatchResult::structural()
        }
    }
}

fn insert_text(raw: &str, session: &mut Session) -> DispatchResult {
    let text = normalize_input(raw);
    if text.is_empty() {
        return DispatchResult::clean();
    }
    delete_selection(session);
    let mut lines = 0;
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            newline(session);
            session.normalize();
            lines += 1;
        }
        if !line.is_empty() {
            insert_segment(line, session);
        }
    }
    session.normalize();
    if lines > 0 {
        DispatchResult::structural()
    } else {
        DispatchResult::dirty()
    }
}

/// Insert single-line `text` at the caret per the caret context.
fn insert_segment(text: &str, session: &mut Session) {
    let caret = session.selection().head;
    let len = text.chars().count();
    let active = session.active_layer().clone();
    let context = cursor_context(session);
    let new_caret = match context {
        CursorContext::InsideActiveRun => match session.body_mut().run_at_mut(caret) {
            Some((run, offset)) if run.is_placeholder() => {
                run.text = text.to_string();
                run.decoration = Decoration::default();
                caret - offset + len
            }
            Some((run, offset)) => {
                run.insert_str(offset, text);
                caret + len
            }
            None => caret,
        },
        CursorContext::InsideOtherRun | CursorContext::OutsideAnyRun => {
            let at = drop_placeholder_at(session, caret);
            session
                .body_mut()
                .insert_runs(at, vec![Run::new(active, text)])
        }
        CursorContext::InsideComposition => caret,
    };
    trace!(target: "actions.dispatch", op = "insert_text", ?context, caret, to = new_caret, "edit");
    session.set_caret(new_caret);
}

/// If the caret sits on a placeholder run, empty it so it cannot linger next to
/// inserted text. Returns the caret adjusted for the removed character.
pub(super) fn drop_placeholder_at(session: &mut Session, caret: usize) -> usize {
    match session.body_mut().run_at_mut(caret) {
        Some((run, offset)) if run.is_placeholder() => {
            run.text.clear();
            run.decoration = Decoration::default();
            caret - offset
        }
        _ => caret,
    }
}

/// Remove a non-empty selection, leaving the caret at its start.
pub(super) fn delete_selection(session: &mut Session) -> bool {
    let range = session.selection().range();
    if range.is_empty() {
        return false;
    }
    session.body_mut().remove_range(range.clone());
    session.set_caret(range.start);
    true
}

fn delete_step(session: &mut Session, forward: bool) -> DispatchResult {
    let op = if forward { "delete_forward" } else { "backspace" };
    let selection = session.selection();
    let range = if selection.is_collapsed() {
        let plain = session.body().plain_text();
        let caret = selection.head;
        if forward {
            caret..next_boundary(&plain, caret)
        } else {
            prev_boundary(&plain, caret)..caret
        }
    } else {
        selection.range()
    };
    if range.is_empty() {
        return DispatchResult::clean();
    }
    let joins_lines = session.body().text_in(range.clone()).contains('\n');
    session.body_mut().remove_range(range.clone());
    session.set_caret(range.start);
    session.normalize();
    trace!(target: "actions.dispatch", op, start = range.start, end = range.end, joins_lines, "edit");
    if joins_lines {
        DispatchResult::structural()
    } else {
        DispatchResult::dirty()
    }
}

/// Line/paragraph break at the caret. Leaves normalization to the caller.
///
/// The new line continues the host run's layer (the active layer outside any
/// run). A placeholder anchors it only when nothing follows on that line.
fn newline(session: &mut Session) {
    let caret = session.selection().head;
    let host = session
        .body()
        .run_at(caret)
        .and_then(|(_, run, _)| run.layer.clone())
        .unwrap_or_else(|| session.active_layer().clone());
    let pos = session.body().resolve(caret);
    let block = &session.body().blocks()[pos.block];

    if block.is_list_item() {
        if block.is_blank() {
            session.body_mut().blocks_mut()[pos.block].kind = BlockKind::Paragraph;
            trace!(target: "actions.dispatch", op = "newline", block = pos.block, "list_exit");
            return;
        }
        let new_block = session.body_mut().split_block_at(caret);
        anchor_list_items(session.body_mut(), &host);
        let start = session.body().offset_of(core_text::TextPosition {
            block: new_block,
            offset: 0,
        });
        trace!(target: "actions.dispatch", op = "newline", block = new_block, "list_split");
        session.set_caret(start);
        return;
    }

    let block = &mut session.body_mut().blocks_mut()[pos.block];
    let at = block.split_run_at(pos.offset);
    let anchored = !line_has_text(&block.runs[at..]);
    if anchored {
        block.runs.splice(
            at..at,
            [Run::line_break(Some(host.clone())), Run::placeholder(host)],
        );
    } else {
        block.runs.insert(at, Run::line_break(Some(host)));
    }
    trace!(target: "actions.dispatch", op = "newline", caret, anchored, "line_break");
    session.set_caret(caret + 1);
}

/// Whether the line starting at `runs[0]` carries visible text before its break.
fn line_has_text(runs: &[Run]) -> bool {
    for run in runs {
        if !run.text.is_empty() && !run.is_placeholder() {
            return true;
        }
        if run.line_break {
            return false;
        }
    }
    false
}
