//! Composed (IME) input.
//!
//! Between `Start` and `End` the in-progress string lives natively inside the
//! host run and normalization is withheld. On commit the composed substring is
//! located by offset arithmetic (`commit - len .. commit`) inside the host run
//! and retagged to the active layer like typed text. If that start would fall
//! before the host run (the composition spilled across runs) the retag is
//! skipped and only normalization runs.

use super::DispatchResult;
use super::edit::delete_selection;
use crate::CompositionEvent;
use core_state::{Composition, Session};
use core_text::normalize_input;
use tracing::{debug, trace};

pub(crate) fn handle_composition(event: &CompositionEvent, session: &mut Session) -> DispatchResult {
    match event {
        CompositionEvent::Start => {
            if session.is_composing() {
                return DispatchResult::clean();
            }
            delete_selection(session);
            session.begin_composition();
            DispatchResult::dirty()
        }
        CompositionEvent::Update(text) => {
            let Some(comp) = session.composition() else {
                debug!(target: "actions.dispatch", op = "composition_update", "no_active_composition");
                return DispatchResult::clean();
            };
            replace_composed(session, comp, &single_line(text));
            DispatchResult::dirty()
        }
        CompositionEvent::End(text) => {
            let Some(comp) = session.composition() else {
                debug!(target: "actions.dispatch", op = "composition_end", "no_active_composition");
                return DispatchResult::clean();
            };
            let text = single_line(text);
            let current = session.body().text_in(comp.start..comp.start + comp.len);
            let comp = if current == text {
                comp
            } else {
                replace_composed(session, comp, &text)
            };
            session.end_composition();
            commit(session, comp.start + comp.len, text.chars().count());
            session.normalize();
            DispatchResult::dirty()
        }
    }
}

/// Composed input never carries line breaks.
fn single_line(text: &str) -> String {
    normalize_input(text).replace('\n', "")
}

fn replace_composed(session: &mut Session, comp: Composition, text: &str) -> Composition {
    let body = session.body_mut();
    body.remove_range(comp.start..comp.start + comp.len);
    if !text.is_empty() {
        body.insert_native(comp.start, text);
    }
    let len = text.chars().count();
    if let Some(c) = session.composition_mut() {
        c.len = len;
    }
    session.set_caret(comp.start + len);
    Composition {
        start: comp.start,
        len,
    }
}

fn commit(session: &mut Session, commit_offset: usize, composed_len: usize) {
    if composed_len == 0 {
        return;
    }
    let active = session.active_layer().clone();
    let Some((_, run, offset)) = session.body().run_at(commit_offset) else {
        return;
    };
    if offset.checked_sub(composed_len).is_none() {
        debug!(target: "actions.dispatch", op = "composition_end", offset, composed_len, "composition_offset_underflow");
        return;
    }
    if run.layer.as_ref() == Some(&active) {
        return;
    }
    let start = commit_offset - composed_len;
    session
        .body_mut()
        .retag_range(start..commit_offset, &active);
    trace!(target: "actions.dispatch", op = "composition_end", start, end = commit_offset, "composition_retagged");
}
