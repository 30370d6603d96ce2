//! Caret context: the implicit state deciding how typed text is placed.

use core_state::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorContext {
    /// No run to attach to (empty line, block start, untagged text).
    OutsideAnyRun,
    InsideActiveRun,
    InsideOtherRun,
    InsideComposition,
}

pub fn cursor_context(session: &Session) -> CursorContext {
    if session.is_composing() {
        return CursorContext::InsideComposition;
    }
    match session.body().run_at(session.selection().head) {
        Some((_, run, _)) => match &run.layer {
            Some(layer) if layer == session.active_layer() => CursorContext::InsideActiveRun,
            Some(_) => CursorContext::InsideOtherRun,
            None => CursorContext::OutsideAnyRun,
        },
        None => CursorContext::OutsideAnyRun,
    }
}
