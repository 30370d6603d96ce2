//! Undo / Redo handling.

use super::DispatchResult;
use core_state::Session;

pub(crate) fn handle_undo(session: &mut Session) -> DispatchResult {
    if session.undo() {
        tracing::trace!(target: "actions.dispatch", op = "undo", undo_depth = session.undo_depth(), redo_depth = session.redo_depth(), "undo");
        DispatchResult::structural()
    } else {
        DispatchResult::clean()
    }
}

pub(crate) fn handle_redo(session: &mut Session) -> DispatchResult {
    if session.redo() {
        tracing::trace!(target: "actions.dispatch", op = "redo", undo_depth = session.undo_depth(), redo_depth = session.redo_depth(), "redo");
        DispatchResult::structural()
    } else {
        DispatchResult::clean()
    }
}
