//! Layer registry commands.
//!
//! Unknown ids are no-ops. Deleting the last layer is refused. Deleting any
//! other layer snapshots first and moves its runs to the fallback (first
//! remaining) layer.

use super::DispatchResult;
use crate::LayerCommand;
use core_layers::LayerId;
use core_state::{Session, SnapshotKind};
use tracing::{debug, trace};

pub(crate) fn handle_layer(cmd: &LayerCommand, session: &mut Session) -> DispatchResult {
    match cmd {
        LayerCommand::Add => {
            let id = session.layers_mut().add_layer();
            trace!(target: "actions.dispatch", op = "layer_add", layer = %id, "layer");
            DispatchResult::structural()
        }
        LayerCommand::Delete(id) => delete_layer(id, session),
        LayerCommand::ToggleVisibility(id) => changed(session.layers_mut().toggle_visibility(id)),
        LayerCommand::SetColor(id, color) => changed(session.layers_mut().set_color(id, *color)),
        LayerCommand::Rename(id, name) => changed(session.layers_mut().rename(id, name)),
        LayerCommand::CycleColorMode(id) => {
            changed(session.layers_mut().cycle_color_mode(id).is_some())
        }
        LayerCommand::Activate(id) => {
            if session.active_layer() == id {
                return DispatchResult::clean();
            }
            changed(session.layers_mut().set_active(id))
        }
    }
}

fn changed(applied: bool) -> DispatchResult {
    if applied {
        DispatchResult::dirty()
    } else {
        DispatchResult::clean()
    }
}

fn delete_layer(id: &LayerId, session: &mut Session) -> DispatchResult {
    if !session.layers().contains(id) {
        debug!(target: "actions.dispatch", op = "layer_delete", layer = %id, "unknown_layer");
        return DispatchResult::clean();
    }
    if session.layers().len() == 1 {
        debug!(target: "actions.dispatch", op = "layer_delete", layer = %id, "last_layer_refused");
        return DispatchResult::clean();
    }
    session.push_snapshot(SnapshotKind::LayerChange);
    match session.layers_mut().delete_layer(id) {
        Ok(fallback) => {
            let moved = session.body_mut().reassign_layer(id, Some(&fallback));
            session.normalize();
            trace!(target: "actions.dispatch", op = "layer_delete", layer = %id, fallback = %fallback, moved, "layer");
            DispatchResult::structural()
        }
        Err(err) => {
            debug!(target: "actions.dispatch", op = "layer_delete", error = %err, "layer_delete_refused");
            DispatchResult::clean()
        }
    }
}
