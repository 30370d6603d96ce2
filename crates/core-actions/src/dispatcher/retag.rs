//! Layer reassignment of the selection.

use super::DispatchResult;
use core_layers::LayerId;
use core_state::{Session, SnapshotKind};
use tracing::{debug, trace};

/// Every character in the selection ends up owned by `layer`; interior
/// subdivisions are discarded and embedded breaks stay where they are.
pub(crate) fn handle_apply_layer(layer: &LayerId, session: &mut Session) -> DispatchResult {
    if !session.layers().contains(layer) {
        debug!(target: "actions.dispatch", op = "apply_layer", layer = %layer, "unknown_layer");
        return DispatchResult::clean();
    }
    let range = session.selection().range();
    if range.is_empty() {
        return DispatchResult::clean();
    }
    session.push_snapshot(SnapshotKind::Retag);
    let touched = session.body_mut().retag_range(range.clone(), layer);
    let report = session.normalize();
    trace!(target: "actions.dispatch", op = "apply_layer", layer = %layer, start = range.start, end = range.end, touched, merged = report.merged, "retag");
    DispatchResult::dirty()
}
