//! Decoration and block formatting: primitive first, repair second.

use super::DispatchResult;
use crate::FormatCommand;
use crate::format::{FormatPrimitive, marks_cover, record_provenance, restore_provenance};
use core_state::{Session, SnapshotKind};
use core_text::{BlockKind, anchor_list_items};
use tracing::trace;

pub(crate) fn handle_format(
    cmd: FormatCommand,
    formatter: &dyn FormatPrimitive,
    session: &mut Session,
) -> DispatchResult {
    let range = session.selection().range();
    let active = session.active_layer().clone();
    match cmd {
        FormatCommand::Decoration(marks) => {
            if range.is_empty() || marks.is_empty() {
                return DispatchResult::clean();
            }
            session.push_snapshot(SnapshotKind::Format);
            let provenance = record_provenance(session.body(), range.clone());
            let on = !marks_cover(session.body(), range.clone(), marks);
            formatter.toggle_marks(session.body_mut(), range.clone(), marks, on);
            let fell_back = restore_provenance(session.body_mut(), &provenance, &active);
            session.normalize();
            trace!(target: "actions.dispatch", op = "decoration", marks = marks.bits(), on, fell_back, "format");
            DispatchResult::dirty()
        }
        FormatCommand::Align(align) => {
            session.push_snapshot(SnapshotKind::Format);
            let blocks = session.body_mut().isolate_lines(range);
            formatter.set_alignment(session.body_mut(), blocks.clone(), align);
            session.normalize();
            trace!(target: "actions.dispatch", op = "align", align = align.as_css(), blocks = blocks.len(), "format");
            DispatchResult::structural()
        }
        FormatCommand::List(kind) => {
            session.push_snapshot(SnapshotKind::Format);
            let blocks = session.body_mut().isolate_lines(range);
            let all_listed = session
                .body()
                .blocks()
                .get(blocks.clone())
                .is_some_and(|bs| bs.iter().all(|b| b.kind == BlockKind::ListItem(kind)));
            let target = if all_listed {
                BlockKind::Paragraph
            } else {
                BlockKind::ListItem(kind)
            };
            formatter.set_block_kind(session.body_mut(), blocks.clone(), target);
            let anchored = anchor_list_items(session.body_mut(), &active);
            session.normalize();
            trace!(target: "actions.dispatch", op = "list", listed = !all_listed, blocks = blocks.len(), anchored, "format");
            DispatchResult::structural()
        }
    }
}
