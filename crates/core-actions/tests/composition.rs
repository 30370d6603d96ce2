mod common;
use common::*;

use core_actions::{Action, CompositionEvent, CursorContext, EditKind, cursor_context};
use core_text::Run;
use pretty_assertions::assert_eq;

fn compose(s: &mut core_state::Session, event: CompositionEvent) -> core_actions::DispatchResult {
    dispatch(s, Action::Composition(event))
}

#[test]
fn committed_text_is_retagged_to_the_active_layer() {
    let mut s = session_with_runs(vec![Run::new(l(DEFAULT), "Hello")]);
    caret(&mut s, 5);
    compose(&mut s, CompositionEvent::Start);
    assert_eq!(cursor_context(&s), CursorContext::InsideComposition);
    compose(&mut s, CompositionEvent::Update("k".into()));
    compose(&mut s, CompositionEvent::Update("\u{304B}".into()));
    // in-progress text lives natively in the host run
    assert_eq!(runs_of(&s), vec![run(DEFAULT, "Hello\u{304B}")]);

    compose(&mut s, CompositionEvent::End("\u{304B}".into()));
    assert!(!s.is_composing());
    assert_eq!(runs_of(&s), vec![run(DEFAULT, "Hello"), run(DIALOGUE, "\u{304B}")]);
    assert_eq!(s.selection().head, 6);
}

#[test]
fn end_text_replaces_a_stale_update() {
    let mut s = session_with_runs(vec![Run::new(l(DEFAULT), "ab")]);
    caret(&mut s, 1);
    compose(&mut s, CompositionEvent::Start);
    compose(&mut s, CompositionEvent::Update("x".into()));
    compose(&mut s, CompositionEvent::End("yz".into()));
    assert_eq!(
        runs_of(&s),
        vec![run(DEFAULT, "a"), run(DIALOGUE, "yz"), run(DEFAULT, "b")]
    );
}

#[test]
fn composing_inside_the_active_layer_keeps_one_run() {
    let mut s = session_with_runs(vec![Run::new(l(DIALOGUE), "ab")]);
    caret(&mut s, 2);
    compose(&mut s, CompositionEvent::Start);
    compose(&mut s, CompositionEvent::Update("c".into()));
    compose(&mut s, CompositionEvent::End("c".into()));
    assert_eq!(runs_of(&s), vec![run(DIALOGUE, "abc")]);
}

#[test]
fn normalization_is_withheld_until_commit() {
    let mut s = empty_session();
    compose(&mut s, CompositionEvent::Start);
    compose(&mut s, CompositionEvent::Update("x".into()));
    assert_eq!(runs_of(&s), vec![(String::new(), "x".to_string(), false)]);
    compose(&mut s, CompositionEvent::End("x".into()));
    assert_eq!(runs_of(&s), vec![run(DIALOGUE, "x")]);
}

#[test]
fn other_actions_are_rejected_while_composing() {
    let mut s = session_with_runs(vec![Run::new(l(DEFAULT), "ab")]);
    caret(&mut s, 2);
    compose(&mut s, CompositionEvent::Start);
    let before = s.body().clone();
    assert!(!dispatch(&mut s, Action::Edit(EditKind::InsertText("z".into()))).dirty);
    assert!(!dispatch(&mut s, Action::Paste("z".into())).dirty);
    assert!(!dispatch(&mut s, Action::Undo).dirty);
    assert_eq!(s.body(), &before);
    // a second start is ignored too
    assert!(!compose(&mut s, CompositionEvent::Start).dirty);
    assert!(s.is_composing());
}

#[test]
fn updates_without_a_composition_are_ignored() {
    let mut s = empty_session();
    assert!(!compose(&mut s, CompositionEvent::Update("x".into())).dirty);
    assert!(!compose(&mut s, CompositionEvent::End("x".into())).dirty);
    assert_eq!(s.body().plain_text(), "");
}

#[test]
fn line_breaks_are_stripped_from_composed_text() {
    let mut s = empty_session();
    compose(&mut s, CompositionEvent::Start);
    compose(&mut s, CompositionEvent::End("a\nb".into()));
    assert_eq!(runs_of(&s), vec![run(DIALOGUE, "ab")]);
}

#[test]
fn commit_offset_before_host_run_skips_retag() {
    let mut s = session_with_runs(vec![Run::new(l(DEFAULT), "ab"), Run::new(l(DESCRIPTION), "cd")]);
    caret(&mut s, 1);
    compose(&mut s, CompositionEvent::Start);
    // a composition window spilling across the run boundary
    if let Some(c) = s.composition_mut() {
        c.len = 2;
    }
    let logs = capture_logs(|| {
        compose(&mut s, CompositionEvent::End("bc".into()));
    });
    assert!(logs.contains("composition_offset_underflow"));
    assert!(!s.is_composing());
    assert_eq!(runs_of(&s), vec![run(DEFAULT, "ab"), run(DESCRIPTION, "cd")]);
}
