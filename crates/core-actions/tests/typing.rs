mod common;
use common::*;

use core_actions::{CursorContext, cursor_context};
use core_text::{PLACEHOLDER, Run};
use pretty_assertions::assert_eq;

#[test]
fn typing_inside_an_active_run_extends_it() {
    let mut s = session_with_runs(vec![Run::new(l(DIALOGUE), "ab")]);
    caret(&mut s, 2);
    assert_eq!(cursor_context(&s), CursorContext::InsideActiveRun);
    type_text(&mut s, "c");
    caret(&mut s, 0);
    type_text(&mut s, ">");
    assert_eq!(runs_of(&s), vec![run(DIALOGUE, ">abc")]);
}

#[test]
fn caret_between_runs_belongs_to_the_left_run() {
    let mut s = session_with_runs(vec![Run::new(l(DEFAULT), "ab"), Run::new(l(DIALOGUE), "cd")]);
    caret(&mut s, 2);
    assert_eq!(cursor_context(&s), CursorContext::InsideOtherRun);
    type_text(&mut s, "x");
    assert_eq!(runs_of(&s), vec![run(DEFAULT, "ab"), run(DIALOGUE, "xcd")]);
}

#[test]
fn active_placeholder_is_replaced_not_kept() {
    let mut s = session_with_runs(vec![Run::placeholder(l(DIALOGUE))]);
    caret(&mut s, 0);
    type_text(&mut s, "x");
    assert_eq!(runs_of(&s), vec![run(DIALOGUE, "x")]);
    assert_eq!(s.selection().head, 1);
}

#[test]
fn foreign_placeholder_is_dropped_before_inserting() {
    let mut s = session_with_runs(vec![Run::placeholder(l(DEFAULT))]);
    caret(&mut s, 1);
    type_text(&mut s, "x");
    assert_eq!(runs_of(&s), vec![run(DIALOGUE, "x")]);
    assert!(!s.body().plain_text().contains(PLACEHOLDER));
    assert_eq!(s.selection().head, 1);
}

#[test]
fn selection_is_replaced_by_typed_text() {
    let mut s = session_with_runs(vec![Run::new(l(DEFAULT), "Hello world")]);
    select(&mut s, 6, 11);
    type_text(&mut s, "there");
    assert_eq!(runs_of(&s), vec![run(DEFAULT, "Hello "), run(DIALOGUE, "there")]);
    assert!(s.selection().is_collapsed());
    assert_eq!(s.selection().head, 11);
}

#[test]
fn typed_line_breaks_split_lines_in_the_host_layer() {
    let mut s = empty_session();
    let result = type_text(&mut s, "a\nb");
    assert!(result.structural);
    assert_eq!(runs_of(&s), vec![run_br(DIALOGUE, "a"), run(DIALOGUE, "b")]);
    assert_eq!(s.selection().head, 3);
}

#[test]
fn decomposed_input_is_stored_composed() {
    let mut s = empty_session();
    type_text(&mut s, "e\u{0301}");
    assert_eq!(s.body().plain_text(), "\u{00E9}");
    assert_eq!(s.selection().head, 1);
}

#[test]
fn empty_input_is_a_no_op() {
    let mut s = empty_session();
    assert!(!type_text(&mut s, "").dirty);
    assert!(!s.dirty);
}

#[test]
fn untagged_host_counts_as_outside_any_run() {
    let mut s = empty_session();
    s.body_mut().insert_native(0, "raw");
    caret(&mut s, 1);
    assert_eq!(cursor_context(&s), CursorContext::OutsideAnyRun);
}

#[test]
fn statistics_follow_edits() {
    let mut s = empty_session();
    type_text(&mut s, "two words");
    assert_eq!(s.stats().words, 2);
    assert_eq!(s.stats().chars, 9);
}
