mod common;
use common::*;

use core_actions::{Action, CompositionEvent, LayerCommand};
use core_layers::RegistryOptions;
use core_state::Session;
use core_text::{Body, Run};
use pretty_assertions::assert_eq;

#[test]
fn undo_and_redo_are_symmetric_for_retag() {
    let mut s = session_with_runs(vec![Run::new(l(DEFAULT), "Hello")]);
    select(&mut s, 1, 3);
    dispatch(&mut s, Action::ApplyLayer(l(DESCRIPTION)));
    let retagged = runs_of(&s);
    assert_eq!(retagged.len(), 3);

    assert!(dispatch(&mut s, Action::Undo).structural);
    assert_eq!(runs_of(&s), vec![run(DEFAULT, "Hello")]);
    assert_eq!(s.selection().range(), 1..3);

    assert!(dispatch(&mut s, Action::Redo).structural);
    assert_eq!(runs_of(&s), retagged);
}

#[test]
fn typing_does_not_create_history() {
    let mut s = empty_session();
    type_text(&mut s, "abc");
    dispatch(&mut s, Action::Edit(core_actions::EditKind::Backspace));
    assert_eq!(s.undo_depth(), 0);
    assert!(!dispatch(&mut s, Action::Undo).dirty);
}

#[test]
fn new_snapshot_clears_redo() {
    let mut s = session_with_runs(vec![Run::new(l(DEFAULT), "abc")]);
    select(&mut s, 0, 3);
    dispatch(&mut s, Action::ApplyLayer(l(DESCRIPTION)));
    dispatch(&mut s, Action::Undo);
    assert_eq!(s.redo_depth(), 1);
    caret(&mut s, 3);
    dispatch(&mut s, Action::Paste("!".into()));
    assert_eq!(s.redo_depth(), 0);
    assert!(!dispatch(&mut s, Action::Redo).dirty);
}

#[test]
fn typing_after_undo_clears_redo() {
    let mut s = session_with_runs(vec![Run::new(l(DEFAULT), "abc")]);
    select(&mut s, 0, 3);
    dispatch(&mut s, Action::ApplyLayer(l(DESCRIPTION)));
    dispatch(&mut s, Action::Undo);
    assert_eq!(s.redo_depth(), 1);
    caret(&mut s, 3);
    assert_eq!(s.redo_depth(), 1);
    type_text(&mut s, "XYZ");
    assert_eq!(s.redo_depth(), 0);
    assert_eq!(s.undo_depth(), 0);

    assert!(!dispatch(&mut s, Action::Redo).dirty);
    assert_eq!(s.body().plain_text(), "abcXYZ");
}

#[test]
fn deleting_and_composing_after_undo_clear_redo() {
    let mut s = session_with_runs(vec![Run::new(l(DEFAULT), "abc")]);
    select(&mut s, 0, 3);
    dispatch(&mut s, Action::ApplyLayer(l(DESCRIPTION)));
    dispatch(&mut s, Action::Undo);
    caret(&mut s, 3);
    dispatch(&mut s, Action::Edit(core_actions::EditKind::Backspace));
    assert_eq!(s.redo_depth(), 0);
    assert_eq!(s.body().plain_text(), "ab");

    select(&mut s, 0, 2);
    dispatch(&mut s, Action::ApplyLayer(l(DESCRIPTION)));
    dispatch(&mut s, Action::Undo);
    caret(&mut s, 2);
    dispatch(&mut s, Action::Composition(CompositionEvent::Start));
    dispatch(&mut s, Action::Composition(CompositionEvent::Update("k".into())));
    dispatch(&mut s, Action::Composition(CompositionEvent::End("k".into())));
    assert_eq!(s.redo_depth(), 0);
    assert!(!dispatch(&mut s, Action::Redo).dirty);
    assert_eq!(s.body().plain_text(), "abk");
}

#[test]
fn undo_restores_a_deleted_layer_and_its_runs() {
    let mut s = session_with_runs(vec![Run::new(l(DEFAULT), "a"), Run::new(l(DESCRIPTION), "b")]);
    dispatch(&mut s, Action::Layer(LayerCommand::Delete(l(DESCRIPTION))));
    assert_eq!(runs_of(&s), vec![run(DEFAULT, "ab")]);
    dispatch(&mut s, Action::Undo);
    assert_eq!(s.layers().len(), 3);
    assert!(s.layers().contains(&l(DESCRIPTION)));
    assert_eq!(runs_of(&s), vec![run(DEFAULT, "a"), run(DESCRIPTION, "b")]);
}

#[test]
fn history_is_capped() {
    let mut s = Session::with_history_limit(
        registry(),
        Body::from_runs(vec![Run::new(l(DEFAULT), "abc")]),
        3,
    );
    select(&mut s, 0, 3);
    for i in 0..5 {
        let layer = if i % 2 == 0 { DESCRIPTION } else { DEFAULT };
        dispatch(&mut s, Action::ApplyLayer(l(layer)));
    }
    assert_eq!(s.undo_depth(), 3);
    let mut undone = 0;
    while dispatch(&mut s, Action::Undo).dirty {
        undone += 1;
    }
    assert_eq!(undone, 3);
}

#[test]
fn identical_snapshots_are_skipped() {
    let mut s = session_with_runs(vec![Run::new(l(DEFAULT), "abc")]);
    select(&mut s, 0, 3);
    dispatch(&mut s, Action::ApplyLayer(l(DEFAULT)));
    dispatch(&mut s, Action::ApplyLayer(l(DEFAULT)));
    assert_eq!(s.undo_depth(), 1);
    assert_eq!(s.undo_snapshots_skipped(), 1);
}

#[test]
fn registry_options_survive_undo() {
    let options = RegistryOptions {
        label_prefix: "Channel".into(),
        ..RegistryOptions::default()
    };
    let layers = core_layers::LayerRegistry::with_defaults(["A", "B", "C"], options);
    let mut s = Session::new(layers, Body::from_runs(vec![Run::new(l(DEFAULT), "x")]));
    dispatch(&mut s, Action::Layer(LayerCommand::Delete(l(DESCRIPTION))));
    dispatch(&mut s, Action::Undo);
    dispatch(&mut s, Action::Layer(LayerCommand::Add));
    assert_eq!(s.layers().active().name, "Channel 4");
}
