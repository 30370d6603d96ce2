//! Property tests for the normalizer and range retagging over random bodies.

use core_layers::LayerId;
use core_text::{Block, Body, ListKind, PLACEHOLDER, Run, normalize};
use proptest::prelude::*;

fn layer() -> impl Strategy<Value = Option<LayerId>> {
    prop_oneof![
        Just(None),
        Just(Some(LayerId::from("a"))),
        Just(Some(LayerId::from("b"))),
        Just(Some(LayerId::from("c"))),
    ]
}

fn flat_run(text: &'static str) -> impl Strategy<Value = Run> {
    (layer(), text, any::<bool>()).prop_map(|(layer, text, line_break)| Run {
        layer,
        text,
        line_break,
        ..Run::default()
    })
}

/// Runs with untagged, empty, placeholder and nested shapes mixed in.
fn messy_run() -> impl Strategy<Value = Run> {
    flat_run("[ab \u{200B}]{0,4}").prop_recursive(3, 16, 4, |inner| {
        (layer(), "[ab]{0,2}", any::<bool>(), prop::collection::vec(inner, 1..4)).prop_map(
            |(layer, text, line_break, nested)| Run {
                layer,
                text,
                line_break,
                nested,
                ..Run::default()
            },
        )
    })
}

fn block_of(runs: impl Strategy<Value = Vec<Run>>) -> impl Strategy<Value = Block> {
    (runs, any::<bool>()).prop_map(|(runs, list)| {
        if list {
            Block::list_item(ListKind::Bullet, runs)
        } else {
            Block::paragraph(runs)
        }
    })
}

fn messy_body() -> impl Strategy<Value = Body> {
    prop::collection::vec(block_of(prop::collection::vec(messy_run(), 0..6)), 1..4)
        .prop_map(Body::from_blocks)
}

/// Placeholder-free, unnested bodies: normalizing them never shifts positions.
fn plain_body() -> impl Strategy<Value = Body> {
    prop::collection::vec(block_of(prop::collection::vec(flat_run("[ab ]{1,4}"), 0..6)), 1..4)
        .prop_map(Body::from_blocks)
}

fn active() -> LayerId {
    LayerId::from("a")
}

fn visible_text(body: &Body) -> String {
    body.plain_text().replace(PLACEHOLDER, "")
}

/// Owning layer of each position; `None` for breaks and block boundaries.
fn owners(body: &Body) -> Vec<Option<LayerId>> {
    let mut out = Vec::new();
    for (i, block) in body.blocks().iter().enumerate() {
        if i > 0 {
            out.push(None);
        }
        for run in &block.runs {
            out.extend(run.text.chars().map(|_| run.layer.clone()));
            if run.line_break {
                out.push(None);
            }
        }
    }
    out
}

proptest! {
    #[test]
    fn normalizing_twice_equals_once(mut body in messy_body()) {
        normalize(&mut body, &active());
        let once = body.clone();
        let report = normalize(&mut body, &active());
        prop_assert!(!report.changed());
        prop_assert_eq!(body, once);
    }

    #[test]
    fn normalized_bodies_are_well_formed(mut body in messy_body()) {
        let before = visible_text(&body);
        normalize(&mut body, &active());
        for block in body.blocks() {
            for run in &block.runs {
                prop_assert!(run.layer.is_some());
                prop_assert!(!run.is_nested());
                prop_assert!(!run.is_empty());
            }
            for pair in block.runs.windows(2) {
                prop_assert!(pair[0].line_break || pair[0].layer != pair[1].layer);
            }
        }
        prop_assert_eq!(visible_text(&body), before);
    }

    #[test]
    fn retag_gives_every_character_to_the_target(
        mut body in plain_body(),
        a in 0usize..40,
        b in 0usize..40,
    ) {
        normalize(&mut body, &active());
        let len = body.char_len();
        let (start, end) = (a.min(b).min(len), a.max(b).min(len));
        let target = LayerId::from("c");
        body.retag_range(start..end, &target);
        normalize(&mut body, &active());
        let owners = owners(&body);
        prop_assert_eq!(owners.len(), len);
        for owner in owners[start..end].iter().flatten() {
            prop_assert_eq!(owner, &target);
        }
    }
}
