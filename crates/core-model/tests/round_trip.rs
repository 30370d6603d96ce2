use core_layers::{LayerId, LayerRegistry, RegistryOptions};
use core_model::StoredDocument;
use core_model::markup::{parse, serialize};
use core_state::Session;
use core_text::{Alignment, Block, BlockKind, Body, Decoration, ListKind, Marks, Run, normalize};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const LAYERS: [&str; 3] = ["layer-0", "layer-1", "layer-2"];

fn arb_run() -> impl Strategy<Value = Run> {
    (0..LAYERS.len(), "[a-z <&\"]{0,6}", any::<bool>(), 0u8..16).prop_map(|(layer, text, br, marks)| {
        let marks = Marks::from_bits_truncate(marks);
        let len = text.len();
        let mut run = Run::new(LayerId::from(LAYERS[layer]), text).with_decoration(Decoration::uniform(len, marks));
        run.line_break = br;
        run
    })
}

fn arb_block() -> impl Strategy<Value = Block> {
    let kind = prop_oneof![
        Just(BlockKind::Paragraph),
        Just(BlockKind::ListItem(ListKind::Bullet)),
        Just(BlockKind::ListItem(ListKind::Numbered)),
    ];
    let align = prop_oneof![
        Just(None),
        Just(Some(Alignment::Center)),
        Just(Some(Alignment::Right)),
    ];
    (kind, align, prop::collection::vec(arb_run(), 0..5)).prop_map(|(kind, align, runs)| Block { kind, align, runs })
}

fn arb_body() -> impl Strategy<Value = Body> {
    prop::collection::vec(arb_block(), 1..5).prop_map(|blocks| {
        let mut body = Body::from_blocks(blocks);
        normalize(&mut body, &LayerId::from("layer-1"));
        body
    })
}

proptest! {
    #[test]
    fn normalized_bodies_survive_markup(body in arb_body()) {
        let markup = serialize(&body);
        let parsed = parse(&markup).unwrap();
        prop_assert_eq!(parsed, body);
    }

    #[test]
    fn stored_documents_survive_json(body in arb_body(), title in "[A-Za-z ]{0,12}") {
        let registry = LayerRegistry::with_defaults(["Default", "Dialogue", "Description"], RegistryOptions::default());
        let mut doc = StoredDocument::new("memo-1", &title, &registry, 5);
        let session = Session::new(registry.clone(), body.clone());
        doc.capture(&session, 6);

        let json = serde_json::to_string(&doc).unwrap();
        let back: StoredDocument = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(&back.title, &doc.title);
        prop_assert_eq!(back.body().unwrap(), session.body().clone());
        let restored = back.registry(RegistryOptions::default()).unwrap();
        prop_assert_eq!(restored.layers(), registry.layers());
        prop_assert_eq!(restored.active_id(), registry.active_id());
    }
}

#[test]
fn markup_from_a_foreign_editor_is_repaired_on_open() {
    let markup = "<p>lead <span data-layer=\"layer-0\">a<span data-layer=\"layer-2\">b</span>c</span></p>";
    let registry = LayerRegistry::with_defaults(["Default", "Dialogue", "Description"], RegistryOptions::default());
    let session = Session::open(registry, parse(markup).unwrap(), 50);
    let runs: Vec<_> = session
        .body()
        .runs()
        .map(|r| (r.layer.as_ref().map(|l| l.as_str().to_string()), r.text.clone()))
        .collect();
    assert_eq!(
        runs,
        vec![
            (Some("layer-1".to_string()), "lead ".to_string()),
            (Some("layer-0".to_string()), "a".to_string()),
            (Some("layer-2".to_string()), "b".to_string()),
            (Some("layer-0".to_string()), "c".to_string()),
        ]
    );
}
