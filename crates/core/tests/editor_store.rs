//! Integration tests for `PipelineStore` behavior across operation sequences.

mod common;

use common::*;
use pe_core::editor::EditorError;
use pe_protocol::block_models::{BlockKind, BlockPatch};
use pe_protocol::ipc::EditorOp;
use pe_protocol::template_models::TemplateBlock;
use pe_protocol::viewport_models::Point;

const SUBTYPES: &[&str] = &[
    "condition-email-received",
    "action-send-email",
    "condition-order-placed",
    "action-webhook",
    "integration-gmail",
    "action-update-crm",
];

/// Small deterministic generator so operation sequences are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

#[test]
fn test_pairing_holds_for_mixed_add_remove_sequences() {
    for seed in 0..20 {
        let mut rng = Lcg(seed);
        let mut store = new_store();

        for _ in 0..80 {
            let len = store.blocks().len();
            match rng.next(5) {
                0 | 1 => {
                    let subtype = SUBTYPES[rng.next(SUBTYPES.len())];
                    let index = rng.next(len + 2);
                    store.add_block(subtype, Some(index)).unwrap();
                }
                2 if len > 0 => {
                    let id = store.blocks()[rng.next(len)].id.clone();
                    store.remove_block(&id);
                }
                3 => {
                    store.add_placeholder(rng.next(len + 1));
                }
                4 => {
                    store.remove_placeholder();
                }
                _ => {
                    store.undo();
                }
            }

            assert_well_formed(store.blocks());
            let conditions = store.blocks().iter().filter(|b| b.is_condition()).count();
            let markers = store.blocks().iter().filter(|b| b.is_end_marker()).count();
            assert_eq!(conditions, markers, "seed {seed}");
            assert!(
                store.blocks().iter().filter(|b| b.is_placeholder()).count() <= 1,
                "seed {seed}"
            );
        }
    }
}

#[test]
fn test_removing_either_half_of_a_pair_is_equivalent() {
    let build = || {
        let mut store = new_store();
        store.add_block("integration-gmail", None).unwrap();
        let cond = store.add_block("condition-email-received", None).unwrap();
        store.add_block("action-reply-email", Some(2)).unwrap();
        store.add_block("action-webhook", None).unwrap();
        (store, cond)
    };

    let (mut by_condition, cond) = build();
    by_condition.remove_block(&cond);

    let (mut by_marker, cond) = build();
    let marker = by_marker.end_marker_of(&cond).unwrap().id.clone();
    by_marker.remove_block(&marker);

    assert_eq!(
        subtypes(by_condition.blocks()),
        vec!["integration-gmail", "action-reply-email", "action-webhook"]
    );
    assert_eq!(
        subtypes(by_condition.blocks()),
        subtypes(by_marker.blocks())
    );
}

#[test]
fn test_undo_then_redo_restores_exact_sequences() {
    let mut store = new_store();
    store.add_block("condition-email-received", None).unwrap();
    store.add_block("action-send-email", Some(1)).unwrap();

    let ops: Vec<Box<dyn Fn(&mut pe_core::editor::PipelineStore)>> = vec![
        Box::new(|s| {
            s.add_block("action-webhook", Some(0)).unwrap();
        }),
        Box::new(|s| {
            let id = s.blocks()[0].id.clone();
            s.remove_block(&id);
        }),
        Box::new(|s| {
            let id = s.blocks()[1].id.clone();
            s.update_block(&id, &BlockPatch::title("Forward"));
        }),
        Box::new(|s| {
            let mut blocks = s.blocks().to_vec();
            blocks.reverse();
            s.set_blocks(blocks, false);
        }),
    ];

    for op in ops {
        let before = store.blocks().to_vec();
        op(&mut store);
        let after = store.blocks().to_vec();

        assert!(store.undo());
        assert_eq!(store.blocks(), before.as_slice());
        assert!(store.redo());
        assert_eq!(store.blocks(), after.as_slice());
    }
}

#[test]
fn test_history_is_bounded() {
    let mut store = new_store();
    for _ in 0..60 {
        store.add_block("action-send-email", None).unwrap();
    }

    assert_eq!(store.history_len(), 50);
    let mut undos = 0;
    while store.undo() {
        undos += 1;
    }
    assert_eq!(undos, 49);
    // The oldest surviving entry is the pipeline after the 11th insert.
    assert_eq!(store.blocks().len(), 11);
}

#[test]
fn test_hydrate_resets_history_mid_session() {
    let mut store = new_store();
    store.add_block("action-send-email", None).unwrap();
    store.add_block("action-webhook", None).unwrap();
    store.undo();
    assert!(store.can_undo());
    assert!(store.can_redo());

    store.hydrate(email_reply_records());

    assert!(!store.can_undo());
    assert!(!store.can_redo());
    assert_eq!(store.history_len(), 1);
    assert_eq!(
        subtypes(store.blocks()),
        vec![
            "integration-gmail",
            "condition-email-received",
            "action-reply-email",
            "condition-end-marker"
        ]
    );
    assert!(!store.undo());
}

#[test]
fn test_hydrate_repairs_broken_pairing() {
    let store = hydrated_store(vec![
        record("c1", "condition-email-received"),
        record("a1", "action-send-email"),
        end_record("ghost-end", "missing-condition"),
        end_record("c2-end", "c2"),
        record("c2", "condition-order-placed"),
    ]);

    assert_well_formed(store.blocks());
    let ids: Vec<_> = store.blocks().iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c1-end", "a1", "c2", "c2-end"]);
    assert!(!store.can_undo());
}

#[test]
fn test_zoom_clamps_to_bounds() {
    let mut store = new_store();

    store.set_zoom(5.0);
    assert_eq!(store.zoom(), 2.0);
    store.set_zoom(5.0);
    assert_eq!(store.zoom(), 2.0);

    store.set_zoom(-1.0);
    assert_eq!(store.zoom(), 0.4);

    store.set_offset(Point::new(10.0, -4.0));
    store.reset_view();
    assert_eq!(store.zoom(), 1.0);
    assert_eq!(store.offset(), Point::ORIGIN);
}

#[test]
fn test_viewport_is_not_part_of_history() {
    let mut store = new_store();
    store.add_block("action-send-email", None).unwrap();
    store.zoom_in();
    store.set_offset(Point::new(3.0, 4.0));

    assert!(store.undo());
    assert!(store.blocks().is_empty());
    assert!((store.zoom() - 1.1).abs() < 1e-9);
    assert_eq!(store.offset(), Point::new(3.0, 4.0));
}

#[test]
fn test_condition_then_action_then_remove_then_undo_all() {
    let mut store = new_store();

    let cond = store.add_block("condition-email-received", None).unwrap();
    assert_eq!(store.blocks().len(), 2);
    assert_eq!(store.blocks()[1].kind, BlockKind::ConditionEndMarker);
    assert_eq!(store.blocks()[1].parent_condition_id.as_deref(), Some(cond.as_str()));

    let action = store.add_block("action-send-email", None).unwrap();
    assert_eq!(store.blocks().len(), 3);
    assert_eq!(store.blocks()[2].id, action);

    assert!(store.remove_block(&cond));
    assert_eq!(store.blocks().len(), 1);
    assert_eq!(store.blocks()[0].id, action);

    assert!(store.undo());
    assert!(store.undo());
    assert!(store.undo());
    assert!(store.blocks().is_empty());
    assert!(!store.can_undo());
}

#[test]
fn test_placeholder_is_replaced_in_place_as_one_step() {
    let mut store = new_store();
    store.add_block("condition-email-received", None).unwrap();
    let history_before = store.history_len();

    store.add_placeholder(0);
    assert_eq!(store.blocks().len(), 3);
    assert_eq!(store.placeholder_index(), Some(0));

    let id = store.add_block("action-webhook", None).unwrap();
    assert_eq!(store.blocks().len(), 3);
    assert!(!store.has_placeholder());
    assert_eq!(store.blocks()[0].id, id);
    assert_eq!(store.history_len(), history_before + 1);

    assert!(store.undo());
    assert_eq!(
        subtypes(store.blocks()),
        vec!["condition-email-received", "condition-end-marker"]
    );
}

#[test]
fn test_placeholder_stays_singleton() {
    let mut store = new_store();
    store.add_block("action-send-email", None).unwrap();
    store.add_block("action-webhook", None).unwrap();

    store.add_placeholder(0);
    store.add_placeholder(2);
    store.add_placeholder(99);
    assert_eq!(store.blocks().iter().filter(|b| b.is_placeholder()).count(), 1);
    assert_eq!(store.placeholder_index(), Some(2));

    store.remove_placeholder();
    store.remove_placeholder();
    assert!(!store.has_placeholder());
    assert_eq!(store.blocks().len(), 2);
}

#[test]
fn test_apply_template_is_one_undo_step() {
    let mut store = new_store();
    store.add_block("action-webhook", None).unwrap();
    let before = store.blocks().to_vec();

    let template = vec![
        TemplateBlock::subtype("integration-gmail"),
        TemplateBlock::subtype("condition-email-received"),
        TemplateBlock::subtype("action-reply-email"),
    ];
    let ids = store.apply_template(&template).unwrap();
    assert_eq!(ids.len(), 3);
    assert_well_formed(store.blocks());
    assert_eq!(
        subtypes(store.blocks()),
        vec![
            "action-webhook",
            "integration-gmail",
            "condition-email-received",
            "action-reply-email",
            "condition-end-marker"
        ]
    );

    assert!(store.undo());
    assert_eq!(store.blocks(), before.as_slice());
}

#[test]
fn test_rejected_subtypes_leave_store_untouched() {
    let mut store = new_store();
    store.add_block("action-send-email", None).unwrap();
    let revision = store.revision();

    assert_eq!(
        store.add_block("action-teleport", None),
        Err(EditorError::UnknownSubtype("action-teleport".to_string()))
    );
    assert_eq!(
        store.add_block("condition-end-marker", None),
        Err(EditorError::ReservedSubtype("condition-end-marker".to_string()))
    );
    assert_eq!(store.revision(), revision);
    assert_eq!(store.blocks().len(), 1);
}

#[test]
fn test_yaml_op_script_replay() {
    let script = r#"
- type: hydrate
  payload:
    blocks:
      - { id: g, type: integration-gmail, title: Gmail }
- type: addBlock
  payload: { subtype: condition-email-received }
- type: addPlaceholder
  payload: { index: 2 }
- type: addBlock
  payload: { subtype: action-reply-email }
- type: zoomIn
- type: undo
- type: redo
"#;
    let ops: Vec<EditorOp> = serde_yaml::from_str(script).unwrap();
    let mut store = new_store();
    for op in ops {
        store.apply(op).unwrap();
    }

    assert_eq!(
        subtypes(store.blocks()),
        vec![
            "integration-gmail",
            "condition-email-received",
            "action-reply-email",
            "condition-end-marker"
        ]
    );
    assert_eq!(store.epoch(), 1);
    assert!(!store.can_redo());
}

#[test]
fn test_persisted_records_round_trip_through_hydrate() {
    let mut store = hydrated_store(email_reply_records());
    store.add_block("action-webhook", None).unwrap();
    store.add_placeholder(0);

    let records: Vec<_> = store
        .persisted_records()
        .into_iter()
        .map(|persisted| persisted.record)
        .collect();
    assert_eq!(records.len(), 5);

    let reloaded = hydrated_store(records);
    let expected: Vec<_> = store
        .blocks()
        .iter()
        .filter(|b| !b.is_placeholder())
        .cloned()
        .collect();
    assert_eq!(reloaded.blocks(), expected.as_slice());
}

#[test]
fn test_undo_after_unrecorded_sync_returns_to_synced_pipeline() {
    let mut store = new_store();
    store.add_block("integration-gmail", None).unwrap();

    // Description sync from a config dialog is not an undo step
    let mut blocks = store.blocks().to_vec();
    blocks[0].description = "Connected".to_string();
    store.set_blocks(blocks, true);
    let synced = store.blocks().to_vec();
    let history_len = store.history_len();

    store.add_block("action-send-email", None).unwrap();
    assert!(store.undo());
    assert_eq!(store.blocks(), synced.as_slice());
    assert_eq!(store.history_len(), history_len + 1);

    assert!(store.undo());
    assert!(store.blocks().is_empty());
}

#[test]
fn test_drag_reorder_cannot_cross_condition_ranges() {
    let mut store = new_store();
    let outer = store.add_block("condition-email-received", None).unwrap();
    let inner = store.add_block("condition-order-placed", None).unwrap();

    // Drag the outer end-marker between the inner condition and its marker
    let mut blocks = store.blocks().to_vec();
    let outer_end = blocks.remove(1);
    blocks.insert(2, outer_end);
    let ids: Vec<_> = blocks.iter().map(|b| b.id.clone()).collect();
    assert_eq!(ids[0], outer);
    assert_eq!(ids[1], inner);
    store.set_blocks(blocks, false);

    assert_well_formed(store.blocks());
    assert_eq!(store.condition_body(&outer).map(<[_]>::len), Some(2));
    assert_eq!(store.condition_body(&inner).map(<[_]>::len), Some(0));
}
