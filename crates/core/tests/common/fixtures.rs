//! Fixtures for building stores and host records.

use pe_core::catalog::Catalog;
use pe_core::editor::{pairing, PipelineStore};
use pe_protocol::block_models::Block;
use pe_protocol::config_models::EditorSettings;
use pe_protocol::record_models::BlockRecord;
use std::sync::Arc;

/// A store over the built-in catalog with default settings.
#[allow(dead_code)]
pub fn new_store() -> PipelineStore {
    PipelineStore::new(Arc::new(Catalog::builtin()), &EditorSettings::default())
}

/// A store that has been hydrated with `records`.
#[allow(dead_code)]
pub fn hydrated_store(records: Vec<BlockRecord>) -> PipelineStore {
    let mut store = new_store();
    store.hydrate(records);
    store
}

/// A host record with only the fields the host always sends.
#[allow(dead_code)]
pub fn record(id: &str, subtype: &str) -> BlockRecord {
    BlockRecord {
        id: id.to_string(),
        subtype: subtype.to_string(),
        title: subtype.to_string(),
        description: String::new(),
        is_system_generated: false,
        parent_condition_id: None,
    }
}

/// The end-marker record the host stores for condition `parent`.
#[allow(dead_code)]
pub fn end_record(id: &str, parent: &str) -> BlockRecord {
    BlockRecord {
        id: id.to_string(),
        subtype: "condition-end-marker".to_string(),
        title: "End".to_string(),
        description: String::new(),
        is_system_generated: true,
        parent_condition_id: Some(parent.to_string()),
    }
}

/// A saved email-reply pipeline: gmail, email-received { reply }.
#[allow(dead_code)]
pub fn email_reply_records() -> Vec<BlockRecord> {
    vec![
        record("b-gmail", "integration-gmail"),
        record("b-cond", "condition-email-received"),
        record("b-reply", "action-reply-email"),
        end_record("b-cond-end", "b-cond"),
    ]
}

/// Panic unless conditions and end-markers pair one to one and at most one
/// placeholder is present.
#[allow(dead_code)]
pub fn assert_well_formed(blocks: &[Block]) {
    if let Err(violation) = pairing::check(blocks) {
        let ids: Vec<_> = blocks.iter().map(|b| b.id.as_str()).collect();
        panic!("pipeline violates {:?}: {:?}", violation, ids);
    }
}

/// Subtypes of `blocks`, in order.
#[allow(dead_code)]
pub fn subtypes(blocks: &[Block]) -> Vec<&str> {
    blocks.iter().map(|b| b.subtype.as_str()).collect()
}
