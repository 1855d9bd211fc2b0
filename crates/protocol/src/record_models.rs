//! Records exchanged with the host application's persistence layer.
//!
//! The host loads a pipeline once at editor mount and hands it to the store
//! as a list of [`BlockRecord`]s. Whenever the pipeline stabilizes, an
//! autosave observer writes it back as [`PersistedBlock`]s.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::block_models::{Block, BlockId};

/// One block as supplied by the host when hydrating the editor.
///
/// The kind is not part of the record; the store resolves it from the
/// subtype. Database-style snake_case keys are accepted as aliases so rows
/// can be passed through unchanged:
///
/// ```json
/// {
///   "block_id": "block-1",
///   "type": "condition-email-received",
///   "title": "Email Received",
///   "description": null,
///   "is_system_generated": false,
///   "parent_condition_id": null
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct BlockRecord {
    #[serde(alias = "block_id")]
    pub id: BlockId,

    #[serde(alias = "type")]
    pub subtype: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,

    #[serde(default, alias = "is_system_generated", deserialize_with = "null_as_false")]
    pub is_system_generated: bool,

    #[serde(default, alias = "parent_condition_id", skip_serializing_if = "Option::is_none")]
    pub parent_condition_id: Option<BlockId>,
}

impl From<&Block> for BlockRecord {
    fn from(block: &Block) -> Self {
        Self {
            id: block.id.clone(),
            subtype: block.subtype.clone(),
            title: block.title.clone(),
            description: block.description.clone(),
            is_system_generated: block.is_system_generated,
            parent_condition_id: block.parent_condition_id.clone(),
        }
    }
}

/// A block as written by the autosave observer.
///
/// Same shape as [`BlockRecord`] plus the block's index at save time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct PersistedBlock {
    #[serde(flatten)]
    pub record: BlockRecord,

    /// Zero-based position in the pipeline when it was saved.
    pub position: usize,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}
