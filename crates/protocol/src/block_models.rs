//! Block models for the pipeline rail.
//!
//! This module defines the blocks the editor store arranges into a pipeline,
//! the closed set of block kinds, and the catalog entries that describe every
//! user-addable subtype.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Subtype reserved for system-generated blocks closing a condition body.
pub const END_MARKER_SUBTYPE: &str = "condition-end-marker";

/// Subtype reserved for the transient insertion placeholder.
pub const PLACEHOLDER_SUBTYPE: &str = "placeholder";

/// Identifier of a block. Opaque to the editor.
pub type BlockId = String;

/// The category a block belongs to.
///
/// `ConditionEndMarker` and `Placeholder` are system-only kinds: the store
/// creates them itself and they never appear in the catalog.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    /// A trigger or branch owning a body region closed by an end-marker.
    Condition,

    /// Something the pipeline does (send an email, update a CRM, ...).
    Action,

    /// A connection to a third-party service.
    Integration,

    /// Documentation-only block (notes, checkpoints).
    Reference,

    /// Closes the body of the condition named by `parent_condition_id`.
    ConditionEndMarker,

    /// Pending insertion point. At most one exists at a time.
    Placeholder,
}

impl BlockKind {
    /// Classify a subtype by its naming convention.
    ///
    /// Returns `None` for subtypes that do not follow any known prefix. The
    /// reserved system subtypes map to their system kinds.
    pub fn from_subtype_prefix(subtype: &str) -> Option<Self> {
        if subtype == END_MARKER_SUBTYPE {
            Some(BlockKind::ConditionEndMarker)
        } else if subtype == PLACEHOLDER_SUBTYPE {
            Some(BlockKind::Placeholder)
        } else if subtype.starts_with("condition-") {
            Some(BlockKind::Condition)
        } else if subtype.starts_with("action-") {
            Some(BlockKind::Action)
        } else if subtype.starts_with("integration-") {
            Some(BlockKind::Integration)
        } else if subtype.starts_with("reference-") {
            Some(BlockKind::Reference)
        } else {
            None
        }
    }

    /// Whether blocks of this kind are only ever created by the store.
    pub fn is_system(self) -> bool {
        matches!(self, BlockKind::ConditionEndMarker | BlockKind::Placeholder)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BlockKind::Condition => "condition",
            BlockKind::Action => "action",
            BlockKind::Integration => "integration",
            BlockKind::Reference => "reference",
            BlockKind::ConditionEndMarker => "condition-end-marker",
            BlockKind::Placeholder => "placeholder",
        };
        f.write_str(name)
    }
}

/// A single node in the pipeline sequence.
///
/// Serialized in camelCase to match the shape the web host already uses:
///
/// ```json
/// {
///   "id": "block-2f1c...",
///   "kind": "condition",
///   "subtype": "condition-email-received",
///   "title": "Email Received",
///   "description": "When a new email arrives",
///   "isSystemGenerated": false
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Stable identifier for the block's lifetime.
    pub id: BlockId,

    pub kind: BlockKind,

    /// Catalog key, e.g. `condition-email-received`.
    pub subtype: String,

    pub title: String,

    /// Frequently overwritten by external configuration flows.
    #[serde(default)]
    pub description: String,

    /// True for end-markers and placeholders.
    #[serde(default)]
    pub is_system_generated: bool,

    /// Set only on end-markers: the id of the condition they close.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_condition_id: Option<BlockId>,
}

impl Block {
    pub fn is_condition(&self) -> bool {
        self.kind == BlockKind::Condition
    }

    pub fn is_end_marker(&self) -> bool {
        self.kind == BlockKind::ConditionEndMarker
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind == BlockKind::Placeholder
    }
}

/// Partial update merged into an existing block.
///
/// Only text fields are patchable; identity, kind, pairing and position are
/// owned by the store.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct BlockPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl BlockPatch {
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            title: None,
            description: Some(description.into()),
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
        }
    }

    /// Merge this patch into `block`, returning whether anything changed.
    pub fn merge_into(&self, block: &mut Block) -> bool {
        let mut changed = false;
        if let Some(title) = &self.title {
            if block.title != *title {
                block.title.clone_from(title);
                changed = true;
            }
        }
        if let Some(description) = &self.description {
            if block.description != *description {
                block.description.clone_from(description);
                changed = true;
            }
        }
        changed
    }
}

/// Describes one user-addable block subtype.
///
/// The catalog supplies the default title and description of new blocks and
/// decides whether a subtype gets a paired end-marker.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Subtype key, e.g. `action-send-email`.
    pub subtype: String,

    /// Default display title.
    pub label: String,

    /// Default description.
    pub description: String,

    /// Category of the subtype. Never a system kind.
    pub kind: BlockKind,
}

impl CatalogEntry {
    pub fn new(
        subtype: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        kind: BlockKind,
    ) -> Self {
        Self {
            subtype: subtype.into(),
            label: label.into(),
            description: description.into(),
            kind,
        }
    }

    pub fn is_condition(&self) -> bool {
        self.kind == BlockKind::Condition
    }
}
