//! Launch validation.
//!
//! Read-only checks the host runs before handing a pipeline to the
//! execution backend. Placeholders are ignored throughout.

use crate::editor::pairing;
use pe_protocol::block_models::{Block, BlockId, BlockKind};
use std::ops::Range;
use thiserror::Error;

/// Subtypes that satisfy the email-integration requirement.
pub const EMAIL_INTEGRATIONS: &[&str] = &["integration-gmail", "integration-outlook"];

/// Subtype that satisfies the email-trigger requirement.
pub const EMAIL_TRIGGER: &str = "condition-email-received";

/// Why a pipeline cannot be launched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("Please add some blocks to your pipeline first")]
    EmptyPipeline,

    #[error("Pipeline must have either Gmail or Outlook integration block")]
    MissingEmailIntegration,

    #[error("Pipeline must have at least one \"Email Received\" block")]
    MissingEmailTrigger,

    #[error("Condition {condition_id} has no blocks before its end marker")]
    EmptyConditionBody { condition_id: BlockId },
}

/// Whether a non-placeholder block of `subtype` exists.
pub fn has_subtype(blocks: &[Block], subtype: &str) -> bool {
    real_blocks(blocks).any(|b| b.subtype == subtype)
}

/// Whether a block of `kind` exists.
pub fn has_kind(blocks: &[Block], kind: BlockKind) -> bool {
    real_blocks(blocks).any(|b| b.kind == kind)
}

/// `(condition id, body range)` for every paired condition, in order.
pub fn condition_ranges(blocks: &[Block]) -> Vec<(BlockId, Range<usize>)> {
    blocks
        .iter()
        .filter(|b| b.is_condition())
        .filter_map(|b| pairing::body_range(blocks, &b.id).map(|range| (b.id.clone(), range)))
        .collect()
}

/// Check that a pipeline is launchable.
///
/// # Errors
///
/// Returns the first failed requirement, checked in this order: non-empty,
/// email integration, email trigger, non-empty condition bodies.
pub fn validate_launch(blocks: &[Block]) -> Result<(), LaunchError> {
    if real_blocks(blocks).next().is_none() {
        return Err(LaunchError::EmptyPipeline);
    }
    if !EMAIL_INTEGRATIONS.iter().any(|s| has_subtype(blocks, s)) {
        return Err(LaunchError::MissingEmailIntegration);
    }
    if !has_subtype(blocks, EMAIL_TRIGGER) {
        return Err(LaunchError::MissingEmailTrigger);
    }

    for (condition_id, range) in condition_ranges(blocks) {
        if real_blocks(&blocks[range]).next().is_none() {
            return Err(LaunchError::EmptyConditionBody { condition_id });
        }
    }
    Ok(())
}

fn real_blocks(blocks: &[Block]) -> impl Iterator<Item = &Block> {
    blocks.iter().filter(|b| !b.is_placeholder())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::editor::PipelineStore;
    use pe_protocol::config_models::EditorSettings;
    use std::sync::Arc;

    fn store() -> PipelineStore {
        PipelineStore::new(Arc::new(Catalog::builtin()), &EditorSettings::default())
    }

    #[test]
    fn test_empty_pipeline() {
        let mut store = store();
        assert_eq!(validate_launch(store.blocks()), Err(LaunchError::EmptyPipeline));

        store.add_placeholder(0);
        assert_eq!(validate_launch(store.blocks()), Err(LaunchError::EmptyPipeline));
    }

    #[test]
    fn test_requirements_in_order() {
        let mut store = store();
        store.add_block("action-send-email", None).unwrap();
        assert_eq!(
            validate_launch(store.blocks()),
            Err(LaunchError::MissingEmailIntegration)
        );

        store.add_block("integration-outlook", Some(0)).unwrap();
        assert_eq!(
            validate_launch(store.blocks()),
            Err(LaunchError::MissingEmailTrigger)
        );
    }

    #[test]
    fn test_condition_body_must_not_be_empty() {
        let mut store = store();
        store.add_block("integration-gmail", None).unwrap();
        let cond = store.add_block("condition-email-received", None).unwrap();

        // Only a placeholder inside the body
        let marker_index = store.index_of(&store.end_marker_of(&cond).unwrap().id).unwrap();
        store.add_placeholder(marker_index);
        assert_eq!(
            validate_launch(store.blocks()),
            Err(LaunchError::EmptyConditionBody {
                condition_id: cond.clone()
            })
        );

        store.add_block("action-reply-email", None).unwrap();
        assert_eq!(validate_launch(store.blocks()), Ok(()));
    }

    #[test]
    fn test_queries() {
        let mut store = store();
        let cond = store.add_block("condition-order-placed", None).unwrap();
        store.add_block("action-update-crm", Some(1)).unwrap();

        assert!(has_kind(store.blocks(), BlockKind::Condition));
        assert!(!has_kind(store.blocks(), BlockKind::Integration));
        assert!(has_subtype(store.blocks(), "action-update-crm"));
        assert_eq!(condition_ranges(store.blocks()), vec![(cond, 1..2)]);
    }
}
