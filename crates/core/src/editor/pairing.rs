//! Condition / end-marker pairing.
//!
//! Every condition owns exactly one end-marker placed later in the sequence,
//! linked through `parent_condition_id`. The store only ever creates and
//! removes the two together; this module holds the helpers that do so, the
//! repair pass applied to externally supplied sequences, and the invariant
//! check asserted in debug builds.

use pe_protocol::block_models::{Block, BlockId, BlockKind, END_MARKER_SUBTYPE};
use std::collections::{HashMap, HashSet};
use std::fmt;

const END_MARKER_DESCRIPTION: &str = "Paths merge here";

/// Build the end-marker closing `condition`.
///
/// The id defaults to `<condition-id>-end`; pairing is resolved through
/// `parent_condition_id` only.
pub fn end_marker_for(condition: &Block) -> Block {
    Block {
        id: format!("{}-end", condition.id),
        kind: BlockKind::ConditionEndMarker,
        subtype: END_MARKER_SUBTYPE.to_string(),
        title: format!("End of {}", condition.title),
        description: END_MARKER_DESCRIPTION.to_string(),
        is_system_generated: true,
        parent_condition_id: Some(condition.id.clone()),
    }
}

/// Ids removed together with `target`: the block itself plus its partner
/// when it is half of a condition pair.
pub fn removal_set(blocks: &[Block], target: &Block) -> HashSet<BlockId> {
    let mut doomed = HashSet::from([target.id.clone()]);
    match target.kind {
        BlockKind::Condition => {
            if let Some(marker) = end_marker_of(blocks, &target.id) {
                doomed.insert(marker.id.clone());
            }
        }
        BlockKind::ConditionEndMarker => {
            if let Some(parent) = &target.parent_condition_id {
                doomed.insert(parent.clone());
            }
        }
        _ => {}
    }
    doomed
}

/// The end-marker closing the condition `condition_id`, if any.
pub fn end_marker_of<'a>(blocks: &'a [Block], condition_id: &str) -> Option<&'a Block> {
    blocks
        .iter()
        .find(|b| b.is_end_marker() && b.parent_condition_id.as_deref() == Some(condition_id))
}

/// Index range strictly between a condition and its end-marker.
pub fn body_range(blocks: &[Block], condition_id: &str) -> Option<std::ops::Range<usize>> {
    let start = blocks
        .iter()
        .position(|b| b.is_condition() && b.id == condition_id)?;
    let end = blocks.iter().position(|b| {
        b.is_end_marker() && b.parent_condition_id.as_deref() == Some(condition_id)
    })?;
    (start < end).then(|| start + 1..end)
}

/// A change made while normalizing an externally supplied sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    /// A later block reused an id already present.
    DuplicateId(BlockId),
    /// More than one placeholder was supplied.
    ExtraPlaceholder(BlockId),
    /// An end-marker whose parent condition is absent.
    OrphanEndMarker(BlockId),
    /// A second end-marker for an already closed condition.
    DuplicateEndMarker(BlockId),
    /// An end-marker that preceded its condition was moved right after it.
    MovedEndMarker(BlockId),
    /// A condition had no end-marker; one was synthesized after it.
    MissingEndMarker(BlockId),
    /// An end-marker closed an outer condition inside an inner one; it was
    /// moved after the inner condition's end-marker.
    CrossedEndMarker(BlockId),
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repair::DuplicateId(id) => write!(f, "dropped block with duplicate id {id}"),
            Repair::ExtraPlaceholder(id) => write!(f, "dropped extra placeholder {id}"),
            Repair::OrphanEndMarker(id) => write!(f, "dropped orphaned end-marker {id}"),
            Repair::DuplicateEndMarker(id) => write!(f, "dropped duplicate end-marker {id}"),
            Repair::MovedEndMarker(id) => {
                write!(f, "moved end-marker {id} after its condition")
            }
            Repair::MissingEndMarker(id) => {
                write!(f, "added missing end-marker for condition {id}")
            }
            Repair::CrossedEndMarker(id) => {
                write!(f, "moved end-marker {id} out of a nested condition")
            }
        }
    }
}

/// Restore the pairing and placeholder invariants on an arbitrary sequence.
///
/// Well-formed input is returned unchanged with no repairs.
pub fn normalize(blocks: Vec<Block>) -> (Vec<Block>, Vec<Repair>) {
    let mut repairs = Vec::new();

    // Unique ids, single placeholder
    let mut seen_ids = HashSet::new();
    let mut placeholder_seen = false;
    let mut unique = Vec::with_capacity(blocks.len());
    for block in blocks {
        if !seen_ids.insert(block.id.clone()) {
            repairs.push(Repair::DuplicateId(block.id));
            continue;
        }
        if block.is_placeholder() {
            if placeholder_seen {
                repairs.push(Repair::ExtraPlaceholder(block.id));
                continue;
            }
            placeholder_seen = true;
        }
        unique.push(block);
    }

    let conditions: HashSet<BlockId> = unique
        .iter()
        .filter(|b| b.is_condition())
        .map(|b| b.id.clone())
        .collect();

    // End-markers must follow their condition
    let mut opened = HashSet::new();
    let mut closed = HashSet::new();
    let mut deferred: HashMap<BlockId, Block> = HashMap::new();
    let mut ordered = Vec::with_capacity(unique.len());
    for mut block in unique {
        match block.kind {
            BlockKind::ConditionEndMarker => {
                let Some(parent) = block.parent_condition_id.clone() else {
                    repairs.push(Repair::OrphanEndMarker(block.id));
                    continue;
                };
                if !conditions.contains(&parent) {
                    repairs.push(Repair::OrphanEndMarker(block.id));
                } else if closed.contains(&parent) || deferred.contains_key(&parent) {
                    repairs.push(Repair::DuplicateEndMarker(block.id));
                } else if opened.contains(&parent) {
                    block.is_system_generated = true;
                    closed.insert(parent);
                    ordered.push(block);
                } else {
                    block.is_system_generated = true;
                    deferred.insert(parent, block);
                }
            }
            BlockKind::Condition => {
                let id = block.id.clone();
                opened.insert(id.clone());
                ordered.push(block);
                if let Some(marker) = deferred.remove(&id) {
                    repairs.push(Repair::MovedEndMarker(marker.id.clone()));
                    closed.insert(id);
                    ordered.push(marker);
                }
            }
            _ => ordered.push(block),
        }
    }

    // Conditions still open get a fresh end-marker
    if closed.len() == conditions.len() {
        let nested = nest(ordered, &mut repairs);
        return (nested, repairs);
    }
    let mut result = Vec::with_capacity(ordered.len() + conditions.len() - closed.len());
    for block in ordered {
        let missing = block.is_condition() && !closed.contains(&block.id);
        let marker = missing.then(|| end_marker_for(&block));
        result.push(block);
        if let Some(marker) = marker {
            repairs.push(Repair::MissingEndMarker(
                marker.parent_condition_id.clone().unwrap_or_default(),
            ));
            result.push(marker);
        }
    }
    let nested = nest(result, &mut repairs);
    (nested, repairs)
}

/// Uncross condition ranges.
///
/// Expects every condition to be followed by exactly one end-marker. An
/// end-marker that would close a condition while a later-opened one is still
/// open is held back until every condition inside it has closed.
fn nest(blocks: Vec<Block>, repairs: &mut Vec<Repair>) -> Vec<Block> {
    let mut open: Vec<BlockId> = Vec::new();
    let mut held: HashMap<BlockId, Block> = HashMap::new();
    let mut result = Vec::with_capacity(blocks.len());

    for block in blocks {
        match block.kind {
            BlockKind::Condition => {
                open.push(block.id.clone());
                result.push(block);
            }
            BlockKind::ConditionEndMarker => {
                let parent = block.parent_condition_id.clone().unwrap_or_default();
                if open.last() != Some(&parent) {
                    repairs.push(Repair::CrossedEndMarker(block.id.clone()));
                    held.insert(parent, block);
                    continue;
                }
                open.pop();
                result.push(block);
                while let Some(marker) = open.last().and_then(|top| held.remove(top)) {
                    open.pop();
                    result.push(marker);
                }
            }
            _ => result.push(block),
        }
    }

    // Unreachable for sequences produced by the pairing pass above
    result.extend(held.into_values());
    result
}

/// A broken invariant found by [`check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    UnclosedCondition(BlockId),
    OrphanEndMarker(BlockId),
    /// The end-marker closes a condition while a condition opened after it
    /// is still open.
    CrossedRanges(BlockId),
    MultiplePlaceholders(usize),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::UnclosedCondition(id) => {
                write!(f, "condition {id} has no single end-marker after it")
            }
            Violation::OrphanEndMarker(id) => {
                write!(f, "end-marker {id} does not close a preceding condition")
            }
            Violation::CrossedRanges(id) => {
                write!(f, "end-marker {id} closes a condition around an open inner one")
            }
            Violation::MultiplePlaceholders(n) => write!(f, "{n} placeholders present"),
        }
    }
}

/// Verify the pairing and placeholder invariants.
pub fn check(blocks: &[Block]) -> Result<(), Violation> {
    let placeholders = blocks.iter().filter(|b| b.is_placeholder()).count();
    if placeholders > 1 {
        return Err(Violation::MultiplePlaceholders(placeholders));
    }

    let mut open: Vec<&str> = Vec::new();
    for block in blocks {
        match block.kind {
            BlockKind::Condition => open.push(block.id.as_str()),
            BlockKind::ConditionEndMarker => {
                let parent = block.parent_condition_id.as_deref().unwrap_or_default();
                if open.last() == Some(&parent) {
                    open.pop();
                } else if open.contains(&parent) {
                    return Err(Violation::CrossedRanges(block.id.clone()));
                } else {
                    return Err(Violation::OrphanEndMarker(block.id.clone()));
                }
            }
            _ => {}
        }
    }

    match open.first() {
        Some(id) => Err(Violation::UnclosedCondition((*id).to_string())),
        None => Ok(()),
    }
}
