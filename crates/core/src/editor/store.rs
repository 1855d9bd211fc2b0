//! The pipeline editor store.
//!
//! `PipelineStore` is the single owner of the block sequence, its undo/redo
//! history and the canvas viewport. One store is constructed per open editor
//! and handed to whatever needs it; there is no global instance.
//!
//! Every mutation runs to completion synchronously. After each pipeline
//! change the store publishes a [`PipelineSnapshot`] on a `watch` channel so
//! observers (autosave, status sync) can react without borrowing the store.

use crate::catalog::BlockCatalog;
use crate::editor::error::{EditorError, EditorResult};
use crate::editor::history::History;
use crate::editor::pairing;
use crate::editor::viewport::ViewportState;
use pe_protocol::block_models::{
    Block, BlockId, BlockKind, BlockPatch, CatalogEntry, END_MARKER_SUBTYPE, PLACEHOLDER_SUBTYPE,
};
use pe_protocol::config_models::EditorSettings;
use pe_protocol::ipc::EditorOp;
use pe_protocol::record_models::{BlockRecord, PersistedBlock};
use pe_protocol::template_models::TemplateBlock;
use pe_protocol::viewport_models::{Point, Viewport};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The pipeline as published to observers after a change.
#[derive(Debug, Clone)]
pub struct PipelineSnapshot {
    /// Hydration generation. Zero until the first `hydrate`.
    pub epoch: u64,

    /// Change counter, bumped on every pipeline mutation.
    pub revision: u64,

    /// True when this is the unmodified result of a `hydrate`, i.e. exactly
    /// what the host just loaded.
    pub is_baseline: bool,

    pub blocks: Arc<Vec<Block>>,
}

impl PipelineSnapshot {
    pub fn has_placeholder(&self) -> bool {
        self.blocks.iter().any(Block::is_placeholder)
    }

    /// Persistence rows for this snapshot. Placeholders are skipped.
    pub fn persisted_records(&self) -> Vec<PersistedBlock> {
        persisted_records(&self.blocks)
    }
}

fn persisted_records(blocks: &[Block]) -> Vec<PersistedBlock> {
    blocks
        .iter()
        .filter(|b| !b.is_placeholder())
        .enumerate()
        .map(|(position, block)| PersistedBlock {
            record: BlockRecord::from(block),
            position,
        })
        .collect()
}

fn new_block_id() -> BlockId {
    format!("block-{}", Uuid::new_v4())
}

fn placeholder_block() -> Block {
    Block {
        id: format!("placeholder-{}", Uuid::new_v4()),
        kind: BlockKind::Placeholder,
        subtype: PLACEHOLDER_SUBTYPE.to_string(),
        title: "Placeholder".to_string(),
        description: "Choose a block".to_string(),
        is_system_generated: true,
        parent_condition_id: None,
    }
}

/// In-memory model of one pipeline being edited.
pub struct PipelineStore {
    catalog: Arc<dyn BlockCatalog>,
    blocks: Vec<Block>,
    history: History,
    viewport: ViewportState,
    epoch: u64,
    revision: u64,
    changes: watch::Sender<PipelineSnapshot>,
}

impl PipelineStore {
    /// Create an empty, not yet hydrated store.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Subtype definitions used by `add_block`
    /// * `settings` - History capacity and zoom bounds
    pub fn new(catalog: Arc<dyn BlockCatalog>, settings: &EditorSettings) -> Self {
        let (changes, _) = watch::channel(PipelineSnapshot {
            epoch: 0,
            revision: 0,
            is_baseline: false,
            blocks: Arc::new(Vec::new()),
        });

        Self {
            catalog,
            blocks: Vec::new(),
            history: History::new(settings.history_capacity, Vec::new()),
            viewport: ViewportState::new(settings),
            epoch: 0,
            revision: 0,
            changes,
        }
    }

    /// Subscribe to pipeline changes.
    ///
    /// The receiver always holds the latest snapshot; intermediate snapshots
    /// may be skipped by slow observers.
    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.changes.subscribe()
    }

    // ------------------------------------------------------------------
    // Pipeline mutations
    // ------------------------------------------------------------------

    /// Replace the whole pipeline with records loaded by the host.
    ///
    /// Does not create an undo step: history is reset so the loaded pipeline
    /// becomes the new baseline, even when called mid-session to switch
    /// pipelines. Any open placeholder is discarded.
    pub fn hydrate(&mut self, records: Vec<BlockRecord>) {
        let blocks: Vec<Block> = records
            .into_iter()
            .filter_map(|record| self.block_from_record(record))
            .collect();
        let blocks = Self::repaired(blocks, "hydrate");

        self.history.reset(blocks.clone());
        self.blocks = blocks;
        self.epoch += 1;
        info!(
            epoch = self.epoch,
            blocks = self.blocks.len(),
            "Hydrated pipeline"
        );
        self.publish(true);
    }

    /// Insert a new block of `subtype`.
    ///
    /// Conditions are inserted together with their end-marker as one step.
    /// When a placeholder is open the new block replaces it in place and
    /// `index` is ignored; otherwise the block goes to `index` (clamped to the
    /// end) or is appended.
    ///
    /// # Returns
    ///
    /// The id of the inserted block (the condition, for condition subtypes).
    ///
    /// # Errors
    ///
    /// Returns `EditorError` if the subtype is unknown or reserved. The
    /// pipeline is left untouched.
    pub fn add_block(&mut self, subtype: &str, index: Option<usize>) -> EditorResult<BlockId> {
        let entry = self.lookup(subtype)?;
        let mut new_blocks = vec![Self::block_from_entry(&entry, None)];
        if entry.is_condition() {
            new_blocks.push(pairing::end_marker_for(&new_blocks[0]));
        }
        let id = new_blocks[0].id.clone();

        let at = self.insertion_point(index);
        debug!(subtype, at, "Adding block");
        self.blocks.splice(at..at, new_blocks);
        self.commit();
        Ok(id)
    }

    /// Append a template's blocks as a single undoable step.
    ///
    /// Template titles and descriptions override the catalog defaults. Each
    /// condition wraps the template blocks that follow it, so end-markers are
    /// emitted after the last template block, innermost first. An open
    /// placeholder is replaced, as with [`add_block`](Self::add_block).
    ///
    /// # Errors
    ///
    /// Returns `EditorError` on the first unknown subtype; nothing is
    /// inserted in that case.
    pub fn apply_template(&mut self, template: &[TemplateBlock]) -> EditorResult<Vec<BlockId>> {
        let entries = template
            .iter()
            .map(|tb| self.lookup(&tb.subtype))
            .collect::<EditorResult<Vec<_>>>()?;

        let mut new_blocks = Vec::with_capacity(template.len() * 2);
        let mut closers = Vec::new();
        for (tb, entry) in template.iter().zip(&entries) {
            let block = Self::block_from_entry(entry, Some(tb));
            if block.is_condition() {
                closers.push(pairing::end_marker_for(&block));
            }
            new_blocks.push(block);
        }
        let ids = new_blocks.iter().map(|b| b.id.clone()).collect();
        new_blocks.extend(closers.into_iter().rev());

        let at = self.insertion_point(None);
        debug!(blocks = new_blocks.len(), at, "Applying template");
        self.blocks.splice(at..at, new_blocks);
        self.commit();
        Ok(ids)
    }

    /// Open the insertion placeholder at `index` (clamped to the end).
    ///
    /// Calling this while a placeholder is open moves it. Not an undo step.
    pub fn add_placeholder(&mut self, index: usize) {
        let placeholder = match self.placeholder_index() {
            Some(current) => self.blocks.remove(current),
            None => placeholder_block(),
        };
        let at = index.min(self.blocks.len());
        self.blocks.insert(at, placeholder);
        self.touch();
    }

    /// Cancel the insertion placeholder. No-op when none is open.
    pub fn remove_placeholder(&mut self) {
        match self.placeholder_index() {
            Some(index) => {
                self.blocks.remove(index);
                self.touch();
            }
            None => debug!("No placeholder to remove"),
        }
    }

    /// Delete a block. Removing either half of a condition pair removes both.
    ///
    /// Unknown ids are a no-op. Placeholders are cancelled through
    /// [`remove_placeholder`](Self::remove_placeholder), never deleted here.
    ///
    /// # Returns
    ///
    /// Whether anything was removed.
    pub fn remove_block(&mut self, id: &str) -> bool {
        let Some(target) = self.block(id) else {
            debug!(id, "Ignoring removal of unknown block");
            return false;
        };
        if target.is_placeholder() {
            warn!(id, "Placeholders are cancelled, not removed");
            return false;
        }

        let doomed = pairing::removal_set(&self.blocks, target);
        self.blocks.retain(|b| !doomed.contains(&b.id));
        self.commit();
        true
    }

    /// Replace the sequence wholesale (drag-reorder, external sync).
    ///
    /// The new sequence is one undo step unless `skip_history` is set, in
    /// which case it replaces the current history entry instead. Broken
    /// pairing in the input is repaired before it is accepted.
    pub fn set_blocks(&mut self, blocks: Vec<Block>, skip_history: bool) {
        self.blocks = Self::repaired(blocks, "set_blocks");
        if skip_history {
            let snapshot = self.history_snapshot();
            self.history.replace_current(snapshot);
            self.touch();
        } else {
            self.commit();
        }
    }

    /// Merge text fields into a block.
    ///
    /// Every effective update is an undo step. Unknown ids, placeholders and
    /// patches that change nothing are no-ops.
    ///
    /// # Returns
    ///
    /// Whether the block changed.
    pub fn update_block(&mut self, id: &str, patch: &BlockPatch) -> bool {
        let Some(block) = self
            .blocks
            .iter_mut()
            .find(|b| b.id == id && !b.is_placeholder())
        else {
            debug!(id, "Ignoring update of unknown block");
            return false;
        };

        if !patch.merge_into(block) {
            return false;
        }
        self.commit();
        true
    }

    /// Step back one history entry. No-op at the start of history.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.blocks = snapshot.as_ref().clone();
                self.touch();
                true
            }
            None => {
                debug!("Nothing to undo");
                false
            }
        }
    }

    /// Step forward one history entry. No-op at the end of history.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.blocks = snapshot.as_ref().clone();
                self.touch();
                true
            }
            None => {
                debug!("Nothing to redo");
                false
            }
        }
    }

    /// Dispatch a serialized operation.
    ///
    /// # Errors
    ///
    /// Propagates the `EditorError` of the underlying operation.
    pub fn apply(&mut self, op: EditorOp) -> EditorResult<()> {
        match op {
            EditorOp::Hydrate { blocks } => self.hydrate(blocks),
            EditorOp::AddBlock { subtype, index } => {
                self.add_block(&subtype, index)?;
            }
            EditorOp::AddPlaceholder { index } => self.add_placeholder(index),
            EditorOp::RemovePlaceholder => self.remove_placeholder(),
            EditorOp::RemoveBlock { id } => {
                self.remove_block(&id);
            }
            EditorOp::SetBlocks {
                blocks,
                skip_history,
            } => self.set_blocks(blocks, skip_history),
            EditorOp::UpdateBlock { id, patch } => {
                self.update_block(&id, &patch);
            }
            EditorOp::ApplyTemplate { blocks } => {
                self.apply_template(&blocks)?;
            }
            EditorOp::Undo => {
                self.undo();
            }
            EditorOp::Redo => {
                self.redo();
            }
            EditorOp::SetZoom { zoom } => self.set_zoom(zoom),
            EditorOp::SetOffset { offset } => self.set_offset(offset),
            EditorOp::ZoomIn => self.zoom_in(),
            EditorOp::ZoomOut => self.zoom_out(),
            EditorOp::ResetView => self.reset_view(),
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.viewport.set_offset(offset);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    pub fn offset(&self) -> Point {
        self.viewport.offset()
    }

    // ------------------------------------------------------------------
    // Read-only traversal
    // ------------------------------------------------------------------

    /// The live sequence, placeholder included.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn placeholder_index(&self) -> Option<usize> {
        self.blocks.iter().position(Block::is_placeholder)
    }

    pub fn has_placeholder(&self) -> bool {
        self.placeholder_index().is_some()
    }

    /// The end-marker closing `condition_id`.
    pub fn end_marker_of(&self, condition_id: &str) -> Option<&Block> {
        pairing::end_marker_of(&self.blocks, condition_id)
    }

    /// Blocks strictly between a condition and its end-marker.
    pub fn condition_body(&self, condition_id: &str) -> Option<&[Block]> {
        pairing::body_range(&self.blocks, condition_id).map(|range| &self.blocks[range])
    }

    /// Persistence rows for the live pipeline, placeholder excluded.
    pub fn persisted_records(&self) -> Vec<PersistedBlock> {
        persisted_records(&self.blocks)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Snapshots held in history, baseline included.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn catalog(&self) -> &dyn BlockCatalog {
        self.catalog.as_ref()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lookup(&self, subtype: &str) -> EditorResult<CatalogEntry> {
        if subtype == END_MARKER_SUBTYPE || subtype == PLACEHOLDER_SUBTYPE {
            return Err(EditorError::ReservedSubtype(subtype.to_string()));
        }
        self.catalog
            .lookup(subtype)
            .cloned()
            .ok_or_else(|| EditorError::UnknownSubtype(subtype.to_string()))
    }

    /// Where the next inserted blocks go. Consumes an open placeholder.
    fn insertion_point(&mut self, index: Option<usize>) -> usize {
        match self.placeholder_index() {
            Some(at) => {
                self.blocks.remove(at);
                at
            }
            None => index.map_or(self.blocks.len(), |i| i.min(self.blocks.len())),
        }
    }

    fn block_from_entry(entry: &CatalogEntry, overrides: Option<&TemplateBlock>) -> Block {
        let title = overrides
            .and_then(|tb| tb.title.clone())
            .unwrap_or_else(|| entry.label.clone());
        let description = overrides
            .and_then(|tb| tb.description.clone())
            .unwrap_or_else(|| entry.description.clone());

        Block {
            id: new_block_id(),
            kind: entry.kind,
            subtype: entry.subtype.clone(),
            title,
            description,
            is_system_generated: false,
            parent_condition_id: None,
        }
    }

    /// Convert a hydration record, dropping placeholders.
    fn block_from_record(&self, record: BlockRecord) -> Option<Block> {
        let kind = match self.catalog.lookup(&record.subtype) {
            Some(entry) => entry.kind,
            None => BlockKind::from_subtype_prefix(&record.subtype).unwrap_or_else(|| {
                warn!(
                    id = %record.id,
                    subtype = %record.subtype,
                    "Unknown subtype in hydration record, treating as reference"
                );
                BlockKind::Reference
            }),
        };
        if kind == BlockKind::Placeholder {
            debug!(id = %record.id, "Dropping persisted placeholder");
            return None;
        }

        let is_system_generated = record.is_system_generated || kind.is_system();
        let parent_condition_id = if kind == BlockKind::ConditionEndMarker {
            record.parent_condition_id
        } else {
            None
        };

        Some(Block {
            id: record.id,
            kind,
            subtype: record.subtype,
            title: record.title,
            description: record.description,
            is_system_generated,
            parent_condition_id,
        })
    }

    fn repaired(blocks: Vec<Block>, source: &str) -> Vec<Block> {
        let (blocks, repairs) = pairing::normalize(blocks);
        for repair in &repairs {
            warn!(source, "Repaired pipeline: {repair}");
        }
        blocks
    }

    /// Record the live pipeline as a new undo step and publish it.
    fn commit(&mut self) {
        let snapshot = self.history_snapshot();
        self.history.push(snapshot);
        self.publish(false);
    }

    /// The live pipeline as stored in history, without the placeholder.
    fn history_snapshot(&self) -> Vec<Block> {
        self.blocks
            .iter()
            .filter(|b| !b.is_placeholder())
            .cloned()
            .collect()
    }

    /// Publish a change that is not an undo step.
    fn touch(&mut self) {
        self.publish(false);
    }

    fn publish(&mut self, is_baseline: bool) {
        self.revision += 1;
        self.assert_invariants();
        self.changes.send_replace(PipelineSnapshot {
            epoch: self.epoch,
            revision: self.revision,
            is_baseline,
            blocks: Arc::new(self.blocks.clone()),
        });
    }

    fn assert_invariants(&self) {
        if cfg!(debug_assertions) {
            if let Err(violation) = pairing::check(&self.blocks) {
                panic!("pipeline invariant violated: {violation}");
            }
        }
    }
}

impl std::fmt::Debug for PipelineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineStore")
            .field("blocks", &self.blocks)
            .field("history_len", &self.history.len())
            .field("viewport", &self.viewport.viewport())
            .field("epoch", &self.epoch)
            .field("revision", &self.revision)
            .finish()
    }
}
