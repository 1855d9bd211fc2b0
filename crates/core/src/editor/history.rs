//! Bounded undo/redo history of whole-pipeline snapshots.

use pe_protocol::block_models::Block;
use std::collections::VecDeque;
use std::sync::Arc;

/// Snapshot list plus a cursor pointing at the entry that matches the live
/// pipeline.
///
/// Entries are shared (`Arc`) so moving the cursor never deep-copies more
/// than the one snapshot being restored.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Arc<Vec<Block>>>,
    cursor: usize,
    capacity: usize,
}

impl History {
    /// Create a history holding only `baseline`.
    ///
    /// A capacity of zero is treated as one: the baseline always fits.
    pub fn new(capacity: usize, baseline: Vec<Block>) -> Self {
        let capacity = capacity.max(1);
        let mut entries = VecDeque::with_capacity(capacity);
        entries.push_back(Arc::new(baseline));
        Self {
            entries,
            cursor: 0,
            capacity,
        }
    }

    /// Drop every entry and start over from `baseline`.
    pub fn reset(&mut self, baseline: Vec<Block>) {
        self.entries.clear();
        self.entries.push_back(Arc::new(baseline));
        self.cursor = 0;
    }

    /// Record a new snapshot after the cursor.
    ///
    /// The redo tail is discarded and the oldest entries are evicted once
    /// the capacity is exceeded.
    pub fn push(&mut self, snapshot: Vec<Block>) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(Arc::new(snapshot));
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Overwrite the entry at the cursor without adding an undo step.
    ///
    /// Keeps the current entry in line with changes that bypass history, so
    /// a later undo returns to what was live rather than to a stale copy.
    pub fn replace_current(&mut self, snapshot: Vec<Block>) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            *entry = Arc::new(snapshot);
        }
    }

    /// Step back one entry, returning the snapshot to restore.
    pub fn undo(&mut self) -> Option<Arc<Vec<Block>>> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).cloned()
    }

    /// Step forward one entry, returning the snapshot to restore.
    pub fn redo(&mut self) -> Option<Arc<Vec<Block>>> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).cloned()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of snapshots currently held, baseline included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
