//! Debounced autosave.
//!
//! An [`Autosave`] task watches a store's snapshots and writes the pipeline
//! to a [`PipelineSink`] once edits have settled. The task owns no editor
//! state; it only reads published snapshots, so the store stays usable while
//! a save is in flight.
//!
//! An autosave task is bound to one workflow and one hydration epoch. When
//! the store is hydrated with another pipeline the task retires, and a save
//! that completes after such a switch is discarded.

use crate::editor::PipelineSnapshot;
use async_trait::async_trait;
use pe_protocol::record_models::PersistedBlock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Destination for saved pipelines.
#[async_trait]
pub trait PipelineSink: Send + Sync {
    /// Replace the stored blocks of `workflow_id` with `blocks`.
    async fn save(&self, workflow_id: &str, blocks: Vec<PersistedBlock>) -> anyhow::Result<()>;
}

/// Progress of the autosave task, as shown next to the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// Nothing to save.
    Idle,

    /// Changes are waiting for the debounce window to close.
    Pending,

    Saving { revision: u64 },

    Saved { revision: u64 },

    Failed { revision: u64, message: String },

    /// The save finished after the store switched pipelines.
    Discarded { revision: u64 },

    /// The store moved to another pipeline; the task has stopped.
    Retired,
}

/// Spawner for autosave tasks.
pub struct Autosave;

impl Autosave {
    /// Start autosaving `workflow_id` on the current tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `workflow_id` - Passed through to the sink
    /// * `changes` - Receiver from [`PipelineStore::subscribe`]
    /// * `sink` - Where settled pipelines are written
    /// * `debounce` - Quiet period required before a save starts
    ///
    /// [`PipelineStore::subscribe`]: crate::editor::PipelineStore::subscribe
    pub fn spawn(
        workflow_id: impl Into<String>,
        changes: watch::Receiver<PipelineSnapshot>,
        sink: Arc<dyn PipelineSink>,
        debounce: Duration,
    ) -> AutosaveHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());
        let (status_tx, status) = watch::channel(SaveStatus::Idle);

        let bound_epoch = match changes.borrow().epoch {
            0 => None,
            epoch => Some(epoch),
        };

        let worker = Worker {
            workflow_id: workflow_id.into(),
            changes,
            sink,
            debounce,
            cancelled: Arc::clone(&cancelled),
            wake: Arc::clone(&wake),
            status: status_tx,
            bound_epoch,
            last_saved: None,
        };
        let task = tokio::spawn(worker.run());

        AutosaveHandle {
            cancelled,
            wake,
            status,
            task,
        }
    }
}

/// Handle to a running autosave task.
pub struct AutosaveHandle {
    cancelled: Arc<AtomicBool>,
    wake: Arc<Notify>,
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

impl AutosaveHandle {
    pub fn status(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }

    /// Stop the task. A pending save is dropped and an in-flight save is
    /// not reported.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel and wait for the task to exit.
    pub async fn shutdown(self) {
        self.cancel();
        if let Err(e) = self.task.await {
            warn!("Autosave task ended abnormally: {}", e);
        }
    }
}

struct Worker {
    workflow_id: String,
    changes: watch::Receiver<PipelineSnapshot>,
    sink: Arc<dyn PipelineSink>,
    debounce: Duration,
    cancelled: Arc<AtomicBool>,
    wake: Arc<Notify>,
    status: watch::Sender<SaveStatus>,
    bound_epoch: Option<u64>,
    last_saved: Option<u64>,
}

/// How waiting for the next change ended.
enum Wake {
    Changed,
    Closed,
    Cancelled,
}

impl Worker {
    async fn run(mut self) {
        debug!(workflow_id = %self.workflow_id, "Autosave started");

        loop {
            let mut closed = match self.next_change().await {
                Wake::Changed => false,
                Wake::Closed => break,
                Wake::Cancelled => return,
            };

            let latest = self.changes.borrow().clone();
            if !self.is_interesting(&latest) {
                if self.retired() {
                    return;
                }
                continue;
            }

            self.status.send_replace(SaveStatus::Pending);
            if !closed {
                match self.settle().await {
                    Wake::Changed => {}
                    Wake::Closed => closed = true,
                    Wake::Cancelled => return,
                }
            }

            let snapshot = self.changes.borrow_and_update().clone();
            if self.is_interesting(&snapshot) {
                self.save(snapshot).await;
            } else {
                self.status.send_replace(SaveStatus::Idle);
            }

            if closed || self.is_cancelled() || self.retired() {
                break;
            }
        }

        debug!(workflow_id = %self.workflow_id, "Autosave stopped");
    }

    /// Wait for a snapshot newer than the last one seen.
    async fn next_change(&mut self) -> Wake {
        if self.is_cancelled() {
            return Wake::Cancelled;
        }
        tokio::select! {
            changed = self.changes.changed() => match changed {
                Ok(()) => Wake::Changed,
                Err(_) => Wake::Closed,
            },
            _ = self.wake.notified() => Wake::Cancelled,
        }
    }

    /// Wait until no change arrives for a full debounce window.
    ///
    /// Returns `Changed` once settled, `Closed` if the store went away (the
    /// latest snapshot is still saved) or `Cancelled`.
    async fn settle(&mut self) -> Wake {
        loop {
            let sleep = tokio::time::sleep(self.debounce);
            tokio::select! {
                _ = sleep => return Wake::Changed,
                changed = self.changes.changed() => {
                    if changed.is_err() {
                        return Wake::Closed;
                    }
                }
                _ = self.wake.notified() => return Wake::Cancelled,
            }
            if self.is_cancelled() {
                return Wake::Cancelled;
            }
        }
    }

    /// Whether `snapshot` should be written.
    ///
    /// Binds the task to the first hydrated epoch it sees.
    fn is_interesting(&mut self, snapshot: &PipelineSnapshot) -> bool {
        if snapshot.epoch == 0 {
            return false;
        }
        match self.bound_epoch {
            None => self.bound_epoch = Some(snapshot.epoch),
            Some(epoch) if epoch != snapshot.epoch => return false,
            Some(_) => {}
        }
        if snapshot.is_baseline {
            self.last_saved = Some(snapshot.revision);
            return false;
        }
        if snapshot.has_placeholder() {
            debug!(revision = snapshot.revision, "Placeholder open, not saving");
            return false;
        }
        self.last_saved != Some(snapshot.revision)
    }

    /// Whether the store has moved past the bound epoch. Updates the status
    /// when it has.
    fn retired(&self) -> bool {
        let current = self.changes.borrow().epoch;
        match self.bound_epoch {
            Some(epoch) if epoch != current => {
                info!(
                    workflow_id = %self.workflow_id,
                    epoch,
                    current,
                    "Pipeline replaced, autosave retiring"
                );
                self.status.send_replace(SaveStatus::Retired);
                true
            }
            _ => false,
        }
    }

    async fn save(&mut self, snapshot: PipelineSnapshot) {
        let revision = snapshot.revision;
        self.status.send_replace(SaveStatus::Saving { revision });
        debug!(workflow_id = %self.workflow_id, revision, "Saving pipeline");

        let result = self
            .sink
            .save(&self.workflow_id, snapshot.persisted_records())
            .await;

        if self.is_cancelled() {
            debug!(revision, "Autosave cancelled during save");
            return;
        }
        if self.changes.borrow().epoch != snapshot.epoch {
            warn!(
                workflow_id = %self.workflow_id,
                revision,
                "Discarding save result for a replaced pipeline"
            );
            self.status.send_replace(SaveStatus::Discarded { revision });
            return;
        }

        match result {
            Ok(()) => {
                self.last_saved = Some(revision);
                info!(
                    workflow_id = %self.workflow_id,
                    revision,
                    blocks = snapshot.blocks.len(),
                    "Pipeline saved"
                );
                self.status.send_replace(SaveStatus::Saved { revision });
            }
            Err(e) => {
                error!(
                    workflow_id = %self.workflow_id,
                    revision,
                    "Failed to save pipeline: {:#}",
                    e
                );
                self.status.send_replace(SaveStatus::Failed {
                    revision,
                    message: e.to_string(),
                });
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
