//! Test doubles for the async seams.

use async_trait::async_trait;
use pe_core::autosave::PipelineSink;
use pe_core::command::CommandInterpreter;
use pe_protocol::record_models::PersistedBlock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

/// One call to [`RecordingSink::save`].
#[derive(Debug, Clone)]
pub struct SaveCall {
    pub workflow_id: String,
    pub blocks: Vec<PersistedBlock>,
}

/// Sink that records every save, optionally slowly or failing.
#[derive(Default)]
pub struct RecordingSink {
    pub calls: Mutex<Vec<SaveCall>>,
    pub delay: Duration,
    pub fail: AtomicBool,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        let sink = Self::default();
        sink.fail.store(true, Ordering::SeqCst);
        Arc::new(sink)
    }

    pub async fn saves(&self) -> Vec<SaveCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl PipelineSink for RecordingSink {
    async fn save(&self, workflow_id: &str, blocks: Vec<PersistedBlock>) -> anyhow::Result<()> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("database unavailable");
        }
        self.calls.lock().await.push(SaveCall {
            workflow_id: workflow_id.to_string(),
            blocks,
        });
        Ok(())
    }
}

/// Interpreter that blocks until released, then returns fixed subtypes.
pub struct GatedInterpreter {
    pub started: Notify,
    pub release: Notify,
    pub subtypes: Vec<String>,
}

#[allow(dead_code)]
impl GatedInterpreter {
    pub fn new(subtypes: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            started: Notify::new(),
            release: Notify::new(),
            subtypes: subtypes.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[async_trait]
impl CommandInterpreter for GatedInterpreter {
    async fn interpret(&self, _transcript: &str) -> anyhow::Result<Vec<String>> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.subtypes.clone())
    }
}

/// Interpreter that always fails.
pub struct BrokenInterpreter;

#[async_trait]
impl CommandInterpreter for BrokenInterpreter {
    async fn interpret(&self, _transcript: &str) -> anyhow::Result<Vec<String>> {
        anyhow::bail!("speech service timed out")
    }
}
