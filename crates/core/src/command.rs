//! Natural-language command session.
//!
//! A [`CommandSession`] turns a free-form transcript ("auto reply to my
//! gmail") into a list of block subtypes through a [`CommandInterpreter`].
//! The session handles cancel phrases, rejects overlapping transcripts and
//! discards results that arrive after the user cancelled. Applying the
//! outcome to a store is left to the caller.

use crate::templates::TemplateLibrary;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Phrases that cancel instead of building a workflow.
pub const CANCEL_KEYWORDS: &[&str] = &[
    "never mind",
    "nevermind",
    "cancel",
    "stop",
    "forget it",
    "no thanks",
];

/// Turns a transcript into an ordered list of block subtypes.
#[async_trait]
pub trait CommandInterpreter: Send + Sync {
    async fn interpret(&self, transcript: &str) -> anyhow::Result<Vec<String>>;
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to interpret command: {0}")]
    Interpreter(#[source] anyhow::Error),
}

/// Result of handing one transcript to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The transcript was a cancel phrase.
    Cancelled,

    /// Another transcript is still being processed.
    Busy,

    /// The session was cancelled while this transcript was processed.
    Discarded,

    /// Subtypes to insert, in order.
    Workflow(Vec<String>),

    /// Nothing recognizable in the transcript.
    Empty,
}

/// Whether `transcript` is a cancel phrase.
pub fn is_cancel_phrase(transcript: &str) -> bool {
    let transcript = transcript.to_lowercase();
    CANCEL_KEYWORDS.iter().any(|k| transcript.contains(k))
}

/// Single-flight front end for a [`CommandInterpreter`].
pub struct CommandSession {
    interpreter: Arc<dyn CommandInterpreter>,
    processing: AtomicBool,
    generation: AtomicU64,
}

impl CommandSession {
    pub fn new(interpreter: Arc<dyn CommandInterpreter>) -> Self {
        Self {
            interpreter,
            processing: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// Process one transcript.
    ///
    /// # Errors
    ///
    /// Returns `CommandError` if the interpreter fails. A failure after
    /// `cancel()` is reported as `Discarded` instead.
    pub async fn process(&self, transcript: &str) -> Result<CommandOutcome, CommandError> {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Ok(CommandOutcome::Empty);
        }
        if is_cancel_phrase(transcript) {
            debug!("Cancel phrase received");
            self.cancel();
            return Ok(CommandOutcome::Cancelled);
        }

        // Read before claiming the slot so a cancel landing right after the
        // claim still counts against this transcript.
        let generation = self.generation.load(Ordering::SeqCst);
        if self
            .processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Command ignored, another command is processing");
            return Ok(CommandOutcome::Busy);
        }
        let _guard = ProcessingGuard(&self.processing);

        let result = self.interpreter.interpret(transcript).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            info!("Command cancelled while processing, result discarded");
            return Ok(CommandOutcome::Discarded);
        }

        match result {
            Ok(subtypes) if subtypes.is_empty() => Ok(CommandOutcome::Empty),
            Ok(subtypes) => {
                info!(blocks = subtypes.len(), "Command produced workflow");
                Ok(CommandOutcome::Workflow(subtypes))
            }
            Err(e) => {
                warn!("Command interpretation failed: {:#}", e);
                Err(CommandError::Interpreter(e))
            }
        }
    }

    /// Cancel the transcript being processed, if any.
    ///
    /// Returns whether there was anything to cancel.
    pub fn cancel(&self) -> bool {
        if !self.is_processing() {
            return false;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        true
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }
}

struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Interpreter that matches transcripts against a [`TemplateLibrary`].
pub struct TemplateInterpreter {
    library: TemplateLibrary,
}

impl TemplateInterpreter {
    pub fn new(library: TemplateLibrary) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &TemplateLibrary {
        &self.library
    }
}

#[async_trait]
impl CommandInterpreter for TemplateInterpreter {
    async fn interpret(&self, transcript: &str) -> anyhow::Result<Vec<String>> {
        Ok(self
            .library
            .find_matching(transcript)
            .map(|template| {
                template
                    .blocks
                    .iter()
                    .map(|block| block.subtype.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_phrases() {
        assert!(is_cancel_phrase("Never mind"));
        assert!(is_cancel_phrase("ok, forget it"));
        assert!(is_cancel_phrase("STOP"));
        assert!(!is_cancel_phrase("reply to my email"));
    }

    #[tokio::test]
    async fn test_template_interpreter() {
        let session = CommandSession::new(Arc::new(TemplateInterpreter::new(
            TemplateLibrary::builtin().unwrap(),
        )));

        let outcome = session.process("send email to the team").await.unwrap();
        let CommandOutcome::Workflow(subtypes) = outcome else {
            panic!("expected workflow, got {:?}", outcome);
        };
        assert!(subtypes.contains(&"action-send-email".to_string()));

        assert_eq!(
            session.process("order a pizza").await.unwrap(),
            CommandOutcome::Empty
        );
        assert_eq!(session.process("   ").await.unwrap(), CommandOutcome::Empty);
        assert_eq!(
            session.process("never mind").await.unwrap(),
            CommandOutcome::Cancelled
        );
        assert!(!session.is_processing());
    }

    /// Cancels its own session as soon as interpretation starts.
    struct SelfCancelling(std::sync::OnceLock<std::sync::Weak<CommandSession>>);

    #[async_trait]
    impl CommandInterpreter for SelfCancelling {
        async fn interpret(&self, _transcript: &str) -> anyhow::Result<Vec<String>> {
            if let Some(session) = self.0.get().and_then(std::sync::Weak::upgrade) {
                assert!(session.cancel());
            }
            Ok(vec!["action-send-email".to_string()])
        }
    }

    #[tokio::test]
    async fn test_cancel_right_after_claim_discards() {
        let interpreter = Arc::new(SelfCancelling(std::sync::OnceLock::new()));
        let session = Arc::new(CommandSession::new(interpreter.clone()));
        interpreter.0.set(Arc::downgrade(&session)).unwrap();

        let outcome = session.process("send an email").await.unwrap();
        assert_eq!(outcome, CommandOutcome::Discarded);
        assert!(!session.is_processing());
        // An idle cancel does not poison the next transcript
        assert!(!session.cancel());
    }

    #[test]
    fn test_cancel_when_idle_is_noop() {
        let session = CommandSession::new(Arc::new(TemplateInterpreter::new(
            TemplateLibrary::default(),
        )));
        assert!(!session.cancel());
        assert!(!session.cancel());
    }
}
