//! Error types for editor store operations.
//!
//! Only genuine misuse is an error. Operations on unknown ids, undo/redo at
//! the history boundaries and cancelling a missing placeholder are silent
//! no-ops.

use thiserror::Error;

/// Errors raised synchronously by [`PipelineStore`](super::PipelineStore).
///
/// A failed call never mutates the pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// The subtype has no catalog entry.
    #[error("Unknown block subtype '{0}'")]
    UnknownSubtype(String),

    /// The subtype names a block only the store itself may create.
    #[error("Subtype '{0}' is reserved for system blocks and cannot be added directly")]
    ReservedSubtype(String),
}

/// Type alias for Result with EditorError.
pub type EditorResult<T> = Result<T, EditorError>;
