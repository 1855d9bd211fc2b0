//! Pipeline editor state machine.
//!
//! This module provides:
//! - [`PipelineStore`]: the owner of the block sequence, history and viewport
//! - Condition / end-marker pairing helpers and invariant checks
//! - Bounded undo/redo history
//! - Viewport zoom clamping

pub mod error;
pub mod history;
pub mod pairing;
pub mod store;
pub mod viewport;

pub use error::{EditorError, EditorResult};
pub use store::{PipelineSnapshot, PipelineStore};
