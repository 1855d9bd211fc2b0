//! Configuration loading from the `.pipeline-editor/` directory.

pub mod error;
pub mod loader;
pub mod models;
