//! # pe-protocol
//!
//! Shared data models for the pipeline editor.
//!
//! This crate defines every structure that crosses the editor's boundary:
//! - Blocks and block kinds as held by the editor store
//! - Catalog entries describing the available block subtypes
//! - Hydration and persistence records exchanged with the host application
//! - Viewport state and editor settings
//! - Serializable editor operations
//!
//! ## Modules
//!
//! - [`block_models`]: Blocks, kinds, catalog entries and patches
//! - [`record_models`]: Hydration input and persistence output rows
//! - [`template_models`]: Workflow template definitions
//! - [`viewport_models`]: Canvas zoom and offset
//! - [`config_models`]: Editor settings from `config.toml`
//! - [`ipc`]: Operations a host can dispatch into the editor
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde and ts-rs
//! - TypeScript generation: All types derive `TS` so the web host shares the shapes
//! - Independent compilation: No dependencies on other pipeline-editor crates

pub mod block_models;
pub mod config_models;
pub mod ipc;
pub mod record_models;
pub mod template_models;
pub mod viewport_models;

// Re-export all public types for convenience
pub use block_models::*;
pub use config_models::*;
pub use ipc::*;
pub use record_models::*;
pub use template_models::*;
pub use viewport_models::*;
