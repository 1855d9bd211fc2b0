//! # pe-core
//!
//! Client-side state for the pipeline editor.
//!
//! This crate provides:
//! - The block sequence with paired condition end-markers and a singleton
//!   placeholder slot
//! - Bounded undo/redo history and a zoom/offset viewport
//! - Debounced autosave and a single-flight command session
//! - Configuration loading from the `.pipeline-editor/` directory
//!
//! ## Modules
//!
//! - [`editor`]: The pipeline store and its invariants
//! - [`catalog`]: Block subtype definitions
//! - [`validation`]: Pre-launch checks
//! - [`templates`]: Built-in workflow templates
//! - [`autosave`]: Snapshot observer that persists settled pipelines
//! - [`command`]: Transcript to workflow interpretation
//! - [`config`]: Configuration loading

pub mod autosave;
pub mod catalog;
pub mod command;
pub mod config;
pub mod editor;
pub mod templates;
pub mod validation;
