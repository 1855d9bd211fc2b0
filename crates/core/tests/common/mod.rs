//! Shared helpers for the integration tests.
//!
//! - Store and record fixtures
//! - Pairing assertions
//! - Recording sinks and interpreters for the async observers

pub mod fixtures;
pub mod mocks;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mocks::*;
