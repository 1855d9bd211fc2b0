//! Aggregated editor configuration.

use crate::catalog::{Catalog, CatalogError};
use pe_protocol::block_models::CatalogEntry;
use pe_protocol::config_models::EditorSettings;

/// Everything loaded from a `.pipeline-editor/` directory.
///
/// # Example
///
/// ```rust,no_run
/// use pe_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("History keeps {} steps", config.settings.history_capacity);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct EditorConfig {
    /// Settings from `config.toml`.
    pub settings: EditorSettings,

    /// Extra catalog entries from `blocks/*.yaml`, in file name order.
    pub extra_blocks: Vec<CatalogEntry>,
}

impl EditorConfig {
    /// The built-in catalog extended with `extra_blocks`.
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        Catalog::with_extensions(self.extra_blocks.clone())
    }
}
