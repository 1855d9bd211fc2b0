//! Configuration file loader for the `.pipeline-editor/` directory.
//!
//! The directory is optional, and so is every file in it:
//! - `config.toml`: editor settings
//! - `blocks/*.yaml`: extra block catalog entries

use crate::catalog::Catalog;
use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::EditorConfig;
use pe_protocol::block_models::CatalogEntry;
use pe_protocol::config_models::EditorSettings;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Name of the configuration directory under the project root.
pub const CONFIG_DIR: &str = ".pipeline-editor";

/// Loads all configuration from the `.pipeline-editor/` directory.
///
/// # Arguments
///
/// * `root` - Directory containing the `.pipeline-editor/` folder
///
/// # Returns
///
/// The loaded configuration. Missing directories or files yield defaults
/// rather than errors.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid TOML or YAML syntax
/// - Settings are out of range (for example `zoom-min` above `zoom-max`)
/// - A block definition uses a reserved subtype or a system kind
pub async fn load_config(root: &Path) -> ConfigResult<EditorConfig> {
    let config_dir = root.join(CONFIG_DIR);

    if !config_dir.exists() {
        debug!(path = %config_dir.display(), "No config directory, using defaults");
        return Ok(EditorConfig::default());
    }

    let settings = load_settings(&config_dir)?;
    let extra_blocks = load_blocks(&config_dir)?;

    Ok(EditorConfig {
        settings,
        extra_blocks,
    })
}

/// Loads editor settings from `config.toml`.
fn load_settings(config_dir: &Path) -> ConfigResult<EditorSettings> {
    let config_path = config_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(EditorSettings::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let settings: EditorSettings =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path.clone(),
            source,
        })?;

    validate_settings(&settings).map_err(|reason| ConfigError::InvalidConfig {
        path: config_path,
        reason,
    })?;

    Ok(settings)
}

fn validate_settings(settings: &EditorSettings) -> Result<(), String> {
    if settings.history_capacity == 0 {
        return Err("history-capacity must be at least 1".to_string());
    }
    if !(settings.zoom_min.is_finite() && settings.zoom_min > 0.0) {
        return Err(format!(
            "zoom-min must be a positive number, got {}",
            settings.zoom_min
        ));
    }
    if !settings.zoom_max.is_finite() || settings.zoom_max < settings.zoom_min {
        return Err(format!(
            "zoom-max ({}) must not be below zoom-min ({})",
            settings.zoom_max, settings.zoom_min
        ));
    }
    if !(settings.zoom_step.is_finite() && settings.zoom_step > 0.0) {
        return Err(format!(
            "zoom-step must be a positive number, got {}",
            settings.zoom_step
        ));
    }
    Ok(())
}

/// Loads extra catalog entries from `blocks/*.yaml`.
///
/// Each file holds a YAML list of entries. Files are read in name order so
/// later files override earlier ones deterministically.
fn load_blocks(config_dir: &Path) -> ConfigResult<Vec<CatalogEntry>> {
    let blocks_dir = config_dir.join("blocks");

    if !blocks_dir.exists() {
        return Ok(Vec::new());
    }

    let mut blocks = Vec::new();

    for entry in WalkDir::new(&blocks_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: blocks_dir.clone(),
            source,
        })?;

        let path = entry.path();

        let ext = path.extension().and_then(|s| s.to_str());
        if ext != Some("yaml") && ext != Some("yml") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let entries: Vec<CatalogEntry> =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
                path: path.to_path_buf(),
                source,
            })?;

        Catalog::with_extensions(entries.clone()).map_err(|source| ConfigError::Catalog {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), count = entries.len(), "Loaded block definitions");
        blocks.extend(entries);
    }

    Ok(blocks)
}
