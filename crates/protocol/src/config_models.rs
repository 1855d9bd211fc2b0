//! Editor settings for `.pipeline-editor/config.toml`.
//!
//! Every field has a default, so a missing file or a partial file is valid.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Tunables for a pipeline editor instance.
///
/// # Example
///
/// ```toml
/// # .pipeline-editor/config.toml
/// history-capacity = 50
/// zoom-min = 0.4
/// zoom-max = 2.0
/// zoom-step = 0.1
/// autosave-debounce-ms = 1000
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "kebab-case", default)]
pub struct EditorSettings {
    /// Maximum number of pipeline snapshots kept for undo/redo.
    pub history_capacity: usize,

    /// Lower zoom bound.
    pub zoom_min: f64,

    /// Upper zoom bound.
    pub zoom_max: f64,

    /// Increment used by zoom-in/zoom-out controls.
    pub zoom_step: f64,

    /// Quiescence window before the autosave observer commits a pipeline.
    pub autosave_debounce_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            zoom_min: 0.4,
            zoom_max: 2.0,
            zoom_step: 0.1,
            autosave_debounce_ms: 1000,
        }
    }
}
