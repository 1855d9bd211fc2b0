//! Operations a host can dispatch into the editor store.
//!
//! Every public store mutation has a serializable counterpart here so that a
//! driver (the CLI, a script, a remote UI) can replay a session.
//!
//! Uses tagged enum serialization for TypeScript compatibility:
//! ```json
//! {
//!   "type": "addBlock",
//!   "payload": {
//!     "subtype": "action-send-email",
//!     "index": 2
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::block_models::{Block, BlockId, BlockPatch};
use crate::record_models::BlockRecord;
use crate::template_models::TemplateBlock;
use crate::viewport_models::Point;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum EditorOp {
    /// Replace the pipeline with externally loaded records and reset history.
    Hydrate { blocks: Vec<BlockRecord> },

    /// Insert a block of `subtype`, appending when `index` is absent.
    ///
    /// An open placeholder takes precedence over `index`.
    AddBlock {
        subtype: String,
        #[serde(default)]
        index: Option<usize>,
    },

    /// Open (or move) the insertion placeholder.
    AddPlaceholder { index: usize },

    /// Cancel the insertion placeholder.
    RemovePlaceholder,

    /// Delete a block. Either half of a condition pair deletes both.
    RemoveBlock { id: BlockId },

    /// Bulk replace, as produced by drag-reordering.
    SetBlocks {
        blocks: Vec<Block>,
        #[serde(default, rename = "skipHistory", alias = "skip_history")]
        skip_history: bool,
    },

    /// Merge text fields into a block.
    UpdateBlock { id: BlockId, patch: BlockPatch },

    /// Append a template's blocks as a single undoable step.
    ApplyTemplate { blocks: Vec<TemplateBlock> },

    Undo,

    Redo,

    SetZoom { zoom: f64 },

    SetOffset { offset: Point },

    ZoomIn,

    ZoomOut,

    /// Zoom back to 1.0 and pan back to the origin.
    ResetView,
}
