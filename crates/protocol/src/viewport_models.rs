//! Canvas viewport state.
//!
//! The viewport is mutated constantly while the user drags or scrolls the
//! canvas and is never part of undo/redo history.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A 2D translation in canvas pixels.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, TS)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Zoom factor and pan offset of the editing canvas.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, TS)]
pub struct Viewport {
    /// Scale factor, kept within the configured zoom range by the store.
    pub zoom: f64,

    /// Pan offset. Unconstrained.
    pub offset: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset: Point::ORIGIN,
        }
    }
}
