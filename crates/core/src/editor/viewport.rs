//! Zoom/offset state of the editing canvas.
//!
//! Independent from the pipeline and never recorded in history.

use pe_protocol::config_models::EditorSettings;
use pe_protocol::viewport_models::{Point, Viewport};
use tracing::{debug, warn};

const DEFAULT_ZOOM: f64 = 1.0;

/// Viewport plus the zoom bounds it is clamped to.
#[derive(Debug, Clone)]
pub struct ViewportState {
    viewport: Viewport,
    zoom_min: f64,
    zoom_max: f64,
    zoom_step: f64,
}

impl ViewportState {
    /// Build from settings, falling back to the default bounds when the
    /// configured range is unusable.
    pub fn new(settings: &EditorSettings) -> Self {
        let defaults = EditorSettings::default();
        let (zoom_min, zoom_max) = if settings.zoom_min.is_finite()
            && settings.zoom_max.is_finite()
            && settings.zoom_min > 0.0
            && settings.zoom_min <= settings.zoom_max
        {
            (settings.zoom_min, settings.zoom_max)
        } else {
            warn!(
                zoom_min = settings.zoom_min,
                zoom_max = settings.zoom_max,
                "Invalid zoom range, using defaults"
            );
            (defaults.zoom_min, defaults.zoom_max)
        };
        let zoom_step = if settings.zoom_step.is_finite() && settings.zoom_step > 0.0 {
            settings.zoom_step
        } else {
            defaults.zoom_step
        };

        Self {
            viewport: Viewport {
                zoom: DEFAULT_ZOOM.clamp(zoom_min, zoom_max),
                offset: Point::ORIGIN,
            },
            zoom_min,
            zoom_max,
            zoom_step,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom
    }

    pub fn offset(&self) -> Point {
        self.viewport.offset
    }

    pub fn zoom_bounds(&self) -> (f64, f64) {
        (self.zoom_min, self.zoom_max)
    }

    /// Set the zoom, clamped to the configured range. NaN is ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_nan() {
            debug!("Ignoring NaN zoom");
            return;
        }
        self.viewport.zoom = zoom.clamp(self.zoom_min, self.zoom_max);
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.viewport.offset = offset;
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.viewport.zoom + self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.viewport.zoom - self.zoom_step);
    }

    /// Back to 100% and the origin.
    pub fn reset(&mut self) {
        self.set_zoom(DEFAULT_ZOOM);
        self.viewport.offset = Point::ORIGIN;
    }
}
