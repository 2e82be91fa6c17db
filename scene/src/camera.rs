#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_ZOOM, MIN_ZOOM, ZOOM_IN_LIMIT, ZOOM_OUT_LIMIT, ZOOM_STEP};
use crate::error::SceneError;

/// Viewing state for the scene: zoom, origin and canvas bounds.
///
/// `origin` is in screen pixels and is where canvas (0, 0) lands on screen.
/// `zoom` is a scale factor (1.0 = no zoom).
/// `bounds` is the canvas extent in units; `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub origin: Point,
    pub zoom: f64,
    pub bounds: Option<Size>,
}

impl Default for Camera {
    fn default() -> Self {
        Self { origin: Point::ZERO, zoom: 1.0, bounds: None }
    }
}

impl Camera {
    /// Convert a screen-space point to canvas pixels at zoom 1.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new((screen.x - self.origin.x) / self.zoom, (screen.y - self.origin.y) / self.zoom)
    }

    /// Convert canvas pixels at zoom 1 to screen space.
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(world.x * self.zoom + self.origin.x, world.y * self.zoom + self.origin.y)
    }

    /// Convert a screen-space distance (pixels) to a canvas distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Step the zoom in. Returns false when already at the limit.
    pub fn zoom_in(&mut self) -> bool {
        if self.zoom < ZOOM_IN_LIMIT {
            self.zoom += ZOOM_STEP;
            true
        } else {
            false
        }
    }

    /// Step the zoom out. Returns false when already at the limit.
    pub fn zoom_out(&mut self) -> bool {
        if self.zoom > ZOOM_OUT_LIMIT {
            self.zoom -= ZOOM_STEP;
            true
        } else {
            false
        }
    }

    /// Back to zoom 1. Returns false when nothing changed.
    pub fn reset(&mut self) -> bool {
        let changed = (self.zoom - 1.0).abs() > f64::EPSILON;
        self.zoom = 1.0;
        changed
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), SceneError> {
        if !zoom.is_finite() || !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Err(SceneError::InvalidZoom(zoom));
        }
        self.zoom = zoom;
        Ok(())
    }

    /// Largest x (units) an element's left edge may be moved to.
    #[must_use]
    pub fn max_x_position(&self) -> f64 {
        self.bounds.map_or(f64::MAX, |b| b.width)
    }

    /// Largest y (units) an element's top edge may be moved to.
    #[must_use]
    pub fn max_y_position(&self) -> f64 {
        self.bounds.map_or(f64::MAX, |b| b.height)
    }

    /// Whether a canvas-pixel point lies within the canvas bounds.
    #[must_use]
    pub fn contains_world(&self, world: Point, unit_scale: f64) -> bool {
        match self.bounds {
            Some(b) => world.x < b.width * unit_scale && world.y < b.height * unit_scale,
            None => true,
        }
    }
}
