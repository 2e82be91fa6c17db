//! Geometry commands on the selection: move, rotate, shear, size, flip,
//! opacity.
//!
//! Every command is a no-op without a selection or while pass-through is
//! active, and snapshots the store before mutating it.

#[cfg(test)]
#[path = "manipulate_test.rs"]
mod manipulate_test;

use crate::consts::RIGHT_ANGLE;
use crate::element::{Element, ElementId};
use crate::engine::{RepeatableCommand, Scene, SceneEvent};
use crate::error::SceneError;

/// Rotations within this many degrees of a right angle count as on it.
const ANGLE_EPSILON: f64 = 1e-9;

/// Next right angle from `degrees` in the given direction. An angle already
/// on a right angle moves a full quarter turn.
#[must_use]
pub fn next_right_angle(degrees: f64, clockwise: bool) -> f64 {
    let steps = degrees / RIGHT_ANGLE;
    let rounded = steps.round();
    if (steps - rounded).abs() * RIGHT_ANGLE < ANGLE_EPSILON {
        let delta = if clockwise { 1.0 } else { -1.0 };
        return (rounded + delta) * RIGHT_ANGLE;
    }
    if clockwise { steps.ceil() * RIGHT_ANGLE } else { steps.floor() * RIGHT_ANGLE }
}

impl Scene {
    /// Apply `f` to every selected element after one snapshot.
    fn for_each_selected(&mut self, mut f: impl FnMut(&mut Element, (f64, f64))) -> bool {
        if !self.can_manipulate() {
            return false;
        }
        self.save_context();
        let limits = self.limits();
        let ids: Vec<ElementId> = self.selection.selected_ids(&self.store);
        for id in &ids {
            if let Some(element) = self.store.get_mut(id) {
                f(element, limits);
            }
        }
        self.emit(SceneEvent::RenderNeeded);
        true
    }

    /// Move the selection by a delta in units.
    pub fn move_selected(&mut self, dx: f64, dy: f64) -> bool {
        self.for_each_selected(|e, (max_x, max_y)| {
            e.move_by(dx, dy, max_x, max_y);
        })
    }

    /// Move the selection by a delta in screen pixels.
    pub fn nudge_selected(&mut self, dx: f64, dy: f64) -> bool {
        let per_unit = self.camera.zoom * self.config.unit_scale;
        self.move_selected(dx / per_unit, dy / per_unit)
    }

    pub fn rotate_selected(&mut self, degrees: f64) -> bool {
        self.for_each_selected(|e, _| e.rotate(degrees))
    }

    /// Snap each selected element to its next right angle.
    pub fn rotate_90(&mut self, clockwise: bool) -> bool {
        let changed = self.for_each_selected(|e, _| e.set_rotation(next_right_angle(e.rotation, clockwise)));
        self.last_command = Some(RepeatableCommand::Rotate90 { clockwise });
        changed
    }

    /// Add to the shear ratio along one axis.
    pub fn shear_selected(&mut self, horizontal: bool, delta: f64) -> bool {
        self.for_each_selected(|e, _| {
            if horizontal {
                e.shear_by_x(delta);
            } else {
                e.shear_by_y(delta);
            }
        })
    }

    pub fn set_shear(&mut self, horizontal: bool, ratio: f64) -> bool {
        let changed = self.for_each_selected(|e, _| {
            if horizontal {
                e.set_shear_x(ratio);
            } else {
                e.set_shear_y(ratio);
            }
        });
        self.last_command = Some(RepeatableCommand::SetShear { horizontal, ratio });
        changed
    }

    pub fn clear_shear(&mut self) -> bool {
        let changed = self.for_each_selected(|e, _| {
            e.set_shear_x(0.0);
            e.set_shear_y(0.0);
        });
        self.last_command = Some(RepeatableCommand::ClearShear);
        changed
    }

    pub fn flip(&mut self, horizontal: bool) -> bool {
        let changed = self.for_each_selected(|e, _| if horizontal { e.flip_h() } else { e.flip_v() });
        self.last_command = Some(RepeatableCommand::Flip { horizontal });
        changed
    }

    /// Grow the selection by `delta` pixels keeping each aspect ratio.
    ///
    /// Applies to fixed-size elements too.
    pub fn size_selected(&mut self, delta: f64) -> bool {
        let min = self.config.drag_box_size;
        let scale = self.config.unit_scale;
        self.for_each_selected(|e, _| {
            let resizable = e.caps.resizable;
            e.caps.resizable = true;
            e.increase_size_maintain_aspect(delta, min, scale);
            e.caps.resizable = resizable;
        })
    }

    /// Grow width and height independently by pixel deltas.
    pub fn resize_selected(&mut self, dw: f64, dh: f64) -> bool {
        let min = self.config.drag_box_size;
        let scale = self.config.unit_scale;
        self.for_each_selected(|e, _| {
            e.increase_size(dw, dh, min, scale);
        })
    }

    /// Set the opacity of the selection. Out-of-range values are rejected
    /// before anything is recorded.
    pub fn set_opacity(&mut self, opacity: f64) -> Result<bool, SceneError> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(SceneError::InvalidOpacity(opacity));
        }
        let mut result = Ok(());
        let changed = self.for_each_selected(|e, _| {
            if let Err(err) = e.set_opacity(opacity) {
                result = Err(err);
            }
        });
        result.map(|()| changed)
    }
}
