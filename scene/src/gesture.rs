//! Pointer, wheel, key and tick handlers.
//!
//! Pointer positions arrive in screen pixels and are converted to canvas
//! pixels through the camera. A press starts a gesture session
//! ([`InputState`]); the matching release or [`Scene::cancel`] ends it. The
//! store contents at the press are recorded on the first mutation of the drag,
//! so a plain click leaves the undo history alone.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::time::{Duration, Instant};

use kurbo::{Point, Vec2};

use crate::config::HighlightAnimation;
use crate::consts::{
    HOLD_THRESHOLD_MS, ROTATION_MULTIPLIER, SHEAR_MULTIPLIER, SIZE_INCREASE_MULTIPLIER, WHEEL_BURST_MS,
};
use crate::element::ElementId;
use crate::engine::{PointerKind, Scene, SceneEvent};
use crate::hit::{HitPart, elements_within, hit_test, on_drag_box};
use crate::input::{Button, InputState, Key, KeyCommand, Modifiers, WheelDelta, WheelMode, key_command};
use crate::transform::{invert, lower_right_corner, rotate_shear, to_local};

const CURSOR_DEFAULT: &str = "default";
const CURSOR_MOVE: &str = "move";
const CURSOR_RESIZE: &str = "nwse-resize";

impl Scene {
    // --- Pointer ---

    pub fn on_pointer_down(&mut self, screen: Point, button: Button, mods: Modifiers, now: Instant) {
        let world = self.camera.screen_to_world(screen);
        if self.route_pass_through(world, PointerKind::Down) {
            return;
        }
        self.end_edit();

        let hit = hit_test(world, &self.store, &self.hit_context(mods.alt));
        if button == Button::Secondary {
            let target = hit.map(|h| h.element_id);
            self.emit(SceneEvent::ContextMenuRequested { screen, target });
            return;
        }
        self.emit(SceneEvent::PointerPressed(world));
        self.selection.latches.shift = mods.shift;
        self.selection.latches.alt = mods.alt;

        let Some(hit) = hit else {
            if !mods.shift {
                self.select_none();
            }
            self.input = InputState::DragSelecting { press: world, current: world };
            self.emit(SceneEvent::RenderNeeded);
            return;
        };

        let id = hit.element_id;
        let already = self.store.get(&id).is_some_and(|e| e.selected);
        if mods.shift && already {
            self.deselect_element(&id);
            return;
        }
        if !mods.shift && !already {
            self.select_none();
        }
        self.select_element(&id, false);

        self.input = match (hit.part, self.store.get(&id)) {
            (HitPart::DragBox, Some(element)) => {
                let scale = self.config.unit_scale;
                InputState::Resizing {
                    id,
                    press: world,
                    orig_width: element.width * scale,
                    orig_height: element.height * scale,
                    corner_offset: lower_right_corner(element, scale) - world,
                }
            }
            _ => InputState::MovingSelection { last: world },
        };
        self.gesture_snapshot = Some(self.store.snapshot());
        self.clock.pressed_at = Some(now);
    }

    pub fn on_pointer_move(&mut self, screen: Point, mods: Modifiers) {
        let world = self.camera.screen_to_world(screen);
        if self.route_pass_through(world, PointerKind::Move) {
            return;
        }
        match self.input.clone() {
            InputState::Idle => self.update_hover_cursor(world, mods),
            InputState::DragSelecting { press, .. } => {
                self.input = InputState::DragSelecting { press, current: world };
                self.emit(SceneEvent::RenderNeeded);
            }
            InputState::MovingSelection { last } => {
                self.drag_selection(world - last);
                self.input = InputState::MovingSelection { last: world };
            }
            InputState::Resizing { id, press, orig_width, orig_height, corner_offset } => {
                self.drag_resize(id, world, world - press, (orig_width, orig_height), corner_offset);
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen: Point, _mods: Modifiers) {
        let world = self.camera.screen_to_world(screen);
        if self.route_pass_through(world, PointerKind::Up) {
            return;
        }
        let mut picked = None;
        if let Some(rect) = self.input.drag_rect() {
            let ids = elements_within(&self.store, rect, self.config.unit_scale);
            for id in &ids {
                self.selection.select(&mut self.store, id);
            }
            if !ids.is_empty() {
                picked = Some(self.selection.last_selected(&self.store));
            }
        }
        self.reset_gesture();
        match picked {
            Some(last) => self.selection_changed(last),
            None => self.emit(SceneEvent::RenderNeeded),
        }
    }

    /// Double-click enters pass-through editing on the element under the
    /// pointer.
    pub fn on_double_click(&mut self, screen: Point) -> bool {
        let world = self.camera.screen_to_world(screen);
        match hit_test(world, &self.store, &self.hit_context(false)) {
            Some(hit) => self.edit_element(&hit.element_id),
            None => false,
        }
    }

    /// Clear the gesture session and pass-through routing without touching
    /// what the gesture already changed.
    pub fn cancel(&mut self) {
        self.reset_gesture();
        self.end_edit();
        self.emit(SceneEvent::RenderNeeded);
    }

    pub(crate) fn reset_gesture(&mut self) {
        self.input = InputState::Idle;
        self.gesture_snapshot = None;
        self.clock.pressed_at = None;
        self.clock.show_live_position = false;
    }

    /// Forward pointer input to the pass-through element. A press outside
    /// it ends pass-through and is not consumed.
    fn route_pass_through(&mut self, world: Point, kind: PointerKind) -> bool {
        let Some(id) = self.selection.pass_through() else {
            return false;
        };
        let scale = self.config.unit_scale;
        let local = self.store.get(&id).and_then(|e| {
            let local = to_local(e, scale, world)?;
            let inside = local.x >= 0.0 && local.y >= 0.0 && local.x <= e.width * scale && local.y <= e.height * scale;
            (inside || kind != PointerKind::Down).then_some(local)
        });
        match local {
            Some(local) => {
                self.emit(SceneEvent::PassThroughPointer { id, local, kind });
                true
            }
            None => false,
        }
    }

    /// Take the press-time snapshot into the undo history, once per gesture.
    fn commit_gesture_snapshot(&mut self) {
        if let Some(snapshot) = self.gesture_snapshot.take() {
            self.save_snapshot(snapshot);
        }
    }

    fn drag_selection(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO || !self.selection.has_selection(&self.store) {
            return;
        }
        self.commit_gesture_snapshot();
        let scale = self.config.unit_scale;
        let (max_x, max_y) = self.limits();
        let ids = self.selection.selected_ids(&self.store);
        for id in &ids {
            if let Some(element) = self.store.get_mut(id) {
                element.move_by(delta.x / scale, delta.y / scale, max_x, max_y);
            }
        }
        self.emit(SceneEvent::RenderNeeded);
    }

    /// Resize so the drag box stays under the pointer: the pointer delta is
    /// mapped into the element frame and added to the original size, then the
    /// element is moved so its transformed lower-right corner sits at the
    /// pointer plus the press-time offset.
    fn drag_resize(&mut self, id: ElementId, world: Point, delta: Vec2, orig: (f64, f64), corner_offset: Vec2) {
        let scale = self.config.unit_scale;
        let drag_box = self.config.drag_box_size;
        let (max_x, max_y) = self.limits();
        let Some(inverse) = self.store.get(&id).and_then(|e| invert(rotate_shear(e))) else {
            return;
        };
        let local_delta = (inverse * delta.to_point()).to_vec2();
        self.commit_gesture_snapshot();
        let Some(element) = self.store.get_mut(&id) else {
            return;
        };
        if !element.change_size(orig.0 + local_delta.x, orig.1 + local_delta.y, drag_box, scale) {
            return;
        }
        let target = world + corner_offset;
        let shift = target - lower_right_corner(element, scale);
        element.move_by(shift.x / scale, shift.y / scale, max_x, max_y);
        self.emit(SceneEvent::RenderNeeded);
    }

    fn update_hover_cursor(&mut self, world: Point, mods: Modifiers) {
        let ctx = self.hit_context(mods.alt);
        let cursor = match hit_test(world, &self.store, &ctx) {
            Some(hit) if hit.part == HitPart::DragBox => CURSOR_RESIZE,
            Some(hit) if self.store.get(&hit.element_id).is_some_and(|e| e.selected) => CURSOR_MOVE,
            _ => CURSOR_DEFAULT,
        };
        self.emit(SceneEvent::SetCursor(cursor.to_string()));
    }

    /// Whether the drag box of `id` is under the screen point.
    #[must_use]
    pub fn is_on_drag_box(&self, id: &ElementId, screen: Point) -> bool {
        let world = self.camera.screen_to_world(screen);
        self.store.get(id).is_some_and(|e| on_drag_box(e, world, &self.hit_context(false)))
    }

    // --- Wheel ---

    /// Size, rotate or shear the selection by wheel notches, depending on the
    /// latches. A burst of wheel events is one undo step.
    pub fn on_wheel(&mut self, delta: WheelDelta, now: Instant) -> bool {
        if !self.config.wheel_enabled {
            return false;
        }
        if let Some(id) = self.selection.pass_through() {
            let local = Point::new(0.0, delta.dy);
            self.emit(SceneEvent::PassThroughPointer { id, local, kind: PointerKind::Wheel });
            return true;
        }
        if !self.can_manipulate() {
            return false;
        }
        let burst = Duration::from_millis(WHEEL_BURST_MS);
        let new_burst = self.clock.last_wheel.is_none_or(|last| now.saturating_duration_since(last) > burst);
        if new_burst {
            self.save_context();
        }
        self.clock.last_wheel = Some(now);
        self.suspend_save();
        let notches = delta.dy * self.config.scroll_wheel_multiplier;
        match WheelMode::from_latches(self.selection.latches) {
            WheelMode::Size => self.size_selected(-notches * SIZE_INCREASE_MULTIPLIER),
            WheelMode::Rotate => self.rotate_selected(notches * ROTATION_MULTIPLIER),
            WheelMode::ShearX => self.shear_selected(true, notches * SHEAR_MULTIPLIER),
            WheelMode::ShearY => self.shear_selected(false, notches * SHEAR_MULTIPLIER),
        };
        self.resume_save();
        true
    }

    // --- Keys ---

    /// Handle a key press. Returns whether the scene consumed it.
    pub fn on_key_down(&mut self, key: &Key, mods: Modifiers) -> bool {
        self.selection.latches.shift = mods.shift || key.0 == "Shift";
        self.selection.latches.alt = mods.alt || key.0 == "Alt";
        if self.selection.is_pass_through() {
            if key.0 == "Escape" {
                self.select_none();
                return true;
            }
            return false;
        }
        let Some(command) = key_command(key, mods) else {
            return false;
        };
        match command {
            KeyCommand::SelectNext => self.select_next().is_some(),
            KeyCommand::SelectPrev => self.select_prev().is_some(),
            KeyCommand::SelectNone => {
                self.select_none();
                true
            }
            KeyCommand::ZoomIn => self.zoom_in(),
            KeyCommand::ZoomOut => self.zoom_out(),
            KeyCommand::MoveForward => self.move_forward(),
            KeyCommand::MoveBackward => self.move_backward(),
            KeyCommand::DeleteSelected => self.delete_selected() > 0,
            KeyCommand::Nudge { dx, dy } => self.nudge_selected(dx, dy),
            KeyCommand::Shear { horizontal, delta } => self.shear_selected(horizontal, delta),
            KeyCommand::Rotate(degrees) => self.rotate_selected(degrees),
            KeyCommand::Scale(delta) => self.size_selected(delta),
            KeyCommand::Resize { dw, dh } => self.resize_selected(dw, dh),
            KeyCommand::LatchShearX => {
                self.selection.latches.latch_shear_x();
                true
            }
            KeyCommand::LatchShearY => {
                self.selection.latches.latch_shear_y();
                true
            }
        }
    }

    pub fn on_key_up(&mut self, key: &Key, mods: Modifiers) {
        self.selection.latches.shift = mods.shift && key.0 != "Shift";
        self.selection.latches.alt = mods.alt && key.0 != "Alt";
    }

    // --- Tick ---

    /// Advance the highlight animation and the press-and-hold readout.
    pub fn tick(&mut self, now: Instant) {
        let interval = self.config.highlight.interval();
        if self.config.highlight != HighlightAnimation::None
            && self.clock.last_highlight.is_none_or(|last| now.saturating_duration_since(last) >= interval)
        {
            self.clock.last_highlight = Some(now);
            self.clock.highlight_on = !self.clock.highlight_on;
            if self.selection.has_selection(&self.store) {
                self.emit(SceneEvent::RenderNeeded);
            }
        }
        let held = self
            .clock
            .pressed_at
            .is_some_and(|at| now.saturating_duration_since(at) >= Duration::from_millis(HOLD_THRESHOLD_MS));
        if held && !self.clock.show_live_position && !self.input.is_idle() {
            self.clock.show_live_position = true;
            self.emit(SceneEvent::RenderNeeded);
        }
    }

    /// Phase of the selection-highlight animation.
    #[must_use]
    pub fn highlight_phase(&self) -> bool {
        self.clock.highlight_on
    }

    /// Position (units) of the element being dragged, once the press has
    /// been held long enough.
    #[must_use]
    pub fn live_position(&self) -> Option<Point> {
        if !self.clock.show_live_position {
            return None;
        }
        let element = match &self.input {
            InputState::Resizing { id, .. } => self.store.get(id),
            _ => self.last_selected(),
        }?;
        Some(element.position(1.0))
    }
}
