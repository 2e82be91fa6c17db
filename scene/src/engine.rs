use std::time::Instant;

use kurbo::{Point, Rect};

use crate::camera::Camera;
use crate::config::SceneConfig;
use crate::element::{Element, ElementId};
use crate::error::SceneError;
use crate::history::UndoStack;
use crate::hit::HitContext;
use crate::input::InputState;
use crate::selection::SelectionModel;
use crate::store::ZOrderStore;
use crate::transform::transformed_bounds;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// What a forwarded pass-through pointer event was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Wheel,
}

/// Notifications for the host, drained with [`Scene::take_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// Selection changed. Carries the last-selected element, if any.
    ElementSelected(Option<ElementId>),
    ElementAdded(ElementId),
    ElementRemoved(ElementId),
    ZoomChanged(f64),
    /// An element was asked to take pass-through input.
    EditEntered { id: ElementId, accepted: bool },
    EditExited(ElementId),
    /// Pointer pressed on the canvas, in canvas pixels.
    PointerPressed(Point),
    /// Pointer input routed to the pass-through element, in its local frame.
    PassThroughPointer { id: ElementId, local: Point, kind: PointerKind },
    ContextMenuRequested { screen: Point, target: Option<ElementId> },
    SetCursor(String),
    RenderNeeded,
}

/// Commands `repeat` can re-run, with their parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RepeatableCommand {
    ClearShear,
    SetShear { horizontal: bool, ratio: f64 },
    Flip { horizontal: bool },
    Rotate90 { clockwise: bool },
    Align(crate::align::Alignment),
    MoveToFront,
    MoveToBack,
    MoveForward,
    MoveBackward,
}

impl RepeatableCommand {
    /// Human-readable name for menus.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ClearShear => "Clear Shear",
            Self::SetShear { .. } => "Set Shear",
            Self::Flip { horizontal: true } => "Flip Horizontal",
            Self::Flip { horizontal: false } => "Flip Vertical",
            Self::Rotate90 { clockwise: true } => "Rotate Clockwise",
            Self::Rotate90 { clockwise: false } => "Rotate Counter-Clockwise",
            Self::Align(_) => "Align",
            Self::MoveToFront => "Move to Front",
            Self::MoveToBack => "Move to Back",
            Self::MoveForward => "Move Forward",
            Self::MoveBackward => "Move Backward",
        }
    }
}

/// Timing state for the wheel burst, press-and-hold and highlight tick.
#[derive(Debug, Clone, Default)]
pub(crate) struct GestureClock {
    pub pressed_at: Option<Instant>,
    pub last_wheel: Option<Instant>,
    pub last_highlight: Option<Instant>,
    pub highlight_on: bool,
    pub show_live_position: bool,
}

/// The editing session: element store, selection, history, camera and the
/// active gesture.
///
/// Every entry point runs to completion on the caller's thread. Mutating
/// commands snapshot the store before changing it; events accumulate until
/// the host drains them.
pub struct Scene {
    pub(crate) store: ZOrderStore,
    pub(crate) selection: SelectionModel,
    pub(crate) history: UndoStack<Vec<Element>>,
    pub camera: Camera,
    pub(crate) config: SceneConfig,
    pub(crate) input: InputState,
    /// Store contents at the last press, pushed on the first drag mutation.
    pub(crate) gesture_snapshot: Option<Vec<Element>>,
    pub(crate) clock: GestureClock,
    pub(crate) clipboard: Vec<Element>,
    pub(crate) last_command: Option<RepeatableCommand>,
    pub(crate) modified: bool,
    pub(crate) events: Vec<SceneEvent>,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;
        Ok(Self {
            store: ZOrderStore::new(),
            selection: SelectionModel::new(),
            history: UndoStack::new(config.undo_depth)?,
            camera: Camera::default(),
            config,
            input: InputState::Idle,
            gesture_snapshot: None,
            clock: GestureClock::default(),
            clipboard: Vec::new(),
            last_command: None,
            modified: false,
            events: Vec::new(),
        })
    }

    /// Drain pending notifications.
    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: SceneEvent) {
        self.events.push(event);
    }

    /// Report a new last-selected element. A selection change also ends
    /// the current wheel burst.
    pub(crate) fn selection_changed(&mut self, last: Option<ElementId>) {
        self.clock.last_wheel = None;
        self.emit(SceneEvent::ElementSelected(last));
        self.emit(SceneEvent::RenderNeeded);
    }

    // --- Undo context ---

    /// Record the current store contents. No-op while suspended.
    pub fn save_context(&mut self) {
        let snapshot = self.store.snapshot();
        self.save_snapshot(snapshot);
    }

    /// Record a snapshot taken before a mutation that has already happened.
    /// Recording a step ends the current wheel burst.
    pub(crate) fn save_snapshot(&mut self, snapshot: Vec<Element>) {
        self.modified = true;
        if self.history.save_context(snapshot) {
            self.clock.last_wheel = None;
        }
    }

    pub fn suspend_save(&mut self) {
        self.history.suspend_save();
    }

    pub fn resume_save(&mut self) {
        self.history.resume_save();
    }

    pub fn undo(&mut self) -> bool {
        let current = self.store.snapshot();
        let Some(previous) = self.history.undo(current) else {
            return false;
        };
        tracing::debug!(count = previous.len(), "undo");
        self.restore(previous);
        true
    }

    pub fn redo(&mut self) -> bool {
        let current = self.store.snapshot();
        let Some(next) = self.history.redo(current) else {
            return false;
        };
        tracing::debug!(count = next.len(), "redo");
        self.restore(next);
        true
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore(&mut self, snapshot: Vec<Element>) {
        let removed: Vec<ElementId> = self.store.ids().to_vec();
        for id in removed {
            self.emit(SceneEvent::ElementRemoved(id));
        }
        self.store.install(snapshot);
        let added: Vec<ElementId> = self.store.ids().to_vec();
        for id in added {
            self.emit(SceneEvent::ElementAdded(id));
        }
        self.select_none();
        self.modified = true;
        self.emit(SceneEvent::RenderNeeded);
    }

    // --- Store commands ---

    /// Add an element on top. Returns false on a duplicate id.
    pub fn add_element(&mut self, element: Element) -> bool {
        if self.store.contains(&element.id) {
            return false;
        }
        self.save_context();
        let id = element.id;
        self.store.add(element);
        tracing::debug!(%id, "element added");
        self.emit(SceneEvent::ElementAdded(id));
        self.emit(SceneEvent::RenderNeeded);
        self.last_command = None;
        true
    }

    /// Remove an element. Returns it, or `None` when absent.
    pub fn remove_element(&mut self, id: &ElementId) -> Option<Element> {
        if !self.store.contains(id) {
            return None;
        }
        self.save_context();
        let removed = self.detach(id);
        self.emit(SceneEvent::RenderNeeded);
        self.last_command = None;
        removed
    }

    /// Remove without snapshotting.
    pub(crate) fn detach(&mut self, id: &ElementId) -> Option<Element> {
        let removed = self.store.remove(id)?;
        self.selection.forget(id);
        tracing::debug!(%id, "element removed");
        self.emit(SceneEvent::ElementRemoved(*id));
        Some(removed)
    }

    /// Add on top without snapshotting.
    pub(crate) fn attach(&mut self, element: Element) -> bool {
        let id = element.id;
        if !self.store.add(element) {
            return false;
        }
        self.emit(SceneEvent::ElementAdded(id));
        true
    }

    /// Insert at a layer index without snapshotting.
    pub(crate) fn attach_at(&mut self, index: usize, element: Element) -> bool {
        let id = element.id;
        if !self.store.insert_at(index, element) {
            return false;
        }
        self.emit(SceneEvent::ElementAdded(id));
        true
    }

    /// Put `new` in place of `old`, keeping the layer.
    pub fn replace_element(&mut self, old: &ElementId, new: Element) -> bool {
        if !self.store.contains(old) || (new.id != *old && self.store.contains(&new.id)) {
            return false;
        }
        self.save_context();
        self.swap_in(old, new)
    }

    /// Replace without snapshotting.
    pub(crate) fn swap_in(&mut self, old: &ElementId, new: Element) -> bool {
        let new_id = new.id;
        if self.store.replace(old, new).is_none() {
            return false;
        }
        if new_id != *old {
            self.selection.forget(old);
            self.emit(SceneEvent::ElementRemoved(*old));
            self.emit(SceneEvent::ElementAdded(new_id));
        }
        tracing::debug!(%old, new = %new_id, "element replaced");
        self.emit(SceneEvent::RenderNeeded);
        true
    }

    /// Remove the selected mutable elements. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        if self.selection.is_pass_through() {
            return 0;
        }
        let ids: Vec<ElementId> =
            self.store.iter().filter(|e| e.selected && e.is_mutable()).map(|e| e.id).collect();
        if ids.is_empty() {
            return 0;
        }
        self.save_context();
        for id in &ids {
            self.detach(id);
        }
        self.last_command = None;
        let last = self.selection.last_selected(&self.store);
        self.selection_changed(last);
        ids.len()
    }

    /// Remove every element.
    pub fn clear_all(&mut self) {
        if self.store.is_empty() {
            return;
        }
        self.save_context();
        self.select_none();
        let ids: Vec<ElementId> = self.store.ids().to_vec();
        for id in &ids {
            self.detach(id);
        }
        self.last_command = None;
        self.emit(SceneEvent::RenderNeeded);
    }

    // --- Z-order commands on the selection ---

    pub fn move_to_front(&mut self) -> bool {
        let changed = self.reorder_selected(|store, ids| {
            // Bottom-most first so the selection keeps its relative order.
            ids.iter().rev().fold(false, |acc, id| store.move_to_front(id) | acc)
        });
        self.last_command = Some(RepeatableCommand::MoveToFront);
        changed
    }

    pub fn move_to_back(&mut self) -> bool {
        let changed = self.reorder_selected(|store, ids| {
            ids.iter().fold(false, |acc, id| store.move_to_back(id) | acc)
        });
        self.last_command = Some(RepeatableCommand::MoveToBack);
        changed
    }

    pub fn move_forward(&mut self) -> bool {
        let changed = self.reorder_selected(|store, ids| {
            let mut changed = false;
            for id in ids {
                let blocked = store
                    .layer_index_of(id)
                    .and_then(|i| i.checked_sub(1))
                    .and_then(|above| store.ids().get(above).copied())
                    .is_some_and(|above| ids.contains(&above));
                if !blocked {
                    changed |= store.move_forward(id);
                }
            }
            changed
        });
        self.last_command = Some(RepeatableCommand::MoveForward);
        changed
    }

    pub fn move_backward(&mut self) -> bool {
        let changed = self.reorder_selected(|store, ids| {
            let mut changed = false;
            for id in ids.iter().rev() {
                let blocked = store
                    .layer_index_of(id)
                    .and_then(|i| store.ids().get(i + 1).copied())
                    .is_some_and(|below| ids.contains(&below));
                if !blocked {
                    changed |= store.move_backward(id);
                }
            }
            changed
        });
        self.last_command = Some(RepeatableCommand::MoveBackward);
        changed
    }

    /// Run a reorder over the selected ids (top first). The pre-move state is
    /// recorded only when something moved.
    fn reorder_selected(&mut self, f: impl FnOnce(&mut ZOrderStore, &[ElementId]) -> bool) -> bool {
        if self.selection.is_pass_through() {
            return false;
        }
        let ids = self.selection.selected_ids(&self.store);
        if ids.is_empty() {
            return false;
        }
        let before = self.store.snapshot();
        if !f(&mut self.store, &ids) {
            return false;
        }
        self.save_snapshot(before);
        self.emit(SceneEvent::RenderNeeded);
        true
    }

    // --- Selection commands ---

    /// Select one element. With `pass_through`, also hand it input routing
    /// when it accepts editing.
    pub fn select_element(&mut self, id: &ElementId, pass_through: bool) -> bool {
        if !self.selection.select(&mut self.store, id) {
            return false;
        }
        if pass_through && self.store.get(id).is_some_and(Element::selected_for_edit) {
            if self.selection.pass_through().is_some_and(|current| current != *id) {
                self.end_edit();
            }
            self.selection.set_pass_through(&self.store, id);
            self.emit(SceneEvent::EditEntered { id: *id, accepted: true });
        }
        self.selection_changed(Some(*id));
        true
    }

    pub fn deselect_element(&mut self, id: &ElementId) -> bool {
        let was_pass_through = self.selection.pass_through() == Some(*id);
        if !self.selection.deselect(&mut self.store, id) {
            return false;
        }
        if was_pass_through {
            self.emit(SceneEvent::EditExited(*id));
        }
        let last = self.selection.last_selected(&self.store);
        self.selection_changed(last);
        true
    }

    pub fn select_all(&mut self) -> usize {
        let count = self.selection.select_all(&mut self.store);
        if count > 0 {
            let last = self.selection.last_selected(&self.store);
            self.selection_changed(last);
        }
        count
    }

    /// Deselect everything. Each deselected element is told its edit mode
    /// ended; pass-through, latches and the active gesture are cleared.
    pub fn select_none(&mut self) {
        let ended = self.selection.select_none(&mut self.store);
        for id in ended {
            self.emit(SceneEvent::EditExited(id));
        }
        self.reset_gesture();
        self.selection_changed(None);
    }

    pub fn select_next(&mut self) -> Option<ElementId> {
        let id = self.selection.select_next(&mut self.store)?;
        self.selection_changed(Some(id));
        Some(id)
    }

    pub fn select_prev(&mut self) -> Option<ElementId> {
        let id = self.selection.select_prev(&mut self.store)?;
        self.selection_changed(Some(id));
        Some(id)
    }

    /// Select `id` alone and offer it pass-through editing. Returns whether
    /// the element accepted.
    pub fn edit_element(&mut self, id: &ElementId) -> bool {
        if !self.store.get(id).is_some_and(Element::is_selectable) {
            return false;
        }
        self.select_none();
        self.selection.select(&mut self.store, id);
        let accepted = self.store.get(id).is_some_and(Element::selected_for_edit);
        if accepted {
            self.selection.set_pass_through(&self.store, id);
        }
        self.last_command = None;
        self.emit(SceneEvent::EditEntered { id: *id, accepted });
        self.selection_changed(Some(*id));
        accepted
    }

    /// End pass-through editing, keeping the selection.
    pub fn end_edit(&mut self) -> bool {
        let Some(id) = self.selection.clear_pass_through() else {
            return false;
        };
        self.emit(SceneEvent::EditExited(id));
        self.emit(SceneEvent::RenderNeeded);
        true
    }

    // --- Clipboard ---

    /// Copy the selected mutable elements. Returns how many were copied.
    pub fn copy(&mut self) -> usize {
        let copies: Vec<Element> = self
            .store
            .iter()
            .filter(|e| e.selected && e.is_mutable())
            .map(|e| e.copy_of(true))
            .collect();
        if copies.is_empty() {
            return 0;
        }
        self.clipboard = copies;
        self.clipboard.len()
    }

    pub fn cut(&mut self) -> usize {
        if self.copy() == 0 {
            return 0;
        }
        self.delete_selected()
    }

    /// Paste fresh copies of the clipboard on top, offset from the previous
    /// paste, and select them. One undo unit.
    pub fn paste(&mut self) -> bool {
        if self.clipboard.is_empty() || self.selection.is_pass_through() {
            return false;
        }
        self.save_context();
        self.suspend_save();
        self.select_none();
        let offset = self.config.paste_offset;
        let (max_x, max_y) = (self.camera.max_x_position(), self.camera.max_y_position());
        for item in &mut self.clipboard {
            item.move_by(offset, offset, max_x, max_y);
        }
        let pasted: Vec<Element> = self.clipboard.iter().rev().map(|e| e.copy_of(true)).collect();
        for element in pasted {
            let id = element.id;
            if self.attach(element) {
                self.selection.select(&mut self.store, &id);
            }
        }
        self.resume_save();
        let last = self.selection.last_selected(&self.store);
        self.selection_changed(last);
        true
    }

    #[must_use]
    pub fn clipboard(&self) -> &[Element] {
        &self.clipboard
    }

    // --- Repeat ---

    /// Re-run the last repeatable command on the current selection.
    pub fn repeat(&mut self) -> bool {
        let Some(command) = self.last_command else {
            return false;
        };
        match command {
            RepeatableCommand::ClearShear => self.clear_shear(),
            RepeatableCommand::SetShear { horizontal, ratio } => self.set_shear(horizontal, ratio),
            RepeatableCommand::Flip { horizontal } => self.flip(horizontal),
            RepeatableCommand::Rotate90 { clockwise } => self.rotate_90(clockwise),
            RepeatableCommand::Align(mode) => self.align(mode),
            RepeatableCommand::MoveToFront => self.move_to_front(),
            RepeatableCommand::MoveToBack => self.move_to_back(),
            RepeatableCommand::MoveForward => self.move_forward(),
            RepeatableCommand::MoveBackward => self.move_backward(),
        }
    }

    #[must_use]
    pub fn last_repeat_operation(&self) -> Option<String> {
        self.last_command.map(|command| match command {
            RepeatableCommand::Align(mode) => format!("Align {mode}"),
            other => other.label().to_string(),
        })
    }

    // --- Zoom ---

    pub fn zoom_in(&mut self) -> bool {
        if !self.config.zoom_enabled || !self.camera.zoom_in() {
            return false;
        }
        self.zoom_changed();
        true
    }

    pub fn zoom_out(&mut self) -> bool {
        if !self.config.zoom_enabled || !self.camera.zoom_out() {
            return false;
        }
        self.zoom_changed();
        true
    }

    pub fn reset_view(&mut self) -> bool {
        if !self.camera.reset() {
            return false;
        }
        self.zoom_changed();
        true
    }

    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), SceneError> {
        self.camera.set_zoom(zoom)?;
        self.zoom_changed();
        Ok(())
    }

    fn zoom_changed(&mut self) {
        tracing::debug!(zoom = self.camera.zoom, "zoom changed");
        self.emit(SceneEvent::ZoomChanged(self.camera.zoom));
        self.emit(SceneEvent::RenderNeeded);
    }

    // --- Queries ---

    #[must_use]
    pub fn store(&self) -> &ZOrderStore {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[must_use]
    pub fn input_state(&self) -> &InputState {
        &self.input
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.store.get(id)
    }

    /// Elements matching `pred`, top to bottom.
    pub fn elements_where<'a>(
        &'a self,
        pred: impl Fn(&Element) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.store.iter().filter(move |e| pred(e))
    }

    #[must_use]
    pub fn selected_elements(&self) -> Vec<&Element> {
        self.store.iter().filter(|e| e.selected).collect()
    }

    #[must_use]
    pub fn last_selected(&self) -> Option<&Element> {
        self.selection.last_selected(&self.store).and_then(|id| self.store.get(&id))
    }

    #[must_use]
    pub fn pass_through(&self) -> Option<ElementId> {
        self.selection.pass_through()
    }

    #[must_use]
    pub fn layer_index_of(&self, id: &ElementId) -> Option<usize> {
        self.store.layer_index_of(id)
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.modified
    }

    pub fn mark_as_saved(&mut self) {
        self.modified = false;
    }

    /// Union of the printable elements' transformed bounds at
    /// `resolution_scale` pixels per unit. `None` when nothing is printable.
    pub fn printable_bounds(&self, resolution_scale: f64) -> Result<Option<Rect>, SceneError> {
        if !(resolution_scale.is_finite() && resolution_scale > 0.0) {
            return Err(SceneError::InvalidScale(resolution_scale));
        }
        Ok(self
            .store
            .iter()
            .filter(|e| e.is_printable() && !e.is_unbounded())
            .map(|e| transformed_bounds(e, resolution_scale))
            .reduce(|acc, r| acc.union(r)))
    }

    /// Hit-test settings for the current camera and config.
    #[must_use]
    pub fn hit_context(&self, exclusive_pick: bool) -> HitContext {
        HitContext {
            scale: self.config.unit_scale,
            zoom: self.camera.zoom,
            drag_box_size: self.config.drag_box_size,
            shape_select_margin: self.config.shape_select_margin,
            exclusive_pick,
        }
    }

    pub(crate) fn can_manipulate(&self) -> bool {
        !self.selection.is_pass_through() && self.selection.has_selection(&self.store)
    }

    pub(crate) fn limits(&self) -> (f64, f64) {
        (self.camera.max_x_position(), self.camera.max_y_position())
    }
}
