#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::element::Capabilities;

// =============================================================
// Helpers
// =============================================================

fn make_scene() -> Scene {
    Scene::new(SceneConfig { unit_scale: 1.0, ..SceneConfig::default() }).unwrap()
}

fn make_rect(x: f64) -> Element {
    Element::rect(x, 0.0, 10.0, 10.0)
}

fn add(scene: &mut Scene, element: Element) -> ElementId {
    let id = element.id;
    assert!(scene.add_element(element));
    id
}

fn order(scene: &Scene) -> Vec<ElementId> {
    scene.store().ids().to_vec()
}

fn editable() -> Capabilities {
    Capabilities { editable: true, ..Capabilities::default() }
}

// =============================================================
// Construction
// =============================================================

#[test]
fn new_rejects_invalid_config() {
    let bad = SceneConfig { undo_depth: 0, ..SceneConfig::default() };
    assert!(matches!(Scene::new(bad), Err(SceneError::InvalidUndoDepth(0))));
}

#[test]
fn new_scene_is_empty_and_clean() {
    let scene = make_scene();
    assert_eq!(scene.element_count(), 0);
    assert!(!scene.can_undo());
    assert!(!scene.has_unsaved_changes());
    assert!(scene.input_state().is_idle());
}

// =============================================================
// Add / remove / replace
// =============================================================

#[test]
fn add_puts_element_on_top_and_emits() {
    let mut scene = make_scene();
    let a = add(&mut scene, make_rect(0.0));
    let b = add(&mut scene, make_rect(20.0));
    assert_eq!(order(&scene), vec![b, a]);
    let events = scene.take_events();
    assert!(events.contains(&SceneEvent::ElementAdded(a)));
    assert!(events.contains(&SceneEvent::ElementAdded(b)));
    assert!(scene.take_events().is_empty());
}

#[test]
fn add_rejects_duplicate_id() {
    let mut scene = make_scene();
    let e = make_rect(0.0);
    let dup = e.clone();
    add(&mut scene, e);
    let undo_before = scene.history.undo_len();
    assert!(!scene.add_element(dup));
    assert_eq!(scene.element_count(), 1);
    assert_eq!(scene.history.undo_len(), undo_before);
}

#[test]
fn remove_returns_element_and_forgets_selection() {
    let mut scene = make_scene();
    let id = add(&mut scene, make_rect(0.0));
    scene.select_element(&id, false);
    let removed = scene.remove_element(&id).unwrap();
    assert_eq!(removed.id, id);
    assert!(scene.last_selected().is_none());
    assert!(scene.remove_element(&id).is_none());
}

#[test]
fn replace_keeps_layer() {
    let mut scene = make_scene();
    let a = add(&mut scene, make_rect(0.0));
    let b = add(&mut scene, make_rect(20.0));
    let c = add(&mut scene, make_rect(40.0));
    let new = make_rect(99.0);
    let new_id = new.id;
    assert!(scene.replace_element(&b, new));
    assert_eq!(order(&scene), vec![c, new_id, a]);
    assert!(scene.element(&b).is_none());
    assert!(scene.store().is_consistent());
}

#[test]
fn replace_rejects_missing_or_colliding() {
    let mut scene = make_scene();
    let a = add(&mut scene, make_rect(0.0));
    let b = add(&mut scene, make_rect(20.0));
    let collide = scene.element(&b).unwrap().clone();
    assert!(!scene.replace_element(&a, collide));
    assert!(!scene.replace_element(&Uuid::new_v4(), make_rect(5.0)));
    assert_eq!(order(&scene), vec![b, a]);
    assert!(scene.store().is_consistent());
}

#[test]
fn delete_selected_skips_immutable() {
    let mut scene = make_scene();
    let locked = make_rect(0.0).with_caps(Capabilities { mutable: false, ..Capabilities::default() });
    let locked_id = add(&mut scene, locked);
    let free = add(&mut scene, make_rect(20.0));
    scene.select_all();
    assert_eq!(scene.delete_selected(), 1);
    assert!(scene.element(&free).is_none());
    assert!(scene.element(&locked_id).is_some());
    assert!(scene.store().is_consistent());
}

#[test]
fn clear_all_is_one_undo_step() {
    let mut scene = make_scene();
    add(&mut scene, make_rect(0.0));
    add(&mut scene, make_rect(20.0));
    scene.clear_all();
    assert_eq!(scene.element_count(), 0);
    assert!(scene.store().is_consistent());
    assert!(scene.undo());
    assert_eq!(scene.element_count(), 2);
    assert!(scene.store().is_consistent());
}

// =============================================================
// Z-order
// =============================================================

#[test]
fn move_to_front_keeps_relative_order() {
    let mut scene = make_scene();
    let a = add(&mut scene, make_rect(0.0));
    let b = add(&mut scene, make_rect(20.0));
    let c = add(&mut scene, make_rect(40.0));
    scene.select_element(&a, false);
    scene.select_element(&b, false);
    assert!(scene.move_to_front());
    assert_eq!(order(&scene), vec![b, a, c]);
    assert_eq!(scene.last_repeat_operation().as_deref(), Some("Move to Front"));
}

#[test]
fn move_to_back_sends_selection_down() {
    let mut scene = make_scene();
    let a = add(&mut scene, make_rect(0.0));
    let b = add(&mut scene, make_rect(20.0));
    let c = add(&mut scene, make_rect(40.0));
    scene.select_element(&c, false);
    assert!(scene.move_to_back());
    assert_eq!(order(&scene), vec![b, a, c]);
}

#[test]
fn move_forward_does_not_swap_selected_neighbours() {
    let mut scene = make_scene();
    let a = add(&mut scene, make_rect(0.0));
    let b = add(&mut scene, make_rect(20.0));
    let c = add(&mut scene, make_rect(40.0));
    scene.select_element(&c, false);
    scene.select_element(&b, false);
    assert!(!scene.move_forward());
    assert_eq!(order(&scene), vec![c, b, a]);
    scene.deselect_element(&c);
    assert!(scene.move_forward());
    assert_eq!(order(&scene), vec![b, c, a]);
}

#[test]
fn move_backward_one_layer() {
    let mut scene = make_scene();
    let a = add(&mut scene, make_rect(0.0));
    let b = add(&mut scene, make_rect(20.0));
    scene.select_element(&b, false);
    assert!(scene.move_backward());
    assert_eq!(order(&scene), vec![a, b]);
    assert!(!scene.move_backward());
}

#[test]
fn reorder_without_movement_records_nothing() {
    let mut scene = make_scene();
    add(&mut scene, make_rect(0.0));
    let top = add(&mut scene, make_rect(20.0));
    scene.select_element(&top, false);
    let undo_before = scene.history.undo_len();
    assert!(!scene.move_to_front());
    assert_eq!(scene.history.undo_len(), undo_before);
}

// =============================================================
// Selection
// =============================================================

#[test]
fn select_none_clears_and_reports() {
    let mut scene = make_scene();
    let id = add(&mut scene, make_rect(0.0));
    scene.select_element(&id, false);
    scene.take_events();
    scene.select_none();
    assert!(scene.selected_elements().is_empty());
    let events = scene.take_events();
    assert!(events.contains(&SceneEvent::EditExited(id)));
    assert!(events.contains(&SceneEvent::ElementSelected(None)));
}

#[test]
fn select_next_cycles_through_layers() {
    let mut scene = make_scene();
    let a = add(&mut scene, make_rect(0.0));
    let b = add(&mut scene, make_rect(20.0));
    assert_eq!(scene.select_next(), Some(b));
    assert_eq!(scene.select_next(), Some(a));
    assert_eq!(scene.select_next(), Some(b));
    assert_eq!(scene.selected_elements().len(), 1);
    assert_eq!(scene.select_prev(), Some(a));
}

#[test]
fn unselectable_elements_are_skipped() {
    let mut scene = make_scene();
    let hidden = make_rect(0.0).with_caps(Capabilities { selectable: false, ..Capabilities::default() });
    let hidden_id = add(&mut scene, hidden);
    let shown = add(&mut scene, make_rect(20.0));
    assert!(!scene.select_element(&hidden_id, false));
    assert_eq!(scene.select_all(), 1);
    assert_eq!(scene.last_selected().unwrap().id, shown);
}

#[test]
fn edit_element_enters_pass_through() {
    let mut scene = make_scene();
    let id = add(&mut scene, make_rect(0.0).with_caps(editable()));
    add(&mut scene, make_rect(20.0));
    scene.select_all();
    assert!(scene.edit_element(&id));
    assert_eq!(scene.pass_through(), Some(id));
    assert_eq!(scene.selected_elements().len(), 1);
    assert!(scene.end_edit());
    assert_eq!(scene.pass_through(), None);
    assert!(scene.element(&id).unwrap().selected);
}

#[test]
fn select_with_pass_through_needs_editable() {
    let mut scene = make_scene();
    let plain = add(&mut scene, make_rect(0.0));
    assert!(scene.select_element(&plain, true));
    assert_eq!(scene.pass_through(), None);
    let edit = add(&mut scene, make_rect(20.0).with_caps(editable()));
    scene.select_element(&edit, true);
    assert_eq!(scene.pass_through(), Some(edit));
}

#[test]
fn switching_pass_through_target_exits_previous() {
    let mut scene = make_scene();
    let first = add(&mut scene, make_rect(0.0).with_caps(editable()));
    let second = add(&mut scene, make_rect(20.0).with_caps(editable()));
    scene.select_element(&first, true);
    scene.take_events();
    scene.select_element(&second, true);
    assert_eq!(scene.pass_through(), Some(second));
    let events = scene.take_events();
    let exited = events.iter().position(|e| *e == SceneEvent::EditExited(first)).unwrap();
    let entered = events.iter().position(|e| *e == SceneEvent::EditEntered { id: second, accepted: true }).unwrap();
    assert!(exited < entered);

    // Re-selecting the current target does not end its edit.
    scene.select_element(&second, true);
    assert!(!scene.take_events().contains(&SceneEvent::EditExited(second)));
}

// =============================================================
// Undo / redo
// =============================================================

#[test]
fn undo_and_redo_restore_store() {
    let mut scene = make_scene();
    let a = add(&mut scene, make_rect(0.0));
    let b = add(&mut scene, make_rect(20.0));
    assert!(scene.undo());
    assert_eq!(order(&scene), vec![a]);
    assert!(scene.store().is_consistent());
    assert!(scene.can_redo());
    assert!(scene.redo());
    assert_eq!(order(&scene), vec![b, a]);
    assert!(scene.store().is_consistent());
    assert!(!scene.redo());
}

#[test]
fn undo_reports_removed_and_added() {
    let mut scene = make_scene();
    let a = add(&mut scene, make_rect(0.0));
    let b = add(&mut scene, make_rect(20.0));
    scene.take_events();
    scene.undo();
    let events = scene.take_events();
    assert!(events.contains(&SceneEvent::ElementRemoved(b)));
    assert!(events.contains(&SceneEvent::ElementAdded(a)));
    assert!(!events.contains(&SceneEvent::ElementAdded(b)));
}

#[test]
fn new_command_clears_redo() {
    let mut scene = make_scene();
    add(&mut scene, make_rect(0.0));
    scene.undo();
    assert!(scene.can_redo());
    add(&mut scene, make_rect(20.0));
    assert!(!scene.can_redo());
}

#[test]
fn suspended_commands_share_one_step() {
    let mut scene = make_scene();
    scene.save_context();
    scene.suspend_save();
    add(&mut scene, make_rect(0.0));
    add(&mut scene, make_rect(20.0));
    scene.resume_save();
    assert!(scene.undo());
    assert_eq!(scene.element_count(), 0);
    assert!(!scene.can_undo());
}

#[test]
fn undo_depth_bounds_history() {
    let mut scene = Scene::new(SceneConfig { undo_depth: 2, unit_scale: 1.0, ..SceneConfig::default() }).unwrap();
    for i in 0..5 {
        add(&mut scene, make_rect(f64::from(i) * 20.0));
    }
    assert!(scene.undo());
    assert!(scene.undo());
    assert!(!scene.undo());
    assert_eq!(scene.element_count(), 3);
}

// =============================================================
// Clipboard
// =============================================================

#[test]
fn paste_offsets_and_selects_fresh_copies() {
    let mut scene = make_scene();
    let id = add(&mut scene, make_rect(0.0));
    scene.select_element(&id, false);
    assert_eq!(scene.copy(), 1);
    assert!(scene.paste());
    assert_eq!(scene.element_count(), 2);
    let pasted = scene.last_selected().unwrap();
    assert_ne!(pasted.id, id);
    assert!((pasted.x - 0.2).abs() < 1e-9);
    assert!(!scene.element(&id).unwrap().selected);
    assert!(scene.paste());
    let second = scene.last_selected().unwrap();
    assert!((second.x - 0.4).abs() < 1e-9);
}

#[test]
fn paste_is_one_undo_step() {
    let mut scene = make_scene();
    add(&mut scene, make_rect(0.0));
    add(&mut scene, make_rect(20.0));
    scene.select_all();
    scene.copy();
    scene.paste();
    assert_eq!(scene.element_count(), 4);
    assert!(scene.store().is_consistent());
    assert!(scene.undo());
    assert_eq!(scene.element_count(), 2);
    assert!(scene.store().is_consistent());
}

#[test]
fn paste_keeps_clipboard_order() {
    let mut scene = make_scene();
    add(&mut scene, make_rect(0.0));
    add(&mut scene, make_rect(20.0));
    scene.select_all();
    scene.copy();
    scene.paste();
    let xs: Vec<f64> = scene.store().iter().take(2).map(|e| e.x.round()).collect();
    assert_eq!(xs, vec![20.0, 0.0]);
}

#[test]
fn cut_removes_and_fills_clipboard() {
    let mut scene = make_scene();
    let id = add(&mut scene, make_rect(0.0));
    scene.select_element(&id, false);
    assert_eq!(scene.cut(), 1);
    assert_eq!(scene.element_count(), 0);
    assert!(scene.store().is_consistent());
    assert_eq!(scene.clipboard().len(), 1);
    assert!(scene.paste());
    assert_eq!(scene.element_count(), 1);
    assert!(scene.store().is_consistent());
}

#[test]
fn copy_skips_immutable_and_paste_needs_clipboard() {
    let mut scene = make_scene();
    let id = add(&mut scene, make_rect(0.0).with_caps(Capabilities { mutable: false, ..Capabilities::default() }));
    scene.select_element(&id, false);
    assert_eq!(scene.copy(), 0);
    assert!(!scene.paste());
}

// =============================================================
// Repeat
// =============================================================

#[test]
fn repeat_reruns_last_command_on_new_selection() {
    let mut scene = make_scene();
    let a = add(&mut scene, make_rect(0.0));
    let b = add(&mut scene, make_rect(20.0));
    scene.select_element(&a, false);
    scene.flip(true);
    scene.select_none();
    scene.select_element(&b, false);
    assert!(scene.repeat());
    assert!(scene.element(&b).unwrap().flip_horizontal);
    assert_eq!(scene.last_repeat_operation().as_deref(), Some("Flip Horizontal"));
}

#[test]
fn repeat_without_history_does_nothing() {
    let mut scene = make_scene();
    assert!(!scene.repeat());
    assert_eq!(scene.last_repeat_operation(), None);
}

#[test]
fn adding_clears_repeatable_command() {
    let mut scene = make_scene();
    let a = add(&mut scene, make_rect(0.0));
    scene.select_element(&a, false);
    scene.clear_shear();
    add(&mut scene, make_rect(20.0));
    assert_eq!(scene.last_repeat_operation(), None);
}

// =============================================================
// Zoom
// =============================================================

#[test]
fn zoom_commands_emit_changes() {
    let mut scene = make_scene();
    assert!(scene.zoom_in());
    assert_eq!(scene.camera.zoom, 1.25);
    assert!(scene.take_events().contains(&SceneEvent::ZoomChanged(1.25)));
    assert!(scene.reset_view());
    assert_eq!(scene.camera.zoom, 1.0);
    assert!(!scene.reset_view());
}

#[test]
fn zoom_disabled_blocks_steps() {
    let mut scene =
        Scene::new(SceneConfig { zoom_enabled: false, ..SceneConfig::default() }).unwrap();
    assert!(!scene.zoom_in());
    assert!(!scene.zoom_out());
    assert_eq!(scene.camera.zoom, 1.0);
}

#[test]
fn set_zoom_validates() {
    let mut scene = make_scene();
    assert!(scene.set_zoom(2.0).is_ok());
    assert!(scene.set_zoom(100.0).is_err());
    assert_eq!(scene.camera.zoom, 2.0);
}

// =============================================================
// Queries
// =============================================================

#[test]
fn printable_bounds_unions_printable_elements() {
    let mut scene = make_scene();
    add(&mut scene, Element::rect(1.0, 1.0, 2.0, 1.0));
    add(&mut scene, Element::rect(4.0, 0.0, 1.0, 1.0));
    add(
        &mut scene,
        Element::rect(50.0, 50.0, 1.0, 1.0).with_caps(Capabilities { printable: false, ..Capabilities::default() }),
    );
    let bounds = scene.printable_bounds(10.0).unwrap().unwrap();
    assert!((bounds.x0 - 10.0).abs() < 1e-9);
    assert!((bounds.y0 - 0.0).abs() < 1e-9);
    assert!((bounds.x1 - 50.0).abs() < 1e-9);
    assert!((bounds.y1 - 20.0).abs() < 1e-9);
}

#[test]
fn printable_bounds_rejects_bad_scale_and_empty_scene() {
    let scene = make_scene();
    assert!(matches!(scene.printable_bounds(0.0), Err(SceneError::InvalidScale(_))));
    assert_eq!(scene.printable_bounds(1.0).unwrap(), None);
}

#[test]
fn unsaved_flag_tracks_changes() {
    let mut scene = make_scene();
    add(&mut scene, make_rect(0.0));
    assert!(scene.has_unsaved_changes());
    scene.mark_as_saved();
    assert!(!scene.has_unsaved_changes());
    scene.undo();
    assert!(scene.has_unsaved_changes());
}

#[test]
fn elements_where_filters_top_down() {
    let mut scene = make_scene();
    add(&mut scene, make_rect(0.0));
    let b = add(&mut scene, make_rect(20.0));
    let found: Vec<ElementId> = scene.elements_where(|e| e.x > 10.0).map(|e| e.id).collect();
    assert_eq!(found, vec![b]);
    assert_eq!(scene.layer_index_of(&b), Some(0));
}
