use super::*;
use crate::config::SceneConfig;
use crate::element::Capabilities;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn make_scene() -> Scene {
    Scene::new(SceneConfig::default()).unwrap()
}

fn add_selected(scene: &mut Scene, element: Element) -> ElementId {
    let id = element.id;
    scene.add_element(element);
    scene.select_element(&id, false);
    id
}

/// Three selected rectangles, returned bottom-first.
fn make_trio(scene: &mut Scene) -> Vec<ElementId> {
    vec![
        add_selected(scene, Element::rect(1.0, 1.0, 2.0, 1.0)),
        add_selected(scene, Element::rect(4.0, 2.0, 1.0, 3.0).with_rotation(30.0)),
        add_selected(scene, Element::rect(2.0, 6.0, 4.0, 0.5)),
    ]
}

fn group_data(element: &Element) -> &Group {
    match &element.kind {
        ElementKind::Group(group) => group,
        other => panic!("expected a group, got {other:?}"),
    }
}

fn assert_same_geometry(a: &Element, b: &Element) {
    assert_eq!(a.id, b.id);
    assert!(approx_eq(a.x, b.x), "x {} vs {}", a.x, b.x);
    assert!(approx_eq(a.y, b.y), "y {} vs {}", a.y, b.y);
    assert!(approx_eq(a.width, b.width));
    assert!(approx_eq(a.height, b.height));
    assert!(approx_eq(a.rotation, b.rotation));
    assert_eq!(a.flip_horizontal, b.flip_horizontal);
    assert_eq!(a.flip_vertical, b.flip_vertical);
}

// =============================================================
// Group
// =============================================================

#[test]
fn group_wraps_selection_on_top() {
    let mut scene = make_scene();
    let below = Element::rect(20.0, 20.0, 1.0, 1.0);
    scene.add_element(below);
    let ids = make_trio(&mut scene);
    assert!(scene.group_selected());
    assert_eq!(scene.element_count(), 2);

    let group = scene.store().iter().next().unwrap();
    assert!(group.is_group());
    assert!(group.selected);
    let children: Vec<ElementId> = group_data(group).children.iter().map(|c| c.id).collect();
    assert_eq!(children, ids);
    assert!(group_data(group).children.iter().all(|c| !c.selected));
    assert!(scene.store().is_consistent());
}

#[test]
fn group_bounds_enclose_transformed_children() {
    let mut scene = make_scene();
    add_selected(&mut scene, Element::rect(0.0, 0.0, 2.0, 2.0));
    // 4x2 rotated a quarter turn about (7, 1): covers x 6..8, y -1..3.
    add_selected(&mut scene, Element::rect(5.0, 0.0, 4.0, 2.0).with_rotation(90.0));
    scene.group_selected();
    let group = scene.store().iter().next().unwrap();
    assert!(approx_eq(group.x, 0.0));
    assert!(approx_eq(group.y, -1.0));
    assert!(approx_eq(group.width, 8.0));
    assert!(approx_eq(group.height, 4.0));
    let first = &group_data(group).children[0];
    assert!(approx_eq(first.y, 1.0));
}

#[test]
fn group_is_one_undo_step() {
    let mut scene = make_scene();
    let ids = make_trio(&mut scene);
    scene.group_selected();
    assert!(scene.undo());
    assert_eq!(scene.element_count(), 3);
    for id in &ids {
        assert!(scene.element(id).is_some());
    }
}

#[test]
fn group_needs_two_eligible() {
    let mut scene = make_scene();
    add_selected(&mut scene, Element::rect(0.0, 0.0, 1.0, 1.0));
    add_selected(
        &mut scene,
        Element::rect(2.0, 0.0, 1.0, 1.0).with_caps(Capabilities { groupable: false, ..Capabilities::default() }),
    );
    add_selected(
        &mut scene,
        Element::rect(4.0, 0.0, 1.0, 1.0).with_caps(Capabilities { mutable: false, ..Capabilities::default() }),
    );
    let undo_before = scene.history.undo_len();
    assert!(!scene.group_selected());
    assert_eq!(scene.element_count(), 3);
    assert_eq!(scene.history.undo_len(), undo_before);
}

#[test]
fn group_leaves_ineligible_members_alone() {
    let mut scene = make_scene();
    let pinned = add_selected(
        &mut scene,
        Element::rect(4.0, 0.0, 1.0, 1.0).with_caps(Capabilities { groupable: false, ..Capabilities::default() }),
    );
    add_selected(&mut scene, Element::rect(0.0, 0.0, 1.0, 1.0));
    add_selected(&mut scene, Element::rect(2.0, 0.0, 1.0, 1.0));
    assert!(scene.group_selected());
    assert_eq!(scene.element_count(), 2);
    assert!(scene.element(&pinned).is_some());
}

// =============================================================
// Ungroup
// =============================================================

#[test]
fn group_then_ungroup_round_trips() {
    let mut scene = make_scene();
    let ids = make_trio(&mut scene);
    let originals: Vec<Element> = ids.iter().map(|id| scene.element(id).unwrap().clone()).collect();
    scene.group_selected();
    assert!(scene.ungroup_selected());
    assert_eq!(scene.element_count(), 3);
    for original in &originals {
        assert_same_geometry(scene.element(&original.id).unwrap(), original);
        assert!(scene.element(&original.id).unwrap().selected);
    }
    // Top-first store order is the reverse of the bottom-first ids.
    let order: Vec<ElementId> = scene.store().ids().to_vec();
    let expected: Vec<ElementId> = ids.iter().rev().copied().collect();
    assert_eq!(order, expected);
}

#[test]
fn ungroup_restores_at_group_layer() {
    let mut scene = make_scene();
    make_trio(&mut scene);
    scene.group_selected();
    let group_id = scene.last_selected().unwrap().id;
    let over = Element::rect(30.0, 30.0, 1.0, 1.0);
    let over_id = over.id;
    scene.add_element(over);
    scene.select_element(&group_id, false);
    assert!(scene.ungroup_selected());
    assert_eq!(scene.store().ids()[0], over_id);
    assert_eq!(scene.element_count(), 4);
    assert!(!scene.element(&over_id).unwrap().selected);
}

#[test]
fn ungroup_several_groups_keeps_store_consistent() {
    let mut scene = make_scene();
    let first = vec![
        add_selected(&mut scene, Element::rect(0.0, 0.0, 1.0, 1.0)),
        add_selected(&mut scene, Element::rect(2.0, 0.0, 1.0, 1.0)),
    ];
    scene.group_selected();
    let first_group = scene.last_selected().unwrap().id;
    scene.select_none();
    let between = add_selected(&mut scene, Element::rect(5.0, 5.0, 1.0, 1.0));
    scene.select_none();
    let second = vec![
        add_selected(&mut scene, Element::rect(10.0, 0.0, 1.0, 1.0)),
        add_selected(&mut scene, Element::rect(12.0, 0.0, 1.0, 1.0)),
        add_selected(&mut scene, Element::rect(14.0, 0.0, 1.0, 1.0)),
    ];
    scene.group_selected();
    scene.select_element(&first_group, false);
    assert_eq!(scene.element_count(), 3);

    assert!(scene.ungroup_selected());
    assert!(scene.store().is_consistent());
    assert_eq!(scene.element_count(), 6);
    for id in first.iter().chain(&second).chain([&between]) {
        assert!(scene.element(id).is_some());
    }
    assert!(scene.undo());
    assert!(scene.store().is_consistent());
    assert_eq!(scene.element_count(), 3);
}

#[test]
fn ungroup_applies_move_and_resize() {
    let mut scene = make_scene();
    let a = add_selected(&mut scene, Element::rect(0.0, 0.0, 2.0, 2.0));
    let b = add_selected(&mut scene, Element::rect(4.0, 0.0, 2.0, 2.0));
    scene.group_selected();
    let group_id = scene.last_selected().unwrap().id;
    {
        let group = scene.store.get_mut(&group_id).unwrap();
        group.x += 10.0;
        group.width *= 2.0;
    }
    scene.ungroup_selected();
    let a = scene.element(&a).unwrap();
    let b = scene.element(&b).unwrap();
    assert!(approx_eq(a.x, 10.0));
    assert!(approx_eq(a.width, 4.0));
    assert!(approx_eq(a.height, 2.0));
    assert!(approx_eq(b.x, 18.0));
}

#[test]
fn ungroup_applies_group_rotation() {
    let mut scene = make_scene();
    let a = add_selected(&mut scene, Element::rect(0.0, 0.0, 2.0, 2.0));
    add_selected(&mut scene, Element::rect(0.0, 4.0, 2.0, 2.0));
    scene.group_selected();
    let group_id = scene.last_selected().unwrap().id;
    scene.store.get_mut(&group_id).unwrap().set_rotation(90.0);
    scene.ungroup_selected();
    // Group 2x6 centred at (1, 3); the upper child's centre (1, 1) turns to (3, 3).
    let a = scene.element(&a).unwrap();
    assert!(approx_eq(a.x, 2.0));
    assert!(approx_eq(a.y, 2.0));
    assert!(approx_eq(a.rotation, 90.0));
}

#[test]
fn ungroup_applies_group_flip() {
    let mut scene = make_scene();
    // A quarter-turned square keeps its bounding box.
    let a = add_selected(&mut scene, Element::rect(0.0, 0.0, 2.0, 2.0).with_rotation(90.0));
    add_selected(&mut scene, Element::rect(6.0, 0.0, 2.0, 2.0));
    scene.group_selected();
    let group_id = scene.last_selected().unwrap().id;
    scene.store.get_mut(&group_id).unwrap().flip_h();
    scene.ungroup_selected();
    let a = scene.element(&a).unwrap();
    assert!(approx_eq(a.x, 6.0));
    assert!(a.flip_horizontal);
    assert!(approx_eq(a.rotation, 270.0));
}

#[test]
fn ungroup_without_groups_does_nothing() {
    let mut scene = make_scene();
    make_trio(&mut scene);
    let undo_before = scene.history.undo_len();
    assert!(!scene.ungroup_selected());
    assert_eq!(scene.history.undo_len(), undo_before);
}

#[test]
fn ungroup_is_one_undo_step() {
    let mut scene = make_scene();
    make_trio(&mut scene);
    scene.group_selected();
    scene.ungroup_selected();
    assert!(scene.undo());
    assert_eq!(scene.element_count(), 1);
    assert!(scene.store().iter().next().unwrap().is_group());
}

#[test]
fn grouping_blocked_during_pass_through() {
    let mut scene = make_scene();
    make_trio(&mut scene);
    let editable =
        Element::rect(9.0, 9.0, 1.0, 1.0).with_caps(Capabilities { editable: true, ..Capabilities::default() });
    let id = editable.id;
    scene.add_element(editable);
    scene.select_element(&id, true);
    assert!(!scene.group_selected());
    assert!(!scene.ungroup_selected());
}
