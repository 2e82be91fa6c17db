use kurbo::BezPath;

use super::*;
use crate::element::{Capabilities, ElementKind};

fn ctx() -> HitContext {
    HitContext { scale: 1.0, zoom: 1.0, drag_box_size: 10.0, shape_select_margin: 0.0, exclusive_pick: false }
}

fn store_of(elements: Vec<Element>) -> ZOrderStore {
    // First element ends up on top.
    let mut store = ZOrderStore::new();
    for e in elements.into_iter().rev() {
        store.add(e);
    }
    store
}

// =============================================================
// hit_test
// =============================================================

#[test]
fn pointer_inside_unrotated_element_hits() {
    let e = Element::rect(10.0, 10.0, 100.0, 50.0);
    let id = e.id;
    let store = store_of(vec![e]);
    let hit = hit_test(Point::new(15.0, 15.0), &store, &ctx()).unwrap();
    assert_eq!(hit.element_id, id);
    assert_eq!(hit.part, HitPart::Body);
    assert!(hit_test(Point::new(200.0, 200.0), &store, &ctx()).is_none());
}

#[test]
fn topmost_element_wins() {
    let top = Element::rect(0.0, 0.0, 50.0, 50.0);
    let bottom = Element::rect(0.0, 0.0, 50.0, 50.0);
    let top_id = top.id;
    let store = store_of(vec![top, bottom]);
    assert_eq!(hit_test(Point::new(5.0, 5.0), &store, &ctx()).unwrap().element_id, top_id);
}

#[test]
fn exclusive_pick_skips_selected() {
    let mut top = Element::rect(0.0, 0.0, 50.0, 50.0);
    top.selected = true;
    let bottom = Element::rect(0.0, 0.0, 50.0, 50.0);
    let bottom_id = bottom.id;
    let store = store_of(vec![top, bottom]);
    let pick = HitContext { exclusive_pick: true, ..ctx() };
    assert_eq!(hit_test(Point::new(5.0, 5.0), &store, &pick).unwrap().element_id, bottom_id);
}

#[test]
fn unselectable_and_unbounded_are_skipped() {
    let grid = Element::new(ElementKind::Grid { spacing: 10.0 }, 0.0, 0.0, -1.0, -1.0);
    let locked = Element::rect(0.0, 0.0, 50.0, 50.0)
        .with_caps(Capabilities { selectable: false, ..Capabilities::default() });
    let store = store_of(vec![grid, locked]);
    assert!(hit_test(Point::new(5.0, 5.0), &store, &ctx()).is_none());
}

#[test]
fn rotated_element_misses_in_empty_bbox_corner() {
    // A 45 degree square leaves its bbox corners empty.
    let e = Element::rect(0.0, 0.0, 100.0, 100.0).with_rotation(45.0);
    let store = store_of(vec![e]);
    let tb = transformed_bounds(store.iter().next().unwrap(), 1.0);
    let corner = Point::new(tb.x0 + 2.0, tb.y0 + 2.0);
    assert!(tb.contains(corner));
    assert!(hit_test(corner, &store, &ctx()).is_none());
    assert!(hit_test(tb.center(), &store, &ctx()).is_some());
}

#[test]
fn select_margin_stops_at_rotated_local_bounds() {
    let e = Element::rect(0.0, 0.0, 100.0, 100.0).with_rotation(45.0);
    let store = store_of(vec![e]);
    let loose = HitContext { shape_select_margin: 10.0, ..ctx() };
    // Within the margin of the left edge but outside the element itself.
    let outside = Point::new(10.0, 10.0);
    let local = to_local(store.iter().next().unwrap(), 1.0, outside).unwrap();
    assert!(local.x < 0.0);
    assert!(hit_test(outside, &store, &loose).is_none());
    assert!(hit_test(Point::new(50.0, 50.0), &store, &loose).is_some());
}

#[test]
fn drag_box_outside_local_bounds_misses() {
    let e = Element::new(ElementKind::Image { source: "x.png".into() }, 0.0, 0.0, 100.0, 100.0)
        .with_rotation(10.0);
    let past_corner = crate::transform::local_to_canvas(&e, 1.0) * Point::new(103.0, 95.0);
    assert!(on_drag_box(&e, past_corner, &ctx()));
    assert!(transformed_bounds(&e, 1.0).contains(past_corner));
    let store = store_of(vec![e]);
    assert!(hit_test(past_corner, &store, &ctx()).is_none());
    let to_canvas = crate::transform::local_to_canvas(store.iter().next().unwrap(), 1.0);
    let inside_corner = to_canvas * Point::new(97.0, 97.0);
    assert_eq!(hit_test(inside_corner, &store, &ctx()).map(|h| h.part), Some(HitPart::DragBox));
}

#[test]
fn image_hit_uses_local_bounds() {
    let img = Element::new(ElementKind::Image { source: "x.png".into() }, 0.0, 0.0, 100.0, 100.0)
        .with_rotation(45.0);
    let store = store_of(vec![img]);
    let tb = transformed_bounds(store.iter().next().unwrap(), 1.0);
    assert!(hit_test(Point::new(tb.x0 + 2.0, tb.y0 + 2.0), &store, &ctx()).is_none());
    assert!(hit_test(tb.center(), &store, &ctx()).is_some());
}

#[test]
fn concave_path_rejects_hole_but_margin_accepts_near_edge() {
    // U shape: the notch between the arms is outside the outline.
    let mut path = BezPath::new();
    path.move_to((0.0, 0.0));
    path.line_to((30.0, 0.0));
    path.line_to((30.0, 100.0));
    path.line_to((70.0, 100.0));
    path.line_to((70.0, 0.0));
    path.line_to((100.0, 0.0));
    path.line_to((100.0, 130.0));
    path.line_to((0.0, 130.0));
    path.close_path();
    let e = Element::from_path(path).unwrap();
    let store = store_of(vec![e]);
    let notch = Point::new(50.0, 40.0);
    assert!(hit_test(notch, &store, &ctx()).is_none());
    let near = Point::new(33.0, 40.0);
    let loose = HitContext { shape_select_margin: 5.0, ..ctx() };
    assert!(hit_test(near, &store, &loose).is_some());
}

// =============================================================
// Drag box
// =============================================================

#[test]
fn drag_box_near_lower_right_corner() {
    let e = Element::rect(0.0, 0.0, 100.0, 50.0);
    let id = e.id;
    let store = store_of(vec![e]);
    let hit = hit_test(Point::new(97.0, 47.0), &store, &ctx()).unwrap();
    assert_eq!(hit, Hit { element_id: id, part: HitPart::DragBox });
    let hit = hit_test(Point::new(80.0, 30.0), &store, &ctx()).unwrap();
    assert_eq!(hit.part, HitPart::Body);
}

#[test]
fn drag_box_shrinks_with_zoom() {
    let e = Element::rect(0.0, 0.0, 100.0, 50.0);
    let zoomed = HitContext { zoom: 4.0, ..ctx() };
    assert!(on_drag_box(&e, Point::new(97.0, 47.0), &ctx()));
    assert!(!on_drag_box(&e, Point::new(97.0, 47.0), &zoomed));
    assert!(on_drag_box(&e, Point::new(99.0, 49.0), &zoomed));
}

#[test]
fn fixed_size_elements_have_no_drag_box() {
    let e = Element::rect(0.0, 0.0, 100.0, 50.0)
        .with_caps(Capabilities { resizable: false, ..Capabilities::default() });
    assert!(!on_drag_box(&e, Point::new(99.0, 49.0), &ctx()));
}

#[test]
fn drag_box_follows_rotation() {
    let e = Element::rect(0.0, 0.0, 100.0, 50.0).with_rotation(90.0);
    let corner = crate::transform::lower_right_corner(&e, 1.0);
    assert!(on_drag_box(&e, corner, &ctx()));
    assert!(!on_drag_box(&e, Point::new(99.0, 49.0), &ctx()));
}

// =============================================================
// contains / drag-select
// =============================================================

#[test]
fn contains_is_false_for_non_shapes() {
    let img = Element::new(ElementKind::Image { source: String::new() }, 0.0, 0.0, 10.0, 10.0);
    assert!(!contains(&img, Point::new(5.0, 5.0), 0.0, 1.0));
}

#[test]
fn ellipse_contains_centre_not_corner() {
    let e = Element::ellipse(0.0, 0.0, 100.0, 100.0);
    assert!(contains(&e, Point::new(50.0, 50.0), 0.0, 1.0));
    assert!(!contains(&e, Point::new(3.0, 3.0), 0.0, 1.0));
    assert!(contains(&e, Point::new(3.0, 3.0), 20.0, 1.0));
}

#[test]
fn drag_select_collects_fully_enclosed() {
    let inside = Element::rect(10.0, 10.0, 20.0, 20.0);
    let straddling = Element::rect(90.0, 90.0, 20.0, 20.0);
    let locked = Element::rect(20.0, 20.0, 5.0, 5.0)
        .with_caps(Capabilities { selectable: false, ..Capabilities::default() });
    let inside_id = inside.id;
    let store = store_of(vec![inside, straddling, locked]);
    let rect = drag_select_rect(Point::new(100.0, 100.0), Point::new(0.0, 0.0));
    assert_eq!(elements_within(&store, rect, 1.0), vec![inside_id]);
}

#[test]
fn drag_select_uses_rotated_bounds() {
    let e = Element::rect(40.0, 0.0, 20.0, 100.0).with_rotation(90.0);
    let store = store_of(vec![e]);
    // Rotated it spans x 0..100, y 40..60.
    assert_eq!(elements_within(&store, Rect::new(-1.0, 39.0, 101.0, 61.0), 1.0).len(), 1);
    assert!(elements_within(&store, Rect::new(39.0, -1.0, 61.0, 101.0), 1.0).is_empty());
}
