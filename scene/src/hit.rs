//! Pointer hit-testing, drag box detection and drag-select.
//!
//! All points are canvas pixels at zoom 1 (see [`crate::transform`]).

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use kurbo::{ParamCurveNearest, Point, Rect, Shape};

use crate::element::{Element, ElementId};
use crate::store::ZOrderStore;
use crate::transform::{to_local, transformed_bounds};

/// Accuracy passed to curve nearest-point queries, in pixels.
const NEAREST_ACCURACY: f64 = 1e-3;

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    /// The resize handle at the lower-right corner.
    DragBox,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Scene settings a hit test depends on.
#[derive(Debug, Clone, Copy)]
pub struct HitContext {
    /// Canvas pixels per unit.
    pub scale: f64,
    pub zoom: f64,
    /// Drag box side in device-independent pixels.
    pub drag_box_size: f64,
    /// Extra pixels around shape outlines.
    pub shape_select_margin: f64,
    /// Skip selected elements so the pick lands underneath.
    pub exclusive_pick: bool,
}

/// Top-most selectable element under `point`.
#[must_use]
pub fn hit_test(point: Point, store: &ZOrderStore, ctx: &HitContext) -> Option<Hit> {
    store.iter().find_map(|element| hit_element(element, point, ctx))
}

fn hit_element(element: &Element, point: Point, ctx: &HitContext) -> Option<Hit> {
    if !element.is_selectable() || element.is_unbounded() {
        return None;
    }
    if ctx.exclusive_pick && element.selected {
        return None;
    }
    if !transformed_bounds(element, ctx.scale).contains(point) {
        return None;
    }
    let local = to_local(element, ctx.scale, point)?;
    // Margins and the drag box never reach past the element's own rectangle.
    if !within(local_bounds(element, ctx.scale), local) {
        return None;
    }
    let on_box = on_drag_box_local(element, local, ctx);
    if !on_box && element.is_shape() {
        let margin = element.props().outline_width().ceil() + ctx.shape_select_margin;
        if !contains_local(element, local, margin, ctx.scale) {
            return None;
        }
    }
    let part = if on_box { HitPart::DragBox } else { HitPart::Body };
    Some(Hit { element_id: element.id, part })
}

/// Whether `point` is on the element's drag box.
///
/// The distance to the lower-right corner is measured in the element's local
/// frame and compared against the drag box size at the current zoom.
#[must_use]
pub fn on_drag_box(element: &Element, point: Point, ctx: &HitContext) -> bool {
    to_local(element, ctx.scale, point).is_some_and(|local| on_drag_box_local(element, local, ctx))
}

fn on_drag_box_local(element: &Element, local: Point, ctx: &HitContext) -> bool {
    if !element.is_resizable() || element.is_unbounded() || ctx.zoom <= 0.0 {
        return false;
    }
    let corner = Point::new(element.width * ctx.scale, element.height * ctx.scale);
    (local - corner).hypot() < ctx.drag_box_size / ctx.zoom
}

/// Whether a canvas point lies inside a shape's outline or within `margin`
/// pixels of it. Always false for elements without an outline.
#[must_use]
pub fn contains(element: &Element, point: Point, margin: f64, scale: f64) -> bool {
    to_local(element, scale, point).is_some_and(|local| contains_local(element, local, margin, scale))
}

fn contains_local(element: &Element, local: Point, margin: f64, scale: f64) -> bool {
    let Some(outline) = element.outline(scale) else {
        return false;
    };
    if outline.contains(local) {
        return true;
    }
    let margin_sq = margin * margin;
    outline
        .segments()
        .any(|seg| seg.nearest(local, NEAREST_ACCURACY).distance_sq <= margin_sq)
}

fn local_bounds(element: &Element, scale: f64) -> Rect {
    Rect::new(0.0, 0.0, element.width * scale, element.height * scale)
}

/// Closed-rectangle test; `Rect::contains` excludes the far edges.
fn within(rect: Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

/// Normalised rubber-band rectangle between two pointer positions.
#[must_use]
pub fn drag_select_rect(press: Point, current: Point) -> Rect {
    Rect::from_points(press, current)
}

/// Selectable elements whose transformed bounding box lies inside `rect`,
/// top to bottom.
#[must_use]
pub fn elements_within(store: &ZOrderStore, rect: Rect, scale: f64) -> Vec<ElementId> {
    store
        .iter()
        .filter(|e| e.is_selectable() && !e.is_unbounded())
        .filter(|e| rect_contains_rect(rect, transformed_bounds(e, scale)))
        .map(|e| e.id)
        .collect()
}

fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}
