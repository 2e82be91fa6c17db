//! Per-element affine transforms.
//!
//! An element's on-canvas geometry is its unrotated bounds rotated and then
//! sheared about the bounds centre. Two frames are used:
//!
//! - canvas: pixels at `scale` per unit, zoom 1
//! - local: the element's own unrotated frame, top-left corner at the origin
//!
//! Angles are degrees clockwise (y points down).

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use kurbo::{Affine, Point, Rect, Vec2};

use crate::element::Element;

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Shear matrix: x gains `shear_x * y`, y gains `shear_y * x`.
#[must_use]
pub fn shear_affine(shear_x: f64, shear_y: f64) -> Affine {
    Affine::new([1.0, shear_y, shear_x, 1.0, 0.0, 0.0])
}

/// Rotation followed by shear, about the origin.
#[must_use]
pub fn rotate_shear(element: &Element) -> Affine {
    Affine::rotate(element.rotation.to_radians()) * shear_affine(element.shear_x, element.shear_y)
}

/// Canvas-to-canvas transform taking the unrotated bounds to their
/// on-canvas placement.
#[must_use]
pub fn element_transform(element: &Element, scale: f64) -> Affine {
    let centre = element.bounds(scale).center().to_vec2();
    Affine::translate(centre) * rotate_shear(element) * Affine::translate(-centre)
}

/// Inverse of [`element_transform`]. `None` when the shear collapses the
/// element to a line.
#[must_use]
pub fn inverse_element_transform(element: &Element, scale: f64) -> Option<Affine> {
    invert(element_transform(element, scale))
}

/// Local frame to canvas.
#[must_use]
pub fn local_to_canvas(element: &Element, scale: f64) -> Affine {
    let centre = element.bounds(scale).center().to_vec2();
    let half = Vec2::new(element.width * scale / 2.0, element.height * scale / 2.0);
    Affine::translate(centre) * rotate_shear(element) * Affine::translate(-half)
}

/// Canvas point in the element's local frame.
#[must_use]
pub fn to_local(element: &Element, scale: f64, point: Point) -> Option<Point> {
    invert(local_to_canvas(element, scale)).map(|inv| inv * point)
}

/// Axis-aligned bounding box of the transformed bounds.
#[must_use]
pub fn transformed_bounds(element: &Element, scale: f64) -> Rect {
    element_transform(element, scale).transform_rect_bbox(element.bounds(scale))
}

/// Transformed lower-right corner, where the drag box sits.
#[must_use]
pub fn lower_right_corner(element: &Element, scale: f64) -> Point {
    local_to_canvas(element, scale) * Point::new(element.width * scale, element.height * scale)
}

/// Transformed centre of the bounds. Rotation and shear leave it fixed.
#[must_use]
pub fn centre(element: &Element, scale: f64) -> Point {
    element.bounds(scale).center()
}

/// Inverse of an affine map, `None` when it is singular.
#[must_use]
pub fn invert(affine: Affine) -> Option<Affine> {
    if affine.determinant().abs() < SINGULAR_EPSILON {
        return None;
    }
    Some(affine.inverse())
}
