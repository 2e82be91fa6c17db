//! Element model: scene elements, their capabilities, and geometry mutators.
//!
//! An [`Element`] is the unit the engine manipulates. Common geometry lives on
//! the struct (position and size in scene units, rotation, shear, flips,
//! opacity) while per-kind geometry lives in [`ElementKind`]. A group is just
//! another kind that owns its children, so the store never has to special-case
//! composites beyond asking `is_group`.
//!
//! Sizes are stored in units. Accessors that take a `scale` argument return
//! values multiplied by that many pixels per unit.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use kurbo::{Affine, BezPath, Ellipse, Point, Rect, RoundedRect, Shape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::FLATTEN_TOLERANCE;
use crate::error::SceneError;

/// Unique identifier for a scene element.
pub type ElementId = Uuid;

/// What the engine is allowed to do with an element.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Can be picked by the pointer or by select-all/next/prev.
    pub selectable: bool,
    /// Follows move gestures and nudges.
    pub movable: bool,
    /// Shows a drag box and follows resize gestures.
    pub resizable: bool,
    /// Can be deleted, copied, grouped or combined.
    pub mutable: bool,
    /// Can become part of a group.
    pub groupable: bool,
    /// Included in print and export bounds.
    pub printable: bool,
    /// Accepts pass-through editing.
    pub editable: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            selectable: true,
            movable: true,
            resizable: true,
            mutable: true,
            groupable: true,
            printable: true,
            editable: false,
        }
    }
}

/// Merged or free-form outline, stored at its original size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathShape {
    #[serde(with = "svg_path")]
    pub path: BezPath,
    pub base_width: f64,
    pub base_height: f64,
}

/// Composite element. Children are ordered bottom-first (draw order) and
/// positioned relative to the group's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub children: Vec<Element>,
    pub base_width: f64,
    pub base_height: f64,
}

/// Kind-specific geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Rect,
    /// Rectangle with rounded corners; `radius` in units.
    RoundedRect { radius: f64 },
    /// Ellipse inscribed in the bounds.
    Ellipse,
    /// Triangle with its base on the bottom edge and its apex on the top edge
    /// at `apex` (0 = left corner, 0.5 = isosceles, 1 = right corner).
    Triangle { apex: f64 },
    /// Closed polygon with vertices normalised to the bounds (0..1).
    Polygon { points: Vec<[f64; 2]> },
    Path(PathShape),
    /// Raster content painted by the host. Not a shape.
    Image { source: String },
    /// Background grid, usually unbounded and unselectable.
    Grid { spacing: f64 },
    Group(Group),
}

impl ElementKind {
    /// Tag used for this kind in serialized documents.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::RoundedRect { .. } => "rounded_rect",
            Self::Ellipse => "ellipse",
            Self::Triangle { .. } => "triangle",
            Self::Polygon { .. } => "polygon",
            Self::Path(_) => "path",
            Self::Image { .. } => "image",
            Self::Grid { .. } => "grid",
            Self::Group(_) => "group",
        }
    }
}

/// A scene element as stored in the Z-order store and in snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Left edge of the unrotated bounds, in units.
    pub x: f64,
    /// Top edge of the unrotated bounds, in units.
    pub y: f64,
    /// Width in units. Negative means unbounded (fills the canvas).
    pub width: f64,
    /// Height in units. Negative means unbounded (fills the canvas).
    pub height: f64,
    /// Clockwise rotation in degrees about the bounds centre, in `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub shear_x: f64,
    #[serde(default)]
    pub shear_y: f64,
    #[serde(default)]
    pub flip_horizontal: bool,
    #[serde(default)]
    pub flip_vertical: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub caps: Capabilities,
    /// Open-ended visual attributes (fill, stroke, outline width, dash).
    #[serde(default = "empty_props")]
    pub props: serde_json::Value,
    #[serde(skip)]
    pub selected: bool,
}

fn default_opacity() -> f64 {
    1.0
}

fn empty_props() -> serde_json::Value {
    serde_json::json!({})
}

/// Typed access to common fields of `Element.props`.
pub struct Props<'a> {
    value: &'a serde_json::Value,
}

impl<'a> Props<'a> {
    #[must_use]
    pub fn new(value: &'a serde_json::Value) -> Self {
        Self { value }
    }

    /// Fill color as a CSS color string, if any.
    #[must_use]
    pub fn fill(&self) -> Option<&str> {
        self.value.get("fill").and_then(|v| v.as_str())
    }

    /// Outline color. Defaults to `"#000000"` when absent.
    #[must_use]
    pub fn stroke(&self) -> &str {
        self.value
            .get("stroke")
            .and_then(|v| v.as_str())
            .unwrap_or("#000000")
    }

    /// Outline width in pixels. Defaults to `1.0` when absent.
    #[must_use]
    pub fn outline_width(&self) -> f64 {
        self.value
            .get("outline_width")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(1.0)
    }
}

impl Element {
    /// New element with default capabilities and no visual attributes.
    #[must_use]
    pub fn new(kind: ElementKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            x,
            y,
            width,
            height,
            rotation: 0.0,
            shear_x: 0.0,
            shear_y: 0.0,
            flip_horizontal: false,
            flip_vertical: false,
            opacity: 1.0,
            caps: Capabilities::default(),
            props: empty_props(),
            selected: false,
        }
    }

    #[must_use]
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Rect, x, y, width, height)
    }

    #[must_use]
    pub fn ellipse(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ElementKind::Ellipse, x, y, width, height)
    }

    /// Build a path element from an outline given in canvas units.
    ///
    /// The element's bounds become the outline's bounding box and the stored
    /// path is moved so its bounding box starts at the origin.
    pub fn from_path(mut path: BezPath) -> Result<Self, SceneError> {
        if path.elements().is_empty() {
            return Err(SceneError::EmptyGeometry);
        }
        let bbox = path.bounding_box();
        if !(bbox.x0.is_finite() && bbox.y0.is_finite() && bbox.x1.is_finite() && bbox.y1.is_finite()) {
            return Err(SceneError::InvalidPath("non-finite coordinates".into()));
        }
        path.apply_affine(Affine::translate((-bbox.x0, -bbox.y0)));
        let shape = PathShape { path, base_width: bbox.width(), base_height: bbox.height() };
        Ok(Self::new(ElementKind::Path(shape), bbox.x0, bbox.y0, bbox.width(), bbox.height()))
    }

    #[must_use]
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.set_rotation(degrees);
        self
    }

    #[must_use]
    pub fn with_caps(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    #[must_use]
    pub fn with_props(mut self, props: serde_json::Value) -> Self {
        self.props = props;
        self
    }

    // --- Capabilities ---

    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.caps.selectable
    }

    #[must_use]
    pub fn is_movable(&self) -> bool {
        self.caps.movable
    }

    #[must_use]
    pub fn is_resizable(&self) -> bool {
        self.caps.resizable
    }

    #[must_use]
    pub fn is_mutable(&self) -> bool {
        self.caps.mutable
    }

    #[must_use]
    pub fn is_groupable(&self) -> bool {
        self.caps.groupable
    }

    #[must_use]
    pub fn is_printable(&self) -> bool {
        self.caps.printable
    }

    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.caps.editable
    }

    /// Whether this element has outline geometry that can be hit-tested
    /// precisely and combined.
    #[must_use]
    pub fn is_shape(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::Rect
                | ElementKind::RoundedRect { .. }
                | ElementKind::Ellipse
                | ElementKind::Triangle { .. }
                | ElementKind::Polygon { .. }
                | ElementKind::Path(_)
        )
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ElementKind::Group(_))
    }

    /// Negative width or height means "fill the available canvas".
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.width < 0.0 || self.height < 0.0
    }

    #[must_use]
    pub fn props(&self) -> Props<'_> {
        Props::new(&self.props)
    }

    // --- Geometry ---

    /// Unrotated bounds at `scale` pixels per unit.
    #[must_use]
    pub fn bounds(&self, scale: f64) -> Rect {
        let x0 = self.x * scale;
        let y0 = self.y * scale;
        Rect::new(x0, y0, x0 + self.width * scale, y0 + self.height * scale)
    }

    /// Top-left corner at `scale` pixels per unit.
    #[must_use]
    pub fn position(&self, scale: f64) -> Point {
        Point::new(self.x * scale, self.y * scale)
    }

    /// Outline in the element's local frame (top-left at the origin), flips
    /// applied. `None` for elements that are not shapes or are unbounded.
    #[must_use]
    pub fn outline(&self, scale: f64) -> Option<BezPath> {
        if self.is_unbounded() {
            return None;
        }
        let w = self.width * scale;
        let h = self.height * scale;
        let local = Rect::new(0.0, 0.0, w, h);
        let mut path = match &self.kind {
            ElementKind::Rect => local.to_path(FLATTEN_TOLERANCE),
            ElementKind::RoundedRect { radius } => {
                RoundedRect::from_rect(local, radius * scale).to_path(FLATTEN_TOLERANCE)
            }
            ElementKind::Ellipse => Ellipse::from_rect(local).to_path(FLATTEN_TOLERANCE),
            ElementKind::Triangle { apex } => {
                let mut p = BezPath::new();
                p.move_to((apex.clamp(0.0, 1.0) * w, 0.0));
                p.line_to((w, h));
                p.line_to((0.0, h));
                p.close_path();
                p
            }
            ElementKind::Polygon { points } => {
                let mut iter = points.iter();
                let first = iter.next()?;
                let mut p = BezPath::new();
                p.move_to((first[0] * w, first[1] * h));
                for pt in iter {
                    p.line_to((pt[0] * w, pt[1] * h));
                }
                p.close_path();
                p
            }
            ElementKind::Path(shape) => {
                let sx = if shape.base_width > 0.0 { w / shape.base_width } else { scale };
                let sy = if shape.base_height > 0.0 { h / shape.base_height } else { scale };
                let mut p = shape.path.clone();
                p.apply_affine(Affine::scale_non_uniform(sx, sy));
                p
            }
            ElementKind::Image { .. } | ElementKind::Grid { .. } | ElementKind::Group(_) => return None,
        };
        if self.flip_horizontal || self.flip_vertical {
            path.apply_affine(self.flip_transform(w, h));
        }
        Some(path)
    }

    /// Mirror transform for a local frame of size `w` x `h`.
    #[must_use]
    pub fn flip_transform(&self, w: f64, h: f64) -> Affine {
        let fx = if self.flip_horizontal { -1.0 } else { 1.0 };
        let fy = if self.flip_vertical { -1.0 } else { 1.0 };
        let tx = if self.flip_horizontal { w } else { 0.0 };
        let ty = if self.flip_vertical { h } else { 0.0 };
        Affine::new([fx, 0.0, 0.0, fy, tx, ty])
    }

    // --- Mutators ---

    /// Move by a delta in units. Returns false when the element is immovable.
    ///
    /// The left/top edge is clamped to `max_x`/`max_y` and is never moved so
    /// far that the element leaves the canvas on the left or top.
    pub fn move_by(&mut self, dx: f64, dy: f64, max_x: f64, max_y: f64) -> bool {
        if !self.caps.movable {
            return false;
        }
        self.x = clamp_edge(self.x + dx, self.width, max_x);
        self.y = clamp_edge(self.y + dy, self.height, max_y);
        true
    }

    /// Move the top-left corner to an absolute position in units.
    pub fn reposition(&mut self, x: f64, y: f64, max_x: f64, max_y: f64) -> bool {
        if !self.caps.movable {
            return false;
        }
        self.x = clamp_edge(x, self.width, max_x);
        self.y = clamp_edge(y, self.height, max_y);
        true
    }

    /// Set the size from pixel dimensions at `scale`. Neither side shrinks
    /// below the drag box.
    pub fn change_size(&mut self, width: f64, height: f64, drag_box_size: f64, scale: f64) -> bool {
        if !self.caps.resizable || self.is_unbounded() || scale <= 0.0 {
            return false;
        }
        self.width = width.max(drag_box_size) / scale;
        self.height = height.max(drag_box_size) / scale;
        true
    }

    /// Grow (or shrink) each side by a pixel delta at `scale`, never below
    /// `min_size` pixels.
    pub fn increase_size(&mut self, dw: f64, dh: f64, min_size: f64, scale: f64) -> bool {
        if !self.caps.resizable || self.is_unbounded() || scale <= 0.0 {
            return false;
        }
        let min = min_size / scale;
        self.width = (self.width + dw / scale).max(min);
        self.height = (self.height + dh / scale).max(min);
        true
    }

    /// Grow the width by a pixel delta at `scale` and the height in
    /// proportion, never letting either side fall below `min_size` pixels.
    pub fn increase_size_maintain_aspect(&mut self, delta: f64, min_size: f64, scale: f64) -> bool {
        if !self.caps.resizable || self.is_unbounded() || scale <= 0.0 || self.width <= 0.0 {
            return false;
        }
        let min = min_size / scale;
        let aspect = self.height / self.width;
        let mut width = (self.width + delta / scale).max(min);
        let mut height = width * aspect;
        if height < min {
            height = min;
            if aspect > 0.0 {
                width = height / aspect;
            }
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn rotate(&mut self, delta: f64) {
        self.set_rotation(self.rotation + delta);
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = degrees.rem_euclid(360.0);
    }

    pub fn shear_by_x(&mut self, delta: f64) {
        self.shear_x += delta;
    }

    pub fn shear_by_y(&mut self, delta: f64) {
        self.shear_y += delta;
    }

    pub fn set_shear_x(&mut self, ratio: f64) {
        self.shear_x = ratio;
    }

    pub fn set_shear_y(&mut self, ratio: f64) {
        self.shear_y = ratio;
    }

    pub fn flip_h(&mut self) {
        self.flip_horizontal = !self.flip_horizontal;
    }

    pub fn flip_v(&mut self) {
        self.flip_vertical = !self.flip_vertical;
    }

    pub fn set_opacity(&mut self, opacity: f64) -> Result<(), SceneError> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(SceneError::InvalidOpacity(opacity));
        }
        self.opacity = opacity;
        Ok(())
    }

    /// Whether the element accepts pass-through editing.
    #[must_use]
    pub fn selected_for_edit(&self) -> bool {
        self.caps.editable
    }

    /// Deep copy, deselected. `for_new` assigns fresh ids (recursively for
    /// group children) so the copy can live alongside the original.
    #[must_use]
    pub fn copy_of(&self, for_new: bool) -> Self {
        let mut copy = self.clone();
        copy.selected = false;
        if for_new {
            copy.assign_fresh_ids();
        }
        copy
    }

    fn assign_fresh_ids(&mut self) {
        self.id = Uuid::new_v4();
        if let ElementKind::Group(group) = &mut self.kind {
            for child in &mut group.children {
                child.assign_fresh_ids();
            }
        }
    }
}

fn clamp_edge(value: f64, extent: f64, max: f64) -> f64 {
    let min = -extent.max(0.0);
    if max < min {
        return value.min(max);
    }
    value.clamp(min, max)
}

mod svg_path {
    use kurbo::BezPath;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(path: &BezPath, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&path.to_svg())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BezPath, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BezPath::from_svg(&s).map_err(serde::de::Error::custom)
    }
}
