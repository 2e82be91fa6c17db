//! Shape combine: area booleans and path append over the selected shapes.
//!
//! The bottom-most eligible shape is the reference; its visual attributes,
//! capabilities and layer carry over to the merged result. The merge is
//! computed in full before the store is touched, so an empty result leaves
//! the scene exactly as it was.

#[cfg(test)]
#[path = "combine_test.rs"]
mod combine_test;

use std::fmt;
use std::str::FromStr;

use geo::algorithm::orient::{Direction, Orient};
use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon, Polygon};
use kurbo::{BezPath, PathEl};
use serde::{Deserialize, Serialize};

use crate::consts::{FLATTEN_TOLERANCE, MIN_MERGED_AREA};
use crate::element::{Element, ElementId};
use crate::engine::{Scene, SceneEvent};
use crate::error::SceneError;
use crate::transform::local_to_canvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CombineOperation {
    /// Union of all areas.
    Join,
    /// Reference area minus the union of the others.
    Subtract,
    /// Area common to every shape.
    Intersect,
    /// Union minus every area covered by two or more shapes.
    ExclusiveJoin,
    /// Outlines concatenated into one path, no area algebra.
    Append,
}

impl CombineOperation {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Join => "Join",
            Self::Subtract => "Subtract",
            Self::Intersect => "Intersect",
            Self::ExclusiveJoin => "Exclusive Join",
            Self::Append => "Append",
        }
    }

    fn is_area_based(self) -> bool {
        self != Self::Append
    }
}

impl fmt::Display for CombineOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CombineOperation {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "join" | "union" => Ok(Self::Join),
            "subtract" | "difference" => Ok(Self::Subtract),
            "intersect" | "intersection" => Ok(Self::Intersect),
            "exclusive-join" | "xor" => Ok(Self::ExclusiveJoin),
            "append" => Ok(Self::Append),
            other => Err(SceneError::UnknownName { kind: "combine operation", value: other.to_string() }),
        }
    }
}

/// Result of [`Scene::combine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOutcome {
    /// Fewer than two eligible shapes were selected. Nothing changed.
    NothingToMerge,
    /// The merged area was empty. Nothing changed.
    EmptyArea,
    /// This many shapes, reference included, became one.
    Merged(usize),
}

impl CombineOutcome {
    /// Integer form: `0` nothing to merge, `-1` empty area, else the count.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::NothingToMerge => 0,
            Self::EmptyArea => -1,
            Self::Merged(n) => i64::try_from(n).unwrap_or(i64::MAX),
        }
    }
}

/// Outline of `element` in canvas units, transform applied.
fn canvas_outline(element: &Element) -> Option<BezPath> {
    let mut path = element.outline(1.0)?;
    path.apply_affine(local_to_canvas(element, 1.0));
    Some(path)
}

/// Flatten a path into polygons. Each closed ring toggles coverage, so
/// overlapping subpaths cancel the way an even-odd fill would.
fn to_multi_polygon(path: &BezPath) -> MultiPolygon<f64> {
    let mut rings: Vec<Vec<Coord<f64>>> = Vec::new();
    path.flatten(FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => rings.push(vec![Coord { x: p.x, y: p.y }]),
        PathEl::LineTo(p) => {
            if let Some(ring) = rings.last_mut() {
                ring.push(Coord { x: p.x, y: p.y });
            }
        }
        PathEl::ClosePath | PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
    });
    rings
        .into_iter()
        .filter(|ring| ring.len() >= 3)
        .map(|ring| Polygon::new(LineString::from(ring), Vec::new()))
        .filter(|poly| poly.unsigned_area() > MIN_MERGED_AREA)
        .fold(MultiPolygon::new(Vec::new()), |acc, poly| {
            let ring = MultiPolygon::new(vec![poly]);
            if acc.0.is_empty() { ring } else { acc.xor(&ring) }
        })
}

fn union_all<'a>(shapes: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> MultiPolygon<f64> {
    shapes.into_iter().fold(MultiPolygon::new(Vec::new()), |acc, shape| {
        if acc.0.is_empty() { shape.clone() } else { acc.union(shape) }
    })
}

/// Area algebra over `shapes`, reference first.
fn area_merge(operation: CombineOperation, shapes: &[MultiPolygon<f64>]) -> MultiPolygon<f64> {
    let Some((reference, others)) = shapes.split_first() else {
        return MultiPolygon::new(Vec::new());
    };
    match operation {
        CombineOperation::Join | CombineOperation::Append => union_all(shapes),
        CombineOperation::Subtract => reference.difference(&union_all(others)),
        CombineOperation::Intersect => others.iter().fold(reference.clone(), |acc, shape| acc.intersection(shape)),
        CombineOperation::ExclusiveJoin => {
            let overlaps: Vec<MultiPolygon<f64>> = shapes
                .iter()
                .enumerate()
                .flat_map(|(i, a)| shapes[i + 1..].iter().map(move |b| a.intersection(b)))
                .collect();
            union_all(shapes).difference(&union_all(&overlaps))
        }
    }
}

fn to_bez_path(shape: &MultiPolygon<f64>) -> BezPath {
    let mut path = BezPath::new();
    let oriented = shape.orient(Direction::Default);
    for polygon in &oriented {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            let mut coords = ring.coords();
            let Some(first) = coords.next() else {
                continue;
            };
            path.move_to((first.x, first.y));
            for c in coords {
                path.line_to((c.x, c.y));
            }
            path.close_path();
        }
    }
    path
}

impl Scene {
    /// Combine the selected mutable shapes into one path element that takes
    /// the bottom-most shape's place.
    pub fn combine(&mut self, operation: CombineOperation) -> CombineOutcome {
        if self.selection.is_pass_through() {
            return CombineOutcome::NothingToMerge;
        }
        // Bottom-most first.
        let eligible: Vec<(&Element, BezPath)> = self
            .store
            .iter()
            .rev()
            .filter(|e| e.selected && e.is_mutable() && e.is_shape())
            .filter_map(|e| canvas_outline(e).map(|outline| (e, outline)))
            .collect();
        if eligible.len() < 2 {
            return CombineOutcome::NothingToMerge;
        }

        let merged = if operation.is_area_based() {
            let shapes: Vec<MultiPolygon<f64>> =
                eligible.iter().map(|(_, outline)| to_multi_polygon(outline)).collect();
            let area = area_merge(operation, &shapes);
            if area.unsigned_area() < MIN_MERGED_AREA {
                tracing::info!(operation = %operation, count = eligible.len(), "combine produced no area");
                return CombineOutcome::EmptyArea;
            }
            to_bez_path(&area)
        } else {
            let mut path = BezPath::new();
            for (_, outline) in &eligible {
                path.extend(outline.elements().iter().copied());
            }
            path
        };

        let (reference, _) = &eligible[0];
        let Ok(mut result) = Element::from_path(merged) else {
            return CombineOutcome::EmptyArea;
        };
        result.caps = reference.caps;
        result.props = reference.props.clone();
        result.opacity = reference.opacity;
        let reference_id = reference.id;
        let merge_list: Vec<ElementId> = eligible[1..].iter().map(|(e, _)| e.id).collect();
        let count = eligible.len();

        self.save_context();
        self.suspend_save();
        for id in &merge_list {
            self.detach(id);
        }
        let result_id = result.id;
        self.swap_in(&reference_id, result);
        self.selection.select(&mut self.store, &result_id);
        self.resume_save();
        self.last_command = None;
        tracing::info!(operation = %operation, count, id = %result_id, "shapes combined");
        self.selection_changed(Some(result_id));
        CombineOutcome::Merged(count)
    }
}
