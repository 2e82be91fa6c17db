//! Edge and centre alignment of the selection.
//!
//! Alignment works on the unrotated bounds in units. A key element is picked
//! per mode (the one furthest toward the alignment edge) and every other
//! selected element is repositioned along one axis to match it.

#[cfg(test)]
#[path = "align_test.rs"]
mod align_test;

use std::fmt;
use std::str::FromStr;

use kurbo::Rect;
use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::engine::{RepeatableCommand, Scene, SceneEvent};
use crate::error::SceneError;

/// Movements smaller than this (units) are treated as already aligned.
const ALIGN_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    LeftEdge,
    TopEdge,
    RightEdge,
    BottomEdge,
    /// Centres on a shared vertical line.
    CenteredVertical,
    /// Centres on a shared horizontal line.
    CenteredHorizontal,
    CenteredBoth,
    /// Whichever centred alignment moves the elements least.
    Auto,
}

impl Alignment {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::LeftEdge => "Left Edge",
            Self::TopEdge => "Top Edge",
            Self::RightEdge => "Right Edge",
            Self::BottomEdge => "Bottom Edge",
            Self::CenteredVertical => "Centered Vertical",
            Self::CenteredHorizontal => "Centered Horizontal",
            Self::CenteredBoth => "Centered Both",
            Self::Auto => "Auto",
        }
    }

    /// Whether `candidate` lies further toward this mode's edge than `key`.
    fn key_wins(self, candidate: Rect, key: Rect) -> bool {
        match self {
            Self::LeftEdge | Self::CenteredVertical => candidate.x0 < key.x0,
            Self::RightEdge => candidate.x1 > key.x1,
            Self::TopEdge | Self::CenteredHorizontal => candidate.y0 < key.y0,
            Self::BottomEdge => candidate.y1 > key.y1,
            Self::CenteredBoth | Self::Auto => false,
        }
    }

    /// New top-left for `bounds` aligned against `key`.
    fn target(self, bounds: Rect, key: Rect) -> (f64, f64) {
        match self {
            Self::LeftEdge => (key.x0, bounds.y0),
            Self::RightEdge => (key.x1 - bounds.width(), bounds.y0),
            Self::TopEdge => (bounds.x0, key.y0),
            Self::BottomEdge => (bounds.x0, key.y1 - bounds.height()),
            Self::CenteredVertical => (key.center().x - bounds.width() / 2.0, bounds.y0),
            Self::CenteredHorizontal => (bounds.x0, key.center().y - bounds.height() / 2.0),
            Self::CenteredBoth | Self::Auto => (bounds.x0, bounds.y0),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Alignment {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "left-edge" => Ok(Self::LeftEdge),
            "top" | "top-edge" => Ok(Self::TopEdge),
            "right" | "right-edge" => Ok(Self::RightEdge),
            "bottom" | "bottom-edge" => Ok(Self::BottomEdge),
            "center-vertical" | "centered-vertical" => Ok(Self::CenteredVertical),
            "center-horizontal" | "centered-horizontal" => Ok(Self::CenteredHorizontal),
            "center" | "centered-both" => Ok(Self::CenteredBoth),
            "auto" => Ok(Self::Auto),
            other => Err(SceneError::UnknownName { kind: "alignment", value: other.to_string() }),
        }
    }
}

/// Bounds of the element found furthest toward the mode's edge.
fn key_bounds(mode: Alignment, bounds: &[(ElementId, Rect)]) -> Option<Rect> {
    let (_, first) = bounds.first()?;
    Some(bounds.iter().fold(*first, |key, (_, b)| if mode.key_wins(*b, key) { *b } else { key }))
}

/// Resolve `Auto` to the centred axis with the smaller total centre
/// displacement. Vertical wins ties.
fn resolve_auto(bounds: &[(ElementId, Rect)]) -> Alignment {
    let vertical_key = key_bounds(Alignment::CenteredVertical, bounds);
    let horizontal_key = key_bounds(Alignment::CenteredHorizontal, bounds);
    let (Some(vk), Some(hk)) = (vertical_key, horizontal_key) else {
        return Alignment::CenteredVertical;
    };
    let vertical: f64 = bounds.iter().map(|(_, b)| (vk.center().x - b.center().x).abs()).sum();
    let horizontal: f64 = bounds.iter().map(|(_, b)| (hk.center().y - b.center().y).abs()).sum();
    if vertical <= horizontal { Alignment::CenteredVertical } else { Alignment::CenteredHorizontal }
}

impl Scene {
    /// Align the selection. Needs at least two selected elements and no
    /// pass-through session. Returns whether anything moved.
    pub fn align(&mut self, mode: Alignment) -> bool {
        if self.selection.is_pass_through() || self.selection.selected_ids(&self.store).len() < 2 {
            return false;
        }
        let before = self.store.snapshot();
        let moved = if mode == Alignment::CenteredBoth {
            let vertical = self.align_axis(Alignment::CenteredVertical);
            self.align_axis(Alignment::CenteredHorizontal) | vertical
        } else {
            self.align_axis(mode)
        };
        self.last_command = Some(RepeatableCommand::Align(mode));
        if !moved {
            return false;
        }
        self.save_snapshot(before);
        tracing::debug!(mode = %mode, "aligned selection");
        self.emit(SceneEvent::RenderNeeded);
        true
    }

    /// One alignment pass without snapshotting.
    fn align_axis(&mut self, mode: Alignment) -> bool {
        let bounds: Vec<(ElementId, Rect)> = self
            .selection
            .selected_ids(&self.store)
            .into_iter()
            .filter_map(|id| self.store.get(&id).filter(|e| !e.is_unbounded()).map(|e| (id, e.bounds(1.0))))
            .collect();
        let mode = if mode == Alignment::Auto { resolve_auto(&bounds) } else { mode };
        let Some(key) = key_bounds(mode, &bounds) else {
            return false;
        };
        let mut moved = false;
        for (id, b) in &bounds {
            let (x, y) = mode.target(*b, key);
            if (x - b.x0).abs() < ALIGN_EPSILON && (y - b.y0).abs() < ALIGN_EPSILON {
                continue;
            }
            if let Some(element) = self.store.get_mut(id) {
                moved |= element.reposition(x, y, f64::MAX, f64::MAX);
            }
        }
        moved
    }
}
