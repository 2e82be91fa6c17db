//! Scene tuning parsed from defaults, serialized settings, or environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SceneError;

pub const DEFAULT_UNDO_DEPTH: usize = 25;
pub const DEFAULT_UNIT_SCALE: f64 = 72.0;
pub const DEFAULT_DRAG_BOX_SIZE: f64 = 10.0;
pub const DEFAULT_SHAPE_SELECT_MARGIN: f64 = 10.0;
pub const DEFAULT_PASTE_OFFSET: f64 = 0.2;

/// Speed of the selection-highlight animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightAnimation {
    #[default]
    Fast,
    Slow,
    None,
}

impl HighlightAnimation {
    /// Interval between highlight ticks.
    #[must_use]
    pub fn interval(self) -> Duration {
        match self {
            Self::Fast => Duration::from_millis(200),
            Self::Slow | Self::None => Duration::from_millis(510),
        }
    }
}

impl FromStr for HighlightAnimation {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "slow" => Ok(Self::Slow),
            "none" | "off" => Ok(Self::None),
            other => Err(SceneError::InvalidConfig { key: "SCENE_HIGHLIGHT", value: other.to_string() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Maximum number of snapshots kept in each of the undo and redo histories.
    pub undo_depth: usize,
    /// Canvas pixels per scene unit at zoom 1.
    pub unit_scale: f64,
    /// Side of the resize handle, in device-independent pixels.
    pub drag_box_size: f64,
    /// Extra pixels around a shape outline that still count as a hit.
    pub shape_select_margin: f64,
    pub scroll_wheel_multiplier: f64,
    pub highlight: HighlightAnimation,
    pub zoom_enabled: bool,
    pub wheel_enabled: bool,
    /// Offset (units) applied to clipboard contents on each paste.
    pub paste_offset: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            undo_depth: DEFAULT_UNDO_DEPTH,
            unit_scale: DEFAULT_UNIT_SCALE,
            drag_box_size: DEFAULT_DRAG_BOX_SIZE,
            shape_select_margin: DEFAULT_SHAPE_SELECT_MARGIN,
            scroll_wheel_multiplier: 1.0,
            highlight: HighlightAnimation::default(),
            zoom_enabled: true,
            wheel_enabled: true,
            paste_offset: DEFAULT_PASTE_OFFSET,
        }
    }
}

impl SceneConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `SCENE_UNDO_DEPTH`: default 25
    /// - `SCENE_UNIT_SCALE`: default 72
    /// - `SCENE_DRAG_BOX_SIZE`: default 10
    /// - `SCENE_WHEEL_MULTIPLIER`: default 1.0
    /// - `SCENE_HIGHLIGHT`: `fast` (default), `slow` or `none`
    pub fn from_env() -> Result<Self, SceneError> {
        Self::from_lookup(|key| std::env::var(key).map_or(None, Some))
    }

    /// Build config from an arbitrary key lookup. Used by `from_env` and tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SceneError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            undo_depth: parse_or("SCENE_UNDO_DEPTH", lookup("SCENE_UNDO_DEPTH"), defaults.undo_depth)?,
            unit_scale: parse_or("SCENE_UNIT_SCALE", lookup("SCENE_UNIT_SCALE"), defaults.unit_scale)?,
            drag_box_size: parse_or("SCENE_DRAG_BOX_SIZE", lookup("SCENE_DRAG_BOX_SIZE"), defaults.drag_box_size)?,
            scroll_wheel_multiplier: parse_or(
                "SCENE_WHEEL_MULTIPLIER",
                lookup("SCENE_WHEEL_MULTIPLIER"),
                defaults.scroll_wheel_multiplier,
            )?,
            highlight: match lookup("SCENE_HIGHLIGHT") {
                Some(raw) => raw.parse()?,
                None => defaults.highlight,
            },
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.undo_depth == 0 {
            return Err(SceneError::InvalidUndoDepth(self.undo_depth));
        }
        if !(self.unit_scale.is_finite() && self.unit_scale > 0.0) {
            return Err(SceneError::InvalidScale(self.unit_scale));
        }
        if !(self.drag_box_size.is_finite() && self.drag_box_size > 0.0) {
            return Err(SceneError::InvalidConfig { key: "drag_box_size", value: self.drag_box_size.to_string() });
        }
        if !(self.shape_select_margin.is_finite() && self.shape_select_margin >= 0.0) {
            return Err(SceneError::InvalidConfig {
                key: "shape_select_margin",
                value: self.shape_select_margin.to_string(),
            });
        }
        if !self.scroll_wheel_multiplier.is_finite() {
            return Err(SceneError::InvalidConfig {
                key: "scroll_wheel_multiplier",
                value: self.scroll_wheel_multiplier.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, SceneError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    raw.trim()
        .parse::<T>()
        .map_err(|_| SceneError::InvalidConfig { key, value: raw.clone() })
}
