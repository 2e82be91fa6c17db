//! Shared numeric constants for the scene crate.

// ── Zoom ────────────────────────────────────────────────────────

/// Zoom change applied by one zoom-in or zoom-out step.
pub const ZOOM_STEP: f64 = 0.25;

/// Zoom-in is allowed while the zoom is below this value.
pub const ZOOM_IN_LIMIT: f64 = 8.0;

/// Zoom-out is allowed while the zoom is above this value.
pub const ZOOM_OUT_LIMIT: f64 = 0.5;

/// Smallest zoom accepted by `Camera::set_zoom`.
pub const MIN_ZOOM: f64 = 0.25;

/// Largest zoom accepted by `Camera::set_zoom`.
pub const MAX_ZOOM: f64 = 8.25;

// ── Wheel gestures ──────────────────────────────────────────────

/// Degrees of rotation per wheel notch.
pub const ROTATION_MULTIPLIER: f64 = 1.0;

/// Shear ratio per wheel notch.
pub const SHEAR_MULTIPLIER: f64 = 0.1;

/// Pixels of growth per wheel notch.
pub const SIZE_INCREASE_MULTIPLIER: f64 = 0.5;

/// Wheel events closer together than this share one undo snapshot.
pub const WHEEL_BURST_MS: u64 = 1000;

// ── Keyboard nudges ─────────────────────────────────────────────

/// Shear ratio applied by one Alt+arrow press.
pub const KEY_SHEAR_STEP: f64 = 0.01;

/// Degrees applied by one Shift+Left/Right press.
pub const KEY_ROTATE_STEP: f64 = 0.1;

/// Pixels applied by one Shift+Up/Down press.
pub const KEY_SIZE_STEP: f64 = 0.5;

// ── Timing ──────────────────────────────────────────────────────

/// A press held this long shows the live position readout.
pub const HOLD_THRESHOLD_MS: u64 = 500;

// ── Geometry ────────────────────────────────────────────────────

/// Flattening tolerance (units) when converting curves to polygons.
pub const FLATTEN_TOLERANCE: f64 = 0.01;

/// Merged geometry with less area than this (square units) is treated as empty.
pub const MIN_MERGED_AREA: f64 = 1e-9;

/// Right angle, in degrees.
pub const RIGHT_ANGLE: f64 = 90.0;
