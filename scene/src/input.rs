//! Input model: modifier keys, mouse buttons, the key map, and the gesture state machine.
//!
//! `Modifiers` capture the keys held at the time of a pointer event.
//! `Latches` are the sticky modifier states the wheel and selection logic
//! consult between events. `InputState` is the active gesture tracked between
//! pointer-down and pointer-up, carrying the context needed to compute
//! incremental deltas.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use kurbo::{Point, Rect, Vec2};

use crate::consts::{KEY_ROTATE_STEP, KEY_SHEAR_STEP, KEY_SIZE_STEP};
use crate::element::ElementId;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held. Makes selection additive.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held. Picks underneath the selection.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap). Requests the context menu.
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the host (e.g. `"Tab"`,
/// `"ArrowLeft"`, `"="`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Wheel / trackpad scroll delta, in notches.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Vertical scroll amount (positive = down).
    pub dy: f64,
}

/// Sticky modifier state consulted by wheel and selection handlers.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Latches {
    /// Shift was down at the last key event. Wheel rotates.
    pub shift: bool,
    /// Alt was down at the last key event.
    pub alt: bool,
    /// Wheel shears horizontally.
    pub shear_x: bool,
    /// Wheel shears vertically.
    pub shear_y: bool,
}

impl Latches {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Arm the horizontal shear latch, disarming the vertical one.
    pub fn latch_shear_x(&mut self) {
        self.shear_x = true;
        self.shear_y = false;
    }

    /// Arm the vertical shear latch, disarming the horizontal one.
    pub fn latch_shear_y(&mut self) {
        self.shear_y = true;
        self.shear_x = false;
    }
}

/// What a wheel notch does to the selection, given the current latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelMode {
    Size,
    Rotate,
    ShearX,
    ShearY,
}

impl WheelMode {
    #[must_use]
    pub fn from_latches(latches: Latches) -> Self {
        if latches.shear_x {
            Self::ShearX
        } else if latches.shear_y {
            Self::ShearY
        } else if latches.shift {
            Self::Rotate
        } else {
            Self::Size
        }
    }
}

/// Scene command bound to a key chord.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyCommand {
    SelectNext,
    SelectPrev,
    SelectNone,
    ZoomIn,
    ZoomOut,
    MoveForward,
    MoveBackward,
    DeleteSelected,
    /// Move by a screen-pixel delta.
    Nudge { dx: f64, dy: f64 },
    /// Add to the shear ratio along one axis.
    Shear { horizontal: bool, delta: f64 },
    /// Rotate by degrees.
    Rotate(f64),
    /// Grow by pixels, keeping the aspect ratio.
    Scale(f64),
    /// Grow width and height independently by pixels.
    Resize { dw: f64, dh: f64 },
    LatchShearX,
    LatchShearY,
}

/// Resolve a key chord to a scene command.
#[must_use]
pub fn key_command(key: &Key, mods: Modifiers) -> Option<KeyCommand> {
    let arrow = match key.0.as_str() {
        "ArrowLeft" => Some((-1.0, 0.0)),
        "ArrowRight" => Some((1.0, 0.0)),
        "ArrowUp" => Some((0.0, -1.0)),
        "ArrowDown" => Some((0.0, 1.0)),
        _ => None,
    };
    if let Some((dx, dy)) = arrow {
        return Some(arrow_command(dx, dy, mods));
    }
    match (key.0.as_str(), mods.meta) {
        ("Tab", _) if mods.shift => Some(KeyCommand::SelectPrev),
        ("Tab", _) => Some(KeyCommand::SelectNext),
        ("Escape", _) => Some(KeyCommand::SelectNone),
        ("=" | "+", true) => Some(KeyCommand::MoveForward),
        ("-", true) => Some(KeyCommand::MoveBackward),
        ("=" | "+", false) => Some(KeyCommand::ZoomIn),
        ("-", false) => Some(KeyCommand::ZoomOut),
        ("Delete" | "Backspace", _) => Some(KeyCommand::DeleteSelected),
        ("s" | "S", _) if mods.alt && mods.shift => Some(KeyCommand::LatchShearY),
        ("s" | "S", _) if mods.alt => Some(KeyCommand::LatchShearX),
        _ => None,
    }
}

fn arrow_command(dx: f64, dy: f64, mods: Modifiers) -> KeyCommand {
    let horizontal = dx != 0.0;
    if mods.alt {
        let delta = (if horizontal { dx } else { dy }) * KEY_SHEAR_STEP;
        KeyCommand::Shear { horizontal, delta }
    } else if mods.shift && horizontal {
        KeyCommand::Rotate(dx * KEY_ROTATE_STEP)
    } else if mods.shift {
        KeyCommand::Scale(-dy * KEY_SIZE_STEP)
    } else if mods.meta {
        KeyCommand::Resize { dw: dx, dh: dy }
    } else {
        KeyCommand::Nudge { dx, dy }
    }
}

/// Internal state for the gesture state machine.
///
/// Points are in canvas pixels at zoom 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging out a rubber-band selection rectangle.
    DragSelecting {
        press: Point,
        current: Point,
    },
    /// Moving the whole selection.
    MovingSelection {
        /// Pointer position at the previous event.
        last: Point,
    },
    /// Resizing one element by its drag box.
    Resizing {
        id: ElementId,
        /// Pointer position at the press.
        press: Point,
        /// Unrotated width and height (pixels) at the press.
        orig_width: f64,
        orig_height: f64,
        /// From the pointer to the transformed lower-right corner at the press.
        corner_offset: Vec2,
    },
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Normalised rubber-band rectangle, when drag-selecting.
    #[must_use]
    pub fn drag_rect(&self) -> Option<Rect> {
        match self {
            Self::DragSelecting { press, current } => Some(Rect::from_points(*press, *current)),
            _ => None,
        }
    }
}
