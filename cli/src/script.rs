//! Line-oriented editing scripts.
//!
//! One command per line; blank lines and lines starting with `#` are
//! skipped. Arguments are separated by whitespace.

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use scene::Scene;
use scene::align::Alignment;
use scene::combine::CombineOperation;
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: `{command}` expects {expected}")]
    BadArguments { line: usize, command: String, expected: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptCommand {
    SelectAll,
    Select(Uuid),
    SelectNone,
    Align(Alignment),
    Combine(CombineOperation),
    Group,
    Ungroup,
    Move { dx: f64, dy: f64 },
    Rotate(f64),
    Rotate90 { clockwise: bool },
    Flip { horizontal: bool },
    Opacity(f64),
    Front,
    Back,
    Forward,
    Backward,
    Undo,
    Redo,
    Repeat,
    Copy,
    Cut,
    Paste,
    Delete,
}

/// A parsed command with the 1-based line it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub command: ScriptCommand,
}

pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>, ScriptError> {
    let mut out = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if let Some(command) = parse_line(raw, line)? {
            out.push(ScriptLine { line, command });
        }
    }
    Ok(out)
}

fn parse_line(raw: &str, line: usize) -> Result<Option<ScriptCommand>, ScriptError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let mut words = trimmed.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let bad = |expected: &'static str| ScriptError::BadArguments { line, command: name.to_owned(), expected };

    let command = match (name, args.as_slice()) {
        ("select-all", []) => ScriptCommand::SelectAll,
        ("select-none", []) => ScriptCommand::SelectNone,
        ("select", [id]) => ScriptCommand::Select(id.parse().map_err(|_| bad("an element id"))?),
        ("align", [mode]) => ScriptCommand::Align(mode.parse().map_err(|_| bad("an alignment mode"))?),
        ("combine", [op]) => ScriptCommand::Combine(op.parse().map_err(|_| bad("a combine operation"))?),
        ("group", []) => ScriptCommand::Group,
        ("ungroup", []) => ScriptCommand::Ungroup,
        ("move", [dx, dy]) => {
            let dx = parse_number(dx).ok_or_else(|| bad("two numbers"))?;
            let dy = parse_number(dy).ok_or_else(|| bad("two numbers"))?;
            ScriptCommand::Move { dx, dy }
        }
        ("rotate", [degrees]) => ScriptCommand::Rotate(parse_number(degrees).ok_or_else(|| bad("degrees"))?),
        ("rotate90", [dir]) => match *dir {
            "cw" => ScriptCommand::Rotate90 { clockwise: true },
            "ccw" => ScriptCommand::Rotate90 { clockwise: false },
            _ => return Err(bad("cw or ccw")),
        },
        ("flip", [axis]) => match *axis {
            "h" => ScriptCommand::Flip { horizontal: true },
            "v" => ScriptCommand::Flip { horizontal: false },
            _ => return Err(bad("h or v")),
        },
        ("opacity", [value]) => ScriptCommand::Opacity(parse_number(value).ok_or_else(|| bad("a number"))?),
        ("front", []) => ScriptCommand::Front,
        ("back", []) => ScriptCommand::Back,
        ("forward", []) => ScriptCommand::Forward,
        ("backward", []) => ScriptCommand::Backward,
        ("undo", []) => ScriptCommand::Undo,
        ("redo", []) => ScriptCommand::Redo,
        ("repeat", []) => ScriptCommand::Repeat,
        ("copy", []) => ScriptCommand::Copy,
        ("cut", []) => ScriptCommand::Cut,
        ("paste", []) => ScriptCommand::Paste,
        ("delete", []) => ScriptCommand::Delete,
        _ => {
            return Err(match arity(name) {
                Some(expected) => bad(expected),
                None => ScriptError::UnknownCommand { line, command: name.to_owned() },
            });
        }
    };
    Ok(Some(command))
}

fn parse_number(word: &str) -> Option<f64> {
    match word.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => None,
    }
}

/// Argument shape of a known command, `None` for unknown names.
fn arity(name: &str) -> Option<&'static str> {
    let expected = match name {
        "select" => "an element id",
        "align" => "an alignment mode",
        "combine" => "a combine operation",
        "move" => "two numbers",
        "rotate" => "degrees",
        "rotate90" => "cw or ccw",
        "flip" => "h or v",
        "opacity" => "a number",
        "select-all" | "select-none" | "group" | "ungroup" | "front" | "back" | "forward" | "backward" | "undo"
        | "redo" | "repeat" | "copy" | "cut" | "paste" | "delete" => "no arguments",
        _ => return None,
    };
    Some(expected)
}

impl ScriptCommand {
    /// Run against `scene` and describe the effect for the run log.
    pub fn apply(self, scene: &mut Scene) -> Result<String, scene::SceneError> {
        let report = match self {
            Self::SelectAll => format!("selected {}", scene.select_all()),
            Self::Select(id) => changed("select", scene.select_element(&id, false)),
            Self::SelectNone => {
                scene.select_none();
                "selection cleared".to_owned()
            }
            Self::Align(mode) => changed(&format!("align {mode}"), scene.align(mode)),
            Self::Combine(op) => format!("{op}: {}", scene.combine(op).code()),
            Self::Group => changed("group", scene.group_selected()),
            Self::Ungroup => changed("ungroup", scene.ungroup_selected()),
            Self::Move { dx, dy } => changed("move", scene.move_selected(dx, dy)),
            Self::Rotate(degrees) => changed("rotate", scene.rotate_selected(degrees)),
            Self::Rotate90 { clockwise } => changed("rotate90", scene.rotate_90(clockwise)),
            Self::Flip { horizontal } => changed("flip", scene.flip(horizontal)),
            Self::Opacity(value) => changed("opacity", scene.set_opacity(value)?),
            Self::Front => changed("front", scene.move_to_front()),
            Self::Back => changed("back", scene.move_to_back()),
            Self::Forward => changed("forward", scene.move_forward()),
            Self::Backward => changed("backward", scene.move_backward()),
            Self::Undo => changed("undo", scene.undo()),
            Self::Redo => changed("redo", scene.redo()),
            Self::Repeat => {
                let label = scene.last_repeat_operation();
                match (scene.repeat(), label) {
                    (true, Some(label)) => format!("repeated {label}"),
                    _ => "repeat: nothing to repeat".to_owned(),
                }
            }
            Self::Copy => format!("copied {}", scene.copy()),
            Self::Cut => format!("cut {}", scene.cut()),
            Self::Paste => changed("paste", scene.paste()),
            Self::Delete => format!("deleted {}", scene.delete_selected()),
        };
        Ok(report)
    }
}

fn changed(what: &str, did: bool) -> String {
    if did { what.to_owned() } else { format!("{what}: no change") }
}
