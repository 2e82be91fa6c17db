//! Editing core for a Z-ordered 2D vector scene.
//!
//! The crate owns everything between "a pointer or key event arrived" and
//! "the ordered list of scene elements changed": resolving which element is
//! under the pointer, tracking selection, driving move/resize/rotate/shear
//! gestures, keeping a bounded undo history of scene snapshots, and the
//! discrete commands (align, group, combine, clipboard, repeat). Painting,
//! window plumbing and file encoding belong to the embedding application,
//! which talks to the core through [`engine::Scene`] and drains
//! [`engine::SceneEvent`]s after each call.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | The [`engine::Scene`] entry point, events, store-level commands |
//! | [`element`] | Scene elements, their capabilities and geometry mutators |
//! | [`store`] | Z-ordered element store with an id index |
//! | [`selection`] | Selection flags, last-selected handle, pass-through target |
//! | [`transform`] | Per-element affine transforms |
//! | [`hit`] | Pointer hit-testing, drag box and drag-select |
//! | [`camera`] | Zoom, origin and canvas bounds |
//! | [`input`] | Modifiers, key map and the gesture state machine |
//! | [`gesture`] | Pointer, wheel, key and tick handlers |
//! | [`manipulate`] | Move/rotate/shear/size/flip commands on the selection |
//! | [`history`] | Bounded undo/redo of snapshots with suspendable recording |
//! | [`align`] | Edge and centre alignment of the selection |
//! | [`combine`] | Boolean path algebra over shape elements |
//! | [`group`] | Group and ungroup composite elements |
//! | [`document`] | Persisted scene shape handed to serializers |
//! | [`config`] | Tunable settings with env overrides |
//! | [`error`] | Typed boundary errors |
//! | [`consts`] | Fixed numeric constants |

pub mod align;
pub mod camera;
pub mod combine;
pub mod config;
pub mod consts;
pub mod document;
pub mod element;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod group;
pub mod hit;
pub mod history;
pub mod input;
pub mod manipulate;
pub mod selection;
pub mod store;
pub mod transform;

pub use engine::{Scene, SceneEvent};
pub use error::SceneError;
