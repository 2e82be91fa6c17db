//! Boundary errors.
//!
//! Commands whose preconditions are not met (too few elements selected,
//! duplicate id, absent element) are reported through `bool`/`Option`/
//! [`crate::combine::CombineOutcome`] returns. `SceneError` is reserved for
//! arguments that are invalid on their face.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("resolution scale must be positive and finite, got {0}")]
    InvalidScale(f64),
    #[error("zoom {0} is outside the supported range")]
    InvalidZoom(f64),
    #[error("undo depth must be at least 1, got {0}")]
    InvalidUndoDepth(usize),
    #[error("opacity must be between 0 and 1, got {0}")]
    InvalidOpacity(f64),
    #[error("geometry is empty")]
    EmptyGeometry,
    #[error("invalid path data: {0}")]
    InvalidPath(String),
    #[error("unknown {kind} `{value}`")]
    UnknownName { kind: &'static str, value: String },
    #[error("invalid value `{value}` for {key}")]
    InvalidConfig { key: &'static str, value: String },
    #[error("document error: {0}")]
    Document(#[from] serde_json::Error),
}

impl SceneError {
    /// Stable machine-readable code for hosts that map errors to messages.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidScale(_) => "E_INVALID_SCALE",
            Self::InvalidZoom(_) => "E_INVALID_ZOOM",
            Self::InvalidUndoDepth(_) => "E_INVALID_UNDO_DEPTH",
            Self::InvalidOpacity(_) => "E_INVALID_OPACITY",
            Self::EmptyGeometry => "E_EMPTY_GEOMETRY",
            Self::InvalidPath(_) => "E_INVALID_PATH",
            Self::UnknownName { .. } => "E_UNKNOWN_NAME",
            Self::InvalidConfig { .. } => "E_INVALID_CONFIG",
            Self::Document(_) => "E_DOCUMENT",
        }
    }
}
