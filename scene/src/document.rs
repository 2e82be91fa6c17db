//! Persisted scene shape.
//!
//! A [`SceneDocument`] is what a host writes to disk and reads back: the
//! elements in draw order plus the viewing state. Selection, history and
//! clipboard are session state and are never part of it.

#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::config::SceneConfig;
use crate::element::Element;
use crate::engine::Scene;
use crate::error::SceneError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Elements top first, the order the store keeps them in.
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default)]
    pub origin: Point,
    /// Canvas extent in units. Absent means unbounded.
    #[serde(default)]
    pub bounds: Option<Size>,
}

fn default_zoom() -> f64 {
    1.0
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self { elements: Vec::new(), zoom: default_zoom(), origin: Point::ZERO, bounds: None }
    }
}

impl SceneDocument {
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Scene {
    /// Capture the elements and viewing state for persistence.
    #[must_use]
    pub fn to_document(&self) -> SceneDocument {
        SceneDocument {
            elements: self.store.snapshot(),
            zoom: self.camera.zoom,
            origin: self.camera.origin,
            bounds: self.camera.bounds,
        }
    }

    /// Build a fresh scene from a document. History starts empty and the
    /// scene reports no unsaved changes.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config, a zoom outside the supported range, or an
    /// element whose opacity is not in `[0, 1]`. Elements repeating an id
    /// already loaded are dropped with a warning.
    pub fn from_document(document: SceneDocument, config: SceneConfig) -> Result<Self, SceneError> {
        let mut scene = Self::new(config)?;
        let mut camera = Camera { origin: document.origin, bounds: document.bounds, ..Camera::default() };
        camera.set_zoom(document.zoom)?;
        if let Some(bad) = document.elements.iter().find(|e| !(0.0..=1.0).contains(&e.opacity)) {
            return Err(SceneError::InvalidOpacity(bad.opacity));
        }

        let count = document.elements.len();
        scene.camera = camera;
        scene.store.install(document.elements);
        tracing::info!(elements = scene.store.len(), dropped = count - scene.store.len(), "scene loaded");
        Ok(scene)
    }
}
