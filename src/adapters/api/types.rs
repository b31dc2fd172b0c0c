//! Imagery API Types - Wire Request/Response Definitions
//!
//! JSON shapes for the generic scene-listing endpoint. These are
//! adapter-side DTOs; conversion into the port-level `Scene` happens
//! here so nothing upstream sees wire details.

use serde::Deserialize;

use crate::ports::imagery::{Annotation, Scene};

/// Response body of `GET /scenes?since=<unix_ms>`.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneListResponse {
    /// Scenes captured after the requested watermark, oldest first.
    pub scenes: Vec<SceneMeta>,
}

/// One scene entry in a listing response.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneMeta {
    /// Provider-assigned scene identifier.
    pub id: String,
    /// Capture timestamp in Unix milliseconds.
    pub captured_at_ms: u64,
    /// Annotations shipped with the scene, if any.
    #[serde(default)]
    pub annotations: Vec<AnnotationMeta>,
}

/// One annotation entry within a scene.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationMeta {
    /// Provider label string.
    pub label: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
    /// Provider confidence, if reported.
    pub confidence: Option<f64>,
}

impl SceneMeta {
    /// Convert into the port-level scene, tagging it with the source name.
    pub fn into_scene(self, source: &str) -> Scene {
        Scene {
            id: self.id,
            source: source.to_string(),
            captured_at_ms: self.captured_at_ms,
            annotations: self
                .annotations
                .into_iter()
                .map(|a| Annotation {
                    label: a.label,
                    lat_deg: a.lat,
                    lon_deg: a.lon,
                    confidence: a.confidence,
                })
                .collect(),
        }
    }
}
