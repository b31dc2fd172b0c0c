//! Imagery Source Port - Scene Metadata Retrieval Interface
//!
//! Defines the trait for retrieving scene metadata from an imagery
//! provider, plus the scene/annotation DTOs that cross the boundary.
//! Acquisition protocol details (vendor APIs, tiling, payload download)
//! stay on the adapter side of this port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::track::{SceneId, SourceId};

/// A labeled region already attached to a scene by the upstream provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
  /// Provider label (e.g. "vehicle", "ship"); mapped to `TrackClass` later.
  pub label: String,
  /// Latitude of the annotated object in decimal degrees.
  pub lat_deg: f64,
  /// Longitude of the annotated object in decimal degrees.
  pub lon_deg: f64,
  /// Provider confidence in [0, 1], if reported.
  pub confidence: Option<f64>,
}

/// Metadata for one captured scene.
///
/// Carries only what the ingestion pipeline needs: identity, capture
/// time, and whatever annotations the provider shipped. Raw imagery
/// never enters this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
  /// Provider-assigned scene identifier.
  pub id: SceneId,
  /// Source that captured the scene.
  pub source: SourceId,
  /// Capture timestamp in Unix milliseconds.
  pub captured_at_ms: u64,
  /// Annotations shipped with the scene metadata.
  #[serde(default)]
  pub annotations: Vec<Annotation>,
}

/// Trait for scene metadata providers.
///
/// Implementors fetch scene listings from an external provider (HTTP
/// endpoint, local fixture file) and return them newest-last. The
/// watermark argument lets callers poll incrementally.
#[async_trait]
pub trait ImagerySource: Send + Sync + 'static {
  /// Stable source name for logging.
  fn name(&self) -> &str;

  /// Fetch scenes captured strictly after `since_ms`.
  async fn fetch_scenes(&self, since_ms: u64) -> anyhow::Result<Vec<Scene>>;

  /// Check if the provider is reachable.
  async fn is_healthy(&self) -> bool;
}
