//! Detector Port - Object Detection Interface
//!
//! Defines the trait for turning a retrieved scene into object
//! detections. Detection algorithms (computer vision or otherwise) live
//! entirely behind this port; this crate only orchestrates them.

use async_trait::async_trait;

use crate::domain::track::TrackClass;
use crate::ports::imagery::Scene;

/// One detected object within a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
  /// Classified object type.
  pub class: TrackClass,
  /// Latitude in decimal degrees.
  pub lat_deg: f64,
  /// Longitude in decimal degrees.
  pub lon_deg: f64,
  /// Detector confidence in [0, 1].
  pub confidence: f64,
}

/// Trait for scene detectors.
///
/// Implementors examine a scene and report the objects found in it.
/// A scene with nothing of interest yields an empty vector, not an error.
#[async_trait]
pub trait Detector: Send + Sync + 'static {
  /// Stable detector name for logging.
  fn name(&self) -> &str;

  /// Detect objects in a single scene.
  async fn detect(&self, scene: &Scene) -> anyhow::Result<Vec<Detection>>;
}
