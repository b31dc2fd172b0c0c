//! Annotation Detector - Provider-labeled Detection Extraction
//!
//! Implements the `Detector` port by lifting the annotations a provider
//! already shipped with its scene metadata into detections. Sources that
//! deliver raw imagery without annotations need a real detection backend
//! behind the same port; this crate does not carry one.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::track::TrackClass;
use crate::ports::detector::{Detection, Detector};
use crate::ports::imagery::Scene;

/// Detector that trusts provider annotations.
///
/// Annotations without a confidence value get `default_confidence`.
pub struct AnnotationDetector {
    /// Confidence assigned when the provider reports none.
    default_confidence: f64,
}

impl AnnotationDetector {
    /// Create a detector with the given fallback confidence.
    pub fn new(default_confidence: f64) -> Self {
        Self { default_confidence }
    }
}

impl Default for AnnotationDetector {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[async_trait]
impl Detector for AnnotationDetector {
    fn name(&self) -> &str {
        "annotation"
    }

    async fn detect(&self, scene: &Scene) -> anyhow::Result<Vec<Detection>> {
        let detections: Vec<Detection> = scene
            .annotations
            .iter()
            .map(|a| Detection {
                class: TrackClass::from_label(&a.label),
                lat_deg: a.lat_deg,
                lon_deg: a.lon_deg,
                confidence: a.confidence.unwrap_or(self.default_confidence),
            })
            .collect();

        debug!(
            scene = %scene.id,
            detections = detections.len(),
            "Lifted scene annotations"
        );
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::imagery::Annotation;

    fn scene_with(annotations: Vec<Annotation>) -> Scene {
        Scene {
            id: "s1".to_string(),
            source: "osint-1".to_string(),
            captured_at_ms: 1_000,
            annotations,
        }
    }

    #[tokio::test]
    async fn test_lifts_annotations() {
        let detector = AnnotationDetector::default();
        let scene = scene_with(vec![Annotation {
            label: "truck".to_string(),
            lat_deg: 10.0,
            lon_deg: 20.0,
            confidence: Some(0.8),
        }]);

        let detections = detector.detect(&scene).await.unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].class, TrackClass::Vehicle);
        assert!((detections[0].confidence - 0.8).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_confidence_uses_default() {
        let detector = AnnotationDetector::new(0.3);
        let scene = scene_with(vec![Annotation {
            label: "ship".to_string(),
            lat_deg: 0.0,
            lon_deg: 0.0,
            confidence: None,
        }]);

        let detections = detector.detect(&scene).await.unwrap();
        assert!((detections[0].confidence - 0.3).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_unannotated_scene_yields_nothing() {
        let detector = AnnotationDetector::default();
        let detections = detector.detect(&scene_with(vec![])).await.unwrap();
        assert!(detections.is_empty());
    }
}
