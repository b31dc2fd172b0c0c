//! OSINT Adapter - Scene-to-Update Poll Pipeline
//!
//! The adapter behind every `kind = "osint"` source entry. Each poll
//! fetches scenes newer than a watermark through the `ImagerySource`
//! port, runs the `Detector` port over them, and maps the resulting
//! detections to normalized position updates. Scene retrieval and
//! detection stay entirely behind their ports.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::SourceConfig;
use crate::domain::track::{Position, PositionUpdate};
use crate::ports::adapter::Adapter;
use crate::ports::detector::Detector;
use crate::ports::imagery::{ImagerySource, Scene};

/// Adapter orchestrating the fetch → detect → normalize pipeline.
pub struct OsintAdapter<S: ImagerySource, D: Detector> {
    /// Configuration stored unchanged at construction.
    config: SourceConfig,
    /// Scene provider.
    source: Arc<S>,
    /// Detection backend.
    detector: Arc<D>,
    /// Capture-time watermark: newest scene timestamp already processed.
    watermark_ms: AtomicU64,
}

impl<S: ImagerySource, D: Detector> OsintAdapter<S, D> {
    /// Create an OSINT adapter. Accepts any configuration; never fails.
    pub fn new(config: SourceConfig, source: Arc<S>, detector: Arc<D>) -> Self {
        Self {
            config,
            source,
            detector,
            watermark_ms: AtomicU64::new(0),
        }
    }

    /// Newest scene capture time already processed (Unix ms).
    pub fn watermark_ms(&self) -> u64 {
        self.watermark_ms.load(Ordering::Acquire)
    }

    /// Map one scene's detections into position updates.
    async fn process_scene(&self, scene: &Scene) -> Result<Vec<PositionUpdate>> {
        let detections = self
            .detector
            .detect(scene)
            .await
            .with_context(|| format!("Detection failed for scene {}", scene.id))?;

        let updates = detections
            .into_iter()
            .map(|d| PositionUpdate {
                track_id: Uuid::new_v4(),
                source: self.config.name.clone(),
                class: d.class,
                position: Position::new(d.lat_deg, d.lon_deg),
                confidence: d.confidence,
                timestamp_ms: scene.captured_at_ms,
                scene_id: Some(scene.id.clone()),
            })
            .collect();

        Ok(updates)
    }
}

#[async_trait]
impl<S: ImagerySource, D: Detector> Adapter for OsintAdapter<S, D> {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn config(&self) -> &SourceConfig {
        &self.config
    }

    #[instrument(skip(self), fields(source = %self.config.name))]
    async fn poll(&self) -> Result<Vec<PositionUpdate>> {
        let since_ms = self.watermark_ms.load(Ordering::Acquire);

        let scenes = self
            .source
            .fetch_scenes(since_ms)
            .await
            .with_context(|| format!("Scene fetch failed for {}", self.config.name))?;

        if scenes.is_empty() {
            debug!(since_ms, "No new scenes");
            return Ok(Vec::new());
        }

        // The watermark only advances over the contiguous prefix of
        // successful scenes in capture order. A failed scene and every
        // scene after it stay above the watermark and are fetched again
        // next poll; re-emitted updates are debounced downstream.
        let mut scenes = scenes;
        scenes.sort_by_key(|s| s.captured_at_ms);

        let mut updates = Vec::new();
        let mut newest_ms = since_ms;
        let mut advancing = true;

        for scene in &scenes {
            match self.process_scene(scene).await {
                Ok(mut scene_updates) => {
                    updates.append(&mut scene_updates);
                    if advancing {
                        newest_ms = newest_ms.max(scene.captured_at_ms);
                    }
                }
                Err(e) => {
                    advancing = false;
                    warn!(scene = %scene.id, error = %e, "Skipping scene, will refetch");
                }
            }
        }

        self.watermark_ms.store(newest_ms, Ordering::Release);

        debug!(
            scenes = scenes.len(),
            updates = updates.len(),
            watermark_ms = newest_ms,
            "Poll complete"
        );

        Ok(updates)
    }

    async fn is_healthy(&self) -> bool {
        self.source.is_healthy().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceKind;
    use crate::domain::track::TrackClass;
    use crate::ports::detector::Detection;
    use crate::ports::imagery::Annotation;

    struct FakeSource {
        scenes: Vec<Scene>,
    }

    #[async_trait]
    impl ImagerySource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch_scenes(&self, since_ms: u64) -> Result<Vec<Scene>> {
            Ok(self
                .scenes
                .iter()
                .filter(|s| s.captured_at_ms > since_ms)
                .cloned()
                .collect())
        }

        async fn is_healthy(&self) -> bool {
            true
        }
    }

    struct FakeDetector;

    #[async_trait]
    impl Detector for FakeDetector {
        fn name(&self) -> &str {
            "fake"
        }

        async fn detect(&self, scene: &Scene) -> Result<Vec<Detection>> {
            Ok(scene
                .annotations
                .iter()
                .map(|a| Detection {
                    class: TrackClass::from_label(&a.label),
                    lat_deg: a.lat_deg,
                    lon_deg: a.lon_deg,
                    confidence: a.confidence.unwrap_or(1.0),
                })
                .collect())
        }
    }

    fn osint_config() -> SourceConfig {
        SourceConfig {
            name: "osint-1".to_string(),
            kind: SourceKind::Osint,
            poll_interval_secs: 60,
            active: true,
            endpoint: Some("/scenes".to_string()),
            fixture_path: None,
        }
    }

    fn scene(id: &str, ts: u64, annotations: Vec<Annotation>) -> Scene {
        Scene {
            id: id.to_string(),
            source: "fake".to_string(),
            captured_at_ms: ts,
            annotations,
        }
    }

    fn vehicle_at(lat: f64, lon: f64) -> Annotation {
        Annotation {
            label: "vehicle".to_string(),
            lat_deg: lat,
            lon_deg: lon,
            confidence: Some(0.9),
        }
    }

    #[tokio::test]
    async fn test_config_stored_unchanged() {
        let config = osint_config();
        let adapter = OsintAdapter::new(
            config.clone(),
            Arc::new(FakeSource { scenes: vec![] }),
            Arc::new(FakeDetector),
        );
        assert_eq!(adapter.config(), &config);
    }

    #[tokio::test]
    async fn test_poll_maps_detections_to_updates() {
        let adapter = OsintAdapter::new(
            osint_config(),
            Arc::new(FakeSource {
                scenes: vec![scene("s1", 1_000, vec![vehicle_at(48.85, 2.35)])],
            }),
            Arc::new(FakeDetector),
        );

        let updates = adapter.poll().await.unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].source, "osint-1");
        assert_eq!(updates[0].class, TrackClass::Vehicle);
        assert_eq!(updates[0].timestamp_ms, 1_000);
        assert_eq!(updates[0].scene_id.as_deref(), Some("s1"));
    }

    #[tokio::test]
    async fn test_watermark_advances_and_dedups_scenes() {
        let adapter = OsintAdapter::new(
            osint_config(),
            Arc::new(FakeSource {
                scenes: vec![
                    scene("s1", 1_000, vec![vehicle_at(10.0, 10.0)]),
                    scene("s2", 2_000, vec![vehicle_at(11.0, 11.0)]),
                ],
            }),
            Arc::new(FakeDetector),
        );

        let first = adapter.poll().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(adapter.watermark_ms(), 2_000);

        // Nothing newer than the watermark on the second poll.
        let second = adapter.poll().await.unwrap();
        assert!(second.is_empty());
    }

    struct FlakyDetector {
        /// Scene id that fails while `healed` is false.
        failing_id: String,
        healed: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl Detector for FlakyDetector {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn detect(&self, scene: &Scene) -> Result<Vec<Detection>> {
            if scene.id == self.failing_id
                && !self.healed.load(std::sync::atomic::Ordering::Acquire)
            {
                anyhow::bail!("detection backend unavailable");
            }
            FakeDetector.detect(scene).await
        }
    }

    #[tokio::test]
    async fn test_failed_scene_is_refetched_after_recovery() {
        let detector = Arc::new(FlakyDetector {
            failing_id: "s1".to_string(),
            healed: std::sync::atomic::AtomicBool::new(false),
        });
        let adapter = OsintAdapter::new(
            osint_config(),
            Arc::new(FakeSource {
                scenes: vec![
                    scene("s1", 1_000, vec![vehicle_at(10.0, 10.0)]),
                    scene("s2", 2_000, vec![vehicle_at(11.0, 11.0)]),
                ],
            }),
            Arc::clone(&detector),
        );

        // s1 fails, s2 succeeds: the watermark must not pass s1.
        let first = adapter.poll().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].scene_id.as_deref(), Some("s2"));
        assert_eq!(adapter.watermark_ms(), 0);

        // Once detection recovers, both scenes are fetched and processed.
        detector
            .healed
            .store(true, std::sync::atomic::Ordering::Release);
        let second = adapter.poll().await.unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(adapter.watermark_ms(), 2_000);
    }

    #[tokio::test]
    async fn test_empty_poll_is_ok() {
        let adapter = OsintAdapter::new(
            osint_config(),
            Arc::new(FakeSource { scenes: vec![] }),
            Arc::new(FakeDetector),
        );
        assert!(adapter.poll().await.unwrap().is_empty());
    }
}
