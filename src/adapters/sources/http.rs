//! HTTP Imagery Source - Scene Listings over the Imagery Client
//!
//! Fetches scene metadata from a remote scene-listing endpoint through
//! the bounded, retrying `ImageryClient`. The endpoint returns the
//! generic JSON shape defined in `adapters::api::types`.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::adapters::api::client::ImageryClient;
use crate::adapters::api::types::SceneListResponse;
use crate::ports::imagery::{ImagerySource, Scene};

/// Scene provider backed by a remote HTTP endpoint.
pub struct HttpImagerySource {
    /// Source name, used to tag fetched scenes.
    name: String,
    /// Scene-listing path relative to the client base URL.
    endpoint: String,
    /// Shared HTTP client.
    client: Arc<ImageryClient>,
}

impl HttpImagerySource {
    /// Create a source reading from `endpoint` on the given client.
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, client: Arc<ImageryClient>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            client,
        }
    }
}

#[async_trait]
impl ImagerySource for HttpImagerySource {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), fields(source = %self.name))]
    async fn fetch_scenes(&self, since_ms: u64) -> Result<Vec<Scene>> {
        let path = format!("{}?since={}", self.endpoint, since_ms);

        let listing: SceneListResponse = self
            .client
            .get_json(&path)
            .await
            .with_context(|| format!("Scene listing failed for {}", self.name))?;

        // The endpoint filters by watermark, but do not trust it blindly.
        let scenes: Vec<Scene> = listing
            .scenes
            .into_iter()
            .filter(|s| s.captured_at_ms > since_ms)
            .map(|s| s.into_scene(&self.name))
            .collect();

        debug!(count = scenes.len(), since_ms, "Fetched scene listing");
        Ok(scenes)
    }

    async fn is_healthy(&self) -> bool {
        self.client.health_check().await
    }
}
