//! Imagery HTTP Client - Bounded, Retrying REST Client
//!
//! Wraps reqwest with bounded concurrency, retries with exponential
//! backoff, and bearer-token authentication for all imagery endpoint
//! interactions.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use tokio::sync::Semaphore;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::auth::ApiAuth;

/// Errors surfaced by the imagery client, split by retryability.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transient failure: network error, 429, or 5xx. Worth retrying.
    #[error("transient imagery API failure: {0}")]
    Transient(String),
    /// Permanent failure: 4xx other than 429, or malformed response.
    #[error("imagery API rejected request ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Configuration for the imagery HTTP client.
#[derive(Debug, Clone)]
pub struct ImageryClientConfig {
    /// Base URL for the imagery API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum concurrent requests.
    pub max_concurrent: usize,
    /// Maximum retries on transient errors.
    pub max_retries: u32,
    /// Base delay between retries (exponential backoff).
    pub retry_base_delay: Duration,
}

impl Default for ImageryClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://imagery.invalid".to_string(),
            timeout: Duration::from_secs(10),
            max_concurrent: 4,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(200),
        }
    }
}

/// Bounded, retrying HTTP client for the imagery API.
pub struct ImageryClient {
    /// Underlying HTTP client.
    http: Client,
    /// Authentication manager.
    auth: Arc<ApiAuth>,
    /// Client configuration.
    config: ImageryClientConfig,
    /// Concurrency limiter.
    semaphore: Arc<Semaphore>,
}

impl ImageryClient {
    /// Create a new imagery client.
    pub fn new(auth: Arc<ApiAuth>, config: ImageryClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(2)
            .build()
            .context("Failed to build HTTP client")?;

        let semaphore = Arc::new(Semaphore::new(config.max_concurrent));

        Ok(Self {
            http,
            auth,
            config,
            semaphore,
        })
    }

    /// Execute a GET and deserialize the JSON response body.
    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get(path).await?;
        serde_json::from_str(&body)
            .with_context(|| format!("Malformed JSON from {path}"))
    }

    /// Execute a GET request with auth header, concurrency limit, and retries.
    pub async fn get(&self, path: &str) -> Result<String> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .context("Semaphore closed")?;

        let url = format!("{}{}", self.config.base_url, path);
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = self.config.retry_base_delay * 2u32.pow(attempt - 1);
                debug!(attempt, delay_ms = delay.as_millis(), "Retrying request");
                sleep(delay).await;
            }

            let req = self
                .http
                .get(&url)
                .header("Authorization", self.auth.bearer());

            match req.send().await {
                Ok(response) => match response.status() {
                    StatusCode::OK => {
                        return response
                            .text()
                            .await
                            .context("Failed to read response body");
                    }
                    StatusCode::TOO_MANY_REQUESTS => {
                        warn!(path, "Rate limited by imagery API, backing off");
                        sleep(Duration::from_secs(2)).await;
                        last_error = Some(ApiError::Transient("rate limited".to_string()));
                        continue;
                    }
                    status if status.is_server_error() => {
                        warn!(status = %status, path, "Server error, retrying");
                        last_error =
                            Some(ApiError::Transient(format!("server error: {status}")));
                        continue;
                    }
                    status => {
                        let body = response.text().await.unwrap_or_default();
                        return Err(ApiError::Rejected { status, body }.into());
                    }
                },
                Err(e) => {
                    warn!(error = %e, attempt, path, "Request failed");
                    last_error = Some(ApiError::Transient(e.to_string()));
                    continue;
                }
            }
        }

        Err(last_error
            .map(Into::into)
            .unwrap_or_else(|| anyhow::anyhow!("Max retries exceeded")))
    }

    /// Check if the API is reachable.
    pub async fn health_check(&self) -> bool {
        self.get("/health").await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_error_display() {
        let err = ApiError::Rejected {
            status: StatusCode::FORBIDDEN,
            body: "bad token".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("403"), "missing status in: {msg}");
        assert!(msg.contains("bad token"));
    }

    #[test]
    fn test_default_config_bounds() {
        let config = ImageryClientConfig::default();
        assert!(config.max_concurrent > 0);
        assert!(config.max_retries > 0);
    }
}
