//! Health Check Server - Liveness and Readiness Probes
//!
//! Exposes /live and /ready via axum for Docker health checks and
//! orchestrator probes. Readiness requires polling adapters, a
//! writable track log, and a running ingest engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{info, instrument};

/// Shared health flags, flipped by the periodic probe task and the
/// shutdown path.
#[derive(Debug)]
pub struct HealthState {
    /// At least one adapter is polling successfully.
    pub adapters_healthy: AtomicBool,
    /// The track log sink accepts writes.
    pub sink_healthy: AtomicBool,
    /// The ingest engine loop is running.
    pub engine_running: AtomicBool,
}

impl HealthState {
    /// All components start out healthy.
    pub fn new() -> Self {
        Self {
            adapters_healthy: AtomicBool::new(true),
            sink_healthy: AtomicBool::new(true),
            engine_running: AtomicBool::new(true),
        }
    }

    /// Ready to serve only when every component reports healthy.
    pub fn is_ready(&self) -> bool {
        self.adapters_healthy.load(Ordering::Relaxed)
            && self.sink_healthy.load(Ordering::Relaxed)
            && self.engine_running.load(Ordering::Relaxed)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP server wrapping the shared [`HealthState`].
pub struct HealthServer {
    state: Arc<HealthState>,
    port: u16,
}

impl HealthServer {
    pub fn new(state: Arc<HealthState>, port: u16) -> Self {
        Self { state, port }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/live", get(liveness))
            .route("/ready", get(readiness))
            .with_state(Arc::clone(&self.state))
    }

    /// Serve probes until the shutdown signal arrives.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(
        self,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let listener =
            tokio::net::TcpListener::bind(("0.0.0.0", self.port)).await?;
        info!(port = self.port, "Health server started");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

/// Liveness: 200 whenever the process can answer at all.
async fn liveness() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness: 200 plus per-component detail, 503 when anything is down.
async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let body = json!({
        "adapters": state.adapters_healthy.load(Ordering::Relaxed),
        "sink": state.sink_healthy.load(Ordering::Relaxed),
        "engine": state.engine_running.load(Ordering::Relaxed),
    });
    let status = if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_requires_all_components() {
        let state = HealthState::new();
        assert!(state.is_ready());

        state.sink_healthy.store(false, Ordering::Relaxed);
        assert!(!state.is_ready());

        state.sink_healthy.store(true, Ordering::Relaxed);
        state.engine_running.store(false, Ordering::Relaxed);
        assert!(!state.is_ready());
    }
}
