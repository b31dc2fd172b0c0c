//! Prometheus Metrics Registry - Ingestion Observability
//!
//! Registers and exposes Prometheus metrics for Grafana dashboards.
//! Covers poll cadence and latency, update admission and suppression,
//! and adapter health.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use prometheus::{
    Encoder, GaugeVec, HistogramOpts, HistogramVec, IntCounterVec, Opts,
    Registry, TextEncoder,
};
use tokio::sync::broadcast;
use tracing::{info, instrument};

/// Centralized Prometheus metrics for the ingestion daemon.
///
/// All metrics follow the naming convention `semper_fi_*` and include
/// source labels for per-adapter filtering.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Total polls executed counter.
    pub polls_total: IntCounterVec,
    /// Total polls that failed counter.
    pub poll_errors: IntCounterVec,
    /// Poll duration histogram (seconds).
    pub poll_duration_seconds: HistogramVec,
    /// Updates admitted by the ingest filter.
    pub updates_admitted: IntCounterVec,
    /// Updates suppressed by the ingest filter, by reason.
    pub updates_suppressed: IntCounterVec,
    /// Adapter health status (1 = healthy, 0 = failing).
    pub adapter_up: GaugeVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let polls_total = IntCounterVec::new(
            Opts::new("semper_fi_polls_total", "Total adapter polls executed"),
            &["source"],
        )?;

        let poll_errors = IntCounterVec::new(
            Opts::new("semper_fi_poll_errors_total", "Total adapter polls that failed"),
            &["source"],
        )?;

        let poll_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "semper_fi_poll_duration_seconds",
                "Adapter poll duration in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["source"],
        )?;

        let updates_admitted = IntCounterVec::new(
            Opts::new(
                "semper_fi_updates_admitted_total",
                "Updates admitted by the ingest filter",
            ),
            &["source", "class"],
        )?;

        let updates_suppressed = IntCounterVec::new(
            Opts::new(
                "semper_fi_updates_suppressed_total",
                "Updates suppressed by the ingest filter",
            ),
            &["source", "reason"],
        )?;

        let adapter_up = GaugeVec::new(
            Opts::new(
                "semper_fi_adapter_up",
                "Adapter health status (1=healthy, 0=failing)",
            ),
            &["source"],
        )?;

        // Register all metrics
        registry.register(Box::new(polls_total.clone()))?;
        registry.register(Box::new(poll_errors.clone()))?;
        registry.register(Box::new(poll_duration_seconds.clone()))?;
        registry.register(Box::new(updates_admitted.clone()))?;
        registry.register(Box::new(updates_suppressed.clone()))?;
        registry.register(Box::new(adapter_up.clone()))?;

        Ok(Self {
            registry,
            polls_total,
            poll_errors,
            poll_duration_seconds,
            updates_admitted,
            updates_suppressed,
            adapter_up,
        })
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let registry = metrics_self.registry.clone();
                async move {
                    let encoder = TextEncoder::new();
                    let metric_families = registry.gather();
                    let mut buffer = Vec::new();
                    if encoder.encode(&metric_families, &mut buffer).is_err() {
                        return String::new();
                    }
                    String::from_utf8(buffer).unwrap_or_default()
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_builds_and_counts() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.polls_total.with_label_values(&["sim-1"]).inc();
        metrics
            .updates_suppressed
            .with_label_values(&["osint-1", "duplicate"])
            .inc();
        assert_eq!(metrics.polls_total.with_label_values(&["sim-1"]).get(), 1);
    }
}
