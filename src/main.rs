//! semper-fi - Entry Point
//!
//! Initializes configuration, logging, adapters, and the ingest engine.
//! Runs until SIGINT/SIGTERM.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Shutdown + health channels
//! 4. Create TrackLogger sink (JSONL under data_dir)
//! 5. Create metrics registry + spawn /metrics server
//! 6. Spawn health server (/live + /ready)
//! 7. Build adapters from config (sim, osint over HTTP or fixture)
//! 8. Spawn adapter supervisor (per-source poll loops with backoff)
//! 9. Spawn ingest engine (validate → debounce → persist → publish)
//! 10. Spawn config watcher (60s hot-reload of debounce thresholds)
//! 11. Wait for SIGINT → graceful shutdown (signal→drain→exit)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

mod adapters;
mod config;
mod domain;
mod ports;
mod usecases;

use adapters::api::auth::ApiAuth;
use adapters::api::client::{ImageryClient, ImageryClientConfig};
use adapters::detect::AnnotationDetector;
use adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use adapters::persistence::TrackLogger;
use adapters::sources::{FixtureImagerySource, HttpImagerySource};
use adapters::{AdapterSupervisor, OsintAdapter, SimAdapter};
use config::{AppConfig, SourceKind};
use ports::adapter::Adapter;
use ports::sink::UpdateSink;
use usecases::IngestEngine;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.service.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        dry_run = config.service.dry_run,
        sources = config.sources.len(),
        "Starting semper-fi"
    );

    // ── 3. Shutdown signal channel + health state ───────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let health_state = Arc::new(HealthState::new());

    // ── 4. Create JSONL track log sink ──────────────────────
    let sink = Arc::new(
        TrackLogger::new(&config.persistence.data_dir)
            .await
            .context("Failed to create track logger")?,
    );

    // ── 5. Metrics registry + /metrics server ───────────────
    let metrics = Arc::new(MetricsRegistry::new().context("Failed to build metrics")?);
    let metrics_handle = if config.metrics.enabled {
        let server = Arc::clone(&metrics);
        let bind = config.metrics.bind_address.clone();
        let rx = shutdown_tx.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = server.serve(bind, rx).await {
                error!(error = %e, "Metrics server failed");
            }
        }))
    } else {
        None
    };

    // ── 6. Health server (/live + /ready) ───────────────────
    let health_server = HealthServer::new(Arc::clone(&health_state), config.metrics.health_port);
    let health_rx = shutdown_tx.subscribe();
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health_server.run(health_rx).await {
            error!(error = %e, "Health server failed");
        }
    });

    // ── 7. Build adapters from config ───────────────────────
    let adapters = build_adapters(&config).context("Failed to build adapters")?;
    anyhow::ensure!(!adapters.is_empty(), "No active sources configured");

    // ── 8. Spawn the adapter supervisor ─────────────────────
    let supervisor = Arc::new(AdapterSupervisor::new(
        adapters,
        config.ingest.channel_capacity,
        Arc::clone(&metrics),
        shutdown_tx.clone(),
    ));
    let update_rx = supervisor.subscribe();
    let adapter_handles = supervisor.spawn();

    // ── 9. Config watcher for hot-reloaded thresholds ───────
    let (mut watcher, config_rx) =
        config::hot_reload::ConfigWatcher::new("config.toml", config.clone());
    let watcher_rx = shutdown_tx.subscribe();
    let watcher_handle = tokio::spawn(async move {
        if let Err(e) = watcher.run(watcher_rx).await {
            error!(error = %e, "Config watcher failed");
        }
    });

    // ── 10. Spawn the ingest engine ─────────────────────────
    let mut engine = IngestEngine::new(
        Arc::clone(&sink),
        update_rx,
        Arc::clone(&metrics),
        config_rx,
        shutdown_tx.subscribe(),
    );
    let engine_handle = tokio::spawn(async move {
        if let Err(e) = engine.run().await {
            error!(error = %e, "Ingest engine failed");
        }
    });

    // ── 11. Periodic health aggregation ─────────────────────
    let probe_supervisor = Arc::clone(&supervisor);
    let probe_sink = Arc::clone(&sink);
    let probe_state = Arc::clone(&health_state);
    let mut probe_rx = shutdown_tx.subscribe();
    let probe_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = probe_rx.recv() => return,
                _ = tokio::time::sleep(Duration::from_secs(15)) => {
                    probe_state
                        .adapters_healthy
                        .store(probe_supervisor.is_healthy(), Ordering::Relaxed);
                    probe_state
                        .sink_healthy
                        .store(probe_sink.is_healthy().await, Ordering::Relaxed);
                }
            }
        }
    });

    info!("All tasks spawned, daemon is running");

    // ── 12. Wait for SIGINT/SIGTERM ─────────────────────────
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("Failed to install SIGTERM handler")?;
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("SIGINT received, initiating graceful shutdown");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received, initiating graceful shutdown");
        }
    }

    // ── Graceful shutdown (signal→drain→exit) ───────────────

    // 1. Mark not ready (readiness probe → 503)
    health_state.engine_running.store(false, Ordering::Relaxed);

    // 2. Signal all tasks to stop
    let _ = shutdown_tx.send(());
    info!("Shutdown signal broadcast to all tasks");

    // 3. Wait for engine to drain (up to 10s)
    info!("Waiting for engine shutdown...");
    let _ = tokio::time::timeout(Duration::from_secs(10), engine_handle).await;

    // 4. Wait for adapter loops to stop (up to 5s)
    for handle in adapter_handles {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    // 5. Stop auxiliary tasks
    let _ = tokio::time::timeout(Duration::from_secs(5), watcher_handle).await;
    probe_handle.abort();
    health_handle.abort();
    if let Some(handle) = metrics_handle {
        handle.abort();
    }

    info!("Shutdown complete");
    Ok(())
}

/// Instantiate one adapter per active source entry.
///
/// HTTP-backed osint sources share a single `ImageryClient`; credentials
/// are only loaded from the environment when such a source exists.
fn build_adapters(config: &AppConfig) -> Result<Vec<Arc<dyn Adapter>>> {
    let needs_http = config
        .sources
        .iter()
        .any(|s| s.active && s.kind == SourceKind::Osint && s.endpoint.is_some());

    let client = if needs_http {
        let auth = Arc::new(
            ApiAuth::from_env().context("Failed to load imagery credentials from env")?,
        );
        let client_config = ImageryClientConfig {
            base_url: config.api.base_url.clone(),
            timeout: Duration::from_millis(config.api.timeout_ms),
            max_concurrent: config.api.max_concurrent,
            max_retries: config.api.max_retries,
            retry_base_delay: Duration::from_millis(200),
        };
        Some(Arc::new(
            ImageryClient::new(auth, client_config).context("Failed to create imagery client")?,
        ))
    } else {
        None
    };

    let detector = Arc::new(AnnotationDetector::default());
    let mut adapters: Vec<Arc<dyn Adapter>> = Vec::new();

    for source in &config.sources {
        if !source.active {
            info!(source = %source.name, "Source inactive, skipping");
            continue;
        }

        match source.kind {
            SourceKind::Sim => {
                adapters.push(Arc::new(SimAdapter::new(source.clone())));
            }
            SourceKind::Osint => {
                if let Some(endpoint) = &source.endpoint {
                    let client = client.as_ref().with_context(|| {
                        format!("No imagery client for HTTP source {}", source.name)
                    })?;
                    let imagery = Arc::new(HttpImagerySource::new(
                        &source.name,
                        endpoint,
                        Arc::clone(client),
                    ));
                    adapters.push(Arc::new(OsintAdapter::new(
                        source.clone(),
                        imagery,
                        Arc::clone(&detector),
                    )));
                } else if let Some(path) = &source.fixture_path {
                    let imagery = Arc::new(FixtureImagerySource::new(&source.name, path));
                    adapters.push(Arc::new(OsintAdapter::new(
                        source.clone(),
                        imagery,
                        Arc::clone(&detector),
                    )));
                } else {
                    // Unreachable after config validation, but do not panic.
                    warn!(source = %source.name, "Osint source has no origin, skipping");
                }
            }
        }
    }

    Ok(adapters)
}
