//! Adapter Supervisor - Lifecycle Management for Poll Loops
//!
//! Drives every configured adapter on its own poll interval in its own
//! tokio task, with error backoff, per-adapter health tracking, and a
//! shared broadcast channel that carries every update the adapters
//! produce. Provides health aggregation for the /ready endpoint.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::domain::track::PositionUpdate;
use crate::ports::adapter::Adapter;

/// Backoff ceiling after repeated poll failures.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Tracks the health state of a single adapter task.
#[derive(Debug)]
struct AdapterHealth {
    /// Adapter name for logging.
    name: String,
    /// Whether the last poll succeeded.
    connected: AtomicBool,
    /// Consecutive failed polls.
    consecutive_errors: AtomicU32,
}

/// Supervises all adapter poll tasks.
///
/// Spawns one task per active adapter, monitors health, and provides
/// graceful shutdown coordination. Updates flow out through a single
/// broadcast channel shared by all adapters.
pub struct AdapterSupervisor {
    /// Adapters to drive, dyn so mixed kinds share one supervisor.
    adapters: Vec<Arc<dyn Adapter>>,
    /// Per-adapter health trackers, same order as `adapters`.
    health: Vec<Arc<AdapterHealth>>,
    /// Broadcast sender for all produced updates.
    update_tx: broadcast::Sender<PositionUpdate>,
    /// Prometheus metrics.
    metrics: Arc<MetricsRegistry>,
    /// Shutdown broadcaster.
    shutdown_tx: broadcast::Sender<()>,
}

impl AdapterSupervisor {
    /// Create a supervisor over the given adapters.
    pub fn new(
        adapters: Vec<Arc<dyn Adapter>>,
        channel_capacity: usize,
        metrics: Arc<MetricsRegistry>,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Self {
        let (update_tx, _) = broadcast::channel(channel_capacity);

        let health = adapters
            .iter()
            .map(|a| {
                Arc::new(AdapterHealth {
                    name: a.name().to_string(),
                    connected: AtomicBool::new(true),
                    consecutive_errors: AtomicU32::new(0),
                })
            })
            .collect();

        Self {
            adapters,
            health,
            update_tx,
            metrics,
            shutdown_tx,
        }
    }

    /// Get a receiver for all adapter updates.
    pub fn subscribe(&self) -> broadcast::Receiver<PositionUpdate> {
        self.update_tx.subscribe()
    }

    /// Spawn all adapter poll tasks and return join handles.
    ///
    /// Each adapter runs in its own tokio task with independent poll
    /// cadence and backoff. The supervisor coordinates shutdown.
    #[instrument(skip(self))]
    pub fn spawn(&self) -> Vec<tokio::task::JoinHandle<()>> {
        let mut handles = Vec::with_capacity(self.adapters.len());

        for (adapter, health) in self.adapters.iter().zip(&self.health) {
            let adapter = Arc::clone(adapter);
            let health = Arc::clone(health);
            let update_tx = self.update_tx.clone();
            let metrics = Arc::clone(&self.metrics);
            let shutdown_rx = self.shutdown_tx.subscribe();

            handles.push(tokio::spawn(async move {
                run_poll_loop(adapter, health, update_tx, metrics, shutdown_rx).await;
            }));
        }

        info!(adapter_count = handles.len(), "Adapter tasks spawned");
        handles
    }

    /// Check if at least one adapter is polling cleanly (degraded mode OK).
    pub fn is_healthy(&self) -> bool {
        self.health
            .iter()
            .any(|h| h.connected.load(Ordering::Relaxed))
    }

    /// Check if all adapters are polling cleanly (fully operational).
    pub fn is_fully_healthy(&self) -> bool {
        self.health
            .iter()
            .all(|h| h.connected.load(Ordering::Relaxed))
    }
}

/// Single adapter poll loop: tick, poll, publish, back off on failure.
async fn run_poll_loop(
    adapter: Arc<dyn Adapter>,
    health: Arc<AdapterHealth>,
    update_tx: broadcast::Sender<PositionUpdate>,
    metrics: Arc<MetricsRegistry>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let interval = Duration::from_secs(adapter.config().poll_interval_secs);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(
        source = %health.name,
        interval_secs = interval.as_secs(),
        "Poll loop started"
    );

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                info!(source = %health.name, "Poll loop shutting down");
                return;
            }
            _ = ticker.tick() => {}
        }

        let start = Instant::now();
        metrics.polls_total.with_label_values(&[health.name.as_str()]).inc();

        match adapter.poll().await {
            Ok(updates) => {
                metrics
                    .poll_duration_seconds
                    .with_label_values(&[health.name.as_str()])
                    .observe(start.elapsed().as_secs_f64());
                metrics.adapter_up.with_label_values(&[health.name.as_str()]).set(1.0);
                health.connected.store(true, Ordering::Relaxed);
                health.consecutive_errors.store(0, Ordering::Relaxed);

                debug!(
                    source = %health.name,
                    updates = updates.len(),
                    latency_ms = start.elapsed().as_millis(),
                    "Poll succeeded"
                );

                for update in updates {
                    // Send fails only when nobody listens; that is fine.
                    let _ = update_tx.send(update);
                }
            }
            Err(e) => {
                metrics.poll_errors.with_label_values(&[health.name.as_str()]).inc();
                metrics.adapter_up.with_label_values(&[health.name.as_str()]).set(0.0);
                health.connected.store(false, Ordering::Relaxed);
                let errors = health.consecutive_errors.fetch_add(1, Ordering::Relaxed) + 1;

                let backoff = backoff_for(errors);
                warn!(
                    source = %health.name,
                    error = %e,
                    consecutive_errors = errors,
                    backoff_secs = backoff.as_secs(),
                    "Poll failed, backing off"
                );

                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        info!(source = %health.name, "Poll loop shutting down");
                        return;
                    }
                    _ = tokio::time::sleep(backoff) => {}
                }
            }
        }
    }
}

/// Exponential backoff: 1s, 2s, 4s, ... capped at `MAX_BACKOFF`.
fn backoff_for(consecutive_errors: u32) -> Duration {
    let exp = consecutive_errors.saturating_sub(1).min(6);
    let delay = Duration::from_secs(1 << exp);
    delay.min(MAX_BACKOFF)
}
