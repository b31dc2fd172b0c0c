//! Ingest Engine - Core Validation and Publication Loop
//!
//! The main use case: consumes every update the adapter supervisor
//! broadcasts, validates and debounces it through the domain filter,
//! records admitted updates in the track log, and re-broadcasts them
//! for downstream consumers.
//!
//! Event-driven architecture: reacts to adapter output as it arrives,
//! and picks up debounce-threshold changes from the config watch
//! channel without a restart.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::config::AppConfig;
use crate::domain::filter::UpdateFilter;
use crate::domain::track::PositionUpdate;
use crate::ports::sink::UpdateSink;

/// Ingest engine orchestrating the validate → persist → publish loop.
pub struct IngestEngine<K: UpdateSink> {
    /// Track persistence sink.
    sink: Arc<K>,
    /// Debounce and validity filter.
    filter: UpdateFilter,
    /// Updates arriving from the adapter supervisor.
    update_rx: broadcast::Receiver<PositionUpdate>,
    /// Admitted updates re-broadcast to downstream consumers.
    publish_tx: broadcast::Sender<PositionUpdate>,
    /// Prometheus metrics.
    metrics: Arc<MetricsRegistry>,
    /// Live configuration (hot-reloaded thresholds).
    config_rx: watch::Receiver<AppConfig>,
    /// Dry-run mode: admit and publish, but never write the track log.
    dry_run: bool,
    /// Whether the config watch sender is still alive.
    config_alive: bool,
    /// Shutdown signal receiver.
    shutdown_rx: broadcast::Receiver<()>,
}

impl<K: UpdateSink> IngestEngine<K> {
    /// Create a new ingest engine.
    pub fn new(
        sink: Arc<K>,
        update_rx: broadcast::Receiver<PositionUpdate>,
        metrics: Arc<MetricsRegistry>,
        config_rx: watch::Receiver<AppConfig>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        let config = config_rx.borrow().clone();
        let filter = UpdateFilter::new(
            config.ingest.min_move_deg,
            config.ingest.min_interval_ms,
        );
        let (publish_tx, _) = broadcast::channel(config.ingest.channel_capacity);

        Self {
            sink,
            filter,
            update_rx,
            publish_tx,
            metrics,
            config_rx,
            dry_run: config.service.dry_run,
            config_alive: true,
            shutdown_rx,
        }
    }

    /// Get a receiver for admitted updates.
    pub fn subscribe(&self) -> broadcast::Receiver<PositionUpdate> {
        self.publish_tx.subscribe()
    }

    /// Run the main event loop.
    ///
    /// Processes adapter updates as they arrive. Exits on shutdown
    /// signal.
    #[instrument(skip(self), name = "ingest_loop")]
    pub async fn run(&mut self) -> Result<()> {
        info!(dry_run = self.dry_run, "Ingest engine started");

        if self.dry_run {
            warn!("Dry-run mode: updates admitted but NOT written to the track log");
        }

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping engine");
                    break;
                }
                changed = self.config_rx.changed(), if self.config_alive => {
                    match changed {
                        Ok(()) => self.apply_config(),
                        Err(_) => self.config_alive = false,
                    }
                }
                update = self.update_rx.recv() => {
                    match update {
                        Ok(update) => {
                            if let Err(e) = self.process_update(update).await {
                                warn!(error = %e, "Error processing update");
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Engine lagged behind adapter output");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            info!("Adapter channel closed, stopping engine");
                            break;
                        }
                    }
                }
            }
        }

        info!("Engine stopped cleanly");
        Ok(())
    }

    /// Pull fresh thresholds out of the watch channel.
    fn apply_config(&mut self) {
        let config = self.config_rx.borrow().clone();
        self.filter.set_thresholds(
            config.ingest.min_move_deg,
            config.ingest.min_interval_ms,
        );
        self.dry_run = config.service.dry_run;
        info!(
            min_move_deg = config.ingest.min_move_deg,
            min_interval_ms = config.ingest.min_interval_ms,
            dry_run = self.dry_run,
            "Applied reloaded config"
        );
    }

    /// Process a single update: filter, persist, re-broadcast.
    #[instrument(skip(self, update), fields(source = %update.source, track = %update.track_id))]
    async fn process_update(&mut self, update: PositionUpdate) -> Result<()> {
        if let Err(reason) = self.filter.check(&update) {
            self.metrics
                .updates_suppressed
                .with_label_values(&[update.source.as_str(), reason.as_str()])
                .inc();
            debug!(reason = reason.as_str(), "Update suppressed");
            return Ok(());
        }

        // Persist before committing filter state: a failed write must not
        // debounce the retried observation.
        if !self.dry_run {
            self.sink.record_update(&update).await?;
        }
        self.filter.record(&update);

        let class = update.class.to_string();
        self.metrics
            .updates_admitted
            .with_label_values(&[update.source.as_str(), class.as_str()])
            .inc();

        debug!(
            class = %update.class,
            position = %update.position,
            "Update admitted"
        );

        // Send fails only when nobody listens downstream; that is fine.
        let _ = self.publish_tx.send(update);

        Ok(())
    }
}
