//! Config Hot-Reload — Periodic Re-Read of config.toml
//!
//! Polls config.toml on a fixed cadence instead of using a filesystem
//! watcher, which behaves differently across Linux, macOS, and Docker
//! volume mounts. A changed file is re-parsed, re-validated, and pushed
//! through a `tokio::sync::watch` channel so the ingest engine can pick
//! up new debounce thresholds without a restart.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

use super::AppConfig;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Re-reads config.toml and publishes changed configs on a watch channel.
pub struct ConfigWatcher {
  /// Location of config.toml.
  path: PathBuf,
  /// How often the file is re-read.
  poll_interval: Duration,
  /// Publishes validated configs to subscribers.
  config_tx: watch::Sender<AppConfig>,
  /// Fingerprint of the last file content that produced a broadcast.
  fingerprint: Option<u64>,
}

impl ConfigWatcher {
  /// Build a watcher around an already-loaded config.
  ///
  /// The returned receiver starts out holding `initial_config` and sees
  /// every successful reload after `run` starts.
  pub fn new(
    path: impl Into<PathBuf>,
    initial_config: AppConfig,
  ) -> (Self, watch::Receiver<AppConfig>) {
    let (config_tx, config_rx) = watch::channel(initial_config);
    let watcher = Self {
      path: path.into(),
      poll_interval: DEFAULT_POLL_INTERVAL,
      config_tx,
      fingerprint: None,
    };
    (watcher, config_rx)
  }

  /// Poll the file until shutdown, broadcasting each changed config.
  #[instrument(skip(self, shutdown_rx), fields(path = %self.path.display()))]
  pub async fn run(&mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
    info!(
      interval_secs = self.poll_interval.as_secs(),
      "Config watcher started"
    );

    // The config currently in effect came from this file.
    self.fingerprint = self.read_fingerprint().await;

    let mut ticker = tokio::time::interval(self.poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!("Config watcher shutting down");
          return Ok(());
        }
        _ = ticker.tick() => {
          if let Some(config) = self.poll_once().await {
            if self.config_tx.send(config).is_err() {
              warn!("All config receivers dropped, reload not delivered");
            } else {
              info!("Config reloaded and broadcast");
            }
          }
        }
      }
    }
  }

  /// Re-read the file; returns a config only when the content changed
  /// and parsed cleanly.
  async fn poll_once(&mut self) -> Option<AppConfig> {
    let current = self.read_fingerprint().await;
    if current == self.fingerprint {
      debug!("Config unchanged");
      return None;
    }

    match super::loader::load_config(&self.path) {
      Ok(config) => {
        self.fingerprint = current;
        Some(config)
      }
      Err(e) => {
        // Keep the old fingerprint: a later fix to the same broken
        // content must still trigger a reload attempt.
        warn!(error = %e, "Config changed but failed to load, keeping current");
        None
      }
    }
  }

  /// Hash of the current file content, or `None` if unreadable.
  async fn read_fingerprint(&self) -> Option<u64> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let content = tokio::fs::read_to_string(&self.path).await.ok()?;
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    Some(hasher.finish())
  }
}
