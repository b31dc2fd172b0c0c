//! Configuration Module - TOML-based Daemon Configuration
//!
//! Loads and validates configuration from `config.toml` with
//! environment variables for credentials only.
//! All endpoints and per-source parameters are externalized here -
//! nothing is hardcoded in the domain layer.

pub mod hot_reload;
pub mod loader;

use serde::Deserialize;

/// Top-level daemon configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the daemon begins polling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
  /// Service identity and metadata.
  pub service: ServiceConfig,
  /// Source definitions, one adapter per entry.
  pub sources: Vec<SourceConfig>,
  /// Imagery API endpoint settings.
  #[serde(default)]
  pub api: ApiConfig,
  /// Ingest pipeline parameters.
  #[serde(default)]
  pub ingest: IngestConfig,
  /// Metrics and health endpoints.
  #[serde(default)]
  pub metrics: MetricsConfig,
  /// Persistence configuration.
  #[serde(default)]
  pub persistence: PersistenceConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Dry-run mode: poll and log, but never write the track log.
  #[serde(default)]
  pub dry_run: bool,
}

/// Kind of adapter a source entry instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
  /// Simulation feed placeholder; polls are no-ops.
  Sim,
  /// OSINT scene provider polled through the imagery/detector ports.
  Osint,
}

/// Individual source configuration.
///
/// Each entry becomes one adapter. The adapter stores this struct
/// unchanged and exposes it via `Adapter::config()`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
  /// Unique source name, used in logs, metrics, and published updates.
  pub name: String,
  /// Which adapter to instantiate.
  pub kind: SourceKind,
  /// Poll cadence in seconds.
  #[serde(default = "default_poll_interval")]
  pub poll_interval_secs: u64,
  /// Whether this source is polled at all.
  #[serde(default = "default_true")]
  pub active: bool,
  /// Scene-listing path on the imagery API (osint + HTTP sources).
  pub endpoint: Option<String>,
  /// Local JSONL scene fixture (osint + replay/dry-run sources).
  pub fixture_path: Option<String>,
}

/// Imagery API endpoint settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the imagery API.
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Request timeout in milliseconds.
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  /// Maximum retries on transient errors.
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
  /// Maximum concurrent requests.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent: usize,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_ms: default_timeout_ms(),
      max_retries: default_max_retries(),
      max_concurrent: default_max_concurrent(),
    }
  }
}

/// Ingest pipeline parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IngestConfig {
  /// Broadcast channel capacity between supervisor and engine.
  #[serde(default = "default_channel_capacity")]
  pub channel_capacity: usize,
  /// Debounce: minimum per-axis movement in degrees.
  #[serde(default = "default_min_move_deg")]
  pub min_move_deg: f64,
  /// Debounce: quiet interval in milliseconds.
  #[serde(default = "default_min_interval_ms")]
  pub min_interval_ms: u64,
}

impl Default for IngestConfig {
  fn default() -> Self {
    Self {
      channel_capacity: default_channel_capacity(),
      min_move_deg: default_min_move_deg(),
      min_interval_ms: default_min_interval_ms(),
    }
  }
}

/// Metrics and health endpoint configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricsConfig {
  /// Whether to serve Prometheus metrics.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Bind address for the /metrics endpoint.
  #[serde(default = "default_metrics_bind")]
  pub bind_address: String,
  /// Port for the /live + /ready health server.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_metrics_bind(),
      health_port: default_health_port(),
    }
  }
}

/// Persistence configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersistenceConfig {
  /// Base directory for track log files.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

impl Default for PersistenceConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
    }
  }
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_poll_interval() -> u64 {
  60
}

fn default_base_url() -> String {
  "https://imagery.invalid".to_string()
}

fn default_timeout_ms() -> u64 {
  10_000
}

fn default_max_retries() -> u32 {
  3
}

fn default_max_concurrent() -> usize {
  4
}

fn default_channel_capacity() -> usize {
  4096
}

fn default_min_move_deg() -> f64 {
  0.0005
}

fn default_min_interval_ms() -> u64 {
  60_000
}

fn default_metrics_bind() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_health_port() -> u16 {
  8080
}

fn default_data_dir() -> String {
  "data".to_string()
}
