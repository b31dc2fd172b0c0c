//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::{AppConfig, SourceKind};

/// Load and validate configuration from a TOML file.
///
/// # Arguments
/// * `path` - Path to the config.toml file
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig> {
  let path = path.as_ref();

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config: AppConfig = toml::from_str(&content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  info!(
    sources = config.sources.len(),
    min_move_deg = config.ingest.min_move_deg,
    min_interval_ms = config.ingest.min_interval_ms,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty, unique source definitions
/// - Each osint source carrying exactly one scene origin
/// - Positive intervals and capacities
/// - Sensible debounce thresholds
fn validate_config(config: &AppConfig) -> Result<()> {
  // Source validation
  anyhow::ensure!(
    !config.sources.is_empty(),
    "At least one source must be configured"
  );

  let mut names = HashSet::new();
  for (i, source) in config.sources.iter().enumerate() {
    anyhow::ensure!(
      !source.name.is_empty(),
      "Source {} has empty name",
      i
    );
    anyhow::ensure!(
      names.insert(source.name.as_str()),
      "Duplicate source name: {}",
      source.name
    );
    anyhow::ensure!(
      source.poll_interval_secs > 0,
      "Source {} ({}) poll_interval_secs must be positive",
      i,
      source.name
    );

    if source.kind == SourceKind::Osint {
      anyhow::ensure!(
        source.endpoint.is_some() != source.fixture_path.is_some(),
        "Osint source {} must set exactly one of endpoint or fixture_path",
        source.name
      );
    }
  }

  // Ingest validation
  anyhow::ensure!(
    config.ingest.channel_capacity > 0,
    "ingest.channel_capacity must be positive"
  );
  anyhow::ensure!(
    config.ingest.min_move_deg >= 0.0 && config.ingest.min_move_deg.is_finite(),
    "ingest.min_move_deg must be finite and >= 0, got {}",
    config.ingest.min_move_deg
  );

  // API validation (only binding when an HTTP-backed source exists)
  let has_http_source = config
    .sources
    .iter()
    .any(|s| s.kind == SourceKind::Osint && s.endpoint.is_some());
  if has_http_source {
    anyhow::ensure!(
      !config.api.base_url.is_empty(),
      "api.base_url must not be empty when an HTTP source is configured"
    );
    anyhow::ensure!(
      config.api.timeout_ms > 0,
      "api.timeout_ms must be positive"
    );
    anyhow::ensure!(
      config.api.max_concurrent > 0,
      "api.max_concurrent must be positive"
    );
  }

  // Metrics validation
  if config.metrics.enabled {
    anyhow::ensure!(
      !config.metrics.bind_address.is_empty(),
      "metrics.bind_address must not be empty"
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_parse_minimal_config() {
    let toml_str = r#"
      [service]
      name = "semper-fi"

      [[sources]]
      name = "sim-1"
      kind = "sim"
    "#;

    let config: AppConfig = toml::from_str(toml_str).unwrap();
    validate_config(&config).unwrap();
    assert_eq!(config.sources.len(), 1);
    assert!(config.sources[0].active);
    assert_eq!(config.sources[0].poll_interval_secs, 60);
    assert_eq!(config.ingest.channel_capacity, 4096);
  }

  #[test]
  fn test_duplicate_source_names_rejected() {
    let toml_str = r#"
      [service]
      name = "semper-fi"

      [[sources]]
      name = "a"
      kind = "sim"

      [[sources]]
      name = "a"
      kind = "sim"
    "#;

    let config: AppConfig = toml::from_str(toml_str).unwrap();
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_osint_source_requires_one_origin() {
    let toml_str = r#"
      [service]
      name = "semper-fi"

      [[sources]]
      name = "eyes"
      kind = "osint"
    "#;

    let config: AppConfig = toml::from_str(toml_str).unwrap();
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_osint_fixture_source_valid() {
    let toml_str = r#"
      [service]
      name = "semper-fi"

      [[sources]]
      name = "replay"
      kind = "osint"
      fixture_path = "fixtures/scenes.jsonl"
    "#;

    let config: AppConfig = toml::from_str(toml_str).unwrap();
    validate_config(&config).unwrap();
  }
}
