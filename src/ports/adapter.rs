//! Adapter Port - Pollable External Data Source Interface
//!
//! Defines the trait every ingestion adapter implements. An adapter is
//! constructed with its configuration slice, stores it unchanged, and
//! exposes a single `poll` operation that retrieves whatever the source
//! currently has and returns it as normalized position updates.

use async_trait::async_trait;

use crate::config::SourceConfig;
use crate::domain::track::PositionUpdate;

/// Trait for pollable ingestion adapters.
///
/// Implementors bridge one external data source (a simulation feed, an
/// OSINT scene provider) to the internal publishing pipeline. The
/// hexagonal architecture ensures the engine never depends on transport
/// details; the supervisor drives `poll` on the configured interval and
/// broadcasts whatever it returns.
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
  /// Stable adapter name for logging and metric labels.
  fn name(&self) -> &str;

  /// The configuration this adapter was constructed with, unchanged.
  fn config(&self) -> &SourceConfig;

  /// Poll the source once.
  ///
  /// Returns the updates produced by this poll, possibly none. A poll
  /// that finds nothing new is `Ok(vec![])`, not an error; `Err` is
  /// reserved for source failures the supervisor should back off on.
  async fn poll(&self) -> anyhow::Result<Vec<PositionUpdate>>;

  /// Check whether the underlying source is reachable.
  async fn is_healthy(&self) -> bool;
}
