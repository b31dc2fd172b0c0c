//! Update Sink Port - Track Persistence Interface
//!
//! Defines the trait for persisting admitted position updates using
//! JSONL files. No database dependency - lightweight append-only log
//! format optimized for audit trails and replay.

use async_trait::async_trait;

use crate::domain::track::PositionUpdate;

/// Trait for track persistence providers.
///
/// Uses JSONL (JSON Lines) format for append-only logging. Each line is
/// a self-contained JSON record, making it easy to parse, stream, and
/// recover from partial writes.
#[async_trait]
pub trait UpdateSink: Send + Sync + 'static {
  /// Append one admitted update to the track log.
  async fn record_update(&self, update: &PositionUpdate) -> anyhow::Result<()>;

  /// Load all recorded updates (for recovery/analysis).
  async fn load_updates(&self) -> anyhow::Result<Vec<PositionUpdate>>;

  /// Load updates within a timestamp range (inclusive).
  async fn load_updates_range(
    &self,
    from_ms: u64,
    to_ms: u64,
  ) -> anyhow::Result<Vec<PositionUpdate>>;

  /// Check if the sink is healthy (disk space, permissions).
  async fn is_healthy(&self) -> bool;
}
