//! Track Logger - Append-only JSONL Position Records
//!
//! Persists admitted position updates to daily JSONL files in the
//! format `tracks/YYYY-MM-DD.jsonl`. Each line is a self-contained JSON
//! record for easy parsing, streaming, and crash recovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument, warn};

use crate::domain::track::PositionUpdate;
use crate::ports::sink::UpdateSink;

/// Append-only JSONL track logger with daily file rotation.
///
/// Track files are named `tracks/YYYY-MM-DD.jsonl` and each line is a
/// complete JSON object. This format is optimized for:
/// - Append-only writes (no read-modify-write)
/// - Line-by-line streaming for analysis
/// - Natural daily partitioning
pub struct TrackLogger {
    /// Base directory for track files.
    tracks_dir: PathBuf,
}

impl TrackLogger {
    /// Create a new track logger in the given data directory.
    pub async fn new(data_dir: &str) -> Result<Self> {
        let tracks_dir = Path::new(data_dir).join("tracks");

        fs::create_dir_all(&tracks_dir)
            .await
            .context("Failed to create tracks directory")?;

        Ok(Self { tracks_dir })
    }

    /// Path of today's log file.
    fn today_path(&self) -> PathBuf {
        let date = Utc::now().format("%Y-%m-%d").to_string();
        self.tracks_dir.join(format!("{date}.jsonl"))
    }
}

#[async_trait]
impl UpdateSink for TrackLogger {
    #[instrument(skip(self, update), fields(track_id = %update.track_id))]
    async fn record_update(&self, update: &PositionUpdate) -> Result<()> {
        let path = self.today_path();

        let mut json = serde_json::to_string(update)
            .context("Failed to serialize position update")?;
        json.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .context("Failed to open track log file")?;

        file.write_all(json.as_bytes())
            .await
            .context("Failed to write position update")?;

        file.flush().await.context("Failed to flush track log")?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn load_updates(&self) -> Result<Vec<PositionUpdate>> {
        let mut updates = Vec::new();
        let mut entries = fs::read_dir(&self.tracks_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "jsonl") {
                let content = fs::read_to_string(&path).await?;
                for line in content.lines() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<PositionUpdate>(line) {
                        Ok(update) => updates.push(update),
                        Err(e) => {
                            warn!(
                                file = %path.display(),
                                error = %e,
                                "Skipping malformed track record"
                            );
                        }
                    }
                }
            }
        }

        updates.sort_by_key(|u| u.timestamp_ms);
        info!(count = updates.len(), "Loaded track records");
        Ok(updates)
    }

    async fn load_updates_range(
        &self,
        from_ms: u64,
        to_ms: u64,
    ) -> Result<Vec<PositionUpdate>> {
        let all = self.load_updates().await?;
        Ok(all
            .into_iter()
            .filter(|u| u.timestamp_ms >= from_ms && u.timestamp_ms <= to_ms)
            .collect())
    }

    async fn is_healthy(&self) -> bool {
        let test_path = self.tracks_dir.join(".health_check");
        let result = fs::write(&test_path, b"ok").await;
        let _ = fs::remove_file(&test_path).await;
        result.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::track::{Position, TrackClass};

    fn update_at(ts: u64) -> PositionUpdate {
        let mut u = PositionUpdate::now(
            "osint-1".to_string(),
            TrackClass::Vehicle,
            Position::new(48.85, 2.35),
        );
        u.timestamp_ms = ts;
        u
    }

    #[tokio::test]
    async fn test_record_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let logger = TrackLogger::new(dir.path().to_str().unwrap()).await.unwrap();

        logger.record_update(&update_at(1_000)).await.unwrap();
        logger.record_update(&update_at(2_000)).await.unwrap();

        let loaded = logger.load_updates().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].timestamp_ms, 1_000);
        assert_eq!(loaded[1].timestamp_ms, 2_000);
    }

    #[tokio::test]
    async fn test_range_filter_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let logger = TrackLogger::new(dir.path().to_str().unwrap()).await.unwrap();

        for ts in [100, 200, 300] {
            logger.record_update(&update_at(ts)).await.unwrap();
        }

        let ranged = logger.load_updates_range(100, 200).await.unwrap();
        assert_eq!(ranged.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_lines_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let logger = TrackLogger::new(dir.path().to_str().unwrap()).await.unwrap();
        logger.record_update(&update_at(1_000)).await.unwrap();

        // Corrupt the file with a partial write
        let path = logger.today_path();
        let mut content = tokio::fs::read_to_string(&path).await.unwrap();
        content.push_str("{\"truncated\":");
        tokio::fs::write(&path, content).await.unwrap();

        let loaded = logger.load_updates().await.unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[tokio::test]
    async fn test_health_probe() {
        let dir = tempfile::tempdir().unwrap();
        let logger = TrackLogger::new(dir.path().to_str().unwrap()).await.unwrap();
        assert!(logger.is_healthy().await);
    }
}
