//! Simulation Adapter - No-op Placeholder Feed
//!
//! Stands in for the simulation engine feed so wiring, supervision, and
//! the downstream pipeline can run without a live OSINT source. Stores
//! its configuration unchanged and publishes nothing: every poll is an
//! intentional no-op.

use async_trait::async_trait;
use tracing::trace;

use crate::config::SourceConfig;
use crate::domain::track::PositionUpdate;
use crate::ports::adapter::Adapter;

/// Adapter whose polls always succeed with no updates.
pub struct SimAdapter {
    /// Configuration stored unchanged at construction.
    config: SourceConfig,
}

impl SimAdapter {
    /// Create a sim adapter. Accepts any configuration; never fails.
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Adapter for SimAdapter {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn poll(&self) -> anyhow::Result<Vec<PositionUpdate>> {
        trace!(source = %self.config.name, "Sim poll (no-op)");
        Ok(Vec::new())
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}
