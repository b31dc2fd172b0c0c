//! Metrics and Monitoring Adapters
//!
//! Provides Prometheus metrics export and health check endpoints
//! (/live, /ready) via axum. All observability goes through JSON
//! tracing spans plus the registry here.

pub mod health;
pub mod prometheus;

pub use health::{HealthServer, HealthState};
pub use prometheus::MetricsRegistry;
