//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, file I/O). Each sub-module
//! groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `api`: Imagery endpoint REST client and auth
//! - `sources`: Scene metadata providers (HTTP, local fixture)
//! - `detect`: Annotation-lifting detector
//! - `sim`: No-op simulation feed placeholder
//! - `osint`: Scene-to-update poll pipeline
//! - `supervisor`: Poll loop lifecycle with backoff and health
//! - `metrics`: Prometheus metrics export and health checks
//! - `persistence`: JSONL track logging

pub mod api;
pub mod detect;
pub mod metrics;
pub mod osint;
pub mod persistence;
pub mod sim;
pub mod sources;
pub mod supervisor;

pub use osint::OsintAdapter;
pub use sim::SimAdapter;
pub use supervisor::AdapterSupervisor;
