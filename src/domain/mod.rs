//! Domain layer - Core business logic and models.
//!
//! This module contains the pure domain logic for the ingestion daemon.
//! No external dependencies allowed here (hexagonal architecture inner ring).
//! All types are serializable and testable in isolation.

pub mod filter;
pub mod track;

// Re-export core types for convenience
pub use filter::{Suppression, UpdateFilter};
pub use track::{Position, PositionUpdate, SceneId, SourceId, TrackClass, TrackId};
