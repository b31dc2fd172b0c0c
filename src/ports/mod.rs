//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `Adapter`: Pollable external data source publishing normalized updates
//! - `ImagerySource`: Scene metadata retrieval seam
//! - `Detector`: Object detection seam over retrieved scenes
//! - `UpdateSink`: Track persistence (JSONL-based)

pub mod adapter;
pub mod detector;
pub mod imagery;
pub mod sink;
