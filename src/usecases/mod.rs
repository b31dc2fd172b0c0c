//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain logic with port interfaces to implement the
//! daemon's core workflow. Each use case is a self-contained business
//! operation.
//!
//! Use cases:
//! - `IngestEngine`: Validate + debounce + persist + re-broadcast loop

pub mod ingest_engine;

pub use ingest_engine::IngestEngine;
