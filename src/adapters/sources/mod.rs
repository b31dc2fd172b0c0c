//! Imagery Source Adapters - Scene Metadata Providers
//!
//! Implements the `ImagerySource` port:
//! - `HttpImagerySource`: scene listings from a remote endpoint
//! - `FixtureImagerySource`: scene listings from a local JSONL file,
//!   for replay and dry-run operation

pub mod fixture;
pub mod http;

pub use fixture::FixtureImagerySource;
pub use http::HttpImagerySource;
