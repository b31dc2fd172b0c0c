//! Persistence Adapters - JSONL Track Logging
//!
//! Implements the `UpdateSink` port with append-only daily JSONL files.
//! No database: each admitted update is one self-contained JSON line,
//! making the log easy to stream, grep, and replay.

pub mod track_log;

pub use track_log::TrackLogger;
