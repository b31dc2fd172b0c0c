//! Imagery API Adapter
//!
//! Implements the HTTP client for talking to a scene-listing imagery
//! endpoint. Handles authentication, timeouts, bounded concurrency,
//! and retry with exponential backoff. The endpoint speaks a generic
//! JSON scene-listing shape; no vendor protocol lives here.
//!
//! Sub-modules:
//! - `auth`: Bearer-token authentication from environment variables
//! - `client`: HTTP client with concurrency limits and retries
//! - `types`: API response type definitions

pub mod auth;
pub mod client;
pub mod types;

pub use auth::ApiAuth;
pub use client::{ImageryClient, ImageryClientConfig};
