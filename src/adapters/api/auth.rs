//! Imagery API Authentication — Bearer Token from Environment
//!
//! Imagery endpoints accept a static API token sent as a bearer header.
//! The token comes from the OSINT_API_KEY environment variable
//! (never from config.toml, which may be committed).

use anyhow::{Context, Result};

/// Imagery API authentication handler.
///
/// Holds the API token loaded from the environment. The token is never
/// logged; `Debug` is intentionally not derived.
pub struct ApiAuth {
    /// Token from OSINT_API_KEY env var.
    token: String,
}

impl ApiAuth {
    /// Load credentials from environment variables.
    ///
    /// Required env var: OSINT_API_KEY. Set it in `.env`
    /// (never committed to git).
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("OSINT_API_KEY")
            .context("OSINT_API_KEY not set")?;

        anyhow::ensure!(!token.is_empty(), "OSINT_API_KEY is empty");

        Ok(Self { token })
    }

    /// Build from an explicit token (tests, alternative credential stores).
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Authorization header value for a request.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
