use thiserror::Error;

/// Top-level error type for the `level-api` crate.
///
/// Covers configuration, authentication, transport, upstream API failures,
/// and response decoding. `level-core` attaches item context on top.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// Missing or invalid credential, or a malformed request payload.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ── Authentication ──────────────────────────────────────────────
    /// The API key could not be turned into a request header.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Level rejected the API key (HTTP 401).
    #[error("Invalid API key")]
    InvalidApiKey,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Level API ───────────────────────────────────────────────────
    /// Non-2xx response from the Level API.
    #[error("Level API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A single-record lookup unwrapped to nothing.
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Shorthand for a [`Configuration`](Self::Configuration) error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
