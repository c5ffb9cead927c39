//! Error types for pitwall-client

use thiserror::Error;

/// Fetch client error type
///
/// HTTP error statuses are not errors at the fetch layer; they come back as
/// responses. `Unauthorized` and `Status` are only produced by helpers that
/// interpret a response body (`get_json`, the readiness loaders).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout, broken body stream
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request could not be built (bad URL, header value with control characters)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Backend rejected the API key (401/403)
    #[error("Unauthorized (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Any other non-success status a caller asked to be treated as failure
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Transport failures are retried unconditionally; nothing else is
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;
