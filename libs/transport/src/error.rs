//! Raw transport failures, prior to classification.
//!
//! The shim never interprets a failure; it records what happened and lets
//! [`crate::classify`] resolve it. Source errors are preserved so the
//! classifier can inspect the underlying I/O condition.

use thiserror::Error;

/// Result type alias for shim operations
pub type ShimResult<T> = Result<T, ShimError>;

/// One raw transport failure.
#[derive(Debug, Error)]
pub enum ShimError {
    /// The request never completed: connection, DNS, TLS or timeout
    /// failure below the HTTP layer.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Target endpoint
        url: String,
        /// Underlying client error, preserved for classification
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status. The decoded body is
    /// kept: legacy servers deliver their structured fault envelopes this
    /// way.
    #[error("endpoint {url} answered status {status}")]
    Status {
        /// Target endpoint
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body, already decoded with the legacy charset
        body: String,
    },

    /// An extra header name or value was not valid HTTP.
    #[error("invalid header '{name}'")]
    Header {
        /// Offending header name
        name: String,
    },
}
