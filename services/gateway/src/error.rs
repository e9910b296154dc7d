//! Gateway-level error taxonomy.
//!
//! Every failure a typed operation can produce collapses into one variant
//! here. Transport and codec failures convert via `From`; the remaining
//! variants are produced by the operation surfaces themselves when they
//! promote an envelope outcome into an error.

use thiserror::Error;
use types::TransportError;

/// Result alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Unified error for the typed operation surfaces.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Classified transport failure: retryable condition, remote fault
    /// or unclassifiable
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Wire-rule failure: unknown operation, malformed XML, malformed packet
    #[error(transparent)]
    Codec(#[from] codec::CodecError),

    /// Application-level error reported inside a well-formed response
    #[error("legacy endpoint error {code}: {message}")]
    Business {
        /// Numeric code copied from the `errorInfo` element
        code: i64,
        /// Human-readable message copied from the `errorInfo` element
        message: String,
    },

    /// Empty result promoted to an error by operations that require data
    #[error("{what} not found")]
    NotFound {
        /// What was requested, for the caller's diagnostics
        what: &'static str,
    },

    /// Response arrived but carried no recognizable operation payload
    #[error("empty response from legacy endpoint")]
    EmptyResponse,

    /// Archive URL returned by the endpoint could not be parsed for
    /// host rewriting
    #[error("cannot rewrite archive url {url}: {message}")]
    InvalidUrl {
        /// The URL as received
        url: String,
        /// Parser diagnostic
        message: String,
    },
}

impl GatewayError {
    /// True when retrying the same call may succeed. Only transient
    /// transport conditions qualify; business errors and faults never do.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Transport(inner) if inner.is_retryable())
    }
}
