//! Classified transport failures.
//!
//! The transport shim surfaces raw failures; the classification step
//! resolves each one into exactly one of these variants. The `Retryable`
//! tag is advisory output: actual retry count and backoff policy belong to
//! the business layer, never to the adaptation core.

use thiserror::Error;

/// One classified transport-level failure. Lifetime is the single call;
/// never cached.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Transient network failure (connection reset, DNS resolution
    /// failure, generic low-level fault) — safe to retry with backoff at
    /// the business layer.
    #[error("retryable network failure: {reason}")]
    Retryable {
        /// Short description of the underlying condition
        reason: String,
    },

    /// The legacy server returned a structured fault envelope. Not
    /// transient: a symptom of malformed or rejected input.
    #[error("remote fault (status {status}): {message}")]
    RemoteFault {
        /// HTTP-like status carried by the fault, 500 when absent
        status: u16,
        /// Fault code string, when the server provided one
        code: Option<String>,
        /// Fault reason text
        message: String,
        /// Optional fault detail payload, passed through verbatim
        detail: Option<String>,
    },

    /// Anything uncategorized, surfaced as-is.
    #[error("transport failure: {message}")]
    Unknown {
        /// Message of the original failure, preserved
        message: String,
    },
}

impl TransportError {
    /// Whether a higher layer may safely retry the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Retryable { .. })
    }
}
