//! Decoded-response envelope shapes.
//!
//! Every legacy endpoint wraps its payload in one of three mutually
//! exclusive outer shapes: a "no data" sentinel, a business-error
//! descriptor, or the payload itself. `Envelope` is the closed union the
//! classifier in `codec` resolves a decoded response into; exactly one
//! variant holds per exchange.

use serde::{Deserialize, Serialize};

/// Business-error descriptor embedded in a legacy response payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Legacy-side numeric error code (HTTP-like, e.g. 404)
    pub code: i64,
    /// Human-readable message as provided by the legacy server
    pub message: String,
}

/// Classified outcome of one decoded legacy response.
///
/// The classifier guarantees mutual exclusivity: a decoded payload matches
/// exactly one of the three variants. `Empty` is never an error at this
/// layer; callers decide whether absence of data is exceptional.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    /// Payload present and well-formed
    Success(T),
    /// Well-formed "no data" sentinel (or a null payload)
    Empty,
    /// Payload carries a legacy business-error descriptor
    BusinessError {
        /// Legacy-side numeric error code
        code: i64,
        /// Legacy-side error message
        message: String,
    },
}

impl<T> Envelope<T> {
    /// True when the response carried usable payload data.
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    /// True when the response was the well-formed "no data" sentinel.
    pub fn is_empty(&self) -> bool {
        matches!(self, Envelope::Empty)
    }

    /// Payload, if any; `Empty` and `BusinessError` yield `None`.
    pub fn into_success(self) -> Option<T> {
        match self {
            Envelope::Success(data) => Some(data),
            Envelope::Empty | Envelope::BusinessError { .. } => None,
        }
    }

    /// Map the payload type, preserving the variant.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Envelope<U> {
        match self {
            Envelope::Success(data) => Envelope::Success(f(data)),
            Envelope::Empty => Envelope::Empty,
            Envelope::BusinessError { code, message } => Envelope::BusinessError { code, message },
        }
    }
}
