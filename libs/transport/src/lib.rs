//! # EIS Gateway Transport Shim
//!
//! ## Purpose
//!
//! The one crate performing network I/O: a single request/response
//! exchange per call against a legacy SOAP endpoint, with the byte-level
//! rewriting the endpoints require.
//!
//! - Outgoing bodies are transcoded to the legacy single-byte charset,
//!   with the XML declaration rewritten and the content length recomputed
//!   from the transcoded byte count, never the character count.
//! - A wrapping tag the server rejects can be stripped from the outgoing
//!   body; a wrapping tag the server omits can be injected into the
//!   decoded response.
//! - Response bodies are always decoded as legacy-charset bytes, because
//!   the servers consistently mislabel the charset in their headers.
//!
//! ## What This Crate Does NOT Do
//!
//! No retries (retry policy belongs to the business layer, guided by the
//! `Retryable` classification), no envelope interpretation (that is
//! `codec`), no internal timeouts beyond the per-call configuration.
//!
//! Raw failures surface as [`ShimError`]; [`classify::classify_failure`]
//! resolves each one into exactly one [`types::TransportError`].

pub mod classify;
pub mod error;
pub mod shim;

pub use classify::{classify_failure, fault_from_value};
pub use error::{ShimError, ShimResult};
pub use shim::{LegacyCharset, ShimResponse, SoapTransport, TransportExchange};
