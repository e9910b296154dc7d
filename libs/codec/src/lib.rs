//! # EIS Gateway Codec - Legacy Protocol Rules
//!
//! ## Purpose
//!
//! This crate contains the "Rules" layer of the gateway: everything that
//! interprets or produces legacy wire shapes without touching the network.
//! - Parameter-order serialization against the static per-operation table
//! - Response envelope classification into a closed success/empty/error set
//! - Recursive signed-packet normalization with fixed signer precedence
//! - XML ⇄ value-tree conversion for the legacy SOAP bodies
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → [codec] → libs/transport
//!     ↑           ↓           ↓
//! Pure Data   Wire Rules   Round Trips
//! ```
//!
//! ## What This Crate Does NOT Contain
//! - Network transport logic (belongs in `transport`)
//! - Raw data structure definitions (belong in `types`)
//! - Retry or timeout policy (belongs to callers)
//!
//! Every function here is synchronous, holds no state across calls, and is
//! exhaustively testable from literal payload shapes.

pub mod date;
pub mod envelope;
pub mod error;
pub mod order;
pub mod packet;
pub mod xml;

pub use envelope::classify;
pub use error::{CodecError, CodecResult};
pub use order::{order_parameters, OrderedNode, OrderedValue};
pub use packet::{parse_packet, parse_packet_value};
pub use xml::{escape_xml, node_to_xml, xml_to_value};
