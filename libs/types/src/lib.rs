//! # EIS Gateway Type Library
//!
//! Pure data structures shared by every crate in the gateway workspace.
//!
//! ## Design Philosophy
//!
//! - **Data only**: no network, no parsing rules, no I/O. Wire-shape
//!   deserialization lives here; the logic that interprets those shapes
//!   lives in `codec`.
//! - **Closed unions**: response envelopes, classified transport failures
//!   and signer identities are modeled as exhaustive enums so that every
//!   consumer is forced through a complete `match`. No fourth silent shape
//!   can slip through.
//! - **Legacy fidelity**: raw packet structs mirror the legacy XML element
//!   names (including the Cyrillic tag names) via serde renames, while the
//!   normalized model exposes conventional field names.
//!
//! ## Architecture Role
//!
//! ```text
//! libs/types → libs/codec → libs/transport → services/gateway
//!     ↑            ↓              ↓                ↓
//! Pure Data   Wire Rules     Round Trips     Typed Operations
//! ```

pub mod envelope;
pub mod packet;
pub mod transport;

pub use envelope::{Envelope, ErrorInfo};
pub use packet::model::{
    FileContent, FileEntry, FileKind, PersonName, PrintForm, SignedPacket, Signer, SigningInfo,
};
pub use packet::raw::{
    OneOrMany, RawAppendix, RawAttachment, RawDocument, RawFilePacket, RawPrintForm, RawSigning,
};
pub use transport::TransportError;
