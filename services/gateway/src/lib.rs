//! # EIS Gateway Service - Typed Legacy Operation Surfaces
//!
//! ## Purpose
//!
//! The orchestration layer of the gateway: composes the transport shim, the
//! parameter-order serializer and the envelope classifiers into typed clients
//! for the three legacy endpoint families, with a uniform three-outcome
//! result per call.
//!
//! ## Integration Points
//!
//! - **EIS document storage** ([`DocsStorageClient`]): archive formation
//!   requests by registry number, region or NSI catalog code, plus signature
//!   archive requests.
//! - **Supplier personal cabinet** ([`CabinetClient`]): contract/object
//!   listings, participant info and signed-document retrieval, authorized by
//!   a per-call user token.
//! - **Upload channel** ([`UploadClient`]): signed-packet re-submission and
//!   processing-result polling over the windows-1251 wire dialect.
//!
//! ## Architecture Role
//!
//! ```text
//! caller → [gateway-service] → libs/transport → legacy endpoint
//!              ↓        ↑
//!          libs/codec  libs/types
//! ```
//!
//! Retry policy stays with the caller, guided by
//! [`GatewayError::is_retryable`]. This crate never retries on its own.

pub mod bulk;
pub mod client;
pub mod docs;
pub mod elact;
pub mod error;
pub mod upload;

pub use bulk::bulk;
pub use client::{CallOptions, CallOutcome, SoapClient};
pub use docs::{DocSignatures, DocsStorageClient, FzType, NsiArchive, NsiKind, OrgRegionQuery};
pub use elact::{CabinetClient, ObjectInfo, ParticipantInfo, SignerRecord};
pub use error::{GatewayError, GatewayResult};
pub use upload::UploadClient;
