//! Normalized signed-packet model.
//!
//! Flat description of a packet's files, signatures and signer identities,
//! produced by `codec::packet::parse_packet`. All types implement deep
//! value equality so parser idempotence is directly testable.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Name parts of a signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    /// Family name
    pub last_name: String,
    /// Given name
    pub first_name: String,
    /// Patronymic, when present
    pub middle_name: Option<String>,
}

/// The identified person or entity that produced a signature.
///
/// Exactly one of three mutually exclusive legal-status shapes. Resolution
/// precedence over the raw tags is juridical person, then sole proprietor,
/// then individual person — fixed and relied upon by tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signer {
    /// Officer signing on behalf of a legal entity
    JuridicalPerson {
        /// Tax id of the legal entity
        inn: String,
        /// Position held by the signing officer
        position: String,
        /// Signer name parts
        name: PersonName,
    },
    /// Registered sole proprietor
    SoleProprietor {
        /// Personal tax id
        inn: String,
        /// State registration record
        registration: String,
        /// Signer name parts
        name: PersonName,
    },
    /// Private individual
    IndividualPerson {
        /// Personal tax id
        inn: String,
        /// Signer name parts
        name: PersonName,
    },
}

/// One signature event attached to a file entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningInfo {
    /// Signing timestamp combined from the separate legacy date and time
    /// fields; `None` when either string fails to parse
    pub signed_at: Option<NaiveDateTime>,
    /// Authority area descriptor
    pub authority_area: String,
    /// Legal basis of the signing authority
    pub authority_foundation: String,
    /// Signature status code
    pub status: String,
    /// Detached signature payload
    pub signature: String,
    /// Resolved signer identity; absent for unattributed signing events
    pub signer: Option<Signer>,
}

/// Kind tag of a normalized file entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// Primary document slot
    Document,
    /// Appendix slot
    Appendix,
    /// Attachment slot
    Attachment,
}

/// Where a file entry's bytes live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileContent {
    /// Inline base64 content, handed off opaque
    Inline {
        /// Base64 payload
        data: String,
    },
    /// Downloadable link
    Url {
        /// Link as provided by the packet
        url: String,
    },
    /// Reference into the legacy object store
    StoreRef {
        /// Content identifier within the store
        content_id: String,
        /// Store discriminator
        store: String,
    },
}

/// One normalized file of the packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Slot the entry came from
    pub kind: FileKind,
    /// Document or content identifier
    pub id: String,
    /// File name, known only for attachments
    pub filename: Option<String>,
    /// Declared size string, when the packet carried one
    pub size: Option<String>,
    /// Content or reference
    pub content: FileContent,
    /// Signing records, normalized to a list
    pub signatures: Vec<SigningInfo>,
}

/// Print form of the packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrintForm {
    /// Link to the rendered form
    Url {
        /// Form location
        url: String,
    },
    /// Inline base64 content of the rendered form
    Inline {
        /// Base64 payload
        data: String,
    },
}

/// The normalized document bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedPacket {
    /// Transport packet identifier
    pub packet_id: String,
    /// File identifier
    pub file_id: String,
    /// Caller-assigned external identifier
    pub external_id: Option<String>,
    /// Packet formation timestamp, as the wire string
    pub formed_at: String,
    /// Sending system code
    pub sender_system: Option<String>,
    /// Receiving system code
    pub receiver_system: Option<String>,
    /// Sender participant identifier
    pub sender_id: String,
    /// Receiver participant identifier
    pub receiver_id: String,
    /// Registry number of the associated contract
    pub contract_reg_num: Option<String>,
    /// Exchange format version
    pub form_version: String,
    /// Print form, when present
    pub print_form: Option<PrintForm>,
    /// Files in slot order: document, appendix, attachments
    pub files: Vec<FileEntry>,
}
