//! Raw wire shapes of the `ФайлПакет` signed-document packet.
//!
//! These structs deserialize from the value tree produced by
//! `codec::xml::xml_to_value`: element attributes are collected under an
//! `attributes` key, nested elements keep their legacy Cyrillic names, and
//! positions the schema declares as repeatable may arrive as a single
//! object or as an array (`OneOrMany`).

use serde::{Deserialize, Serialize};

/// A position that may hold one value or a list of values.
///
/// The legacy decoder emits a bare object when exactly one sibling element
/// is present and an array otherwise. Consumers normalize with
/// [`OneOrMany::into_vec`] before iterating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// Already a list in the source tree
    Many(Vec<T>),
    /// A single bare value
    One(T),
}

impl<T> OneOrMany<T> {
    /// Normalize to a list unconditionally.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Top-level attribute set of the packet element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPacketAttributes {
    /// Transport packet identifier
    #[serde(rename = "ИдТрПакет")]
    pub packet_id: String,
    /// Sending system code
    #[serde(rename = "СистОтпр", skip_serializing_if = "Option::is_none")]
    pub sender_system: Option<String>,
    /// Receiving system code
    #[serde(rename = "СистПол", skip_serializing_if = "Option::is_none")]
    pub receiver_system: Option<String>,
    /// Caller-assigned external identifier
    #[serde(rename = "ВнешИд", skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// File identifier
    #[serde(rename = "ИдФайл")]
    pub file_id: String,
    /// Appendix identifier, when the packet carries one
    #[serde(rename = "ИдПрилож", skip_serializing_if = "Option::is_none")]
    pub appendix_id: Option<String>,
    /// Registry number of the associated contract
    #[serde(rename = "РеестрНомКонт", skip_serializing_if = "Option::is_none")]
    pub contract_reg_num: Option<String>,
    /// Packet formation timestamp, as the wire string
    #[serde(rename = "ДатаВрФормир")]
    pub formed_at: String,
    /// Appendix type code
    #[serde(rename = "ТипПрилож", skip_serializing_if = "Option::is_none")]
    pub appendix_type: Option<String>,
    /// Exchange format version
    #[serde(rename = "ВерсФорм")]
    pub form_version: String,
    /// Sender participant identifier
    #[serde(rename = "ИдОтпр")]
    pub sender_id: String,
    /// Receiver participant identifier
    #[serde(rename = "ИдПол")]
    pub receiver_id: String,
}

/// Name triple carried by every signer shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPersonName {
    /// Family name
    #[serde(rename = "Фамилия")]
    pub last_name: String,
    /// Given name
    #[serde(rename = "Имя")]
    pub first_name: String,
    /// Patronymic, optional in the schema
    #[serde(rename = "Отчество", skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
}

/// Attribute set of the juridical-person signer tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawJuridicalAttributes {
    /// Position held by the signing officer
    #[serde(rename = "Должн")]
    pub position: String,
    /// Tax id of the legal entity
    #[serde(rename = "ИННЮЛ")]
    pub inn: String,
    /// Free-form additional information
    #[serde(rename = "ИныеСвед", skip_serializing_if = "Option::is_none")]
    pub other_info: Option<String>,
}

/// Juridical-person signer tag (`ЮЛ`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawJuridicalPerson {
    /// Tag attributes
    pub attributes: RawJuridicalAttributes,
    /// Signer name parts
    #[serde(rename = "ФИО")]
    pub name: RawPersonName,
}

/// Attribute set of the sole-proprietor signer tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntrepreneurAttributes {
    /// State registration record of the proprietorship
    #[serde(rename = "СвГосРегИП")]
    pub registration: String,
    /// Personal tax id
    #[serde(rename = "ИННФЛ")]
    pub inn: String,
    /// Free-form additional information
    #[serde(rename = "ИныеСвед", skip_serializing_if = "Option::is_none")]
    pub other_info: Option<String>,
}

/// Sole-proprietor signer tag (`ИП`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSoleProprietor {
    /// Tag attributes
    pub attributes: RawEntrepreneurAttributes,
    /// Signer name parts
    #[serde(rename = "ФИО")]
    pub name: RawPersonName,
}

/// Attribute set of the individual-person signer tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIndividualAttributes {
    /// Personal tax id
    #[serde(rename = "ИННФЛ")]
    pub inn: String,
    /// Free-form additional information
    #[serde(rename = "ИныеСвед", skip_serializing_if = "Option::is_none")]
    pub other_info: Option<String>,
}

/// Individual-person signer tag (`ФЛ`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIndividualPerson {
    /// Tag attributes
    pub attributes: RawIndividualAttributes,
    /// Signer name parts
    #[serde(rename = "ФИО")]
    pub name: RawPersonName,
}

/// Attribute set of one signing record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSigningAttributes {
    /// Time of signing, `hh.mm.ss`
    #[serde(rename = "ВремПодписан")]
    pub signed_time: String,
    /// Date of signing, `dd.mm.yyyy`
    #[serde(rename = "ДатаПодписан")]
    pub signed_date: String,
    /// Authority area descriptor
    #[serde(rename = "ОблПолн")]
    pub authority_area: String,
    /// Legal basis of the signing authority
    #[serde(rename = "ОснПолн")]
    pub authority_foundation: String,
    /// Signature status code
    #[serde(rename = "Статус")]
    pub status: String,
}

/// One signing record: signature payload plus at most one signer tag.
///
/// The schema declares the three signer tags mutually exclusive. All three
/// are modeled as options here; the parser resolves them in a fixed
/// precedence order and treats a multi-tag record as a data-quality
/// anomaly, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSigning {
    /// Record attributes (date, time, authority, status)
    pub attributes: RawSigningAttributes,
    /// Detached signature payload
    #[serde(rename = "Подпись")]
    pub signature: String,
    /// Juridical-person tag, checked first
    #[serde(rename = "ЮЛ", skip_serializing_if = "Option::is_none")]
    pub juridical_person: Option<RawJuridicalPerson>,
    /// Sole-proprietor tag, checked second
    #[serde(rename = "ИП", skip_serializing_if = "Option::is_none")]
    pub sole_proprietor: Option<RawSoleProprietor>,
    /// Individual-person tag, checked last
    #[serde(rename = "ФЛ", skip_serializing_if = "Option::is_none")]
    pub individual_person: Option<RawIndividualPerson>,
}

/// Identifier attribute of the document and appendix slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocumentAttributes {
    /// Document identifier
    #[serde(rename = "ДокументИд")]
    pub document_id: String,
}

/// Primary document slot (`Документ`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Slot attributes
    pub attributes: RawDocumentAttributes,
    /// Inline base64 content
    #[serde(rename = "Контент")]
    pub content: String,
    /// One or many signing records
    #[serde(rename = "ПодписьДокумент")]
    pub signatures: OneOrMany<RawSigning>,
}

/// Appendix slot (`Прилож`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAppendix {
    /// Slot attributes
    pub attributes: RawDocumentAttributes,
    /// Inline base64 content
    #[serde(rename = "Контент")]
    pub content: String,
    /// One or many signing records
    #[serde(rename = "ПодписьПрилож")]
    pub signatures: OneOrMany<RawSigning>,
}

/// Attribute set of an attachment slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAttachmentAttributes {
    /// Content identifier within the file store
    #[serde(rename = "КонтентИд", skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    /// Externally assigned content identifier
    #[serde(rename = "ВнешКонтентИд", skip_serializing_if = "Option::is_none")]
    pub external_content_id: Option<String>,
    /// Attachment file name
    #[serde(rename = "ИмяФайл")]
    pub filename: String,
    /// Declared file size, as the wire string
    #[serde(rename = "РазмерФайл", skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Download link carried as an attribute
    #[serde(rename = "Ссылка", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Reference into the legacy object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStoreRef {
    /// Content identifier within the store
    #[serde(rename = "КонтентИд")]
    pub content_id: String,
    /// Store discriminator (`ЛКП` or `РК`)
    #[serde(rename = "ТипФХ")]
    pub store: String,
}

/// Attachment slot (`Вложен`), singular or repeated.
///
/// Content arrives in exactly one of three positions: a link element, a
/// store reference, or inline base64. All three are modeled as options;
/// the parser resolves them in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAttachment {
    /// Slot attributes
    pub attributes: RawAttachmentAttributes,
    /// Download link element
    #[serde(rename = "Ссылк", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Object-store reference element
    #[serde(rename = "ОтносКонтента", skip_serializing_if = "Option::is_none")]
    pub store_ref: Option<RawStoreRef>,
    /// Inline base64 content element
    #[serde(rename = "Контент", skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
    /// One or many signing records
    #[serde(rename = "ПодписьВлож")]
    pub signatures: OneOrMany<RawSigning>,
}

/// Print form slot (`ПечатнФорм`): either a link or inline content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrintForm {
    /// Link to the rendered form
    #[serde(rename = "Ссылка", skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Inline base64 content of the rendered form
    #[serde(rename = "Контент", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// The full `ФайлПакет` tree as delivered by the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFilePacket {
    /// Packet attributes
    pub attributes: RawPacketAttributes,
    /// Primary document slot
    #[serde(rename = "Документ", skip_serializing_if = "Option::is_none")]
    pub document: Option<RawDocument>,
    /// Appendix slot
    #[serde(rename = "Прилож", skip_serializing_if = "Option::is_none")]
    pub appendix: Option<RawAppendix>,
    /// Attachment slot, singular or already a list
    #[serde(rename = "Вложен", skip_serializing_if = "Option::is_none")]
    pub attachments: Option<OneOrMany<RawAttachment>>,
    /// Print form slot
    #[serde(rename = "ПечатнФорм", skip_serializing_if = "Option::is_none")]
    pub print_form: Option<RawPrintForm>,
}
