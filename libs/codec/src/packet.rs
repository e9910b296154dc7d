//! Signed-document packet normalization.
//!
//! Flattens the recursive `ФайлПакет` tree into a [`SignedPacket`]: files
//! in slot order (document, appendix, attachments), signing records
//! normalized to lists, the separate legacy date and time attributes
//! combined into one timestamp, and the polymorphic signer tags resolved
//! into the [`Signer`] union.
//!
//! Signer tag precedence is fixed: juridical person (`ЮЛ`), then sole
//! proprietor (`ИП`), then individual person (`ФЛ`). A record carrying
//! more than one tag violates the schema; the upstream source is known to
//! be permissive here, so the first match wins and the anomaly is logged
//! as a data-quality signal rather than raised.
//!
//! Input is treated as read-only: parsing the same tree twice yields
//! structurally identical output.

use serde_json::Value;
use tracing::warn;
use types::packet::raw::{
    OneOrMany, RawAttachment, RawFilePacket, RawPersonName, RawSigning,
};
use types::{
    FileContent, FileEntry, FileKind, PersonName, PrintForm, SignedPacket, Signer, SigningInfo,
};

use crate::date::combine_date_time;
use crate::error::{CodecError, CodecResult};

/// Normalize a decoded packet tree.
pub fn parse_packet(packet: &RawFilePacket) -> SignedPacket {
    let attrs = &packet.attributes;
    let packet_id = attrs.packet_id.as_str();

    let print_form = packet
        .print_form
        .as_ref()
        .and_then(|form| match (&form.link, &form.content) {
            (Some(url), _) => Some(PrintForm::Url { url: url.clone() }),
            (None, Some(data)) => Some(PrintForm::Inline { data: data.clone() }),
            (None, None) => None,
        });

    let mut files = Vec::new();
    if let Some(document) = &packet.document {
        files.push(FileEntry {
            kind: FileKind::Document,
            id: document.attributes.document_id.clone(),
            filename: None,
            size: None,
            content: FileContent::Inline {
                data: document.content.clone(),
            },
            signatures: parse_signings(&document.signatures, packet_id),
        });
    }
    if let Some(appendix) = &packet.appendix {
        files.push(FileEntry {
            kind: FileKind::Appendix,
            id: appendix.attributes.document_id.clone(),
            filename: None,
            size: None,
            content: FileContent::Inline {
                data: appendix.content.clone(),
            },
            signatures: parse_signings(&appendix.signatures, packet_id),
        });
    }
    if let Some(attachments) = &packet.attachments {
        for attachment in attachments.clone().into_vec() {
            files.push(parse_attachment(&attachment, packet_id));
        }
    }

    SignedPacket {
        packet_id: attrs.packet_id.clone(),
        file_id: attrs.file_id.clone(),
        external_id: attrs.external_id.clone(),
        formed_at: attrs.formed_at.clone(),
        sender_system: attrs.sender_system.clone(),
        receiver_system: attrs.receiver_system.clone(),
        sender_id: attrs.sender_id.clone(),
        receiver_id: attrs.receiver_id.clone(),
        contract_reg_num: attrs.contract_reg_num.clone(),
        form_version: attrs.form_version.clone(),
        print_form,
        files,
    }
}

/// Decode a value tree into the raw packet shape, then normalize it.
///
/// Convenience for callers holding the generic tree the response decoder
/// produced. Shape mismatches surface as [`CodecError::MalformedPacket`].
pub fn parse_packet_value(value: &Value) -> CodecResult<SignedPacket> {
    let raw: RawFilePacket =
        serde_json::from_value(value.clone()).map_err(|err| CodecError::MalformedPacket {
            message: err.to_string(),
        })?;
    Ok(parse_packet(&raw))
}

fn parse_attachment(attachment: &RawAttachment, packet_id: &str) -> FileEntry {
    let attrs = &attachment.attributes;
    // Content resolution order: link element, link attribute, store
    // reference, inline base64.
    let content = if let Some(url) = attachment.link.as_ref().or(attrs.link.as_ref()) {
        FileContent::Url { url: url.clone() }
    } else if let Some(store_ref) = &attachment.store_ref {
        FileContent::StoreRef {
            content_id: store_ref.content_id.clone(),
            store: store_ref.store.clone(),
        }
    } else if let Some(data) = &attachment.inline {
        FileContent::Inline { data: data.clone() }
    } else {
        warn!(packet_id, filename = %attrs.filename, "attachment carries no content position");
        FileContent::Inline {
            data: String::new(),
        }
    };

    let id = attrs
        .content_id
        .clone()
        .or_else(|| attrs.external_content_id.clone())
        .unwrap_or_else(|| attrs.filename.clone());

    FileEntry {
        kind: FileKind::Attachment,
        id,
        filename: Some(attrs.filename.clone()),
        size: attrs.size.clone(),
        content,
        signatures: parse_signings(&attachment.signatures, packet_id),
    }
}

fn parse_signings(signatures: &OneOrMany<RawSigning>, packet_id: &str) -> Vec<SigningInfo> {
    signatures
        .clone()
        .into_vec()
        .iter()
        .map(|record| parse_signing(record, packet_id))
        .collect()
}

fn parse_signing(record: &RawSigning, packet_id: &str) -> SigningInfo {
    let attrs = &record.attributes;
    SigningInfo {
        signed_at: combine_date_time(&attrs.signed_date, &attrs.signed_time),
        authority_area: attrs.authority_area.clone(),
        authority_foundation: attrs.authority_foundation.clone(),
        status: attrs.status.clone(),
        signature: record.signature.clone(),
        signer: resolve_signer(record, packet_id),
    }
}

/// Resolve the signer union, ЮЛ → ИП → ФЛ precedence.
fn resolve_signer(record: &RawSigning, packet_id: &str) -> Option<Signer> {
    let tag_count = [
        record.juridical_person.is_some(),
        record.sole_proprietor.is_some(),
        record.individual_person.is_some(),
    ]
    .iter()
    .filter(|present| **present)
    .count();
    if tag_count > 1 {
        warn!(
            packet_id,
            tag_count, "signing record carries multiple signer tags; applying fixed precedence"
        );
    }

    if let Some(person) = &record.juridical_person {
        return Some(Signer::JuridicalPerson {
            inn: person.attributes.inn.clone(),
            position: person.attributes.position.clone(),
            name: convert_name(&person.name),
        });
    }
    if let Some(person) = &record.sole_proprietor {
        return Some(Signer::SoleProprietor {
            inn: person.attributes.inn.clone(),
            registration: person.attributes.registration.clone(),
            name: convert_name(&person.name),
        });
    }
    if let Some(person) = &record.individual_person {
        return Some(Signer::IndividualPerson {
            inn: person.attributes.inn.clone(),
            name: convert_name(&person.name),
        });
    }
    // Some signing events are unattributed; not an error.
    None
}

fn convert_name(name: &RawPersonName) -> PersonName {
    PersonName {
        last_name: name.last_name.clone(),
        first_name: name.first_name.clone(),
        middle_name: name.middle_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use serde_json::json;

    fn signing(extra: Value) -> Value {
        let mut base = json!({
            "attributes": {
                "ВремПодписан": "10.30.00",
                "ДатаПодписан": "01.02.2024",
                "ОблПолн": "1",
                "ОснПолн": "Устав",
                "Статус": "1"
            },
            "Подпись": "c2lnbmF0dXJl"
        });
        if let (Some(target), Some(source)) = (base.as_object_mut(), extra.as_object()) {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }
        base
    }

    fn juridical_tag() -> Value {
        json!({
            "ЮЛ": {
                "attributes": { "Должн": "Директор", "ИННЮЛ": "7701234567" },
                "ФИО": { "Фамилия": "Иванов", "Имя": "Иван", "Отчество": "Иванович" }
            }
        })
    }

    fn proprietor_tag() -> Value {
        json!({
            "ИП": {
                "attributes": { "СвГосРегИП": "304770000000011", "ИННФЛ": "770100000001" },
                "ФИО": { "Фамилия": "Петров", "Имя": "Пётр" }
            }
        })
    }

    fn packet_value(attachments: Value) -> Value {
        json!({
            "attributes": {
                "ИдТрПакет": "packet-1",
                "ИдФайл": "file-1",
                "ДатаВрФормир": "2024-02-01T10:30:00",
                "ВерсФорм": "1.19",
                "ИдОтпр": "sender",
                "ИдПол": "receiver",
                "СистОтпр": "LKP",
                "СистПол": "RK",
                "РеестрНомКонт": "1234567890123456789"
            },
            "Документ": {
                "attributes": { "ДокументИд": "doc-1" },
                "Контент": "ZG9j",
                "ПодписьДокумент": signing(juridical_tag())
            },
            "Вложен": attachments,
            "ПечатнФорм": { "Ссылка": "http://forms.example/1" }
        })
    }

    fn parse(value: &Value) -> SignedPacket {
        parse_packet_value(value).unwrap()
    }

    #[test]
    fn single_attachment_normalizes_to_one_entry() {
        // A bare (non-list) attachment node yields exactly one
        // attachment entry.
        let value = packet_value(json!({
            "attributes": { "КонтентИд": "att-1", "ИмяФайл": "act.pdf" },
            "Контент": "YXR0",
            "ПодписьВлож": signing(json!({}))
        }));
        let packet = parse(&value);
        let attachments: Vec<_> = packet
            .files
            .iter()
            .filter(|entry| entry.kind == FileKind::Attachment)
            .collect();
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].filename.as_deref(), Some("act.pdf"));
        assert_eq!(
            attachments[0].content,
            FileContent::Inline { data: "YXR0".into() }
        );
    }

    #[test]
    fn attachment_list_preserves_order() {
        let value = packet_value(json!([
            {
                "attributes": { "КонтентИд": "att-1", "ИмяФайл": "a.pdf", "Ссылка": "http://files/a" },
                "ПодписьВлож": signing(json!({}))
            },
            {
                "attributes": { "ИмяФайл": "b.pdf" },
                "ОтносКонтента": { "КонтентИд": "store-2", "ТипФХ": "ЛКП" },
                "ПодписьВлож": signing(json!({}))
            }
        ]));
        let packet = parse(&value);
        assert_eq!(packet.files[0].kind, FileKind::Document);
        assert_eq!(
            packet.files[1].content,
            FileContent::Url { url: "http://files/a".into() }
        );
        assert_eq!(
            packet.files[2].content,
            FileContent::StoreRef { content_id: "store-2".into(), store: "ЛКП".into() }
        );
        // No content-id attribute on the second slot: id falls back to
        // the filename.
        assert_eq!(packet.files[2].id, "b.pdf");
    }

    #[test]
    fn parse_is_idempotent_over_read_only_input() {
        let value = packet_value(json!({
            "attributes": { "ИмяФайл": "x.xml" },
            "Контент": "eA==",
            "ПодписьВлож": [signing(juridical_tag()), signing(proprietor_tag())]
        }));
        let first = parse(&value);
        let second = parse(&value);
        assert_eq!(first, second);
    }

    #[test]
    fn signer_precedence_prefers_juridical_person() {
        // Malformed multi-tag record: the juridical-person interpretation
        // wins deterministically.
        let mut tags = juridical_tag();
        if let (Some(target), Some(source)) = (tags.as_object_mut(), proprietor_tag().as_object())
        {
            for (key, value) in source {
                target.insert(key.clone(), value.clone());
            }
        }
        let record: RawSigning = serde_json::from_value(signing(tags)).unwrap();
        let signer = resolve_signer(&record, "packet-1").unwrap();
        assert!(matches!(signer, Signer::JuridicalPerson { ref inn, .. } if inn == "7701234567"));
    }

    #[test]
    fn unattributed_record_has_no_signer() {
        let record: RawSigning = serde_json::from_value(signing(json!({}))).unwrap();
        assert_eq!(resolve_signer(&record, "packet-1"), None);
    }

    #[test]
    fn signing_timestamp_combines_date_and_time() {
        let value = packet_value(json!([]));
        let packet = parse(&value);
        let expected: NaiveDateTime = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(packet.files[0].signatures[0].signed_at, Some(expected));
    }

    #[test]
    fn print_form_link_classifies_as_url() {
        let packet = parse(&packet_value(json!([])));
        assert_eq!(
            packet.print_form,
            Some(PrintForm::Url { url: "http://forms.example/1".into() })
        );
    }

    #[test]
    fn metadata_copied_from_packet_attributes() {
        let packet = parse(&packet_value(json!([])));
        assert_eq!(packet.packet_id, "packet-1");
        assert_eq!(packet.sender_system.as_deref(), Some("LKP"));
        assert_eq!(packet.contract_reg_num.as_deref(), Some("1234567890123456789"));
        assert_eq!(packet.form_version, "1.19");
    }

    #[test]
    fn shape_mismatch_is_a_malformed_packet_error() {
        let err = parse_packet_value(&json!({ "attributes": {} })).unwrap_err();
        assert!(matches!(err, CodecError::MalformedPacket { .. }));
    }
}
