//! Upload-channel operations.
//!
//! The only endpoint family that exercises the full shim option set:
//! bodies go out transcoded to windows-1251 with the request wrapper tag
//! stripped, and responses come back without a root element the parser
//! could anchor on, so one is injected.
//!
//! `receiveFile` re-submits a signed packet previously downloaded from the
//! storage, verbatim except for the schema-location attribute the storage
//! stamps on the root element, which the upload endpoint rejects. The
//! packet XML is therefore spliced into the request as text, never
//! re-serialized through a value tree.

use chrono::{SecondsFormat, Utc};
use codec::{escape_xml, CodecError};
use serde_json::Value;
use transport::LegacyCharset;
use uuid::Uuid;

use gateway_config::EndpointConfig;

use crate::client::{CallOptions, SoapClient};
use crate::error::{GatewayError, GatewayResult};

/// Exchange format version the endpoint currently accepts.
const FORM_VERSION: &str = "1.19";
/// Sender system code for the supplier cabinet channel.
const SENDER_SYSTEM: &str = "LKP";
/// Receiver system code for the acceptance registry.
const RECEIVER_SYSTEM: &str = "RK";

/// Client for the signed-packet upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadClient {
    client: SoapClient,
}

impl UploadClient {
    /// Client over the configured upload endpoint.
    pub fn new(config: &EndpointConfig) -> Self {
        Self {
            client: SoapClient::new(config.endpoint.clone(), config.timeout()),
        }
    }

    /// Submit a downloaded signed packet for processing.
    ///
    /// `packet_xml` is the packet document already decoded to UTF-8. The
    /// result payload carries the transport packet id used for
    /// [`UploadClient::get_processing_result`] polling.
    pub async fn receive_file(&self, packet_xml: &str, usertoken: &str) -> GatewayResult<Value> {
        let payload = prepare_packet_payload(packet_xml)?;
        let options = CallOptions {
            charset: Some(LegacyCharset::Windows1251),
            strip_tag: Some("receiveFileRequest".to_string()),
            inject_response_tag: Some("resultResponse".to_string()),
            ..CallOptions::default()
        }
        .header("Content-Type", "text/xml;charset=windows-1251")
        .header("Connection", "keep-alive")
        .header("usertoken", usertoken);

        self.client
            .call_raw("receiveFileRequest", &payload, options)
            .await?
            .into_data()?
            .ok_or(GatewayError::EmptyResponse)
    }

    /// Poll the processing result of a previously submitted packet.
    ///
    /// A fresh request-file id is generated unless the caller needs to
    /// repeat an identical request.
    pub async fn get_processing_result(
        &self,
        packet_id: &str,
        file_id: Option<&str>,
        usertoken: &str,
    ) -> GatewayResult<Value> {
        let file_id = match file_id {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().to_string(),
        };
        let formed_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let body = result_request_xml(&file_id, packet_id, &formed_at);

        let options = CallOptions {
            charset: Some(LegacyCharset::Windows1251),
            strip_tag: Some("getProcessingResultRequest".to_string()),
            inject_response_tag: Some("resultResponse".to_string()),
            ..CallOptions::default()
        }
        .header("Content-Type", "text/xml;charset=windows-1251")
        .header("usertoken", usertoken);

        self.client
            .call_raw("getProcessingResultRequest", &body, options)
            .await?
            .into_data()?
            .ok_or(GatewayError::EmptyResponse)
    }
}

/// Extract the packet root element from a downloaded document and drop the
/// schema-location attribute. The prolog and anything around the root are
/// discarded; element order inside the packet is preserved byte for byte.
fn prepare_packet_payload(packet_xml: &str) -> GatewayResult<String> {
    let open = "<ФайлПакет";
    let close = "</ФайлПакет>";
    let start = packet_xml.find(open).ok_or_else(|| {
        GatewayError::Codec(CodecError::MalformedPacket {
            message: "packet root element not found".to_string(),
        })
    })?;
    let end = packet_xml.rfind(close).ok_or_else(|| {
        GatewayError::Codec(CodecError::MalformedPacket {
            message: "packet root element not closed".to_string(),
        })
    })? + close.len();
    Ok(strip_attribute(
        &packet_xml[start..end],
        "xsi:noNamespaceSchemaLocation",
    ))
}

/// Remove the first `name="value"` attribute occurrence, including the
/// whitespace before it. Absent attribute is a pass-through.
fn strip_attribute(xml: &str, name: &str) -> String {
    let needle = format!("{name}=");
    let Some(pos) = xml.find(&needle) else {
        return xml.to_string();
    };
    let value_start = pos + needle.len();
    let Some(quote) = xml[value_start..]
        .chars()
        .next()
        .filter(|c| *c == '"' || *c == '\'')
    else {
        return xml.to_string();
    };
    let Some(rel_end) = xml[value_start + 1..].find(quote) else {
        return xml.to_string();
    };
    let end = value_start + 1 + rel_end + quote.len_utf8();
    let lead = xml[..pos].trim_end().len();
    format!("{}{}", &xml[..lead], &xml[end..])
}

/// The request-file header for result polling: attribute-carrying elements
/// the ordered-tree serializer cannot express, so the fragment is written
/// directly.
fn result_request_xml(file_id: &str, packet_id: &str, formed_at: &str) -> String {
    format!(
        "<ФайлЗапросРезул ИдФайл=\"{file_id}\" СистОтпр=\"{sender}\" СистПол=\"{receiver}\" \
         ДатаВрФормир=\"{formed_at}\" ВерсПрог=\"{program}\" ВерсФорм=\"{form}\">\
         <Документ ИдТрПакет=\"{packet_id}\"/>\
         </ФайлЗапросРезул>",
        file_id = escape_xml(file_id),
        sender = SENDER_SYSTEM,
        receiver = RECEIVER_SYSTEM,
        formed_at = escape_xml(formed_at),
        program = env!("CARGO_PKG_VERSION"),
        form = FORM_VERSION,
        packet_id = escape_xml(packet_id),
    )
}
