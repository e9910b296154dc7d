//! The request orchestrator.
//!
//! [`SoapClient`] owns one endpoint and composes the full call pipeline:
//! serialize the ordered parameter tree into a SOAP envelope, run the
//! transport shim, decode the response into a value tree, promote an
//! embedded fault to a classified transport error, and classify the
//! operation payload into the three-outcome envelope.
//!
//! Exactly one of error / data / empty holds per call. Retry policy stays
//! with the caller.

use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use transport::{LegacyCharset, SoapTransport, TransportExchange};
use types::Envelope;

use crate::error::{GatewayError, GatewayResult};

/// Per-call orchestration options, beyond what the shim itself rewrites.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Transcode the outgoing body to this legacy charset
    pub charset: Option<LegacyCharset>,
    /// Remove this literal wrapping tag from the outgoing body
    pub strip_tag: Option<String>,
    /// Splice this wrapping tag inside the response body markers
    pub inject_response_tag: Option<String>,
    /// Extra headers, passed through verbatim
    pub headers: Vec<(String, String)>,
    /// Classify this child of the response element instead of the
    /// element itself
    pub payload_key: Option<&'static str>,
    /// Override the client's default per-call timeout
    pub timeout: Option<Duration>,
}

impl CallOptions {
    /// Append an extra header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Outcome of one orchestrated call.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    /// Classified operation payload
    pub envelope: Envelope<Value>,
    /// Decoded response text, kept for callers that need the raw body
    pub raw: String,
}

impl CallOutcome {
    /// Collapse the envelope into `Ok(Some(data))` / `Ok(None)` /
    /// `Err(Business)`. The operation surfaces decide what `None` means.
    pub fn into_data(self) -> GatewayResult<Option<Value>> {
        match self.envelope {
            Envelope::Success(data) => Ok(Some(data)),
            Envelope::Empty => Ok(None),
            Envelope::BusinessError { code, message } => {
                Err(GatewayError::Business { code, message })
            }
        }
    }
}

/// One legacy SOAP endpoint plus the transport shim in front of it.
#[derive(Debug, Clone)]
pub struct SoapClient {
    transport: SoapTransport,
    endpoint: String,
    default_timeout: Option<Duration>,
}

impl SoapClient {
    /// Client over a default transport.
    pub fn new(endpoint: impl Into<String>, default_timeout: Option<Duration>) -> Self {
        Self {
            transport: SoapTransport::new(),
            endpoint: endpoint.into(),
            default_timeout,
        }
    }

    /// Client over a preconfigured transport (proxy, TLS options).
    pub fn with_transport(
        transport: SoapTransport,
        endpoint: impl Into<String>,
        default_timeout: Option<Duration>,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            default_timeout,
        }
    }

    /// The configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one operation with an already-ordered parameter tree.
    pub async fn call(
        &self,
        operation: &str,
        params: &codec::OrderedNode,
        options: CallOptions,
    ) -> GatewayResult<CallOutcome> {
        let body = codec::node_to_xml(params)?;
        self.call_raw(operation, &body, options).await
    }

    /// Run one operation whose body elements are already serialized.
    ///
    /// Used by the upload surface, which re-submits downloaded packet XML
    /// verbatim instead of rebuilding it from a parameter tree.
    pub async fn call_raw(
        &self,
        operation: &str,
        body_xml: &str,
        options: CallOptions,
    ) -> GatewayResult<CallOutcome> {
        let envelope_xml = build_envelope(operation, body_xml);

        let mut exchange = TransportExchange::post(&self.endpoint, envelope_xml)
            .timeout(options.timeout.or(self.default_timeout));
        if let Some(charset) = options.charset {
            exchange = exchange.charset(charset);
        }
        if let Some(tag) = options.strip_tag {
            exchange = exchange.strip_tag(tag);
        }
        if let Some(tag) = options.inject_response_tag {
            exchange = exchange.inject_response_tag(tag);
        }
        for (name, value) in options.headers {
            exchange = exchange.header(name, value);
        }

        let response = self
            .transport
            .exchange(exchange)
            .await
            .map_err(|err| GatewayError::Transport(transport::classify_failure(&err)))?;

        let decoded = codec::xml_to_value(&response.body)?;
        // A fault can arrive inside a 200 response; promote it before
        // payload classification.
        if let Some(fault) = transport::fault_from_value(response.status, &decoded) {
            return Err(GatewayError::Transport(fault));
        }

        let payload = response_payload(&decoded, operation, options.payload_key);
        let envelope = codec::classify(payload);
        debug!(
            operation,
            empty = envelope.is_empty(),
            "legacy call classified"
        );
        Ok(CallOutcome {
            envelope,
            raw: response.body,
        })
    }
}

/// Wrap serialized body elements in the operation element and a SOAP 1.1
/// envelope. The endpoints ignore the envelope namespace prefix on requests
/// but require the declaration to be present.
pub fn build_envelope(operation: &str, body_xml: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="utf-8"?>"#,
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">"#,
            "<soap:Body><{operation}>{body}</{operation}></soap:Body></soap:Envelope>"
        ),
        operation = operation,
        body = body_xml,
    )
}

/// Locate the operation payload inside a decoded response tree.
///
/// Navigates `Envelope.Body`, then tries `<operation>Response`,
/// `<operation>Result`, the bare operation name, and finally the sole
/// child of the body (covers injected response tags). With `payload_key`
/// set, descends one more level; its absence classifies as empty.
fn response_payload<'a>(
    decoded: &'a Value,
    operation: &str,
    payload_key: Option<&str>,
) -> Option<&'a Value> {
    let body = decoded.get("Envelope")?.get("Body")?;
    let response = body
        .get(format!("{operation}Response").as_str())
        .or_else(|| body.get(format!("{operation}Result").as_str()))
        .or_else(|| body.get(operation))
        .or_else(|| match body.as_object() {
            Some(map) if map.len() == 1 => map.values().next(),
            _ => None,
        })?;
    match payload_key {
        Some(key) => response.get(key),
        None => Some(response),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_wraps_operation_and_body() {
        let xml = build_envelope("getNsi", "<nsiCode44>1</nsiCode44>");
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(xml.contains("<soap:Body><getNsi><nsiCode44>1</nsiCode44></getNsi></soap:Body>"));
    }

    #[test]
    fn payload_found_under_response_suffix() {
        let decoded = codec::xml_to_value(
            "<Envelope><Body><getNsiResponse><dataInfo><ok>1</ok></dataInfo>\
             </getNsiResponse></Body></Envelope>",
        )
        .unwrap();
        let payload = response_payload(&decoded, "getNsi", Some("dataInfo")).unwrap();
        assert_eq!(payload, &json!({ "ok": "1" }));
    }

    #[test]
    fn sole_body_child_is_the_payload_fallback() {
        // Injected response tags produce an element unrelated to the
        // operation name.
        let decoded = codec::xml_to_value(
            "<Envelope><Body><resultResponse><status>ok</status></resultResponse>\
             </Body></Envelope>",
        )
        .unwrap();
        let payload = response_payload(&decoded, "receiveFile", None).unwrap();
        assert_eq!(payload, &json!({ "status": "ok" }));
    }

    #[test]
    fn missing_payload_key_means_empty() {
        let decoded = codec::xml_to_value(
            "<Envelope><Body><getNsiResponse><index/></getNsiResponse></Body></Envelope>",
        )
        .unwrap();
        assert!(response_payload(&decoded, "getNsi", Some("dataInfo")).is_none());
        assert!(codec::classify(None).is_empty());
    }

    #[test]
    fn multi_child_body_without_operation_element_is_empty() {
        let decoded = codec::xml_to_value(
            "<Envelope><Body><a>1</a><b>2</b></Body></Envelope>",
        )
        .unwrap();
        assert!(response_payload(&decoded, "getNsi", None).is_none());
    }

    #[test]
    fn into_data_maps_business_error() {
        let outcome = CallOutcome {
            envelope: Envelope::BusinessError {
                code: 404,
                message: "not found".into(),
            },
            raw: String::new(),
        };
        match outcome.into_data() {
            Err(GatewayError::Business { code, message }) => {
                assert_eq!(code, 404);
                assert_eq!(message, "not found");
            }
            other => panic!("expected business error, got {other:?}"),
        }
    }
}
