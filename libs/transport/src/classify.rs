//! Exception-path failure classification.
//!
//! Resolves every raw [`ShimError`] into exactly one
//! [`types::TransportError`] variant:
//! - connection-reset, DNS, connect and timeout conditions → `Retryable`,
//! - a structured fault envelope in the response body → `RemoteFault`
//!   with status, code, reason text and detail copied through,
//! - anything else → `Unknown`, the original message preserved.
//!
//! Classification is advisory: nothing here retries, logs at error level,
//! or swallows the original condition.

use serde_json::Value;
use types::TransportError;

use crate::error::ShimError;

/// Classify one raw shim failure.
pub fn classify_failure(error: &ShimError) -> TransportError {
    match error {
        ShimError::Request { source, .. } => classify_request(source),
        ShimError::Status { status, body, .. } => match codec::xml_to_value(body) {
            Ok(decoded) => fault_from_value(*status, &decoded).unwrap_or(TransportError::Unknown {
                message: error.to_string(),
            }),
            Err(_) => TransportError::Unknown {
                message: error.to_string(),
            },
        },
        ShimError::Header { .. } => TransportError::Unknown {
            message: error.to_string(),
        },
    }
}

fn classify_request(source: &reqwest::Error) -> TransportError {
    if source.is_timeout() || source.is_connect() {
        return TransportError::Retryable {
            reason: source.to_string(),
        };
    }
    if let Some(io) = find_io_error(source) {
        return classify_io(io);
    }
    TransportError::Unknown {
        message: source.to_string(),
    }
}

/// Classify a low-level I/O condition.
///
/// Connection resets, refused/aborted connections, broken pipes and
/// timeouts are transient. DNS resolution failures surface without a
/// dedicated kind, so the message is inspected.
pub fn classify_io(error: &std::io::Error) -> TransportError {
    use std::io::ErrorKind;
    match error.kind() {
        ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::ConnectionRefused
        | ErrorKind::BrokenPipe
        | ErrorKind::NotConnected
        | ErrorKind::TimedOut
        | ErrorKind::UnexpectedEof => TransportError::Retryable {
            reason: error.to_string(),
        },
        _ => {
            let message = error.to_string();
            if message.contains("failed to lookup address")
                || message.to_ascii_lowercase().contains("dns")
            {
                TransportError::Retryable { reason: message }
            } else {
                TransportError::Unknown { message }
            }
        }
    }
}

/// Extract a structured fault from a decoded response tree.
///
/// Handles both fault dialects the endpoints produce: `faultcode` /
/// `faultstring` / `detail`, and `Code.Value` / `Reason.Text`. Returns
/// `None` when the tree carries no fault element.
pub fn fault_from_value(status: u16, decoded: &Value) -> Option<TransportError> {
    let body = decoded
        .get("Envelope")
        .and_then(|envelope| envelope.get("Body"))
        .or_else(|| decoded.get("Body"))
        .unwrap_or(decoded);
    let fault = body.get("Fault")?;

    let message = fault
        .get("faultstring")
        .and_then(text_of)
        .or_else(|| fault.get("Reason").and_then(|r| r.get("Text")).and_then(text_of))
        .unwrap_or_else(|| "remote fault".to_string());
    let code = fault
        .get("faultcode")
        .and_then(text_of)
        .or_else(|| fault.get("Code").and_then(|c| c.get("Value")).and_then(text_of));
    let detail = fault.get("detail").map(|detail| match detail.as_str() {
        Some(text) => text.to_string(),
        None => detail.to_string(),
    });

    Some(TransportError::RemoteFault {
        status: if status == 0 { 500 } else { status },
        code,
        message,
        detail,
    })
}

/// Text content of a converted XML node: either a bare string or the
/// `value` key of an attribute-carrying element.
fn text_of(node: &Value) -> Option<String> {
    match node {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => map
            .get("value")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn find_io_error<'a>(error: &'a (dyn std::error::Error + 'static)) -> Option<&'a std::io::Error> {
    let mut source = error.source();
    while let Some(inner) = source {
        if let Some(io) = inner.downcast_ref::<std::io::Error>() {
            return Some(io);
        }
        source = inner.source();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn connection_reset_is_retryable() {
        // ECONNRESET classifies as Retryable, both from the raw os
        // error and from the kind.
        let os_reset = io::Error::from_raw_os_error(104);
        assert!(classify_io(&os_reset).is_retryable());
        let kind_reset = io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer");
        assert!(classify_io(&kind_reset).is_retryable());
    }

    #[test]
    fn dns_lookup_failure_is_retryable() {
        let err = io::Error::other("failed to lookup address information: Name does not resolve");
        assert!(classify_io(&err).is_retryable());
    }

    #[test]
    fn unrelated_io_error_is_unknown() {
        let err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(
            classify_io(&err),
            TransportError::Unknown { .. }
        ));
    }

    #[test]
    fn soap11_fault_maps_to_remote_fault() {
        let decoded = codec::xml_to_value(
            "<Envelope><Body><Fault>\
             <faultcode>Server</faultcode>\
             <faultstring>Validation failed</faultstring>\
             <detail>element order</detail>\
             </Fault></Body></Envelope>",
        )
        .unwrap();
        match fault_from_value(500, &decoded).unwrap() {
            TransportError::RemoteFault {
                status,
                code,
                message,
                detail,
            } => {
                assert_eq!(status, 500);
                assert_eq!(code.as_deref(), Some("Server"));
                assert_eq!(message, "Validation failed");
                assert_eq!(detail.as_deref(), Some("element order"));
            }
            other => panic!("expected remote fault, got {other:?}"),
        }
    }

    #[test]
    fn soap12_fault_reason_text_is_used() {
        let decoded = codec::xml_to_value(
            "<Envelope><Body><Fault>\
             <Code><Value>env:Receiver</Value></Code>\
             <Reason><Text>internal error</Text></Reason>\
             </Fault></Body></Envelope>",
        )
        .unwrap();
        match fault_from_value(500, &decoded).unwrap() {
            TransportError::RemoteFault { code, message, detail, .. } => {
                assert_eq!(code.as_deref(), Some("env:Receiver"));
                assert_eq!(message, "internal error");
                assert_eq!(detail, None);
            }
            other => panic!("expected remote fault, got {other:?}"),
        }
    }

    #[test]
    fn faultless_tree_yields_none() {
        let decoded = codec::xml_to_value("<Envelope><Body><ok/></Body></Envelope>").unwrap();
        assert!(fault_from_value(200, &decoded).is_none());
    }

    #[test]
    fn faultless_error_status_is_unknown() {
        let error = ShimError::Status {
            url: "http://legacy.example".into(),
            status: 502,
            body: "<html>bad gateway</html>".into(),
        };
        assert!(matches!(
            classify_failure(&error),
            TransportError::Unknown { .. }
        ));
    }

    #[test]
    fn fault_status_error_is_remote_fault() {
        let error = ShimError::Status {
            url: "http://legacy.example".into(),
            status: 500,
            body: "<Envelope><Body><Fault><faultstring>rejected</faultstring></Fault></Body></Envelope>"
                .into(),
        };
        match classify_failure(&error) {
            TransportError::RemoteFault { status, message, .. } => {
                assert_eq!(status, 500);
                assert_eq!(message, "rejected");
            }
            other => panic!("expected remote fault, got {other:?}"),
        }
    }
}
