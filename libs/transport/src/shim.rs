//! The request/response shim.
//!
//! Exactly one network round trip per call. All body rewriting lives in
//! free functions so it stays testable without a socket.

use std::time::Duration;

use encoding_rs::{Encoding, WINDOWS_1251};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH};
use reqwest::Method;
use tracing::debug;

use crate::error::{ShimError, ShimResult};

/// Body markers the legacy responses wrap their payload in. The endpoints
/// are inconsistent about the envelope prefix.
const BODY_PREFIXES: &[&str] = &["soap:Body", "soapenv:Body", "SOAP-ENV:Body"];

/// Legacy single-byte encodings the endpoints mandate.
///
/// An enum rather than a string so a second encoding is an additive,
/// exhaustively-matched change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyCharset {
    /// The Eastern-European single-byte encoding all current endpoints use
    Windows1251,
}

impl LegacyCharset {
    /// Charset name as written into the XML declaration and headers.
    pub fn name(self) -> &'static str {
        match self {
            LegacyCharset::Windows1251 => "windows-1251",
        }
    }

    fn encoding(self) -> &'static Encoding {
        match self {
            LegacyCharset::Windows1251 => WINDOWS_1251,
        }
    }
}

/// One request/response pair: created per call, consumed immediately,
/// never persisted.
#[derive(Debug, Clone)]
pub struct TransportExchange {
    /// Target endpoint
    pub url: String,
    /// HTTP method
    pub method: Method,
    /// Outgoing body, internal encoding UTF-8
    pub body: String,
    /// Transcode the outgoing body to this charset before transmission
    pub charset: Option<LegacyCharset>,
    /// Remove this literal wrapping tag from the outgoing body
    pub strip_tag: Option<String>,
    /// Splice this wrapping tag inside the response's body markers
    pub inject_response_tag: Option<String>,
    /// Extra headers, passed through verbatim
    pub headers: Vec<(String, String)>,
    /// Per-call timeout; `None` disables the timeout entirely (slow bulk
    /// extractions are configured this way)
    pub timeout: Option<Duration>,
}

impl TransportExchange {
    /// POST exchange with no rewriting options.
    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::POST,
            body: body.into(),
            charset: None,
            strip_tag: None,
            inject_response_tag: None,
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Transcode the outgoing body to `charset`.
    pub fn charset(mut self, charset: LegacyCharset) -> Self {
        self.charset = Some(charset);
        self
    }

    /// Strip the literal `<tag>`/`</tag>` pair from the outgoing body.
    pub fn strip_tag(mut self, tag: impl Into<String>) -> Self {
        self.strip_tag = Some(tag.into());
        self
    }

    /// Inject a `<tag>`/`</tag>` pair inside the response body markers.
    pub fn inject_response_tag(mut self, tag: impl Into<String>) -> Self {
        self.inject_response_tag = Some(tag.into());
        self
    }

    /// Append an extra header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the per-call timeout.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Decoded outcome of one exchange.
#[derive(Debug, Clone)]
pub struct ShimResponse {
    /// HTTP status code
    pub status: u16,
    /// Body decoded with the legacy charset, post tag injection
    pub body: String,
}

/// The transport shim. Holds only the HTTP client; no state across calls.
#[derive(Debug, Clone, Default)]
pub struct SoapTransport {
    client: reqwest::Client,
}

impl SoapTransport {
    /// Shim over a default client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shim over a preconfigured client (proxy, TLS options). Network
    /// dispatcher overrides are explicit configuration here, never a
    /// process-wide global.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Perform the exchange: rewrite, transmit, decode, rewrite.
    ///
    /// Non-success statuses are failures carrying the decoded body, so the
    /// classifier can extract a structured fault from it. No retries at
    /// this layer.
    pub async fn exchange(&self, exchange: TransportExchange) -> ShimResult<ShimResponse> {
        let mut body = exchange.body;
        if let Some(tag) = &exchange.strip_tag {
            body = strip_wrapping_tag(&body, tag);
        }

        let bytes = match exchange.charset {
            Some(charset) => {
                let rewritten = rewrite_declared_charset(&body, charset.name());
                let (encoded, _, _) = charset.encoding().encode(&rewritten);
                encoded.into_owned()
            }
            None => body.into_bytes(),
        };

        let mut headers = HeaderMap::new();
        for (name, value) in &exchange.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ShimError::Header { name: name.clone() })?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| ShimError::Header { name: name.clone() })?;
            headers.insert(header_name, header_value);
        }
        // Byte length of the transcoded body, not the character count.
        headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));

        debug!(url = %exchange.url, bytes = bytes.len(), "legacy exchange");

        let mut request = self
            .client
            .request(exchange.method.clone(), &exchange.url)
            .headers(headers)
            .body(bytes);
        if let Some(timeout) = exchange.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|source| ShimError::Request {
            url: exchange.url.clone(),
            source,
        })?;
        let status = response.status();
        let raw = response.bytes().await.map_err(|source| ShimError::Request {
            url: exchange.url.clone(),
            source,
        })?;

        // Always the legacy charset, irrespective of declared content-type.
        let (decoded, _, _) = WINDOWS_1251.decode(&raw);
        let mut text = decoded.into_owned();
        if let Some(tag) = &exchange.inject_response_tag {
            text = inject_response_tag(&text, tag);
        }

        if !status.is_success() {
            return Err(ShimError::Status {
                url: exchange.url,
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(ShimResponse {
            status: status.as_u16(),
            body: text,
        })
    }
}

/// Remove the literal opening and closing tags named `tag`, first
/// occurrence each, leaving the enclosed content in place.
pub fn strip_wrapping_tag(body: &str, tag: &str) -> String {
    body.replacen(&format!("<{tag}>"), "", 1)
        .replacen(&format!("</{tag}>"), "", 1)
}

/// Rewrite the declared charset of the XML prolog from UTF-8 to the
/// legacy name, first occurrence only.
pub fn rewrite_declared_charset(body: &str, charset: &str) -> String {
    if body.contains("utf-8") {
        body.replacen("utf-8", charset, 1)
    } else {
        body.replacen("UTF-8", charset, 1)
    }
}

/// Splice `<tag>`/`</tag>` immediately inside the outer envelope body
/// markers. Responses without a recognizable body marker pass through
/// untouched.
pub fn inject_response_tag(text: &str, tag: &str) -> String {
    for prefix in BODY_PREFIXES {
        let open = format!("<{prefix}>");
        let close = format!("</{prefix}>");
        if text.contains(&open) {
            return text
                .replacen(&open, &format!("{open}<{tag}>"), 1)
                .replacen(&close, &format!("</{tag}>{close}"), 1);
        }
    }
    text.to_string()
}
