//! XML ⇄ value-tree conversion.
//!
//! The legacy bodies are read into a generic `serde_json::Value` tree
//! before classification and typed decoding, mirroring what the original
//! SOAP tooling did:
//! - element attributes are collected under an `attributes` key,
//! - repeated sibling elements collapse into an array,
//! - a childless, attributeless element becomes its text content,
//! - an element with attributes and bare text keeps the text under `value`,
//! - namespace prefixes are stripped from element names (the endpoints are
//!   inconsistent about them), but kept on attribute names.
//!
//! The reverse direction serializes an [`OrderedNode`] into the body
//! elements of an outgoing request, preserving insertion order exactly.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

use crate::error::{CodecError, CodecResult};
use crate::order::{OrderedNode, OrderedValue};

#[derive(Default)]
struct PendingElement {
    attributes: Map<String, Value>,
    children: Vec<(String, Value)>,
    text: String,
}

impl PendingElement {
    fn from_start(start: &BytesStart<'_>) -> CodecResult<Self> {
        let mut attributes = Map::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|err| CodecError::MalformedXml {
                position: 0,
                message: err.to_string(),
            })?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).to_string();
            // Namespace declarations are transport noise, not data.
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            let value = attribute
                .unescape_value()
                .map_err(|err| CodecError::MalformedXml {
                    position: 0,
                    message: err.to_string(),
                })?;
            attributes.insert(key, Value::String(value.into_owned()));
        }
        Ok(Self {
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    fn finish(self) -> Value {
        if self.children.is_empty() && self.attributes.is_empty() {
            return Value::String(self.text);
        }
        let has_children = !self.children.is_empty();
        let mut map = Map::new();
        if !self.attributes.is_empty() {
            map.insert("attributes".to_string(), Value::Object(self.attributes));
        }
        for (name, value) in self.children {
            match map.get_mut(&name) {
                None => {
                    map.insert(name, value);
                }
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            }
        }
        if !has_children && !self.text.is_empty() {
            map.insert("value".to_string(), Value::String(self.text));
        }
        Value::Object(map)
    }
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).to_string()
}

/// Read an XML document into a value tree.
///
/// Returns an object keyed by the root element's local name. Malformed
/// markup surfaces as [`CodecError::MalformedXml`] with the byte position.
pub fn xml_to_value(xml: &str) -> CodecResult<Value> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Index 0 is a virtual document node collecting the root element.
    let mut stack: Vec<(String, PendingElement)> =
        vec![(String::new(), PendingElement::default())];

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let element = PendingElement::from_start(&start)?;
                stack.push((local_name(&start), element));
            }
            Ok(Event::Empty(start)) => {
                let value = PendingElement::from_start(&start)?.finish();
                let name = local_name(&start);
                if let Some((_, parent)) = stack.last_mut() {
                    parent.children.push((name, value));
                }
            }
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|err| CodecError::MalformedXml {
                    position: reader.buffer_position() as u64,
                    message: err.to_string(),
                })?;
                if let Some((_, element)) = stack.last_mut() {
                    element.text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some((_, element)) = stack.last_mut() {
                    element
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                let (name, element) = stack.pop().ok_or_else(|| CodecError::MalformedXml {
                    position: reader.buffer_position() as u64,
                    message: "unbalanced closing tag".to_string(),
                })?;
                let value = element.finish();
                match stack.last_mut() {
                    Some((_, parent)) => parent.children.push((name, value)),
                    None => {
                        return Err(CodecError::MalformedXml {
                            position: reader.buffer_position() as u64,
                            message: "closing tag outside document".to_string(),
                        })
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // declaration, comments, processing instructions
            Err(err) => {
                return Err(CodecError::MalformedXml {
                    position: reader.buffer_position() as u64,
                    message: err.to_string(),
                })
            }
        }
    }

    let (_, document) = stack.pop().ok_or_else(|| CodecError::MalformedXml {
        position: reader.buffer_position() as u64,
        message: "empty document".to_string(),
    })?;
    Ok(document.finish())
}

/// Serialize an ordered tree into XML body elements, insertion order
/// preserved. No wrapper element is added; callers supply the operation
/// element and the envelope.
pub fn node_to_xml(node: &OrderedNode) -> CodecResult<String> {
    let mut writer = Writer::new(Vec::new());
    write_entries(&mut writer, node)?;
    String::from_utf8(writer.into_inner()).map_err(|err| CodecError::XmlWrite {
        element: String::new(),
        message: err.to_string(),
    })
}

fn write_entries(writer: &mut Writer<Vec<u8>>, node: &OrderedNode) -> CodecResult<()> {
    for (name, value) in node.entries() {
        match value {
            OrderedValue::Node(child) => {
                write_start(writer, name)?;
                write_entries(writer, child)?;
                write_end(writer, name)?;
            }
            OrderedValue::Leaf(Value::Array(items)) => {
                // Repeated element per item, the legacy list convention.
                for item in items {
                    write_scalar(writer, name, item)?;
                }
            }
            OrderedValue::Leaf(leaf) => write_scalar(writer, name, leaf)?,
        }
    }
    Ok(())
}

fn write_scalar(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> CodecResult<()> {
    if value.is_null() {
        return writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(|err| write_error(name, err));
    }
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    write_start(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(&text)))
        .map_err(|err| write_error(name, err))?;
    write_end(writer, name)
}

fn write_start(writer: &mut Writer<Vec<u8>>, name: &str) -> CodecResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|err| write_error(name, err))
}

fn write_end(writer: &mut Writer<Vec<u8>>, name: &str) -> CodecResult<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|err| write_error(name, err))
}

/// Escape text for use as element or attribute content.
pub fn escape_xml(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

fn write_error(element: &str, err: impl std::fmt::Display) -> CodecError {
    CodecError::XmlWrite {
        element: element.to_string(),
        message: err.to_string(),
    }
}
