//! Structured-markup reading.
//!
//! Parses XML into a JSON-like "verbose" tree the markup-based importers
//! walk directly:
//! - every child element appears under its name as an **array** of node
//!   objects (even when there is exactly one);
//! - attributes become `@`-prefixed string entries;
//! - pure text content becomes a `#` string entry;
//! - mixed content (text interleaved with child elements) becomes a `#`
//!   **array** of ordered segments, each either `{"#": "text"}` or
//!   `{"<name>": [node]}` — the interleaving order is preserved, which is
//!   what lets annotation positions inside sample utterances survive.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

use crate::import::ImportError;

enum Part {
    Text(String),
    Element(String, Value),
}

struct PendingNode {
    name: String,
    attrs: Vec<(String, String)>,
    parts: Vec<Part>,
}

impl PendingNode {
    fn root() -> Self {
        Self {
            name: String::new(),
            attrs: Vec::new(),
            parts: Vec::new(),
        }
    }

    fn open(start: &BytesStart<'_>) -> Result<Self, ImportError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            attrs.push((
                format!("@{}", String::from_utf8_lossy(attr.key.as_ref())),
                attr.unescape_value()
                    .map_err(quick_xml::Error::from)?
                    .into_owned(),
            ));
        }
        Ok(Self {
            name,
            attrs,
            parts: Vec::new(),
        })
    }

    fn close(self) -> (String, Value) {
        let mut node = Map::new();
        for (key, value) in self.attrs {
            node.insert(key, Value::String(value));
        }

        let has_text = self.parts.iter().any(|p| matches!(p, Part::Text(_)));
        let has_elements = self.parts.iter().any(|p| matches!(p, Part::Element(..)));

        if has_text && has_elements {
            let segments = self
                .parts
                .into_iter()
                .map(|part| {
                    let mut segment = Map::new();
                    match part {
                        Part::Text(text) => {
                            segment.insert("#".to_string(), Value::String(text));
                        }
                        Part::Element(name, value) => {
                            segment.insert(name, Value::Array(vec![value]));
                        }
                    }
                    Value::Object(segment)
                })
                .collect();
            node.insert("#".to_string(), Value::Array(segments));
        } else if has_text {
            let text: String = self
                .parts
                .into_iter()
                .filter_map(|part| match part {
                    Part::Text(text) => Some(text),
                    Part::Element(..) => None,
                })
                .collect();
            node.insert("#".to_string(), Value::String(text));
        } else {
            for part in self.parts {
                if let Part::Element(name, value) = part {
                    match node.get_mut(&name) {
                        Some(Value::Array(group)) => group.push(value),
                        _ => {
                            node.insert(name, Value::Array(vec![value]));
                        }
                    }
                }
            }
        }

        (self.name, Value::Object(node))
    }
}

/// Parse an XML document into the verbose tree. The root element appears
/// under its name in the returned object.
pub fn parse_verbose(xml: &str) -> Result<Value, ImportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack = vec![PendingNode::root()];
    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(PendingNode::open(&start)?),
            Event::Empty(start) => {
                let (name, value) = PendingNode::open(&start)?.close();
                if let Some(parent) = stack.last_mut() {
                    parent.parts.push(Part::Element(name, value));
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(quick_xml::Error::from)?
                    .into_owned();
                if !text.is_empty()
                    && let Some(parent) = stack.last_mut()
                {
                    parent.parts.push(Part::Text(text));
                }
            }
            Event::CData(cdata) => {
                let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                if let Some(parent) = stack.last_mut() {
                    parent.parts.push(Part::Text(text));
                }
            }
            Event::End(_) => {
                if stack.len() > 1
                    && let Some(node) = stack.pop()
                {
                    let (name, value) = node.close();
                    if let Some(parent) = stack.last_mut() {
                        parent.parts.push(Part::Element(name, value));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let root = stack.swap_remove(0);
    let (_, value) = root.close();
    Ok(value)
}
