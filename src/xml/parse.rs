use indexmap::IndexMap;
use indexmap::map::Entry;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use super::ParseOptions;
use crate::core::{MappingError, Node};

/// An element whose end tag has not been seen yet.
struct OpenElement {
    name: String,
    fields: IndexMap<String, Node>,
    text: String,
}

impl OpenElement {
    fn document() -> Self {
        Self {
            name: String::new(),
            fields: IndexMap::new(),
            text: String::new(),
        }
    }

    fn open(start: &BytesStart<'_>, options: &ParseOptions) -> Result<Self, MappingError> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| MappingError::Encoding(format!("element name: {e}")))?
            .to_string();

        let mut fields = IndexMap::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| MappingError::MalformedInput(e.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| MappingError::Encoding(format!("attribute name: {e}")))?;
            let value = attr
                .unescape_value()
                .map_err(|e| MappingError::MalformedInput(e.to_string()))?;
            fields.insert(
                options.conventions.attribute(key),
                Node::Text(value.into_owned()),
            );
        }

        Ok(Self {
            name,
            fields,
            text: String::new(),
        })
    }

    /// Turn the finished element into its tree node.
    ///
    /// A bare element is its text; an element with attributes or children is
    /// a mapping, with any text under the text key.
    fn close(mut self, options: &ParseOptions) -> (String, Node) {
        let text = if options.trim_values {
            self.text.trim().to_string()
        } else {
            self.text
        };
        if self.fields.is_empty() {
            return (self.name, Node::Text(text));
        }
        if !text.trim().is_empty() {
            self.fields
                .insert(options.conventions.text_key.clone(), Node::Text(text));
        }
        (self.name, Node::Map(self.fields))
    }

    /// Attach a child; repeated names turn into a sequence.
    fn attach(&mut self, name: String, node: Node) {
        match self.fields.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(node);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Node::List(items) => items.push(node),
                existing => {
                    let first = std::mem::take(existing);
                    *existing = Node::List(vec![first, node]);
                }
            },
        }
    }
}

/// Parse an XML document into a [`Node`] tree.
///
/// The result is a mapping from the document element's name to its content,
/// e.g. `{"Invoice": {"cbc:ID": "INV-1", …}}`. Attributes are keyed with the
/// configured attribute prefix, text next to attributes or children goes
/// under the text key, and repeated siblings become a [`Node::List`]. All
/// scalars stay text. The XML declaration, comments, processing instructions
/// and doctype are dropped.
pub fn parse_xml(xml: &str, options: &ParseOptions) -> Result<Node, MappingError> {
    debug!(bytes = xml.len(), "parsing XML document");
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![OpenElement::document()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                // The document sentinel sits at the bottom of the stack.
                if stack.len() > options.max_depth {
                    debug!(max_depth = options.max_depth, "element nesting limit hit");
                    return Err(MappingError::MalformedInput("nesting too deep".into()));
                }
                stack.push(OpenElement::open(e, options)?);
            }
            Ok(Event::Empty(ref e)) => {
                let (name, node) = OpenElement::open(e, options)?.close(options);
                if let Some(parent) = stack.last_mut() {
                    parent.attach(name, node);
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| MappingError::MalformedInput(e.to_string()))?;
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8(e.into_inner().into_owned())
                    .map_err(|e| MappingError::Encoding(format!("CDATA: {e}")))?;
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&text);
                }
            }
            Ok(Event::End(_)) => {
                if stack.len() < 2 {
                    return Err(MappingError::MalformedInput(format!(
                        "unexpected end tag at position {}",
                        reader.buffer_position()
                    )));
                }
                if let Some(element) = stack.pop() {
                    let (name, node) = element.close(options);
                    if let Some(parent) = stack.last_mut() {
                        parent.attach(name, node);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(MappingError::MalformedInput(format!(
                    "at position {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    if stack.len() != 1 {
        let unclosed = stack.last().map(|e| e.name.as_str()).unwrap_or_default();
        return Err(MappingError::MalformedInput(format!(
            "unclosed element <{unclosed}>"
        )));
    }
    let document = stack.pop().map(|d| d.fields).unwrap_or_default();
    if document.is_empty() {
        return Err(MappingError::MalformedInput("no root element".into()));
    }
    Ok(Node::Map(document))
}
