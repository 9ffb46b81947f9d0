//! The parsed-XML tree and dotted-path traversal over it.
//!
//! A [`Node`] is what the XML-to-tree step produces: scalars, sequences for
//! repeated sibling elements, and ordered mappings from element/attribute name
//! to child. Attribute keys and co-located text are told apart from child
//! elements by the [`Conventions`] the tree was built with.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::coerce::parse_number;

/// A node of a parsed XML (or JSON) document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Node {
    /// Explicit null. Treated like an absent key by [`resolve`].
    #[default]
    Null,
    /// Text content or attribute value, as found in the source.
    Text(String),
    /// A number from a JSON source. The XML parser never infers these.
    Number(#[serde(with = "rust_decimal::serde::float")] Decimal),
    /// Repeated sibling elements, in document order.
    List(Vec<Node>),
    /// Element children and attributes, in document order.
    Map(IndexMap<String, Node>),
}

impl Node {
    /// Build a mapping node from key/value pairs, keeping their order.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        Node::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Whether this is an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    /// The entries of a mapping node.
    pub fn as_map(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a direct child by key. Only mappings have children.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map()?.get(key)
    }

    /// The first non-null entry of a sequence, or the node itself.
    ///
    /// Used where a document may repeat an element that is usually single
    /// (e.g. two `LegalMonetaryTotal` blocks); the first occurrence wins.
    pub fn first_item(&self) -> Option<&Node> {
        match self {
            Node::Null => None,
            Node::List(items) => items.iter().find(|n| !n.is_null()),
            other => Some(other),
        }
    }

    /// Unwrap the scalar value of an element.
    ///
    /// An element carrying attributes is a mapping with its text under the
    /// text key (`{"#text": "2", "@_unitCode": "PCE"}`); a plain element is
    /// the scalar itself. Sequences contribute their first occurrence.
    pub fn text_value(&self, conventions: &Conventions) -> Option<&Node> {
        match self {
            Node::Null => None,
            Node::Text(_) | Node::Number(_) => Some(self),
            Node::Map(map) => map
                .get(conventions.text_key.as_str())
                .and_then(|n| n.text_value(conventions)),
            Node::List(items) => items.iter().find_map(|n| n.text_value(conventions)),
        }
    }

    /// The scalar value as a trimmed, non-empty string.
    pub fn scalar_text(&self, conventions: &Conventions) -> Option<String> {
        match self.text_value(conventions)? {
            Node::Text(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Node::Number(d) => Some(d.normalize().to_string()),
            _ => None,
        }
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Text(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Text(value)
    }
}

impl From<Decimal> for Node {
    fn from(value: Decimal) -> Self {
        Node::Number(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::List(value)
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Text(b.to_string()),
            Value::Number(n) => {
                let raw = n.to_string();
                match parse_number(&raw) {
                    Some(d) => Node::Number(d),
                    None => Node::Text(raw),
                }
            }
            Value::String(s) => Node::Text(s),
            Value::Array(items) => Node::List(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::Map(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Node::from)
    }
}

/// Naming convention of a parsed tree: how attributes and element text are keyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    /// Prefix marking attribute keys (`@_unitCode`).
    pub attribute_prefix: String,
    /// Key holding text content of an element that also has attributes or children.
    pub text_key: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            attribute_prefix: "@_".to_string(),
            text_key: "#text".to_string(),
        }
    }
}

impl Conventions {
    /// The tree key for an attribute name.
    pub fn attribute(&self, name: &str) -> String {
        format!("{}{name}", self.attribute_prefix)
    }
}

/// Resolve a dot-separated key path inside `tree`.
///
/// Each segment looks up a key in the current mapping. A segment that is an
/// unsigned integer indexes into a sequence instead (`PartyLegalEntity.0.RegistrationName`).
/// Traversal stops with `None` as soon as a key is absent, the current node
/// cannot be descended into, or the final value is an explicit null.
pub fn resolve<'a>(tree: &'a Node, path: &str) -> Option<&'a Node> {
    let mut current = tree;
    for segment in path.split('.') {
        current = match current {
            Node::Map(map) => map.get(segment)?,
            Node::List(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!current.is_null()).then_some(current)
}

/// [`resolve`] with an explicit fallback for missing paths.
pub fn resolve_or<'a>(tree: &'a Node, path: &str, fallback: &'a Node) -> &'a Node {
    resolve(tree, path).unwrap_or(fallback)
}

/// Evaluate candidate paths in order and return the first present value.
pub fn first_of<'a, S: AsRef<str>>(tree: &'a Node, candidates: &[S]) -> Option<&'a Node> {
    candidates.iter().find_map(|path| resolve(tree, path.as_ref()))
}
