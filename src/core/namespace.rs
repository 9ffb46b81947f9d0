//! Namespace prefix stripping for parsed trees.
//!
//! Different producers decorate the same UBL element as `cbc:ID`, `ns3:ID`
//! or plain `ID`. Stripping collapses all of them to the local name so one
//! set of lookup paths covers every dialect.

use indexmap::IndexMap;
use tracing::trace;

use super::tree::{Conventions, Node};

/// The local part of a possibly prefixed name (`cbc:ID` -> `ID`).
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Strip namespace prefixes using the default [`Conventions`].
pub fn strip_namespaces(tree: &Node) -> Node {
    strip_namespaces_with(tree, &Conventions::default())
}

/// Rewrite every mapping key `prefix:local` to `local`, at every depth.
///
/// Attribute keys keep their attribute marker (`@_xsi:type` -> `@_type`).
///
/// When two keys of one mapping strip to the same name (`cbc:ID` and
/// `cac:ID`), the later value replaces the earlier one at the earlier
/// key's position. The replaced value is lost.
pub fn strip_namespaces_with(tree: &Node, conventions: &Conventions) -> Node {
    match tree {
        Node::Map(map) => {
            let mut stripped: IndexMap<String, Node> = IndexMap::with_capacity(map.len());
            for (key, value) in map {
                let local = strip_key(key, conventions);
                if stripped
                    .insert(local, strip_namespaces_with(value, conventions))
                    .is_some()
                {
                    trace!(key = %key, "namespace stripping collapsed a key");
                }
            }
            Node::Map(stripped)
        }
        Node::List(items) => Node::List(
            items
                .iter()
                .map(|item| strip_namespaces_with(item, conventions))
                .collect(),
        ),
        scalar => scalar.clone(),
    }
}

fn strip_key(key: &str, conventions: &Conventions) -> String {
    let prefix = conventions.attribute_prefix.as_str();
    match key.strip_prefix(prefix).filter(|_| !prefix.is_empty()) {
        Some(attribute) => format!("{prefix}{}", local_name(attribute)),
        None => local_name(key).to_string(),
    }
}
