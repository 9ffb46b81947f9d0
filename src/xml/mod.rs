//! XML input: document parsing and the end-to-end conversion pipeline.
//!
//! ```
//! use rechnungsmapper::xml::{ParseOptions, convert_xml};
//!
//! let xml = r#"<Invoice xmlns:cbc="urn:cbc" xmlns:cac="urn:cac">
//!   <cbc:ID>RE-1</cbc:ID>
//!   <cac:InvoiceLine>
//!     <cbc:InvoicedQuantity unitCode="HUR">3</cbc:InvoicedQuantity>
//!     <cac:Item><cbc:Name>Beratung</cbc:Name></cac:Item>
//!     <cac:Price><cbc:PriceAmount>150,00</cbc:PriceAmount></cac:Price>
//!   </cac:InvoiceLine>
//! </Invoice>"#;
//!
//! let invoice = convert_xml(xml, &ParseOptions::default()).unwrap();
//! assert_eq!(invoice.items[0].product_name, "Beratung");
//! assert_eq!(invoice.items[0].value_no_vat, Some(rust_decimal_macros::dec!(450)));
//! ```

mod parse;

pub use parse::parse_xml;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    Conventions, InvoiceMapper, MappingError, MappingResponse, Node, NormalizedInvoice,
    default_mapper, strip_namespaces_with,
};

/// Default for [`ParseOptions::max_depth`]. Invoices nest a dozen levels deep.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// How XML is turned into a tree, passed explicitly with every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Attribute prefix and text key of the produced tree.
    pub conventions: Conventions,
    /// Trim surrounding whitespace from text content.
    pub trim_values: bool,
    /// Strip namespace prefixes before mapping.
    pub strip_namespaces: bool,
    /// Deepest element nesting accepted; deeper documents are malformed.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            conventions: Conventions::default(),
            trim_values: true,
            strip_namespaces: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Parse an XML invoice and map it to the normalized shape.
pub fn convert_xml(xml: &str, options: &ParseOptions) -> Result<NormalizedInvoice, MappingError> {
    let mut tree = parse_xml(xml, options)?;
    if options.strip_namespaces {
        tree = strip_namespaces_with(&tree, &options.conventions);
    }
    map_tree(&tree, &options.conventions)
}

/// [`convert_xml`] for raw request bytes, wrapped in the response envelope.
pub fn convert_bytes(body: &[u8], options: &ParseOptions) -> MappingResponse {
    let result = std::str::from_utf8(body)
        .map_err(|e| MappingError::Encoding(e.to_string()))
        .and_then(|xml| convert_xml(xml, options));
    if let Err(e) = &result {
        debug!(error = %e, parse_error = e.is_parse_error(), "conversion failed");
    }
    MappingResponse::from(result)
}

fn map_tree(tree: &Node, conventions: &Conventions) -> Result<NormalizedInvoice, MappingError> {
    let mapper = default_mapper();
    if mapper.conventions() == conventions {
        mapper.map(tree)
    } else {
        InvoiceMapper::new(conventions.clone()).map(tree)
    }
}
