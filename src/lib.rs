//! # rechnungsmapper
//!
//! Normalizes XML invoices from heterogeneous sources (UBL 2.1, XRechnung,
//! namespaced ERP exports, loosely structured vendor XML) into one stable
//! shape: a header plus ordered line items.
//!
//! All amounts are [`rust_decimal::Decimal`], never floating point. VAT rates
//! are always fractions (`0.19`), whatever the source wrote.
//!
//! ## Quick Start
//!
//! ```rust
//! use rechnungsmapper::core::*;
//! use rust_decimal_macros::dec;
//!
//! let tree: Node = serde_json::from_str(r##"{
//!     "Invoice": {
//!         "ID": "INV-1",
//!         "IssueDate": "2024-01-01",
//!         "InvoiceLine": {
//!             "Item": { "Name": "Widget" },
//!             "InvoicedQuantity": { "#text": "2", "@_unitCode": "PCE" },
//!             "Price": { "PriceAmount": "10" }
//!         }
//!     }
//! }"##).unwrap();
//!
//! let invoice = map_invoice_to_standard(&tree).unwrap();
//! assert_eq!(invoice.items[0].unit.as_deref(), Some("PCE"));
//! assert_eq!(invoice.items[0].value_no_vat, Some(dec!(20)));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Tree type, coercion, namespace stripping, invoice mapper |
//! | `xml` | XML parsing and the `convert_xml` pipeline |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
