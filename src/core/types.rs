use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The normalized invoice: one header plus line items in document order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedInvoice {
    /// Document-level fields.
    pub header: InvoiceHeader,
    /// Line items; empty when the source has no lines.
    pub items: Vec<InvoiceItem>,
}

/// Document-level fields. Anything the source does not carry is `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InvoiceHeader {
    /// Supplier party name or legal registration name.
    pub supplier_name: Option<String>,
    /// Supplier tax identifier (VAT ID, CUI).
    pub supplier_tax_id: Option<String>,
    /// Invoice (or credit note) number.
    pub invoice_number: Option<String>,
    /// Issue date exactly as written in the source.
    pub invoice_date: Option<String>,
    /// Document currency code (ISO 4217).
    pub currency: Option<String>,
    /// Total excluding VAT.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_no_vat: Option<Decimal>,
    /// Total including VAT.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_with_vat: Option<Decimal>,
    /// Sum of document-level allowances.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub allowance_total: Option<Decimal>,
}

/// One invoice line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// Line identifier from the source, if any.
    pub line_id: Option<String>,
    /// Item name; `"Item {n}"` when the source names nothing.
    pub product_name: String,
    /// Unit of measure code (UNECE Rec 20 in UBL sources).
    pub unit: Option<String>,
    /// Invoiced (or credited) quantity.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub qty_invoiced: Option<Decimal>,
    /// Filled in by goods-receipt systems downstream; never set by the mapper.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub qty_received: Option<Decimal>,
    /// Filled in downstream; never set by the mapper.
    pub lot: Option<String>,
    /// Net unit price.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price_no_vat: Option<Decimal>,
    /// Net line amount, explicit or `qty_invoiced * price_no_vat`.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub value_no_vat: Option<Decimal>,
    /// VAT rate as a fraction (`0.19`).
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub vat_rate: Option<Decimal>,
    /// VAT amount, explicit or `value_no_vat * vat_rate`.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub vat_value: Option<Decimal>,
}
