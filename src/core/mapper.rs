//! Invoice normalization: root detection, header and line extraction.
//!
//! Every field is looked up through an ordered list of candidate paths
//! covering UBL (with and without `cac:`/`cbc:` prefixes) and the flat
//! "generic" layout some ERP exports use. The first candidate that yields a
//! usable value wins; nothing here fails except a missing invoice root.

use rust_decimal::Decimal;
use std::sync::LazyLock;
use tracing::{debug, trace};

use super::coerce::{derive_product, to_number, to_vat_rate};
use super::error::MappingError;
use super::namespace::local_name;
use super::tree::{Conventions, Node, first_of, resolve};
use super::types::{InvoiceHeader, InvoiceItem, NormalizedInvoice};

/// Document element names accepted as an invoice root, in priority order.
const ROOT_NAMES: [&str; 2] = ["Invoice", "CreditNote"];

/// Namespace prefixes seen on root elements of unstripped production documents.
pub const KNOWN_ROOT_PREFIXES: &[&str] = &[
    "ns0", "ns1", "ns2", "ns3", "ns4", "ns5", "ns6", "ns7", "ns8", "ns9", "ubl", "inv", "in",
    "tns",
];

// Header candidates, relative to the invoice root.
const SUPPLIER_NAME: &[&str] = &[
    "cac:AccountingSupplierParty.cac:Party.cac:PartyName.cbc:Name",
    "cac:AccountingSupplierParty.cac:Party.cac:PartyName.0.cbc:Name",
    "cac:AccountingSupplierParty.cac:Party.cac:PartyLegalEntity.cbc:RegistrationName",
    "cac:AccountingSupplierParty.cac:Party.cac:PartyLegalEntity.0.cbc:RegistrationName",
    "Supplier.Name",
];
const SUPPLIER_TAX_ID: &[&str] = &[
    "cac:AccountingSupplierParty.cac:Party.cac:PartyTaxScheme.cbc:CompanyID",
    "cac:AccountingSupplierParty.cac:Party.cac:PartyTaxScheme.0.cbc:CompanyID",
    "Supplier.CUI",
];
const INVOICE_NUMBER: &[&str] = &["cbc:ID", "InvoiceNumber"];
const INVOICE_DATE: &[&str] = &["cbc:IssueDate", "InvoiceDate"];
const CURRENCY: &[&str] = &["cbc:DocumentCurrencyCode", "Currency"];
const TOTALS: &[&str] = &["cac:LegalMonetaryTotal", "Totals", "totals"];

// Relative to the totals block.
const TOTAL_NO_VAT: &[&str] = &["cbc:TaxExclusiveAmount", "cbc:LineExtensionAmount", "Net"];
const TOTAL_WITH_VAT: &[&str] = &["cbc:TaxInclusiveAmount", "Gross"];
const ALLOWANCE_TOTAL: &[&str] = &["cbc:AllowanceTotalAmount", "Allowance"];

const LINES: &[&str] = &[
    "cac:InvoiceLine",
    "invoiceLine",
    "Lines.Line",
    "Lines",
    "Items.Item",
    "Items",
    "cac:CreditNoteLine",
];

// Line candidates, relative to one line.
const LINE_ID: &[&str] = &["cbc:ID", "LineNumber"];
const LINE_NAME: &[&str] = &[
    "cac:Item.cbc:Name",
    "Name",
    "cac:Item.cbc:Description",
    "cbc:Description",
];
const LINE_QUANTITY: &[&str] = &["cbc:InvoicedQuantity", "cbc:CreditedQuantity", "Quantity"];
const LINE_PRICE: &[&str] = &["cac:Price.cbc:PriceAmount", "UnitPrice"];
const LINE_VALUE: &[&str] = &["cbc:LineExtensionAmount", "LineTotal"];
const LINE_VAT_RATE: &[&str] = &[
    "cac:Item.cac:ClassifiedTaxCategory.cbc:Percent",
    "cac:Item.cac:ClassifiedTaxCategory.0.cbc:Percent",
    "cac:TaxTotal.cac:TaxSubtotal.cac:TaxCategory.cbc:Percent",
    "cac:TaxTotal.cac:TaxSubtotal.0.cac:TaxCategory.cbc:Percent",
    "VAT",
];
const LINE_VAT_VALUE: &[&str] = &[
    "cac:TaxTotal.cac:TaxSubtotal.cbc:TaxAmount",
    "cac:TaxTotal.cac:TaxSubtotal.0.cbc:TaxAmount",
    "cac:TaxTotal.cbc:TaxAmount",
    "cac:TaxTotal.0.cbc:TaxAmount",
    "VATAmount",
];

/// Expand namespaced paths into candidate lists: bare form first, then the
/// prefixed form, without duplicates.
fn candidates(paths: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(paths.len() * 2);
    for path in paths {
        let bare = path.split('.').map(local_name).collect::<Vec<_>>().join(".");
        for candidate in [bare, path.to_string()] {
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        }
    }
    out
}

/// Candidate path lists, built once per [`Conventions`].
#[derive(Debug, Clone)]
struct CandidatePaths {
    root_keys: Vec<String>,
    root_markers: Vec<String>,
    supplier_name: Vec<String>,
    supplier_tax_id: Vec<String>,
    invoice_number: Vec<String>,
    invoice_date: Vec<String>,
    currency: Vec<String>,
    totals: Vec<String>,
    total_no_vat: Vec<String>,
    total_with_vat: Vec<String>,
    allowance_total: Vec<String>,
    lines: Vec<String>,
    line_id: Vec<String>,
    line_name: Vec<String>,
    line_unit: Vec<String>,
    line_quantity: Vec<String>,
    line_price: Vec<String>,
    line_value: Vec<String>,
    line_vat_rate: Vec<String>,
    line_vat_value: Vec<String>,
}

impl CandidatePaths {
    fn new(conventions: &Conventions) -> Self {
        let mut root_keys = Vec::new();
        for name in ROOT_NAMES {
            root_keys.push(name.to_string());
            let mut lower = name.to_string();
            lower[..1].make_ascii_lowercase();
            root_keys.push(lower);
            root_keys.extend(KNOWN_ROOT_PREFIXES.iter().map(|p| format!("{p}:{name}")));
        }

        let unit_code = conventions.attribute("unitCode");
        let line_unit = vec![
            format!("cbc:InvoicedQuantity.{unit_code}"),
            format!("cbc:CreditedQuantity.{unit_code}"),
            format!("cac:Price.cbc:BaseQuantity.{unit_code}"),
            "Unit".to_string(),
        ];
        let line_unit_refs: Vec<&str> = line_unit.iter().map(String::as_str).collect();

        let mut root_markers = Vec::new();
        for group in [INVOICE_NUMBER, INVOICE_DATE, CURRENCY, SUPPLIER_NAME, LINES] {
            root_markers.extend(candidates(group));
        }

        Self {
            root_keys,
            root_markers,
            supplier_name: candidates(SUPPLIER_NAME),
            supplier_tax_id: candidates(SUPPLIER_TAX_ID),
            invoice_number: candidates(INVOICE_NUMBER),
            invoice_date: candidates(INVOICE_DATE),
            currency: candidates(CURRENCY),
            totals: candidates(TOTALS),
            total_no_vat: candidates(TOTAL_NO_VAT),
            total_with_vat: candidates(TOTAL_WITH_VAT),
            allowance_total: candidates(ALLOWANCE_TOTAL),
            lines: candidates(LINES),
            line_id: candidates(LINE_ID),
            line_name: candidates(LINE_NAME),
            line_unit: candidates(&line_unit_refs),
            line_quantity: candidates(LINE_QUANTITY),
            line_price: candidates(LINE_PRICE),
            line_value: candidates(LINE_VALUE),
            line_vat_rate: candidates(LINE_VAT_RATE),
            line_vat_value: candidates(LINE_VAT_VALUE),
        }
    }
}

static DEFAULT_MAPPER: LazyLock<InvoiceMapper> = LazyLock::new(InvoiceMapper::default);

/// Map a parsed invoice tree (default [`Conventions`]) to the normalized shape.
///
/// ```
/// use rechnungsmapper::core::*;
///
/// let tree = Node::map([(
///     "Invoice",
///     Node::map([("ID", Node::from("INV-1")), ("Currency", Node::from("EUR"))]),
/// )]);
/// let invoice = map_invoice_to_standard(&tree).unwrap();
/// assert_eq!(invoice.header.invoice_number.as_deref(), Some("INV-1"));
/// assert!(invoice.items.is_empty());
/// ```
pub fn map_invoice_to_standard(tree: &Node) -> Result<NormalizedInvoice, MappingError> {
    DEFAULT_MAPPER.map(tree)
}

/// The shared mapper for the default tree conventions.
pub fn default_mapper() -> &'static InvoiceMapper {
    &DEFAULT_MAPPER
}

/// Maps parsed invoice trees built with a given set of [`Conventions`].
///
/// Holds only immutable lookup tables; one instance can serve any number of
/// threads.
#[derive(Debug, Clone)]
pub struct InvoiceMapper {
    conventions: Conventions,
    paths: CandidatePaths,
}

impl Default for InvoiceMapper {
    fn default() -> Self {
        Self::new(Conventions::default())
    }
}

impl InvoiceMapper {
    /// Build a mapper whose candidate paths follow `conventions`.
    pub fn new(conventions: Conventions) -> Self {
        let paths = CandidatePaths::new(&conventions);
        Self { conventions, paths }
    }

    /// The tree conventions this mapper expects.
    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    /// Map `tree` to a normalized invoice.
    ///
    /// Fails only with [`MappingError::NoInvoiceRoot`]; every other gap in the
    /// document degrades to `None`.
    pub fn map(&self, tree: &Node) -> Result<NormalizedInvoice, MappingError> {
        let root = self.find_root(tree).ok_or(MappingError::NoInvoiceRoot)?;
        let header = self.header(root);
        let items = self.items(root);
        debug!(
            invoice_number = header.invoice_number.as_deref().unwrap_or("-"),
            items = items.len(),
            "invoice mapped"
        );
        Ok(NormalizedInvoice { header, items })
    }

    /// Locate the invoice element.
    ///
    /// Tries the known root keys, then any top-level key whose local name is
    /// a root name, then the document itself if it carries invoice fields.
    pub fn find_root<'a>(&self, tree: &'a Node) -> Option<&'a Node> {
        let top = tree.as_map()?;

        let known = self
            .paths
            .root_keys
            .iter()
            .find_map(|key| usable_root(top.get(key.as_str())?).map(|root| (key.as_str(), root)));
        if let Some((key, root)) = known {
            debug!(root = key, "invoice root located");
            return Some(root);
        }

        for name in ROOT_NAMES {
            let prefixed = top
                .iter()
                .filter(|(key, _)| local_name(key) == name)
                .find_map(|(key, node)| usable_root(node).map(|root| (key.as_str(), root)));
            if let Some((key, root)) = prefixed {
                debug!(root = key, "invoice root located by local name");
                return Some(root);
            }
        }

        if first_of(tree, &self.paths.root_markers).is_some() {
            debug!("document itself used as invoice root");
            return Some(tree);
        }
        None
    }

    fn header(&self, root: &Node) -> InvoiceHeader {
        let p = &self.paths;
        let totals = first_of(root, &p.totals).and_then(Node::first_item);
        InvoiceHeader {
            supplier_name: self.first_text(root, &p.supplier_name),
            supplier_tax_id: self.first_text(root, &p.supplier_tax_id),
            invoice_number: self.first_text(root, &p.invoice_number),
            invoice_date: self.first_text(root, &p.invoice_date),
            currency: self.first_text(root, &p.currency),
            total_no_vat: totals.and_then(|t| self.first_number(t, &p.total_no_vat)),
            total_with_vat: totals.and_then(|t| self.first_number(t, &p.total_with_vat)),
            allowance_total: totals.and_then(|t| self.first_number(t, &p.allowance_total)),
        }
    }

    fn items(&self, root: &Node) -> Vec<InvoiceItem> {
        let Some(lines) = first_of(root, &self.paths.lines) else {
            debug!("no line collection found");
            return Vec::new();
        };
        let entries: Vec<&Node> = match lines {
            Node::List(entries) => entries.iter().collect(),
            single => vec![single],
        };
        entries
            .into_iter()
            .enumerate()
            .filter(|(_, line)| !is_empty_line(line))
            .map(|(index, line)| self.item(line, index + 1))
            .collect()
    }

    fn item(&self, line: &Node, position: usize) -> InvoiceItem {
        let p = &self.paths;
        let qty_invoiced = self.first_number(line, &p.line_quantity);
        let price_no_vat = self.first_number(line, &p.line_price);

        let value_no_vat = self.first_number(line, &p.line_value).or_else(|| {
            let derived = derive_product(qty_invoiced, price_no_vat);
            trace!(position, value = ?derived, "line value derived from quantity and price");
            derived
        });

        let vat_rate = self
            .first_scalar(line, &p.line_vat_rate)
            .and_then(to_vat_rate);

        let vat_value = self.first_number(line, &p.line_vat_value).or_else(|| {
            let derived = derive_product(value_no_vat, vat_rate);
            trace!(position, value = ?derived, "VAT value derived from line value and rate");
            derived
        });

        InvoiceItem {
            line_id: self.first_text(line, &p.line_id),
            product_name: self
                .first_text(line, &p.line_name)
                .unwrap_or_else(|| format!("Item {position}")),
            unit: self.first_text(line, &p.line_unit),
            qty_invoiced,
            qty_received: None,
            lot: None,
            price_no_vat,
            value_no_vat,
            vat_rate,
            vat_value,
        }
    }

    /// First candidate holding non-blank text.
    fn first_text(&self, node: &Node, paths: &[String]) -> Option<String> {
        paths
            .iter()
            .find_map(|path| resolve(node, path)?.scalar_text(&self.conventions))
    }

    /// The first present candidate, coerced to a number.
    ///
    /// A present value that does not parse yields `None`; later candidates
    /// and derivations are not consulted.
    fn first_number(&self, node: &Node, paths: &[String]) -> Option<Decimal> {
        self.first_scalar(node, paths).and_then(to_number)
    }

    fn first_scalar<'a>(&self, node: &'a Node, paths: &[String]) -> Option<&'a Node> {
        first_of(node, paths)?.text_value(&self.conventions)
    }
}

/// Null entries and empty elements (`<cac:InvoiceLine/>`) carry no line.
fn is_empty_line(line: &Node) -> bool {
    match line {
        Node::Null => true,
        Node::Text(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// A root candidate is usable if it is a mapping, or a sequence whose first
/// entry is one.
fn usable_root(node: &Node) -> Option<&Node> {
    match node.first_item()? {
        root @ Node::Map(_) => Some(root),
        _ => None,
    }
}
