//! Convert an XML invoice file to the normalized JSON envelope.
//!
//! Run with: `cargo run --example map_invoice --features xml -- path/to/invoice.xml`
//! Set `RUST_LOG=rechnungsmapper=debug` to see root detection and item counts.

use rechnungsmapper::MappingResponse;
use rechnungsmapper::xml::{ParseOptions, convert_xml};
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = r#"<Invoice xmlns:cbc="urn:cbc" xmlns:cac="urn:cac">
  <cbc:ID>INV-1</cbc:ID>
  <cbc:IssueDate>2024-01-01</cbc:IssueDate>
  <cac:InvoiceLine>
    <cac:Item><cbc:Name>Widget</cbc:Name></cac:Item>
    <cbc:InvoicedQuantity unitCode="PCE">2</cbc:InvoicedQuantity>
    <cac:Price><cbc:PriceAmount>10</cbc:PriceAmount></cac:Price>
  </cac:InvoiceLine>
</Invoice>"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let xml = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(xml) => xml,
            Err(e) => {
                eprintln!("cannot read {path}: {e}");
                std::process::exit(2);
            }
        },
        None => {
            println!("No file given, converting the built-in sample.\n");
            SAMPLE.to_string()
        }
    };

    // ── Convert ───────────────────────────────────────────────────────
    let result = convert_xml(&xml, &ParseOptions::default());

    // ── Status a transport layer would answer with ────────────────────
    let status = match &result {
        Ok(_) => 200,
        Err(e) if e.is_parse_error() => 400,
        Err(_) => 422,
    };

    match serde_json::to_string_pretty(&MappingResponse::from(result)) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("cannot serialize response: {e}"),
    }
    println!("\nHTTP status: {status}");
}
