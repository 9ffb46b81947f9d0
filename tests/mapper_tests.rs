//! Invoice mapper tests: root detection, header fields, line items.

use rechnungsmapper::core::*;
use rust_decimal_macros::dec;
use serde_json::json;

fn tree(value: serde_json::Value) -> Node {
    Node::from(value)
}

fn map(value: serde_json::Value) -> NormalizedInvoice {
    map_invoice_to_standard(&tree(value)).unwrap()
}

// --- Root detection ---

#[test]
fn root_plain_invoice_key() {
    let inv = map(json!({"Invoice": {"ID": "A-1"}}));
    assert_eq!(inv.header.invoice_number.as_deref(), Some("A-1"));
}

#[test]
fn root_lowercase_invoice_key() {
    let inv = map(json!({"invoice": {"InvoiceNumber": "B-2"}}));
    assert_eq!(inv.header.invoice_number.as_deref(), Some("B-2"));
}

#[test]
fn root_namespaced_without_stripping() {
    let inv = map(json!({
        "ns2:Invoice": {
            "cbc:ID": "C-3",
            "cbc:DocumentCurrencyCode": "RON"
        }
    }));
    assert_eq!(inv.header.invoice_number.as_deref(), Some("C-3"));
    assert_eq!(inv.header.currency.as_deref(), Some("RON"));
}

#[test]
fn root_unlisted_prefix_found_by_local_name() {
    let inv = map(json!({"foo:Invoice": {"cbc:ID": "D-4"}}));
    assert_eq!(inv.header.invoice_number.as_deref(), Some("D-4"));
}

#[test]
fn root_credit_note() {
    let inv = map(json!({
        "CreditNote": {
            "ID": "CN-1",
            "CreditNoteLine": {
                "CreditedQuantity": {"#text": "1", "@_unitCode": "C62"},
                "Item": {"Name": "Return"},
                "Price": {"PriceAmount": "5"}
            }
        }
    }));
    assert_eq!(inv.header.invoice_number.as_deref(), Some("CN-1"));
    assert_eq!(inv.items.len(), 1);
    assert_eq!(inv.items[0].unit.as_deref(), Some("C62"));
    assert_eq!(inv.items[0].value_no_vat, Some(dec!(5)));
}

#[test]
fn root_falls_back_to_document_with_invoice_fields() {
    let inv = map(json!({
        "InvoiceNumber": "FLAT-1",
        "Supplier": {"Name": "Flat Vendor SRL", "CUI": "RO123"}
    }));
    assert_eq!(inv.header.invoice_number.as_deref(), Some("FLAT-1"));
    assert_eq!(inv.header.supplier_name.as_deref(), Some("Flat Vendor SRL"));
    assert_eq!(inv.header.supplier_tax_id.as_deref(), Some("RO123"));
}

#[test]
fn root_scalar_invoice_key_is_not_usable() {
    let result = map_invoice_to_standard(&tree(json!({"Invoice": "text only"})));
    assert_eq!(result, Err(MappingError::NoInvoiceRoot));
}

#[test]
fn no_root_is_rejected() {
    let result = map_invoice_to_standard(&tree(json!({
        "Order": {"ID": "PO-1"},
        "Comment": "not an invoice"
    })));
    assert_eq!(result, Err(MappingError::NoInvoiceRoot));

    let response = MappingResponse::from(result);
    assert_eq!(
        serde_json::to_value(response).unwrap(),
        json!({"ok": false, "error": "No Invoice root found"})
    );
}

#[test]
fn non_mapping_document_is_rejected() {
    assert_eq!(
        map_invoice_to_standard(&Node::from("plain")),
        Err(MappingError::NoInvoiceRoot)
    );
    assert_eq!(
        map_invoice_to_standard(&Node::Null),
        Err(MappingError::NoInvoiceRoot)
    );
}

// --- Header ---

#[test]
fn header_ubl_fields() {
    let inv = map(json!({
        "Invoice": {
            "ID": "RE-2024-001",
            "IssueDate": "2024-06-15",
            "DocumentCurrencyCode": "EUR",
            "AccountingSupplierParty": {"Party": {
                "PartyName": {"Name": "ACME GmbH"},
                "PartyTaxScheme": {"CompanyID": "DE123456789"}
            }},
            "LegalMonetaryTotal": {
                "LineExtensionAmount": {"#text": "1500.00", "@_currencyID": "EUR"},
                "TaxExclusiveAmount": {"#text": "1450.00", "@_currencyID": "EUR"},
                "TaxInclusiveAmount": {"#text": "1725.50", "@_currencyID": "EUR"},
                "AllowanceTotalAmount": "50.00"
            }
        }
    }));
    let h = inv.header;
    assert_eq!(h.supplier_name.as_deref(), Some("ACME GmbH"));
    assert_eq!(h.supplier_tax_id.as_deref(), Some("DE123456789"));
    assert_eq!(h.invoice_number.as_deref(), Some("RE-2024-001"));
    assert_eq!(h.invoice_date.as_deref(), Some("2024-06-15"));
    assert_eq!(h.currency.as_deref(), Some("EUR"));
    assert_eq!(h.total_no_vat, Some(dec!(1450)));
    assert_eq!(h.total_with_vat, Some(dec!(1725.50)));
    assert_eq!(h.allowance_total, Some(dec!(50)));
}

#[test]
fn header_total_no_vat_falls_back_to_line_extension() {
    let inv = map(json!({
        "Invoice": {"LegalMonetaryTotal": {"LineExtensionAmount": "99,90"}}
    }));
    assert_eq!(inv.header.total_no_vat, Some(dec!(99.90)));
    assert_eq!(inv.header.total_with_vat, None);
}

#[test]
fn header_unparsable_tax_exclusive_amount_is_not_replaced() {
    let inv = map(json!({
        "Invoice": {"LegalMonetaryTotal": {
            "TaxExclusiveAmount": "n/a",
            "LineExtensionAmount": "5"
        }}
    }));
    assert_eq!(inv.header.total_no_vat, None);
}

#[test]
fn header_supplier_legal_entity_object_or_sequence() {
    let single = map(json!({"Invoice": {"AccountingSupplierParty": {"Party": {
        "PartyLegalEntity": {"RegistrationName": "Single SRL"}
    }}}}));
    assert_eq!(single.header.supplier_name.as_deref(), Some("Single SRL"));

    let sequence = map(json!({"Invoice": {"AccountingSupplierParty": {"Party": {
        "PartyLegalEntity": [
            {"RegistrationName": "First SRL"},
            {"RegistrationName": "Second SRL"}
        ]
    }}}}));
    assert_eq!(sequence.header.supplier_name.as_deref(), Some("First SRL"));
}

#[test]
fn header_party_name_wins_over_legal_entity() {
    let inv = map(json!({"Invoice": {"AccountingSupplierParty": {"Party": {
        "PartyName": {"Name": "Trading Name"},
        "PartyLegalEntity": {"RegistrationName": "Legal Name"}
    }}}}));
    assert_eq!(inv.header.supplier_name.as_deref(), Some("Trading Name"));
}

#[test]
fn header_generic_schema() {
    let inv = map(json!({
        "Invoice": {
            "InvoiceNumber": "G-7",
            "InvoiceDate": "15.06.2024",
            "Currency": "RON",
            "Supplier": {"Name": "Generic SA", "CUI": "RO987"},
            "Totals": {"Net": "100", "Gross": "119"}
        }
    }));
    let h = inv.header;
    assert_eq!(h.invoice_number.as_deref(), Some("G-7"));
    assert_eq!(h.invoice_date.as_deref(), Some("15.06.2024"));
    assert_eq!(h.currency.as_deref(), Some("RON"));
    assert_eq!(h.supplier_name.as_deref(), Some("Generic SA"));
    assert_eq!(h.supplier_tax_id.as_deref(), Some("RO987"));
    assert_eq!(h.total_no_vat, Some(dec!(100)));
    assert_eq!(h.total_with_vat, Some(dec!(119)));
}

#[test]
fn header_id_with_scheme_attribute_is_unwrapped() {
    let inv = map(json!({"Invoice": {"ID": {"#text": "X-1", "@_schemeID": "0088"}}}));
    assert_eq!(inv.header.invoice_number.as_deref(), Some("X-1"));
}

#[test]
fn header_missing_fields_are_none() {
    let inv = map(json!({"Invoice": {"ID": "only-id"}}));
    let h = inv.header;
    assert_eq!(h.supplier_name, None);
    assert_eq!(h.supplier_tax_id, None);
    assert_eq!(h.invoice_date, None);
    assert_eq!(h.currency, None);
    assert_eq!(h.total_no_vat, None);
    assert_eq!(h.total_with_vat, None);
    assert_eq!(h.allowance_total, None);
}

// --- Line items ---

#[test]
fn scenario_single_ubl_line() {
    let inv = map(json!({
        "Invoice": {
            "ID": "INV-1",
            "IssueDate": "2024-01-01",
            "InvoiceLine": {
                "Item": {"Name": "Widget"},
                "InvoicedQuantity": {"#text": "2", "@_unitCode": "PCE"},
                "Price": {"PriceAmount": "10"}
            }
        }
    }));
    assert_eq!(inv.items.len(), 1);
    let item = &inv.items[0];
    assert_eq!(item.product_name, "Widget");
    assert_eq!(item.unit.as_deref(), Some("PCE"));
    assert_eq!(item.qty_invoiced, Some(dec!(2)));
    assert_eq!(item.price_no_vat, Some(dec!(10)));
    assert_eq!(item.value_no_vat, Some(dec!(20)));
    assert_eq!(item.vat_rate, None);
    assert_eq!(item.vat_value, None);
    assert_eq!(item.qty_received, None);
    assert_eq!(item.lot, None);

    let json = serde_json::to_value(item).unwrap();
    assert_eq!(json["qty_invoiced"], 2.0);
    assert_eq!(json["value_no_vat"], 20.0);
    assert_eq!(json["vat_rate"], serde_json::Value::Null);
    assert_eq!(json["lot"], serde_json::Value::Null);
}

#[test]
fn scenario_explicit_vat_amount_wins_over_derived() {
    let inv = map(json!({
        "Invoice": {
            "InvoiceLine": {
                "Item": {"Name": "Widget", "ClassifiedTaxCategory": {"Percent": "19"}},
                "InvoicedQuantity": "2",
                "Price": {"PriceAmount": "10"},
                "TaxTotal": {"TaxSubtotal": {"TaxAmount": {"#text": "4.75", "@_currencyID": "EUR"}}}
            }
        }
    }));
    let item = &inv.items[0];
    assert_eq!(item.value_no_vat, Some(dec!(20)));
    assert_eq!(item.vat_rate, Some(dec!(0.19)));
    assert_eq!(item.vat_value, Some(dec!(4.75)));
}

#[test]
fn scenario_absent_lines_give_empty_items() {
    let inv = map(json!({"Invoice": {"ID": "NO-LINES"}}));
    assert!(inv.items.is_empty());
    let json = serde_json::to_value(MappingResponse::success(inv)).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["items"], json!([]));
}

#[test]
fn vat_value_derived_from_rate() {
    let inv = map(json!({
        "Invoice": {"InvoiceLine": {
            "InvoicedQuantity": "3",
            "Price": {"PriceAmount": "3,3333"},
            "Item": {"ClassifiedTaxCategory": {"Percent": "19"}}
        }}
    }));
    let item = &inv.items[0];
    assert_eq!(item.value_no_vat, Some(dec!(9.9999)));
    assert_eq!(item.vat_value, Some(dec!(1.9)));
}

#[test]
fn explicit_line_extension_wins_over_product() {
    let inv = map(json!({
        "Invoice": {"InvoiceLine": {
            "InvoicedQuantity": "2",
            "Price": {"PriceAmount": "10"},
            "LineExtensionAmount": "18.5"
        }}
    }));
    assert_eq!(inv.items[0].value_no_vat, Some(dec!(18.5)));
}

#[test]
fn vat_rate_from_tax_subtotal_category() {
    let inv = map(json!({
        "Invoice": {"InvoiceLine": {
            "LineExtensionAmount": "100",
            "TaxTotal": {"TaxSubtotal": {"TaxCategory": {"Percent": "7"}}}
        }}
    }));
    assert_eq!(inv.items[0].vat_rate, Some(dec!(0.07)));
    assert_eq!(inv.items[0].vat_value, Some(dec!(7)));
}

#[test]
fn lines_in_order_with_placeholders() {
    let inv = map(json!({
        "Invoice": {"InvoiceLine": [
            {"Item": {"Name": "First"}},
            {"Item": {"Description": "Second by description"}},
            {"Description": "Third by line description"},
            {"InvoicedQuantity": "1"}
        ]}
    }));
    let names: Vec<_> = inv.items.iter().map(|i| i.product_name.as_str()).collect();
    assert_eq!(
        names,
        ["First", "Second by description", "Third by line description", "Item 4"]
    );
}

#[test]
fn null_lines_are_dropped_but_positions_kept() {
    let inv = map(json!({"Invoice": {"InvoiceLine": [null, {"ID": "2"}]}}));
    assert_eq!(inv.items.len(), 1);
    assert_eq!(inv.items[0].product_name, "Item 2");
    assert_eq!(inv.items[0].line_id.as_deref(), Some("2"));
}

#[test]
fn empty_line_entries_are_dropped() {
    let inv = map(json!({"Invoice": {"InvoiceLine": ""}}));
    assert!(inv.items.is_empty());

    let inv = map(json!({"Invoice": {"InvoiceLine": ["", " ", {"ID": "3"}]}}));
    assert_eq!(inv.items.len(), 1);
    assert_eq!(inv.items[0].product_name, "Item 3");
}

#[test]
fn blank_item_name_falls_through() {
    let inv = map(json!({
        "Invoice": {"InvoiceLine": {"Item": {"Name": "  ", "Description": "Real name"}}}
    }));
    assert_eq!(inv.items[0].product_name, "Real name");
}

#[test]
fn generic_lines_schema() {
    let inv = map(json!({
        "Invoice": {
            "InvoiceNumber": "G-1",
            "Lines": {"Line": [
                {"Name": "Cement", "Unit": "KG", "Quantity": "1 000", "UnitPrice": "0,45", "VAT": "19"},
                {"Name": "Sand", "Unit": "T", "Quantity": "2", "UnitPrice": "30", "VAT": "0.09"}
            ]}
        }
    }));
    assert_eq!(inv.items.len(), 2);
    let cement = &inv.items[0];
    assert_eq!(cement.unit.as_deref(), Some("KG"));
    assert_eq!(cement.qty_invoiced, Some(dec!(1000)));
    assert_eq!(cement.price_no_vat, Some(dec!(0.45)));
    assert_eq!(cement.value_no_vat, Some(dec!(450)));
    assert_eq!(cement.vat_rate, Some(dec!(0.19)));
    assert_eq!(cement.vat_value, Some(dec!(85.5)));
    assert_eq!(inv.items[1].vat_rate, Some(dec!(0.09)));
}

#[test]
fn generic_items_as_plain_list() {
    let inv = map(json!({"invoice": {"Items": [{"Name": "A"}, {"Name": "B"}]}}));
    assert_eq!(inv.items.len(), 2);
    assert_eq!(inv.items[1].product_name, "B");
}

#[test]
fn unit_from_base_quantity() {
    let inv = map(json!({
        "Invoice": {"InvoiceLine": {
            "InvoicedQuantity": "4",
            "Price": {"PriceAmount": "2", "BaseQuantity": {"#text": "1", "@_unitCode": "LTR"}}
        }}
    }));
    assert_eq!(inv.items[0].unit.as_deref(), Some("LTR"));
}

#[test]
fn unparsable_numbers_degrade_to_none() {
    let inv = map(json!({
        "Invoice": {"InvoiceLine": {
            "InvoicedQuantity": "two",
            "Price": {"PriceAmount": "10"}
        }}
    }));
    let item = &inv.items[0];
    assert_eq!(item.qty_invoiced, None);
    assert_eq!(item.price_no_vat, Some(dec!(10)));
    assert_eq!(item.value_no_vat, None);
    assert_eq!(item.vat_value, None);
}

#[test]
fn unparsable_explicit_vat_amount_suppresses_derivation() {
    let inv = map(json!({
        "Invoice": {"InvoiceLine": {
            "Quantity": "2",
            "UnitPrice": "3",
            "TaxTotal": {"TaxAmount": "n/a"},
            "VAT": "19"
        }}
    }));
    let item = &inv.items[0];
    assert_eq!(item.value_no_vat, Some(dec!(6)));
    assert_eq!(item.vat_rate, Some(dec!(0.19)));
    assert_eq!(item.vat_value, None);
}

#[test]
fn unparsable_vat_rate_is_not_replaced_by_later_candidate() {
    let inv = map(json!({
        "Invoice": {"InvoiceLine": {
            "Item": {"ClassifiedTaxCategory": {"Percent": "standard"}},
            "VAT": "19",
            "LineExtensionAmount": "100"
        }}
    }));
    let item = &inv.items[0];
    assert_eq!(item.vat_rate, None);
    assert_eq!(item.vat_value, None);
}

#[test]
fn namespaced_tree_maps_like_stripped_tree() {
    let raw = tree(json!({
        "ns2:Invoice": {
            "cbc:ID": "NS-1",
            "cac:AccountingSupplierParty": {"cac:Party": {
                "cac:PartyLegalEntity": [{"cbc:RegistrationName": "Prefixed SRL"}]
            }},
            "cac:InvoiceLine": [{
                "cbc:InvoicedQuantity": {"#text": "2", "@_unitCode": "H87"},
                "cac:Item": {"cbc:Name": "Bolt", "cac:ClassifiedTaxCategory": {"cbc:Percent": "19"}},
                "cac:Price": {"cbc:PriceAmount": {"#text": "1.25", "@_currencyID": "RON"}}
            }]
        }
    }));
    let unstripped = map_invoice_to_standard(&raw).unwrap();
    let stripped = map_invoice_to_standard(&strip_namespaces(&raw)).unwrap();
    assert_eq!(unstripped, stripped);
    assert_eq!(unstripped.header.supplier_name.as_deref(), Some("Prefixed SRL"));
    let bolt = &unstripped.items[0];
    assert_eq!(bolt.unit.as_deref(), Some("H87"));
    assert_eq!(bolt.value_no_vat, Some(dec!(2.5)));
    assert_eq!(bolt.vat_value, Some(dec!(0.475)));
}

#[test]
fn numbers_from_json_sources() {
    let inv = map(json!({
        "Invoice": {"InvoiceLine": {"Quantity": 3, "UnitPrice": 2.5, "VAT": 19}}
    }));
    let item = &inv.items[0];
    assert_eq!(item.value_no_vat, Some(dec!(7.5)));
    assert_eq!(item.vat_rate, Some(dec!(0.19)));
    assert_eq!(item.vat_value, Some(dec!(1.425)));
}

#[test]
fn custom_conventions() {
    let mapper = InvoiceMapper::new(Conventions {
        attribute_prefix: "@".into(),
        text_key: "$".into(),
    });
    let inv = mapper
        .map(&tree(json!({
            "Invoice": {"InvoiceLine": {
                "InvoicedQuantity": {"$": "5", "@unitCode": "KGM"},
                "Price": {"PriceAmount": {"$": "2"}}
            }}
        })))
        .unwrap();
    assert_eq!(inv.items[0].unit.as_deref(), Some("KGM"));
    assert_eq!(inv.items[0].value_no_vat, Some(dec!(10)));
}
