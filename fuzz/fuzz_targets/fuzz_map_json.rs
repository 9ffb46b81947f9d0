#![no_main]

use libfuzzer_sys::fuzz_target;
use rechnungsmapper::core::*;

fuzz_target!(|data: &[u8]| {
    if let Ok(tree) = serde_json::from_slice::<Node>(data) {
        // Mapping raw and stripped trees must not panic.
        let _ = map_invoice_to_standard(&tree);
        let _ = map_invoice_to_standard(&strip_namespaces(&tree));
    }
});
