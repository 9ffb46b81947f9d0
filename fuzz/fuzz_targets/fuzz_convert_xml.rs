#![no_main]

use libfuzzer_sys::fuzz_target;
use rechnungsmapper::xml::{ParseOptions, convert_bytes};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must always produce an envelope, never a panic.
    let response = convert_bytes(data, &ParseOptions::default());
    assert_eq!(response.ok, response.error.is_none());
});
