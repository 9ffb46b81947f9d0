//! Locale-tolerant number parsing and VAT rate normalization.
//!
//! All values are [`Decimal`]; a result is either a finite number or `None`.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::str::FromStr;

use super::tree::Node;

/// Decimal places kept for derived amounts and VAT rates.
pub const AMOUNT_SCALE: u32 = 4;

const MAX_EXPONENT: u32 = 28;

/// Parse a number written the way invoices write them.
///
/// Removes all whitespace (`"1 234,56"`), accepts a decimal comma in place of
/// the point and a leading `+`, and understands scientific notation.
/// Returns `None` for anything that is not a number.
///
/// Only the first comma is treated as the decimal separator, so
/// `"1,234.56"` is rejected rather than guessed at.
pub fn parse_number(raw: &str) -> Option<Decimal> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = compact.replacen(',', ".", 1);
    let unsigned = normalized.strip_prefix('+').unwrap_or(&normalized);
    match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => {
            scale_by_exponent(parse_plain(mantissa)?, exponent.parse().ok()?)
        }
        None => parse_plain(unsigned),
    }
}

fn parse_plain(s: &str) -> Option<Decimal> {
    let well_formed = !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_digit() || b == b'.' || b == b'-');
    if !well_formed {
        return None;
    }
    Decimal::from_str(s).ok()
}

/// `value * 10^exponent`, within the 28 digits a `Decimal` can carry.
fn scale_by_exponent(value: Decimal, exponent: i32) -> Option<Decimal> {
    let magnitude = exponent.unsigned_abs();
    if magnitude > MAX_EXPONENT {
        return None;
    }
    let factor = Decimal::from_i128_with_scale(10i128.pow(magnitude), 0);
    if exponent >= 0 {
        value.checked_mul(factor)
    } else {
        value.checked_div(factor)
    }
}

/// Coerce a scalar node to a number.
///
/// Mappings and sequences are not numbers; unwrap them with
/// [`Node::text_value`] first.
pub fn to_number(value: &Node) -> Option<Decimal> {
    match value {
        Node::Number(d) => Some(*d),
        Node::Text(s) => parse_number(s),
        _ => None,
    }
}

/// Normalize a VAT rate to a fraction (`19` and `0.19` both become `0.19`).
///
/// Values above 1 are read as percentages. This cannot tell a whole-number
/// rate of 1% or less from a fraction: `"1"` stays `1` (100%) and `"0.5"`
/// stays `0.5` (50%).
pub fn to_vat_rate(value: &Node) -> Option<Decimal> {
    let rate = to_number(value)?;
    let fraction = if rate > Decimal::ONE {
        rate / dec!(100)
    } else {
        rate
    };
    Some(round_amount(fraction))
}

/// Round a derived amount to [`AMOUNT_SCALE`] places, half away from zero.
pub fn round_amount(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Product of two optional amounts, rounded once. `None` if either is missing
/// or the product overflows.
pub fn derive_product(a: Option<Decimal>, b: Option<Decimal>) -> Option<Decimal> {
    a?.checked_mul(b?).map(round_amount)
}
