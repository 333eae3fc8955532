use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Scale used for every stored or displayed monetary value.
pub const MONEY_SCALE: u32 = 2;

/// Internal scale for ratios, before they are turned into percentages.
pub const RATIO_SCALE: u32 = 4;

/// Rupee sign used by [`format_currency`].
pub const CURRENCY_SYMBOL: &str = "₹";

const ONE_LAKH: u64 = 100_000;
const ONE_CRORE: u64 = 10_000_000;

/// Round half-up (away from zero on a tie) to 2 decimals, always carrying scale 2.
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    round_half_up(value, MONEY_SCALE)
}

/// Round half-up to 4 decimals, always carrying scale 4.
#[must_use]
pub fn round4(value: Decimal) -> Decimal {
    round_half_up(value, RATIO_SCALE)
}

fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    rounded
}

/// Convert a wire float into a scale-2 decimal.
///
/// The decimal is parsed from the float's shortest textual form (`0.1` stays
/// `0.1`, not `0.1000000000000000055…`), then rounded half-up.
/// Returns `None` for NaN, infinities and values outside the decimal range.
#[must_use]
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string()).ok().map(round2)
}

/// `numerator / denominator` as a percentage with 2 decimals.
///
/// The ratio is rounded to 4 decimals first, then scaled by 100 and rounded
/// to 2. A non-positive denominator yields zero.
#[must_use]
pub fn percentage_of(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        return round2(Decimal::ZERO);
    }
    round2(round4(numerator / denominator) * Decimal::ONE_HUNDRED)
}

/// [`percentage_of`] that returns `None` instead of overflowing.
#[must_use]
pub fn checked_percentage_of(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator <= Decimal::ZERO {
        return Some(round2(Decimal::ZERO));
    }
    let ratio = round4(numerator.checked_div(denominator)?);
    Some(round2(ratio.checked_mul(Decimal::ONE_HUNDRED)?))
}

// ── Display formatting ──────────────────────────────────────────────

/// Indian rupee format: `₹1,23,456.78`, negatives as `-₹1,234.50`.
#[must_use]
pub fn format_currency(value: Decimal) -> String {
    let rounded = round2(value);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}{CURRENCY_SYMBOL}{}.{frac_part}", group_indian_digits(int_part))
}

/// Two-decimal percentage, e.g. `11.11%`.
#[must_use]
pub fn format_percentage(value: Decimal) -> String {
    format!("{}%", round2(value))
}

/// Compact Indian notation: crores (`1.25 Cr`), lakhs (`3.40 L`), or a plain
/// two-decimal number below one lakh.
#[must_use]
pub fn format_indian_number(value: Decimal) -> String {
    let crore = Decimal::from(ONE_CRORE);
    let lakh = Decimal::from(ONE_LAKH);

    if value >= crore {
        format!("{} Cr", round2(value / crore))
    } else if value >= lakh {
        format!("{} L", round2(value / lakh))
    } else {
        round2(value).to_string()
    }
}

/// Group an ASCII digit string the Indian way: last three digits, then pairs.
fn group_indian_digits(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut groups = Vec::with_capacity(head.len() / 2 + 1);
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}
