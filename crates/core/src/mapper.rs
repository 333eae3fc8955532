//! Conversions between the wire, storage and domain shapes of a holding.
//!
//! Every path into [`PortfolioItem`] goes through [`derive_item`], so `pnl` and
//! `pnl_percentage` are computed the same way whether the holding came from
//! the network or from the cache.

use log::warn;
use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::holding::{CachedHolding, PortfolioItem, RawHolding};
use crate::money::{checked_percentage_of, decimal_from_f64, round2};

/// Normalize a wire holding into a domain item with derived P&L.
///
/// Prices that cannot be represented as decimals (NaN, infinities) become
/// zero, and P&L that overflows the decimal range becomes zero. Both are
/// logged at `warn`. Use [`try_raw_to_item`] to reject such holdings instead.
#[must_use]
pub fn raw_to_item(raw: &RawHolding) -> PortfolioItem {
    derive_item(
        raw.symbol.clone(),
        raw.quantity,
        price(&raw.symbol, "ltp", raw.ltp),
        price(&raw.symbol, "avgPrice", raw.avg_price),
        price(&raw.symbol, "close", raw.close),
    )
}

/// Like [`raw_to_item`], but fails with `InvalidResponse` on an
/// unrepresentable price or on P&L outside the decimal range.
pub fn try_raw_to_item(raw: &RawHolding) -> Result<PortfolioItem, CoreError> {
    let mut prices = [Decimal::ZERO; 3];
    for (slot, (field, value)) in prices.iter_mut().zip([
        ("ltp", raw.ltp),
        ("avgPrice", raw.avg_price),
        ("close", raw.close),
    ]) {
        *slot = decimal_from_f64(value).ok_or_else(|| {
            CoreError::InvalidResponse(format!("Unrepresentable {field} for {}: {value}", raw.symbol))
        })?;
    }
    let [ltp, avg_price, close] = prices;

    checked_derive_item(raw.symbol.clone(), raw.quantity, ltp, avg_price, close).ok_or_else(|| {
        CoreError::InvalidResponse(format!(
            "P&L for {} ({} units) exceeds the decimal range",
            raw.symbol, raw.quantity
        ))
    })
}

/// Rebuild a domain item from a cache row.
#[must_use]
pub fn cached_to_item(row: &CachedHolding) -> PortfolioItem {
    derive_item(
        row.symbol.clone(),
        row.quantity,
        round2(row.ltp),
        round2(row.avg_price),
        round2(row.close),
    )
}

/// Turn a domain item into a cache row stamped with `timestamp` (epoch millis).
#[must_use]
pub fn item_to_cached(item: &PortfolioItem, timestamp: i64) -> CachedHolding {
    CachedHolding {
        symbol: item.symbol.clone(),
        quantity: item.quantity,
        ltp: item.ltp,
        avg_price: item.avg_price,
        close: item.close,
        timestamp,
    }
}

impl From<&RawHolding> for PortfolioItem {
    fn from(raw: &RawHolding) -> Self {
        raw_to_item(raw)
    }
}

impl From<&CachedHolding> for PortfolioItem {
    fn from(row: &CachedHolding) -> Self {
        cached_to_item(row)
    }
}

fn price(symbol: &str, field: &str, value: f64) -> Decimal {
    decimal_from_f64(value).unwrap_or_else(|| {
        warn!("Unrepresentable {field} for {symbol}: {value}, using 0.00");
        round2(Decimal::ZERO)
    })
}

fn derive_item(
    symbol: String,
    quantity: u64,
    ltp: Decimal,
    avg_price: Decimal,
    close: Decimal,
) -> PortfolioItem {
    if let Some(item) = checked_derive_item(symbol.clone(), quantity, ltp, avg_price, close) {
        return item;
    }
    warn!("P&L for {symbol} ({quantity} units) overflows, using 0.00");
    PortfolioItem {
        symbol,
        quantity,
        ltp,
        avg_price,
        close,
        pnl: round2(Decimal::ZERO),
        pnl_percentage: round2(Decimal::ZERO),
    }
}

/// `None` when any derived figure falls outside the decimal range.
fn checked_derive_item(
    symbol: String,
    quantity: u64,
    ltp: Decimal,
    avg_price: Decimal,
    close: Decimal,
) -> Option<PortfolioItem> {
    let gain_per_unit = ltp.checked_sub(avg_price)?;
    let pnl = round2(gain_per_unit.checked_mul(Decimal::from(quantity))?);
    let pnl_percentage = checked_percentage_of(gain_per_unit, avg_price)?;

    Some(PortfolioItem {
        symbol,
        quantity,
        ltp,
        avg_price,
        close,
        pnl,
        pnl_percentage,
    })
}
