use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A holding exactly as the remote endpoint sends it.
///
/// Prices arrive as floats and must go through the mapper before any
/// arithmetic is done on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHolding {
    /// Instrument ticker (e.g., "ASHOKLEY", "HDFC")
    pub symbol: String,

    /// Number of units held
    pub quantity: u64,

    /// Last traded price
    pub ltp: f64,

    /// Average acquisition price
    pub avg_price: f64,

    /// Previous session close
    pub close: f64,
}

/// A normalized holding with its derived P&L.
///
/// All money fields carry scale 2. `pnl` and `pnl_percentage` are always
/// derived from the other fields by the mapper, never set independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    /// Unique key within a holdings set
    pub symbol: String,

    pub quantity: u64,

    pub ltp: Decimal,

    pub avg_price: Decimal,

    pub close: Decimal,

    /// (ltp - avg_price) × quantity
    pub pnl: Decimal,

    /// Return on the average price, in percent
    pub pnl_percentage: Decimal,
}

/// One persisted cache row. Derived fields are recomputed on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedHolding {
    /// Primary key
    pub symbol: String,

    pub quantity: u64,

    #[serde(with = "rust_decimal::serde::str")]
    pub ltp: Decimal,

    #[serde(with = "rust_decimal::serde::str")]
    pub avg_price: Decimal,

    #[serde(with = "rust_decimal::serde::str")]
    pub close: Decimal,

    /// When the row was written, Unix epoch milliseconds (UTC)
    pub timestamp: i64,
}
