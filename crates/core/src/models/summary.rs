use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::round2;

/// Aggregate figures over the whole holdings set.
///
/// Recomputed from scratch on every holdings change and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    /// Σ ltp × quantity
    pub current_value: Decimal,

    /// Σ avg_price × quantity
    pub total_investment: Decimal,

    /// current_value - total_investment
    pub total_pnl: Decimal,

    /// total_pnl / total_investment, in percent (0 when nothing is invested)
    pub total_pnl_percentage: Decimal,

    /// Σ (close - ltp) × quantity
    pub today_pnl: Decimal,
}

impl PortfolioSummary {
    /// The summary of an empty portfolio: every figure is zero.
    #[must_use]
    pub fn empty() -> Self {
        let zero = round2(Decimal::ZERO);
        Self {
            current_value: zero,
            total_investment: zero,
            total_pnl: zero,
            total_pnl_percentage: zero,
            today_pnl: zero,
        }
    }
}

impl Default for PortfolioSummary {
    fn default() -> Self {
        Self::empty()
    }
}
