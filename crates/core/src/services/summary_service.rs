use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::holding::PortfolioItem;
use crate::models::summary::PortfolioSummary;
use crate::money::{checked_percentage_of, percentage_of, round2};

/// Reduces a holdings set into portfolio-wide figures.
///
/// Pure business logic, no I/O. Sums are accumulated exactly and rounded to
/// 2 decimals once, at the end.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    /// Compute the summary of `items`. An empty slice yields all zeros.
    ///
    /// # Panics
    ///
    /// When a total falls outside the decimal range. Use
    /// [`try_summarize`](Self::try_summarize) for untrusted holdings.
    #[must_use]
    pub fn summarize(&self, items: &[PortfolioItem]) -> PortfolioSummary {
        if items.is_empty() {
            return PortfolioSummary::empty();
        }

        let mut current_value = Decimal::ZERO;
        let mut total_investment = Decimal::ZERO;
        let mut today_pnl = Decimal::ZERO;

        for item in items {
            let quantity = Decimal::from(item.quantity);
            current_value += item.ltp * quantity;
            total_investment += item.avg_price * quantity;
            today_pnl += (item.close - item.ltp) * quantity;
        }

        let total_pnl = current_value - total_investment;

        PortfolioSummary {
            current_value: round2(current_value),
            total_investment: round2(total_investment),
            total_pnl: round2(total_pnl),
            total_pnl_percentage: percentage_of(total_pnl, total_investment),
            today_pnl: round2(today_pnl),
        }
    }

    /// [`summarize`](Self::summarize) with checked arithmetic. Totals outside
    /// the decimal range fail with `ValidationError`.
    pub fn try_summarize(&self, items: &[PortfolioItem]) -> Result<PortfolioSummary, CoreError> {
        if items.is_empty() {
            return Ok(PortfolioSummary::empty());
        }
        checked_totals(items).ok_or_else(|| {
            CoreError::ValidationError(format!(
                "Portfolio totals for {} holding(s) exceed the decimal range",
                items.len()
            ))
        })
    }
}

fn checked_totals(items: &[PortfolioItem]) -> Option<PortfolioSummary> {
    let mut current_value = Decimal::ZERO;
    let mut total_investment = Decimal::ZERO;
    let mut today_pnl = Decimal::ZERO;

    for item in items {
        let quantity = Decimal::from(item.quantity);
        current_value = current_value.checked_add(item.ltp.checked_mul(quantity)?)?;
        total_investment = total_investment.checked_add(item.avg_price.checked_mul(quantity)?)?;
        let day_move = item.close.checked_sub(item.ltp)?.checked_mul(quantity)?;
        today_pnl = today_pnl.checked_add(day_move)?;
    }

    let total_pnl = current_value.checked_sub(total_investment)?;

    Some(PortfolioSummary {
        current_value: round2(current_value),
        total_investment: round2(total_investment),
        total_pnl: round2(total_pnl),
        total_pnl_percentage: checked_percentage_of(total_pnl, total_investment)?,
        today_pnl: round2(today_pnl),
    })
}

/// Shorthand for `SummaryService::new().summarize(items)`.
#[must_use]
pub fn summarize(items: &[PortfolioItem]) -> PortfolioSummary {
    SummaryService.summarize(items)
}
