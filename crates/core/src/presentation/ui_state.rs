use serde::{Deserialize, Serialize};

use crate::models::holding::PortfolioItem;
use crate::models::summary::PortfolioSummary;

/// Shown when the holdings stream ends underneath the projector.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading portfolio data";

/// Shown when aggregation fails without a usable message.
pub const PROCESSING_ERROR_MESSAGE: &str = "Error processing portfolio data";

/// Everything the holdings screen needs to render, as one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PortfolioUiState {
    /// No holdings emission has been processed yet.
    #[default]
    Loading,

    #[serde(rename_all = "camelCase")]
    Success {
        holdings: Vec<PortfolioItem>,
        summary: PortfolioSummary,
        /// Whether the summary panel is expanded.
        is_expanded: bool,
    },

    Error {
        message: String,
    },
}

impl PortfolioUiState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, PortfolioUiState::Loading)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, PortfolioUiState::Success { .. })
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, PortfolioUiState::Error { .. })
    }

    /// Holdings of a `Success` state, `None` otherwise.
    #[must_use]
    pub fn holdings(&self) -> Option<&[PortfolioItem]> {
        match self {
            PortfolioUiState::Success { holdings, .. } => Some(holdings),
            _ => None,
        }
    }

    #[must_use]
    pub fn summary(&self) -> Option<&PortfolioSummary> {
        match self {
            PortfolioUiState::Success { summary, .. } => Some(summary),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            PortfolioUiState::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Tabs on the portfolio screen. Only `Holdings` has content for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortfolioTab {
    Positions,
    #[default]
    Holdings,
}
