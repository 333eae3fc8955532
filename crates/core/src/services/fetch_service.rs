use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::errors::CoreError;
use crate::mapper::try_raw_to_item;
use crate::models::holding::PortfolioItem;
use crate::providers::retry::{retry_with_backoff, RetryConfig};
use crate::providers::traits::HoldingsProvider;

/// Fetches holdings from the remote provider and normalizes them.
///
/// Transient failures (timeouts, connection errors) are retried with
/// exponential backoff; everything else fails on the first attempt.
pub struct FetchService {
    provider: Arc<dyn HoldingsProvider>,
    retry: RetryConfig,
}

impl FetchService {
    pub fn new(provider: Arc<dyn HoldingsProvider>, retry: RetryConfig) -> Self {
        Self { provider, retry }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Fetch and map the full holdings set.
    ///
    /// Returns `CoreError::Cancelled` as soon as `cancel` fires, including
    /// while waiting between attempts. After the last attempt the last error
    /// is returned as-is. A holding whose P&L does not fit a decimal fails the
    /// whole batch with `InvalidResponse`.
    pub async fn fetch(&self, cancel: &CancellationToken) -> Result<Vec<PortfolioItem>, CoreError> {
        let raw = retry_with_backoff(&self.retry, cancel, CoreError::is_transient, || {
            self.provider.fetch_holdings()
        })
        .await?;

        raw.iter().map(try_raw_to_item).collect()
    }
}
