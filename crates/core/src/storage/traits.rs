use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

use crate::errors::CoreError;
use crate::models::holding::PortfolioItem;

/// Shared, immutable view of one committed holdings set.
pub type HoldingsSet = Arc<Vec<PortfolioItem>>;

/// Durable store of the last-known holdings, one row per symbol.
///
/// Sets are always ordered by symbol ascending. Readers see whole batches
/// only. Errors surface as `CoreError::Storage` (or a file-format variant)
/// and are never retried here.
#[async_trait]
pub trait HoldingsStore: Send + Sync {
    /// Subscribe to the committed holdings set.
    ///
    /// The receiver holds the current set immediately and is notified after
    /// every committed write, in write order. It stays open for as long as the
    /// store lives; call again for a fresh subscription.
    fn observe(&self) -> watch::Receiver<HoldingsSet>;

    /// Point-in-time copy of the committed set.
    async fn snapshot(&self) -> Result<Vec<PortfolioItem>, CoreError>;

    /// Discard every row and insert `items`. Duplicate symbols collapse to
    /// the last occurrence. Concurrent calls serialize.
    async fn replace_all(&self, items: Vec<PortfolioItem>) -> Result<(), CoreError>;

    /// Remove every row.
    async fn clear(&self) -> Result<(), CoreError>;
}
