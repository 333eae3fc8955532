use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::errors::CoreError;
use crate::providers::traits::ConnectivityProbe;
use crate::services::fetch_service::FetchService;
use crate::storage::traits::{HoldingsSet, HoldingsStore};

/// Message carried by `CoreError::NoDataAvailable` when the device is offline
/// and nothing has been cached yet.
pub const NO_DATA_MESSAGE: &str = "No internet connection and no cached data available";

/// How a successful refresh was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Fresh holdings were fetched and written to the cache.
    Fetched { count: usize },
    /// The fetch was skipped or failed; the cached holdings remain on screen.
    ServedFromCache { count: usize },
}

/// Decides between network and cache on every refresh.
///
/// Policy:
/// - **Online**: fetch → replace the cache → `Fetched`. If the fetch fails,
///   a non-empty cache still counts as success (`ServedFromCache`); an empty
///   one returns the fetch error.
/// - **Offline**: no fetch. Non-empty cache → `ServedFromCache`, empty →
///   `NoDataAvailable`.
///
/// Cancellation is never turned into a fallback: it comes back as
/// `CoreError::Cancelled` from whichever step was running.
///
/// The repository is the only writer of the store.
pub struct PortfolioRepository {
    fetch_service: FetchService,
    store: Arc<dyn HoldingsStore>,
    probe: Arc<dyn ConnectivityProbe>,
}

impl PortfolioRepository {
    pub fn new(
        fetch_service: FetchService,
        store: Arc<dyn HoldingsStore>,
        probe: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self {
            fetch_service,
            store,
            probe,
        }
    }

    /// Live view of the cached holdings.
    pub fn observe_holdings(&self) -> watch::Receiver<HoldingsSet> {
        self.store.observe()
    }

    pub fn store(&self) -> &Arc<dyn HoldingsStore> {
        &self.store
    }

    pub fn fetch_service(&self) -> &FetchService {
        &self.fetch_service
    }

    /// Drop every cached holding. Subscribers see an empty set.
    pub async fn clear_cache(&self) -> Result<(), CoreError> {
        info!("Clearing cached holdings");
        self.store.clear().await
    }

    /// Run one refresh cycle: probe, then fetch or fall back to the cache.
    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<RefreshOutcome, CoreError> {
        ensure_active(cancel)?;

        if !self.is_online(cancel).await? {
            debug!("Network unavailable, serving holdings from cache");
            return self
                .fall_back_to_cache(cancel, || CoreError::NoDataAvailable(NO_DATA_MESSAGE.into()))
                .await;
        }

        match self.fetch_service.fetch(cancel).await {
            Ok(items) => {
                ensure_active(cancel)?;
                let count = items.len();
                // Not raced against `cancel`: an interrupted write could leave the
                // cache file ahead of the published set.
                self.store.replace_all(items).await?;
                info!(
                    "Refreshed {count} holding(s) from {}",
                    self.fetch_service.provider_name()
                );
                Ok(RefreshOutcome::Fetched { count })
            }
            Err(e) if e.is_cancellation() => Err(e),
            Err(e) => {
                warn!("Holdings fetch failed, falling back to cache: {e}");
                self.fall_back_to_cache(cancel, move || e).await
            }
        }
    }

    /// Ask the probe on a blocking worker. A probe that panics counts as offline.
    async fn is_online(&self, cancel: &CancellationToken) -> Result<bool, CoreError> {
        let probe = Arc::clone(&self.probe);
        let task = tokio::task::spawn_blocking(move || probe.is_available());

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(CoreError::Cancelled),
            joined = task => Ok(joined.unwrap_or(false)),
        }
    }

    async fn fall_back_to_cache<F>(
        &self,
        cancel: &CancellationToken,
        on_empty: F,
    ) -> Result<RefreshOutcome, CoreError>
    where
        F: FnOnce() -> CoreError,
    {
        let cached = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CoreError::Cancelled),
            snapshot = self.store.snapshot() => snapshot?,
        };

        if cached.is_empty() {
            Err(on_empty())
        } else {
            debug!("Serving {} cached holding(s)", cached.len());
            Ok(RefreshOutcome::ServedFromCache {
                count: cached.len(),
            })
        }
    }
}

fn ensure_active(cancel: &CancellationToken) -> Result<(), CoreError> {
    if cancel.is_cancelled() {
        Err(CoreError::Cancelled)
    } else {
        Ok(())
    }
}
