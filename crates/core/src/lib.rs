pub mod errors;
pub mod mapper;
pub mod models;
pub mod money;
pub mod presentation;
pub mod providers;
pub mod services;
pub mod storage;

use log::info;
use std::sync::Arc;
use tokio::sync::watch;

use errors::CoreError;
use models::{holding::PortfolioItem, settings::Settings, summary::PortfolioSummary};
use presentation::view_model::PortfolioViewModel;
use providers::{
    connectivity::TcpConnectivityProbe,
    holdings_api::HttpHoldingsProvider,
    traits::{ConnectivityProbe, HoldingsProvider},
};
use services::{
    fetch_service::FetchService,
    portfolio_repository::{PortfolioRepository, RefreshOutcome},
    summary_service::SummaryService,
};
use storage::{
    cache::HoldingsCache,
    traits::{HoldingsSet, HoldingsStore},
};

/// Main entry point for the portfolio core library.
///
/// Wires the holdings endpoint, the connectivity probe and the holdings cache
/// into a repository, and puts a view model on top of it.
#[must_use]
pub struct PortfolioTracker {
    settings: Settings,
    repository: Arc<PortfolioRepository>,
    view_model: PortfolioViewModel,
}

impl std::fmt::Debug for PortfolioTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioTracker")
            .field("endpoint", &self.settings.endpoint_url)
            .field("cache_path", &self.settings.cache_path)
            .field("closed", &self.view_model.is_closed())
            .finish()
    }
}

impl PortfolioTracker {
    /// Build a tracker for the live endpoint described by `settings`.
    ///
    /// Opens the cache file when `cache_path` is set (discarding it if it is
    /// unreadable), otherwise keeps the cache in memory.
    pub async fn new(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;

        let provider: Arc<dyn HoldingsProvider> = Arc::new(HttpHoldingsProvider::from_settings(&settings));
        let probe: Arc<dyn ConnectivityProbe> = Arc::new(TcpConnectivityProbe::for_endpoint(
            &settings.endpoint_url,
            settings.probe_timeout(),
        )?);
        let store: Arc<dyn HoldingsStore> = match &settings.cache_path {
            Some(path) => Arc::new(HoldingsCache::open(path.clone()).await?),
            None => Arc::new(HoldingsCache::in_memory()),
        };

        info!(
            "Portfolio tracker ready (endpoint: {}, cache: {})",
            settings.endpoint_url,
            settings
                .cache_path
                .as_ref()
                .map_or_else(|| "in-memory".to_string(), |p| p.display().to_string())
        );

        Ok(Self::from_parts(settings, provider, probe, store))
    }

    /// Build a tracker from caller-supplied collaborators. Only
    /// `settings.retry` is read here.
    pub fn from_parts(
        settings: Settings,
        provider: Arc<dyn HoldingsProvider>,
        probe: Arc<dyn ConnectivityProbe>,
        store: Arc<dyn HoldingsStore>,
    ) -> Self {
        let fetch_service = FetchService::new(provider, settings.retry.clone());
        let repository = Arc::new(PortfolioRepository::new(fetch_service, store, probe));
        let view_model = PortfolioViewModel::new(Arc::clone(&repository));

        Self {
            settings,
            repository,
            view_model,
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn repository(&self) -> &Arc<PortfolioRepository> {
        &self.repository
    }

    pub fn view_model(&self) -> &PortfolioViewModel {
        &self.view_model
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Live view of the cached holdings.
    pub fn observe_holdings(&self) -> watch::Receiver<HoldingsSet> {
        self.repository.observe_holdings()
    }

    /// Cached holdings as of now.
    pub async fn holdings(&self) -> Result<Vec<PortfolioItem>, CoreError> {
        self.repository.store().snapshot().await
    }

    /// Summary of the cached holdings as of now.
    pub async fn summary(&self) -> Result<PortfolioSummary, CoreError> {
        let holdings = self.holdings().await?;
        SummaryService::new().try_summarize(&holdings)
    }

    /// Run one refresh and report how it was satisfied.
    ///
    /// Unlike [`PortfolioViewModel::refresh`], the error is returned to the
    /// caller instead of being recorded. Cancelled by [`close`](Self::close).
    pub async fn refresh(&self) -> Result<RefreshOutcome, CoreError> {
        let cancel = self.view_model.lifecycle().child_token();
        self.repository.refresh(&cancel).await
    }

    pub async fn clear_cache(&self) -> Result<(), CoreError> {
        self.repository.clear_cache().await
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Cancel in-flight refreshes and stop the view model's background work.
    pub fn close(&self) {
        self.view_model.close();
    }
}
