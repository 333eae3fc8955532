use log::{debug, warn};
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::services::portfolio_repository::PortfolioRepository;
use crate::services::summary_service::SummaryService;
use crate::storage::traits::HoldingsSet;

use super::ui_state::{PortfolioTab, PortfolioUiState, LOAD_ERROR_MESSAGE, PROCESSING_ERROR_MESSAGE};

/// Presentable state for the holdings screen.
///
/// Combines the cached holdings stream with the expand/collapse toggle into a
/// single [`PortfolioUiState`] stream. The first call to [`ui_state`] starts
/// the projection and fires one automatic refresh; refresh failures go to a
/// separate [`refresh_error`] slot and never replace the primary state.
///
/// Handles are cheap to clone and share one instance. Background work stops
/// on [`close`] or when the last handle is dropped.
///
/// [`ui_state`]: PortfolioViewModel::ui_state
/// [`refresh_error`]: PortfolioViewModel::refresh_error
/// [`close`]: PortfolioViewModel::close
#[derive(Clone)]
pub struct PortfolioViewModel {
    inner: Arc<Inner>,
}

struct Inner {
    repository: Arc<PortfolioRepository>,
    summary_service: SummaryService,
    state: Arc<watch::Sender<PortfolioUiState>>,
    is_expanded: watch::Sender<bool>,
    selected_tab: watch::Sender<PortfolioTab>,
    refresh_error: Arc<watch::Sender<Option<String>>>,
    started: AtomicBool,
    lifecycle: CancellationToken,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.lifecycle.cancel();
    }
}

impl std::fmt::Debug for PortfolioViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioViewModel")
            .field("state", &*self.inner.state.borrow())
            .field("is_expanded", &*self.inner.is_expanded.borrow())
            .field("selected_tab", &*self.inner.selected_tab.borrow())
            .field("closed", &self.inner.lifecycle.is_cancelled())
            .finish()
    }
}

impl PortfolioViewModel {
    pub fn new(repository: Arc<PortfolioRepository>) -> Self {
        Self::with_summary_service(repository, SummaryService::new())
    }

    pub fn with_summary_service(
        repository: Arc<PortfolioRepository>,
        summary_service: SummaryService,
    ) -> Self {
        let (state, _) = watch::channel(PortfolioUiState::Loading);
        let (is_expanded, _) = watch::channel(false);
        let (selected_tab, _) = watch::channel(PortfolioTab::default());
        let (refresh_error, _) = watch::channel(None);

        Self {
            inner: Arc::new(Inner {
                repository,
                summary_service,
                state: Arc::new(state),
                is_expanded,
                selected_tab,
                refresh_error: Arc::new(refresh_error),
                started: AtomicBool::new(false),
                lifecycle: CancellationToken::new(),
            }),
        }
    }

    /// Subscribe to the screen state. Starts at `Loading`.
    ///
    /// The first call starts the projection task and one automatic refresh;
    /// later calls only subscribe.
    ///
    /// # Panics
    ///
    /// The first call panics when made outside a Tokio runtime.
    pub fn ui_state(&self) -> watch::Receiver<PortfolioUiState> {
        let receiver = self.inner.state.subscribe();
        if !self.inner.started.swap(true, Ordering::AcqRel) {
            self.start();
        }
        receiver
    }

    /// The state as of now, without subscribing.
    #[must_use]
    pub fn current_state(&self) -> PortfolioUiState {
        self.inner.state.borrow().clone()
    }

    /// Refresh from the network (or the cache) and wait for it to finish.
    ///
    /// A failure is recorded in [`refresh_error`](Self::refresh_error);
    /// cancellation is not.
    pub async fn refresh(&self) {
        run_refresh(
            Arc::clone(&self.inner.repository),
            Arc::clone(&self.inner.refresh_error),
            self.inner.lifecycle.child_token(),
        )
        .await;
    }

    /// Like [`refresh`](Self::refresh), on a spawned task.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn refresh_in_background(&self) -> JoinHandle<()> {
        tokio::spawn(run_refresh(
            Arc::clone(&self.inner.repository),
            Arc::clone(&self.inner.refresh_error),
            self.inner.lifecycle.child_token(),
        ))
    }

    /// Flip the summary panel between expanded and collapsed.
    pub fn toggle_expanded(&self) {
        self.inner.is_expanded.send_modify(|expanded| *expanded = !*expanded);
    }

    /// Switch tabs. `Positions` has no content yet, so the state is unaffected.
    pub fn select_tab(&self, tab: PortfolioTab) {
        self.inner.selected_tab.send_replace(tab);
    }

    pub fn is_expanded(&self) -> watch::Receiver<bool> {
        self.inner.is_expanded.subscribe()
    }

    pub fn selected_tab(&self) -> watch::Receiver<PortfolioTab> {
        self.inner.selected_tab.subscribe()
    }

    /// Message of the most recent failed refresh, cleared when a new one starts.
    pub fn refresh_error(&self) -> watch::Receiver<Option<String>> {
        self.inner.refresh_error.subscribe()
    }

    /// Stop the projection and cancel any in-flight refresh.
    pub fn close(&self) {
        self.inner.lifecycle.cancel();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.lifecycle.is_cancelled()
    }

    pub(crate) fn lifecycle(&self) -> &CancellationToken {
        &self.inner.lifecycle
    }

    fn start(&self) {
        let inner = &self.inner;
        debug!("Starting portfolio projection");

        // The task holds no handle to `Inner`, so dropping the last
        // view-model handle still cancels it.
        tokio::spawn(project(
            inner.repository.observe_holdings(),
            inner.is_expanded.subscribe(),
            Arc::clone(&inner.state),
            inner.summary_service,
            inner.lifecycle.clone(),
        ));

        self.refresh_in_background();
    }
}

async fn run_refresh(
    repository: Arc<PortfolioRepository>,
    refresh_error: Arc<watch::Sender<Option<String>>>,
    cancel: CancellationToken,
) {
    refresh_error.send_if_modified(|slot| slot.take().is_some());

    match repository.refresh(&cancel).await {
        Ok(outcome) => debug!("Refresh finished: {outcome:?}"),
        Err(e) if e.is_cancellation() => debug!("Refresh cancelled"),
        Err(e) => {
            warn!("Refresh failed: {e}");
            refresh_error.send_replace(Some(e.to_string()));
        }
    }
}

async fn project(
    mut holdings: watch::Receiver<HoldingsSet>,
    mut is_expanded: watch::Receiver<bool>,
    state: Arc<watch::Sender<PortfolioUiState>>,
    summary_service: SummaryService,
    cancel: CancellationToken,
) {
    loop {
        let set = Arc::clone(&holdings.borrow_and_update());
        let expanded = *is_expanded.borrow_and_update();

        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = compute(summary_service, set, expanded) => next,
        };
        publish(&state, next);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            changed = holdings.changed() => {
                if changed.is_err() {
                    warn!("Holdings stream closed");
                    publish(
                        &state,
                        PortfolioUiState::Error {
                            message: LOAD_ERROR_MESSAGE.to_string(),
                        },
                    );
                    break;
                }
            }
            changed = is_expanded.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    debug!("Portfolio projection stopped");
}

/// Summarize on a blocking worker. Overflowing totals or a panic become an
/// `Error` state.
async fn compute(
    summary_service: SummaryService,
    holdings: HoldingsSet,
    is_expanded: bool,
) -> PortfolioUiState {
    let task = tokio::task::spawn_blocking(move || match summary_service.try_summarize(&holdings) {
        Ok(summary) => PortfolioUiState::Success {
            holdings: holdings.to_vec(),
            summary,
            is_expanded,
        },
        Err(e) => {
            warn!("Portfolio aggregation failed: {e}");
            PortfolioUiState::Error {
                message: PROCESSING_ERROR_MESSAGE.to_string(),
            }
        }
    });

    match task.await {
        Ok(state) => state,
        Err(e) => {
            let message = if e.is_panic() {
                panic_message(e.into_panic())
            } else {
                PROCESSING_ERROR_MESSAGE.to_string()
            };
            warn!("Portfolio aggregation failed: {message}");
            PortfolioUiState::Error { message }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        PROCESSING_ERROR_MESSAGE.to_string()
    }
}

/// Publish `next` unless it is a `Success` equal to the current state.
fn publish(state: &watch::Sender<PortfolioUiState>, next: PortfolioUiState) {
    state.send_if_modified(|current| {
        if next.is_success() && *current == next {
            return false;
        }
        *current = next;
        true
    });
}
