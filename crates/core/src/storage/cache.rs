use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use crate::errors::CoreError;
use crate::mapper::{cached_to_item, item_to_cached};
use crate::models::holding::{CachedHolding, PortfolioItem};

use super::manager::StorageManager;
use super::traits::{HoldingsSet, HoldingsStore};

/// The holdings cache: rows keyed by symbol, optionally backed by a file.
///
/// Writers serialize on an async mutex; each committed batch is persisted
/// first (when file-backed) and then published as a whole through a `watch`
/// channel, so subscribers and snapshots never observe a partial batch.
#[derive(Debug)]
pub struct HoldingsCache {
    path: Option<PathBuf>,
    rows: Mutex<BTreeMap<String, CachedHolding>>,
    published: watch::Sender<HoldingsSet>,
}

impl HoldingsCache {
    /// A cache that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_rows(None, Vec::new())
    }

    /// Open (or create) a file-backed cache at `path`.
    ///
    /// An unreadable or outdated cache file is discarded and the cache starts
    /// empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let load_path = path.clone();
        let rows = tokio::task::spawn_blocking(move || StorageManager::load_or_discard(&load_path))
            .await
            .map_err(|e| CoreError::Storage(format!("Cache loader task failed: {e}")))??;
        debug!("Opened holdings cache {} with {} row(s)", path.display(), rows.len());
        Ok(Self::from_rows(Some(path), rows))
    }

    /// Path of the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn from_rows(path: Option<PathBuf>, rows: Vec<CachedHolding>) -> Self {
        let rows: BTreeMap<String, CachedHolding> = rows
            .into_iter()
            .map(|row| (row.symbol.clone(), row))
            .collect();
        let (published, _) = watch::channel(project(&rows));
        Self {
            path,
            rows: Mutex::new(rows),
            published,
        }
    }

    /// Persist `next`, then make it the committed set.
    async fn commit(&self, next: BTreeMap<String, CachedHolding>) -> Result<(), CoreError> {
        let mut rows = self.rows.lock().await;

        if let Some(path) = &self.path {
            let path = path.clone();
            let batch: Vec<CachedHolding> = next.values().cloned().collect();
            tokio::task::spawn_blocking(move || StorageManager::save_to_file(&batch, &path))
                .await
                .map_err(|e| CoreError::Storage(format!("Cache writer task failed: {e}")))??;
        }

        *rows = next;
        self.published.send_replace(project(&rows));
        Ok(())
    }
}

/// Domain view of the rows, in symbol order.
fn project(rows: &BTreeMap<String, CachedHolding>) -> HoldingsSet {
    Arc::new(rows.values().map(cached_to_item).collect())
}

#[async_trait]
impl HoldingsStore for HoldingsCache {
    fn observe(&self) -> watch::Receiver<HoldingsSet> {
        self.published.subscribe()
    }

    async fn snapshot(&self) -> Result<Vec<PortfolioItem>, CoreError> {
        Ok(self.published.borrow().to_vec())
    }

    async fn replace_all(&self, items: Vec<PortfolioItem>) -> Result<(), CoreError> {
        let timestamp = Utc::now().timestamp_millis();
        // Later duplicates overwrite earlier ones.
        let next: BTreeMap<String, CachedHolding> = items
            .iter()
            .map(|item| (item.symbol.clone(), item_to_cached(item, timestamp)))
            .collect();
        debug!("Replacing holdings cache with {} row(s)", next.len());
        self.commit(next).await
    }

    async fn clear(&self) -> Result<(), CoreError> {
        debug!("Clearing holdings cache");
        self.commit(BTreeMap::new()).await
    }
}
