//! Time-bounded result cache in front of the aggregator.
//!
//! A single in-memory slot holds the last successful aggregation result and
//! the instant it was produced. The slot moves through three states:
//!
//! | State | Meaning | `current_news()` |
//! |-------|---------|------------------|
//! | [`CacheState::Empty`] | No successful run yet | Runs the aggregator |
//! | [`CacheState::Fresh`] | Entry younger than the freshness window | Returns the entry |
//! | [`CacheState::Stale`] | Entry at or past the window | Runs the aggregator |
//!
//! A failed or panicking run leaves the slot untouched: callers get the
//! previous data (or an empty map when there is none) and the next call
//! retries.
//!
//! Entries are swapped as a whole `Arc`, so readers never see a partial entry.

use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::aggregate::Aggregate;
use crate::error::AggregateError;
use crate::models::NewsMap;

/// One successful aggregation result.
#[derive(Debug)]
pub struct CacheEntry {
    pub data: Arc<NewsMap>,
    /// Monotonic time of the run, used for freshness.
    pub fetched_at: Instant,
    /// Wall-clock time of the run, for display and logs.
    pub fetched_at_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Fresh,
    Stale,
}

/// Owns the aggregator and the cached result. Share it behind an `Arc`.
#[derive(Debug)]
pub struct NewsCache<A> {
    aggregator: A,
    freshness_window: Duration,
    slot: RwLock<Option<Arc<CacheEntry>>>,
    refresh: Mutex<()>,
}

impl<A: Aggregate> NewsCache<A> {
    pub fn new(aggregator: A, freshness_window: Duration) -> Self {
        Self {
            aggregator,
            freshness_window,
            slot: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    pub fn aggregator(&self) -> &A {
        &self.aggregator
    }

    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// The current entry, fresh or not.
    pub async fn entry(&self) -> Option<Arc<CacheEntry>> {
        self.slot.read().await.clone()
    }

    pub async fn state(&self) -> CacheState {
        match self.entry().await {
            None => CacheState::Empty,
            Some(entry) if self.is_fresh(&entry) => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.fetched_at.elapsed() < self.freshness_window
    }

    async fn fresh_entry(&self) -> Option<Arc<CacheEntry>> {
        self.entry().await.filter(|entry| self.is_fresh(entry))
    }

    /// Get the current news mapping. Never fails.
    ///
    /// Concurrent callers that find the slot empty or stale queue behind one
    /// refresh; whoever acquires the refresh lock after it completes sees the
    /// fresh entry and returns it without running the aggregator again.
    #[instrument(level = "info", skip_all)]
    pub async fn current_news(&self) -> Arc<NewsMap> {
        if let Some(entry) = self.fresh_entry().await {
            debug!("Serving fresh cache entry");
            return entry.data.clone();
        }

        let _refresh = self.refresh.lock().await;
        if let Some(entry) = self.fresh_entry().await {
            debug!("Entry refreshed by a concurrent caller");
            return entry.data.clone();
        }

        let outcome = AssertUnwindSafe(self.aggregator.aggregate())
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(AggregateError::Other("aggregation run panicked".to_string())));

        match outcome {
            Ok(map) => {
                let entry = Arc::new(CacheEntry {
                    data: Arc::new(map),
                    fetched_at: Instant::now(),
                    fetched_at_utc: Utc::now(),
                });
                *self.slot.write().await = Some(entry.clone());
                info!(
                    sources = entry.data.len(),
                    fetched_at = %entry.fetched_at_utc.to_rfc3339(),
                    "Cache refreshed"
                );
                entry.data.clone()
            }
            Err(e) => {
                error!(error = %e, "Aggregation run failed");
                match self.entry().await {
                    Some(prev) => {
                        warn!(
                            age_secs = prev.fetched_at.elapsed().as_secs(),
                            "Serving last known-good data"
                        );
                        prev.data.clone()
                    }
                    None => {
                        warn!("No previous data; serving empty mapping");
                        Arc::new(NewsMap::new())
                    }
                }
            }
        }
    }
}
