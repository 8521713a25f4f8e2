//! Fan-out/fan-in over every (source, seed URL) pair.
//!
//! Each pair is one *unit*: fetch the seed with the source's strategy, then run
//! the source's extractor. Units are plain futures awaited together with
//! [`join_all`] on the caller's task, so I/O overlaps while parsing stays
//! sequential.
//!
//! Fault isolation per unit:
//! - fetch errors and deadline expiry log a warning and yield no items
//! - a panicking unit is caught and yields no items
//!
//! Only a closed limiter (after [`Aggregator::shutdown`]) fails the whole run.
//!
//! Results are merged sequentially after all units resolve, in registry order
//! then seed order. A URL seen earlier in that order, under any source, is
//! dropped; each source's list is then stably sorted newest first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::join_all;
use std::cmp::Reverse;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::error::AggregateError;
use crate::fetch::{FetchStrategy, Fetchers};
use crate::models::{NewsItem, NewsMap};
use crate::scrapers::{Source, SourceRegistry};

/// Produces one complete news mapping per call.
#[async_trait]
pub trait Aggregate: Send + Sync {
    async fn aggregate(&self) -> Result<NewsMap, AggregateError>;
}

/// Concurrency limits and per-unit deadlines.
#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    pub static_concurrency: usize,
    pub render_concurrency: usize,
    pub fetch_timeout: Duration,
    pub render_timeout: Duration,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            static_concurrency: 8,
            render_concurrency: 2,
            fetch_timeout: Duration::from_secs(30),
            render_timeout: Duration::from_secs(90),
        }
    }
}

#[derive(Debug)]
pub struct Aggregator {
    registry: SourceRegistry,
    fetchers: Fetchers,
    static_limit: Semaphore,
    render_limit: Semaphore,
    fetch_timeout: Duration,
    render_timeout: Duration,
}

impl Aggregator {
    pub fn new(registry: SourceRegistry, fetchers: Fetchers, options: AggregatorOptions) -> Self {
        if registry.is_empty() {
            warn!("Aggregator has no sources; every run yields an empty mapping");
        }
        Self {
            registry,
            fetchers,
            static_limit: Semaphore::new(options.static_concurrency.max(1)),
            render_limit: Semaphore::new(options.render_concurrency.max(1)),
            fetch_timeout: options.fetch_timeout,
            render_timeout: options.render_timeout,
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Close both limiters. Units already holding a permit finish; every
    /// later run fails with [`AggregateError::Closed`].
    pub fn shutdown(&self) {
        self.static_limit.close();
        self.render_limit.close();
        info!("Aggregator shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.static_limit.is_closed() && self.render_limit.is_closed()
    }

    fn limits(&self, strategy: FetchStrategy) -> (&Semaphore, Duration) {
        match strategy {
            FetchStrategy::Static => (&self.static_limit, self.fetch_timeout),
            FetchStrategy::Rendered => (&self.render_limit, self.render_timeout),
        }
    }

    /// Fetch and extract one seed. Fetch failures and deadline expiry resolve
    /// to an empty list; only limiter closure is an error.
    #[instrument(level = "info", skip_all, fields(source = %source.name(), url = %seed))]
    async fn run_unit(
        &self,
        source: &Source,
        seed: &Url,
        now: DateTime<Utc>,
    ) -> Result<Vec<NewsItem>, AggregateError> {
        let strategy = source.strategy();
        let (limit, deadline) = self.limits(strategy);
        let _permit = limit.acquire().await?;

        let fetcher = self.fetchers.for_strategy(strategy);
        let document = match tokio::time::timeout(deadline, fetcher.fetch(seed)).await {
            Ok(Ok(doc)) => doc,
            Ok(Err(e)) => {
                let kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_status() {
                    "status"
                } else {
                    "other"
                };
                warn!(error = %e, kind, %strategy, "Fetch failed; unit yields no items");
                return Ok(Vec::new());
            }
            Err(_) => {
                warn!(after_ms = deadline.as_millis() as u64, %strategy, "Fetch deadline expired; unit yields no items");
                return Ok(Vec::new());
            }
        };

        let items = source.extract(&document, now);
        debug!(count = items.len(), "Unit finished");
        Ok(items)
    }

    async fn guarded_unit(
        &self,
        source: &Source,
        seed: &Url,
        now: DateTime<Utc>,
    ) -> Result<Vec<NewsItem>, AggregateError> {
        match AssertUnwindSafe(self.run_unit(source, seed, now)).catch_unwind().await {
            Ok(result) => result,
            Err(_) => {
                error!(source = %source.name(), url = %seed, "Unit panicked; treating as empty");
                Ok(Vec::new())
            }
        }
    }
}

/// Merge unit results in order, dropping URLs already seen under any source.
fn merge<'a>(results: impl IntoIterator<Item = (&'a str, Vec<NewsItem>)>) -> NewsMap {
    let mut seen: HashSet<String> = HashSet::new();
    let mut map = NewsMap::new();
    for (name, items) in results {
        let kept: Vec<NewsItem> = items
            .into_iter()
            .filter(|item| seen.insert(item.url.clone()))
            .collect();
        if !kept.is_empty() {
            map.entry(name.to_string()).or_default().extend(kept);
        }
    }
    for items in map.values_mut() {
        items.sort_by_key(|item| Reverse(item.sort_key()));
    }
    map
}

#[async_trait]
impl Aggregate for Aggregator {
    #[instrument(level = "info", skip_all)]
    async fn aggregate(&self) -> Result<NewsMap, AggregateError> {
        let t0 = Instant::now();
        let now = Utc::now();

        let units: Vec<(&Source, &Url)> = self
            .registry
            .iter()
            .flat_map(|source| source.seeds().iter().map(move |seed| (source, seed)))
            .collect();

        let results = join_all(
            units
                .iter()
                .map(|(source, seed)| self.guarded_unit(source, seed, now)),
        )
        .await;

        let mut resolved = Vec::with_capacity(units.len());
        for ((source, _), result) in units.iter().zip(results) {
            resolved.push((source.name(), result?));
        }
        let map = merge(resolved);

        for (name, items) in &map {
            info!(source = %name, count = items.len(), "Source merged");
        }
        info!(
            sources = self.registry.len(),
            units = units.len(),
            sources_with_items = map.len(),
            total = map.values().map(Vec::len).sum::<usize>(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Aggregation run complete"
        );
        Ok(map)
    }
}
