//! # Khanh Hoa News
//!
//! Aggregates real-estate news about Khánh Hòa province from several
//! Vietnamese news sites, normalizes the article cards into [`NewsItem`]s,
//! deduplicates them across sources, and serves the result through a
//! time-bounded in-memory cache.
//!
//! ## Architecture
//!
//! 1. **Fetching** ([`fetch`]): static pages over HTTP, client-rendered pages
//!    through a headless browser
//! 2. **Extraction** ([`extract`], [`scrapers`]): declarative per-source card
//!    specs interpreted by one generic engine
//! 3. **Aggregation** ([`aggregate`]): bounded concurrent fan-out over every
//!    seed, sequential merge with global URL dedup and recency sort
//! 4. **Caching** ([`cache`]): freshness window with graceful degradation
//!
//! ## Usage
//!
//! ```ignore
//! let settings = Settings::default();
//! let service = khanhhoa_news::build_service(&settings)?;
//! let news = service.current_news().await;
//! ```

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod dates;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod outputs;
pub mod scrapers;
pub mod utils;

use std::sync::Arc;

pub use aggregate::{Aggregate, Aggregator, AggregatorOptions};
pub use cache::{CacheEntry, CacheState, NewsCache};
pub use config::Settings;
pub use error::{AggregateError, ConfigError, FetchError};
pub use fetch::{BrowserFetcher, FetchStrategy, Fetcher, Fetchers, HttpFetcher};
pub use models::{NewsItem, NewsMap};
pub use scrapers::{SourceDescriptor, SourceRegistry};

/// The cache over the production aggregator.
pub type NewsService = NewsCache<Aggregator>;

/// The production fetcher pair described by `settings`.
pub fn build_fetchers(settings: &Settings) -> Result<Fetchers, ConfigError> {
    let http = HttpFetcher::new(&settings.user_agent, settings.fetch_timeout(), settings.revalidate())?;
    let browser = BrowserFetcher::new(
        &settings.browser,
        settings.user_agent.clone(),
        settings.render_budget(),
        settings.render_timeout(),
    );
    Ok(Fetchers::new(Arc::new(http), Arc::new(browser)))
}

/// Wire registry, fetchers, aggregator and cache from `settings`.
///
/// # Errors
///
/// Any invalid source descriptor or HTTP client setup failure.
pub fn build_service(settings: &Settings) -> Result<NewsService, ConfigError> {
    build_service_with(settings, build_fetchers(settings)?)
}

/// Like [`build_service`] but with caller-supplied fetchers.
pub fn build_service_with(settings: &Settings, fetchers: Fetchers) -> Result<NewsService, ConfigError> {
    let registry = settings.registry()?;
    let aggregator = Aggregator::new(registry, fetchers, settings.aggregator_options());
    Ok(NewsCache::new(aggregator, settings.freshness_window()))
}
