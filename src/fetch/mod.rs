//! Document retrieval for seed URLs.
//!
//! Two strategies sit behind one [`Fetcher`] trait:
//!
//! | Strategy | Type | Used for |
//! |----------|------|----------|
//! | [`FetchStrategy::Static`] | [`HttpFetcher`] | Server-rendered listing pages |
//! | [`FetchStrategy::Rendered`] | [`BrowserFetcher`] | Pages that build their cards with JavaScript |
//!
//! Fetchers report failures as [`FetchError`]; the aggregator absorbs them per
//! unit, so one failing seed never affects another.

pub mod browser;
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::error::FetchError;

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;

/// Retrieves the raw document for one URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// How a source's seed pages must be retrieved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Plain HTTP GET.
    #[default]
    Static,
    /// Full headless-browser render.
    Rendered,
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStrategy::Static => write!(f, "static"),
            FetchStrategy::Rendered => write!(f, "rendered"),
        }
    }
}

/// One fetcher per strategy.
#[derive(Clone)]
pub struct Fetchers {
    pub static_fetcher: Arc<dyn Fetcher>,
    pub rendered_fetcher: Arc<dyn Fetcher>,
}

impl Fetchers {
    pub fn new(static_fetcher: Arc<dyn Fetcher>, rendered_fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            static_fetcher,
            rendered_fetcher,
        }
    }

    /// Use the same fetcher for both strategies.
    pub fn uniform(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::new(fetcher.clone(), fetcher)
    }

    pub fn for_strategy(&self, strategy: FetchStrategy) -> &Arc<dyn Fetcher> {
        match strategy {
            FetchStrategy::Static => &self.static_fetcher,
            FetchStrategy::Rendered => &self.rendered_fetcher,
        }
    }
}

impl fmt::Debug for Fetchers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetchers").finish_non_exhaustive()
    }
}
