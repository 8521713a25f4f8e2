//! Error types for the aggregation pipeline.
//!
//! Only construction-time problems ([`ConfigError`]) are meant to reach the
//! caller. [`FetchError`] is absorbed at the unit boundary of the aggregator and
//! [`AggregateError`] is absorbed by the cache, so "get current news" itself
//! never fails.

use std::path::PathBuf;
use std::time::Duration;

/// Failure to retrieve a document for one seed URL.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Network, DNS, TLS or body-decoding failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    /// The rendering session could not be launched or produced no document.
    #[error("rendering {url} failed: {reason}")]
    Render { url: String, reason: String },

    /// The fetch did not finish before its deadline.
    #[error("fetching {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }

    /// Returns true if this is a Status error.
    pub fn is_status(&self) -> bool {
        matches!(self, FetchError::Status { .. })
    }
}

/// Invalid settings or source descriptors, detected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing settings from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("source {source_name}: invalid selector {selector:?}: {reason}")]
    Selector {
        source_name: String,
        selector: String,
        reason: String,
    },

    #[error("source {source_name}: invalid exclusion pattern: {source}")]
    Pattern {
        source_name: String,
        #[source]
        source: regex::Error,
    },

    #[error("source {source_name}: invalid URL {url:?}: {source}")]
    Url {
        source_name: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("source {source_name}: {reason}")]
    Descriptor { source_name: String, reason: String },

    #[error("building HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Failure of a whole aggregation run, as opposed to a single unit.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// The concurrency limiters were closed, so no unit can be scheduled.
    #[error("aggregator is shut down")]
    Closed(#[from] tokio::sync::AcquireError),

    #[error("aggregation failed: {0}")]
    Other(String),
}
