//! Runtime settings, loaded from an optional YAML file.
//!
//! Every key has a default, so an empty file (or no file at all) gives the
//! stock configuration: 30 minute freshness window, hourly static
//! revalidation, the built-in source registry.
//!
//! ```yaml
//! freshness_window_secs: 900
//! render_concurrency: 1
//! browser: /usr/bin/chromium-browser
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::aggregate::AggregatorOptions;
use crate::error::ConfigError;
use crate::scrapers::{SourceDescriptor, SourceRegistry};

/// Desktop Chrome identity sent by both fetch strategies.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// How long a successful aggregation is served without re-fetching.
    pub freshness_window_secs: u64,
    /// Minimum interval between downloads of the same static seed page.
    pub revalidate_secs: u64,
    pub fetch_timeout_secs: u64,
    pub render_timeout_secs: u64,
    /// Virtual time the browser grants page scripts before dumping the DOM.
    pub render_budget_ms: u64,
    pub static_concurrency: usize,
    pub render_concurrency: usize,
    pub user_agent: String,
    /// Headless browser executable.
    pub browser: String,
    /// Replaces the built-in registry when present.
    pub sources: Option<Vec<SourceDescriptor>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            freshness_window_secs: 30 * 60,
            revalidate_secs: 60 * 60,
            fetch_timeout_secs: 30,
            render_timeout_secs: 90,
            render_budget_ms: 10_000,
            static_concurrency: 8,
            render_concurrency: 2,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            browser: "chromium".to_string(),
            sources: None,
        }
    }
}

impl Settings {
    /// Read settings from a YAML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file cannot be read, [`ConfigError::Parse`]
    /// if it is not valid settings YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), custom_sources = settings.sources.is_some(), "Loaded settings");
        Ok(settings)
    }

    /// Parse settings from YAML text. Blank input yields the defaults.
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_window_secs)
    }

    pub fn revalidate(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn render_budget(&self) -> Duration {
        Duration::from_millis(self.render_budget_ms)
    }

    pub fn aggregator_options(&self) -> AggregatorOptions {
        AggregatorOptions {
            static_concurrency: self.static_concurrency,
            render_concurrency: self.render_concurrency,
            fetch_timeout: self.fetch_timeout(),
            render_timeout: self.render_timeout(),
        }
    }

    /// The configured sources, or the built-in registry when none are given.
    pub fn registry(&self) -> Result<SourceRegistry, ConfigError> {
        match &self.sources {
            Some(descriptors) => SourceRegistry::new(descriptors.clone()),
            None => SourceRegistry::builtin(),
        }
    }
}
