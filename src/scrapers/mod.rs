//! News sources covering Khánh Hòa real estate.
//!
//! Every source is pure data: a [`SourceDescriptor`] naming its seed pages, its
//! fetch strategy and the [`CardSpec`] that locates article cards. The generic
//! [`CardExtractor`] interprets the card spec, so no source carries imperative
//! parsing code.
//!
//! # Built-in Sources
//!
//! | Source | Module | Strategy | Notes |
//! |--------|--------|----------|-------|
//! | Cafef | [`cafef`] | Static | Two regional tag pages |
//! | VnExpress | [`vnexpress`] | Static | Site search; drops "Nhà Trắng" (White House) hits |
//! | BatDongSan | [`batdongsan`] | Rendered | Cards are built client-side with hashed class names |
//!
//! Order matters: the aggregator deduplicates URLs globally and the first
//! source in registry order keeps a shared article.

pub mod batdongsan;
pub mod cafef;
pub mod vnexpress;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

use crate::error::ConfigError;
use crate::extract::{CardExtractor, CardSpec};
use crate::fetch::FetchStrategy;
use crate::models::{DEFAULT_CATEGORY, NewsItem};

/// Region label attached to every built-in source's items.
pub const REGION: &str = "Khanh Hoa";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Static description of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Identity used as the key of the aggregation result.
    pub name: String,
    /// Label written into each item's `source` field.
    pub site_name: String,
    /// Origin that relative links and images are resolved against.
    pub base_url: String,
    pub seeds: Vec<String>,
    #[serde(default)]
    pub strategy: FetchStrategy,
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default)]
    pub location: Option<String>,
    /// Regex patterns; items whose title matches any of them are dropped.
    #[serde(default)]
    pub exclude_titles: Vec<String>,
    pub cards: CardSpec,
}

/// A validated descriptor with its extractor compiled.
#[derive(Debug)]
pub struct Source {
    descriptor: SourceDescriptor,
    seeds: Vec<Url>,
    extractor: CardExtractor,
}

impl Source {
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the descriptor has no name or seeds, a seed
    /// is not an absolute URL, or a selector or pattern does not compile.
    pub fn new(descriptor: SourceDescriptor) -> Result<Self, ConfigError> {
        if descriptor.name.trim().is_empty() {
            return Err(ConfigError::Descriptor {
                source_name: descriptor.site_name.clone(),
                reason: "source name is empty".to_string(),
            });
        }
        if descriptor.seeds.is_empty() {
            return Err(ConfigError::Descriptor {
                source_name: descriptor.name.clone(),
                reason: "no seed URLs".to_string(),
            });
        }
        let seeds = descriptor
            .seeds
            .iter()
            .map(|seed| {
                Url::parse(seed).map_err(|source| ConfigError::Url {
                    source_name: descriptor.name.clone(),
                    url: seed.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let extractor = CardExtractor::new(&descriptor)?;
        Ok(Self {
            descriptor,
            seeds,
            extractor,
        })
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.descriptor.strategy
    }

    pub fn seeds(&self) -> &[Url] {
        &self.seeds
    }

    /// Run this source's extractor over one fetched document.
    pub fn extract(&self, document: &str, now: DateTime<Utc>) -> Vec<NewsItem> {
        self.extractor.extract(document, now)
    }
}

/// Ordered, immutable list of sources the aggregator fans out over.
#[derive(Debug)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

impl SourceRegistry {
    /// Validate and compile `descriptors`, keeping their order.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid descriptor or on a repeated source name.
    pub fn new(descriptors: Vec<SourceDescriptor>) -> Result<Self, ConfigError> {
        let mut names = HashSet::new();
        let mut sources = Vec::with_capacity(descriptors.len());
        for desc in descriptors {
            if !names.insert(desc.name.clone()) {
                return Err(ConfigError::Descriptor {
                    source_name: desc.name,
                    reason: "duplicate source name".to_string(),
                });
            }
            sources.push(Source::new(desc)?);
        }
        Ok(Self { sources })
    }

    /// The three built-in sources in their canonical order.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::new(builtin_descriptors())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Source> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(Source::name).collect()
    }
}

/// Descriptors of the built-in sources, Cafef first.
pub fn builtin_descriptors() -> Vec<SourceDescriptor> {
    vec![
        cafef::descriptor(),
        vnexpress::descriptor(),
        batdongsan::descriptor(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_order_and_strategies() {
        let reg = SourceRegistry::builtin().unwrap();
        assert_eq!(reg.names(), vec!["Cafef", "VnExpress", "BatDongSan"]);

        let strategies: Vec<_> = reg.iter().map(Source::strategy).collect();
        assert_eq!(
            strategies,
            vec![FetchStrategy::Static, FetchStrategy::Static, FetchStrategy::Rendered]
        );
        let seeds: usize = reg.iter().map(|s| s.seeds().len()).sum();
        assert_eq!(seeds, 5);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = SourceRegistry::new(vec![cafef::descriptor(), cafef::descriptor()]).unwrap_err();
        assert!(matches!(err, ConfigError::Descriptor { ref reason, .. } if reason.contains("duplicate")));
    }

    #[test]
    fn test_empty_seeds_rejected() {
        let mut desc = cafef::descriptor();
        desc.seeds.clear();
        assert!(matches!(
            Source::new(desc).unwrap_err(),
            ConfigError::Descriptor { .. }
        ));
    }

    #[test]
    fn test_relative_seed_rejected() {
        let mut desc = cafef::descriptor();
        desc.seeds = vec!["/tp-nha-trang.html".to_string()];
        assert!(matches!(Source::new(desc).unwrap_err(), ConfigError::Url { .. }));
    }

    #[test]
    fn test_descriptor_from_yaml_uses_defaults() {
        let yaml = r#"
name: Baokhanhhoa
site_name: baokhanhhoa.vn
base_url: https://baokhanhhoa.vn
seeds: ["https://baokhanhhoa.vn/kinh-te"]
cards:
  card: article.story
  title: [h3 a]
  link: [[h3 a, href]]
"#;
        let desc: SourceDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(desc.strategy, FetchStrategy::Static);
        assert_eq!(desc.default_category, DEFAULT_CATEGORY);
        assert!(desc.exclude_titles.is_empty());
        assert!(Source::new(desc).is_ok());
    }

    #[test]
    fn test_empty_registry_is_valid() {
        let reg = SourceRegistry::new(vec![]).unwrap();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
    }
}
