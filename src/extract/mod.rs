//! Declarative, per-source article card extraction.
//!
//! Each source is described by a [`CardSpec`]: a CSS selector for the
//! repeating article card plus a fallback chain of [`SelectorSpec`]s for every
//! field. One generic engine, [`CardExtractor`], interprets any spec, so adding
//! a source means writing data rather than code.
//!
//! Obfuscated or build-generated class names (`ArticleCardLarge_articleWrapper__x7Yz`)
//! are matched with attribute substring selectors such as
//! `[class*='ArticleCardLarge_articleWrapper']`.
//!
//! Submodules:
//! - `select`: compiled selector chains evaluated relative to a card.

mod select;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::dates;
use crate::error::ConfigError;
use crate::models::NewsItem;
use crate::scrapers::SourceDescriptor;
use crate::utils::resolve_url;
use select::FieldChain;

/// Specifies how to read one value from a card.
///
/// Deserializes from a plain string (text content) or a two-element list
/// `[selector, attribute]`. An empty selector addresses the card element itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectorSpec {
    /// Text content of the first match, e.g. `"h3 a"`.
    Css(String),
    /// Attribute value of the first match, e.g. `["h3 a", "href"]`.
    CssAttr(String, String),
}

impl SelectorSpec {
    pub fn text(css: impl Into<String>) -> Self {
        SelectorSpec::Css(css.into())
    }

    pub fn attr(css: impl Into<String>, attr: impl Into<String>) -> Self {
        SelectorSpec::CssAttr(css.into(), attr.into())
    }

    /// The CSS part of the selector.
    pub fn css(&self) -> &str {
        match self {
            SelectorSpec::Css(css) | SelectorSpec::CssAttr(css, _) => css,
        }
    }
}

/// How the raw date token of a card is encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// Human-readable text, normalized by [`dates::parse_published`].
    #[default]
    Text,
    /// Unix seconds; missing or garbage tokens become the epoch.
    UnixSeconds,
}

/// Field-to-selector mapping for one source's article cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSpec {
    /// Selector for the repeating card element, evaluated on the whole document.
    pub card: String,
    pub title: Vec<SelectorSpec>,
    pub link: Vec<SelectorSpec>,
    #[serde(default)]
    pub image: Vec<SelectorSpec>,
    #[serde(default)]
    pub summary: Vec<SelectorSpec>,
    #[serde(default)]
    pub date: Vec<SelectorSpec>,
    #[serde(default)]
    pub date_format: DateFormat,
    /// Tags; every match of the first matching selector is kept.
    #[serde(default)]
    pub categories: Vec<SelectorSpec>,
    #[serde(default)]
    pub location: Vec<SelectorSpec>,
}

/// A [`CardSpec`] compiled against one source's settings.
#[derive(Debug)]
pub struct CardExtractor {
    source_name: String,
    site_name: String,
    base: Url,
    default_category: String,
    default_location: Option<String>,
    exclude: Vec<Regex>,
    date_format: DateFormat,
    card: Selector,
    title: FieldChain,
    link: FieldChain,
    image: FieldChain,
    summary: FieldChain,
    date: FieldChain,
    categories: FieldChain,
    location: FieldChain,
}

impl CardExtractor {
    /// Compile every selector and exclusion pattern of `desc`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an invalid base URL, CSS selector or regex.
    pub fn new(desc: &SourceDescriptor) -> Result<Self, ConfigError> {
        let source_name = desc.name.clone();
        let base = Url::parse(&desc.base_url).map_err(|source| ConfigError::Url {
            source_name: source_name.clone(),
            url: desc.base_url.clone(),
            source,
        })?;

        let spec = &desc.cards;
        let card = Selector::parse(&spec.card).map_err(|e| ConfigError::Selector {
            source_name: source_name.clone(),
            selector: spec.card.clone(),
            reason: e.to_string(),
        })?;
        let chain = |specs: &[SelectorSpec]| {
            FieldChain::compile(specs).map_err(|(selector, reason)| ConfigError::Selector {
                source_name: source_name.clone(),
                selector,
                reason,
            })
        };
        let title = chain(&spec.title)?;
        let link = chain(&spec.link)?;
        let image = chain(&spec.image)?;
        let summary = chain(&spec.summary)?;
        let date = chain(&spec.date)?;
        let categories = chain(&spec.categories)?;
        let location = chain(&spec.location)?;

        let exclude = desc
            .exclude_titles
            .iter()
            .map(|pat| Regex::new(pat))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| ConfigError::Pattern {
                source_name: source_name.clone(),
                source,
            })?;

        Ok(Self {
            site_name: desc.site_name.clone(),
            base,
            default_category: desc.default_category.clone(),
            default_location: desc.location.clone(),
            exclude,
            date_format: spec.date_format,
            card,
            title,
            link,
            image,
            summary,
            date,
            categories,
            location,
            source_name,
        })
    }

    /// Extract every usable article card from `document`.
    ///
    /// Never fails: a document without matching cards (changed markup, error
    /// page, truncated body) yields an empty vector and a warning. `now`
    /// anchors relative dates such as `2 giờ trước`.
    pub fn extract(&self, document: &str, now: DateTime<Utc>) -> Vec<NewsItem> {
        let html = Html::parse_document(document);
        let mut cards = 0usize;
        let items: Vec<NewsItem> = html
            .select(&self.card)
            .inspect(|_| cards += 1)
            .filter_map(|card| self.extract_card(card, now))
            .collect();

        if cards == 0 {
            warn!(source = %self.source_name, bytes = document.len(), "No article cards matched");
        } else {
            debug!(
                source = %self.source_name,
                cards,
                kept = items.len(),
                "Extracted article cards"
            );
        }
        items
    }

    /// Returns true if `title` matches one of the source's exclusion patterns.
    pub fn is_excluded(&self, title: &str) -> bool {
        self.exclude.iter().any(|re| re.is_match(title))
    }

    fn extract_card(&self, card: ElementRef<'_>, now: DateTime<Utc>) -> Option<NewsItem> {
        let Some(title) = self.title.first(card) else {
            debug!(source = %self.source_name, "Skipping card without title");
            return None;
        };
        let Some(url) = self.link.find_map(card, |href| resolve_url(&self.base, &href)) else {
            debug!(source = %self.source_name, %title, "Skipping card without usable link");
            return None;
        };
        if self.is_excluded(&title) {
            debug!(source = %self.source_name, %title, "Dropping excluded title");
            return None;
        }

        let image_url = self.image.find_map(card, |src| {
            if src.starts_with("data:") {
                None
            } else {
                resolve_url(&self.base, &src)
            }
        });

        let raw_date = self.date.first(card).unwrap_or_default();
        let (date, published_at) = match self.date_format {
            DateFormat::Text => {
                let parsed = dates::parse_published(&raw_date, now);
                (raw_date, parsed)
            }
            DateFormat::UnixSeconds => {
                let ts = dates::from_unix_seconds(&raw_date);
                (dates::display(ts), Some(ts))
            }
        };

        let categories = self.categories.all(card).into_iter().unique().join(", ");
        let category = if categories.is_empty() {
            self.default_category.clone()
        } else {
            categories
        };

        Some(NewsItem {
            title,
            url,
            image_url,
            summary: self.summary.first(card).unwrap_or_default(),
            date,
            published_at,
            source: self.site_name.clone(),
            category,
            location: self.location.first(card).or_else(|| self.default_location.clone()),
        })
    }
}
