//! Data models for normalized news records.
//!
//! This module defines the shapes shared by every stage of the pipeline:
//! - [`NewsItem`]: One article card, normalized from any source's markup
//! - [`NewsMap`]: The aggregation result, source identity to ordered items
//!
//! Items are serialized with camelCase keys because that is the shape the
//! presentation layer consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category used when a source does not tag its articles.
pub const DEFAULT_CATEGORY: &str = "Real Estate";

/// Aggregation output: source identity (e.g. `"Cafef"`) to its articles,
/// most recent first.
pub type NewsMap = BTreeMap<String, Vec<NewsItem>>;

/// A single article as extracted from a source listing page.
///
/// # Fields
///
/// * `url` - Absolute link to the article; the deduplication key
/// * `date` - Publication date as the source displays it
/// * `published_at` - The same date normalized to UTC, when it could be parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    /// Display headline, never empty.
    pub title: String,
    /// Canonical absolute article URL.
    pub url: String,
    /// Absolute thumbnail URL, if the card carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Plain-text excerpt; empty when the card has none.
    pub summary: String,
    /// Source-native date text.
    pub date: String,
    /// Canonical publication timestamp.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Site label of the originating source, e.g. `"Cafef.vn"`.
    pub source: String,
    /// Comma-separated tags, or [`DEFAULT_CATEGORY`].
    pub category: String,
    /// Free-text region label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl NewsItem {
    /// Ordering key for recency sorts. Items without a parseable date sort as
    /// the Unix epoch, i.e. oldest.
    pub fn sort_key(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}
