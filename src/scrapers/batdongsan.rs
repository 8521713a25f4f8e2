//! Batdongsan.com.vn regional news.
//!
//! The page is a client-rendered app: cards only exist after scripts run, so
//! this source uses the rendered strategy. Class names are CSS-module hashes
//! (`ArticleCardLarge_articleWrapper__3kX9a`) and are matched by prefix
//! substring.

use super::{REGION, SourceDescriptor};
use crate::extract::{CardSpec, SelectorSpec};
use crate::fetch::FetchStrategy;
use crate::models::DEFAULT_CATEGORY;

pub const NAME: &str = "BatDongSan";

pub fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        name: NAME.to_string(),
        site_name: "BatDongSan.com.vn".to_string(),
        base_url: "https://batdongsan.com.vn".to_string(),
        seeds: vec!["https://batdongsan.com.vn/tin-tuc/bat-dong-san-khanh-hoa".to_string()],
        strategy: FetchStrategy::Rendered,
        default_category: DEFAULT_CATEGORY.to_string(),
        location: Some(REGION.to_string()),
        exclude_titles: vec![],
        cards: CardSpec {
            card: "[class*='ArticleCardLarge_articleWrapper']".to_string(),
            title: vec![SelectorSpec::text("h3 a"), SelectorSpec::text("h3")],
            link: vec![SelectorSpec::attr("h3 a", "href"), SelectorSpec::attr("a", "href")],
            image: vec![SelectorSpec::attr("[class*='ArticleCardLarge_mediaImage'] img", "src")],
            summary: vec![SelectorSpec::text("[class*='ArticleCardLarge_articleExcerpt']")],
            date: vec![SelectorSpec::text("[class*='ArticleCardLarge_articleDate']")],
            categories: vec![SelectorSpec::text("[class*='Tag_tagsItem']")],
            ..Default::default()
        },
    }
}
