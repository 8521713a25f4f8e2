//! VnExpress site search.
//!
//! Search results are server-rendered `.item-news.item-news-common` cards that
//! carry the canonical article URL and the publish time (Unix seconds) as
//! `data-url` / `data-publishtime` attributes on the card itself.
//!
//! Searching "nha trang" without diacritics also matches "Nhà Trắng" (the
//! White House), so those titles are excluded.

use super::{REGION, SourceDescriptor};
use crate::extract::{CardSpec, DateFormat, SelectorSpec};
use crate::fetch::FetchStrategy;
use crate::models::DEFAULT_CATEGORY;

pub const NAME: &str = "VnExpress";

const SEARCH_URL: &str = "https://timkiem.vnexpress.net/";

fn search(param: &str, query: &str) -> String {
    format!("{SEARCH_URL}?{param}={}", urlencoding::encode(query))
}

pub fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        name: NAME.to_string(),
        site_name: "VnExpress".to_string(),
        base_url: "https://vnexpress.net".to_string(),
        seeds: vec![search("q", "nha trang"), search("search_q", "khanh hoa")],
        strategy: FetchStrategy::Static,
        default_category: DEFAULT_CATEGORY.to_string(),
        location: Some(REGION.to_string()),
        exclude_titles: vec!["Nhà Trắng".to_string()],
        cards: CardSpec {
            card: ".item-news.item-news-common".to_string(),
            title: vec![
                SelectorSpec::attr(".thumb-art a", "title"),
                SelectorSpec::text(".title-news a"),
            ],
            link: vec![
                SelectorSpec::attr("", "data-url"),
                SelectorSpec::attr(".title-news a", "href"),
            ],
            image: vec![
                SelectorSpec::attr(".thumb-art img", "data-src"),
                SelectorSpec::attr(".thumb-art img", "src"),
            ],
            summary: vec![SelectorSpec::text(".description")],
            date: vec![SelectorSpec::attr("", "data-publishtime")],
            date_format: DateFormat::UnixSeconds,
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::Source;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    const RESULTS: &str = r#"
<html><body><div class="width_common list-news-subfolder">
  <article class="item-news item-news-common" data-url="https://vnexpress.net/nha-trang-lap-quy-hoach-4745001.html" data-publishtime="1715580000">
    <div class="thumb-art"><a href="https://vnexpress.net/nha-trang-lap-quy-hoach-4745001.html" title="Nha Trang lập quy hoạch đô thị"><img src="data:image/gif;base64,R0lGOD" data-src="https://i1-vnexpress.vnecdn.net/nt.jpg"></a></div>
    <h3 class="title-news"><a href="https://vnexpress.net/nha-trang-lap-quy-hoach-4745001.html">Nha Trang lập quy hoạch đô thị</a></h3>
    <p class="description"><a href="https://vnexpress.net/nha-trang-lap-quy-hoach-4745001.html">Khánh Hòa điều chỉnh quy hoạch chung.</a></p>
  </article>
  <article class="item-news item-news-common" data-url="https://vnexpress.net/nha-trang-phan-doi-4745002.html" data-publishtime="1715590000">
    <div class="thumb-art"><a title="Nhà Trắng phản đối dự luật"></a></div>
  </article>
  <article class="item-news item-news-common" data-url="https://vnexpress.net/cam-lam-4745003.html">
    <h3 class="title-news"><a href="https://vnexpress.net/cam-lam-4745003.html">Cam Lâm thu hút đầu tư</a></h3>
  </article>
  <article class="item-news item-news-common item-news-ads"></article>
</div></body></html>
"#;

    #[test]
    fn test_seeds_are_url_encoded() {
        assert_eq!(
            descriptor().seeds,
            vec![
                "https://timkiem.vnexpress.net/?q=nha%20trang",
                "https://timkiem.vnexpress.net/?search_q=khanh%20hoa",
            ]
        );
    }

    #[test]
    fn test_extracts_results_and_drops_white_house() {
        let source = Source::new(descriptor()).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 14, 3, 0, 0).unwrap();
        let items = source.extract(RESULTS, now);

        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Nha Trang lập quy hoạch đô thị", "Cam Lâm thu hút đầu tư"]);

        let first = &items[0];
        assert_eq!(first.url, "https://vnexpress.net/nha-trang-lap-quy-hoach-4745001.html");
        assert_eq!(first.image_url.as_deref(), Some("https://i1-vnexpress.vnecdn.net/nt.jpg"));
        assert_eq!(first.summary, "Khánh Hòa điều chỉnh quy hoạch chung.");
        assert_eq!(first.published_at.map(|t| t.timestamp()), Some(1715580000));
        assert_eq!(first.date, "13/05/2024 13:00");
        assert_eq!(first.source, "VnExpress");
    }

    #[test]
    fn test_missing_publish_time_is_epoch() {
        let source = Source::new(descriptor()).unwrap();
        let items = source.extract(RESULTS, Utc::now());
        let cam_lam = items.iter().find(|i| i.title.starts_with("Cam Lâm")).unwrap();
        assert_eq!(cam_lam.published_at, Some(DateTime::<Utc>::UNIX_EPOCH));
        assert_eq!(cam_lam.url, "https://vnexpress.net/cam-lam-4745003.html");
    }
}
