//! Cafef regional tag pages.
//!
//! Server-rendered listing at `cafef.vn/<tag>.html`; each article is a
//! `.tlitem` inside `.list-main`. The `.time` span usually carries an ISO
//! timestamp in its `title` attribute and a short display date as text.

use super::{REGION, SourceDescriptor};
use crate::extract::{CardSpec, SelectorSpec};
use crate::fetch::FetchStrategy;
use crate::models::DEFAULT_CATEGORY;

pub const NAME: &str = "Cafef";

pub fn descriptor() -> SourceDescriptor {
    SourceDescriptor {
        name: NAME.to_string(),
        site_name: "Cafef.vn".to_string(),
        base_url: "https://cafef.vn".to_string(),
        seeds: vec![
            "https://cafef.vn/tp-nha-trang.html".to_string(),
            "https://cafef.vn/tinh-khanh-hoa.html".to_string(),
        ],
        strategy: FetchStrategy::Static,
        default_category: DEFAULT_CATEGORY.to_string(),
        location: Some(REGION.to_string()),
        exclude_titles: vec![],
        cards: CardSpec {
            card: ".list-main .tlitem".to_string(),
            title: vec![SelectorSpec::text("h3 a")],
            link: vec![SelectorSpec::attr("h3 a", "href")],
            image: vec![
                SelectorSpec::attr(".avatar img", "src"),
                SelectorSpec::attr(".avatar img", "data-src"),
            ],
            summary: vec![SelectorSpec::text(".sapo")],
            date: vec![SelectorSpec::attr(".time", "title"), SelectorSpec::text(".time")],
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::Source;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    const LISTING: &str = r#"
<!DOCTYPE html>
<html><body>
<div class="list-main">
  <div class="tlitem box-category-item">
    <a class="avatar" href="/nha-trang-188240513.chn"><img src="https://cafefcdn.com/thumb/nt.jpg" alt=""></a>
    <h3><a href="/nha-trang-188240513.chn" title="">Nha Trang duyệt quy hoạch ven biển</a></h3>
    <span class="time time-ago" title="2024-05-13T09:15:00">13/05/2024</span>
    <p class="sapo">UBND tỉnh phê duyệt đồ án quy hoạch phân khu.</p>
  </div>
  <div class="tlitem box-category-item">
    <a class="avatar"><img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=" data-src="//cafefcdn.com/thumb/cr.jpg"></a>
    <h3><a href="https://cafef.vn/cam-ranh-188240510.chn">Cam Ranh   đón
      dự án mới</a></h3>
    <span class="time">10/05/2024</span>
  </div>
  <div class="tlitem box-category-item">
    <h3><a>Bài viết thiếu liên kết</a></h3>
  </div>
</div>
<div class="sidebar"><div class="tlitem"><h3><a href="/quang-cao.chn">Quảng cáo</a></h3></div></div>
</body></html>
"#;

    #[test]
    fn test_extracts_listing_cards() {
        let source = Source::new(descriptor()).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 14, 3, 0, 0).unwrap();
        let items = source.extract(LISTING, now);

        let urls: Vec<_> = items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://cafef.vn/nha-trang-188240513.chn",
                "https://cafef.vn/cam-ranh-188240510.chn",
            ]
        );

        let first = &items[0];
        assert_eq!(first.title, "Nha Trang duyệt quy hoạch ven biển");
        assert_eq!(first.image_url.as_deref(), Some("https://cafefcdn.com/thumb/nt.jpg"));
        assert_eq!(first.summary, "UBND tỉnh phê duyệt đồ án quy hoạch phân khu.");
        assert_eq!(first.published_at, Some(Utc.with_ymd_and_hms(2024, 5, 13, 2, 15, 0).unwrap()));
        assert_eq!(first.source, "Cafef.vn");
        assert_eq!(first.category, DEFAULT_CATEGORY);
        assert_eq!(first.location.as_deref(), Some(REGION));

        let second = &items[1];
        assert_eq!(second.title, "Cam Ranh đón dự án mới");
        assert_eq!(second.image_url.as_deref(), Some("https://cafefcdn.com/thumb/cr.jpg"));
        assert_eq!(second.summary, "");
        assert_eq!(second.date, "10/05/2024");
    }
}
