//! Compiled selector chains evaluated relative to one article card.
//!
//! Key behaviors:
//! - Selectors are tried in order; the first selector yielding a non-empty
//!   value wins.
//! - Text extraction joins text nodes with spaces and normalizes whitespace.
//! - Attribute extraction returns the attribute value trimmed.
//! - An empty CSS string addresses the card element itself.

use scraper::{ElementRef, Selector};

use super::SelectorSpec;
use crate::utils::normalize_whitespace;

#[derive(Debug)]
enum Target {
    Card,
    Css(Selector),
}

/// One [`SelectorSpec`] with its CSS parsed.
#[derive(Debug)]
pub(crate) struct CompiledSelector {
    target: Target,
    attr: Option<String>,
}

impl CompiledSelector {
    /// Parse the CSS part of `spec`. The error is the parser's message.
    pub(crate) fn compile(spec: &SelectorSpec) -> Result<Self, String> {
        let (css, attr) = match spec {
            SelectorSpec::Css(css) => (css.as_str(), None),
            SelectorSpec::CssAttr(css, attr) => (css.as_str(), Some(attr.clone())),
        };
        let target = if css.trim().is_empty() {
            Target::Card
        } else {
            Target::Css(Selector::parse(css).map_err(|e| e.to_string())?)
        };
        Ok(Self { target, attr })
    }

    /// Every non-empty value this selector yields inside `card`, in document order.
    fn values(&self, card: ElementRef<'_>) -> Vec<String> {
        match &self.target {
            Target::Card => self.value_of(card).into_iter().collect(),
            Target::Css(sel) => card.select(sel).filter_map(|el| self.value_of(el)).collect(),
        }
    }

    fn value_of(&self, el: ElementRef<'_>) -> Option<String> {
        let value = match &self.attr {
            Some(attr) => el.value().attr(attr)?.trim().to_string(),
            None => normalize_whitespace(&el.text().collect::<Vec<_>>().join(" ")),
        };
        if value.is_empty() { None } else { Some(value) }
    }
}

/// A fallback chain of selectors for one field.
#[derive(Debug, Default)]
pub(crate) struct FieldChain {
    selectors: Vec<CompiledSelector>,
}

impl FieldChain {
    /// Compile every spec, reporting the first invalid one together with the
    /// offending CSS.
    pub(crate) fn compile(specs: &[SelectorSpec]) -> Result<Self, (String, String)> {
        let selectors = specs
            .iter()
            .map(|spec| CompiledSelector::compile(spec).map_err(|e| (spec.css().to_string(), e)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { selectors })
    }

    /// First non-empty value from the chain.
    pub(crate) fn first(&self, card: ElementRef<'_>) -> Option<String> {
        self.find_map(card, Some)
    }

    /// First value from the chain that `f` accepts.
    ///
    /// Lets callers skip values that are present but unusable, such as a
    /// relative link that does not resolve or a `data:` placeholder image.
    pub(crate) fn find_map<T>(
        &self,
        card: ElementRef<'_>,
        f: impl FnMut(String) -> Option<T>,
    ) -> Option<T> {
        self.selectors
            .iter()
            .flat_map(|sel| sel.values(card))
            .find_map(f)
    }

    /// All values from the first selector that yields any.
    pub(crate) fn all(&self, card: ElementRef<'_>) -> Vec<String> {
        self.selectors
            .iter()
            .map(|sel| sel.values(card))
            .find(|values| !values.is_empty())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const CARD_HTML: &str = r#"
        <div class="card" data-url="/a-1.html" data-publishtime="1704157200">
            <h3><a href="/a-1.html" title="Attr Title">  Main
                Title  </a></h3>
            <img class="thumb" src="data:image/gif;base64,R0lGOD">
            <img class="thumb" src="/img/a.jpg">
            <span class="tag">Quy hoạch</span>
            <span class="tag">Đất nền</span>
            <p class="empty"></p>
            <p class="sapo">Tóm tắt <b>bài</b> viết</p>
        </div>
    "#;

    fn with_card<R>(f: impl FnOnce(ElementRef<'_>) -> R) -> R {
        let doc = Html::parse_fragment(CARD_HTML);
        let sel = Selector::parse("div.card").unwrap();
        let card = doc.select(&sel).next().unwrap();
        f(card)
    }

    fn chain(specs: &[SelectorSpec]) -> FieldChain {
        FieldChain::compile(specs).unwrap()
    }

    #[test]
    fn test_text_is_whitespace_normalized() {
        let c = chain(&[SelectorSpec::text("h3 a")]);
        assert_eq!(with_card(|card| c.first(card)).as_deref(), Some("Main Title"));
    }

    #[test]
    fn test_nested_text_is_joined_with_spaces() {
        let c = chain(&[SelectorSpec::text(".sapo")]);
        assert_eq!(with_card(|card| c.first(card)).as_deref(), Some("Tóm tắt bài viết"));
    }

    #[test]
    fn test_attribute_extraction() {
        let c = chain(&[SelectorSpec::attr("h3 a", "title")]);
        assert_eq!(with_card(|card| c.first(card)).as_deref(), Some("Attr Title"));
    }

    #[test]
    fn test_empty_css_addresses_card_itself() {
        let c = chain(&[SelectorSpec::attr("", "data-publishtime")]);
        assert_eq!(with_card(|card| c.first(card)).as_deref(), Some("1704157200"));
    }

    #[test]
    fn test_fallback_skips_empty_matches() {
        let c = chain(&[
            SelectorSpec::text("p.empty"),
            SelectorSpec::text(".missing"),
            SelectorSpec::text(".sapo"),
        ]);
        assert_eq!(with_card(|card| c.first(card)).as_deref(), Some("Tóm tắt bài viết"));
    }

    #[test]
    fn test_find_map_skips_rejected_values() {
        let c = chain(&[SelectorSpec::attr("img.thumb", "src")]);
        let found = with_card(|card| {
            c.find_map(card, |v| if v.starts_with("data:") { None } else { Some(v) })
        });
        assert_eq!(found.as_deref(), Some("/img/a.jpg"));
    }

    #[test]
    fn test_all_returns_every_match_of_first_hit() {
        let c = chain(&[SelectorSpec::text(".missing"), SelectorSpec::text(".tag")]);
        assert_eq!(with_card(|card| c.all(card)), vec!["Quy hoạch", "Đất nền"]);
    }

    #[test]
    fn test_nothing_matches() {
        let c = chain(&[SelectorSpec::text("article")]);
        assert_eq!(with_card(|card| c.first(card)), None);
        assert!(with_card(|card| c.all(card)).is_empty());
    }

    #[test]
    fn test_invalid_selector_reports_css() {
        let err = FieldChain::compile(&[SelectorSpec::text("h3"), SelectorSpec::text("[[[invalid")])
            .unwrap_err();
        assert_eq!(err.0, "[[[invalid");
    }
}
