//! Small string and URL helpers shared by the extractors and fetchers.
//!
//! - Whitespace normalization for text pulled out of HTML
//! - Resolution of relative links against a source's origin
//! - String truncation for log fields

use url::Url;

/// Collapse runs of whitespace (including newlines and non-breaking spaces)
/// into single spaces and trim both ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_whitespace("  Nha \n Trang "), "Nha Trang");
/// ```
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve `href` against `base`.
///
/// Absolute URLs pass through unchanged; root-relative, path-relative and
/// protocol-relative forms are joined onto the base. Returns `None` for empty
/// input and for references that cannot form a valid http(s) URL.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at a character boundary at or below `max` bytes with
/// an ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}
