//! Publication date normalization.
//!
//! Every source prints dates its own way: ISO timestamps in attributes,
//! `dd/mm/yyyy HH:MM` text, weekday-prefixed strings, relative phrases such as
//! `3 giờ trước`, or raw Unix seconds. Extractors call into this module once per
//! card so the rest of the pipeline only ever compares [`DateTime<Utc>`] values.
//!
//! Naive values (no zone information) are interpreted in Vietnam local time,
//! UTC+07:00.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Offset of the sources' local time from UTC, in hours.
pub const SOURCE_UTC_OFFSET_HOURS: i64 = 7;

const DATETIME_PATTERNS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%H:%M %d/%m/%Y",
    "%H:%M:%S %d/%m/%Y",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M",
];

const DATE_PATTERNS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

static WEEKDAY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(thứ\s*(hai|ba|tư|năm|sáu|bảy|[2-7])|chủ\s*nhật)\s*,?\s*").unwrap()
});

static ZONE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*\(?\s*GMT\s*[+-]\s*\d{1,2}\s*\)?\s*$").unwrap());

static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d+)\s*(giây|phút|giờ|ngày|tuần|tháng)\s*trước$").unwrap()
});

static TODAY_OR_YESTERDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(hôm nay|hôm qua)(?:\s*,?\s*(\d{1,2}):(\d{2}))?$").unwrap()
});

fn local_offset() -> Duration {
    Duration::hours(SOURCE_UTC_OFFSET_HOURS)
}

fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(naive - local_offset(), Utc)
}

/// Strip decorations that never carry date information and unify separators.
fn clean(raw: &str) -> String {
    let s = raw.trim();
    let s = WEEKDAY_PREFIX.replace(s, "");
    let s = ZONE_SUFFIX.replace(&s, "");
    s.replace(" - ", " ")
        .replace(" | ", " ")
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a source-native date string into UTC.
///
/// `now` anchors relative phrases (`5 phút trước`, `Hôm qua 08:15`).
/// Returns `None` when nothing recognizable is found; callers sort such items
/// as oldest.
pub fn parse_published(raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let s = clean(trimmed);

    for pat in DATETIME_PATTERNS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&s, pat) {
            return Some(local_to_utc(naive));
        }
    }
    for pat in DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(&s, pat) {
            return Some(local_to_utc(date.and_hms_opt(0, 0, 0)?));
        }
    }

    if let Some(caps) = RELATIVE.captures(&s) {
        // Absurd counts overflow chrono's range; treat them as unparseable.
        let n: i64 = caps[1].parse().ok()?;
        let ago = match caps[2].to_lowercase().as_str() {
            "giây" => Duration::try_seconds(n),
            "phút" => Duration::try_minutes(n),
            "giờ" => Duration::try_hours(n),
            "ngày" => Duration::try_days(n),
            "tuần" => Duration::try_weeks(n),
            _ => n.checked_mul(30).and_then(Duration::try_days),
        }?;
        return now.checked_sub_signed(ago);
    }

    if let Some(caps) = TODAY_OR_YESTERDAY.captures(&s) {
        let local_today = (now.naive_utc() + local_offset()).date();
        let day = if caps[1].to_lowercase() == "hôm qua" {
            local_today.pred_opt()?
        } else {
            local_today
        };
        let time = match (caps.get(2), caps.get(3)) {
            (Some(h), Some(m)) => {
                NaiveTime::from_hms_opt(h.as_str().parse().ok()?, m.as_str().parse().ok()?, 0)?
            }
            _ => NaiveTime::from_hms_opt(0, 0, 0)?,
        };
        return Some(local_to_utc(day.and_time(time)));
    }

    None
}

/// Interpret a Unix-seconds token. Missing or non-numeric tokens map to the
/// epoch rather than failing.
pub fn from_unix_seconds(raw: &str) -> DateTime<Utc> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Render a timestamp the way the sources display dates, in local time.
pub fn display(ts: DateTime<Utc>) -> String {
    (ts.naive_utc() + local_offset())
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        // 2024-05-14 10:00 local
        Utc.with_ymd_and_hms(2024, 5, 14, 3, 0, 0).unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            parse_published("2024-01-02T08:30:00+07:00", now()),
            Some(utc(2024, 1, 2, 1, 30))
        );
    }

    #[test]
    fn test_naive_iso_is_local_time() {
        assert_eq!(
            parse_published("2024-01-02T08:30:00", now()),
            Some(utc(2024, 1, 2, 1, 30))
        );
    }

    #[test]
    fn test_slash_date_with_time() {
        assert_eq!(
            parse_published("14/05/2024 10:32", now()),
            Some(utc(2024, 5, 14, 3, 32))
        );
        assert_eq!(
            parse_published("14/05/2024 - 10:32", now()),
            Some(utc(2024, 5, 14, 3, 32))
        );
    }

    #[test]
    fn test_time_first() {
        assert_eq!(
            parse_published("10:32 14/05/2024", now()),
            Some(utc(2024, 5, 14, 3, 32))
        );
    }

    #[test]
    fn test_weekday_and_zone_decorations() {
        assert_eq!(
            parse_published("Thứ hai, 13/5/2024, 20:15 (GMT+7)", now()),
            Some(utc(2024, 5, 13, 13, 15))
        );
        assert_eq!(
            parse_published("Chủ nhật, 12/05/2024", now()),
            Some(utc(2024, 5, 11, 17, 0))
        );
    }

    #[test]
    fn test_date_only_is_local_midnight() {
        assert_eq!(parse_published("02/01/2024", now()), Some(utc(2024, 1, 1, 17, 0)));
    }

    #[test]
    fn test_relative_phrases() {
        assert_eq!(
            parse_published("5 phút trước", now()),
            Some(now() - Duration::minutes(5))
        );
        assert_eq!(
            parse_published("3 giờ trước", now()),
            Some(now() - Duration::hours(3))
        );
        assert_eq!(
            parse_published("2 ngày trước", now()),
            Some(now() - Duration::days(2))
        );
    }

    #[test]
    fn test_out_of_range_relative_is_none() {
        assert_eq!(parse_published("100000000 ngày trước", now()), None);
        assert_eq!(parse_published("99999999999999999 giây trước", now()), None);
        assert_eq!(parse_published("999999999999999999 tháng trước", now()), None);
        assert_eq!(parse_published("99999999999999999999 phút trước", now()), None);
    }

    #[test]
    fn test_today_and_yesterday() {
        assert_eq!(
            parse_published("Hôm nay 08:15", now()),
            Some(utc(2024, 5, 14, 1, 15))
        );
        assert_eq!(
            parse_published("Hôm qua, 23:00", now()),
            Some(utc(2024, 5, 13, 16, 0))
        );
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_published("", now()), None);
        assert_eq!(parse_published("   ", now()), None);
        assert_eq!(parse_published("sắp diễn ra", now()), None);
    }

    #[test]
    fn test_unix_seconds() {
        assert_eq!(from_unix_seconds("1704157200"), utc(2024, 1, 2, 1, 0));
        assert_eq!(from_unix_seconds(" 1704157200 "), utc(2024, 1, 2, 1, 0));
    }

    #[test]
    fn test_unix_seconds_defaults_to_epoch() {
        assert_eq!(from_unix_seconds(""), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(from_unix_seconds("abc"), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_display_in_local_time() {
        assert_eq!(display(utc(2024, 1, 2, 1, 0)), "02/01/2024 08:00");
        assert_eq!(display(DateTime::<Utc>::UNIX_EPOCH), "01/01/1970 07:00");
    }
}
