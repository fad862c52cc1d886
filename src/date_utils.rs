//! Lenient date parsing to ISO-8601.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

/// Formats carrying an explicit UTC offset.
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
];

/// Date and time without an offset.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only formats, midnight assumed.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y", // January 15, 2024
    "%b %d, %Y", // Jan 15, 2024
    "%B %d %Y",
    "%d %B %Y", // 15 January 2024
    "%d %b %Y",
    "%A, %B %d, %Y",
];

/// Parse a free-form date string and render it as ISO-8601.
///
/// Zoned values keep their own offset (`2024-01-15T10:00:00+02:00`, `Z`
/// becomes `+00:00`); values without an offset are rendered naive
/// (`2024-01-15T10:00:00`). Unparseable input yields `None`.
#[must_use]
pub fn parse_to_iso(date_str: &str) -> Option<String> {
    let date_str = date_str.trim();
    if date_str.is_empty() {
        return None;
    }

    if let Some(dt) = parse_zoned(date_str) {
        return Some(format_zoned(&dt));
    }
    if let Some(dt) = parse_naive(date_str) {
        return Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string());
    }

    tracing::debug!(date_str, "date string parsing failed");
    None
}

fn parse_zoned(date_str: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(date_str) {
        return Some(dt);
    }
    ZONED_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(date_str, fmt).ok())
}

fn parse_naive(date_str: &str) -> Option<NaiveDateTime> {
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(date_str, fmt).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_str, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn format_zoned(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}
