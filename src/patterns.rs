//! Compiled regex patterns used across the extraction pipeline.
//!
//! All patterns are compiled once at first use via `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Input preprocessing
// =============================================================================

/// An `<iframe>` somewhere between `<head>` and `</head>`.
pub static IFRAME_IN_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<head(?:\s[^>]+)?>.*?)<iframe[^>]*(?:/>|>.*?</iframe>)(.*?</head>)")
        .expect("IFRAME_IN_HEAD regex")
});

/// A `<noscript>` somewhere between `<head>` and `</head>`.
pub static NOSCRIPT_IN_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(<head(?:\s[^>]+)?>.*?)<noscript[^>]*(?:/>|>.*?</noscript>)(.*?</head>)")
        .expect("NOSCRIPT_IN_HEAD regex")
});

// =============================================================================
// Visibility
// =============================================================================

/// `display: none`, optionally `!important`.
pub static DISPLAY_NONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^none(\s!important)?$").expect("DISPLAY_NONE regex"));

/// `visibility: hidden`, optionally `!important`.
pub static VISIBILITY_HIDDEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^hidden(\s!important)?$").expect("VISIBILITY_HIDDEN regex"));

/// Degenerate 0/1 pixel lengths in a style value or width/height attribute.
pub static SMALL_LENGTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0|1)(px)?(\s!important)?$").expect("SMALL_LENGTH regex"));

// =============================================================================
// Text
// =============================================================================

/// Separator inside a `<title>`: whitespace, one of `-`, `–`, `|`, whitespace.
pub static TITLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[-–|]\s+").expect("TITLE_SEPARATOR regex"));

/// A string consisting only of whitespace (or nothing).
pub static WHITESPACE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*$").expect("WHITESPACE_ONLY regex"));

// =============================================================================
// Responsive images
// =============================================================================

/// Separator between `srcset` candidates.
pub static SRCSET_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s+").expect("SRCSET_SEPARATOR regex"));

/// `(min-width: Npx)` media feature.
pub static MEDIA_MIN_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(min-width:\s*(\d+)px\)").expect("MEDIA_MIN_WIDTH regex"));

/// `(max-width: Npx)` media feature.
pub static MEDIA_MAX_WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(max-width:\s*(\d+)px\)").expect("MEDIA_MAX_WIDTH regex"));

// =============================================================================
// Language tags
// =============================================================================

/// Well-formed BCP47 language tag (RFC 5646 `langtag`, private-use and
/// grandfathered `i-` forms), case-insensitive.
pub static BCP47_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^(?:
            (?:[a-z]{2,3}(?:-[a-z]{3}){0,3}|[a-z]{4}|[a-z]{5,8})   # language
            (?:-[a-z]{4})?                                         # script
            (?:-(?:[a-z]{2}|[0-9]{3}))?                            # region
            (?:-(?:[a-z0-9]{5,8}|[0-9][a-z0-9]{3}))*               # variants
            (?:-[0-9a-wy-z](?:-[a-z0-9]{2,8})+)*                   # extensions
            (?:-x(?:-[a-z0-9]{1,8})+)?                             # private use
          | x(?:-[a-z0-9]{1,8})+
          | i-[a-z]{2,8}
        )$",
    )
    .expect("BCP47_TAG regex")
});

/// Characters allowed in a language tag taken from `og:locale`.
pub static LOCALE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9-]+$").expect("LOCALE_CHARS regex"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_separator_requires_surrounding_whitespace() {
        let parts: Vec<_> = TITLE_SEPARATOR.split("Big Story - My News Site").collect();
        assert_eq!(parts, vec!["Big Story", "My News Site"]);
        assert_eq!(TITLE_SEPARATOR.split("Well-known fact").count(), 1);
        assert_eq!(TITLE_SEPARATOR.split("A | B – C").count(), 3);
    }

    #[test]
    fn test_small_length() {
        assert!(SMALL_LENGTH.is_match("0"));
        assert!(SMALL_LENGTH.is_match("1px"));
        assert!(SMALL_LENGTH.is_match("0px !important"));
        assert!(!SMALL_LENGTH.is_match("10px"));
        assert!(!SMALL_LENGTH.is_match("100%"));
    }

    #[test]
    fn test_media_widths() {
        let media = "(min-width: 800px) and (max-width:1200px)";
        assert_eq!(&MEDIA_MIN_WIDTH.captures(media).unwrap()[1], "800");
        assert_eq!(&MEDIA_MAX_WIDTH.captures(media).unwrap()[1], "1200");
    }

    #[test]
    fn test_bcp47_shapes() {
        for tag in ["en", "en-US", "zh-Hant-TW", "sr-Latn-RS", "de-CH-1901", "x-private"] {
            assert!(BCP47_TAG.is_match(tag), "{tag}");
        }
        for tag in ["", "english language", "en_US", "e", "en--US"] {
            assert!(!BCP47_TAG.is_match(tag), "{tag}");
        }
    }

    #[test]
    fn test_iframe_in_head_is_removed_once_per_pass() {
        let html = r#"<head><title>t</title><iframe src="x"></iframe></head><body></body>"#;
        let out = IFRAME_IN_HEAD.replace(html, "${1}${2}");
        assert_eq!(out, "<head><title>t</title></head><body></body>");
    }
}
