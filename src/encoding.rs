//! Character encoding detection and transcoding for the bytes entry point.
//!
//! The charset comes from a byte-order mark, else from the first `<meta>`
//! declaration in the leading kilobyte, else UTF-8.

use encoding_rs::{Encoding, UTF_8};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Match `<meta charset="...">` tag
#[allow(clippy::expect_used)]
static CHARSET_META_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s>;]+)"#).expect("valid regex")
});

/// Match `<meta http-equiv="Content-Type" content="...; charset=...">` tag
#[allow(clippy::expect_used)]
static CONTENT_TYPE_CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+http-equiv\s*=\s*["']?content-type["']?[^>]+content\s*=\s*["']?[^"'>]*;\s*charset\s*=\s*([^"'\s>]+)"#).expect("valid regex")
});

/// Number of leading bytes searched for a charset declaration.
const SNIFF_LEN: usize = 1024;

/// Detect character encoding from HTML bytes.
///
/// Order: byte-order mark, `<meta http-equiv="Content-Type">`,
/// `<meta charset>`, then UTF-8. Unknown labels are ignored.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(html) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&html[..html.len().min(SNIFF_LEN)]);

    for charset in [extract_content_type_charset(&head), extract_charset(&head)]
        .into_iter()
        .flatten()
    {
        match Encoding::for_label(charset.as_bytes()) {
            // A document that could declare its charset in ASCII is not UTF-16.
            Some(encoding) if encoding.is_single_byte() || encoding == UTF_8 => return encoding,
            Some(encoding) => return encoding.output_encoding(),
            None => tracing::debug!(charset, "unknown charset label"),
        }
    }

    UTF_8
}

fn extract_charset(html: &str) -> Option<String> {
    CHARSET_META_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn extract_content_type_charset(html: &str) -> Option<String> {
    CONTENT_TYPE_CHARSET_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Transcode HTML bytes to a UTF-8 string.
///
/// Invalid sequences become U+FFFD. A decode in which more than half the
/// characters are replacements is rejected as a wrong charset.
pub fn transcode_to_utf8(html: &[u8]) -> Result<String> {
    let encoding = detect_encoding(html);
    let (decoded, used, had_errors) = encoding.decode(html);

    if had_errors {
        let total = decoded.chars().count();
        let replaced = decoded.chars().filter(|&c| c == '\u{FFFD}').count();
        if total > 0 && replaced * 2 > total {
            return Err(Error::Encoding(format!(
                "{} decoding replaced {replaced} of {total} characters",
                used.name()
            )));
        }
        tracing::debug!(encoding = used.name(), replaced, "lossy transcoding");
    }

    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_windows1252_from_latin1_label() {
        let html = br#"<html><head><meta charset="ISO-8859-1"></head><body>Test</body></html>"#;
        // WHATWG maps the latin-1 label to windows-1252
        assert_eq!(detect_encoding(html).name(), "windows-1252");
    }

    #[test]
    fn detect_charset_from_content_type() {
        let html = br#"<meta http-equiv="Content-Type" content="text/html; charset=Shift_JIS">"#;
        assert_eq!(detect_encoding(html).name(), "Shift_JIS");
    }

    #[test]
    fn detect_bom_wins_over_meta() {
        let mut html = vec![0xEF, 0xBB, 0xBF];
        html.extend_from_slice(br#"<meta charset="windows-1252">"#);
        assert_eq!(detect_encoding(&html), UTF_8);
    }

    #[test]
    fn unknown_label_falls_back_to_utf8() {
        let html = br#"<meta charset="klingon"><p>x</p>"#;
        assert_eq!(detect_encoding(html), UTF_8);
    }

    #[test]
    fn transcode_windows1252_to_utf8() {
        let html = b"<html><head><meta charset=\"windows-1252\"></head><body>\x93Caf\xE9\x94</body></html>";
        let result = transcode_to_utf8(html).unwrap();
        assert!(result.contains("\u{201C}Caf\u{e9}\u{201D}"));
    }

    #[test]
    fn transcode_tolerates_stray_invalid_bytes() {
        let html = b"<html><body>Test \xFF\xFE Invalid</body></html>";
        let result = transcode_to_utf8(html).unwrap();
        assert!(result.contains("Test"));
        assert!(result.contains("Invalid"));
    }

    #[test]
    fn transcode_rejects_mostly_garbage() {
        let html = [0xFFu8; 64];
        assert!(matches!(transcode_to_utf8(&html), Err(Error::Encoding(_))));
    }
}
