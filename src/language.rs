//! BCP47 language-tag validation and canonical casing.

use crate::patterns::BCP47_TAG;

/// Validate a language tag and return it in canonical case.
///
/// The primary language subtag and extensions are lowercase, a four-letter
/// script subtag is title case and a two-letter region subtag is uppercase
/// (`zh-hant-tw` becomes `zh-Hant-TW`). Returns `None` for anything that is
/// not a well-formed tag.
#[must_use]
pub fn canonicalize(tag: &str) -> Option<String> {
    let tag = tag.trim();
    if !BCP47_TAG.is_match(tag) {
        return None;
    }

    let mut out: Vec<String> = Vec::new();
    let mut after_singleton = false;
    for (i, subtag) in tag.split('-').enumerate() {
        let formatted = if i == 0 || after_singleton {
            subtag.to_ascii_lowercase()
        } else if subtag.len() == 1 {
            after_singleton = true;
            subtag.to_ascii_lowercase()
        } else if subtag.len() == 4 && subtag.chars().all(|c| c.is_ascii_alphabetic()) {
            title_case(subtag)
        } else if subtag.len() == 2 && subtag.chars().all(|c| c.is_ascii_alphabetic()) {
            subtag.to_ascii_uppercase()
        } else {
            subtag.to_ascii_lowercase()
        };
        // `x-...` and `i-...` tags start with their singleton
        if i == 0 && subtag.len() == 1 {
            after_singleton = true;
        }
        out.push(formatted);
    }
    Some(out.join("-"))
}

fn title_case(subtag: &str) -> String {
    let lower = subtag.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
