//! Text normalization helpers shared by the field extractors.

use unicode_normalization::UnicodeNormalization;

/// Trim and NFKC-normalize a short field value.
#[must_use]
pub fn normalize_field(text: &str) -> String {
    text.trim().nfkc().collect::<String>().trim().to_string()
}

/// Normalize a field value, mapping empty results to `None`.
#[must_use]
pub fn non_empty_field(text: &str) -> Option<String> {
    let value = normalize_field(text);
    (!value.is_empty()).then_some(value)
}

/// Collapse every whitespace run into a single space and trim.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Trimmed text, or `None` when nothing is left.
#[must_use]
pub fn trimmed(text: &str) -> Option<String> {
    let t = text.trim();
    (!t.is_empty()).then(|| t.to_string())
}

/// Title case: every cased run starts with an uppercase letter followed only
/// by lowercase letters, and at least one cased letter exists.
#[must_use]
pub fn is_title_case(text: &str) -> bool {
    let mut seen_cased = false;
    let mut previous_cased = false;
    for c in text.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            seen_cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            seen_cased = true;
        } else {
            previous_cased = false;
        }
    }
    seen_cased
}

/// At least one cased letter and no lowercase letters.
#[must_use]
pub fn is_upper_case(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}

/// At least one cased letter and no uppercase letters.
#[must_use]
pub fn is_lower_case(text: &str) -> bool {
    text.chars().any(char::is_lowercase) && !text.chars().any(char::is_uppercase)
}

/// Similarity ratio in `[0, 1]` between two strings.
///
/// Computed as `2 * M / T` where `M` counts characters in the recursively
/// found longest common blocks (Ratcliff/Obershelp) and `T` is the total
/// length of both strings.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut stack = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = stack.pop() {
        let (i, j, k) = longest_block(a, b, (alo, ahi), (blo, bhi));
        if k == 0 {
            continue;
        }
        matched += k;
        stack.push((alo, i, blo, j));
        stack.push((i + k, ahi, j + k, bhi));
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`; earliest wins ties.
fn longest_block(
    a: &[char],
    b: &[char],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let width = bhi - blo + 1;
    let mut best = (alo, blo, 0);
    let mut previous = vec![0usize; width];
    for i in alo..ahi {
        let mut current = vec![0usize; width];
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = previous[j - blo] + 1;
                current[j - blo + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        previous = current;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_field_applies_nfkc() {
        assert_eq!(normalize_field("  ﬁnance\u{00a0}"), "finance");
        assert_eq!(normalize_field("Ｔｅｓｔ"), "Test");
        assert_eq!(non_empty_field("   "), None);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(collapse_whitespace(" \n "), "");
    }

    #[test]
    fn test_case_predicates() {
        assert!(is_title_case("New York"));
        assert!(!is_title_case("New york"));
        assert!(!is_title_case("NEW YORK"));
        assert!(is_upper_case("NASA 2024"));
        assert!(!is_upper_case("2024"));
        assert!(is_lower_case("climate change"));
        assert!(!is_lower_case("iPhone"));
    }

    #[test]
    fn test_similarity_bounds() {
        assert!((similarity("abc", "abc") - 1.0).abs() < 1e-9);
        assert!(similarity("abc", "xyz").abs() < 1e-9);
        let r = similarity("jane doe", "jane-doe");
        assert!(r > 0.8 && r < 1.0);
    }

    #[test]
    fn test_similarity_prefers_closer_name() {
        let slug = "jane-smith";
        assert!(similarity("jane smith", slug) > similarity("editorial team", slug));
    }
}
