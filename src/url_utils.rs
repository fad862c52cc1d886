//! URL Utility Functions
//!
//! Validation, scheme filtering and resolution of hrefs against the page URL.
//! Every URL that leaves the crate has passed [`is_absolute_url`].

use url::Url;

/// Schemes accepted by the absolute-URL validator.
const VALID_SCHEMES: &[&str] = &["http", "https", "ftp", "ftps"];

/// Check if a string is a valid absolute URL.
///
/// # Returns
/// * `(is_absolute, parsed_url)` - Whether the URL is absolute with an
///   accepted scheme and a host, and the parsed URL if so
#[must_use]
pub fn is_absolute_url(s: &str) -> (bool, Option<Url>) {
    let s = s.trim();

    if s.is_empty() || s.chars().any(char::is_whitespace) {
        return (false, None);
    }

    match Url::parse(s) {
        Ok(url) if VALID_SCHEMES.contains(&url.scheme()) && url.host_str().is_some_and(|h| !h.is_empty()) => {
            (true, Some(url))
        }
        _ => (false, None),
    }
}

/// Shorthand for the boolean half of [`is_absolute_url`].
#[must_use]
pub fn is_valid_url(s: &str) -> bool {
    is_absolute_url(s).0
}

/// Scheme of an href as a URL parser would split it: the lowercase prefix
/// before the first `:`, or empty for relative and protocol-relative hrefs.
#[must_use]
pub fn scheme_of(href: &str) -> String {
    let Some(colon) = href.find(':') else {
        return String::new();
    };
    let prefix = &href[..colon];
    let mut chars = prefix.chars();
    let well_formed = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if well_formed {
        prefix.to_ascii_lowercase()
    } else {
        String::new()
    }
}

/// Whether an href is `http`, `https` or relative.
#[must_use]
pub fn has_web_scheme(href: &str) -> bool {
    matches!(scheme_of(href).as_str(), "" | "http" | "https")
}

/// Parse the page URL used as the base for relative hrefs.
#[must_use]
pub fn base_url(page_url: Option<&str>) -> Option<Url> {
    page_url.and_then(|u| is_absolute_url(u).1)
}

/// Convert a relative or absolute URL to absolute form.
///
/// # Arguments
/// * `url_str` - The URL to resolve (can be relative or absolute)
/// * `base` - The base URL for resolution
///
/// # Returns
/// * The joined URL, or the input unchanged when there is no base or the join fails
#[must_use]
pub fn create_absolute_url(url_str: &str, base: Option<&Url>) -> String {
    let url_str = url_str.trim();
    match base {
        Some(base) => base
            .join(url_str)
            .map_or_else(|_| url_str.to_string(), |u| u.to_string()),
        None => url_str.to_string(),
    }
}

/// Validate a URL and convert it to absolute form if necessary.
///
/// # Returns
/// * `(resolved_url, is_valid)` - The resolved URL and whether it is valid
#[must_use]
pub fn validate_url(url_str: &str, base: Option<&Url>) -> (String, bool) {
    let url_str = url_str.trim();

    if url_str.is_empty() {
        return (String::new(), false);
    }

    let resolved = create_absolute_url(url_str, base);
    let valid = is_valid_url(&resolved);
    (resolved, valid)
}

/// Scheme-filter, resolve and validate an href in one step.
#[must_use]
pub fn resolve_href(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || !has_web_scheme(href) {
        return None;
    }
    match validate_url(href, base) {
        (resolved, true) => Some(resolved),
        (resolved, false) => {
            tracing::debug!(href, resolved, "dropping unresolvable url");
            None
        }
    }
}

/// Apply the link rules to one `(href, text)` pair.
///
/// Empty and fragment-only hrefs are dropped, as are non-web schemes; the
/// href is resolved against `base` and must validate; the text is trimmed
/// and becomes `None` when empty.
#[must_use]
pub fn process_link(href: &str, text: Option<&str>, base: Option<&Url>) -> Option<(String, Option<String>)> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let url = resolve_href(href, base)?;
    let text = text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string);
    Some((url, text))
}

/// Lowercased path of an href, ignoring its query and fragment.
#[must_use]
pub fn lowercase_path(href: &str) -> String {
    match Url::parse(href) {
        Ok(u) => u.path().to_ascii_lowercase(),
        Err(_) => href
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase(),
    }
}

/// Value of the first `name` query parameter of an href.
#[must_use]
pub fn query_param(href: &str, name: &str) -> Option<String> {
    let query = href.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
