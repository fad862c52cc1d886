//! OpenGraph Protocol metadata (`<meta property="og:...">`).

use dom_query::{Document, Selection};

use crate::date_utils::parse_to_iso;
use crate::url_utils::is_valid_url;

/// One `og:image` or `og:video` with its structured properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OgMedia {
    /// Value of the `og:image` / `og:video` property itself.
    pub content: String,
    pub url: Option<String>,
    pub secure_url: Option<String>,
    pub media_type: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub alt: Option<String>,
}

impl OgMedia {
    fn new(content: &str) -> Self {
        Self {
            content: content.to_string(),
            ..Self::default()
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        let slot = match key {
            "url" => &mut self.url,
            "secure_url" => &mut self.secure_url,
            "type" => &mut self.media_type,
            "width" => &mut self.width,
            "height" => &mut self.height,
            "alt" => &mut self.alt,
            _ => return,
        };
        *slot = Some(value.to_string());
    }
}

/// Fields read from OpenGraph tags in `<head>`.
///
/// Scalar properties take the last non-empty occurrence. The `article:*`
/// fields are only read when `og:type` is `article`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenGraph {
    pub title: Option<String>,
    /// `og:type`
    pub kind: Option<String>,
    pub description: Option<String>,
    /// `og:locale` with `_` replaced by `-`.
    pub locale: Option<String>,
    pub site_name: Option<String>,
    pub images: Vec<OgMedia>,
    pub videos: Vec<OgMedia>,
    /// `og:url`, only if it is a valid absolute URL.
    pub url: Option<String>,
    pub locale_alternate: Vec<String>,
    /// `article:published_time`, ISO-8601.
    pub published_time: Option<String>,
    /// `article:modified_time`, ISO-8601.
    pub modified_time: Option<String>,
    /// `article:expiration_time`, ISO-8601.
    pub expiration_time: Option<String>,
    pub section: Option<String>,
    /// `article:tag` values, comma-split.
    pub tags: Vec<String>,
    /// `article:author` values.
    pub authors: Vec<String>,
}

/// Property/content pairs of `<head>` meta tags whose property starts with
/// `prefix`, in document order, with trimmed non-empty content.
fn head_properties(doc: &Document, prefix: &str) -> Vec<(String, String)> {
    let selector = format!("head meta[property^='{prefix}']");
    doc.select(&selector)
        .nodes()
        .iter()
        .filter_map(|node| {
            let sel = Selection::from(*node);
            let property = sel.attr("property")?.to_string();
            let content = sel.attr("content")?.trim().to_string();
            (!content.is_empty()).then_some((property, content))
        })
        .collect()
}

/// Group structured properties: each repeat of `anchor` starts a new item,
/// and `anchor:*` properties attach to the current one. Properties seen
/// before the first anchor belong to no item and are dropped.
fn group_media(properties: &[(String, String)], anchor: &str) -> Vec<OgMedia> {
    let mut items = Vec::new();
    let mut current: Option<OgMedia> = None;

    for (property, content) in properties {
        if property == anchor {
            if let Some(done) = current.replace(OgMedia::new(content)) {
                items.push(done);
            }
        } else if let Some(key) = property
            .strip_prefix(anchor)
            .and_then(|rest| rest.strip_prefix(':'))
        {
            if let Some(item) = current.as_mut() {
                item.set(key, content);
            }
        }
    }

    items.extend(current);
    items
}

fn locale_tag(content: &str) -> String {
    content.replace('_', "-")
}

/// Extract OpenGraph metadata from the document head.
#[must_use]
pub fn extract_open_graph(doc: &Document) -> OpenGraph {
    let mut og = OpenGraph {
        images: group_media(&head_properties(doc, "og:image"), "og:image"),
        videos: group_media(&head_properties(doc, "og:video"), "og:video"),
        ..OpenGraph::default()
    };

    for (property, content) in head_properties(doc, "og:") {
        match property.as_str() {
            "og:title" => og.title = Some(content),
            "og:type" => og.kind = Some(content),
            "og:description" => og.description = Some(content),
            "og:site_name" => og.site_name = Some(content),
            "og:locale" => og.locale = Some(locale_tag(&content)),
            "og:locale:alternate" => og.locale_alternate.push(locale_tag(&content)),
            "og:url" if is_valid_url(&content) => og.url = Some(content),
            _ => {}
        }
    }

    if og.kind.as_deref() == Some("article") {
        for (property, content) in head_properties(doc, "article:") {
            match property.as_str() {
                "article:published_time" => og.published_time = parse_to_iso(&content),
                "article:modified_time" => og.modified_time = parse_to_iso(&content),
                "article:expiration_time" => og.expiration_time = parse_to_iso(&content),
                "article:section" => og.section = Some(content),
                "article:tag" => og.tags.extend(
                    content
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string),
                ),
                "article:author" => og.authors.push(content),
                _ => {}
            }
        }
    }

    og
}
