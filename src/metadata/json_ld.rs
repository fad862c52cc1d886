//! JSON-LD Metadata Parsing
//!
//! Schema.org article data embedded in `<script type="application/ld+json">`.
//! Every block is parsed on its own; a malformed block is logged and skipped.

use dom_query::{Document, Selection};
use serde_json::{Map, Value};
use tracing::debug;

use crate::date_utils::parse_to_iso;
use crate::url_utils::is_valid_url;

/// Schema categories, in priority order, with their `@type` names.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "NewsArticle",
        &[
            "AnalysisNewsArticle",
            "AskPublicNewsArticle",
            "BackgroundNewsArticle",
            "NewsArticle",
            "OpinionNewsArticle",
            "ReportageNewsArticle",
            "ReviewNewsArticle",
        ],
    ),
    (
        "Article",
        &[
            "Article",
            "AdvertiserContentArticle",
            "Report",
            "SatiricalArticle",
            "ScholarlyArticle",
        ],
    ),
    (
        "BlogPosting",
        &[
            "SocialMediaPosting",
            "BlogPosting",
            "LiveBlogPosting",
            "DiscussionForumPosting",
        ],
    ),
    ("WebPage", &["WebPage"]),
];

/// A Person or Organization with a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedEntity {
    pub name: String,
    /// Valid absolute URL, if one was given.
    pub url: Option<String>,
}

/// Article fields merged from the selected JSON-LD nodes.
///
/// Scalars keep the first valid value in category order; lists accumulate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonLd {
    pub headline: Option<String>,
    pub name: Option<String>,
    pub article_body: Option<String>,
    pub article_section: Vec<String>,
    pub description: Option<String>,
    pub in_language: Option<String>,
    /// ISO-8601.
    pub date_published: Option<String>,
    /// ISO-8601.
    pub date_modified: Option<String>,
    /// ISO-8601.
    pub date_created: Option<String>,
    pub url: Option<String>,
    pub author: Vec<NamedEntity>,
    pub publisher: Vec<NamedEntity>,
    /// URLs of `ImageObject` entries.
    pub image: Vec<String>,
    pub keywords: Vec<String>,
}

/// Parse one script body. Control characters inside strings are tolerated.
fn parse_block(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Some(value),
        Err(_) => {
            let relaxed: String = text
                .chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect();
            match serde_json::from_str::<Value>(&relaxed) {
                Ok(value) => Some(value),
                Err(err) => {
                    debug!(%err, "could not decode JSON-LD block");
                    None
                }
            }
        }
    }
}

/// Every JSON-LD node object in the document, with `@graph` containers
/// flattened and their `@context` handed down to members lacking one.
#[must_use]
pub fn collect_nodes(doc: &Document) -> Vec<Map<String, Value>> {
    let mut top_level: Vec<Value> = Vec::new();
    for script in doc.select(r#"script[type="application/ld+json"]"#).nodes() {
        let text = Selection::from(*script).text();
        match parse_block(&text) {
            Some(Value::Array(items)) => top_level.extend(items),
            Some(item @ Value::Object(_)) => top_level.push(item),
            Some(_) => debug!("JSON-LD block is neither an object nor a list"),
            None => {}
        }
    }

    let mut nodes = Vec::new();
    for item in top_level {
        let Value::Object(mut object) = item else {
            continue;
        };
        match object.remove("@graph") {
            Some(Value::Array(members)) => {
                let context = object.get("@context").cloned();
                for member in members {
                    let Value::Object(mut member) = member else {
                        continue;
                    };
                    if let Some(context) = &context {
                        member
                            .entry("@context")
                            .or_insert_with(|| context.clone());
                    }
                    nodes.push(member);
                }
            }
            Some(_) => debug!("JSON-LD @graph is not a list"),
            None => nodes.push(object),
        }
    }
    nodes
}

/// The node's `@type`, or the first entry when it is a list.
fn node_type(node: &Map<String, Value>) -> Option<&str> {
    match node.get("@type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(list) => list.first()?.as_str(),
        _ => None,
    }
}

fn trimmed_string(value: &Value) -> Option<String> {
    let s = value.as_str()?.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn valid_url(value: Option<&Value>) -> Option<String> {
    value
        .and_then(trimmed_string)
        .filter(|u| is_valid_url(u))
}

fn entity(value: &Value) -> Option<NamedEntity> {
    let object = value.as_object()?;
    let name = object.get("name").and_then(trimmed_string)?;
    Some(NamedEntity {
        name,
        url: valid_url(object.get("url")),
    })
}

fn entities(value: &Value, field: &str) -> Vec<NamedEntity> {
    match value {
        Value::Array(list) => list.iter().filter_map(entity).collect(),
        Value::Object(_) => entity(value).into_iter().collect(),
        _ => {
            debug!(field, "JSON-LD value is not an object");
            Vec::new()
        }
    }
}

fn image_url(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    if object.get("@type").and_then(Value::as_str) != Some("ImageObject") {
        return None;
    }
    valid_url(object.get("url"))
}

fn strings(value: &Value, split_commas: bool) -> Vec<String> {
    let raw: Vec<&str> = match value {
        Value::String(s) if split_commas => s.split(',').collect(),
        Value::String(s) => vec![s.as_str()],
        Value::Array(list) => list.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    raw.into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn first_set(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value;
    }
}

impl JsonLd {
    fn merge(&mut self, node: &Map<String, Value>) {
        let text = |key: &str| node.get(key).and_then(trimmed_string);
        let date = |key: &str| text(key).and_then(|d| parse_to_iso(&d));

        first_set(&mut self.headline, text("headline"));
        first_set(&mut self.name, text("name"));
        first_set(&mut self.article_body, text("articleBody"));
        first_set(&mut self.description, text("description"));
        first_set(&mut self.in_language, text("inLanguage"));
        first_set(&mut self.date_published, date("datePublished"));
        first_set(&mut self.date_modified, date("dateModified"));
        first_set(&mut self.date_created, date("dateCreated"));
        first_set(&mut self.url, valid_url(node.get("url")));

        if let Some(v) = node.get("articleSection") {
            self.article_section.extend(strings(v, false));
        }
        if let Some(v) = node.get("author") {
            self.author.extend(entities(v, "author"));
        }
        if let Some(v) = node.get("publisher") {
            self.publisher.extend(entities(v, "publisher"));
        }
        match node.get("image") {
            Some(Value::Array(list)) => self.image.extend(list.iter().filter_map(image_url)),
            Some(v) => self.image.extend(image_url(v)),
            None => {}
        }
        if let Some(v) = node.get("keywords") {
            self.keywords.extend(strings(v, true));
        }
    }
}

/// Extract article metadata from the document's JSON-LD blocks.
///
/// At most one node per schema category is used: a category with several
/// matching nodes is ambiguous and skipped.
#[must_use]
pub fn extract_json_ld(doc: &Document) -> JsonLd {
    let nodes = collect_nodes(doc);
    let mut json_ld = JsonLd::default();

    for (category, types) in CATEGORIES {
        let matches: Vec<&Map<String, Value>> = nodes
            .iter()
            .filter(|n| node_type(n).is_some_and(|t| types.contains(&t)))
            .collect();
        match matches.as_slice() {
            [node] => json_ld.merge(node),
            [] => debug!(category, "no JSON-LD node found"),
            _ => debug!(category, count = matches.len(), "several JSON-LD nodes found"),
        }
    }

    json_ld
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_ld(scripts: &[&str]) -> JsonLd {
        let body: String = scripts
            .iter()
            .map(|s| format!(r#"<script type="application/ld+json">{s}</script>"#))
            .collect();
        let html = format!("<html><head>{body}</head><body></body></html>");
        extract_json_ld(&Document::from(html.as_str()))
    }

    #[test]
    fn test_news_article_fields() {
        let ld = json_ld(&[r#"{
            "@context": "https://schema.org",
            "@type": "NewsArticle",
            "headline": " Storm hits coast ",
            "datePublished": "2024-02-03T10:00:00+08:00",
            "url": "https://news.example.com/storm",
            "author": [{"@type": "Person", "name": "Jane Doe", "url": "https://news.example.com/jane"},
                       {"@type": "Person", "name": "  "}],
            "publisher": {"@type": "Organization", "name": "Example News", "url": "not-a-url"},
            "image": {"@type": "ImageObject", "url": "https://img.example.com/a.jpg"},
            "keywords": "storm, weather, ,coast",
            "articleSection": ["World", " "]
        }"#]);
        assert_eq!(ld.headline.as_deref(), Some("Storm hits coast"));
        assert_eq!(ld.date_published.as_deref(), Some("2024-02-03T10:00:00+08:00"));
        assert_eq!(ld.url.as_deref(), Some("https://news.example.com/storm"));
        assert_eq!(ld.author.len(), 1);
        assert_eq!(ld.author[0].name, "Jane Doe");
        assert_eq!(ld.publisher[0].url, None);
        assert_eq!(ld.image, vec!["https://img.example.com/a.jpg"]);
        assert_eq!(ld.keywords, vec!["storm", "weather", "coast"]);
        assert_eq!(ld.article_section, vec!["World"]);
    }

    #[test]
    fn test_graph_members_and_category_priority() {
        let ld = json_ld(&[r#"{
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "WebPage", "name": "Page name", "description": "page"},
                {"@type": ["Article", "Thing"], "name": "Article name"}
            ]
        }"#]);
        assert_eq!(ld.name.as_deref(), Some("Article name"));
        assert_eq!(ld.description.as_deref(), Some("page"));
    }

    #[test]
    fn test_graph_context_is_distributed() {
        let html = r#"<script type="application/ld+json">
            {"@context": "https://schema.org", "@graph": [{"@type": "WebPage"}, {"@context": "x", "@type": "Thing"}]}
        </script>"#;
        let nodes = collect_nodes(&Document::from(html));
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0]["@context"], "https://schema.org");
        assert_eq!(nodes[1]["@context"], "x");
    }

    #[test]
    fn test_ambiguous_category_is_skipped() {
        let ld = json_ld(&[
            r#"{"@type": "NewsArticle", "headline": "one"}"#,
            r#"{"@type": "NewsArticle", "headline": "two"}"#,
        ]);
        assert_eq!(ld.headline, None);
    }

    #[test]
    fn test_malformed_block_does_not_hide_others() {
        let ld = json_ld(&[
            r#"{"@type": "NewsArticle", "headline": }"#,
            r#"[{"@type": "BlogPosting", "headline": "Blog
title"}]"#,
        ]);
        assert_eq!(ld.headline.as_deref(), Some("Blog title"));
    }
}
