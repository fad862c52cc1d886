//! Short fields: page URL, title, description, language and timestamps.
//!
//! Each field walks a priority chain of sources and keeps the first usable
//! value, reporting which source produced it. These run on the document as
//! parsed, before any cleaning.

use tracing::{debug, info};
use url::Url;

use crate::date_utils::parse_to_iso;
use crate::dom::{NodeId, Tree};
use crate::language::canonicalize;
use crate::metadata::Metadata;
use crate::patterns::{LOCALE_CHARS, TITLE_SEPARATOR};
use crate::selector::{select, AttrTest, Rule};
use crate::text::non_empty_field;
use crate::url_utils::{create_absolute_url, has_web_scheme, is_valid_url};

/// A field value and the name of the source it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sourced<T> {
    pub value: T,
    pub method: &'static str,
}

impl<T> Sourced<T> {
    pub(crate) fn new(value: T, method: &'static str) -> Self {
        debug!(method, "field source chosen");
        Self { value, method }
    }
}

/// How a microdata property takes its value from the element carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItempropValue {
    /// `meta`
    Content,
    /// Media elements, resolved.
    Src,
    /// `a`, `area`, `link`, resolved.
    Href,
    /// `object`, resolved.
    Data,
    /// `data`, `meter`
    Value,
    /// `time`: `datetime`, else its own text.
    Datetime,
    /// Any other element.
    Text,
}

impl ItempropValue {
    #[must_use]
    pub fn for_tag(tag: &str) -> Self {
        match tag {
            "meta" => Self::Content,
            "audio" | "embed" | "iframe" | "img" | "source" | "track" | "video" => Self::Src,
            "a" | "area" | "link" => Self::Href,
            "object" => Self::Data,
            "data" | "meter" => Self::Value,
            "time" => Self::Datetime,
            _ => Self::Text,
        }
    }
}

/// Microdata value of an element carrying `itemprop`.
#[must_use]
pub fn itemprop_value(tree: &Tree, id: NodeId, base: Option<&Url>) -> Option<String> {
    let tag = tree.tag(id)?;
    let resolved = |attr: &str| tree.attr(id, attr).map(|v| create_absolute_url(v, base));
    match ItempropValue::for_tag(tag) {
        ItempropValue::Content => tree.attr(id, "content").map(str::to_string),
        ItempropValue::Src => resolved("src"),
        ItempropValue::Href => resolved("href"),
        ItempropValue::Data => resolved("data"),
        ItempropValue::Value => tree.attr(id, "value").map(str::to_string),
        ItempropValue::Datetime => tree
            .attr(id, "datetime")
            .filter(|d| !d.trim().is_empty())
            .map_or_else(|| Some(tree.direct_text(id)), |d| Some(d.to_string())),
        ItempropValue::Text => Some(tree.text_content(id)),
    }
}

/// Elements anywhere in the document whose `itemprop` lists `name`.
fn with_itemprop(tree: &Tree, name: &'static str) -> Vec<NodeId> {
    select(tree, tree.root(), &[Rule::any_with_attr("itemprop", AttrTest::Word(name))])
}

/// `<head>` descendants matching `rule`.
fn in_head(tree: &Tree, rule: Rule) -> Vec<NodeId> {
    tree.find_element("head")
        .map(|head| select(tree, head, &[rule]))
        .unwrap_or_default()
}

/// Content of the first `<meta name=...>` in `<head>`.
fn head_meta(tree: &Tree, name: &'static str) -> Option<String> {
    let meta = in_head(tree, Rule::with_attr("meta", "name", AttrTest::Equals(name)));
    meta.first()
        .and_then(|&m| tree.attr(m, "content"))
        .and_then(non_empty_field)
}

/// Canonical page URL.
///
/// Sources: `<link rel=canonical>`, `og:url`, `<link rel=alternate hreflang>`,
/// JSON-LD `url`.
#[must_use]
pub fn page_url(tree: &Tree, metadata: &Metadata) -> Option<Sourced<String>> {
    let usable = |href: &str| has_web_scheme(href) && is_valid_url(href);

    let canonical: Vec<String> = in_head(tree, Rule::with_attr("link", "rel", AttrTest::Equals("canonical")))
        .into_iter()
        .filter_map(|l| tree.attr(l, "href").map(str::trim))
        .filter(|href| usable(href))
        .map(str::to_string)
        .collect();
    if let Some(first) = canonical.first() {
        if canonical.iter().any(|c| c != first) {
            debug!(count = canonical.len(), "several canonical links, using the first");
        }
        return Some(Sourced::new(first.clone(), "canonical"));
    }

    if let Some(url) = &metadata.open_graph.url {
        return Some(Sourced::new(url.clone(), "ogp"));
    }

    let alternate = in_head(tree, Rule::with_attr("link", "rel", AttrTest::Equals("alternate")))
        .into_iter()
        .filter(|&l| tree.has_attr(l, "hreflang"))
        .filter_map(|l| tree.attr(l, "href").map(str::trim))
        .find(|href| usable(href));
    if let Some(url) = alternate {
        return Some(Sourced::new(url.to_string(), "alternate"));
    }

    if let Some(url) = &metadata.json_ld.url {
        return Some(Sourced::new(url.clone(), "json_ld"));
    }

    info!("no page url found");
    None
}

/// Headings that name the article among several `<h1>`s.
const TITLED_H1: &[Rule] = &[
    Rule::with_attr("h1", "id", AttrTest::Contains("title")),
    Rule::with_attr("h1", "id", AttrTest::Contains("headline")),
    Rule::with_attr("h1", "class", AttrTest::Contains("title")),
    Rule::with_attr("h1", "class", AttrTest::Contains("headline")),
];

/// Longest separator-delimited part of a `<title>`, the first on ties.
#[must_use]
pub fn clean_title(title: &str) -> Option<String> {
    TITLE_SEPARATOR
        .split(title)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .fold(None::<&str>, |best, part| match best {
            Some(b) if b.chars().count() >= part.chars().count() => Some(b),
            _ => Some(part),
        })
        .map(str::to_string)
}

/// Article title.
///
/// Sources: JSON-LD `headline` then `name`, `og:title`, `itemprop=headline`,
/// a sole `<h1>`, a titled `<h1>`, then `<title>`.
#[must_use]
pub fn title(
    tree: &Tree,
    metadata: &Metadata,
    base: Option<&Url>,
    clean: bool,
) -> Option<Sourced<String>> {
    let structured = [
        (metadata.json_ld.headline.as_deref(), "json_ld_headline"),
        (metadata.json_ld.name.as_deref(), "json_ld_name"),
        (metadata.open_graph.title.as_deref(), "ogp"),
    ];
    for (value, method) in structured {
        if let Some(title) = value.and_then(non_empty_field) {
            return Some(Sourced::new(title, method));
        }
    }

    for id in with_itemprop(tree, "headline") {
        if let Some(title) = itemprop_value(tree, id, base).as_deref().and_then(non_empty_field) {
            return Some(Sourced::new(title, "itemprop_headline"));
        }
    }

    let h1s = tree.find_tags(tree.root(), &["h1"]);
    match h1s.as_slice() {
        [] => {}
        [only] => {
            if let Some(title) = non_empty_field(&tree.text_content(*only)) {
                return Some(Sourced::new(title, "h1"));
            }
        }
        _ => {
            for rule in TITLED_H1 {
                let titled = h1s.iter().find(|&&h| rule.matches(tree, h));
                if let Some(title) = titled.and_then(|&h| non_empty_field(&tree.text_content(h))) {
                    return Some(Sourced::new(title, "h1_title_headline"));
                }
            }
        }
    }

    let title_tag = tree
        .find_element("head")
        .and_then(|head| tree.find_first_tag(head, "title"))
        .or_else(|| tree.find_element("title"));
    let Some(title_tag) = title_tag else {
        info!("no title found");
        return None;
    };
    let text = tree.text_content(title_tag);
    let found = if clean {
        clean_title(&text)
            .and_then(|t| non_empty_field(&t))
            .map(|t| Sourced::new(t, "title_cleaned"))
    } else {
        non_empty_field(&text).map(|t| Sourced::new(t, "title"))
    };
    if found.is_none() {
        info!("no title found");
    }
    found
}

/// Article description.
///
/// Sources: `<meta name=description>`, JSON-LD, `og:description`,
/// `<meta name=twitter:description>`.
#[must_use]
pub fn description(tree: &Tree, metadata: &Metadata) -> Option<Sourced<String>> {
    if let Some(d) = head_meta(tree, "description") {
        return Some(Sourced::new(d, "head"));
    }
    let structured = [
        (metadata.json_ld.description.as_deref(), "json_ld"),
        (metadata.open_graph.description.as_deref(), "ogp"),
    ];
    for (value, method) in structured {
        if let Some(d) = value.and_then(non_empty_field) {
            return Some(Sourced::new(d, method));
        }
    }
    if let Some(d) = head_meta(tree, "twitter:description") {
        return Some(Sourced::new(d, "twitter"));
    }
    info!("no description found");
    None
}

/// Canonically cased BCP47 language tag.
///
/// Sources: `<html lang>`, JSON-LD `inLanguage`, `og:locale`.
#[must_use]
pub fn language(tree: &Tree, metadata: &Metadata) -> Option<Sourced<String>> {
    let html_lang = tree.find_element("html").and_then(|h| tree.attr(h, "lang"));
    if let Some(tag) = html_lang.and_then(|l| canonicalize(l.trim())) {
        return Some(Sourced::new(tag, "html"));
    }
    if let Some(tag) = metadata.json_ld.in_language.as_deref().and_then(canonicalize) {
        return Some(Sourced::new(tag, "json_ld"));
    }
    if let Some(locale) = metadata.open_graph.locale.as_deref() {
        if !LOCALE_CHARS.is_match(locale) {
            debug!(locale, "og:locale contains unexpected characters");
        }
        if let Some(tag) = canonicalize(locale) {
            return Some(Sourced::new(tag, "ogp"));
        }
    }
    info!("no language tag found");
    None
}

/// First parseable timestamp among `<time>` then `<meta>` elements whose
/// `itemprop` lists `name`.
fn microdata_timestamp(tree: &Tree, name: &'static str) -> Option<Sourced<String>> {
    let tagged = with_itemprop(tree, name);
    for (tag, method) in [("time", "time"), ("meta", "meta")] {
        let parsed = tagged
            .iter()
            .filter(|&&id| tree.is_tag(id, tag))
            .filter_map(|&id| itemprop_value(tree, id, None))
            .find_map(|raw| parse_to_iso(raw.trim()));
        if let Some(iso) = parsed {
            return Some(Sourced::new(iso, method));
        }
    }
    None
}

/// Publication timestamp, ISO-8601.
///
/// Sources: JSON-LD `datePublished`, `article:published_time`, JSON-LD
/// `dateCreated`, then microdata.
#[must_use]
pub fn published(tree: &Tree, metadata: &Metadata) -> Option<Sourced<String>> {
    let structured = [
        (&metadata.json_ld.date_published, "json_ld"),
        (&metadata.open_graph.published_time, "ogp"),
        (&metadata.json_ld.date_created, "json_ld"),
    ];
    let found = structured
        .into_iter()
        .find_map(|(value, method)| value.clone().map(|v| Sourced::new(v, method)))
        .or_else(|| microdata_timestamp(tree, "datePublished"));
    if found.is_none() {
        info!("no published timestamp found");
    }
    found
}

/// Modification timestamp, ISO-8601.
///
/// Sources: JSON-LD `dateModified`, `article:modified_time`, then microdata.
#[must_use]
pub fn modified(tree: &Tree, metadata: &Metadata) -> Option<Sourced<String>> {
    let structured = [
        (&metadata.json_ld.date_modified, "json_ld"),
        (&metadata.open_graph.modified_time, "ogp"),
    ];
    let found = structured
        .into_iter()
        .find_map(|(value, method)| value.clone().map(|v| Sourced::new(v, method)))
        .or_else(|| microdata_timestamp(tree, "dateModified"));
    if found.is_none() {
        info!("no modified timestamp found");
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::extract_metadata;
    use dom_query::Document;

    fn parse(html: &str) -> (Tree, Metadata) {
        let doc = Document::from(html);
        (Tree::from_document(&doc), extract_metadata(&doc))
    }

    #[test]
    fn test_title_prefers_structured_data() {
        let (tree, meta) = parse(
            r#"<html><head>
                <meta property="og:title" content="OG Title">
                <script type="application/ld+json">{"@type": "NewsArticle", "headline": "LD Headline"}</script>
                <title>Page - Site</title>
            </head><body><h1>Heading</h1></body></html>"#,
        );
        let t = title(&tree, &meta, None, true).unwrap();
        assert_eq!(t.value, "LD Headline");
        assert_eq!(t.method, "json_ld_headline");
    }

    #[test]
    fn test_title_falls_back_to_cleaned_title_tag() {
        let (tree, meta) = parse(
            "<html><head><title>Big Story Unfolds - My News</title></head><body><p>x</p></body></html>",
        );
        let t = title(&tree, &meta, None, true).unwrap();
        assert_eq!(t.value, "Big Story Unfolds");
        assert_eq!(t.method, "title_cleaned");

        let raw = title(&tree, &meta, None, false).unwrap();
        assert_eq!(raw.value, "Big Story Unfolds - My News");
        assert_eq!(raw.method, "title");
    }

    #[test]
    fn test_title_from_headings() {
        let (tree, meta) = parse("<body><h1> Only One </h1></body>");
        assert_eq!(title(&tree, &meta, None, true).unwrap().method, "h1");

        let (tree, meta) = parse(
            r#"<body><h1>Site</h1><h1 class="entry-title">The Real Title</h1></body>"#,
        );
        let t = title(&tree, &meta, None, true).unwrap();
        assert_eq!(t.value, "The Real Title");
        assert_eq!(t.method, "h1_title_headline");

        let (tree, meta) = parse(r#"<body><span itemprop="name headline">Micro</span><h1>H</h1></body>"#);
        assert_eq!(title(&tree, &meta, None, true).unwrap().method, "itemprop_headline");
    }

    #[test]
    fn test_clean_title_keeps_first_longest() {
        assert_eq!(clean_title("News | Sport - Weather").as_deref(), Some("Sport"));
        assert_eq!(clean_title("Well-known story").as_deref(), Some("Well-known story"));
        assert_eq!(clean_title("  -  "), None);
    }

    #[test]
    fn test_page_url_chain() {
        let (tree, meta) = parse(
            r#"<html><head>
                <link rel="canonical" href="/relative">
                <meta property="og:url" content="https://example.com/og">
            </head><body></body></html>"#,
        );
        let url = page_url(&tree, &meta).unwrap();
        assert_eq!(url.value, "https://example.com/og");
        assert_eq!(url.method, "ogp");

        let (tree, meta) = parse(
            r#"<html><head>
                <link rel="canonical" href="https://example.com/a">
                <link rel="canonical" href="https://example.com/b">
            </head><body></body></html>"#,
        );
        assert_eq!(page_url(&tree, &meta).unwrap().value, "https://example.com/a");

        let (tree, meta) = parse(
            r#"<html><head><link rel="alternate" hreflang="en" href="https://example.com/en"></head></html>"#,
        );
        assert_eq!(page_url(&tree, &meta).unwrap().method, "alternate");
    }

    #[test]
    fn test_description_and_language() {
        let (tree, meta) = parse(
            r#"<html lang="EN-gb"><head>
                <meta name="twitter:description" content="tweet">
                <meta property="og:description" content="  og  ">
            </head><body></body></html>"#,
        );
        let d = description(&tree, &meta).unwrap();
        assert_eq!((d.value.as_str(), d.method), ("og", "ogp"));
        let l = language(&tree, &meta).unwrap();
        assert_eq!((l.value.as_str(), l.method), ("en-GB", "html"));

        let (tree, meta) = parse(
            r#"<html lang="not a tag"><head><meta property="og:locale" content="pt_BR"></head></html>"#,
        );
        let l = language(&tree, &meta).unwrap();
        assert_eq!((l.value.as_str(), l.method), ("pt-BR", "ogp"));
    }

    #[test]
    fn test_timestamps_from_microdata() {
        let (tree, meta) = parse(
            r#"<body>
                <time itemprop="datePublished" datetime="not a date">x</time>
                <meta itemprop="datePublished" content="2023-05-01T09:30:00+02:00">
                <time itemprop="dateModified" datetime="2023-05-02">May 2</time>
            </body>"#,
        );
        let p = published(&tree, &meta).unwrap();
        assert_eq!(p.value, "2023-05-01T09:30:00+02:00");
        assert_eq!(p.method, "meta");
        let m = modified(&tree, &meta).unwrap();
        assert_eq!(m.method, "time");
        assert!(m.value.starts_with("2023-05-02"));
    }

    #[test]
    fn test_itemprop_values() {
        let tree = Tree::parse(
            r#"<a itemprop="url" href="/p">x</a><time itemprop="t">Monday</time><data itemprop="d" value="7">seven</data>"#,
        );
        let base = Url::parse("https://example.com/a/b").ok();
        let a = tree.find_element("a").unwrap();
        assert_eq!(
            itemprop_value(&tree, a, base.as_ref()).as_deref(),
            Some("https://example.com/p")
        );
        let time = tree.find_element("time").unwrap();
        assert_eq!(itemprop_value(&tree, time, None).as_deref(), Some("Monday"));
        let data = tree.find_element("data").unwrap();
        assert_eq!(itemprop_value(&tree, data, None).as_deref(), Some("7"));
    }
}
