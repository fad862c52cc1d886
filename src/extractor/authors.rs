//! Author detection.
//!
//! Byline markup is searched in the top tag, then the base tag, then the
//! body, one selector group at a time from the most specific to the least.
//! Structured data and meta tags are only consulted when no markup matches.

use std::collections::HashSet;

use tracing::debug;
use url::Url;

use super::fields::Sourced;
use crate::assets::process_img;
use crate::dom::{NodeId, Tree};
use crate::metadata::Metadata;
use crate::result::Author;
use crate::selector::{select, AttrTest, Rule};
use crate::text::{similarity, trimmed};
use crate::url_utils::resolve_href;

/// Selector groups, most specific first.
const AUTHOR_SELECTORS: &[&[Rule]] = &[
    &[
        Rule::with_attr("a", "rel", AttrTest::Equals("author")),
        Rule::with_attr("a", "href", AttrTest::Contains("/author/")),
        Rule::with_attr("a", "href", AttrTest::Contains("/author?")),
        Rule::with_attr("a", "href", AttrTest::Contains("/authors/")),
        Rule::with_attr("a", "href", AttrTest::Contains("/authors?")),
    ],
    &[
        Rule::class("a", "author"),
        Rule::class("a", "authors"),
        Rule::class("a", "author-url"),
        Rule::class("a", "author-name"),
        Rule::with_attr("a", "href", AttrTest::Contains("/profile/")),
        Rule::with_attr("a", "href", AttrTest::Contains("/profile?")),
        Rule::with_attr("a", "href", AttrTest::Contains("/people/")),
        Rule::with_attr("a", "href", AttrTest::Contains("/people?")),
        Rule::with_attr("a", "href", AttrTest::Contains("/byline/")),
        Rule::with_attr("a", "href", AttrTest::Contains("/byline?")),
    ],
    &[
        Rule::any_with_attr("id", AttrTest::Equals("penulis")),
        Rule::any_with_attr("id", AttrTest::Equals("author")),
    ],
    &[
        Rule::class("span", "author"),
        Rule::class("span", "author-name"),
        Rule::class("span", "articleauthor"),
        Rule::class("div", "author"),
        Rule::class("div", "author-name"),
        Rule::class("div", "articleauthor"),
    ],
    &[
        Rule::with_attr("span", "class", AttrTest::Contains("author")),
        Rule::with_attr("div", "class", AttrTest::Contains("author")),
    ],
    &[Rule::any_with_attr("id", AttrTest::Equals("editor"))],
];

/// Value prefixes that make a meta author a URL rather than a name.
const URL_PREFIXES: &[&str] = &["http://", "https://", "ftp://", "//"];

fn has_any_field(author: &Author) -> bool {
    author.name.is_some() || author.url.is_some() || author.image_url.is_some()
}

/// Reads author items out of byline markup.
struct BylineReader<'a> {
    tree: &'a Tree,
    base: Option<&'a Url>,
}

impl BylineReader<'_> {
    fn image_in(&self, id: NodeId) -> Option<String> {
        let img = self.tree.find_first_tag(id, "img")?;
        let image = process_img(self.tree, img)?;
        resolve_href(&image.src, self.base)
    }

    /// Author item of one anchor; `fallback_name` is used for empty anchors.
    fn anchor(&self, a: NodeId, fallback_name: Option<&str>) -> Option<Author> {
        let author = Author {
            name: trimmed(&self.tree.text_content(a)).or_else(|| fallback_name.map(str::to_string)),
            url: self
                .tree
                .attr(a, "href")
                .and_then(|href| resolve_href(href, self.base)),
            image_url: self.image_in(a),
        };
        has_any_field(&author).then_some(author)
    }

    /// Author items of a non-anchor container: one per anchor inside it,
    /// else the container's own text.
    fn container(&self, id: NodeId) -> Vec<Author> {
        let name = trimmed(&self.tree.text_content(id));
        let found: Vec<Author> = self
            .tree
            .find_tags(id, &["a"])
            .into_iter()
            .filter_map(|a| self.anchor(a, name.as_deref()))
            .collect();
        if !found.is_empty() {
            return found;
        }
        match name {
            Some(name) => vec![Author {
                name: Some(name),
                url: None,
                image_url: self.image_in(id),
            }],
            None => Vec::new(),
        }
    }

    fn group(&self, scope: NodeId, rules: &[Rule]) -> Vec<Author> {
        select(self.tree, scope, rules)
            .into_iter()
            .flat_map(|id| {
                if self.tree.is_tag(id, "a") {
                    self.anchor(id, None).into_iter().collect::<Vec<_>>()
                } else {
                    self.container(id)
                }
            })
            .collect()
    }
}

/// First non-empty result of the selector groups over the containers.
#[must_use]
pub fn scan_bylines(tree: &Tree, containers: &[NodeId], base: Option<&Url>) -> Vec<Author> {
    let reader = BylineReader { tree, base };
    for &container in containers {
        for (i, rules) in AUTHOR_SELECTORS.iter().enumerate() {
            let found = reader.group(container, rules);
            if !found.is_empty() {
                debug!(group = i, count = found.len(), "authors found in markup");
                return found;
            }
        }
    }
    Vec::new()
}

/// Author from a free-form meta value: URL-looking values fill `url`.
fn author_from_value(value: &str, base: Option<&Url>) -> Option<Author> {
    let value = value.trim();
    let author = if URL_PREFIXES.iter().any(|p| value.starts_with(p)) {
        Author {
            url: resolve_href(value, base),
            ..Author::default()
        }
    } else {
        Author {
            name: trimmed(value),
            ..Author::default()
        }
    };
    has_any_field(&author).then_some(author)
}

/// `<meta name=author>` values in `<head>`.
fn head_authors(tree: &Tree, base: Option<&Url>) -> Vec<Author> {
    let Some(head) = tree.find_element("head") else {
        return Vec::new();
    };
    select(tree, head, &[Rule::with_attr("meta", "name", AttrTest::Equals("author"))])
        .into_iter()
        .filter_map(|m| tree.attr(m, "content"))
        .filter_map(|content| author_from_value(content, base))
        .collect()
}

/// Last non-empty piece of a URL, split on `/` and then on `=`.
fn url_name(url: &str) -> &str {
    let segment = url.rsplit('/').find(|s| !s.is_empty()).unwrap_or_default();
    segment.rsplit('=').find(|s| !s.is_empty()).unwrap_or_default()
}

/// Deduplicate and merge items sharing a URL.
///
/// Merged items take the name most similar to the URL's last segment and the
/// first image seen. Items without a URL are kept as they are.
#[must_use]
pub fn merge_authors(authors: Vec<Author>) -> Vec<Author> {
    let mut seen = HashSet::new();
    let unique: Vec<Author> = authors.into_iter().filter(|a| seen.insert(a.clone())).collect();

    let urls: HashSet<&str> = unique.iter().filter_map(|a| a.url.as_deref()).collect();
    if unique.len() <= 1 || urls.len() == unique.len() {
        return unique;
    }

    let mut by_url: Vec<(String, Vec<&Author>)> = Vec::new();
    let mut without_url = Vec::new();
    for author in &unique {
        match &author.url {
            Some(url) => match by_url.iter_mut().find(|(u, _)| u == url) {
                Some((_, group)) => group.push(author),
                None => by_url.push((url.clone(), vec![author])),
            },
            None => without_url.push(author.clone()),
        }
    }

    let mut merged: Vec<Author> = by_url
        .into_iter()
        .map(|(url, group)| {
            let target = url_name(&url).to_lowercase();
            let mut name: Option<&str> = None;
            let mut best = f64::MIN;
            for candidate in group.iter().filter_map(|a| a.name.as_deref()) {
                let score = similarity(&candidate.to_lowercase(), &target);
                if score > best {
                    best = score;
                    name = Some(candidate);
                }
            }
            Author {
                name: name.map(str::to_string),
                image_url: group.iter().find_map(|a| a.image_url.clone()),
                url: Some(url),
            }
        })
        .collect();
    merged.extend(without_url);
    merged.sort();
    merged
}

/// Article authors.
///
/// `tree` is the cleaned tree holding `containers`; meta tags are read from
/// `pristine`.
#[must_use]
pub fn authors(
    tree: &Tree,
    containers: &[NodeId],
    pristine: &Tree,
    metadata: &Metadata,
    base: Option<&Url>,
) -> Option<Sourced<Vec<Author>>> {
    let from_markup = scan_bylines(tree, containers, base);
    if !from_markup.is_empty() {
        return Some(Sourced::new(merge_authors(from_markup), "a"));
    }

    let from_json_ld: Vec<Author> = metadata
        .json_ld
        .author
        .iter()
        .map(|entity| Author {
            name: Some(entity.name.clone()),
            url: entity.url.clone(),
            image_url: None,
        })
        .collect();
    if !from_json_ld.is_empty() {
        return Some(Sourced::new(merge_authors(from_json_ld), "json_ld"));
    }

    let from_head = head_authors(pristine, base);
    if !from_head.is_empty() {
        return Some(Sourced::new(merge_authors(from_head), "head"));
    }

    let from_og: Vec<Author> = metadata
        .open_graph
        .authors
        .iter()
        .filter_map(|value| author_from_value(value, base))
        .collect();
    if !from_og.is_empty() {
        return Some(Sourced::new(merge_authors(from_og), "ogp"));
    }

    debug!("no authors found");
    None
}
