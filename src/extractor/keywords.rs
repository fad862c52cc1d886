//! Keyword collection from structured data, meta tags and tag links.

use std::collections::HashSet;

use tracing::debug;

use crate::dom::{NodeId, Tree};
use crate::metadata::Metadata;
use crate::selector::{select, AttrTest, Rule};
use crate::text::{is_lower_case, is_title_case, is_upper_case, normalize_field, trimmed};

/// Anchors pointing at a tag page.
const TAG_LINKS: &[Rule] = &[
    Rule::with_attr("a", "rel", AttrTest::Equals("tag")),
    Rule::with_attr("a", "href", AttrTest::Contains("/tag/")),
    Rule::with_attr("a", "href", AttrTest::Contains("/tags/")),
];

/// Keywords and the sources that contributed to them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords {
    pub values: Vec<String>,
    pub methods: Vec<&'static str>,
}

/// Comma-separated keyword list from the first `<meta name=...>` in
/// `<head>`.
fn meta_keywords(tree: &Tree, name: &'static str) -> Vec<String> {
    let Some(head) = tree.find_element("head") else {
        return Vec::new();
    };
    let rule = [Rule::with_attr("meta", "name", AttrTest::Equals(name))];
    select(tree, head, &rule)
        .first()
        .and_then(|&m| tree.attr(m, "content"))
        .map(|content| content.split(',').filter_map(trimmed).collect())
        .unwrap_or_default()
}

/// Text of an element whose only content is one string, possibly nested
/// in single-child wrappers.
fn sole_string(tree: &Tree, mut id: NodeId) -> Option<&str> {
    loop {
        let [only] = tree.children(id) else {
            return None;
        };
        if let Some(text) = tree.text(*only) {
            return Some(text);
        }
        id = *only;
    }
}

fn tag_link_keywords(tree: &Tree) -> Vec<String> {
    select(tree, tree.root(), TAG_LINKS)
        .into_iter()
        .filter_map(|a| sole_string(tree, a).and_then(trimmed))
        .collect()
}

/// Collect keywords from every source, in priority order.
///
/// A source is credited only when it adds a value not seen before.
#[must_use]
pub fn keywords(tree: &Tree, metadata: &Metadata) -> Keywords {
    let sources: [(Vec<String>, &'static str); 5] = [
        (metadata.json_ld.keywords.clone(), "json_ld"),
        (metadata.open_graph.tags.clone(), "ogp"),
        (meta_keywords(tree, "keywords"), "keywords"),
        (meta_keywords(tree, "news_keywords"), "news_keywords"),
        (tag_link_keywords(tree), "anchor"),
    ];

    let mut seen: HashSet<String> = HashSet::new();
    let mut collected = Vec::new();
    let mut methods = Vec::new();
    for (values, method) in sources {
        let before = collected.len();
        for value in values {
            if !value.is_empty() && seen.insert(value.clone()) {
                collected.push(value);
            }
        }
        if collected.len() > before {
            debug!(method, added = collected.len() - before, "keywords found");
            methods.push(method);
        }
    }

    Keywords {
        values: unify_case(collected),
        methods,
    }
}

/// Normalize, drop duplicates that differ only in case and sort.
///
/// Among case variants, a title-case spelling wins, then upper case, then
/// lower case, then the first seen.
#[must_use]
pub fn unify_case(values: Vec<String>) -> Vec<String> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for value in values.iter().map(|v| normalize_field(v)) {
        if value.is_empty() || !seen.insert(value.clone()) {
            continue;
        }
        let key = value.to_lowercase();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, variants)) => variants.push(value),
            None => groups.push((key, vec![value])),
        }
    }

    let preferences: [fn(&str) -> bool; 3] = [is_title_case, is_upper_case, is_lower_case];
    let mut unified: Vec<String> = groups
        .into_iter()
        .filter_map(|(_, variants)| {
            let preferred = preferences
                .iter()
                .find_map(|test| variants.iter().find(|v| test(v.as_str())))
                .or_else(|| variants.first())?;
            Some(preferred.clone())
        })
        .collect();
    unified.sort();
    unified
}
