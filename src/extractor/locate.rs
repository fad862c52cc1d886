//! Content localization: the base tag and the top tag.
//!
//! The base tag is the smallest structural element believed to hold the
//! whole article (title, media, bylines, body). The top tag is the narrower
//! element holding the body text: the best common ancestor of the largest
//! group of paragraph-like elements that share a structural path.
//!
//! Both searches read the link-density [`Annotations`] of the cleaned tree.

use tracing::{debug, info};

use crate::dom::{NodeId, Tree};
use crate::error::{Error, Result};
use crate::link_density::Annotations;
use crate::options::Options;
use crate::selector::{matches_any, AttrTest, Rule};
use crate::tags::{LINK_HEAVY_SECTION_TAGS, TOP_TAG_CANDIDATES};

macro_rules! schema_article {
    ($tag:literal) => {
        &[
            Rule::with_attr($tag, "itemtype", AttrTest::Contains("schema.org/NewsArticle")),
            Rule::with_attr($tag, "itemtype", AttrTest::Contains("schema.org/Article")),
            Rule::with_attr($tag, "itemtype", AttrTest::Contains("schema.org/BlogPosting")),
        ]
    };
}

macro_rules! main_content {
    ($($tag:literal),+) => {
        &[$(
            Rule::with_attr($tag, "id", AttrTest::Equals("article")),
            Rule::with_attr($tag, "id", AttrTest::Equals("main")),
            Rule::with_attr($tag, "role", AttrTest::StartsWith("article")),
            Rule::with_attr($tag, "role", AttrTest::StartsWith("main")),
        )+]
    };
}

/// Base tag candidates, most specific first. The last group is the body.
const BASE_TAG_SELECTORS: &[&[Rule]] = &[
    schema_article!("article"),
    schema_article!("main"),
    schema_article!("section"),
    schema_article!("div"),
    main_content!("article"),
    &[Rule::tag("article")],
    main_content!("main"),
    &[Rule::tag("main")],
    main_content!("section", "div"),
    &[
        Rule::with_attr("section", "itemtype", AttrTest::Contains("schema.org/WebPage")),
        Rule::with_attr("div", "itemtype", AttrTest::Contains("schema.org/WebPage")),
    ],
    &[Rule::tag("body")],
];

/// Elements of `scope` (itself included) matching `rules`.
fn select_with_self(tree: &Tree, scope: NodeId, rules: &[Rule]) -> Vec<NodeId> {
    let mut matches = Vec::new();
    if matches_any(rules, tree, scope) {
        matches.push(scope);
    }
    matches.extend(tree.find_all(scope, |t, n| matches_any(rules, t, n)));
    matches
}

/// First element with the most characters.
fn largest(annotations: &Annotations, candidates: &[NodeId]) -> Option<NodeId> {
    candidates.iter().copied().fold(None, |best, c| match best {
        Some(b) if annotations.total_chars(b) >= annotations.total_chars(c) => Some(b),
        _ => Some(c),
    })
}

/// Locate the base tag under `body`.
///
/// The largest match of each selector group in turn is accepted when it
/// holds more than `base_tag_chars_ratio` of the body's characters. A body
/// without text is its own base tag.
#[must_use]
pub fn find_base_tag(
    tree: &Tree,
    annotations: &Annotations,
    body: NodeId,
    options: &Options,
) -> NodeId {
    let body_chars = annotations.total_chars(body);
    if body_chars == 0 {
        debug!("body has no text, using it as base tag");
        return body;
    }
    for (stage, rules) in BASE_TAG_SELECTORS.iter().enumerate() {
        let candidates = select_with_self(tree, body, rules);
        let Some(choice) = largest(annotations, &candidates) else {
            continue;
        };
        let chars = annotations.total_chars(choice);
        let ratio = chars as f64 / body_chars as f64;
        if ratio > options.base_tag_chars_ratio {
            debug!(
                stage = stage + 1,
                tag = tree.tag(choice).unwrap_or_default(),
                chars,
                body_chars,
                "found base tag"
            );
            return choice;
        }
    }
    body
}

/// Number of edges from `ancestor` down to `node`.
///
/// # Errors
///
/// Returns [`Error::NotDescendant`] when `node` is neither `ancestor` nor
/// beneath it.
pub fn ancestral_distance(tree: &Tree, ancestor: NodeId, node: NodeId) -> Result<usize> {
    if node == ancestor {
        return Ok(0);
    }
    tree.ancestors(node)
        .position(|a| a == ancestor)
        .map(|i| i + 1)
        .ok_or(Error::NotDescendant {
            ancestor: ancestor.index(),
            node: node.index(),
        })
}

/// Deepest node that is `tag` or an ancestor of `tag` for every tag given.
#[must_use]
pub fn lowest_common_ancestor(tree: &Tree, tags: &[NodeId]) -> Option<NodeId> {
    let (&first, rest) = tags.split_first()?;
    std::iter::once(first)
        .chain(tree.ancestors(first))
        .find(|&candidate| rest.iter().all(|&t| tree.contains(candidate, t)))
}

/// Common ancestor of the heaviest subset of `tags` lying within
/// `max_levels` of it.
///
/// Starting from the lowest common ancestor, descend into the child holding
/// the most characters of the remaining tags while any of them is too deep,
/// then return the lowest common ancestor of what is left.
///
/// # Errors
///
/// Propagates [`Error::NotDescendant`] should the descent lose a tag.
pub fn best_common_ancestor(
    tree: &Tree,
    annotations: &Annotations,
    tags: &[NodeId],
    max_levels: usize,
) -> Result<Option<NodeId>> {
    match tags {
        [] => return Ok(None),
        [only] => return Ok(Some(*only)),
        _ => {}
    }
    let Some(mut current) = lowest_common_ancestor(tree, tags) else {
        return Ok(None);
    };
    let mut remaining = tags.to_vec();

    loop {
        let mut near = true;
        for &tag in &remaining {
            if ancestral_distance(tree, current, tag)? > max_levels {
                near = false;
                break;
            }
        }
        if near {
            break;
        }

        let mut best: Option<(NodeId, Vec<NodeId>)> = None;
        let mut best_sum = 0;
        for child in tree.element_children(current) {
            let contained: Vec<NodeId> = remaining
                .iter()
                .copied()
                .filter(|&t| tree.contains(child, t))
                .collect();
            let sum = annotations.total_chars_of(&contained);
            if sum > best_sum {
                best_sum = sum;
                best = Some((child, contained));
            }
        }
        let Some((child, contained)) = best else {
            debug!("no child holds any text, stopping descent");
            break;
        };
        current = child;
        remaining = contained;
    }

    Ok(lowest_common_ancestor(tree, &remaining))
}

/// Whether every child of `id` is blank text or an element of `group`.
///
/// Such an element adds nothing beyond its listed children. An element with
/// no children at all qualifies.
pub(crate) fn only_wraps(tree: &Tree, id: NodeId, group: &[NodeId]) -> bool {
    tree.children(id).iter().all(|&c| match tree.text(c) {
        Some(text) => text.trim().is_empty(),
        None => !tree.is_element(c) || group.contains(&c),
    })
}

/// Locate the top tag under `base`.
///
/// # Errors
///
/// Propagates [`Error::NotDescendant`] from the common-ancestor search.
pub fn find_top_tag(
    tree: &Tree,
    annotations: &Annotations,
    base: NodeId,
    options: &Options,
) -> Result<NodeId> {
    for candidates in TOP_TAG_CANDIDATES {
        let mut tags = tree.find_tags(base, candidates);
        if tags.is_empty() {
            info!(?candidates, "no candidate tags in base tag");
            continue;
        }

        let low_density: Vec<NodeId> = tags
            .iter()
            .copied()
            .filter(|&t| annotations.link_density(t) < options.link_density_upper_bound)
            .collect();
        if low_density.len() >= options.min_tags_to_check {
            tags = low_density;
        }

        // Character totals per structural parent path, in first-seen order.
        let mut groups: Vec<(String, usize, Vec<NodeId>)> = Vec::new();
        for &tag in &tags {
            if only_wraps(tree, tag, &tags) {
                continue;
            }
            let path = tree
                .parent(tag)
                .map(|p| tree.reduced_path(p))
                .unwrap_or_default();
            let chars = annotations.total_chars(tag);
            match groups.iter_mut().find(|(p, _, _)| *p == path) {
                Some((_, total, members)) => {
                    *total += chars;
                    members.push(tag);
                }
                None => groups.push((path, chars, vec![tag])),
            }
        }

        let heaviest = groups.into_iter().fold(None, |best: Option<(String, usize, Vec<NodeId>)>, g| {
            match best {
                Some(b) if b.1 >= g.1 => Some(b),
                _ => Some(g),
            }
        });
        let Some((path, chars, members)) = heaviest else {
            debug!(?candidates, "every candidate only wraps other candidates");
            continue;
        };
        debug!(path, chars, count = members.len(), "paragraph group selected");

        if let Some(top) = best_common_ancestor(tree, annotations, &members, options.max_levels)? {
            return Ok(top);
        }
    }
    info!("setting top tag to base tag");
    Ok(base)
}

/// Detach link-heavy sections under `scope`, one at a time, until none is
/// left.
pub fn remove_link_heavy_sections(
    tree: &mut Tree,
    annotations: &Annotations,
    scope: NodeId,
    upper_bound: f64,
) {
    while let Some(section) = tree
        .find_tags(scope, LINK_HEAVY_SECTION_TAGS)
        .into_iter()
        .find(|&s| annotations.link_density(s) > upper_bound)
    {
        debug!(
            tag = tree.tag(section).unwrap_or_default(),
            density = annotations.link_density(section),
            "removing link-heavy section"
        );
        tree.detach(section);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::Cleaner;

    fn cleaned(html: &str) -> (Tree, Annotations, Options) {
        let options = Options::default();
        let mut tree = Tree::parse(html);
        let annotations = Cleaner::new(&options).clean(&mut tree);
        (tree, annotations, options)
    }

    const PARAGRAPH: &str = "This is a long paragraph of article text that easily outweighs the navigation.";

    #[test]
    fn test_base_tag_prefers_schema_article() {
        let html = format!(
            r#"<body><div id="main"><article itemtype="https://schema.org/NewsArticle">
                <p>{PARAGRAPH}</p><p>{PARAGRAPH}</p></article><p>short</p></div></body>"#
        );
        let (tree, annotations, options) = cleaned(&html);
        let body = tree.body().unwrap();
        let base = find_base_tag(&tree, &annotations, body, &options);
        assert_eq!(tree.tag(base), Some("article"));
    }

    #[test]
    fn test_base_tag_falls_back_to_body() {
        let html = format!(
            r#"<body><article><p>tiny</p></article><div><p>{PARAGRAPH}</p></div></body>"#
        );
        let (tree, annotations, options) = cleaned(&html);
        let body = tree.body().unwrap();
        assert_eq!(find_base_tag(&tree, &annotations, body, &options), body);
    }

    #[test]
    fn test_ancestral_distance() {
        let tree = Tree::parse("<div><section><p>x</p></section></div><span>y</span>");
        let div = tree.find_element("div").unwrap();
        let p = tree.find_element("p").unwrap();
        let span = tree.find_element("span").unwrap();
        assert_eq!(ancestral_distance(&tree, div, p).unwrap(), 2);
        assert_eq!(ancestral_distance(&tree, p, p).unwrap(), 0);
        assert!(matches!(
            ancestral_distance(&tree, div, span),
            Err(Error::NotDescendant { .. })
        ));
    }

    #[test]
    fn test_lowest_common_ancestor_includes_self() {
        let tree = Tree::parse("<div><p>a</p><section><p>b</p></section></div>");
        let div = tree.find_element("div").unwrap();
        let section = tree.find_element("section").unwrap();
        let ps = tree.find_tags(div, &["p"]);
        assert_eq!(lowest_common_ancestor(&tree, &ps), Some(div));
        assert_eq!(lowest_common_ancestor(&tree, &[section, ps[1]]), Some(section));
        assert_eq!(lowest_common_ancestor(&tree, &[]), None);
    }

    #[test]
    fn test_best_common_ancestor_descends_past_deep_outliers() {
        let html = format!(
            r#"<body>
                <div id="story"><p>{PARAGRAPH}</p><p>{PARAGRAPH}</p></div>
                <div><div><div><div><div><div><p>deep aside</p></div></div></div></div></div></div>
            </body>"#
        );
        let (tree, annotations, _) = cleaned(&html);
        let body = tree.body().unwrap();
        let ps = tree.find_tags(body, &["p"]);
        let story = tree.find_element("div").unwrap();
        let bca = best_common_ancestor(&tree, &annotations, &ps, 5).unwrap();
        assert_eq!(bca, Some(story));
        assert_eq!(best_common_ancestor(&tree, &annotations, &ps, 20).unwrap(), Some(body));
    }

    #[test]
    fn test_top_tag_is_inside_base_tag() {
        let html = format!(
            r#"<body>
                <div class="menu"><p><a href="/a">Home</a> <a href="/b">World</a></p></div>
                <div class="story"><p>{PARAGRAPH}</p><p>{PARAGRAPH}</p><p>{PARAGRAPH}</p></div>
            </body>"#
        );
        let (tree, annotations, options) = cleaned(&html);
        let body = tree.body().unwrap();
        let base = find_base_tag(&tree, &annotations, body, &options);
        let top = find_top_tag(&tree, &annotations, base, &options).unwrap();
        assert_eq!(tree.attr(top, "class"), Some("story"));
        assert!(tree.contains(base, top));
    }

    #[test]
    fn test_top_tag_without_candidates_is_base() {
        let (tree, annotations, options) = cleaned("<body>bare text only</body>");
        let body = tree.body().unwrap();
        assert_eq!(find_top_tag(&tree, &annotations, body, &options).unwrap(), body);
    }

    #[test]
    fn test_link_heavy_sections_are_removed() {
        let html = format!(
            r#"<body><div id="keep"><p>{PARAGRAPH}</p>
               <ul><li><a href="/1">One link</a></li><li><a href="/2">Two link</a></li></ul></div></body>"#
        );
        let (mut tree, annotations, options) = cleaned(&html);
        let keep = tree.find_element("div").unwrap();
        remove_link_heavy_sections(&mut tree, &annotations, keep, options.link_density_upper_bound);
        assert!(tree.find_element("ul").is_none());
        assert!(tree.find_element("p").is_some());
    }
}
