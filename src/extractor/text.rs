//! Body text reconstruction.
//!
//! Works on a detached copy of the top tag so the shared tree stays intact
//! for asset extraction.

use tracing::debug;

use super::locate::{only_wraps, remove_link_heavy_sections};
use crate::cleaner::adjust_spacing;
use crate::dom::{NodeId, Tree};
use crate::link_density::Annotations;
use crate::options::Options;
use crate::tags::TEXT_TAG_SETS;
use crate::text::collapse_whitespace;

/// An anchor found inside a paragraph, before URL processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineLink {
    pub href: Option<String>,
    pub text: String,
}

/// Paragraph texts and the anchors they contained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleText {
    pub paragraphs: Vec<String>,
    pub links: Vec<InlineLink>,
}

/// First tag set whose elements hold at least `ratio` of the characters
/// under `scope`, else the broadest set.
fn choose_text_tags(tree: &Tree, annotations: &Annotations, scope: NodeId, ratio: f64) -> &'static [&'static str] {
    let total = annotations.total_chars(scope);
    for &set in TEXT_TAG_SETS {
        let found = annotations.total_chars_of(&tree.find_tags(scope, set));
        let share = if total == 0 { 0.0 } else { found as f64 / total as f64 };
        debug!(?set, found, total, "text tag set share");
        if share >= ratio {
            return set;
        }
    }
    TEXT_TAG_SETS.last().copied().unwrap_or_default()
}

/// Unwrap every markup element and anchor inside `paragraph`, recording the
/// anchors.
fn flatten_paragraph(tree: &mut Tree, paragraph: NodeId, options: &Options, links: &mut Vec<InlineLink>) {
    tree.merge_adjacent_text(paragraph);
    let inline: Vec<NodeId> = tree.find_all(paragraph, |t, n| {
        t.tag(n).is_some_and(|tag| tag == "a" || options.is_markup_tag(tag))
    });
    for node in inline {
        if tree.is_tag(node, "a") {
            links.push(InlineLink {
                href: tree.attr(node, "href").map(str::to_string),
                text: tree.text_content(node),
            });
        }
        if options.adjust_unwrap_spacing {
            adjust_spacing(tree, node, Some(paragraph));
        }
        tree.unwrap(node);
    }
    tree.merge_adjacent_text(paragraph);
}

/// Collect the paragraphs under `top`.
///
/// Link-heavy sections are dropped first. Nested candidates are read once,
/// as part of their outermost candidate; a wrapper whose children are all
/// candidates themselves is skipped in favour of them.
pub fn article_text(
    tree: &mut Tree,
    annotations: &mut Annotations,
    top: NodeId,
    options: &Options,
) -> ArticleText {
    let (copy, copies) = tree.deep_clone(top);
    annotations.copy_through(&copies);
    remove_link_heavy_sections(tree, annotations, copy, options.link_density_upper_bound);

    let set = choose_text_tags(tree, annotations, copy, options.article_text_chars_ratio);
    let flow_tags = TEXT_TAG_SETS.first().copied().unwrap_or_default();

    let mut queue: Vec<NodeId> = Vec::new();
    if tree.tag_in(copy, set) {
        queue.push(copy);
    }
    queue.extend(tree.find_tags(copy, set));
    queue.reverse();

    let mut text = ArticleText::default();
    while let Some(candidate) = queue.pop() {
        if !tree.tag_in(candidate, flow_tags) && only_wraps(tree, candidate, &queue) {
            continue;
        }
        let nested = tree.find_tags(candidate, set);
        queue.retain(|n| !nested.contains(n));

        flatten_paragraph(tree, candidate, options, &mut text.links);
        let paragraph = collapse_whitespace(&tree.text_content(candidate));
        if !paragraph.is_empty() {
            text.paragraphs.push(paragraph);
        }
    }
    debug!(
        paragraphs = text.paragraphs.len(),
        links = text.links.len(),
        "article text collected"
    );
    text
}
