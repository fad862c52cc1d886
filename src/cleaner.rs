//! HTML normalization before extraction.
//!
//! The [`Cleaner`] runs a fixed sequence of tree passes, each toggled by
//! [`Options`]:
//!
//! 1. decompose configured tags, comments, and the page header/footer
//! 2. clear elements hidden by attributes or inline style
//! 3. merge adjacent text, drop whitespace-only text, trim the rest
//! 4. split paragraphs at `<br>`
//! 5. unwrap inline markup
//! 6. annotate character counts and link density
//!
//! Whitespace removal must precede break replacement, which inspects the
//! text on either side of each `<br>`.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::dom::{NodeId, Tree};
use crate::link_density::{annotate, Annotations};
use crate::options::Options;
use crate::patterns::{DISPLAY_NONE, SMALL_LENGTH, VISIBILITY_HIDDEN};
use crate::tags::{LEFT_NOSPACE, RIGHT_NOSPACE, SECTIONING_TAGS};

/// Configurable HTML cleaning pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Cleaner<'a> {
    options: &'a Options,
}

impl<'a> Cleaner<'a> {
    #[must_use]
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    /// Run every enabled pass over `tree`.
    ///
    /// Returns the link-density annotations, empty when that pass is off.
    pub fn clean(&self, tree: &mut Tree) -> Annotations {
        let opts = self.options;

        if opts.decompose {
            self.decompose_tags(tree);
            decompose_comments(tree);
            decompose_header_footer(tree);
            debug!("decomposed tags, comments, header and footer");
        }

        if opts.clear_invisible {
            if let Some(body) = tree.body() {
                let removed = clear_invisible(tree, body);
                debug!(removed, "cleared invisible elements");
            }
        }

        let root = tree.root();
        tree.merge_adjacent_text(root);
        remove_whitespace(tree);

        if opts.replace_breaks {
            replace_breaks(tree);
            debug!("replaced line breaks");
        }

        if opts.unwrap_markup {
            self.unwrap_markup(tree);
            debug!("unwrapped inline markup");
        }

        tree.merge_adjacent_text(root);

        if opts.compute_link_density {
            let annotations = annotate(tree);
            tree.merge_adjacent_text(root);
            debug!(elements = annotations.len(), "computed link density");
            annotations
        } else {
            Annotations::default()
        }
    }

    /// Remove every element named in the decompose list, with its subtree.
    pub fn decompose_tags(&self, tree: &mut Tree) {
        let root = tree.root();
        let doomed = tree.find_all(root, |t, n| {
            t.tag(n).is_some_and(|tag| self.options.is_decompose_tag(tag))
        });
        for n in doomed {
            tree.detach(n);
        }
    }

    /// Unwrap every configured markup element in the document.
    pub fn unwrap_markup(&self, tree: &mut Tree) {
        let root = tree.root();
        let markup = tree.find_all(root, |t, n| {
            t.tag(n).is_some_and(|tag| self.options.is_markup_tag(tag))
        });
        for n in markup {
            if self.options.adjust_unwrap_spacing {
                adjust_spacing(tree, n, None);
            }
            tree.unwrap(n);
        }
    }
}

/// Remove every comment node.
pub fn decompose_comments(tree: &mut Tree) {
    let root = tree.root();
    let comments: Vec<NodeId> = tree
        .descendants(root)
        .into_iter()
        .filter(|&n| tree.is_comment(n))
        .collect();
    for n in comments {
        tree.detach(n);
    }
}

/// Remove the first `<header>` and the first `<footer>` found breadth-first,
/// unless they sit inside sectioning content.
///
/// Each search stops at the first element of its kind, removed or not.
pub fn decompose_header_footer(tree: &mut Tree) {
    let mut queue = VecDeque::from([tree.root()]);
    let mut header_found = false;
    let mut footer_found = false;

    while !(header_found && footer_found) {
        let Some(n) = queue.pop_front() else {
            break;
        };

        let mut removed = false;
        for (name, found) in [("header", &mut header_found), ("footer", &mut footer_found)] {
            if !*found && tree.is_tag(n, name) {
                *found = true;
                if !tree.has_ancestor_tag(n, SECTIONING_TAGS) {
                    tree.detach(n);
                    removed = true;
                }
            }
        }
        if !removed {
            queue.extend(tree.children(n).iter().copied());
        }
    }
}

/// Remove hidden elements below `scope`, without descending into them.
///
/// Returns the number of elements removed.
pub fn clear_invisible(tree: &mut Tree, scope: NodeId) -> usize {
    let mut removed = 0;
    let mut stack = vec![scope];
    while let Some(n) = stack.pop() {
        let children: Vec<NodeId> = tree.element_children(n).collect();
        for c in children {
            if is_invisible(tree, c) {
                tree.detach(c);
                removed += 1;
            } else {
                stack.push(c);
            }
        }
    }
    removed
}

/// Whether an element is hidden by its attributes or inline style.
#[must_use]
pub fn is_invisible(tree: &Tree, id: NodeId) -> bool {
    if tree.has_attr(id, "hidden") {
        return true;
    }
    if tree.attr(id, "style").is_some_and(style_hides) {
        return true;
    }

    let non_empty = |name: &str| tree.attr(id, name).filter(|v| !v.is_empty());
    if let Some(width) = non_empty("width") {
        SMALL_LENGTH.is_match(width)
    } else if let Some(height) = non_empty("height") {
        SMALL_LENGTH.is_match(height)
    } else {
        matches!(tree.attr(id, "role"), Some("presentation" | "none"))
    }
}

/// Only the first applicable property decides.
fn style_hides(style: &str) -> bool {
    let props = parse_style(style);
    let get = |key: &str| props.get(key).map(String::as_str).filter(|v| !v.is_empty());

    if let Some(display) = get("display") {
        DISPLAY_NONE.is_match(display)
    } else if let Some(visibility) = get("visibility") {
        VISIBILITY_HIDDEN.is_match(visibility)
    } else if let Some(width) = get("width") {
        SMALL_LENGTH.is_match(width)
    } else if let Some(height) = get("height") {
        SMALL_LENGTH.is_match(height)
    } else {
        matches!(get("opacity"), Some("0" | "0 !important"))
    }
}

/// Parse an inline `style` attribute into property/value pairs.
///
/// Parsing stops at the first empty declaration. Later duplicates win.
fn parse_style(style: &str) -> HashMap<String, String> {
    let mut props = HashMap::new();
    for decl in style.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            break;
        }
        if decl.contains(['{', '}']) {
            continue;
        }
        if let Some((key, value)) = decl.split_once(':') {
            props.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    props
}

/// Drop whitespace-only text nodes and trim the remaining ones.
pub fn remove_whitespace(tree: &mut Tree) {
    let root = tree.root();
    let texts: Vec<NodeId> = tree
        .descendants(root)
        .into_iter()
        .filter(|&n| tree.text(n).is_some())
        .collect();
    for n in texts {
        let Some(text) = tree.text(n) else {
            continue;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            tree.detach(n);
        } else if trimmed.len() != text.len() {
            let trimmed = trimmed.to_string();
            tree.set_text(n, trimmed);
        }
    }
}

fn is_non_whitespace_text(tree: &Tree, id: Option<NodeId>) -> bool {
    id.and_then(|n| tree.text(n)).is_some_and(|t| !t.trim().is_empty())
}

/// Remove every `<br>`.
///
/// A break between two text runs closes its parent and reopens a copy after
/// it: the parent is replaced by a left copy holding everything before the
/// break and a right copy, without `id`, holding everything after. Any other
/// break is simply removed.
pub fn replace_breaks(tree: &mut Tree) {
    let root = tree.root();
    while let Some(br) = tree.find_first_tag(root, "br") {
        let splittable = is_non_whitespace_text(tree, tree.prev_sibling(br))
            && is_non_whitespace_text(tree, tree.next_sibling(br));
        let parent = tree
            .parent(br)
            .filter(|&p| splittable && !tree.tag_in(p, &["body", "html"]));

        let Some(parent) = parent else {
            tree.detach(br);
            continue;
        };

        let contents = tree.children(parent).to_vec();
        let Some(pos) = contents.iter().position(|&c| c == br) else {
            tree.detach(br);
            continue;
        };

        let left = tree.shallow_clone(parent);
        let right = tree.shallow_clone(parent);
        tree.remove_attr(right, "id");
        for &c in &contents[..pos] {
            tree.append(left, c);
        }
        for &c in &contents[pos + 1..] {
            tree.append(right, c);
        }
        tree.insert_before(parent, left);
        tree.insert_after(parent, right);
        tree.detach(parent);
    }
}

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Fix the spacing around an element that is about to be unwrapped.
///
/// The nearest text on each side loses its adjoining whitespace and gains a
/// single space unless it ends (left) or starts (right) with no-space
/// punctuation. The search climbs through ancestors that have no neighbour on
/// that side, never past `boundary`, then descends to the innermost edge.
pub fn adjust_spacing(tree: &mut Tree, id: NodeId, boundary: Option<NodeId>) {
    if let Some(leaf) = neighbour_text(tree, id, boundary, Side::Left) {
        if let Some(text) = tree.text(leaf) {
            let mut text = text.trim_end().to_string();
            if text.chars().last().is_some_and(|c| !LEFT_NOSPACE.contains(&c)) {
                text.push(' ');
            }
            tree.set_text(leaf, text);
        }
    }
    if let Some(leaf) = neighbour_text(tree, id, boundary, Side::Right) {
        if let Some(text) = tree.text(leaf) {
            let mut text = text.trim_start().to_string();
            if text.chars().next().is_some_and(|c| !RIGHT_NOSPACE.contains(&c)) {
                text.insert(0, ' ');
            }
            tree.set_text(leaf, text);
        }
    }
}

fn neighbour_text(tree: &Tree, id: NodeId, boundary: Option<NodeId>, side: Side) -> Option<NodeId> {
    let mut current = id;
    let sibling = loop {
        let sibling = match side {
            Side::Left => tree.prev_sibling(current),
            Side::Right => tree.next_sibling(current),
        };
        // An empty text node does not count as a neighbour.
        if let Some(s) = sibling.filter(|&s| tree.text(s).is_none_or(|t| !t.is_empty())) {
            break s;
        }
        current = tree.parent(current)?;
        if Some(current) == boundary || current == tree.root() {
            return None;
        }
    };

    let mut node = sibling;
    while tree.is_element(node) {
        let children = tree.children(node);
        let next = match side {
            Side::Left => children.last(),
            Side::Right => children.first(),
        };
        match next {
            Some(&c) => node = c,
            None => break,
        }
    }
    tree.text(node).map(|_| node)
}
