//! Character counts and link density per element.
//!
//! Results live in a side table keyed by [`NodeId`]. They describe the tree
//! as it was when [`annotate`] ran and are stale after any later mutation,
//! except for subtrees copied with [`Annotations::copy_through`].

use std::collections::{HashMap, HashSet};

use crate::dom::{NodeId, Tree};
use crate::tags::is_media_tag;

/// Memoized scores of one element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Annotation {
    /// Trimmed text characters in the subtree.
    pub total_chars: usize,
    /// Characters inside anchors.
    pub link_chars: usize,
    /// `link_chars / total_chars`, or 0 when the element has no text.
    pub link_density: f64,
}

/// Side table of [`Annotation`]s.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    map: HashMap<NodeId, Annotation>,
}

impl Annotations {
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Annotation> {
        self.map.get(&id)
    }

    /// Total characters of `id`, 0 when unannotated.
    #[must_use]
    pub fn total_chars(&self, id: NodeId) -> usize {
        self.map.get(&id).map_or(0, |a| a.total_chars)
    }

    /// Link density of `id`, 0 when unannotated.
    #[must_use]
    pub fn link_density(&self, id: NodeId) -> f64 {
        self.map.get(&id).map_or(0.0, |a| a.link_density)
    }

    /// Sum of total characters over `ids`.
    #[must_use]
    pub fn total_chars_of(&self, ids: &[NodeId]) -> usize {
        ids.iter().map(|&n| self.total_chars(n)).sum()
    }

    /// Give every copied node the annotation of its original.
    pub fn copy_through(&mut self, copies: &HashMap<NodeId, NodeId>) {
        let copied: Vec<(NodeId, Annotation)> = copies
            .iter()
            .filter_map(|(old, new)| self.map.get(old).map(|a| (*new, *a)))
            .collect();
        self.map.extend(copied);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Score every element, prune empty elements under `<body>`, then derive
/// link densities.
///
/// An element is empty when it has no text, no image or embedded-media
/// descendant and is not such an element itself.
pub fn annotate(tree: &mut Tree) -> Annotations {
    let mut annotations = Annotations::default();
    let root = tree.root();
    let order = tree.descendants(root);

    // Children come before parents in reverse pre-order.
    for &n in order.iter().rev() {
        if !tree.is_element(n) {
            continue;
        }
        let total_chars = chars_of(tree, n, &annotations);
        let link_chars = if tree.is_tag(n, "a") {
            total_chars
        } else {
            tree.element_children(n)
                .map(|c| annotations.map.get(&c).map_or(0, |a| a.link_chars))
                .sum()
        };
        annotations.map.insert(
            n,
            Annotation {
                total_chars,
                link_chars,
                link_density: 0.0,
            },
        );
        if tree.is_tag(n, "a") {
            // The whole anchor subtree counts as linked.
            for d in tree.descendants(n) {
                if let Some(a) = annotations.map.get_mut(&d) {
                    a.link_chars = a.total_chars;
                }
            }
        }
    }

    let pruned = prune_empty(tree, &annotations);
    if pruned > 0 {
        tracing::debug!(pruned, "removed empty elements");
    }

    for a in annotations.map.values_mut() {
        a.link_density = if a.total_chars > 0 {
            a.link_chars as f64 / a.total_chars as f64
        } else {
            0.0
        };
    }
    annotations
}

fn chars_of(tree: &Tree, id: NodeId, annotations: &Annotations) -> usize {
    tree.children(id)
        .iter()
        .map(|&c| match tree.text(c) {
            Some(t) => t.trim().chars().count(),
            None => annotations.total_chars(c),
        })
        .sum()
}

fn prune_empty(tree: &mut Tree, annotations: &Annotations) -> usize {
    let Some(body) = tree.body() else {
        return 0;
    };
    let order = tree.descendants(body);

    let mut has_media: HashSet<NodeId> = HashSet::new();
    let mut empty: HashSet<NodeId> = HashSet::new();
    for &n in order.iter().rev() {
        let Some(tag) = tree.tag(n) else {
            continue;
        };
        if is_media_tag(tag) || tree.children(n).iter().any(|c| has_media.contains(c)) {
            has_media.insert(n);
        } else if annotations.total_chars(n) == 0 {
            empty.insert(n);
        }
    }

    // Only the outermost empty element of a run needs detaching.
    let mut outermost = Vec::new();
    let mut inside_empty: HashSet<NodeId> = HashSet::new();
    for &n in &order {
        let under = tree.parent(n).is_some_and(|p| inside_empty.contains(&p));
        if under || empty.contains(&n) {
            inside_empty.insert(n);
            if !under {
                outermost.push(n);
            }
        }
    }
    for &n in &outermost {
        tree.detach(n);
    }
    outermost.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_density() {
        let mut tree = Tree::parse(
            "<div id='d'><p>Hello world</p><ul><li><a href='/x'>link one</a></li></ul></div>",
        );
        let ann = annotate(&mut tree);
        let div = tree.find_element("div").unwrap();
        let ul = tree.find_element("ul").unwrap();
        assert_eq!(ann.total_chars(div), "Hello world".len() + "link one".len());
        assert_eq!(ann.get(ul).unwrap().link_chars, "link one".len());
        assert!((ann.link_density(ul) - 1.0).abs() < 1e-9);
        let expected = 8.0 / 19.0;
        assert!((ann.link_density(div) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_anchor_descendants_are_fully_linked() {
        let mut tree = Tree::parse("<p>x <a href='/a'><span>inner</span> tail</a></p>");
        let ann = annotate(&mut tree);
        let span = tree.find_element("span").unwrap();
        assert!((ann.link_density(span) - 1.0).abs() < 1e-9);
        let a = tree.find_element("a").unwrap();
        assert_eq!(ann.total_chars(a), "inner".len() + "tail".len());
    }

    #[test]
    fn test_empty_elements_are_pruned_but_media_kept() {
        let mut tree = Tree::parse(
            "<div><span></span><figure><img src='a.jpg'></figure><p>text</p><div> </div></div>",
        );
        annotate(&mut tree);
        let body = tree.body().unwrap();
        assert!(tree.find_element("span").is_none());
        assert!(tree.find_element("figure").is_some());
        assert!(tree.find_element("img").is_some());
        assert_eq!(tree.find_tags(body, &["div"]).len(), 1);
    }

    #[test]
    fn test_empty_wrappers_pruned_around_deep_media() {
        let depth = 300;
        let mut html = String::from("<html><body>");
        html.push_str(&"<div>".repeat(depth));
        html.push_str("<video src='clip.mp4'></video>");
        html.push_str(&"</div>".repeat(depth));
        html.push_str(&"<section><span></span>".repeat(depth));
        html.push_str(&"</section>".repeat(depth));
        html.push_str("<p>kept</p></body></html>");
        let mut tree = Tree::parse(&html);
        annotate(&mut tree);
        let body = tree.body().unwrap();
        assert!(tree.find_element("video").is_some());
        assert_eq!(tree.find_tags(body, &["div"]).len(), depth);
        assert!(tree.find_tags(body, &["section", "span"]).is_empty());
        assert_eq!(tree.text_content(body), "kept");
    }

    #[test]
    fn test_head_is_not_pruned() {
        let mut tree = Tree::parse(
            "<html><head><meta name='description' content='d'></head><body></body></html>",
        );
        annotate(&mut tree);
        assert!(tree.find_element("meta").is_some());
        assert!(tree.body().is_some());
    }

    #[test]
    fn test_density_is_bounded() {
        let mut tree = Tree::parse(
            "<div><a href='/1'>a</a><p>text <a href='/2'>more</a></p><section></section></div>",
        );
        let ann = annotate(&mut tree);
        let root = tree.root();
        for n in tree.find_all(root, |_, _| true) {
            let d = ann.link_density(n);
            assert!((0.0..=1.0).contains(&d));
            if ann.total_chars(n) == 0 {
                assert_eq!(d, 0.0);
            }
        }
    }
}
