//! Owned arena tree for the mutating stages of the pipeline.
//!
//! The parsed `dom_query::Document` stays read-only. The cleaner, the
//! link-density pass and the article extractor work on a [`Tree`] built from
//! it: every node lives in one `Vec` and is addressed by a [`NodeId`], so node
//! identity is a plain index that survives every mutation. Detached nodes stay
//! in the arena but are no longer reachable from the root.

use std::collections::HashMap;

use dom_query::{Document, NodeRef};

/// Stable identity of a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index of this node.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// An element: lowercase tag name and attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The synthetic root above `<html>`.
    Document,
    Element(Element),
    Text(String),
    Comment,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Mutable ordered tree of elements, text and comments.
///
/// Nodes live in an arena for the lifetime of the tree. Detaching a subtree
/// only unlinks it and cloning appends new nodes, so a cleaned tree plus one
/// body copy can hold about twice the parsed node count. A tree is meant to
/// serve one document and be dropped with it.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Tree {
    /// Parse HTML into a tree.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self::from_document(&Document::from(html))
    }

    /// Copy a parsed document into a fresh arena.
    ///
    /// The copy is iterative so deeply nested markup cannot exhaust the stack.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let mut tree = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            root: NodeId(0),
        };

        let html = doc.select("html");
        let Some(html_node) = html.nodes().first() else {
            return tree;
        };

        let mut stack: Vec<(NodeRef, NodeId)> = vec![(*html_node, tree.root)];
        while let Some((source, parent)) = stack.pop() {
            let id = tree.push(convert_node(&source));
            tree.nodes[parent.0].children.push(id);
            tree.nodes[id.0].parent = Some(parent);

            // Reversed so siblings pop in document order.
            for c in source.children().into_iter().rev() {
                stack.push((c, id));
            }
        }

        tree
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        NodeId(self.nodes.len() - 1)
    }

    // === Node information ===

    /// The synthetic document root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Tag name of an element node.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => Some(el.name.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_tag(&self, id: NodeId, name: &str) -> bool {
        self.tag(id) == Some(name)
    }

    #[must_use]
    pub fn tag_in(&self, id: NodeId, names: &[&str]) -> bool {
        self.tag(id).is_some_and(|t| names.contains(&t))
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].data, NodeData::Element(_))
    }

    /// Content of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_comment(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].data, NodeData::Comment)
    }

    // === Attributes ===

    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element(el) => el
                .attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeData::Element(el) = &mut self.nodes[id.0].data {
            el.attrs.retain(|(k, _)| k != name);
        }
    }

    // === Navigation ===

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All child nodes (elements, text and comments) in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Direct element children in order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
    }

    fn position(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let pos = self.nodes[parent.0].children.iter().position(|&c| c == id)?;
        Some((parent, pos))
    }

    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, pos) = self.position(id)?;
        pos.checked_sub(1).map(|p| self.nodes[parent.0].children[p])
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, pos) = self.position(id)?;
        self.nodes[parent.0].children.get(pos + 1).copied()
    }

    /// Ancestors from the parent upwards, ending at the root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// All descendants of `id` in document (pre-)order, excluding `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// Descendant elements of `id` accepted by `pred`, in document order.
    pub fn find_all<F>(&self, id: NodeId, pred: F) -> Vec<NodeId>
    where
        F: Fn(&Tree, NodeId) -> bool,
    {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.is_element(n) && pred(self, n))
            .collect()
    }

    /// Descendant elements of `id` whose tag is one of `names`.
    #[must_use]
    pub fn find_tags(&self, id: NodeId, names: &[&str]) -> Vec<NodeId> {
        self.find_all(id, |t, n| t.tag_in(n, names))
    }

    /// First descendant element of `id` with tag `name`.
    #[must_use]
    pub fn find_first_tag(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            if self.is_tag(n, name) {
                return Some(n);
            }
            stack.extend(self.children(n).iter().rev().copied());
        }
        None
    }

    /// Whether `id` has an ancestor whose tag is one of `names`.
    #[must_use]
    pub fn has_ancestor_tag(&self, id: NodeId, names: &[&str]) -> bool {
        self.ancestors(id).any(|a| self.tag_in(a, names))
    }

    /// Whether `node` is `ancestor` or lies beneath it.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Whether `id` is still reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// First element named `name` anywhere in the document.
    #[must_use]
    pub fn find_element(&self, name: &str) -> Option<NodeId> {
        self.find_first_tag(self.root, name)
    }

    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.find_element("body")
    }

    // === Text ===

    /// Concatenated text of `id` and all its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(t) = self.text(id) {
            return t.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Concatenated text of the direct text children of `id`.
    #[must_use]
    pub fn direct_text(&self, id: NodeId) -> String {
        self.children(id)
            .iter()
            .filter_map(|&c| self.text(c))
            .collect()
    }

    /// Whether some direct text child of `id` has non-whitespace content.
    #[must_use]
    pub fn has_direct_text(&self, id: NodeId) -> bool {
        self.children(id)
            .iter()
            .filter_map(|&c| self.text(c))
            .any(|t| !t.trim().is_empty())
    }

    pub fn set_text(&mut self, id: NodeId, text: String) {
        if let NodeData::Text(t) = &mut self.nodes[id.0].data {
            *t = text;
        }
    }

    /// Merge runs of adjacent text children everywhere under `id`.
    pub fn merge_adjacent_text(&mut self, id: NodeId) {
        let mut targets = vec![id];
        targets.extend(self.descendants(id));
        for n in targets {
            let children = self.nodes[n.0].children.clone();
            let mut kept: Vec<NodeId> = Vec::with_capacity(children.len());
            for c in children {
                let text = self.text(c).map(str::to_string);
                match (kept.last().copied(), text) {
                    (Some(prev), Some(t)) if self.text(prev).is_some() => {
                        if let NodeData::Text(p) = &mut self.nodes[prev.0].data {
                            p.push_str(&t);
                        }
                        self.nodes[c.0].parent = None;
                    }
                    _ => kept.push(c),
                }
            }
            self.nodes[n.0].children = kept;
        }
    }

    /// Structural path of tag names from `<html>` down to `id`, without
    /// positional indices (`html > body > div`).
    #[must_use]
    pub fn reduced_path(&self, id: NodeId) -> String {
        let mut parts: Vec<&str> = self.ancestors(id).filter_map(|a| self.tag(a)).collect();
        parts.reverse();
        if let Some(tag) = self.tag(id) {
            parts.push(tag);
        }
        parts.join(" > ")
    }

    // === Mutation ===

    /// Create a detached element.
    pub fn create_element(&mut self, name: &str, attrs: Vec<(String, String)>) -> NodeId {
        self.push(NodeData::Element(Element {
            name: name.to_string(),
            attrs,
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    /// Remove `id` (and its subtree) from its parent.
    pub fn detach(&mut self, id: NodeId) {
        if let Some((parent, pos)) = self.position(id) {
            self.nodes[parent.0].children.remove(pos);
        }
        self.nodes[id.0].parent = None;
    }

    /// Replace `id` with its children.
    pub fn unwrap(&mut self, id: NodeId) {
        let Some((parent, pos)) = self.position(id) else {
            return;
        };
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for &c in &children {
            self.nodes[c.0].parent = Some(parent);
        }
        self.nodes[parent.0].children.splice(pos..=pos, children);
        self.nodes[id.0].parent = None;
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Insert `new` immediately before `reference`.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) {
        self.detach(new);
        if let Some((parent, pos)) = self.position(reference) {
            self.nodes[parent.0].children.insert(pos, new);
            self.nodes[new.0].parent = Some(parent);
        }
    }

    /// Insert `new` immediately after `reference`.
    pub fn insert_after(&mut self, reference: NodeId, new: NodeId) {
        self.detach(new);
        if let Some((parent, pos)) = self.position(reference) {
            self.nodes[parent.0].children.insert(pos + 1, new);
            self.nodes[new.0].parent = Some(parent);
        }
    }

    /// Detached copy of `id` without children.
    pub fn shallow_clone(&mut self, id: NodeId) -> NodeId {
        let data = self.nodes[id.0].data.clone();
        self.push(data)
    }

    /// Detached deep copy of the subtree at `id`.
    ///
    /// Returns the new root and the map from original to copied node ids.
    pub fn deep_clone(&mut self, id: NodeId) -> (NodeId, HashMap<NodeId, NodeId>) {
        let mut map = HashMap::new();
        let new_root = self.shallow_clone(id);
        map.insert(id, new_root);

        let mut stack = vec![(id, new_root)];
        while let Some((source, copy)) = stack.pop() {
            let children = self.nodes[source.0].children.clone();
            for c in children {
                let cc = self.shallow_clone(c);
                self.nodes[copy.0].children.push(cc);
                self.nodes[cc.0].parent = Some(copy);
                map.insert(c, cc);
                stack.push((c, cc));
            }
        }
        (new_root, map)
    }
}

/// Iterator over the ancestors of a node.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

fn convert_node(node: &NodeRef) -> NodeData {
    if node.is_element() {
        let name = node
            .node_name()
            .map(|n| n.to_ascii_lowercase())
            .unwrap_or_default();
        let attrs = node
            .attrs()
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        NodeData::Element(Element { name, attrs })
    } else if node.is_text() {
        NodeData::Text(node.text().to_string())
    } else {
        NodeData::Comment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(tree: &Tree, name: &str) -> NodeId {
        tree.find_element(name).unwrap()
    }

    #[test]
    fn test_parse_builds_html_head_body() {
        let tree = Tree::parse("<p>Hello</p>");
        assert!(tree.find_element("html").is_some());
        assert!(tree.find_element("head").is_some());
        let body = tree.body().unwrap();
        let p = first(&tree, "p");
        assert_eq!(tree.parent(p), Some(body));
        assert_eq!(tree.text_content(p), "Hello");
    }

    #[test]
    fn test_attributes_keep_source_order() {
        let tree = Tree::parse(r#"<div id="a" class="b c" data-x="1"></div>"#);
        let div = first(&tree, "div");
        assert_eq!(tree.attr(div, "id"), Some("a"));
        assert_eq!(tree.attr(div, "class"), Some("b c"));
        match tree.data(div) {
            NodeData::Element(el) => {
                let names: Vec<_> = el.attrs.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(names, vec!["id", "class", "data-x"]);
            }
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_comments_are_kept_as_nodes() {
        let tree = Tree::parse("<div><!-- note -->text</div>");
        let div = first(&tree, "div");
        assert!(tree.is_comment(tree.children(div)[0]));
        assert_eq!(tree.text_content(div), "text");
    }

    #[test]
    fn test_descendants_in_document_order() {
        let tree = Tree::parse("<div><p>a<b>b</b></p><span>c</span></div>");
        let div = first(&tree, "div");
        let tags: Vec<_> = tree
            .descendants(div)
            .into_iter()
            .filter_map(|n| tree.tag(n))
            .collect();
        assert_eq!(tags, vec!["p", "b", "span"]);
    }

    #[test]
    fn test_unwrap_keeps_children_in_place() {
        let mut tree = Tree::parse("<p>one <em>two</em> three</p>");
        let em = first(&tree, "em");
        tree.unwrap(em);
        let p = first(&tree, "p");
        assert_eq!(tree.children(p).len(), 3);
        assert!(!tree.is_attached(em));
        tree.merge_adjacent_text(p);
        assert_eq!(tree.children(p).len(), 1);
        assert_eq!(tree.text_content(p), "one two three");
    }

    #[test]
    fn test_detach_and_insert() {
        let mut tree = Tree::parse("<div><p>a</p><p>b</p></div>");
        let div = first(&tree, "div");
        let ps = tree.find_tags(div, &["p"]);
        tree.detach(ps[0]);
        assert_eq!(tree.element_children(div).count(), 1);
        tree.insert_after(ps[1], ps[0]);
        assert_eq!(tree.text_content(div), "ba");
        let x = tree.create_element("span", Vec::new());
        tree.insert_before(ps[1], x);
        assert_eq!(tree.prev_sibling(ps[1]), Some(x));
        assert_eq!(tree.next_sibling(ps[1]), Some(ps[0]));
    }

    #[test]
    fn test_deep_clone_maps_every_node() {
        let mut tree = Tree::parse("<div id='x'><p>a<b>b</b></p></div>");
        let div = first(&tree, "div");
        let (copy, map) = tree.deep_clone(div);
        assert_eq!(map.len(), tree.descendants(div).len() + 1);
        assert_eq!(tree.text_content(copy), "ab");
        assert_eq!(tree.attr(copy, "id"), Some("x"));
        assert!(!tree.is_attached(copy));
        assert!(tree.is_attached(div));
    }

    #[test]
    fn test_reduced_path_has_no_indices() {
        let tree = Tree::parse("<div><div><p>a</p></div></div>");
        let p = first(&tree, "p");
        assert_eq!(tree.reduced_path(p), "html > body > div > div > p");
    }

    #[test]
    fn test_contains_and_ancestor_tags() {
        let tree = Tree::parse("<article><div><p>a</p></div></article>");
        let article = first(&tree, "article");
        let p = first(&tree, "p");
        assert!(tree.contains(article, p));
        assert!(tree.contains(p, p));
        assert!(!tree.contains(p, article));
        assert!(tree.has_ancestor_tag(p, &["article"]));
    }
}
