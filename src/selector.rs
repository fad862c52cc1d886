//! Static selector rules over the arena tree.
//!
//! A rule is a tag test plus an optional attribute test, the subset of CSS
//! that the structural heuristics need. A comma-separated CSS group becomes
//! a slice of rules matched with [`select`].

use crate::dom::{NodeId, Tree};

/// Attribute predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrTest {
    /// `[attr]`
    Exists,
    /// `[attr='v']`
    Equals(&'static str),
    /// `[attr*='v']`
    Contains(&'static str),
    /// `[attr^='v']`
    StartsWith(&'static str),
    /// `[attr~='v']`, and `.v` for classes.
    Word(&'static str),
}

impl AttrTest {
    fn accepts(self, value: &str) -> bool {
        match self {
            AttrTest::Exists => true,
            AttrTest::Equals(v) => value == v,
            AttrTest::Contains(v) => value.contains(v),
            AttrTest::StartsWith(v) => value.starts_with(v),
            AttrTest::Word(v) => value.split_whitespace().any(|w| w == v),
        }
    }
}

/// One compound selector: optional tag name and optional attribute test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub tag: Option<&'static str>,
    pub attr: Option<(&'static str, AttrTest)>,
}

impl Rule {
    /// Bare tag selector, e.g. `article`.
    #[must_use]
    pub const fn tag(name: &'static str) -> Self {
        Self {
            tag: Some(name),
            attr: None,
        }
    }

    /// Tag with an attribute test, e.g. `a[rel='author']`.
    #[must_use]
    pub const fn with_attr(name: &'static str, attr: &'static str, test: AttrTest) -> Self {
        Self {
            tag: Some(name),
            attr: Some((attr, test)),
        }
    }

    /// Attribute test on any element, e.g. `[id='author']`.
    #[must_use]
    pub const fn any_with_attr(attr: &'static str, test: AttrTest) -> Self {
        Self {
            tag: None,
            attr: Some((attr, test)),
        }
    }

    /// Class selector, e.g. `span.author`.
    #[must_use]
    pub const fn class(name: &'static str, class: &'static str) -> Self {
        Self::with_attr(name, "class", AttrTest::Word(class))
    }

    /// Whether the element `id` satisfies this rule.
    #[must_use]
    pub fn matches(&self, tree: &Tree, id: NodeId) -> bool {
        let Some(tag) = tree.tag(id) else {
            return false;
        };
        if self.tag.is_some_and(|t| t != tag) {
            return false;
        }
        match self.attr {
            None => true,
            Some((name, test)) => tree.attr(id, name).is_some_and(|v| test.accepts(v)),
        }
    }
}

/// Whether `id` matches at least one rule of the group.
#[must_use]
pub fn matches_any(rules: &[Rule], tree: &Tree, id: NodeId) -> bool {
    rules.iter().any(|r| r.matches(tree, id))
}

/// Descendants of `scope` matching any rule of the group, in document order,
/// each element at most once.
#[must_use]
pub fn select(tree: &Tree, scope: NodeId, rules: &[Rule]) -> Vec<NodeId> {
    tree.find_all(scope, |t, n| matches_any(rules, t, n))
}
