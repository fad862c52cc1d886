//! Article extraction over the cleaned tree.
//!
//! # Module Structure
//!
//! - `locate`: base-tag and top-tag localization, common-ancestor searches
//! - `text`: body text reconstruction with inline-link capture
//! - `authors`: byline markup scan and metadata fallbacks
//! - `fields`: short fields read from the pristine document
//! - `keywords`: keyword sources and case unification
//!
//! # Usage
//!
//! ```rust
//! use rs_article_extract::dom::Tree;
//! use rs_article_extract::extractor::ArticleExtractor;
//! use rs_article_extract::Options;
//!
//! let options = Options::default();
//! let tree = Tree::parse("<html><body><div><p>Some article text.</p></div></body></html>");
//! let mut article = ArticleExtractor::new(tree, &options, None)?;
//! assert!(article.tree().contains(article.base_tag(), article.top_tag()));
//! let text = article.article_text();
//! assert_eq!(text.paragraphs, vec!["Some article text."]);
//! # Ok::<(), rs_article_extract::Error>(())
//! ```

pub mod authors;
pub mod fields;
pub mod keywords;
pub mod locate;
pub mod text;

use tracing::debug;

use crate::assets::{links::process_links, AssetScanner, Assets};
use crate::cleaner::Cleaner;
use crate::dom::{NodeId, Tree};
use crate::error::{Error, Result};
use crate::link_density::Annotations;
use crate::metadata::Metadata;
use crate::options::Options;
use crate::result::{Author, LinkItem};
use crate::url_utils::base_url;

pub use fields::{ItempropValue, Sourced};
pub use keywords::Keywords;

/// Paragraphs of the body text and the processed links found inside them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyText {
    pub paragraphs: Vec<String>,
    pub links: Vec<LinkItem>,
}

/// A cleaned document with its content located.
///
/// Owns the cleaned tree and its annotations. The base tag and the top tag
/// are fixed at construction; assets, authors and body text are read from
/// them on demand.
#[derive(Debug)]
pub struct ArticleExtractor<'a> {
    tree: Tree,
    annotations: Annotations,
    options: &'a Options,
    page_url: Option<String>,
    body: NodeId,
    base_tag: NodeId,
    top_tag: NodeId,
}

impl<'a> ArticleExtractor<'a> {
    /// Clean `tree` and locate the base and top tags.
    ///
    /// # Errors
    ///
    /// [`Error::NoBody`] when the document has no `<body>`, and
    /// [`Error::NotDescendant`] should the ancestor search fail.
    pub fn new(mut tree: Tree, options: &'a Options, page_url: Option<String>) -> Result<Self> {
        let annotations = Cleaner::new(options).clean(&mut tree);
        let body = tree.body().ok_or(Error::NoBody)?;

        let base_tag = locate::find_base_tag(&tree, &annotations, body, options);
        let top_tag = locate::find_top_tag(&tree, &annotations, base_tag, options)?;
        debug!(
            base = tree.reduced_path(base_tag),
            top = tree.reduced_path(top_tag),
            "content located"
        );

        Ok(Self {
            tree,
            annotations,
            options,
            page_url,
            body,
            base_tag,
            top_tag,
        })
    }

    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[must_use]
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    #[must_use]
    pub fn body(&self) -> NodeId {
        self.body
    }

    #[must_use]
    pub fn base_tag(&self) -> NodeId {
        self.base_tag
    }

    #[must_use]
    pub fn top_tag(&self) -> NodeId {
        self.top_tag
    }

    #[must_use]
    pub fn page_url(&self) -> Option<&str> {
        self.page_url.as_deref()
    }

    /// Images, videos, links, comment areas and documents under the base tag.
    #[must_use]
    pub fn assets(&self) -> Assets {
        AssetScanner::new(&self.tree, self.page_url()).scan(self.base_tag)
    }

    /// Authors from bylines in the top tag, base tag or body, else from
    /// metadata. Meta tags are read from `pristine`.
    #[must_use]
    pub fn authors(&self, pristine: &Tree, metadata: &Metadata) -> Option<Sourced<Vec<Author>>> {
        let base = base_url(self.page_url());
        authors::authors(
            &self.tree,
            &[self.top_tag, self.base_tag, self.body],
            pristine,
            metadata,
            base.as_ref(),
        )
    }

    /// Body text of the top tag.
    ///
    /// Reads a copy, so the located tags and the assets are unaffected.
    pub fn article_text(&mut self) -> BodyText {
        let raw = text::article_text(&mut self.tree, &mut self.annotations, self.top_tag, self.options);
        let base = base_url(self.page_url());
        let links = process_links(
            raw.links
                .iter()
                .filter_map(|l| l.href.as_deref().map(|href| (href, Some(l.text.as_str())))),
            base.as_ref(),
        );
        BodyText {
            paragraphs: raw.paragraphs,
            links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORY: &str = r#"<html><body>
        <nav><a href="/">Home</a></nav>
        <article>
            <h1>Headline</h1>
            <div class="author"><a href="/author/jane">Jane</a></div>
            <img src="/img/lead.jpg" alt="Lead">
            <div class="story">
                <p>First paragraph with a <a href="https://ref.example.org/doc">reference</a> in it.</p>
                <p>Second paragraph of the article, long enough to carry the page.</p>
            </div>
        </article>
        <div class="sidebar"><p><a href="/x">Other story</a></p></div>
    </body></html>"#;

    #[test]
    fn test_locates_and_extracts() {
        let options = Options::default();
        let mut article = ArticleExtractor::new(
            Tree::parse(STORY),
            &options,
            Some("https://news.example.com/2024/story".to_string()),
        )
        .unwrap();

        let tree = article.tree();
        assert_eq!(tree.tag(article.base_tag()), Some("article"));
        assert_eq!(tree.attr(article.top_tag(), "class"), Some("story"));

        let assets = article.assets();
        assert_eq!(assets.images[0].url, "https://news.example.com/img/lead.jpg");

        let text = article.article_text();
        assert_eq!(text.paragraphs.len(), 2);
        assert_eq!(
            text.paragraphs[0],
            "First paragraph with a reference in it."
        );
        assert_eq!(text.links[0].url, "https://ref.example.org/doc");

        // The shared tree still holds the anchors after text extraction.
        let top = article.top_tag();
        assert!(article.tree().find_first_tag(top, "a").is_some());
    }

    #[test]
    fn test_authors_from_byline() {
        let options = Options::default();
        let tree = Tree::parse(STORY);
        let pristine = tree.clone();
        let article = ArticleExtractor::new(
            tree,
            &options,
            Some("https://news.example.com/2024/story".to_string()),
        )
        .unwrap();
        let found = article.authors(&pristine, &Metadata::default()).unwrap();
        assert_eq!(found.method, "a");
        assert_eq!(found.value[0].name.as_deref(), Some("Jane"));
        assert_eq!(
            found.value[0].url.as_deref(),
            Some("https://news.example.com/author/jane")
        );
    }
}
