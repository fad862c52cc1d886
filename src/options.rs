//! Configuration options for article extraction.
//!
//! The `Options` struct toggles each cleaning stage, carries the tag tables
//! the cleaner works from and the numeric thresholds of the localization
//! heuristics.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::tags::{DECOMPOSE_TAGS, MARKUP_TAGS};

/// Configuration options for article extraction.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings. Options also deserialize from JSON; missing
/// fields take their defaults.
///
/// # Example
///
/// ```rust
/// use rs_article_extract::Options;
///
/// let options = Options {
///     url: Some("https://example.com/news/story".to_string()),
///     link_density_upper_bound: 0.6,
///     ..Options::default()
/// };
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// Remove every element named in `decompose_tags`, and all comments,
    /// headers and footers outside sectioning content.
    ///
    /// Default: `true`
    pub decompose: bool,

    /// Remove elements hidden by attributes or inline style.
    ///
    /// Default: `true`
    pub clear_invisible: bool,

    /// Split paragraphs at `<br>` between two text runs and drop other breaks.
    ///
    /// Default: `true`
    pub replace_breaks: bool,

    /// Unwrap `markup_tags` during cleaning.
    ///
    /// Body-text reconstruction unwraps markup per paragraph anyway, so the
    /// document-wide pass is off for article extraction.
    ///
    /// Default: `false`
    pub unwrap_markup: bool,

    /// Annotate elements with character counts and link density, pruning
    /// empty elements.
    ///
    /// Default: `true`
    pub compute_link_density: bool,

    /// Insert or suppress a space where an unwrapped element met its
    /// neighbouring text.
    ///
    /// Default: `true`
    pub adjust_unwrap_spacing: bool,

    /// Reduce a `<title>` fallback to its longest separator-delimited part,
    /// dropping site names such as `Story - Site`.
    ///
    /// Default: `true`
    pub clean_title: bool,

    /// Tags removed together with their subtree.
    ///
    /// Default: style, scripts, navigation, tables, forms and interactive elements
    pub decompose_tags: Vec<String>,

    /// Inline tags replaced by their children.
    ///
    /// Default: text-level semantics such as `em`, `strong`, `code`
    pub markup_tags: Vec<String>,

    /// Sections whose link density exceeds this are link lists, not text.
    ///
    /// Default: `0.75`
    pub link_density_upper_bound: f64,

    /// Maximum distance from the best common ancestor to any paragraph.
    ///
    /// Default: `5`
    pub max_levels: usize,

    /// Fewest low-link-density candidates needed before high-density ones
    /// are filtered out.
    ///
    /// Default: `1`
    pub min_tags_to_check: usize,

    /// Share of body characters a base-tag candidate must exceed.
    ///
    /// Default: `0.4`
    pub base_tag_chars_ratio: f64,

    /// Share of top-tag characters a text tag set must capture.
    ///
    /// Default: `0.1`
    pub article_text_chars_ratio: f64,

    /// Page URL used when the document declares none, and as the base for
    /// relative links until one is found.
    ///
    /// Default: `None`
    pub url: Option<String>,

    /// Identifier attached to log output for this document.
    ///
    /// Default: `None`
    pub document_id: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            decompose: true,
            clear_invisible: true,
            replace_breaks: true,
            unwrap_markup: false,
            compute_link_density: true,
            adjust_unwrap_spacing: true,
            clean_title: true,
            decompose_tags: DECOMPOSE_TAGS.iter().map(|t| (*t).to_string()).collect(),
            markup_tags: MARKUP_TAGS.iter().map(|t| (*t).to_string()).collect(),
            link_density_upper_bound: 0.75,
            max_levels: 5,
            min_tags_to_check: 1,
            base_tag_chars_ratio: 0.4,
            article_text_chars_ratio: 0.1,
            url: None,
            document_id: None,
        }
    }
}

impl Options {
    /// Check that every ratio lies in `[0, 1]` and `max_levels` is positive.
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("link_density_upper_bound", self.link_density_upper_bound),
            ("base_tag_chars_ratio", self.base_tag_chars_ratio),
            ("article_text_chars_ratio", self.article_text_chars_ratio),
        ];
        for (field, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config {
                    field,
                    reason: format!("{value} is outside [0, 1]"),
                });
            }
        }
        if self.max_levels == 0 {
            return Err(Error::Config {
                field: "max_levels",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Whether `tag` is decomposed by the cleaner.
    #[must_use]
    pub fn is_decompose_tag(&self, tag: &str) -> bool {
        self.decompose_tags.iter().any(|t| t == tag)
    }

    /// Whether `tag` is unwrapped as inline markup.
    #[must_use]
    pub fn is_markup_tag(&self, tag: &str) -> bool {
        self.markup_tags.iter().any(|t| t == tag)
    }
}
