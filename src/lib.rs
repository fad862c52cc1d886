//! # rs-article-extract
//!
//! Structured article extraction from news and blog pages.
//!
//! The extractor takes one HTML document and returns its title, authors,
//! timestamps, description, language, keywords, body text and media, each
//! field together with the name of the source it was read from.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_article_extract::{extract_with_options, Options};
//!
//! let html = r#"<html lang="en"><head><title>Big Story Unfolds - My News</title></head>
//! <body><article><p>Main content here.</p></article></body></html>"#;
//!
//! let options = Options {
//!     url: Some("https://news.example.com/big-story".to_string()),
//!     ..Options::default()
//! };
//! let record = extract_with_options(html, &options)?;
//! assert_eq!(record.title.as_deref(), Some("Big Story Unfolds"));
//! assert_eq!(record.provenance.title, Some("title_cleaned"));
//! assert_eq!(record.content, vec!["Main content here."]);
//! # Ok::<(), rs_article_extract::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! - **Metadata**: JSON-LD and OpenGraph are parsed from the document as is
//! - **Cleaning**: noise removal, whitespace and line-break normalization,
//!   then a link-density annotation pass
//! - **Localization**: the base tag holding the article and the top tag
//!   holding its text
//! - **Fields and assets**: prioritized source chains per field, images,
//!   videos, links and documents under the base tag, body text from the top
//!   tag

mod error;
mod extract;
mod options;
mod patterns;
mod result;
mod tags;

/// Owned arena tree used by the mutating stages.
pub mod dom;

/// Static selector rules over the arena tree.
pub mod selector;

/// Configurable cleaning passes.
pub mod cleaner;

/// Character counts and link density per element.
pub mod link_density;

/// Images, videos, links, comment areas and documents.
pub mod assets;

/// Content localization, body text and field extraction.
pub mod extractor;

/// Metadata extraction (JSON-LD, Open Graph).
pub mod metadata;

/// URL utilities for validation and resolution.
pub mod url_utils;

/// Lenient date parsing.
pub mod date_utils;

/// BCP47 language tags.
pub mod language;

/// Field normalization and string similarity.
pub mod text;

/// Character encoding detection and transcoding.
pub mod encoding;

// Public API - re-exports
pub use error::{Error, Result};
pub use options::Options;
pub use result::{ArticleRecord, Author, LinkItem, MediaItem, Provenance, Site};

/// Extracts an article from an HTML document using default options.
///
/// # Example
///
/// ```rust
/// use rs_article_extract::extract;
///
/// let html = "<html><body><article><p>Content</p></article></body></html>";
/// let record = extract(html)?;
/// println!("{}", record.text());
/// # Ok::<(), rs_article_extract::Error>(())
/// ```
#[allow(clippy::missing_errors_doc)]
pub fn extract(html: &str) -> Result<ArticleRecord> {
    extract_with_options(html, &Options::default())
}

/// Extracts an article from an HTML document with custom options.
///
/// # Example
///
/// ```rust
/// use rs_article_extract::{extract_with_options, Options};
///
/// let html = "<html><body><article><p>Content</p></article></body></html>";
/// let options = Options {
///     document_id: Some("doc-42".to_string()),
///     max_levels: 3,
///     ..Options::default()
/// };
/// let record = extract_with_options(html, &options)?;
/// # Ok::<(), rs_article_extract::Error>(())
/// ```
#[allow(clippy::missing_errors_doc)]
pub fn extract_with_options(html: &str, options: &Options) -> Result<ArticleRecord> {
    options.validate()?;
    extract::extract_html(html, options)
}

/// Extracts an article from an already parsed document.
///
/// The document is only read; cleaning works on a copy. Elements that a
/// tree builder moved out of `<head>` are not restored, so prefer
/// [`extract_with_options`] when the raw HTML is at hand.
///
/// # Example
///
/// ```rust
/// use dom_query::Document;
/// use rs_article_extract::{extract_document, Options};
///
/// let doc = Document::from("<html><body><p>Parsed elsewhere.</p></body></html>");
/// let record = extract_document(&doc, &Options::default())?;
/// assert_eq!(record.content, vec!["Parsed elsewhere."]);
/// # Ok::<(), rs_article_extract::Error>(())
/// ```
#[allow(clippy::missing_errors_doc)]
pub fn extract_document(doc: &dom_query::Document, options: &Options) -> Result<ArticleRecord> {
    options.validate()?;
    extract::extract_document(doc, options)
}

/// Extracts an article from HTML bytes with automatic encoding detection.
///
/// # Character Encoding
///
/// The function detects encoding from:
/// - a byte-order mark
/// - `<meta http-equiv="Content-Type" content="...; charset=...">`
/// - `<meta charset="...">`
/// - Defaults to UTF-8 if no declaration found
///
/// Invalid sequences are replaced with U+FFFD. A document that decodes to
/// mostly replacement characters is rejected with [`Error::Encoding`].
///
/// # Example
///
/// ```rust
/// use rs_article_extract::{extract_bytes, Options};
///
/// // ISO-8859-1 encoded HTML with charset declaration
/// let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body><p>Caf\xE9</p></body></html>";
/// let record = extract_bytes(html, &Options::default())?;
/// assert_eq!(record.content, vec!["Café"]);
/// # Ok::<(), rs_article_extract::Error>(())
/// ```
#[allow(clippy::missing_errors_doc)]
pub fn extract_bytes(html: &[u8], options: &Options) -> Result<ArticleRecord> {
    let html_str = encoding::transcode_to_utf8(html)?;
    extract_with_options(&html_str, options)
}
