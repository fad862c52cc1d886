//! Result types for extraction output.
//!
//! An [`ArticleRecord`] is the flat record handed to downstream pipelines,
//! paired with a [`Provenance`] naming the source each field came from.

use serde::{Deserialize, Serialize};

/// An image, video, document or comment-area URL with optional alt text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    /// Absolute http(s) URL.
    pub url: String,

    /// Caption, alt attribute or anchor text, if any.
    pub alt_text: Option<String>,
}

/// An outbound link and its anchor text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkItem {
    /// Absolute http(s) URL.
    pub url: String,

    /// Trimmed anchor text, `None` if empty.
    pub text: Option<String>,
}

/// An article author. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

/// The publishing site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Name of the source each extracted field was taken from.
///
/// `None` means the field was not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub url: Option<&'static str>,
    pub title: Option<&'static str>,
    pub description: Option<&'static str>,
    pub language: Option<&'static str>,
    pub published: Option<&'static str>,
    pub modified: Option<&'static str>,
    /// Every keyword source that contributed at least one new keyword.
    pub keywords: Vec<&'static str>,
    pub authors: Option<&'static str>,
}

/// Structured article extracted from one HTML document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    /// Sections the article is filed under.
    pub categories: Vec<String>,

    pub authors: Vec<Author>,

    pub title: Option<String>,

    /// Canonical page URL, or the URL supplied in the options.
    pub url: Option<String>,

    /// Publication timestamp, ISO-8601.
    pub published: Option<String>,

    /// Last modification timestamp, ISO-8601.
    pub modified: Option<String>,

    pub site: Vec<Site>,

    /// BCP47 language tag.
    pub language: Option<String>,

    /// Body text, one entry per paragraph.
    pub content: Vec<String>,

    pub description: Option<String>,

    pub images: Vec<MediaItem>,

    /// Links found among the assets, followed by links inside the body text.
    pub links: Vec<LinkItem>,

    pub videos: Vec<MediaItem>,

    /// Linked PDF documents.
    pub documents: Vec<MediaItem>,

    /// Case-insensitively unique, sorted.
    pub keywords: Vec<String>,

    /// Embedded comment widgets.
    pub comment_areas: Vec<MediaItem>,

    pub provenance: Provenance,
}

impl ArticleRecord {
    /// Body paragraphs joined by newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.content.join("\n")
    }

    /// Every URL the record emits, for validation.
    pub fn urls(&self) -> impl Iterator<Item = &str> + '_ {
        let media = self
            .images
            .iter()
            .chain(&self.videos)
            .chain(&self.documents)
            .chain(&self.comment_areas)
            .map(|m| m.url.as_str());
        let links = self.links.iter().map(|l| l.url.as_str());
        let authors = self
            .authors
            .iter()
            .flat_map(|a| a.url.iter().chain(&a.image_url))
            .map(String::as_str);
        let sites = self.site.iter().filter_map(|s| s.url.as_deref());
        media
            .chain(links)
            .chain(authors)
            .chain(sites)
            .chain(self.url.as_deref())
    }
}
