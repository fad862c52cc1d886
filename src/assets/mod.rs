//! Asset extraction: images, videos, links, comment areas and documents.
//!
//! [`AssetScanner`] works on any subtree. The article extractor hands it the
//! base tag; on its own it is usually given `<body>`.

pub mod images;
pub mod links;
pub mod videos;

use tracing::debug;
use url::Url;

use crate::dom::{NodeId, Tree};
use crate::result::{LinkItem, MediaItem};
use crate::url_utils::{base_url, validate_url};

pub use images::{find_images, process_img, RawImage, Srcset};
pub use videos::{classify_iframe, find_embeds, IframeKind};

/// Assets found under one subtree, with absolute validated URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assets {
    pub images: Vec<MediaItem>,
    pub videos: Vec<MediaItem>,
    pub links: Vec<LinkItem>,
    pub comment_areas: Vec<MediaItem>,
    pub documents: Vec<MediaItem>,
}

/// Scans subtrees of one document for assets.
#[derive(Debug)]
pub struct AssetScanner<'a> {
    tree: &'a Tree,
    page_url: Option<&'a str>,
    base: Option<Url>,
}

impl<'a> AssetScanner<'a> {
    #[must_use]
    pub fn new(tree: &'a Tree, page_url: Option<&'a str>) -> Self {
        Self {
            tree,
            page_url,
            base: base_url(page_url),
        }
    }

    /// Base URL for resolving relative hrefs.
    #[must_use]
    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    /// Resolve `src` against the page URL, keeping it only if valid.
    #[must_use]
    pub fn resolve(&self, src: &str) -> Option<String> {
        match validate_url(src, self.base()) {
            (url, true) => Some(url),
            (url, false) => {
                debug!(src, url, "dropping asset with invalid url");
                None
            }
        }
    }

    /// Resolve a raw image found in the tree.
    #[must_use]
    pub fn image_item(&self, image: RawImage) -> Option<MediaItem> {
        Some(MediaItem {
            url: self.resolve(&image.src)?,
            alt_text: image.alt,
        })
    }

    /// Images under `scope`.
    #[must_use]
    pub fn images(&self, scope: NodeId) -> Vec<MediaItem> {
        find_images(self.tree, scope)
            .into_iter()
            .filter_map(|i| self.image_item(i))
            .collect()
    }

    /// Links to PDF documents under `scope`.
    #[must_use]
    pub fn documents(&self, scope: NodeId) -> Vec<MediaItem> {
        let raw = links::find_documents(self.tree, scope);
        links::process_media_links(
            raw.iter().map(|(href, text)| (href.as_str(), Some(text.as_str()))),
            self.base(),
        )
    }

    /// Videos, embedded links and comment areas under `scope`.
    #[must_use]
    pub fn embeds(&self, scope: NodeId) -> (Vec<MediaItem>, Vec<LinkItem>, Vec<MediaItem>) {
        let embeds = find_embeds(self.tree, scope, self.page_url);
        let videos = embeds
            .videos
            .iter()
            .filter_map(|src| self.resolve(src))
            .map(|url| MediaItem { url, alt_text: None })
            .collect();
        let links = links::process_links(
            embeds.links.iter().map(|s| (s.as_str(), None)),
            self.base(),
        );
        let comment_areas = links::process_media_links(
            embeds.comment_areas.iter().map(|s| (s.as_str(), None)),
            self.base(),
        );
        (videos, links, comment_areas)
    }

    /// Every asset under `scope`.
    #[must_use]
    pub fn scan(&self, scope: NodeId) -> Assets {
        let (videos, links, comment_areas) = self.embeds(scope);
        Assets {
            images: self.images(scope),
            videos,
            links,
            comment_areas,
            documents: self.documents(scope),
        }
    }
}
