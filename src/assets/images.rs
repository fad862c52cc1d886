//! Image discovery: `<figure>`, `<picture>` and `<img>`.
//!
//! Responsive images are resolved to a single URL: `<picture>` sources are
//! ranked by MIME type and media query, `srcset` candidates by width then
//! pixel density.

use tracing::debug;

use crate::dom::{NodeId, Tree};
use crate::patterns::{MEDIA_MAX_WIDTH, MEDIA_MIN_WIDTH, SRCSET_SEPARATOR};
use crate::url_utils::{lowercase_path, query_param};

/// Image MIME types in order of preference.
const IMAGE_MIME_TYPES: &[&str] = &[
    "image/webp",
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/avif",
    "image/apng",
];

/// Path suffixes accepted for a `data-src` attribute.
const IMAGE_SUFFIXES: &[&str] = &[
    ".webp", ".jpg", ".jpeg", ".jpe", ".jif", ".jfif", ".png", ".gif", ".avif", ".apng",
];

/// An image found in the tree, before URL resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub src: String,
    pub alt: Option<String>,
}

/// Parsed `srcset` attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Srcset {
    /// `(width descriptor, url)`
    pub widths: Vec<(u32, String)>,
    /// `(density descriptor, url)`; a bare URL counts as `1x`.
    pub densities: Vec<(f64, String)>,
}

impl Srcset {
    /// Parse a `srcset` value. Candidates with unreadable descriptors are skipped.
    #[must_use]
    pub fn parse(srcset: &str) -> Self {
        let mut parsed = Self::default();
        for candidate in SRCSET_SEPARATOR.split(srcset) {
            let parts: Vec<&str> = candidate.split_whitespace().collect();
            match parts.as_slice() {
                [url] => {
                    let url = url.strip_suffix(',').unwrap_or(url);
                    if !url.is_empty() {
                        parsed.densities.push((1.0, url.to_string()));
                    }
                }
                [url, descriptor] => parsed.push_descriptor(url, descriptor),
                [] => {}
                _ => debug!(candidate, "unreadable srcset candidate"),
            }
        }
        parsed
    }

    fn push_descriptor(&mut self, url: &str, descriptor: &str) {
        let url = url.to_string();
        let descriptor = descriptor.trim_end_matches(',');
        if let Some(w) = descriptor.strip_suffix('w') {
            match w.parse::<u32>() {
                Ok(w) => self.widths.push((w, url)),
                Err(_) => debug!(descriptor, "bad srcset width descriptor"),
            }
        } else if let Some(x) = descriptor.strip_suffix('x') {
            match x.parse::<f64>() {
                Ok(x) if x.is_finite() => self.densities.push((x, url)),
                _ => debug!(descriptor, "bad srcset density descriptor"),
            }
        }
    }

    fn extend(&mut self, other: Self) {
        self.widths.extend(other.widths);
        self.densities.extend(other.densities);
    }

    fn is_empty(&self) -> bool {
        self.widths.is_empty() && self.densities.is_empty()
    }

    /// The largest-width candidate, else the highest-density one.
    /// Widths of 1px or less are ignored.
    #[must_use]
    pub fn best(&self) -> Option<&str> {
        let widest = self
            .widths
            .iter()
            .filter(|(w, _)| *w > 1)
            .fold(None::<&(u32, String)>, |best, c| match best {
                Some(b) if b.0 >= c.0 => Some(b),
                _ => Some(c),
            });
        if let Some((_, url)) = widest {
            return Some(url);
        }
        self.densities
            .iter()
            .fold(None::<&(f64, String)>, |best, c| match best {
                Some(b) if b.0 >= c.0 => Some(b),
                _ => Some(c),
            })
            .map(|(_, url)| url.as_str())
    }
}

/// `(min-width, max-width)` in pixels from a `media` attribute.
#[must_use]
pub fn parse_media(media: &str) -> (Option<u32>, Option<u32>) {
    let px = |re: &regex::Regex| {
        re.captures(media)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    };
    (px(&MEDIA_MIN_WIDTH), px(&MEDIA_MAX_WIDTH))
}

/// Sources of a `<picture>` sharing MIME type and media query.
struct SourceGroup {
    mime_type: Option<String>,
    min_width: Option<u32>,
    max_width: Option<u32>,
    srcset: Srcset,
}

/// First group with the largest key, skipping groups without one.
fn first_max_by<F>(groups: &[&SourceGroup], key: F) -> Option<String>
where
    F: Fn(&SourceGroup) -> Option<u32>,
{
    let mut best: Option<(u32, &SourceGroup)> = None;
    for group in groups {
        if let Some(k) = key(group) {
            if best.is_none_or(|(b, _)| k > b) {
                best = Some((k, group));
            }
        }
    }
    best.and_then(|(_, g)| g.srcset.best().map(str::to_string))
}

/// Best URL among the direct `<source>` children of a `<picture>`.
#[must_use]
pub fn picture_source(tree: &Tree, picture: NodeId) -> Option<String> {
    let mut groups: Vec<SourceGroup> = Vec::new();
    for source in tree.element_children(picture).filter(|&c| tree.is_tag(c, "source")) {
        let mut srcset = Srcset::parse(tree.attr(source, "srcset").unwrap_or_default());
        srcset.extend(Srcset::parse(tree.attr(source, "data-srcset").unwrap_or_default()));
        if srcset.is_empty() {
            continue;
        }
        let mime_type = tree.attr(source, "type").map(str::to_string);
        let (min_width, max_width) = parse_media(tree.attr(source, "media").unwrap_or_default());
        match groups.iter_mut().find(|g| {
            g.mime_type == mime_type && g.min_width == min_width && g.max_width == max_width
        }) {
            Some(group) => group.srcset.extend(srcset),
            None => groups.push(SourceGroup {
                mime_type,
                min_width,
                max_width,
                srcset,
            }),
        }
    }

    let preferences = IMAGE_MIME_TYPES.iter().map(|m| Some(*m)).chain([None]);
    for mime in preferences {
        let candidates: Vec<&SourceGroup> = groups
            .iter()
            .filter(|g| g.mime_type.as_deref() == mime)
            .collect();
        match candidates.as_slice() {
            [] => continue,
            [only] => {
                if let Some(best) = only.srcset.best() {
                    return Some(best.to_string());
                }
            }
            _ => {
                let chosen = first_max_by(&candidates, |g| g.min_width)
                    .or_else(|| first_max_by(&candidates, |g| g.max_width))
                    .or_else(|| {
                        candidates
                            .iter()
                            .find_map(|g| g.srcset.best().map(str::to_string))
                    });
                if chosen.is_some() {
                    return chosen;
                }
            }
        }
    }
    None
}

/// Whether the path of `src`, or of its `src` query parameter, has an image suffix.
#[must_use]
pub fn has_image_suffix(src: &str) -> bool {
    let path = lowercase_path(src);
    let nested = query_param(src, "src").map(|s| s.to_ascii_lowercase());
    IMAGE_SUFFIXES.iter().any(|suffix| {
        path.ends_with(suffix) || nested.as_deref().is_some_and(|n| n.ends_with(suffix))
    })
}

fn alt_text(tree: &Tree, img: NodeId) -> Option<String> {
    tree.attr(img, "alt")
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
}

/// Source of an `<img>`: best `srcset` candidate, else `data-src` when it
/// looks like an image, else `src`.
#[must_use]
pub fn img_source(tree: &Tree, img: NodeId) -> Option<String> {
    let from_srcset = tree
        .attr(img, "srcset")
        .map(Srcset::parse)
        .and_then(|s| s.best().map(str::to_string));
    from_srcset
        .or_else(|| {
            tree.attr(img, "data-src")
                .map(str::trim)
                .filter(|s| !s.is_empty() && has_image_suffix(s))
                .map(str::to_string)
        })
        .or_else(|| {
            tree.attr(img, "src")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
}

/// Image of an `<img>` element.
#[must_use]
pub fn process_img(tree: &Tree, img: NodeId) -> Option<RawImage> {
    Some(RawImage {
        src: img_source(tree, img)?,
        alt: alt_text(tree, img),
    })
}

/// Image of a `<picture>`: the best `<source>`, else its `<img>`.
#[must_use]
pub fn process_picture(tree: &Tree, picture: NodeId) -> Option<RawImage> {
    let img = tree.find_first_tag(picture, "img");
    let alt = img.and_then(|i| alt_text(tree, i));
    let src = picture_source(tree, picture).or_else(|| img.and_then(|i| img_source(tree, i)))?;
    Some(RawImage { src, alt })
}

/// Image of a `<figure>`, captioned by its first `<figcaption>`.
#[must_use]
pub fn process_figure(tree: &Tree, figure: NodeId) -> Option<RawImage> {
    let caption = tree
        .find_first_tag(figure, "figcaption")
        .map(|c| tree.text_content(c).trim().to_string())
        .filter(|c| !c.is_empty());

    let image = tree
        .find_first_tag(figure, "picture")
        .and_then(|p| process_picture(tree, p))
        .or_else(|| {
            tree.find_first_tag(figure, "img")
                .and_then(|i| process_img(tree, i))
        });

    match image {
        Some(image) => Some(RawImage {
            src: image.src,
            alt: caption.or(image.alt),
        }),
        None => {
            debug!("figure without a usable picture or img");
            None
        }
    }
}

/// Whether `id` has an ancestor named `tag` strictly below `scope`.
fn inside(tree: &Tree, id: NodeId, scope: NodeId, tags: &[&str]) -> bool {
    tree.ancestors(id)
        .take_while(|&a| a != scope)
        .any(|a| tree.tag_in(a, tags))
}

/// Every image under `scope`: figures first, then pictures outside figures,
/// then images outside both.
#[must_use]
pub fn find_images(tree: &Tree, scope: NodeId) -> Vec<RawImage> {
    let mut images: Vec<RawImage> = tree
        .find_tags(scope, &["figure"])
        .into_iter()
        .filter_map(|f| process_figure(tree, f))
        .collect();

    images.extend(
        tree.find_tags(scope, &["picture"])
            .into_iter()
            .filter(|&p| !inside(tree, p, scope, &["figure"]))
            .filter_map(|p| process_picture(tree, p)),
    );

    images.extend(
        tree.find_tags(scope, &["img"])
            .into_iter()
            .filter(|&i| !inside(tree, i, scope, &["figure", "picture"]))
            .filter_map(|i| process_img(tree, i)),
    );

    images
}
