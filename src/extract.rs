//! Extraction pipeline: one HTML document in, one [`ArticleRecord`] out.
//!
//! Structured metadata and the page URL are read from the document as
//! parsed. A copy is then cleaned and annotated; title, description,
//! language, timestamps, keywords, authors, assets and body text all come
//! from the cleaned copy.

use std::borrow::Cow;

use dom_query::Document;
use tracing::{debug, info_span, warn};

use crate::dom::Tree;
use crate::error::Result;
use crate::extractor::{fields, keywords, ArticleExtractor, Sourced};
use crate::metadata::{extract_metadata, Metadata};
use crate::options::Options;
use crate::patterns::{IFRAME_IN_HEAD, NOSCRIPT_IN_HEAD};
use crate::result::{ArticleRecord, Provenance, Site};
use crate::url_utils::{base_url, is_valid_url};

/// Strip `<iframe>` and `<noscript>` elements inside `<head>`.
///
/// A tree builder would move their content into `<body>`. Each pass removes
/// one element per head, so passes repeat until nothing changes.
pub(crate) fn preprocess(html: &str) -> Cow<'_, str> {
    let mut html = Cow::Borrowed(html);
    for pattern in [&*IFRAME_IN_HEAD, &*NOSCRIPT_IN_HEAD] {
        loop {
            let replaced = pattern.replace_all(&html, "${1}${2}");
            if let Cow::Owned(changed) = replaced {
                html = Cow::Owned(changed);
            } else {
                break;
            }
        }
    }
    html
}

/// Extract from raw HTML.
pub(crate) fn extract_html(html: &str, options: &Options) -> Result<ArticleRecord> {
    let html = preprocess(html);
    let document = Document::from(html.as_ref());
    extract_document(&document, options)
}

fn split<T>(found: Option<Sourced<T>>) -> (Option<T>, Option<&'static str>) {
    match found {
        Some(s) => (Some(s.value), Some(s.method)),
        None => (None, None),
    }
}

fn site(metadata: &Metadata) -> Vec<Site> {
    if !metadata.json_ld.publisher.is_empty() {
        return metadata
            .json_ld
            .publisher
            .iter()
            .map(|p| Site {
                name: Some(p.name.clone()),
                url: p.url.clone(),
            })
            .collect();
    }
    metadata
        .open_graph
        .site_name
        .iter()
        .map(|name| Site {
            name: Some(name.clone()),
            url: None,
        })
        .collect()
}

fn categories(metadata: &Metadata) -> Vec<String> {
    if metadata.json_ld.article_section.is_empty() {
        metadata.open_graph.section.iter().cloned().collect()
    } else {
        metadata.json_ld.article_section.clone()
    }
}

/// Null out scalar URLs and drop list items that fail absolute-URL
/// validation.
fn drop_invalid_urls(record: &mut ArticleRecord) {
    let keep = |url: &str| {
        let valid = is_valid_url(url);
        if !valid {
            debug!(url, "dropping invalid url from record");
        }
        valid
    };
    if record.url.as_deref().is_some_and(|u| !keep(u)) {
        record.url = None;
    }
    for site in &mut record.site {
        if site.url.as_deref().is_some_and(|u| !keep(u)) {
            site.url = None;
        }
    }
    for author in &mut record.authors {
        if author.url.as_deref().is_some_and(|u| !keep(u)) {
            author.url = None;
        }
        if author.image_url.as_deref().is_some_and(|u| !keep(u)) {
            author.image_url = None;
        }
    }
    for list in [
        &mut record.images,
        &mut record.videos,
        &mut record.documents,
        &mut record.comment_areas,
    ] {
        list.retain(|m| keep(&m.url));
    }
    record.links.retain(|l| keep(&l.url));
}

/// Extract from a parsed document.
pub(crate) fn extract_document(document: &Document, options: &Options) -> Result<ArticleRecord> {
    let span = info_span!(
        "extract",
        document_id = options.document_id.as_deref().unwrap_or("-")
    );
    let _guard = span.enter();

    let metadata = extract_metadata(document);
    let pristine = Tree::from_document(document);

    let (found_url, url_method) = split(fields::page_url(&pristine, &metadata));
    let url = found_url.or_else(|| options.url.clone());
    let base = base_url(url.as_deref());

    let mut article = match ArticleExtractor::new(pristine.clone(), options, url.clone()) {
        Ok(article) => article,
        Err(err) => {
            warn!(%err, "extraction aborted");
            return Err(err);
        }
    };
    let cleaned = article.tree();

    let (title, title_method) =
        split(fields::title(cleaned, &metadata, base.as_ref(), options.clean_title));
    let (description, description_method) = split(fields::description(cleaned, &metadata));
    let (language, language_method) = split(fields::language(cleaned, &metadata));
    let (published, published_method) = split(fields::published(cleaned, &metadata));
    let (modified, modified_method) = split(fields::modified(cleaned, &metadata));
    let keywords = keywords::keywords(cleaned, &metadata);

    let (authors, authors_method) = split(article.authors(&pristine, &metadata));
    let assets = article.assets();
    let body = article.article_text();

    let mut links = assets.links;
    links.extend(body.links);

    let mut record = ArticleRecord {
        categories: categories(&metadata),
        authors: authors.unwrap_or_default(),
        title,
        url,
        published,
        modified,
        site: site(&metadata),
        language,
        content: body.paragraphs,
        description,
        images: assets.images,
        links,
        videos: assets.videos,
        documents: assets.documents,
        keywords: keywords.values,
        comment_areas: assets.comment_areas,
        provenance: Provenance {
            url: url_method,
            title: title_method,
            description: description_method,
            language: language_method,
            published: published_method,
            modified: modified_method,
            keywords: keywords.methods,
            authors: authors_method,
        },
    };
    drop_invalid_urls(&mut record);

    debug!(
        paragraphs = record.content.len(),
        images = record.images.len(),
        links = record.links.len(),
        "extraction complete"
    );
    Ok(record)
}
