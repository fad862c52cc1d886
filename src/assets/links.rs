//! Outbound links and linked documents.

use url::Url;

use crate::dom::{NodeId, Tree};
use crate::result::{LinkItem, MediaItem};
use crate::url_utils::{lowercase_path, process_link};

/// Anchors under `scope` whose href path ends in `.pdf`, as `(href, text)`.
#[must_use]
pub fn find_documents(tree: &Tree, scope: NodeId) -> Vec<(String, String)> {
    tree.find_tags(scope, &["a"])
        .into_iter()
        .filter_map(|a| {
            let href = tree.attr(a, "href")?.trim();
            (!href.is_empty() && lowercase_path(href).ends_with(".pdf"))
                .then(|| (href.to_string(), tree.text_content(a)))
        })
        .collect()
}

/// Apply the link rules to raw `(href, text)` pairs, dropping rejects.
pub fn process_links<'a, I>(raw: I, base: Option<&Url>) -> Vec<LinkItem>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    raw.into_iter()
        .filter_map(|(href, text)| process_link(href, text, base))
        .map(|(url, text)| LinkItem { url, text })
        .collect()
}

/// [`process_links`] for lists whose text is reported as alt text.
pub fn process_media_links<'a, I>(raw: I, base: Option<&Url>) -> Vec<MediaItem>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    process_links(raw, base)
        .into_iter()
        .map(|l| MediaItem {
            url: l.url,
            alt_text: l.text,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_match_pdf_paths() {
        let tree = Tree::parse(
            r##"<div>
                <a href="/files/Report.PDF?v=2"> Annual report </a>
                <a href="/files/report.pdf.html">Not a pdf</a>
                <a href="#top">Top</a>
                <a>No href</a>
            </div>"##,
        );
        let body = tree.body().unwrap();
        let docs = find_documents(&tree, body);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].0, "/files/Report.PDF?v=2");
    }

    #[test]
    fn test_process_links_applies_rules() {
        let base = Url::parse("https://example.com/news/a").ok();
        let raw = vec![
            ("#comments", Some("Comments")),
            ("mailto:desk@example.com", None),
            ("javascript:void(0)", None),
            ("/about", Some("  About us ")),
            ("https://other.example.org/x", Some("   ")),
        ];
        let links = process_links(raw, base.as_ref());
        assert_eq!(
            links,
            vec![
                LinkItem {
                    url: "https://example.com/about".to_string(),
                    text: Some("About us".to_string()),
                },
                LinkItem {
                    url: "https://other.example.org/x".to_string(),
                    text: None,
                },
            ]
        );
    }

    #[test]
    fn test_relative_links_need_a_base() {
        let links = process_media_links(vec![("/about", None)], None);
        assert!(links.is_empty());
    }
}
