//! Metadata extraction module.
//!
//! Structured metadata embedded in the page: JSON-LD (Schema.org) and
//! OpenGraph. The two namespaces are filled independently from the parsed
//! document; the article extractor decides which one wins per field.

pub mod json_ld;
pub mod open_graph;

use dom_query::Document;

pub use json_ld::{extract_json_ld, JsonLd, NamedEntity};
pub use open_graph::{extract_open_graph, OgMedia, OpenGraph};

/// Both metadata namespaces of one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub json_ld: JsonLd,
    pub open_graph: OpenGraph,
}

/// Extract JSON-LD and OpenGraph metadata from a document.
#[must_use]
pub fn extract_metadata(doc: &Document) -> Metadata {
    Metadata {
        json_ld: extract_json_ld(doc),
        open_graph: extract_open_graph(doc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces_are_independent() {
        let doc = Document::from(
            r#"<html><head>
                <meta property="og:title" content="From OG">
                <script type="application/ld+json">{"@type": "Article", "headline": "From LD"}</script>
            </head><body></body></html>"#,
        );
        let metadata = extract_metadata(&doc);
        assert_eq!(metadata.open_graph.title.as_deref(), Some("From OG"));
        assert_eq!(metadata.json_ld.headline.as_deref(), Some("From LD"));
        assert_eq!(metadata.json_ld.name, None);
    }

    #[test]
    fn test_empty_document() {
        let metadata = extract_metadata(&Document::from(""));
        assert_eq!(metadata, Metadata::default());
    }
}
