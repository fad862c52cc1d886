//! Error types for rs-article-extract.
//!
//! Only structural failures surface as errors. Malformed data inside a
//! document (a broken JSON-LD block, an unparseable date, an invalid URL)
//! is skipped and logged instead.

/// Error type for extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document has no `<body>` element to extract from.
    #[error("document has no <body> element")]
    NoBody,

    /// An ancestral-distance query was made between unrelated nodes.
    #[error("node {node} is not a descendant of node {ancestor}")]
    NotDescendant {
        /// Arena index of the presumed ancestor.
        ancestor: usize,
        /// Arena index of the node that was queried.
        node: usize,
    },

    /// Character encoding detection or conversion failed.
    #[error("encoding detection failed: {0}")]
    Encoding(String),

    /// An options value is outside its permitted range.
    #[error("invalid option `{field}`: {reason}")]
    Config {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
