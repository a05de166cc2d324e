// ABOUTME: Error types for feed sniffing and parsing operations.
// ABOUTME: Sniffing failures are fatal; field-level absence is never an error.

use thiserror::Error;

/// Errors that can occur while classifying or parsing a feed document.
///
/// These are document-level failures and always surface to the caller;
/// malformed individual entries inside an otherwise valid document are
/// dropped by the mappers instead.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The payload looks like neither JSON nor XML.
    #[error("unrecognized feed format")]
    UnrecognizedFormat,

    /// The payload parsed as JSON but matches no known feed schema.
    #[error("unidentifiable feed: neither a JSON Feed nor an RSS document")]
    UnidentifiableFeed,

    /// No `rss`, `feed` or `rdf:RDF` element anywhere in the XML tree.
    #[error("feed root element not found")]
    RootNotFound,

    /// The payload is structurally broken JSON or XML.
    #[error("failed to parse feed: {0}")]
    Parse(String),
}

impl FeedError {
    /// Creates a `Parse` error from an underlying JSON or XML error.
    pub fn parse(err: impl std::fmt::Display) -> Self {
        FeedError::Parse(err.to_string())
    }
}
