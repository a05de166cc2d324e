// ABOUTME: Error types for discovery and fetch operations.
// ABOUTME: Individual guessed-path probe failures never surface here; they are swallowed at the probe.

use postscout_feed::FeedError;
use thiserror::Error;

/// Errors surfaced by [`crate::Client`] operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Discovery exhausted every enabled strategy without an accepted
    /// candidate.
    #[error("no post source available for {url}")]
    NoSourceFound { url: String },

    /// A required request answered with an error status.
    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// A required request answered with an empty body.
    #[error("empty response body from {url}")]
    EmptyBody { url: String },

    /// The response body exceeds the transport size cap.
    #[error("response body from {url} exceeds the size limit")]
    BodyTooLarge { url: String },

    /// A URL could not be parsed or resolved.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The fetched document could not be classified or parsed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// The underlying HTTP request failed.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}
