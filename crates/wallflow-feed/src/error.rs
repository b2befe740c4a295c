//! Error types for the feed crate.

use thiserror::Error;

/// Errors from a single fetch or download round.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The response body was not the expected JSON shape.
    #[error("could not decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A downloaded image could not be written to disk.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
