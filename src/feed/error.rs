//! Error types for feed fetching and aggregation

use thiserror::Error;

/// Errors that can occur while fetching, parsing, or aggregating feeds.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network-level failure (DNS, connect, TLS, body read)
    #[error("request to {url} failed: {reason}")]
    Fetch {
        /// Feed URL
        url: String,
        /// Underlying transport error, rendered
        reason: String,
    },

    /// Upstream answered with a non-2xx status
    #[error("{url} answered with HTTP {status}")]
    HttpStatus {
        /// Feed URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The per-source deadline elapsed
    #[error("{url} timed out after {after_ms} ms")]
    Timeout {
        /// Feed URL
        url: String,
        /// Deadline that elapsed
        after_ms: u64,
    },

    /// The body could not be read as a feed document
    #[error("could not parse feed {url}: {reason}")]
    Parse {
        /// Feed URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// Category name is not one of the fixed set, or has no source table
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

impl FeedError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Fetch { .. } => "fetch",
            FeedError::HttpStatus { .. } => "http_status",
            FeedError::Timeout { .. } => "timeout",
            FeedError::Parse { .. } => "parse",
            FeedError::UnknownCategory(_) => "unknown_category",
        }
    }
}
