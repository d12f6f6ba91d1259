//! Error types for vidrelay
//!
//! Every failure the resolver or relay can produce is one of these
//! variants. Each variant maps onto a fixed HTTP status class so the
//! server layer can turn it into a structured `{ok:false}` response.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for all resolver and relay operations
#[derive(Error, Debug)]
pub enum VidrelayError {
    /// Missing or malformed required parameter
    #[error("{0}")]
    InvalidInput(String),

    /// A remote fetch answered with a non-success status
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetchFailed(u16),

    /// The scraped page produced no usable candidates
    #[error("No media URLs (mp4/m3u8) found on page")]
    NoMediaFound,

    /// Transport-level failure talking to a remote host
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VidrelayError {
    /// HTTP status class this error is reported with
    pub fn status_code(&self) -> u16 {
        match self {
            VidrelayError::InvalidInput(_) => 400,
            VidrelayError::NoMediaFound => 404,
            VidrelayError::UpstreamFetchFailed(_) => 502,
            VidrelayError::Http(_) | VidrelayError::Internal(_) => 500,
        }
    }

    /// Shorthand for an `InvalidInput` error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        VidrelayError::InvalidInput(message.into())
    }
}

impl Serialize for VidrelayError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for vidrelay operations
pub type Result<T> = std::result::Result<T, VidrelayError>;
