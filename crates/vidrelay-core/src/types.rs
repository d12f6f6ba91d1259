//! Core data types for vidrelay
//!
//! All values here live for a single request/response cycle.

use serde::{Deserialize, Serialize};

/// Recognized media container categories
///
/// Declaration order is selection priority: `Mp4` wins over `M3u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Progressive MP4 file (type A)
    Mp4,
    /// HLS playlist (type B)
    M3u8,
}

impl MediaKind {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Mp4 => "mp4",
            MediaKind::M3u8 => "m3u8",
        }
    }
}

/// Candidates partitioned by media kind, each in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundMedia {
    pub mp4: Vec<String>,
    pub m3u8: Vec<String>,
}

impl FoundMedia {
    /// Bucket for the given kind
    pub fn bucket(&self, kind: MediaKind) -> &[String] {
        match kind {
            MediaKind::Mp4 => &self.mp4,
            MediaKind::M3u8 => &self.m3u8,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mp4.is_empty() && self.m3u8.is_empty()
    }
}

/// Outcome of running all extraction rules over a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Merged candidates, deduplicated, first-seen order
    pub candidates: Vec<String>,
    /// Classified candidates
    pub found: FoundMedia,
    /// The chosen URL
    pub selected: String,
    /// Kind of the chosen URL
    pub kind: MediaKind,
}

/// Best-effort enrichment from a HEAD probe
///
/// Both fields are optional; a failed probe yields the default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaMetadata {
    pub filename: Option<String>,
    pub size_bytes: Option<u64>,
}

/// Successful resolver payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub page_url: String,
    pub raw_url: String,
    pub relay_url: String,
    pub filename: Option<String>,
    pub size_bytes: Option<u64>,
    pub found: FoundMedia,
}
