//! Media link parser
//!
//! Discovers direct media URLs in arbitrary page HTML. Discovery is driven
//! by a table of named extraction rules; each rule is a pure scan over the
//! page text returning candidates in discovery order.

use std::collections::HashSet;

use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{Result, VidrelayError};
use crate::types::{ExtractionResult, FoundMedia, MediaKind};

/// Marker of in-memory object URLs; such links cannot be fetched outside
/// the page that created them
const BLOB_MARKER: &str = "blob:";

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// A named heuristic for finding media links in page text
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRule {
    pub name: &'static str,
    pub scan: fn(&str) -> Vec<String>,
}

/// Rules in the order their results are merged
pub const EXTRACTION_RULES: &[ExtractionRule] = &[
    ExtractionRule {
        name: "media_url",
        scan: scan_media_urls,
    },
    ExtractionRule {
        name: "media_tag",
        scan: scan_media_tags,
    },
    ExtractionRule {
        name: "source_key",
        scan: scan_source_keys,
    },
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Runs every rule in [`EXTRACTION_RULES`] and merges the results
///
/// Candidates are HTML-entity decoded, `blob:` references are dropped and
/// duplicates keep their first-seen position.
///
/// # Arguments
/// * `html` - Raw page text
///
/// # Returns
/// Ordered, deduplicated candidate list. Empty if nothing was found.
pub fn extract_candidates(html: &str) -> Vec<String> {
    extract_candidates_with(EXTRACTION_RULES, html)
}

/// Same as [`extract_candidates`] with a caller-supplied rule table
pub fn extract_candidates_with(rules: &[ExtractionRule], html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for rule in rules {
        let found = (rule.scan)(html);
        tracing::trace!(rule = rule.name, count = found.len(), "extraction rule ran");

        for candidate in found {
            let candidate = decode_html_entities(&candidate);
            if candidate.contains(BLOB_MARKER) {
                continue;
            }
            if seen.insert(candidate.clone()) {
                merged.push(candidate);
            }
        }
    }

    merged
}

/// Classifies a candidate by the extension at the end of its path
///
/// Returns `None` when the extension is not directly followed by a query
/// string or the end of the URL.
pub fn classify(url: &str) -> Option<MediaKind> {
    let Ok(re) = Regex::new(r"(?i)\.(mp4|m3u8)(?:\?|$)") else {
        return None;
    };

    let caps = re.captures(url)?;
    match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
        "mp4" => Some(MediaKind::Mp4),
        "m3u8" => Some(MediaKind::M3u8),
        _ => None,
    }
}

/// Splits candidates into per-kind buckets, preserving order
///
/// Unclassifiable candidates are left out.
pub fn partition(candidates: &[String]) -> FoundMedia {
    let mut found = FoundMedia::default();
    for candidate in candidates {
        match classify(candidate) {
            Some(MediaKind::Mp4) => found.mp4.push(candidate.clone()),
            Some(MediaKind::M3u8) => found.m3u8.push(candidate.clone()),
            None => {}
        }
    }
    found
}

/// Picks the first candidate of the highest-priority kind
pub fn select(found: &FoundMedia) -> Option<(String, MediaKind)> {
    [MediaKind::Mp4, MediaKind::M3u8]
        .into_iter()
        .find_map(|kind| found.bucket(kind).first().map(|url| (url.clone(), kind)))
}

/// Extracts and selects the best media URL from page HTML
///
/// # Errors
/// Returns `NoMediaFound` if no rule produced a classifiable candidate
pub fn parse_media(html: &str) -> Result<ExtractionResult> {
    let candidates = extract_candidates(html);
    let found = partition(&candidates);
    let (selected, kind) = select(&found).ok_or(VidrelayError::NoMediaFound)?;

    Ok(ExtractionResult {
        candidates,
        found,
        selected,
        kind,
    })
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Absolute links ending in a media extension, with optional query
fn scan_media_urls(html: &str) -> Vec<String> {
    let Ok(re) = Regex::new(r#"(?i)https?://[^"'\s\\]+?\.(?:mp4|m3u8)(?:\?[^"'\s\\]*)?"#) else {
        return Vec::new();
    };

    re.find_iter(html)
        .filter(|m| !preceded_by_blob_marker(html, m.start()))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// `src` attributes of `<video>` and `<source>` elements
fn scan_media_tags(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("video[src], source[src]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("src"))
        .map(str::trim)
        .filter(|src| is_absolute_http(src) && classify(src).is_some())
        .map(str::to_string)
        .collect()
}

/// Quoted `file` / `src` / `url` keys holding an absolute media URL
fn scan_source_keys(html: &str) -> Vec<String> {
    let Ok(re) = Regex::new(
        r#"(?i)["'](?:file|src|url)["']\s*:\s*["'](https?://[^"']+\.(?:mp4|m3u8)[^"']*)["']"#,
    ) else {
        return Vec::new();
    };

    re.captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// True when `html[..pos]` ends with the blob marker, i.e. the match is
/// the inner part of a `blob:https://...` reference
fn preceded_by_blob_marker(html: &str, pos: usize) -> bool {
    let marker = BLOB_MARKER.as_bytes();
    let prefix = &html.as_bytes()[..pos];
    prefix.len() >= marker.len()
        && prefix[prefix.len() - marker.len()..].eq_ignore_ascii_case(marker)
}

fn is_absolute_http(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Decodes common HTML entities in URLs
fn decode_html_entities(url: &str) -> String {
    url.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}
