//! Media resolver
//!
//! Fetches a video page, picks the best direct media link on it and
//! builds the relay link a browser can download it through.

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, HeaderMap};
use url::Url;

use crate::client::MediaClient;
use crate::error::{Result, VidrelayError};
use crate::parser::{filename_from_disposition, parse_media};
use crate::types::{MediaMetadata, Resolution};
use crate::url::{RequestContext, build_relay_url, filename_from_url, is_known_host, parse_http_url};

/// Resolves page URLs to direct media URLs
///
/// Holds no per-request state; one instance can serve any number of
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct MediaResolver {
    client: MediaClient,
    enforce_host_allowlist: bool,
}

impl MediaResolver {
    /// Create a new resolver with a default client
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(MediaClient::new()?))
    }

    /// Create a resolver around an existing client
    pub fn with_client(client: MediaClient) -> Self {
        Self {
            client,
            enforce_host_allowlist: false,
        }
    }

    /// Reject pages whose host is not in [`crate::url::KNOWN_HOSTS`]
    ///
    /// Off by default; unknown hosts are only logged.
    pub fn enforce_host_allowlist(mut self, enforce: bool) -> Self {
        self.enforce_host_allowlist = enforce;
        self
    }

    /// Resolve a page URL
    ///
    /// # Arguments
    /// * `page_url` - Absolute URL of the page to scrape
    /// * `ctx` - Origin the relay link is rooted at
    ///
    /// # Errors
    /// - `InvalidInput` if the URL is missing, malformed or (with the
    ///   allow-list enforced) on an unknown host
    /// - `UpstreamFetchFailed` if the page answers with a non-success status
    /// - `NoMediaFound` if the page holds no usable media link
    /// - `Http` for network errors fetching the page
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> vidrelay_core::Result<()> {
    /// use vidrelay_core::{MediaResolver, RequestContext};
    /// let resolver = MediaResolver::new()?;
    /// let ctx = RequestContext::new("https", "relay.example");
    /// let resolution = resolver.resolve("https://videy.co/v?id=abc", &ctx).await?;
    /// println!("{} -> {}", resolution.raw_url, resolution.relay_url);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn resolve(&self, page_url: &str, ctx: &RequestContext) -> Result<Resolution> {
        let trimmed = page_url.trim();
        if trimmed.is_empty() {
            return Err(VidrelayError::invalid_input("Missing ?url="));
        }

        let page = parse_http_url(trimmed, "Invalid URL")?;
        self.check_host(&page)?;

        tracing::debug!(page = %page, "fetching page");
        let html = self.client.fetch_page(&page).await?;

        let extraction = parse_media(&html)?;
        tracing::debug!(
            candidates = extraction.candidates.len(),
            selected = %extraction.selected,
            kind = extraction.kind.extension(),
            "media selected"
        );

        let metadata = self.probe_metadata(&extraction.selected, &page).await;
        let relay_url = build_relay_url(
            ctx,
            &extraction.selected,
            trimmed,
            metadata.filename.as_deref(),
        );

        Ok(Resolution {
            kind: extraction.kind,
            page_url: trimmed.to_string(),
            raw_url: extraction.selected,
            relay_url,
            filename: metadata.filename,
            size_bytes: metadata.size_bytes,
            found: extraction.found,
        })
    }

    /// Best-effort HEAD probe for filename and size
    ///
    /// Never fails: any network error or non-success status yields empty
    /// metadata.
    pub async fn probe_metadata(&self, media_url: &str, page: &Url) -> MediaMetadata {
        let response = match self.client.probe(media_url, Some(page)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = media_url, error = %e, "metadata probe failed");
                return MediaMetadata::default();
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                url = media_url,
                status = response.status().as_u16(),
                "metadata probe rejected"
            );
            return MediaMetadata::default();
        }

        metadata_from_headers(response.headers(), media_url)
    }

    fn check_host(&self, page: &Url) -> Result<()> {
        let host = page.host_str().unwrap_or_default();
        if is_known_host(host) {
            return Ok(());
        }

        if self.enforce_host_allowlist {
            return Err(VidrelayError::invalid_input("URL must be a videy link"));
        }
        tracing::debug!(host, "page host not in allow-list, continuing");
        Ok(())
    }
}

/// Reads filename and size out of probe response headers
///
/// Falls back to the media URL's last path segment for the filename.
pub fn metadata_from_headers(headers: &HeaderMap, media_url: &str) -> MediaMetadata {
    let size_bytes = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let filename = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(filename_from_disposition)
        .unwrap_or_else(|| filename_from_url(media_url));

    MediaMetadata {
        filename: Some(filename),
        size_bytes,
    }
}
