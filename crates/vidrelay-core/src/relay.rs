//! Download relay
//!
//! Re-fetches a remote media URL on behalf of a browser and hands the body
//! back as a byte stream, together with the headers needed to force a
//! download under the relay's own origin.

use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use url::Url;

use crate::client::MediaClient;
use crate::error::{Result, VidrelayError};
use crate::parser::attachment_disposition;
use crate::url::{filename_from_url, parse_http_url};

/// Content type used when the upstream does not send one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A validated relay request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRequest {
    /// Remote file to fetch
    pub target: Url,
    /// Explicit download name
    pub filename: Option<String>,
    /// Page to present as referer/origin upstream
    pub referer: Option<Url>,
}

impl RelayRequest {
    /// Validates raw query parameters
    ///
    /// Values are trimmed; blank optional values count as absent.
    ///
    /// # Errors
    /// `InvalidInput` when `url` is missing or either URL does not parse
    pub fn from_params(
        url: Option<&str>,
        filename: Option<&str>,
        referer: Option<&str>,
    ) -> Result<Self> {
        let url = non_blank(url).ok_or_else(|| VidrelayError::invalid_input("Missing ?url="))?;
        let target = parse_http_url(url, "Invalid URL")?;
        let referer = non_blank(referer)
            .map(|r| parse_http_url(r, "Invalid referer"))
            .transpose()?;

        Ok(Self {
            target,
            filename: non_blank(filename).map(str::to_string),
            referer,
        })
    }

    /// Download name: the override, or the target's last path segment
    pub fn resolved_filename(&self) -> String {
        self.filename
            .clone()
            .unwrap_or_else(|| filename_from_url(self.target.as_str()))
    }
}

/// An upstream response ready to be relayed
#[derive(Debug)]
pub struct RelayStream {
    pub filename: String,
    pub content_type: String,
    pub content_length: Option<u64>,
    response: reqwest::Response,
}

impl RelayStream {
    /// `Content-Disposition` value forcing a download
    pub fn content_disposition(&self) -> String {
        attachment_disposition(&self.filename)
    }

    /// Body as a stream of chunks, passed through as they arrive
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes>> + Send + 'static {
        self.response.bytes_stream().map_err(VidrelayError::Http)
    }

    /// Reads the whole body into memory
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.response.bytes().await?)
    }
}

/// Relays remote files
#[derive(Debug, Clone)]
pub struct MediaRelay {
    client: MediaClient,
}

impl MediaRelay {
    /// Create a new relay with a default client
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(MediaClient::new()?))
    }

    /// Create a relay around an existing client
    pub fn with_client(client: MediaClient) -> Self {
        Self { client }
    }

    /// Open the upstream file
    ///
    /// # Errors
    /// - `UpstreamFetchFailed` if the upstream answers with a non-success status
    /// - `Http` for network errors
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> vidrelay_core::Result<()> {
    /// use vidrelay_core::{MediaRelay, RelayRequest};
    /// let relay = MediaRelay::new()?;
    /// let request = RelayRequest::from_params(Some("https://cdn.example/v.mp4"), None, None)?;
    /// let stream = relay.open(&request).await?;
    /// println!("{} ({})", stream.filename, stream.content_type);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open(&self, request: &RelayRequest) -> Result<RelayStream> {
        let filename = request.resolved_filename();
        tracing::debug!(url = %request.target, filename = %filename, "opening relay");

        let response = self
            .client
            .fetch_media(&request.target, request.referer.as_ref())
            .await?;

        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        Ok(RelayStream {
            filename,
            content_type,
            content_length,
            response,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
