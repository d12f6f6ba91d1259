//! HTTP client for talking to video hosts and their CDNs
//!
//! Wraps a single `reqwest::Client` and applies the browser-like identity
//! headers every outbound request needs. There are no retries: a failed
//! fetch is terminal for the request that issued it.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, ORIGIN, REFERER};
use url::Url;

use crate::error::{Result, VidrelayError};
use crate::url::origin_of;

/// Browser identity sent with every outbound request
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Accept header for page fetches
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Connect timeout in seconds (default: 10)
    pub connect_timeout_secs: u64,
    /// Overall request timeout in seconds, including the body (default: none)
    ///
    /// Left unset by default so long relays are not cut off.
    pub timeout_secs: Option<u64>,
    /// User-Agent header (default: [`USER_AGENT`])
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            timeout_secs: None,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// HTTP client wrapper shared by the resolver and the relay
#[derive(Debug, Clone)]
pub struct MediaClient {
    client: reqwest::Client,
}

impl MediaClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent);

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder.build().map_err(VidrelayError::Http)?;
        Ok(Self { client })
    }

    /// Fetch a page as text
    ///
    /// # Errors
    /// - `UpstreamFetchFailed` - the page answered with a non-success status
    /// - `Http` - network errors
    pub async fn fetch_page(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .header(ACCEPT, HTML_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "page fetch failed");
            return Err(VidrelayError::UpstreamFetchFailed(status.as_u16()));
        }

        Ok(response.text().await?)
    }

    /// Issue a HEAD request, optionally spoofing referer and origin
    ///
    /// Status handling is left to the caller.
    pub async fn probe(&self, url: &str, referer: Option<&Url>) -> Result<reqwest::Response> {
        let response = self
            .client
            .head(url)
            .headers(spoofed_headers(referer))
            .send()
            .await?;
        Ok(response)
    }

    /// Start a GET for a media file, optionally spoofing referer and origin
    ///
    /// The body is not read; the caller decides whether to stream it.
    ///
    /// # Errors
    /// - `UpstreamFetchFailed` - non-success status
    /// - `Http` - network errors
    pub async fn fetch_media(&self, url: &Url, referer: Option<&Url>) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url.as_str())
            .headers(spoofed_headers(referer))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "media fetch failed");
            return Err(VidrelayError::UpstreamFetchFailed(status.as_u16()));
        }

        Ok(response)
    }
}

/// `Referer` and `Origin` headers pointing at the given page
fn spoofed_headers(referer: Option<&Url>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let Some(referer) = referer else {
        return headers;
    };

    if let Ok(value) = HeaderValue::from_str(referer.as_str()) {
        headers.insert(REFERER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&origin_of(referer)) {
        headers.insert(ORIGIN, value);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.timeout_secs, None);
        assert_eq!(config.user_agent, USER_AGENT);
    }

    #[test]
    fn test_client_creation() {
        assert!(MediaClient::new().is_ok());
    }

    #[test]
    fn test_client_with_custom_config() {
        let config = ClientConfig {
            connect_timeout_secs: 2,
            timeout_secs: Some(60),
            user_agent: "test-agent".to_string(),
        };
        assert!(MediaClient::with_config(config).is_ok());
    }

    #[test]
    fn test_spoofed_headers() {
        let referer = Url::parse("https://videy.co/v?id=abc").unwrap();
        let headers = spoofed_headers(Some(&referer));
        assert_eq!(headers.get(REFERER).unwrap(), "https://videy.co/v?id=abc");
        assert_eq!(headers.get(ORIGIN).unwrap(), "https://videy.co");

        assert!(spoofed_headers(None).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_page_sends_browser_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", "vidrelay-test"))
            .and(header_exists("accept"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let client = MediaClient::with_config(ClientConfig {
            user_agent: "vidrelay-test".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        let body = client.fetch_page(&url).await.unwrap();
        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn test_fetch_page_non_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = MediaClient::new().unwrap();
        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        match client.fetch_page(&url).await {
            Err(VidrelayError::UpstreamFetchFailed(403)) => {}
            other => panic!("Expected UpstreamFetchFailed(403), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_media_spoofs_referer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v.mp4"))
            .and(header("referer", "https://videy.co/v?id=1"))
            .and(header("origin", "https://videy.co"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .expect(1)
            .mount(&server)
            .await;

        let client = MediaClient::new().unwrap();
        let url = Url::parse(&format!("{}/v.mp4", server.uri())).unwrap();
        let referer = Url::parse("https://videy.co/v?id=1").unwrap();
        let response = client.fetch_media(&url, Some(&referer)).await.unwrap();
        assert_eq!(response.bytes().await.unwrap().as_ref(), &[1u8, 2, 3]);
    }
}
