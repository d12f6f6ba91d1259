//! URL helper functions
//!
//! Input validation for page/target URLs, filename derivation and
//! construction of relay links.

use url::Url;

use crate::error::{Result, VidrelayError};

/// Path the relay endpoint is served under
pub const RELAY_PATH: &str = "/api/relay";

/// Filename used when a URL has no usable path segment
pub const DEFAULT_FILENAME: &str = "video";

/// Hosts the resolver is primarily built for
pub const KNOWN_HOSTS: &[&str] = &["videy.co", "www.videy.co", "co.videy.app", "videy.app"];

/// Scheme and host the relay link is rooted at
///
/// Built from the inbound request's `X-Forwarded-Proto` and `Host`
/// headers, or from a configured public base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub scheme: String,
    pub host: String,
}

impl RequestContext {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    /// Derives the context from raw header values
    ///
    /// The forwarded protocol may be a comma separated list (one entry per
    /// proxy hop); the first entry wins. Defaults to `https`. A missing host
    /// falls back to `localhost`.
    ///
    /// # Example
    /// ```
    /// use vidrelay_core::url::RequestContext;
    /// let ctx = RequestContext::from_headers(Some("http, https"), Some("relay.example"));
    /// assert_eq!(ctx.base(), "http://relay.example");
    /// ```
    pub fn from_headers(forwarded_proto: Option<&str>, host: Option<&str>) -> Self {
        let scheme = forwarded_proto
            .and_then(|p| p.split(',').next())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or("https")
            .to_ascii_lowercase();
        let host = host
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or("localhost");
        Self::new(scheme, host)
    }

    /// Parses a public base URL such as `https://dl.example.com`
    pub fn from_base_url(base: &str) -> Result<Self> {
        let parsed = Url::parse(base)
            .map_err(|e| VidrelayError::Internal(format!("invalid public base URL: {}", e)))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| VidrelayError::Internal("public base URL has no host".to_string()))?;
        let host = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Ok(Self::new(parsed.scheme(), host))
    }

    /// `scheme://host` without trailing slash
    pub fn base(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

/// Parses an absolute http(s) URL supplied by a caller
///
/// # Errors
/// `InvalidInput` with `message` when the value does not parse or uses a
/// scheme other than http/https
pub fn parse_http_url(raw: &str, message: &str) -> Result<Url> {
    let parsed = Url::parse(raw.trim()).map_err(|_| VidrelayError::invalid_input(message))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(VidrelayError::invalid_input(message)),
    }
}

/// Returns the origin (`scheme://host[:port]`) of a URL
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Checks a host against [`KNOWN_HOSTS`], subdomains included
pub fn is_known_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    KNOWN_HOSTS.iter().any(|known| {
        host == *known
            || host
                .strip_suffix(known)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Derives a download filename from a URL
///
/// Takes the last non-empty path segment with any query string removed.
/// Falls back to [`DEFAULT_FILENAME`] when the path has no segments.
///
/// # Example
/// ```
/// use vidrelay_core::url::filename_from_url;
/// assert_eq!(filename_from_url("https://cdn.example/videos/clip123.mp4?sig=abc"), "clip123.mp4");
/// assert_eq!(filename_from_url("https://cdn.example/"), "video");
/// ```
pub fn filename_from_url(url: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => {
            // Not absolute; treat the string itself as a path
            let without_fragment = url.split('#').next().unwrap_or(url);
            without_fragment
                .split('?')
                .next()
                .unwrap_or(without_fragment)
                .to_string()
        }
    };

    path.split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(|segment| segment.split('?').next().unwrap_or(segment))
        .filter(|segment| !segment.is_empty())
        .unwrap_or(DEFAULT_FILENAME)
        .to_string()
}

/// Builds the relay link handed back to the client
///
/// # Arguments
/// * `ctx` - Origin the relay is reachable under
/// * `raw_url` - Selected media URL
/// * `page_url` - Page the media was found on, sent as referer
/// * `filename` - Download name, when known
///
/// # Example
/// ```
/// use vidrelay_core::url::{build_relay_url, RequestContext};
/// let ctx = RequestContext::new("https", "relay.example");
/// let link = build_relay_url(&ctx, "https://cdn.example/v.mp4", "https://videy.co/v", None);
/// assert_eq!(
///     link,
///     "https://relay.example/api/relay?url=https%3A%2F%2Fcdn.example%2Fv.mp4&referer=https%3A%2F%2Fvidey.co%2Fv"
/// );
/// ```
pub fn build_relay_url(
    ctx: &RequestContext,
    raw_url: &str,
    page_url: &str,
    filename: Option<&str>,
) -> String {
    let mut link = format!(
        "{}{}?url={}&referer={}",
        ctx.base(),
        RELAY_PATH,
        urlencoding::encode(raw_url),
        urlencoding::encode(page_url)
    );
    if let Some(name) = filename {
        link.push_str("&filename=");
        link.push_str(&urlencoding::encode(name));
    }
    link
}
