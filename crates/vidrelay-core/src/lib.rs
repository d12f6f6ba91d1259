//! vidrelay core library
//!
//! Finds direct media links on video-hosting pages and relays the files
//! back under forced-download headers.
//!
//! # Overview
//!
//! Two stateless components that only meet through a URL:
//! - [`MediaResolver`] fetches a page, runs the extraction rules in
//!   [`parser::EXTRACTION_RULES`], picks one media URL (mp4 before m3u8),
//!   probes it for filename/size and builds a relay link
//! - [`MediaRelay`] fetches any URL (optionally with a spoofed referer) and
//!   passes the body through as a stream
//!
//! # Example
//!
//! ```no_run
//! use vidrelay_core::{MediaRelay, MediaResolver, RelayRequest, RequestContext, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let resolver = MediaResolver::new()?;
//!     let ctx = RequestContext::new("http", "localhost:3000");
//!
//!     let resolution = resolver.resolve("https://videy.co/v?id=abc123", &ctx).await?;
//!     println!("{} ({:?})", resolution.raw_url, resolution.kind);
//!
//!     let relay = MediaRelay::new()?;
//!     let request = RelayRequest::from_params(
//!         Some(&resolution.raw_url),
//!         resolution.filename.as_deref(),
//!         Some(&resolution.page_url),
//!     )?;
//!     let stream = relay.open(&request).await?;
//!     println!("{}", stream.content_disposition());
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
pub mod parser;
mod relay;
mod resolver;
mod types;
pub mod url;

// Re-export client types
pub use client::{ClientConfig, MediaClient, USER_AGENT};

// Re-export error types
pub use error::{Result, VidrelayError};

// Re-export main API
pub use relay::{DEFAULT_CONTENT_TYPE, MediaRelay, RelayRequest, RelayStream};
pub use resolver::{MediaResolver, metadata_from_headers};

// Re-export data types
pub use types::{ExtractionResult, FoundMedia, MediaKind, MediaMetadata, Resolution};

// Re-export URL helpers for convenience
pub use crate::url::{RELAY_PATH, RequestContext, build_relay_url, filename_from_url};
