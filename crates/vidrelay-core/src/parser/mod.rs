//! Page and header parsers
//!
//! Contains modules for discovering media links and handling
//! `Content-Disposition` values.

pub mod disposition;
pub mod media;

pub use disposition::{attachment_disposition, filename_from_disposition};
pub use media::{EXTRACTION_RULES, ExtractionRule, extract_candidates, parse_media};
