//! Content-Disposition handling
//!
//! Reading filenames out of upstream `Content-Disposition` headers and
//! writing a safe `attachment` header for relayed downloads.

use regex::Regex;

/// Extracts the filename from a `Content-Disposition` header value
///
/// The RFC 5987 extended form (`filename*=UTF-8''...`) is preferred over
/// the plain `filename="..."` parameter. Percent-encoding is decoded; a
/// value that fails to decode is returned as-is.
///
/// # Example
/// ```
/// use vidrelay_core::parser::filename_from_disposition;
/// let name = filename_from_disposition("attachment; filename*=UTF-8''my%20clip.mp4");
/// assert_eq!(name.as_deref(), Some("my clip.mp4"));
/// ```
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let raw = extended_filename(header).or_else(|| plain_filename(header))?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match urlencoding::decode(raw) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(_) => Some(raw.to_string()),
    }
}

/// Builds an `attachment` disposition for a download name
///
/// The quoted `filename` parameter only ever carries printable ASCII;
/// quotes, backslashes, control and non-ASCII characters become `_`. When
/// that changed anything, the original name is added as an RFC 5987
/// `filename*` parameter.
///
/// # Example
/// ```
/// use vidrelay_core::parser::attachment_disposition;
/// assert_eq!(attachment_disposition("clip.mp4"), "attachment; filename=\"clip.mp4\"");
/// ```
pub fn attachment_disposition(filename: &str) -> String {
    let sanitized = sanitize_filename(filename);
    if sanitized == filename {
        format!("attachment; filename=\"{}\"", sanitized)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            sanitized,
            urlencoding::encode(filename)
        )
    }
}

/// Replaces characters that cannot appear inside a quoted header parameter
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect()
}

fn extended_filename(header: &str) -> Option<String> {
    let re = Regex::new(r"(?i)filename\*\s*=\s*UTF-8''([^;]+)").ok()?;
    re.captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn plain_filename(header: &str) -> Option<String> {
    let re = Regex::new(r#"(?i)filename\s*=\s*(?:"([^"]*)"|([^";]+))"#).ok()?;
    let caps = re.captures(header)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}
