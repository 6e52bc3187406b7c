//! Core layer: pure checks applied before and after a request.

use url::Url;

use crate::data::RawResponse;
use crate::error::{FetchError, Result};

/// Parse a source URL, accepting only `http` and `https`.
pub fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url:    url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url:    url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// Returns `true` for 2xx status codes.
///
/// ```
/// use portal_fetch::core::is_success;
///
/// assert!(is_success(200));
/// assert!(!is_success(302));
/// assert!(!is_success(404));
/// ```
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Returns `true` if a `Content-Type` value names an HTML document.
pub fn is_html(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    mime.eq_ignore_ascii_case("text/html") || mime.eq_ignore_ascii_case("application/xhtml+xml")
}

/// Gate between the network and the archive parser.
///
/// Rejects non-2xx responses and HTML error pages served with a success
/// status. A missing content type passes; vendors are inconsistent about it.
pub fn validate_response(response: &RawResponse) -> Result<()> {
    if !response.is_success() {
        return Err(FetchError::Status {
            url:    response.url.clone(),
            status: response.status,
        });
    }

    if let Some(content_type) = response.content_type().filter(|ct| is_html(ct)) {
        return Err(FetchError::UnexpectedContentType {
            url:          response.url.clone(),
            content_type: content_type.to_string(),
        });
    }

    Ok(())
}
