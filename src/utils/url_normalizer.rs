//! Target URL validation and normalization.
//!
//! Every URL accepted for shortening passes through here once, so equal
//! inputs land in the store as equal strings and lookups by target URL work.

use url::Url;

/// Errors that can occur while normalizing a target URL.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,
}

/// Normalizes a target URL to its canonical form.
///
/// Parsing already lowercases the scheme and host and drops default ports;
/// on top of that the fragment is removed, since `#section` never reaches
/// the server a visitor is redirected to.
///
/// Rejects non-HTTP(S) schemes so `javascript:`, `data:` and friends cannot
/// be smuggled in as redirect targets.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed or
/// scheme-less input.
/// Returns [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S)
/// schemes.
pub fn normalize_target_url(input: &str) -> Result<String, UrlNormalizationError> {
    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    url.set_fragment(None);

    Ok(url.to_string())
}
