//! Validation of URLs submitted for shortening.
//!
//! The submitted string is stored exactly as given (after trimming surrounding
//! whitespace), so repeated registrations of the same string deduplicate while
//! the redirect target stays byte-for-byte what the owner entered.

use url::Url;

/// Longest URL accepted for registration.
pub const MAX_URL_LENGTH: usize = 8192;

/// Reasons a submitted URL is rejected.
#[derive(Debug, thiserror::Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,

    #[error("URL exceeds {MAX_URL_LENGTH} characters")]
    TooLong,

    #[error("URL contains control characters")]
    ControlCharacters,
}

/// Checks that `input` is an absolute HTTP(S) URL with a host.
///
/// Rejects potentially dangerous schemes like `javascript:`, `data:` or `file:`.
///
/// # Errors
///
/// Returns [`UrlValidationError::InvalidFormat`] for malformed or relative URLs,
/// [`UrlValidationError::UnsupportedProtocol`] for non-HTTP(S) schemes,
/// [`UrlValidationError::MissingHost`] when no host is present and
/// [`UrlValidationError::ControlCharacters`] for embedded tabs or line breaks,
/// which the parser would skip but a `Location` header cannot carry.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(validate_url(" https://example.com/x ").unwrap(), "https://example.com/x");
/// assert!(validate_url("example.com").is_err());
/// ```
pub fn validate_url(input: &str) -> Result<String, UrlValidationError> {
    let trimmed = input.trim();

    if trimmed.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    if trimmed.chars().any(char::is_control) {
        return Err(UrlValidationError::ControlCharacters);
    }

    let url = Url::parse(trimmed).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
