//! URL validation and normalization.
//!
//! Long URLs are normalized before hashing or storage so that equivalent
//! spellings of the same destination dedupe to a single link (and a single
//! short code, since the code is derived from the normalized form).

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// Normalizes a URL to a canonical form.
///
/// Rules: http/https only, hostname lowercased, default ports (80/443)
/// stripped, fragment removed, path and query preserved as given.
///
/// Rejects dangerous schemes (`javascript:`, `data:`, `file:`, ...) and
/// anything `Url::parse` cannot handle, including the empty string.
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let mut url =
        Url::parse(input).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    if let Some(host) = url.host_str() {
        let host_lowercase = host.to_ascii_lowercase();
        url.set_host(Some(&host_lowercase)).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to set normalized host".to_string())
        })?;
    }

    url.set_fragment(None);

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_simple_https() {
        assert_eq!(
            normalize_url("https://example.com").unwrap(),
            "https://example.com/"
        );
    }

    #[test]
    fn test_normalize_uppercase_host() {
        assert_eq!(
            normalize_url("https://EXAMPLE.COM/Path").unwrap(),
            "https://example.com/Path"
        );
    }

    #[test]
    fn test_normalize_remove_default_ports() {
        assert_eq!(
            normalize_url("http://example.com:80/x").unwrap(),
            "http://example.com/x"
        );
        assert_eq!(
            normalize_url("https://example.com:443/x").unwrap(),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_normalize_keep_custom_port() {
        assert_eq!(
            normalize_url("http://example.com:8080/x").unwrap(),
            "http://example.com:8080/x"
        );
    }

    #[test]
    fn test_normalize_remove_fragment() {
        assert_eq!(
            normalize_url("https://example.com/page?key=value#section").unwrap(),
            "https://example.com/page?key=value"
        );
    }

    #[test]
    fn test_normalize_preserve_query_params() {
        assert_eq!(
            normalize_url("https://example.com/search?q=rust&lang=en").unwrap(),
            "https://example.com/search?q=rust&lang=en"
        );
    }

    #[test]
    fn test_empty_string_is_invalid() {
        assert!(matches!(
            normalize_url("").unwrap_err(),
            UrlNormalizationError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_missing_scheme_is_invalid() {
        assert!(matches!(
            normalize_url("example.com").unwrap_err(),
            UrlNormalizationError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_dangerous_schemes_rejected() {
        for input in [
            "javascript:alert('xss')",
            "data:text/plain,Hello",
            "file:///etc/passwd",
            "ftp://example.com/file.txt",
        ] {
            assert!(matches!(
                normalize_url(input).unwrap_err(),
                UrlNormalizationError::UnsupportedProtocol
            ));
        }
    }
}
