//! Remote image download.

mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::FetchError;

/// Body and declared type of a downloaded resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedObject {
    pub bytes: Bytes,
    pub content_type: String,
}

#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedObject, FetchError>;
}

/// Parses a user supplied URL, accepting only http(s).
pub fn parse_remote_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|source| FetchError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https_only() {
        assert!(parse_remote_url("https://example.com/a.png").is_ok());
        assert!(parse_remote_url("  http://example.com/a.png ").is_ok());
        assert!(matches!(
            parse_remote_url("file:///etc/passwd"),
            Err(FetchError::UnsupportedScheme(s)) if s == "file"
        ));
        assert!(matches!(
            parse_remote_url("bad-url"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }
}
