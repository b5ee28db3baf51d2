//! Object keys and the public URL mapping.
//!
//! A key is written once under `uploads/` and its public URL is stored in the metadata row.
//! Updates and deletes recover the key from that URL, so [`PublicUrlBase::key_for`] must invert
//! [`PublicUrlBase::url_for`] exactly.

use chrono::Utc;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::fmt;
use url::Url;

use crate::error::StoreError;

/// Everything except RFC 3986 unreserved characters is escaped inside a segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const UPLOAD_PREFIX: &str = "uploads";
const FALLBACK_NAME: &str = "image";
const MAX_NAME_CHARS: usize = 128;

/// Path-like identifier of an object inside the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn new(key: impl Into<String>) -> Result<Self, StoreError> {
        let key = key.into();
        if key.is_empty() {
            return Err(StoreError::InvalidKey("empty key".to_string()));
        }
        if key
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(StoreError::InvalidKey(key));
        }
        Ok(Self(key))
    }

    /// Fresh collision-resistant key: `uploads/{unix millis}-{nonce}_{name}`.
    pub fn generate(name: &str) -> Self {
        let millis = Utc::now().timestamp_millis();
        let nonce: u32 = rand::random();
        Self(format!(
            "{UPLOAD_PREFIX}/{millis}-{nonce:08x}_{}",
            sanitize_name(name)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reduces an uploaded filename to a single safe key segment.
fn sanitize_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_NAME_CHARS)
        .collect();
    if cleaned.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}

/// Name a remote URL's object is stored under: its last non-empty path segment, decoded.
pub fn name_from_remote_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// Prefix shared by every public object URL of one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrlBase(Url);

impl PublicUrlBase {
    pub fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);
        Self(base)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn url_for(&self, key: &ObjectKey) -> Url {
        let encoded = key
            .as_str()
            .split('/')
            .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        let mut url = self.0.clone();
        url.set_path(&format!("{}{encoded}", self.0.path()));
        url
    }

    pub fn key_for(&self, url: &str) -> Result<ObjectKey, StoreError> {
        let parsed = Url::parse(url).map_err(|_| StoreError::ForeignUrl(url.to_string()))?;
        let same_origin = parsed.scheme() == self.0.scheme()
            && parsed.host_str() == self.0.host_str()
            && parsed.port_or_known_default() == self.0.port_or_known_default();
        let rest = parsed
            .path()
            .strip_prefix(self.0.path())
            .filter(|_| same_origin)
            .ok_or_else(|| StoreError::ForeignUrl(url.to_string()))?;

        let decoded = percent_decode_str(rest)
            .decode_utf8()
            .map_err(|_| StoreError::InvalidKey(rest.to_string()))?;
        ObjectKey::new(decoded.into_owned())
    }
}
