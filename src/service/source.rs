use bytes::Bytes;

use crate::error::ImageError;

/// Where the bytes of a new image come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    /// Bytes sent by the client.
    File {
        bytes: Bytes,
        filename: String,
        content_type: Option<String>,
    },
    /// A remote resource to download.
    RemoteUrl(String),
}

impl UploadSource {
    /// Picks the single source out of the optional file and URL a request carried.
    ///
    /// `Ok(None)` means neither was supplied; supplying both is rejected.
    pub fn exclusive(
        file: Option<UploadSource>,
        url: Option<String>,
    ) -> Result<Option<UploadSource>, ImageError> {
        let url = url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        match (file, url) {
            (Some(_), Some(_)) => Err(ImageError::InvalidInput(
                "Provide either an image file or an image URL, not both".to_string(),
            )),
            (Some(file), None) => Ok(Some(file)),
            (None, Some(url)) => Ok(Some(UploadSource::RemoteUrl(url))),
            (None, None) => Ok(None),
        }
    }
}
