use crate::error::ImageError;
use crate::service::UploadSource;
use axum::extract::{FromRequest, Multipart, Request};
use bytes::Bytes;
use tracing::debug;

const FIELD_IMAGE: &str = "image";
const FIELD_IMAGE_URL: &str = "imageUrl";
const FIELD_DESCRIPTION: &str = "description";
const FIELD_MANIFEST: &str = "jsonFile";

/// The multipart form shared by the upload, manifest and update routes.
///
/// Empty file parts and blank `imageUrl` values count as absent, matching what browsers send for
/// untouched inputs. Unknown fields are drained and ignored.
#[derive(Debug, Default)]
pub(crate) struct ImageForm {
    pub(crate) file: Option<UploadSource>,
    pub(crate) image_url: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) manifest: Option<Bytes>,
}

impl ImageForm {
    /// The single image source the form carries, if any. Both a file and a URL is an error.
    pub(crate) fn take_source(&mut self) -> Result<Option<UploadSource>, ImageError> {
        UploadSource::exclusive(self.file.take(), self.image_url.take())
    }
}

impl<S> FromRequest<S> for ImageForm
where
    S: Send + Sync,
{
    type Rejection = ImageError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await?;
        let mut form = ImageForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                FIELD_IMAGE => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;
                    if bytes.is_empty() {
                        continue;
                    }
                    if form.file.is_some() {
                        return Err(ImageError::InvalidInput(
                            "Only one image file may be uploaded".to_string(),
                        ));
                    }
                    debug!(filename = %filename, len = bytes.len(), "image part received");
                    form.file = Some(UploadSource::File {
                        bytes,
                        filename,
                        content_type,
                    });
                }
                FIELD_IMAGE_URL => form.image_url = Some(field.text().await?),
                FIELD_DESCRIPTION => form.description = Some(field.text().await?),
                FIELD_MANIFEST => {
                    let bytes = field.bytes().await?;
                    debug!(len = bytes.len(), "manifest part received");
                    form.manifest = Some(bytes);
                }
                _ => {
                    debug!(field = %name, "ignoring unknown multipart field");
                    field.bytes().await?;
                }
            }
        }

        Ok(form)
    }
}
