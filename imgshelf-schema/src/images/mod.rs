mod api_error;
mod record;
mod responses;

pub use api_error::ApiErrorBody;
pub use record::ImageRecord;
pub use responses::{
    BatchUploadResponse, BatchUploadedItem, ImageListResponse, MessageResponse, UpdateResponse,
    UploadResponse,
};
