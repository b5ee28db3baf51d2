pub mod images;

pub use images::{
    ApiErrorBody, BatchUploadResponse, BatchUploadedItem, ImageListResponse, ImageRecord,
    MessageResponse, UpdateResponse, UploadResponse,
};
