pub mod batch;
pub mod images;
pub mod page;
pub mod source;

pub use batch::{BatchFailed, BatchOutcome, BatchUploaded, parse_manifest};
pub use images::ImageService;
pub use page::{DEFAULT_LIMIT, DEFAULT_PAGE, ImagePage, PageRequest};
pub use source::UploadSource;
