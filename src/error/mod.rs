mod config;
mod fetch;
mod image;
mod store;

pub use config::ConfigError;
pub use fetch::FetchError;
pub use image::ImageError;
pub use store::StoreError;
