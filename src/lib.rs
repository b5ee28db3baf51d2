pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod server;
pub mod service;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use error::ImageError;
pub use service::ImageService;
