//! Database module: the image metadata table.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `store.rs`: parameterized queries over a connection pool

pub mod models;
pub mod schema;
pub mod store;

pub use models::DbImage;
pub use schema::SQLITE_INIT;
pub use store::MetadataStore;
