use crate::server::router::ImgShelfState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub mod extract;
pub mod handlers;

pub fn router() -> Router<ImgShelfState> {
    Router::new()
        .route("/api/images", get(handlers::list_handler))
        .route("/api/images/", get(handlers::list_handler))
        .route("/api/images/upload", post(handlers::upload_handler))
        .route("/api/images/json-upload", post(handlers::json_upload_handler))
        .route("/api/images/update/{id}", put(handlers::update_handler))
        .route("/api/images/delete/{id}", delete(handlers::delete_handler))
}
