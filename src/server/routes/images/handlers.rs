use crate::error::ImageError;
use crate::server::router::ImgShelfState;
use crate::service::PageRequest;
use crate::utils::logging::with_pretty_json_debug;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use imgshelf_schema::{
    BatchUploadResponse, ImageListResponse, MessageResponse, UpdateResponse, UploadResponse,
};
use serde::Deserialize;
use std::{future::Future, time::Duration};
use tracing::{debug, warn};

use super::extract::ImageForm;

/// Runs a read-only `fut` under the request deadline; expiry drops it mid-flight.
async fn within<T, F>(deadline: Duration, fut: F) -> Result<T, ImageError>
where
    F: Future<Output = Result<T, ImageError>>,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| ImageError::Timeout)?
}

/// Runs a mutating `fut` on its own task and waits for it up to the request deadline.
///
/// Expiry answers the client with [`ImageError::Timeout`] but never cancels the task, so a
/// sequence that already wrote or deleted something still reaches its row update, rollback or
/// inconsistency log.
async fn detached<T, F>(op: &'static str, deadline: Duration, fut: F) -> Result<T, ImageError>
where
    F: Future<Output = Result<T, ImageError>> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::spawn(fut);
    match tokio::time::timeout(deadline, task).await {
        Ok(joined) => joined?,
        Err(_) => {
            warn!(
                op,
                deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                "request deadline exceeded; operation keeps running in the background"
            );
            Err(ImageError::Timeout)
        }
    }
}

fn parse_id(raw: &str) -> Result<i64, ImageError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ImageError::InvalidInput(format!("invalid image id: {raw:?}")))
}

/// Raw query values; anything unparseable falls back to the defaults.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    page: Option<String>,
    limit: Option<String>,
}

impl ListQuery {
    fn page_request(&self) -> PageRequest {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        PageRequest::new(parse(&self.page), parse(&self.limit))
    }
}

pub(crate) async fn upload_handler(
    State(state): State<ImgShelfState>,
    mut form: ImageForm,
) -> Result<Json<UploadResponse>, ImageError> {
    let source = form
        .take_source()?
        .ok_or_else(|| ImageError::InvalidInput("No image provided".to_string()))?;
    let description = form.description.unwrap_or_default();

    let images = state.images.clone();
    let record = detached("upload", state.request_timeout, async move {
        images.upload(source, &description).await
    })
    .await?;
    Ok(Json(UploadResponse::from_record(record)))
}

pub(crate) async fn json_upload_handler(
    State(state): State<ImgShelfState>,
    form: ImageForm,
) -> Result<Json<BatchUploadResponse>, ImageError> {
    let manifest = form
        .manifest
        .ok_or_else(|| ImageError::InvalidInput("No JSON file uploaded".to_string()))?;

    let images = state.images.clone();
    let outcome = detached("json-upload", state.batch_timeout, async move {
        images.batch_upload(&manifest).await
    })
    .await?;
    let body = outcome.into_response();

    with_pretty_json_debug(&body, |pretty| {
        debug!(body = %pretty, "manifest upload response");
    });
    Ok(Json(body))
}

pub(crate) async fn list_handler(
    State(state): State<ImgShelfState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ImageListResponse>, ImageError> {
    let page = within(
        state.request_timeout,
        state.images.list(query.page_request()),
    )
    .await?;

    Ok(Json(ImageListResponse {
        images: page.items,
        current_page: page.current_page,
        total_pages: page.total_pages,
    }))
}

pub(crate) async fn update_handler(
    State(state): State<ImgShelfState>,
    Path(id): Path<String>,
    mut form: ImageForm,
) -> Result<Json<UpdateResponse>, ImageError> {
    let id = parse_id(&id)?;
    let source = form.take_source()?;

    let images = state.images.clone();
    let description = form.description;
    let record = detached("update", state.request_timeout, async move {
        images.update(id, source, description).await
    })
    .await?;
    Ok(Json(UpdateResponse::from_record(record)))
}

pub(crate) async fn delete_handler(
    State(state): State<ImgShelfState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ImageError> {
    let id = parse_id(&id)?;
    let images = state.images.clone();
    detached("delete", state.request_timeout, async move {
        images.delete(id).await
    })
    .await?;
    Ok(Json(MessageResponse::new("Image deleted successfully")))
}
