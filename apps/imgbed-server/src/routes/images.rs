//! Listing and upload endpoints

use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection, Multipart, State},
    Json,
};

use crate::error::Result;
use crate::listing::{ListPage, ListRequest, ListingService};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::upload::{UploadFile, UploadResult, UploadService, FILES_FIELD};

/// POST /rest/list
pub async fn list_images(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ListRequest>, JsonRejection>,
) -> Result<ApiResponse<ListPage>> {
    let Json(request) = payload?;

    let page = ListingService::new(state.store(), &state.config().site)
        .list(request)
        .await?;

    Ok(ApiResponse::ok(page))
}

/// POST /rest/upload
///
/// Every `files` part is buffered; other parts are ignored.
pub async fn upload_images(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<UploadResult>> {
    let mut multipart = multipart?;
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await?;

        files.push(UploadFile {
            filename,
            content_type,
            data,
        });
    }

    tracing::debug!(count = files.len(), "Received upload batch");

    let result = UploadService::new(state.store(), &state.config().site)
        .upload_batch(files)
        .await?;

    Ok(ApiResponse::ok(result))
}
