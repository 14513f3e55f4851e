//! Folder, delete and retrieval endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::objects::{create_folder, fetch_object, Deleter, FolderError, ObjectResponse};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FolderRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub keys: Option<String>,
}

/// POST /rest/folder
///
/// A rejected name is a validation error; a store failure is reported as a
/// soft failure in the envelope.
pub async fn create_folder_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<FolderRequest>, JsonRejection>,
) -> Result<ApiResponse<&'static str>> {
    let Json(request) = payload?;

    match create_folder(state.store(), &request.name).await {
        Ok(_) => Ok(ApiResponse::ok("Success")),
        Err(e @ FolderError::InvalidName(_)) => Err(AppError::Validation(e.to_string())),
        Err(e @ FolderError::Storage(_)) => {
            tracing::warn!(name = %request.name, error = ?e, "Folder creation failed");
            Ok(ApiResponse::fail(e.to_string()))
        }
    }
}

/// GET /rest/del/*key
pub async fn delete_one(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiResponse<String>> {
    Deleter::new(state.store(), state.delete_policy())
        .delete_one(&key)
        .await?;

    Ok(ApiResponse::ok(key))
}

/// DELETE /rest
pub async fn delete_many(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<ApiResponse<String>> {
    let Json(request) = payload?;

    let keys = request
        .keys
        .filter(|keys| !keys.is_empty())
        .ok_or_else(|| AppError::Validation("not delete keys".to_string()))?;

    let attempted = Deleter::new(state.store(), state.delete_policy())
        .delete_many(&keys)
        .await?;
    tracing::info!(count = attempted, "Bulk delete finished");

    Ok(ApiResponse::ok(keys))
}

/// GET /rest/*key
pub async fn get_object(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Result<ObjectResponse> {
    fetch_object(state.store(), &key, &headers).await
}
