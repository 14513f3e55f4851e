//! Token check used by the UI login form

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::auth::token_is_valid;
use crate::error::Result;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckTokenRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// POST /rest/checkToken
pub async fn check_token(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CheckTokenRequest>, JsonRejection>,
) -> Result<ApiResponse<bool>> {
    let Json(request) = payload?;

    let valid = match request.token.as_deref() {
        Some(token) if !token.is_empty() => {
            token_is_valid(state.config().auth.token.as_deref(), token)
        }
        _ => false,
    };

    Ok(ApiResponse::ok(valid))
}
