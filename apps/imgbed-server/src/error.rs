//! Error types for the Imgbed server

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not authenticated")]
    AuthMissing,

    #[error("system not auth setting")]
    AuthMisconfigured,

    #[error("auth fail")]
    AuthMismatch,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Range not satisfiable for object: {0}")]
    InvalidRange(String),

    #[error("Invalid list cursor: {0}")]
    InvalidCursor(String),

    #[error("S3 SDK error: {0}")]
    SdkError(String),
}

impl AppError {
    /// HTTP status for this error; also used as the envelope's numeric code
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthMissing => StatusCode::UNAUTHORIZED,
            AppError::AuthMismatch => StatusCode::FORBIDDEN,
            AppError::AuthMisconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(StorageError::InvalidRange(_)) => StatusCode::RANGE_NOT_SATISFIABLE,
            AppError::Storage(StorageError::InvalidCursor(_)) => StatusCode::BAD_REQUEST,
            AppError::Storage(StorageError::SdkError(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::NotFound(_) => "object not found".to_string(),
            AppError::Storage(e @ StorageError::SdkError(_)) => {
                tracing::error!("Storage error: {}", e);
                "Storage error".to_string()
            }
            AppError::AuthMisconfigured => {
                tracing::error!("AUTH_TOKEN is not configured, rejecting guarded request");
                self.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ApiResponse::<()>::fail_code(message, status.as_u16()));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(error: MultipartError) -> Self {
        AppError::Validation(format!("Invalid multipart body: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_have_distinct_codes() {
        let codes = [
            AppError::AuthMissing.status_code(),
            AppError::AuthMismatch.status_code(),
            AppError::AuthMisconfigured.status_code(),
        ];
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
        assert_ne!(codes[0], codes[2]);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = AppError::NotFound("a.png".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::from(StorageError::InvalidRange("a.png".to_string())).status_code(),
            StatusCode::RANGE_NOT_SATISFIABLE
        );
    }
}
