//! JSON response envelope
//!
//! Every JSON endpoint answers with the same shape:
//! `{"success": bool, "code": u16?, "msg": string?, "data": T?}`.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            code: None,
            msg: None,
            data: Some(data),
        }
    }

    /// Soft failure without a specific code
    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            code: None,
            msg: Some(msg.into()),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    /// Failure carrying a numeric code
    pub fn fail_code(msg: impl Into<String>, code: u16) -> Self {
        Self {
            success: false,
            code: Some(code),
            msg: Some(msg.into()),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_omits_empty_fields() {
        let json = serde_json::to_value(ApiResponse::ok(true)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": true}));
    }

    #[test]
    fn test_fail_code() {
        let json = serde_json::to_value(ApiResponse::fail_code("auth fail", 403)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "code": 403, "msg": "auth fail"})
        );
    }
}
