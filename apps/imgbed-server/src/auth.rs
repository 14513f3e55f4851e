//! Authorization gate
//!
//! Mutating requests must carry an `Authorization` header equal to the
//! configured `AUTH_TOKEN`. Reads (`GET`, and `OPTIONS` preflights) pass
//! through untouched.

use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Check a presented token against the configured secret.
///
/// A missing or empty token is reported before a missing secret.
pub fn authorize(secret: Option<&str>, token: Option<&str>) -> Result<()> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or(AppError::AuthMissing)?;
    let secret = secret.ok_or(AppError::AuthMisconfigured)?;

    if token != secret {
        return Err(AppError::AuthMismatch);
    }
    Ok(())
}

/// Whether `token` is accepted, without distinguishing why not
pub fn token_is_valid(secret: Option<&str>, token: &str) -> bool {
    authorize(secret, Some(token)).is_ok()
}

fn bypasses_gate(method: &Method) -> bool {
    *method == Method::GET || *method == Method::OPTIONS
}

/// Middleware guarding the mutating routes
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if !bypasses_gate(request.method()) {
        let token = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if let Err(e) = authorize(state.config().auth.token.as_deref(), token) {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                error = %e,
                "Rejected unauthorized request"
            );
            return Err(e);
        }
    }

    Ok(next.run(request).await)
}
