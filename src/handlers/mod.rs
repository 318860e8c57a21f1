pub mod admin;
pub mod events;
pub mod tickets;

use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::auth::Identity;
use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "turnstile-api",
    };

    success(payload, "Health check successful").into_response()
}

/// Resolves the caller from the `Authorization: Bearer <token>` header.
pub(crate) async fn bearer_identity(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Identity, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::AuthError("missing bearer token".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::AuthError("malformed authorization header".to_string()))?;

    state
        .identity
        .resolve(token)
        .await
        .ok_or_else(|| AppError::AuthError("unknown or expired token".to_string()))
}

pub(crate) fn require_admin(identity: &Identity) -> Result<(), AppError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "administrator role required".to_string(),
        ))
    }
}
