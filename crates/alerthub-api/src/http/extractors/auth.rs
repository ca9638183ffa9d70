//! Bearer token authentication extractor.
//!
//! Reads `Authorization: Bearer <token>` and resolves it to a user id through
//! the auth service. Handlers that take [`AuthUser`] are rejected with 401
//! before they run when the token is missing, malformed, tampered or expired.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use alerthub_types::user::UserId;

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user_id = state.auth_service.authenticate(token)?;
        Ok(AuthUser(user_id))
    }
}

/// Extract the token from the `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| {
            AppError::Unauthorized(
                "Missing access token. Provide it via 'Authorization: Bearer <token>'.".to_string(),
            )
        })?;

    let value = header.to_str().map_err(|_| {
        AppError::Unauthorized("Invalid Authorization header encoding".to_string())
    })?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Authorization header must be a Bearer token".to_string()))
}
