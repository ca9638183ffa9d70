//! Signup, login and current-user handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use alerthub_types::user::{
    LoginRequest, LoginResponse, SignupRequest, SignupResponse, UserProfile,
};

use crate::http::error::AppError;
use crate::http::extractors::ApiJson;
use crate::http::extractors::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/auth/signup - Register and receive an access token.
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let response = state.auth_service.signup(body).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(state.auth_service.login(body).await?))
}

/// GET /api/v1/auth/me - Profile of the token's owner.
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.auth_service.profile(&user_id).await?))
}
