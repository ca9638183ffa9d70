//! Application error type mapping domain errors to HTTP status codes.
//!
//! Error bodies are `{"error": message, "code": MACHINE_CODE}`. Storage and
//! other internal failures are logged and answered with a generic message.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use alerthub_types::error::{AuthError, HeatmapError, ReportError, SearchError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Auth(AuthError),
    Report(ReportError),
    Heatmap(HeatmapError),
    Search(SearchError),
    /// Missing or unusable credentials.
    Unauthorized(String),
    /// Malformed input caught before reaching a service.
    Validation(String),
    NotFound(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        AppError::Report(e)
    }
}

impl From<HeatmapError> for AppError {
    fn from(e: HeatmapError) -> Self {
        AppError::Heatmap(e)
    }
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        AppError::Search(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

const VALIDATION: &str = "VALIDATION_ERROR";
const UNAUTHORIZED: &str = "UNAUTHORIZED";
const INTERNAL: &str = "INTERNAL_ERROR";

impl AppError {
    /// Status, machine code and client-facing message.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Auth(e) => match e {
                AuthError::MissingFields(_)
                | AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_) => (StatusCode::BAD_REQUEST, VALIDATION, e.to_string()),
                AuthError::EmailTaken => (StatusCode::CONFLICT, "EMAIL_TAKEN", e.to_string()),
                AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::TokenExpired => {
                    (StatusCode::UNAUTHORIZED, UNAUTHORIZED, e.to_string())
                }
                AuthError::UserNotFound => (StatusCode::NOT_FOUND, "USER_NOT_FOUND", e.to_string()),
                AuthError::Hashing(_) | AuthError::StorageError(_) => internal(),
            },
            AppError::Report(e) => match e {
                ReportError::NotFound => {
                    (StatusCode::NOT_FOUND, "REPORT_NOT_FOUND", e.to_string())
                }
                ReportError::StorageError(_) => internal(),
                _ => (StatusCode::BAD_REQUEST, VALIDATION, e.to_string()),
            },
            AppError::Heatmap(e) => match e {
                HeatmapError::InvalidFilter(_) => {
                    (StatusCode::BAD_REQUEST, VALIDATION, e.to_string())
                }
                HeatmapError::StorageError(_) => internal(),
            },
            AppError::Search(e) => match e {
                SearchError::NotConfigured => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SEARCH_NOT_CONFIGURED",
                    e.to_string(),
                ),
                SearchError::InvalidRequest(_) => {
                    (StatusCode::BAD_REQUEST, VALIDATION, e.to_string())
                }
                SearchError::Upstream(_) | SearchError::Malformed(_) => {
                    (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", e.to_string())
                }
            },
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, UNAUTHORIZED, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, VALIDATION, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        INTERNAL,
        "Internal server error".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(error = ?self, %status, "request failed");
        } else {
            tracing::debug!(%code, %message, "request rejected");
        }

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}
