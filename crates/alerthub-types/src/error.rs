use thiserror::Error;

/// Errors related to signup, login and access tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("invalid email address: '{0}'")]
    InvalidEmail(String),

    #[error("password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("invalid access token")]
    InvalidToken,

    #[error("access token expired")]
    TokenExpired,

    #[error("user not found")]
    UserNotFound,

    #[error("password hashing error: {0}")]
    Hashing(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to report submission and lifecycle.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report not found")]
    NotFound,

    #[error("Missing fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("unknown category: '{0}'")]
    UnknownCategory(String),

    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("invalid media: {0}")]
    InvalidMedia(String),

    #[error("description cannot be empty")]
    EmptyDescription,

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors related to heatmap queries.
#[derive(Debug, Error)]
pub enum HeatmapError {
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from the third-party search provider behind the community feed.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search provider not configured (set SERPAPI_API_KEY)")]
    NotConfigured,

    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    #[error("search provider request failed: {0}")]
    Upstream(String),

    #[error("search provider returned malformed data: {0}")]
    Malformed(String),
}

/// Errors from repository operations (used by trait definitions in alerthub-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}
