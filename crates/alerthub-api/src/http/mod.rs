//! HTTP/REST API layer for AlertHub.
//!
//! Axum-based REST API at `/api/v1/` with bearer token authentication,
//! plain JSON bodies and CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
