//! Request extractors: bearer authentication plus JSON/query wrappers whose
//! rejections render as [`AppError`](crate::http::error::AppError).

pub mod auth;
pub mod query;

use axum::extract::{FromRequest, FromRequestParts};

use crate::http::error::AppError;

/// `axum::Json` with rejections mapped to a 400 error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with rejections mapped to a 400 error body.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
