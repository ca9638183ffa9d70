//! HTTP request handlers for the REST API.

pub mod auth;
pub mod feed;
pub mod heatmap;
pub mod report;
