//! Shared domain types for AlertHub.
//!
//! This crate contains the core domain types used across the AlertHub service:
//! users, reports, GeoJSON, heatmap aggregates, community feed items, and their
//! associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod error;
pub mod feed;
pub mod geo;
pub mod heatmap;
pub mod report;
pub mod user;
