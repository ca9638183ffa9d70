//! Business logic and repository trait definitions for AlertHub.
//!
//! This crate defines the "ports" (repository and search-provider traits) that
//! the infrastructure layer implements. It depends only on `alerthub-types` --
//! never on `alerthub-infra` or any database/HTTP crate.

pub mod feed;
pub mod geo;
pub mod repository;
pub mod service;
