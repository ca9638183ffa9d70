//! Infrastructure layer for AlertHub.
//!
//! Implements the ports defined in `alerthub-core`: SQLite repositories,
//! argon2 password hashing, HMAC token signing and the SerpApi search
//! client. Also loads configuration and resolves the data directory.

pub mod config;
pub mod crypto;
pub mod filesystem;
pub mod search;
pub mod sqlite;
