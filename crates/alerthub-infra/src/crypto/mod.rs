//! Cryptographic operations for AlertHub.
//!
//! - `password`: argon2id password hashing
//! - `token`: HMAC-SHA256 signed access tokens

pub mod password;
pub mod token;
