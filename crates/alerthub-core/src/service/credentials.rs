//! Credential traits: password hashing and access-token signing.
//!
//! Defined in alerthub-core so the auth service can hash passwords and sign
//! tokens without coupling to a specific algorithm. The argon2 and
//! HMAC-SHA256 adapters live in alerthub-infra.

use alerthub_types::error::AuthError;
use alerthub_types::user::TokenClaims;

/// Abstraction over one-way password hashing.
///
/// Implementations are CPU-bound; the auth service calls them on the
/// blocking thread pool.
pub trait PasswordHasher: Send + Sync + 'static {
    /// Produce a self-describing hash string (algorithm, parameters, salt).
    fn hash_password(&self, password: &str) -> Result<String, AuthError>;

    /// Check a password against a hash produced by `hash_password`.
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Abstraction over access-token signing.
///
/// `verify` checks integrity only; expiry is enforced by the auth service.
pub trait TokenSigner: Send + Sync {
    fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError>;

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}
