//! Account and access-token service.
//!
//! Signup hashes the password and issues a token immediately; login verifies
//! the password and issues a fresh token. Unknown emails and wrong passwords
//! produce the same error.

use alerthub_types::error::{AuthError, RepositoryError};
use alerthub_types::user::{
    LoginRequest, LoginResponse, SignupRequest, SignupResponse, TokenClaims, User, UserId,
    UserProfile, normalize_email,
};
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::repository::user::UserRepository;
use crate::service::credentials::{PasswordHasher, TokenSigner};

/// Shortest password accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Service handling signup, login and token verification.
pub struct AuthService<U: UserRepository, H: PasswordHasher, T: TokenSigner> {
    users: U,
    hasher: Arc<H>,
    signer: T,
    token_ttl: Duration,
}

impl<U: UserRepository, H: PasswordHasher, T: TokenSigner> AuthService<U, H, T> {
    pub fn new(users: U, hasher: H, signer: T, token_ttl: Duration) -> Self {
        Self {
            users,
            hasher: Arc::new(hasher),
            signer,
            token_ttl,
        }
    }

    /// Register a new account and issue an access token for it.
    pub async fn signup(&self, request: SignupRequest) -> Result<SignupResponse, AuthError> {
        let (email, password) = required_credentials(request.email, request.password)?;

        let email = normalize_email(&email);
        if !is_plausible_email(&email) {
            return Err(AuthError::InvalidEmail(email));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
        }

        let user = User {
            id: UserId::new(),
            email,
            password_hash: self.hash_password(password).await?,
            first_name: non_blank(request.first_name),
            last_name: non_blank(request.last_name),
            phone_number: non_blank(request.phone_number),
            created_at: Utc::now(),
            last_login: None,
        };

        let user = self.users.create(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::EmailTaken,
            other => AuthError::StorageError(other.to_string()),
        })?;

        tracing::info!(user_id = %user.id, "user signed up");

        let access_token = self.issue_token(&user.id)?;
        Ok(SignupResponse {
            user: user.profile(),
            access_token,
        })
    }

    /// Verify credentials and issue an access token.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let (email, password) = required_credentials(request.email, request.password)?;

        let user = self
            .users
            .get_by_email(&normalize_email(&email))
            .await
            .map_err(|e| AuthError::StorageError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self
            .verify_password(password, user.password_hash.clone())
            .await?
        {
            tracing::debug!(user_id = %user.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        // Login succeeds even if the bookkeeping write fails.
        if let Err(e) = self.users.record_login(&user.id, Utc::now()).await {
            tracing::warn!(user_id = %user.id, error = %e, "failed to record last login");
        }

        Ok(LoginResponse {
            access_token: self.issue_token(&user.id)?,
            user_id: user.id,
        })
    }

    /// Resolve a bearer token to the user it was issued for.
    pub fn authenticate(&self, token: &str) -> Result<UserId, AuthError> {
        let claims = self.signer.verify(token)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims.sub)
    }

    pub async fn profile(&self, id: &UserId) -> Result<UserProfile, AuthError> {
        self.users
            .get_by_id(id)
            .await
            .map_err(|e| AuthError::StorageError(e.to_string()))?
            .map(|u| u.profile())
            .ok_or(AuthError::UserNotFound)
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    fn issue_token(&self, user_id: &UserId) -> Result<String, AuthError> {
        let now = Utc::now();
        self.signer.sign(&TokenClaims {
            sub: *user_id,
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        })
    }
}

fn required_credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<(String, String), AuthError> {
    match (email, password) {
        (Some(email), Some(password)) => Ok((email, password)),
        (email, password) => {
            let mut missing = Vec::new();
            if email.is_none() {
                missing.push("email".to_string());
            }
            if password.is_none() {
                missing.push("password".to_string());
            }
            Err(AuthError::MissingFields(missing))
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
