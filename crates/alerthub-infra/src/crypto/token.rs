//! HMAC-SHA256 signed access tokens.
//!
//! Token format: `base64url(claims JSON) "." base64url(HMAC-SHA256(first part))`,
//! both parts unpadded. Verification is constant-time via `Mac::verify_slice`.
//!
//! SECURITY: errors never include key material.

use std::path::Path;

use anyhow::Context;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use alerthub_core::service::credentials::TokenSigner;
use alerthub_types::error::AuthError;
use alerthub_types::user::TokenClaims;

type HmacSha256 = Hmac<Sha256>;

/// Environment variable holding an explicit signing secret.
pub const TOKEN_SECRET_ENV: &str = "ALERTHUB_TOKEN_SECRET";

const KEY_FILE: &str = "token.key";
const KEY_LEN: usize = 32;

pub struct HmacTokenSigner {
    key: Vec<u8>,
}

impl HmacTokenSigner {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    /// Key from `ALERTHUB_TOKEN_SECRET`, else `{data_dir}/token.key`
    /// (generated on first use).
    pub fn from_env_or_data_dir(data_dir: &Path) -> anyhow::Result<Self> {
        if let Ok(secret) = std::env::var(TOKEN_SECRET_ENV) {
            if !secret.is_empty() {
                return Ok(Self::new(secret.into_bytes()));
            }
        }
        Ok(Self::new(load_or_create_key(data_dir)?))
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        // HMAC accepts keys of any length; this only fails on a broken build.
        HmacSha256::new_from_slice(&self.key).map_err(|_| AuthError::InvalidToken)
    }
}

impl TokenSigner for HmacTokenSigner {
    fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        let json = serde_json::to_vec(claims).map_err(|_| AuthError::InvalidToken)?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let (payload, signature) = token.split_once('.').ok_or(AuthError::InvalidToken)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::InvalidToken)?;
        serde_json::from_slice(&json).map_err(|_| AuthError::InvalidToken)
    }
}

/// Read the base64 key stored at `{data_dir}/token.key`, generating a random
/// one (mode 0600 on Unix) if the file does not exist.
pub fn load_or_create_key(data_dir: &Path) -> anyhow::Result<Vec<u8>> {
    let path = data_dir.join(KEY_FILE);

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let key = STANDARD
                .decode(content.trim())
                .with_context(|| format!("{} is not valid base64", path.display()))?;
            anyhow::ensure!(!key.is_empty(), "{} is empty", path.display());
            Ok(key)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let mut key = vec![0u8; KEY_LEN];
            OsRng.fill_bytes(&mut key);

            std::fs::create_dir_all(data_dir)
                .with_context(|| format!("failed to create {}", data_dir.display()))?;
            write_private(&path, STANDARD.encode(&key).as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;

            tracing::info!(path = %path.display(), "generated access token signing key");
            Ok(key)
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

/// Create `path` readable by the owner only. The mode is set at creation, so
/// the key is never visible under the default umask. Fails if the file exists.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
