//! SerpApiClient -- concrete [`SearchProvider`] backed by the SerpApi HTTP API.
//!
//! Every call is a single `GET {base_url}?{params}&api_key=...`. The key is
//! wrapped in [`secrecy::SecretString`] and only exposed when building the
//! query string; it never appears in logs or `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use alerthub_core::feed::{SearchParams, SearchProvider};
use alerthub_types::config::SearchConfig;
use alerthub_types::error::SearchError;

/// Environment variable holding the SerpApi key.
pub const API_KEY_ENV: &str = "SERPAPI_API_KEY";

pub struct SerpApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl SerpApiClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<SecretString>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(format!("alerthub/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Build a client from config, reading the key from `SERPAPI_API_KEY`.
    ///
    /// A missing or empty key is not an error here: the client is still
    /// constructed and every search returns [`SearchError::NotConfigured`].
    pub fn from_config(config: &SearchConfig) -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::from);

        if api_key.is_none() {
            tracing::warn!("{API_KEY_ENV} not set; community feed endpoints will be unavailable");
        }

        Self::new(
            config.base_url.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl SearchProvider for SerpApiClient {
    async fn search(&self, params: &SearchParams) -> Result<serde_json::Value, SearchError> {
        let api_key = self.api_key.as_ref().ok_or(SearchError::NotConfigured)?;

        let engine = params.get("engine").map(String::as_str).unwrap_or("google");
        tracing::debug!(engine, "search request");

        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("api_key", api_key.expose_secret())])
            .send()
            .await
            .map_err(|e| SearchError::Upstream(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Upstream(format!("HTTP {status}")));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SearchError::Malformed(e.without_url().to_string()))?;

        if let Some(message) = body.get("error").and_then(|e| e.as_str()) {
            return Err(SearchError::Upstream(message.to_string()));
        }
        if !body.is_object() {
            return Err(SearchError::Malformed("expected a JSON object".to_string()));
        }

        Ok(body)
    }
}
