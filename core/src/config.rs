//! Client configuration read from the environment.

use thiserror::Error;

use crate::api::Api;
use crate::session::SessionStore;
use crate::transport::UreqTransport;

/// Variable holding the backend base URL.
pub const API_URL_VAR: &str = "API_URL";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for environment variable {var}: {reason}")]
    InvalidEnvValue { var: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
}

impl ClientConfig {
    /// Load `.env` if present, then read [`API_URL_VAR`].
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup(API_URL_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(API_URL_VAR.to_string()))?;

        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidEnvValue {
                var: API_URL_VAR.to_string(),
                reason: format!("expected an http(s) URL, got {api_url:?}"),
            });
        }

        tracing::debug!(api_url = %api_url, "client configuration loaded");
        Ok(Self { api_url })
    }
}

impl Api<UreqTransport> {
    /// Client on the default transport, pointed at the configured backend.
    pub fn from_config(config: &ClientConfig, session: SessionStore) -> Self {
        Api::new(&config.api_url, session, UreqTransport::new())
    }
}
