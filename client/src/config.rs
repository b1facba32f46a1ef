//! Configuration management for the client.

use std::env;
use std::time::Duration;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST backend, without a trailing slash
    pub api_url: String,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
    /// Timeout of a single HTTP request
    pub http_timeout: Duration,
    /// Id of the logged-in user, checked against the token before committing
    pub user_id: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env::var("FRIDGE_API_URL").map_err(|_| ConfigError::MissingApiUrl)?;

        let http_timeout = match env::var("FRIDGE_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidTimeout(raw))?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self::new(api_url)
            .with_token(env::var("FRIDGE_API_TOKEN").ok())
            .with_timeout(Duration::from_secs(http_timeout))
            .with_user_id(env::var("FRIDGE_USER_ID").ok()))
    }

    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_token: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            user_id: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id.filter(|id| !id.is_empty());
        self
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("FRIDGE_API_URL environment variable is required")]
    MissingApiUrl,

    #[error("Invalid FRIDGE_HTTP_TIMEOUT_SECS value: {0}")]
    InvalidTimeout(String),
}
