//! Client configuration: the API base address, given directly or read from
//! `GYM_ADMIN_API_URL`.

use thiserror::Error;

pub const API_URL_ENV: &str = "GYM_ADMIN_API_URL";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("base URL must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
}

/// Client configuration. Only the API base address is configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url: base_url.to_string(),
        })
    }

    /// Read the base URL from `GYM_ADMIN_API_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var(API_URL_ENV).map_err(|_| ConfigError::MissingEnv(API_URL_ENV))?;
        Self::new(&url)
    }
}
