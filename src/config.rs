//! Configuration for talking to a PyBossa-style service.
//!
//! Configuration can be set via environment variables:
//! - `PYBOSSA_API_KEY` - Optional. API key sent with every request.
//! - `PYBOSSA_ENDPOINT` - Optional. Base URL of the service. Defaults to
//!   `http://localhost:5000`.

use thiserror::Error;
use url::Url;

/// Default service endpoint (a locally running instance).
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Client configuration, fixed at session construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key sent as the `api_key` query parameter. Public projects allow
    /// anonymous reads, hence optional.
    pub api_key: Option<String>,

    /// Base URL of the service. The path always ends with `/` so that
    /// joining `api/...` keeps any mount prefix.
    pub endpoint: Url,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `PYBOSSA_ENDPOINT` is not a
    /// valid absolute URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("PYBOSSA_API_KEY").ok();

        let endpoint = std::env::var("PYBOSSA_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        Self::new(api_key, &endpoint)
    }

    /// Create a config with explicit values (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `endpoint` is not a valid
    /// absolute URL.
    pub fn new(api_key: Option<String>, endpoint: &str) -> Result<Self, ConfigError> {
        let mut endpoint = Url::parse(endpoint)
            .map_err(|e| ConfigError::InvalidValue("endpoint".to_string(), e.to_string()))?;

        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }

        Ok(Self { api_key, endpoint })
    }
}
