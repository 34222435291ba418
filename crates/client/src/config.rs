//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BAZAAR_API_URL` - Base URL of the REST backend (e.g., `https://api.example.com/api`)
//!
//! ## Optional
//! - `BAZAAR_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
//! - `BAZAAR_STORAGE_PATH` - Persisted storage file (default: `.bazaar/storage.json`)
//! - `BAZAAR_USER_AGENT` - User agent sent with every request (default: `bazaar-client/<version>`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STORAGE_PATH: &str = ".bazaar/storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Settings shared by every role's API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL. Always ends with `/` so path segments append cleanly.
    pub api_url: Url,
    /// Timeout applied to every request.
    pub timeout: Duration,
    /// Location of the persisted key-value storage.
    pub storage_path: PathBuf,
    /// User agent header.
    pub user_agent: String,
}

impl ClientConfig {
    /// Configuration for `api_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or is
    /// not `http`/`https`.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_base_url("BAZAAR_API_URL", api_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            user_agent: default_user_agent(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_base_url("BAZAAR_API_URL", &get_required_env("BAZAAR_API_URL")?)?;
        let timeout_secs = get_env_or_default("BAZAAR_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BAZAAR_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "BAZAAR_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            storage_path: PathBuf::from(get_env_or_default(
                "BAZAAR_STORAGE_PATH",
                DEFAULT_STORAGE_PATH,
            )),
            user_agent: get_optional_env("BAZAAR_USER_AGENT").unwrap_or_else(default_user_agent),
        })
    }

    /// Override the storage location.
    #[must_use]
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn default_user_agent() -> String {
    format!("bazaar-client/{}", env!("CARGO_PKG_VERSION"))
}

/// Parse a base URL, requiring http(s) and a trailing slash.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ClientConfig::new("https://api.example.com/api").unwrap();
        assert_eq!(config.api_url.as_str(), "https://api.example.com/api/");

        let config = ClientConfig::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = ClientConfig::new("ftp://files.example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        assert!(ClientConfig::new("not a url").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("https://api.example.com").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.storage_path, PathBuf::from(".bazaar/storage.json"));
        assert!(config.user_agent.starts_with("bazaar-client/"));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::new("https://api.example.com")
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .with_storage_path("/tmp/bazaar.json");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.storage_path, PathBuf::from("/tmp/bazaar.json"));
    }
}
