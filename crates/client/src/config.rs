//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PHUTUNG_API_URL` - Base URL of the storefront REST API
//!
//! ## Optional
//! - `PHUTUNG_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `PHUTUNG_SEARCH_DEBOUNCE_MS` - Keyword quiet period (default: 500)
//! - `PHUTUNG_MAX_LINE_QUANTITY` - Per-line quantity cap (default: 99)

use std::time::Duration;

use thiserror::Error;
use url::Url;

use phutung_core::DEFAULT_MAX_LINE_QUANTITY;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 500;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API (e.g. `https://api.example.com/api/v1/`).
    pub base_url: Url,
    /// Per-request timeout; bounds how long a store can stay `Loading`.
    pub request_timeout: Duration,
    /// Quiet period between the last keyword edit and a committed query.
    pub keyword_quiet_period: Duration,
    /// Maximum quantity accepted for a single cart line.
    pub max_line_quantity: u32,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let base_url = parse_base_url("PHUTUNG_API_URL", &get_required_env("PHUTUNG_API_URL")?)?;
        let timeout_secs = parse_u64(
            "PHUTUNG_REQUEST_TIMEOUT_SECS",
            &get_env_or_default(
                "PHUTUNG_REQUEST_TIMEOUT_SECS",
                &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
            ),
        )?;
        let debounce_ms = parse_u64(
            "PHUTUNG_SEARCH_DEBOUNCE_MS",
            &get_env_or_default(
                "PHUTUNG_SEARCH_DEBOUNCE_MS",
                &DEFAULT_SEARCH_DEBOUNCE_MS.to_string(),
            ),
        )?;
        let max_line_quantity = parse_u32(
            "PHUTUNG_MAX_LINE_QUANTITY",
            &get_env_or_default(
                "PHUTUNG_MAX_LINE_QUANTITY",
                &DEFAULT_MAX_LINE_QUANTITY.to_string(),
            ),
        )?;

        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            keyword_quiet_period: Duration::from_millis(debounce_ms),
            max_line_quantity,
        })
    }

    /// Build a configuration with defaults for everything but the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not a valid URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("base_url", base_url)?,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            keyword_quiet_period: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            max_line_quantity: DEFAULT_MAX_LINE_QUANTITY,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a base URL, requiring an http(s) scheme and a trailing slash so
/// that `Url::join` appends instead of replacing the last path segment.
fn parse_base_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_u64(name: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
}

fn parse_u32(name: &str, raw: &str) -> Result<u32, ConfigError> {
    raw.parse::<u32>()
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
}
