//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults reproduce a local development setup
//! running against fixtures.
//!
//! - `FUTURELABS_BASE_URL` - Booking API base address (default: `http://localhost:5000`)
//! - `FUTURELABS_USE_MOCK_DATA` - Serve fixtures instead of calling the API (default: true)
//! - `FUTURELABS_STATIC_ROOT` - Root that fixture image paths are resolved against (default: empty)
//! - `FUTURELABS_LOAD_TIMEOUT_SECS` - Page load timeout before falling back (default: 10)
//! - `FUTURELABS_COMPLETION_DELAY_MS` - Delay before hiding the login form after success (default: 1000)
//! - `FUTURELABS_STORAGE_PATH` - Local key-value store file (default: `.futurelabs/storage.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 10;
const DEFAULT_COMPLETION_DELAY_MS: u64 = 1000;
const DEFAULT_STORAGE_PATH: &str = ".futurelabs/storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
///
/// Loaded once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Booking API base address, without trailing slash
    pub base_url: String,
    /// Serve fixtures and never touch the network
    pub use_mock_data: bool,
    /// Root for fixture image paths, without trailing slash
    pub static_root: String,
    /// Upper bound on a live page load before falling back to fixtures
    pub load_timeout: Duration,
    /// Pause between a successful login and hiding the login form
    pub completion_delay: Duration,
    /// Location of the persisted key-value store
    pub storage_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            use_mock_data: true,
            static_root: String::new(),
            load_timeout: Duration::from_secs(DEFAULT_LOAD_TIMEOUT_SECS),
            completion_delay: Duration::from_millis(DEFAULT_COMPLETION_DELAY_MS),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            sentry_dsn: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = normalize_base_url(
            "FUTURELABS_BASE_URL",
            &get_or_default(&lookup, "FUTURELABS_BASE_URL", DEFAULT_BASE_URL),
        )?;
        let use_mock_data = parse_bool(
            "FUTURELABS_USE_MOCK_DATA",
            &get_or_default(&lookup, "FUTURELABS_USE_MOCK_DATA", "true"),
        )?;
        let static_root = get_or_default(&lookup, "FUTURELABS_STATIC_ROOT", "")
            .trim_end_matches('/')
            .to_string();
        let load_timeout = Duration::from_secs(parse_u64(
            &lookup,
            "FUTURELABS_LOAD_TIMEOUT_SECS",
            DEFAULT_LOAD_TIMEOUT_SECS,
        )?);
        let completion_delay = Duration::from_millis(parse_u64(
            &lookup,
            "FUTURELABS_COMPLETION_DELAY_MS",
            DEFAULT_COMPLETION_DELAY_MS,
        )?);
        let storage_path = PathBuf::from(get_or_default(
            &lookup,
            "FUTURELABS_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));
        let sentry_dsn = lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty());

        Ok(Self {
            base_url,
            use_mock_data,
            static_root,
            load_timeout,
            completion_delay,
            storage_path,
            sentry_dsn,
        })
    }

    /// Fixture-only configuration.
    #[must_use]
    pub fn mock() -> Self {
        Self::default()
    }

    /// Live configuration against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute URL.
    pub fn live(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url("base_url", base_url)?,
            use_mock_data: false,
            ..Self::default()
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable with a default value.
fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Validate an absolute URL and strip any trailing slash.
fn normalize_base_url(key: &str, value: &str) -> Result<String, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(value.trim_end_matches('/').to_string())
}

/// Parse a boolean flag (`true`/`false`/`1`/`0`/`yes`/`no`).
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

fn parse_u64<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert!(config.use_mock_data);
        assert_eq!(config.load_timeout, Duration::from_secs(10));
        assert_eq!(config.completion_delay, Duration::from_millis(1000));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_live_mode_from_env() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[
            ("FUTURELABS_BASE_URL", "https://api.futurelabs.in/"),
            ("FUTURELABS_USE_MOCK_DATA", "false"),
            ("FUTURELABS_LOAD_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://api.futurelabs.in");
        assert!(!config.use_mock_data);
        assert_eq!(config.load_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_bool() {
        let result =
            StorefrontConfig::from_lookup(lookup_from(&[("FUTURELABS_USE_MOCK_DATA", "maybe")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_invalid_base_url() {
        let result =
            StorefrontConfig::from_lookup(lookup_from(&[("FUTURELABS_BASE_URL", "localhost")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_timeout() {
        let result = StorefrontConfig::from_lookup(lookup_from(&[(
            "FUTURELABS_LOAD_TIMEOUT_SECS",
            "ten",
        )]));
        assert!(result.is_err());
    }

    #[test]
    fn test_static_root_trailing_slash_trimmed() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[(
            "FUTURELABS_STATIC_ROOT",
            "/public/",
        )]))
        .unwrap();
        assert_eq!(config.static_root, "/public");
    }

    #[test]
    fn test_empty_sentry_dsn_ignored() {
        let config =
            StorefrontConfig::from_lookup(lookup_from(&[("SENTRY_DSN", "")])).unwrap();
        assert!(config.sentry_dsn.is_none());
    }
}
