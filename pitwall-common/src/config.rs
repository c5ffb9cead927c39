//! Configuration loading for the Pitwall client
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error. A TOML file that exists but cannot be
//! parsed is, since silently ignoring it would hide a misconfiguration.
//!
//! Resolution runs before the log subscriber exists, so nothing here logs.
//! What was picked up is recorded on [`PitwallConfig`] and reported by
//! [`PitwallConfig::log_summary`] once logging is up.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable overriding the backend base URL
pub const ENV_BASE_URL: &str = "PITWALL_BASE_URL";
/// Environment variable carrying the API key
pub const ENV_API_KEY: &str = "PITWALL_API_KEY";
/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "PITWALL_LOG_LEVEL";

/// Compiled default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
/// Compiled default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Compiled default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of `config.toml`
///
/// All fields are optional; anything left out falls through to the compiled
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Backend base URL, e.g. `https://racing.example.com/api`
    #[serde(default)]
    pub base_url: Option<String>,

    /// API key sent as `X-API-Key`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging section of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub log_level: Option<String>,
    /// Explicit TOML path; replaces the platform default location
    pub config_path: Option<PathBuf>,
}

/// Fully resolved client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PitwallConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub log_level: String,
    /// TOML file that was actually read, if any
    pub config_source: Option<PathBuf>,
    /// Problems found while merging that fell back to defaults
    pub warnings: Vec<String>,
}

impl Default for PitwallConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            config_source: None,
            warnings: Vec::new(),
        }
    }
}

impl PitwallConfig {
    /// Resolve configuration from CLI overrides, environment, TOML and defaults
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self> {
        let toml_path = match &overrides.config_path {
            Some(path) => Some(path.clone()),
            None => default_config_path(),
        };
        let loaded = match toml_path {
            Some(path) => load_toml_config(&path)?.map(|config| (path, config)),
            None => None,
        };

        Ok(match loaded {
            Some((path, toml_config)) => Self {
                config_source: Some(path),
                ..Self::merge(overrides, &toml_config)
            },
            None => Self::merge(overrides, &TomlConfig::default()),
        })
    }

    /// Merge sources that have already been loaded
    ///
    /// Split out from [`PitwallConfig::resolve`] so the priority order can be
    /// checked without touching the filesystem.
    pub fn merge(overrides: &ConfigOverrides, toml_config: &TomlConfig) -> Self {
        let defaults = Self::default();

        let base_url = first_non_blank([
            overrides.base_url.clone(),
            std::env::var(ENV_BASE_URL).ok(),
            toml_config.base_url.clone(),
        ])
        .unwrap_or(defaults.base_url);

        let api_key = first_non_blank([
            overrides.api_key.clone(),
            std::env::var(ENV_API_KEY).ok(),
            toml_config.api_key.clone(),
        ]);

        let log_level = first_non_blank([
            overrides.log_level.clone(),
            std::env::var(ENV_LOG_LEVEL).ok(),
            toml_config.logging.level.clone(),
        ])
        .unwrap_or(defaults.log_level);

        let mut warnings = Vec::new();
        let request_timeout = match toml_config.request_timeout_secs {
            Some(0) => {
                warnings.push(
                    "request_timeout_secs = 0 is not usable, keeping default".to_string(),
                );
                defaults.request_timeout
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.request_timeout,
        };

        Self {
            base_url,
            api_key,
            request_timeout,
            log_level,
            config_source: None,
            warnings,
        }
    }

    /// Log where configuration came from. Call after the subscriber is installed.
    pub fn log_summary(&self) {
        match &self.config_source {
            Some(path) => info!(path = %path.display(), "Loaded config file"),
            None => info!("No config file found, using defaults"),
        }
        for warning in &self.warnings {
            warn!("{}", warning);
        }
        match &self.api_key {
            Some(key) => info!(key_len = key.len(), "API key configured"),
            None => info!("No API key configured, requests will be unauthenticated"),
        }
    }
}

/// Load a TOML config file
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    Ok(Some(config))
}

/// Platform config file location: `<config_dir>/pitwall/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pitwall").join("config.toml"))
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

fn first_non_blank<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| is_valid_key(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("abc123"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("   "));
    }

    #[test]
    fn test_first_non_blank_skips_empty_values() {
        let picked = first_non_blank([None, Some("  ".to_string()), Some(" key ".to_string())]);
        assert_eq!(picked, Some("key".to_string()));
    }

    #[test]
    fn test_parse_full_toml() {
        let config: TomlConfig = toml::from_str(
            r#"
            base_url = "https://racing.example.com/api"
            api_key = "secret"
            request_timeout_secs = 10

            [logging]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url.as_deref(), Some("https://racing.example.com/api"));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.request_timeout_secs, Some(10));
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_empty_toml() {
        let config: TomlConfig = toml::from_str("").unwrap();
        assert!(config.base_url.is_none());
        assert!(config.logging.level.is_none());
    }
}
