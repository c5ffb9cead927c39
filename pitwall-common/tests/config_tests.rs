//! Configuration resolution tests
//!
//! Priority order: CLI → ENV → TOML → compiled defaults.
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.
//! Tests that touch PITWALL_* variables are marked #[serial].

use pitwall_common::config::{
    load_toml_config, ConfigOverrides, LoggingConfig, PitwallConfig, TomlConfig, DEFAULT_BASE_URL,
    ENV_API_KEY, ENV_BASE_URL, ENV_LOG_LEVEL,
};
use pitwall_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::time::Duration;

fn clear_env() {
    env::remove_var(ENV_BASE_URL);
    env::remove_var(ENV_API_KEY);
    env::remove_var(ENV_LOG_LEVEL);
}

fn toml_with_everything() -> TomlConfig {
    TomlConfig {
        base_url: Some("https://toml.example.com/api".to_string()),
        api_key: Some("toml-key".to_string()),
        request_timeout_secs: Some(12),
        logging: LoggingConfig {
            level: Some("warn".to_string()),
        },
    }
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();

    let config = PitwallConfig::merge(&ConfigOverrides::default(), &TomlConfig::default());

    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.api_key, None);
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.log_level, "info");
}

#[test]
#[serial]
fn test_toml_used_when_no_env_or_cli() {
    clear_env();

    let config = PitwallConfig::merge(&ConfigOverrides::default(), &toml_with_everything());

    assert_eq!(config.base_url, "https://toml.example.com/api");
    assert_eq!(config.api_key.as_deref(), Some("toml-key"));
    assert_eq!(config.request_timeout, Duration::from_secs(12));
    assert_eq!(config.log_level, "warn");
}

#[test]
#[serial]
fn test_env_beats_toml() {
    clear_env();
    env::set_var(ENV_BASE_URL, "https://env.example.com/api");
    env::set_var(ENV_API_KEY, "env-key");

    let config = PitwallConfig::merge(&ConfigOverrides::default(), &toml_with_everything());

    assert_eq!(config.base_url, "https://env.example.com/api");
    assert_eq!(config.api_key.as_deref(), Some("env-key"));
    // Not overridden by ENV
    assert_eq!(config.log_level, "warn");

    clear_env();
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env();
    env::set_var(ENV_API_KEY, "env-key");
    env::set_var(ENV_LOG_LEVEL, "trace");

    let overrides = ConfigOverrides {
        api_key: Some("cli-key".to_string()),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };
    let config = PitwallConfig::merge(&overrides, &toml_with_everything());

    assert_eq!(config.api_key.as_deref(), Some("cli-key"));
    assert_eq!(config.log_level, "debug");

    clear_env();
}

#[test]
#[serial]
fn test_blank_values_fall_through() {
    clear_env();
    env::set_var(ENV_API_KEY, "   ");

    let overrides = ConfigOverrides {
        api_key: Some(String::new()),
        ..Default::default()
    };
    let config = PitwallConfig::merge(&overrides, &TomlConfig::default());

    assert_eq!(config.api_key, None);

    clear_env();
}

#[test]
#[serial]
fn test_zero_timeout_keeps_default() {
    clear_env();

    let toml_config = TomlConfig {
        request_timeout_secs: Some(0),
        ..Default::default()
    };
    let config = PitwallConfig::merge(&ConfigOverrides::default(), &toml_config);

    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.warnings.len(), 1);
    assert!(config.warnings[0].contains("request_timeout_secs"));
}

#[test]
#[serial]
fn test_resolve_without_file_has_no_source() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();

    let overrides = ConfigOverrides {
        config_path: Some(dir.path().join("missing.toml")),
        ..Default::default()
    };
    let config = PitwallConfig::resolve(&overrides).unwrap();

    assert_eq!(config.config_source, None);
    assert!(config.warnings.is_empty());
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
}

#[test]
fn test_missing_config_file_does_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let loaded = load_toml_config(&path).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_malformed_config_file_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "base_url = [not valid").unwrap();

    let result = load_toml_config(file.path());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_resolve_reads_explicit_config_path() {
    clear_env();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
base_url = "https://file.example.com/api"
api_key = "file-key"

[logging]
level = "debug"
"#
    )
    .unwrap();

    let overrides = ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = PitwallConfig::resolve(&overrides).unwrap();

    assert_eq!(config.base_url, "https://file.example.com/api");
    assert_eq!(config.api_key.as_deref(), Some("file-key"));
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.config_source.as_deref(), Some(file.path()));
}
