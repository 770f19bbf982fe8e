//! Configuration management for the weather proxy
//!
//! Settings come from an optional TOML file, then `WEATHER_PROXY__*`
//! environment variables, then the legacy bare `API_KEY` / `PORT`
//! variables. A missing API key is allowed here; requests
//! report it instead.

use crate::WeatherProxyError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variable that points at an alternative config file
pub const CONFIG_PATH_ENV: &str = "WEATHER_PROXY_CONFIG";

/// Legacy credential variable
pub const LEGACY_API_KEY_ENV: &str = "API_KEY";

/// Legacy listen port variable
pub const LEGACY_PORT_ENV: &str = "PORT";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherProxyConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Weather provider settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for the provider, without the `/data/2.5` suffix
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,
    /// Per-call timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u32,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default)]
    pub format: LogFormat,
    /// OTLP/HTTP collector endpoint; trace export is off when unset
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u32 {
    30
}

fn default_upstream_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_upstream_timeout() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_upstream_base_url(),
            timeout_seconds: default_upstream_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            otlp_endpoint: None,
        }
    }
}

impl WeatherProxyConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("WEATHER_PROXY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherProxyConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_legacy_env(|name| env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Fill unset values from the bare `API_KEY` and `PORT` variables
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.upstream.api_key.is_none() {
            self.upstream.api_key = lookup(LEGACY_API_KEY_ENV);
        }
        if self.server.port == default_port() {
            if let Some(port) = lookup(LEGACY_PORT_ENV).and_then(|p| p.trim().parse().ok()) {
                self.server.port = port;
            }
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self
            .upstream
            .api_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty())
        {
            self.upstream.api_key = None;
        }
        if let Some(key) = self.upstream.api_key.as_mut() {
            *key = key.trim().to_string();
        }
        if self.upstream.base_url.is_empty() {
            self.upstream.base_url = default_upstream_base_url();
        }
        if self.upstream.timeout_seconds == 0 {
            self.upstream.timeout_seconds = default_upstream_timeout();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self
            .logging
            .otlp_endpoint
            .as_deref()
            .is_some_and(|e| e.trim().is_empty())
        {
            self.logging.otlp_endpoint = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(1..=300).contains(&self.upstream.timeout_seconds) {
            return Err(WeatherProxyError::config(
                "Upstream timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if !(1..=300).contains(&self.server.request_timeout_seconds) {
            return Err(WeatherProxyError::config(
                "Request timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherProxyError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            return Err(WeatherProxyError::config(
                "Upstream base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = WeatherProxyConfig::default();
        assert_eq!(config.upstream.base_url, "https://api.openweathermap.org");
        assert_eq!(config.upstream.timeout_seconds, 10);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.upstream.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_api_key_is_not_a_startup_error() {
        let mut config = WeatherProxyConfig::default();
        config.apply_legacy_env(lookup_from(&[]));
        config.apply_defaults();
        assert!(config.upstream.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_legacy_env_fills_key_and_port() {
        let mut config = WeatherProxyConfig::default();
        config.apply_legacy_env(lookup_from(&[("API_KEY", "abcdef123456"), ("PORT", "8081")]));
        assert_eq!(config.upstream.api_key.as_deref(), Some("abcdef123456"));
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn test_explicit_key_wins_over_legacy_env() {
        let mut config = WeatherProxyConfig::default();
        config.upstream.api_key = Some("from-config".to_string());
        config.server.port = 9000;
        config.apply_legacy_env(lookup_from(&[("API_KEY", "from-env"), ("PORT", "8081")]));
        assert_eq!(config.upstream.api_key.as_deref(), Some("from-config"));
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_unparseable_legacy_port_is_ignored() {
        let mut config = WeatherProxyConfig::default();
        config.apply_legacy_env(lookup_from(&[("PORT", "not-a-port")]));
        assert_eq!(config.server.port, 5000);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn test_blank_api_key_becomes_none(#[case] key: &str) {
        let mut config = WeatherProxyConfig::default();
        config.upstream.api_key = Some(key.to_string());
        config.apply_defaults();
        assert!(config.upstream.api_key.is_none());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = WeatherProxyConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[rstest]
    #[case(0)]
    #[case(301)]
    fn test_config_validation_upstream_timeout(#[case] timeout: u32) {
        let mut config = WeatherProxyConfig::default();
        config.upstream.timeout_seconds = timeout;
        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Upstream timeout must be between")
        );
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = WeatherProxyConfig::default();
        config.upstream.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("weather-proxy-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 7070

[upstream]
base_url = "http://localhost:9999"
timeout_seconds = 5

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = WeatherProxyConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.server.port, 7070);
        assert_eq!(config.upstream.base_url, "http://localhost:9999");
        assert_eq!(config.upstream.timeout_seconds, 5);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
