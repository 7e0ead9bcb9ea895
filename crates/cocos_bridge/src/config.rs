//! Configuration for the bridge, loaded from a TOML file.
//!
//! Every field has a default, so a missing file or a partial one both work.
//! Command-line flags are applied on top by the application.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_validate() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub client: ClientSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// How to reach the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Server URL; when unset the usual discovery applies
    #[serde(default)]
    pub server_url: Option<String>,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Check actions against the module catalog before sending
    #[serde(default = "default_validate")]
    pub validate: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: None,
            timeout_ms: default_timeout_ms(),
            validate: default_validate(),
        }
    }
}

/// Logging configuration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Loads the configuration file, falling back to defaults when it does not exist.
    pub async fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No configuration at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.client.timeout_ms == 0 {
            return Err("Timeout must be greater than zero".to_string());
        }

        if let Some(url) = &self.client.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("Invalid server URL: {url}. Must start with http:// or https://"));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let config = AppConfig::load_from_file(&path).await.unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.client.timeout_ms, 30_000);
        assert!(config.client.validate);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[client]
server_url = "http://192.168.1.20:54321"

[logging]
level = "debug"
"#
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path()).await.unwrap();
        assert_eq!(config.client.server_url.as_deref(), Some("http://192.168.1.20:54321"));
        assert_eq!(config.client.timeout_ms, 30_000);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.json_format);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[client\ntimeout_ms = ").unwrap();
        let err = AppConfig::load_from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.client.timeout_ms = 0;
        assert!(config.validate().is_err());

        config.client.timeout_ms = 1_000;
        config.client.server_url = Some("127.0.0.1:54321".into());
        assert!(config.validate().unwrap_err().contains("Invalid server URL"));

        config.client.server_url = None;
        config.logging.level = "loud".into();
        assert!(config.validate().unwrap_err().contains("Invalid log level"));
    }
}
