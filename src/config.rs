//! Configuration module for vaultbot.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, VaultError};

/// Chat platform configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Bot access token for the chat platform API.
    #[serde(default)]
    pub token: String,
    /// Base URL of the chat platform API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: default_api_base(),
        }
    }
}

/// Shared credential configuration.
///
/// A single username/password pair gates the whole vault; there is no
/// multi-user directory.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// Valid username.
    #[serde(default)]
    pub username: String,
    /// Valid password.
    #[serde(default)]
    pub password: String,
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the shared upload directory.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Maximum inbound (upload) file size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Maximum outbound (download) file size in bytes.
    #[serde(default = "default_max_download_bytes")]
    pub max_download_bytes: u64,
    /// Capacity ceiling for the upload directory in bytes.
    #[serde(default = "default_upload_limit_bytes")]
    pub upload_limit_bytes: u64,
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_max_upload_bytes() -> u64 {
    20 * 1024 * 1024
}

fn default_max_download_bytes() -> u64 {
    50 * 1024 * 1024
}

fn default_upload_limit_bytes() -> u64 {
    1024 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            max_download_bytes: default_max_download_bytes(),
            upload_limit_bytes: default_upload_limit_bytes(),
        }
    }
}

/// Transfer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    /// Bounded timeout for a single transfer in seconds.
    #[serde(default = "default_transfer_timeout")]
    pub timeout_secs: u64,
    /// Cooldown between `/upload` prompts per conversation, in seconds.
    #[serde(default = "default_upload_cooldown")]
    pub upload_cooldown_secs: u64,
}

fn default_transfer_timeout() -> u64 {
    180
}

fn default_upload_cooldown() -> u64 {
    5
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_transfer_timeout(),
            upload_cooldown_secs: default_upload_cooldown(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the audit log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/vaultbot.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Chat platform configuration.
    #[serde(default)]
    pub bot: BotConfig,
    /// Shared credential configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// File storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Transfer configuration.
    #[serde(default)]
    pub transfer: TransferConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(VaultError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| VaultError::Validation(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `VAULTBOT_TOKEN`: Override the bot access token
    /// - `VAULTBOT_USERNAME`: Override the valid username
    /// - `VAULTBOT_PASSWORD`: Override the valid password
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("VAULTBOT_TOKEN") {
            if !token.is_empty() {
                self.bot.token = token;
            }
        }
        if let Ok(username) = std::env::var("VAULTBOT_USERNAME") {
            if !username.is_empty() {
                self.auth.username = username;
            }
        }
        if let Ok(password) = std::env::var("VAULTBOT_PASSWORD") {
            if !password.is_empty() {
                self.auth.password = password;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The credential pair is not set
    /// - The download ceiling is zero
    pub fn validate(&self) -> Result<()> {
        if self.auth.username.is_empty() || self.auth.password.is_empty() {
            return Err(VaultError::Validation(
                "auth credentials are not set. \
                 Set them in config.toml or via VAULTBOT_USERNAME / VAULTBOT_PASSWORD."
                    .to_string(),
            ));
        }
        if self.storage.max_download_bytes == 0 {
            return Err(VaultError::Validation(
                "max_download_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.bot.token.is_empty());
        assert_eq!(config.bot.api_base, "https://api.telegram.org");

        assert!(config.auth.username.is_empty());
        assert!(config.auth.password.is_empty());

        assert_eq!(config.storage.upload_dir, "uploads");
        assert_eq!(config.storage.max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(config.storage.max_download_bytes, 50 * 1024 * 1024);
        assert_eq!(config.storage.upload_limit_bytes, 1024 * 1024 * 1024);

        assert_eq!(config.transfer.timeout_secs, 180);
        assert_eq!(config.transfer.upload_cooldown_secs, 5);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/vaultbot.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[bot]
token = "123456:abcdef"
api_base = "https://example.invalid"

[auth]
username = "operator"
password = "hunter2"

[storage]
upload_dir = "data/files"
max_upload_bytes = 1048576
max_download_bytes = 2097152
upload_limit_bytes = 10485760

[transfer]
timeout_secs = 60
upload_cooldown_secs = 10

[logging]
level = "debug"
file = "custom/logs/bot.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.bot.token, "123456:abcdef");
        assert_eq!(config.bot.api_base, "https://example.invalid");
        assert_eq!(config.auth.username, "operator");
        assert_eq!(config.auth.password, "hunter2");
        assert_eq!(config.storage.upload_dir, "data/files");
        assert_eq!(config.storage.max_upload_bytes, 1048576);
        assert_eq!(config.storage.max_download_bytes, 2097152);
        assert_eq!(config.storage.upload_limit_bytes, 10485760);
        assert_eq!(config.transfer.timeout_secs, 60);
        assert_eq!(config.transfer.upload_cooldown_secs, 10);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/bot.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[auth]
username = "operator"

[storage]
max_upload_bytes = 4096
"#;

        let config = Config::parse(toml).unwrap();

        // Specified values
        assert_eq!(config.auth.username, "operator");
        assert_eq!(config.storage.max_upload_bytes, 4096);

        // Default values
        assert_eq!(config.storage.upload_dir, "uploads");
        assert_eq!(config.storage.max_download_bytes, 50 * 1024 * 1024);
        assert_eq!(config.transfer.timeout_secs, 180);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.storage.upload_dir, "uploads");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(VaultError::Validation(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Validation error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");

        assert!(result.is_err());
        assert!(matches!(result, Err(VaultError::Io(_))));
    }

    #[test]
    fn test_validate_missing_credentials() {
        let config = Config::default();

        let result = config.validate();
        assert!(result.is_err());
        if let Err(VaultError::Validation(msg)) = result {
            assert!(msg.contains("credentials"));
        }
    }

    #[test]
    fn test_validate_with_credentials() {
        let mut config = Config::default();
        config.auth.username = "operator".to_string();
        config.auth.password = "hunter2".to_string();

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_download_ceiling() {
        let mut config = Config::default();
        config.auth.username = "operator".to_string();
        config.auth.password = "hunter2".to_string();
        config.storage.max_download_bytes = 0;

        assert!(config.validate().is_err());
    }
}
