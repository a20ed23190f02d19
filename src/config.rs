use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use crate::error::ConfigError;

/// Default location of the configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "configs/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub rpc: RpcConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// Upstream node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL
    pub endpoint: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace). Anything else means info.
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://cloudflare-eth.com".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Path of the configuration file: `CONFIG_PATH` or the default location
    pub fn config_path() -> String {
        env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load configuration from file and environment variables.
    /// Environment variables take precedence over file values.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Same as [`AppConfig::load`] with an explicit file path
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parsing(e.to_string()))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("SERVER_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "SERVER_PORT".to_string(),
                value: port,
            })?;
        }

        if let Ok(endpoint) = env::var("ETH_RPC_URL") {
            self.rpc.endpoint = endpoint;
        }
        if let Ok(timeout) = env::var("RPC_TIMEOUT_SECONDS") {
            self.rpc.timeout_seconds = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                key: "RPC_TIMEOUT_SECONDS".to_string(),
                value: timeout,
            })?;
        }

        if let Ok(level) = env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rpc.endpoint.starts_with("http://") && !self.rpc.endpoint.starts_with("https://") {
            return Err(ConfigError::InvalidUrl(self.rpc.endpoint.clone()));
        }

        if self.rpc.timeout_seconds == 0 || self.rpc.timeout_seconds > 300 {
            return Err(ConfigError::InvalidValue {
                key: "rpc.timeout_seconds".to_string(),
                value: self.rpc.timeout_seconds.to_string(),
            });
        }

        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "server.port".to_string(),
                value: self.server.port.to_string(),
            });
        }

        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "server.host".to_string(),
                value: self.server.host.clone(),
            });
        }

        // Unknown levels fall back to info, see logging::parse_level
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                value: self.logging.format.clone(),
            });
        }

        Ok(())
    }

    /// Render the default configuration as TOML
    pub fn generate_sample_config() -> Result<String, ConfigError> {
        toml::to_string_pretty(&Self::default())
            .map_err(|e| ConfigError::Parsing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn clear_env() {
        for key in [
            "CONFIG_PATH",
            "SERVER_HOST",
            "SERVER_PORT",
            "ETH_RPC_URL",
            "RPC_TIMEOUT_SECONDS",
            "LOG_LEVEL",
            "LOG_FORMAT",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.rpc.timeout_seconds, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.rpc.endpoint = "invalid-url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        config = AppConfig::default();
        config.rpc.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        config = AppConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        // Unknown levels are accepted and treated as info
        config = AppConfig::default();
        config.logging.level = "chatty".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("ETH_RPC_URL", "https://test-rpc.example/");
        env::set_var("SERVER_PORT", "9090");
        env::set_var("SERVER_HOST", "0.0.0.0");
        env::set_var("LOG_LEVEL", "debug");

        let mut config = AppConfig::default();
        config.apply_env_overrides().unwrap();

        assert_eq!(config.rpc.endpoint, "https://test-rpc.example/");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.level, "debug");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_values() {
        clear_env();
        env::set_var("RPC_TIMEOUT_SECONDS", "invalid");

        let mut config = AppConfig::default();
        let result = config.apply_env_overrides();

        assert!(matches!(result.unwrap_err(), ConfigError::InvalidValue { .. }));

        clear_env();
        env::set_var("SERVER_PORT", "70000");
        let result = AppConfig::default().apply_env_overrides();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidValue { ref key, ref value } if key == "SERVER_PORT" && value == "70000"
        ));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_file_loading() {
        clear_env();
        let config_content = r#"
[server]
host = "0.0.0.0"
port = 3000

[rpc]
endpoint = "http://localhost:8545"
timeout_seconds = 10

[logging]
level = "warn"
format = "json"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(config_content.as_bytes()).unwrap();

        env::set_var("CONFIG_PATH", temp_file.path().to_str().unwrap());
        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.rpc.endpoint, "http://localhost:8545");
        assert_eq!(config.rpc.timeout_seconds, 10);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "json");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_partial_file_uses_defaults() {
        clear_env();
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[rpc]\nendpoint = \"http://node:8545\"\n").unwrap();

        let config = AppConfig::load_from(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.rpc.endpoint, "http://node:8545");
        assert_eq!(config.rpc.timeout_seconds, 30);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    #[serial]
    fn test_missing_file_yields_defaults() {
        clear_env();
        let config = AppConfig::load_from("/nonexistent/monitor/config.toml").unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_malformed_file_is_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[server\nport = ").unwrap();

        let result = AppConfig::load_from_file(temp_file.path().to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Parsing(_))));
    }

    #[test]
    fn test_generate_sample_config() {
        let sample = AppConfig::generate_sample_config().unwrap();
        assert!(sample.contains("[server]"));
        assert!(sample.contains("[rpc]"));
        assert!(sample.contains("[logging]"));

        let parsed: AppConfig = toml::from_str(&sample).unwrap();
        assert_eq!(parsed.rpc.endpoint, AppConfig::default().rpc.endpoint);
    }
}
