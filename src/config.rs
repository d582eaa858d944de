//! Configuration types for the qws broker.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then command-line overrides. It includes:
//!
//! - [`BrokerConfig`] - Root configuration struct
//! - [`ServerConfig`] - HTTP listener settings
//! - [`SweeperConfig`] - Expiration sweep settings
//! - [`AuthConfig`] - Optional API token

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Root configuration (`qws.toml`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrokerConfig {
    pub server: ServerConfig,
    pub sweeper: SweeperConfig,
    pub auth: AuthConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Longest wait a single dequeue request may ask for.
    pub max_dequeue_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: constants::DEFAULT_HOST.to_string(),
            port: constants::DEFAULT_PORT,
            max_dequeue_timeout_secs: constants::DEFAULT_MAX_DEQUEUE_TIMEOUT_SECS,
        }
    }
}

/// Expiration sweep settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweeperConfig {
    /// Seconds between sweeps; 0 disables the sweeper.
    pub interval_secs: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: constants::DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

/// API token settings. No token means an open broker.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub token: Option<String>,
}

/// Values supplied on the command line, applied over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub interval_secs: Option<u64>,
    pub token: Option<String>,
}

impl BrokerConfig {
    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML,
    /// or has unknown keys.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid TOML or unknown keys.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply command-line overrides on top of the loaded values.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(interval) = overrides.interval_secs {
            self.sweeper.interval_secs = interval;
        }
        if let Some(token) = overrides.token {
            self.auth.token = Some(token);
        }
        self
    }

    /// Interval between expiration sweeps (`Duration::ZERO` = disabled).
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweeper.interval_secs)
    }

    /// Longest dequeue wait a request may ask for.
    pub fn max_dequeue_timeout(&self) -> Duration {
        Duration::from_secs(self.server.max_dequeue_timeout_secs)
    }

    /// Validate configuration.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails with one or more errors:
    /// - Port 0 or an empty host
    /// - Zero maximum dequeue timeout
    /// - Empty API token
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.server.host.trim().is_empty() {
            errors.push("server.host cannot be empty".to_string());
        }

        if self.server.port == 0 {
            errors.push(
                "Server port cannot be 0. Use a valid port number (1-65535)\n  \
                 Default: 8080"
                    .to_string(),
            );
        }

        if self.server.port < 1024 && self.server.port > 0 {
            warnings.push(format!(
                "Server port {} is a system/privileged port (< 1024)\n  \
                 Recommendation: Use ports >= 1024 (e.g., 8080) to avoid permission issues",
                self.server.port
            ));
        }

        if self.server.max_dequeue_timeout_secs == 0 {
            errors.push(
                "server.max_dequeue_timeout_secs cannot be 0; long-poll dequeue needs a positive bound"
                    .to_string(),
            );
        }

        if self.server.max_dequeue_timeout_secs > constants::MAX_DEQUEUE_TIMEOUT_LIMIT_SECS {
            errors.push(format!(
                "server.max_dequeue_timeout_secs = {} exceeds the limit of {} seconds",
                self.server.max_dequeue_timeout_secs,
                constants::MAX_DEQUEUE_TIMEOUT_LIMIT_SECS
            ));
        }

        if self.sweeper.interval_secs == 0 {
            warnings.push(
                "Expiration sweeper is disabled (interval_secs = 0); expired elements stay queued"
                    .to_string(),
            );
        }

        if let Some(token) = &self.auth.token
            && token.trim().is_empty()
        {
            errors.push("auth.token cannot be empty; remove it to disable authentication".to_string());
        }

        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BrokerConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.max_dequeue_timeout(), Duration::from_secs(300));
        assert!(config.auth.token.is_none());
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = BrokerConfig::parse("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.sweeper.interval_secs, 60);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[server]
host = "127.0.0.1"
port = 9000
max_dequeue_timeout_secs = 120

[sweeper]
interval_secs = 5

[auth]
token = "s3cret"
"#;
        let config = BrokerConfig::parse(toml_str).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.max_dequeue_timeout(), Duration::from_secs(120));
        assert_eq!(config.sweep_interval(), Duration::from_secs(5));
        assert_eq!(config.auth.token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_parse_partial_section_keeps_other_defaults() {
        let config = BrokerConfig::parse("[server]\nport = 9100\n").unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.max_dequeue_timeout_secs, 300);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(BrokerConfig::parse("[server]\nprot = 9100\n").is_err());
        assert!(BrokerConfig::parse("[metrics]\nenabled = true\n").is_err());
    }

    #[test]
    fn test_overrides_win() {
        let config = BrokerConfig::parse("[server]\nport = 9000\n[sweeper]\ninterval_secs = 5\n")
            .unwrap()
            .with_overrides(ConfigOverrides {
                port: Some(9001),
                interval_secs: Some(0),
                token: Some("abc".to_string()),
                ..Default::default()
            });
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.sweep_interval(), Duration::ZERO);
        assert_eq!(config.auth.token.as_deref(), Some("abc"));
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 7070").unwrap();

        let config = BrokerConfig::load_from(file.path()).unwrap();
        assert_eq!(config.server.port, 7070);
    }

    #[test]
    fn test_load_missing_file() {
        let err = BrokerConfig::load_from("/nonexistent/qws.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_validate_default_is_clean() {
        let result = BrokerConfig::default().validate().unwrap();
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_validate_port_zero() {
        let config = BrokerConfig::parse("[server]\nport = 0\n").unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("port cannot be 0"));
    }

    #[test]
    fn test_validate_zero_max_timeout() {
        let config = BrokerConfig::parse("[server]\nmax_dequeue_timeout_secs = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_max_timeout_limit() {
        let config = BrokerConfig::parse("[server]\nmax_dequeue_timeout_secs = 86400\n").unwrap();
        assert!(config.validate().is_ok());

        let config = BrokerConfig::parse("[server]\nmax_dequeue_timeout_secs = 86401\n").unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("exceeds the limit"));

        let mut config = BrokerConfig::default();
        config.server.max_dequeue_timeout_secs = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_empty_token() {
        let config = BrokerConfig::parse("[auth]\ntoken = \"  \"\n").unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("auth.token cannot be empty"));
    }

    #[test]
    fn test_validate_warnings() {
        let config = BrokerConfig::parse("[server]\nport = 80\n[sweeper]\ninterval_secs = 0\n")
            .unwrap();
        let result = config.validate().unwrap();
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].contains("privileged"));
        assert!(result.warnings[1].contains("sweeper is disabled"));
    }
}
