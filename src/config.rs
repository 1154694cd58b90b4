// src/config.rs
// =============================================================================
// This module reads the JSON configuration file.
//
// Example config.json:
//   {
//     "api": { "base_url": "https://api.twitter.com/1.1/", "timeout_secs": 30 },
//     "account": { "token": "<bearer token>", "screen_name": "me" },
//     "probe": { "timeout_secs": 2.0 }
//   }
//
// Only `account.token` is required; everything else has a default.
// The file is validated once at load time, so the rest of the program can
// trust the values it gets.
// =============================================================================

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::checker::DEFAULT_PROBE_TIMEOUT;

/// Errors while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot find config file '{0}'")]
    NotFound(PathBuf),

    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The whole configuration file
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    pub account: AccountConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

/// Where the feed API lives
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for feed API calls (not link probes), in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_api_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.twitter.com/1.1/".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

/// Credentials of the account being cleaned up
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    /// User-context bearer token
    pub token: String,
    /// Whose timeline to read; the token's owner when absent
    #[serde(default)]
    pub screen_name: Option<String>,
}

/// Link probe settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: f64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_probe_timeout(),
        }
    }
}

fn default_probe_timeout() -> f64 {
    DEFAULT_PROBE_TIMEOUT.as_secs_f64()
}

impl Config {
    /// Reads and validates the config file at `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Read {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let config: Config = serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.account.token.trim().is_empty() {
            return Err(ConfigError::Invalid("account.token is empty".to_string()));
        }
        self.base_url()?;
        probe_timeout(self.probe.timeout_secs)?;
        Ok(())
    }

    /// The API base URL, always ending in '/' so endpoints join below it
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let mut raw = self.api.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| ConfigError::Invalid(format!("api.base_url '{}': {}", self.api.base_url, e)))
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

/// Turns a timeout in (fractional) seconds into a Duration, rejecting
/// zero, negative and non-finite values.
pub fn probe_timeout(secs: f64) -> Result<Duration, ConfigError> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::Invalid(format!(
            "probe timeout must be a positive number of seconds, got {}",
            secs
        )));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| ConfigError::Invalid(format!("probe timeout {}: {}", secs, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = write_config(r#"{"account": {"token": "abc"}}"#);
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.account.token, "abc");
        assert_eq!(config.account.screen_name, None);
        assert_eq!(config.api.base_url, "https://api.twitter.com/1.1/");
        assert_eq!(config.api_timeout(), Duration::from_secs(30));
        assert_eq!(config.probe.timeout_secs, 2.0);
    }

    #[test]
    fn test_full_config() {
        let file = write_config(
            r#"{"api": {"base_url": "http://localhost:8080/v1", "timeout_secs": 5},
                "account": {"token": "abc", "screen_name": "me"},
                "probe": {"timeout_secs": 0.5}}"#,
        );
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.account.screen_name.as_deref(), Some("me"));
        assert_eq!(config.base_url().unwrap().as_str(), "http://localhost:8080/v1/");
        assert_eq!(probe_timeout(config.probe.timeout_secs).unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_malformed_json() {
        let file = write_config("{ not json");
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_account_section() {
        let file = write_config(r#"{"api": {}}"#);
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_empty_token_is_invalid() {
        let file = write_config(r#"{"account": {"token": "  "}}"#);
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_bad_probe_timeout() {
        assert!(probe_timeout(0.0).is_err());
        assert!(probe_timeout(-1.0).is_err());
        assert!(probe_timeout(f64::NAN).is_err());
        assert!(probe_timeout(f64::INFINITY).is_err());
        assert_eq!(probe_timeout(2.0).unwrap(), Duration::from_secs(2));
    }
}
