use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend API, including the `/api` prefix
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_request_timeout_sec() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            request_timeout_sec: default_request_timeout_sec(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level filter (trace/debug/info/warn/error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional log file path; stderr is used when unset
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Environment variable overriding `api.base_url`, whatever the config file says.
pub const API_URL_ENV: &str = "CV_DESK_API_URL";

impl Config {
    /// Loads configuration from the given file, or from
    /// `<config_dir>/cv-desk/config.toml` when no path is given. A missing
    /// file yields the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            toml::from_str::<Config>(&contents)?
        } else {
            tracing::debug!("No config file at {:?}, using defaults", path);
            Config::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV)
            && !url.is_empty()
        {
            config.api.base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.api.base_url).map_err(|e| ConfigError::ValidationError {
            reason: format!("invalid api.base_url {:?}: {}", self.api.base_url, e),
        })?;
        if self.api.request_timeout_sec == 0 {
            return Err(ConfigError::ValidationError {
                reason: "api.request_timeout_sec must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn log_level(&self) -> &str {
        &self.log.level
    }

    pub fn log_file_path(&self) -> Option<&str> {
        self.log.file.as_deref()
    }
}

fn default_config_path() -> PathBuf {
    let mut path = dirs::config_dir()
        .unwrap_or_else(|| std::env::current_dir().expect("Current directory not accessible"));
    path.push("cv-desk");
    path.push("config.toml");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.request_timeout_sec, 30);
        assert_eq!(config.log.level, "info");
        assert!(config.log.file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_file_fills_defaults() {
        let toml_str = r#"
            [api]
            base_url = "https://cv.example.com/api"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://cv.example.com/api");
        assert_eq!(config.api.request_timeout_sec, 30);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = Config {
            api: ApiConfig {
                base_url: "not a url".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            api: ApiConfig {
                request_timeout_sec: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
                [api]
                base_url = "http://127.0.0.1:9000/api"
                request_timeout_sec = 5

                [log]
                level = "debug"
            "#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.api.request_timeout_sec, 5);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("missing.toml"))).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000/api");
    }
}
