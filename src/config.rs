use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, TrackerError};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize, Serialize, Default, Debug, Clone)]
pub struct Config {
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| TrackerError::ConfigRead {
                path: config_path.clone(),
                source: e,
            })?;

        Self::parse(&contents).map_err(|e| TrackerError::ConfigParse {
            path: config_path,
            source: e,
        })
    }

    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "taskboard")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(TrackerError::NoConfigDir)
    }

    /// Get API base URL with env var taking precedence over config file
    pub fn api_url(&self) -> Result<Url> {
        let raw = std::env::var("TASKBOARD_API_URL")
            .ok()
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        parse_base_url(&raw)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

/// Parse a base URL, normalising it to end with `/` so that relative joins
/// keep the path prefix (`/api/v1`).
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let normalised = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };

    let url = Url::parse(&normalised).map_err(|e| TrackerError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TrackerError::InvalidUrl(format!(
            "{raw}: unsupported scheme `{other}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.api_url.is_none());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
api_url = "https://tracker.example.com/api/v1"
request_timeout_secs = 5
log_level = "debug"
"#,
        )
        .unwrap();
        assert_eq!(
            config.api_url.as_deref(),
            Some("https://tracker.example.com/api/v1")
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("http://localhost:8080/api/v1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/");
        assert_eq!(
            url.join("tasks").unwrap().as_str(),
            "http://localhost:8080/api/v1/tasks"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_bad_input() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("ftp://example.com/").is_err());
    }
}
