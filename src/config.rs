//! Client Configuration
//!
//! Persisted as `client_config.json` in the application's data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{DomainError, DomainResult};

pub const CONFIG_FILE_NAME: &str = "client_config.json";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 15_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root; request paths are appended to it
    pub base_url: String,
    pub request_timeout_ms: u64,
    /// Where credentials are kept between runs. `None` keeps them in memory.
    pub credentials_path: Option<PathBuf>,
    /// Directory for the rolling log file. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            credentials_path: None,
            log_dir: None,
        }
    }
}

pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Read the saved configuration. Missing or unreadable files yield `None`.
pub fn load_client_config(dir: &Path) -> Option<ClientConfig> {
    let path = config_path(dir);
    let content = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), "ignoring malformed client config: {}", e);
            None
        }
    }
}

pub fn save_client_config(dir: &Path, config: &ClientConfig) -> DomainResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| DomainError::Internal(format!("Failed to create {}: {}", dir.display(), e)))?;
    let content = serde_json::to_string_pretty(config)?;
    let path = config_path(dir);
    std::fs::write(&path, content).map_err(|e| DomainError::Internal(format!("Failed to write {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_client_config(dir.path()), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            base_url: "https://boards.example.com/api".to_string(),
            credentials_path: Some(dir.path().join("credentials.json")),
            ..ClientConfig::default()
        };
        save_client_config(dir.path(), &config).unwrap();
        assert_eq!(load_client_config(dir.path()), Some(config));
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(config_path(dir.path()), r#"{"request_timeout_ms": 500}"#).unwrap();
        let config = load_client_config(dir.path()).unwrap();
        assert_eq!(config.request_timeout_ms, 500);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn test_malformed_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(config_path(dir.path()), "{not json").unwrap();
        assert_eq!(load_client_config(dir.path()), None);
    }
}
