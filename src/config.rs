//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which currently holds the API endpoint and an optional data directory
//! override (used by tests and portable installs).
//!
//! Configuration is stored at `~/.config/intercom-tui/config.json`.
//! `INTERCOM_API_URL` overrides the endpoint at startup.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "intercom-tui";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default API endpoint. The intercom server serves its API under `/api`.
const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080/api";

/// Environment variable overriding the configured endpoint
const ENDPOINT_ENV: &str = "INTERCOM_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;

        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            if !endpoint.is_empty() {
                config.endpoint = endpoint;
            }
        }

        Ok(config)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Whether a config file has been written yet
    pub fn exists() -> Result<bool> {
        Ok(Self::config_path()?.exists())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the token slot and log files
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let config = Config::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:8080/api");
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = Config {
            endpoint: "http://intercom.local/api".to_string(),
            data_dir: None,
        };
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.endpoint, "http://intercom.local/api");
        assert!(loaded.data_dir.is_none());
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = Config::load_from(&dir.path().join(CONFIG_FILE)).expect("load");
        assert_eq!(loaded.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_data_dir_override() {
        let config = Config {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            data_dir: Some(PathBuf::from("/tmp/intercom-test")),
        };
        assert_eq!(
            config.data_dir().expect("data dir"),
            PathBuf::from("/tmp/intercom-test")
        );
    }
}
