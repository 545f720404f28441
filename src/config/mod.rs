use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::TransactionLensError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REFRESH_SECS: u64 = 30;

#[derive(Deserialize, Debug, Default, Clone)]
pub struct Config {
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub history_cache_path: Option<String>,
    pub history_refresh_secs: Option<u64>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, TransactionLensError> {
        let config_str = fs::read_to_string(path).map_err(|e| {
            TransactionLensError::ConfigError(format!("{}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, TransactionLensError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Applies `TRANSACTION_LENS_*` environment variables over the file values.
    pub fn apply_env(&mut self) -> Result<(), TransactionLensError> {
        if let Ok(url) = env::var("TRANSACTION_LENS_API_URL") {
            self.api_url = Some(url);
        }
        if let Ok(secs) = env::var("TRANSACTION_LENS_TIMEOUT_SECS") {
            let secs = secs.parse().map_err(|_| {
                TransactionLensError::ConfigError(format!(
                    "TRANSACTION_LENS_TIMEOUT_SECS is not a number: {}",
                    secs
                ))
            })?;
            self.request_timeout_secs = Some(secs);
        }
        if let Ok(path) = env::var("TRANSACTION_LENS_CACHE") {
            self.history_cache_path = Some(path);
        }
        Ok(())
    }

    pub fn get_api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// `None` when the timeout is configured as 0.
    pub fn get_request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn get_history_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.history_refresh_secs.unwrap_or(DEFAULT_REFRESH_SECS).max(1))
    }

    pub fn get_history_cache_path(&self) -> Result<PathBuf, TransactionLensError> {
        if let Some(path) = &self.history_cache_path {
            return Ok(PathBuf::from(path));
        }
        env::var("HOME")
            .map(|home| {
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("transaction_lens")
                    .join("history_cache.json")
            })
            .map_err(|_| {
                TransactionLensError::ConfigError(
                    "Could not find home directory; set history_cache_path".to_string(),
                )
            })
    }
}
