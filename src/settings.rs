//! Persistent settings for the dashboard client.

use crate::api::{
    Resource, DEFAULT_API_URL, DEFAULT_PAGE_SIZE, DEFAULT_RECENT_JOBS_LIMIT, DEFAULT_TIME_RANGE,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides the backend base URL.
pub const API_URL_ENV: &str = "ETL_DASHBOARD_API_URL";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to create config directory: {0}")]
    CreateDir(#[source] std::io::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write settings file: {0}")]
    Write(#[source] std::io::Error),
}

/// All persistable client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the backend, without a trailing slash.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Polling interval overrides in seconds; `0` turns polling off.
    #[serde(default)]
    pub refresh_overrides: BTreeMap<Resource, u64>,

    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    #[serde(default = "default_time_range")]
    pub default_time_range: String,

    #[serde(default = "default_recent_jobs_limit")]
    pub recent_jobs_limit: u32,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_time_range() -> String {
    DEFAULT_TIME_RANGE.to_string()
}

fn default_recent_jobs_limit() -> u32 {
    DEFAULT_RECENT_JOBS_LIMIT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            refresh_overrides: BTreeMap::new(),
            default_page_size: DEFAULT_PAGE_SIZE,
            default_time_range: default_time_range(),
            recent_jobs_limit: DEFAULT_RECENT_JOBS_LIMIT,
        }
    }
}

impl Settings {
    /// Get the path to the settings file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("etl-dashboard");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from the config directory, then apply the environment
    /// override. Never fails: missing or invalid files yield defaults.
    pub fn load() -> Self {
        let settings = match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        };
        settings.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    /// Load settings from `path`, returning defaults if the file doesn't exist or is invalid
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            // File doesn't exist yet, that's fine
            Err(_) => return Self::default(),
        };

        match serde_json::from_str::<Settings>(&contents) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {:?}", path);
                settings.normalized()
            }
            Err(e) => {
                tracing::warn!("Failed to parse settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Replace `api_url` when an override is present and non-empty.
    #[must_use]
    pub fn with_api_url_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!("Using API URL from {}: {}", API_URL_ENV, url);
            self.api_url = url.trim().to_string();
        }
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        self.api_url = self.api_url.trim_end_matches('/').to_string();
        if self.default_page_size == 0 {
            self.default_page_size = DEFAULT_PAGE_SIZE;
        }
        self
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(SettingsError::CreateDir)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(SettingsError::Write)?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let settings = Settings::default();
        assert_eq!(settings.api_url, "http://localhost:8000");
        assert_eq!(settings.default_page_size, 10);
        assert_eq!(settings.default_time_range, "24h");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn invalid_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = Settings::default();
        settings.api_url = "https://etl.internal/".to_string();
        settings.refresh_overrides.insert(Resource::ProcessingJobs, 15);
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.api_url, "https://etl.internal");
        assert_eq!(loaded.refresh_overrides.get(&Resource::ProcessingJobs), Some(&15));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"refresh_overrides":{"system_health":60}}"#).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.api_url, "http://localhost:8000");
        assert_eq!(loaded.refresh_overrides.get(&Resource::SystemHealth), Some(&60));
    }

    #[test]
    fn env_override_wins_unless_blank() {
        let settings = Settings::default()
            .with_api_url_override(Some("http://etl-backend:9000/".to_string()));
        assert_eq!(settings.api_url, "http://etl-backend:9000");

        let settings = Settings::default().with_api_url_override(Some("  ".to_string()));
        assert_eq!(settings.api_url, "http://localhost:8000");
    }
}
