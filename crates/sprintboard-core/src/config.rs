use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENDPOINT_ENV: &str = "SPRINTBOARD_ENDPOINT";
pub const API_KEY_ENV: &str = "SPRINTBOARD_API_KEY";
pub const USER_ENV: &str = "SPRINTBOARD_USER";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Location of the data store. For the file-backed store this is a path.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Email of the signed-in user.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
}

/// The two values a data store connection is opened with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/sprintboard/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("sprintboard/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("sprintboard\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Self {
        let base = Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default();
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Read a config file, falling back to defaults when it is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Could not read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Apply environment-style overrides; `lookup` returns the value for a variable name.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(endpoint) = non_empty(ENDPOINT_ENV) {
            self.endpoint = Some(endpoint);
        }
        if let Some(key) = non_empty(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(user) = non_empty(USER_ENV) {
            self.user = Some(user);
        }
        self
    }

    pub fn default_endpoint() -> String {
        dirs::data_dir()
            .map(|dir| dir.join("sprintboard").join("store.json"))
            .unwrap_or_else(|| PathBuf::from("sprintboard.json"))
            .to_string_lossy()
            .into_owned()
    }

    pub fn effective_endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(Self::default_endpoint)
    }

    pub fn effective_poll_interval(&self) -> Duration {
        Duration::from_secs(
            self.poll_interval_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        )
    }

    pub fn remote(&self) -> RemoteConfig {
        if self.endpoint.is_none() {
            tracing::debug!("No endpoint configured, using local default store");
        }
        RemoteConfig {
            endpoint: self.effective_endpoint(),
            api_key: self.api_key.clone(),
        }
    }
}
