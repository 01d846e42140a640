use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings for talking to the remote notification API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the backend. Endpoint paths are appended to it, so
    /// `https://host/api` and `https://host/api/` are equivalent.
    pub base_url: String,
    /// Per-request timeout in seconds. `None` keeps the HTTP client's
    /// default, which never times out.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000/api".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Where on-device state is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the key-value files. Falls back to the platform's
    /// data directory for the application.
    pub data_dir: Option<PathBuf>,
}

/// Behaviour of the navigation dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// How many route requests are held while the navigation container is
    /// not mounted yet. The oldest request is dropped on overflow.
    pub pending_capacity: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self { pending_capacity: 8 }
    }
}

/// Reconciliation behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Fetch from the server as soon as the backend starts.
    pub refresh_on_start: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            refresh_on_start: true,
        }
    }
}

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub navigation: NavigationConfig,
    pub sync: SyncConfig,
}
