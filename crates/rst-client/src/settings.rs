//! Client settings - persisted connection preferences.
//!
//! Stored as TOML in the user's config directory. A missing or unreadable
//! file yields the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Default computation server.
pub const DEFAULT_SERVER_BASE: &str = "http://localhost:8080";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the computation server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the server, without a trailing `/projects`.
    pub server_base: String,

    /// Per-request timeout. Values below one second are raised to one.
    pub request_timeout_secs: u64,

    /// Filter applied to every tab until the user types one.
    pub default_filter: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_base: DEFAULT_SERVER_BASE.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            default_filter: String::new(),
        }
    }
}

impl ClientSettings {
    /// Load settings from the default path.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from a specific path.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to the default path.
    ///
    /// # Errors
    ///
    /// See [`save_to`](Self::save_to).
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save settings to a specific path, creating its directory.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Settings`] if the directory or file cannot be
    /// written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let fail = |operation: &'static str, reason: String| ClientError::Settings {
            operation,
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| fail("create", e.to_string()))?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| fail("serialize", e.to_string()))?;
        std::fs::write(path, content).map_err(|e| fail("write", e.to_string()))
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("pl", "RuleStudio", "RuleStudio")
            .map(|dirs| dirs.config_dir().join("client.toml"))
            .unwrap_or_else(|| PathBuf::from("client.toml"))
    }

    /// Override the server base.
    #[must_use]
    pub fn with_server(mut self, server_base: impl Into<String>) -> Self {
        self.server_base = server_base.into();
        self
    }

    /// Request timeout, never shorter than one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
