//! CLI configuration file support
//!
//! Loads configuration from ~/.config/chatbench/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cli::DEFAULT_SERVER_URL;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Server to talk to when `--server` is not given
    pub server_url: Option<String>,
    /// Preset applied to `chat` when `--preset` is not given
    pub default_preset: Option<String>,
}

impl CliConfig {
    /// Load configuration from default path
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Load configuration from a specific path. A missing or unreadable file
    /// yields the defaults.
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "Ignoring invalid config");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("chatbench").join("config.toml"))
    }

    /// Flag (or `CHATBENCH_SERVER_URL`) first, then the file, then the default.
    pub fn server_url(&self, flag: Option<&str>) -> String {
        flag.or(self.server_url.as_deref())
            .unwrap_or(DEFAULT_SERVER_URL)
            .to_string()
    }
}
