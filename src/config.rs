//! Host Configuration
//!
//! Where relative resources live: the site origin, an optional base path
//! the site is mounted under, and a local directory for non-HTTP candidates.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Invalid config {0}: {1}")]
    Parse(PathBuf, serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostConfig {
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub base_path: String,
    #[serde(default)]
    pub asset_root: Option<PathBuf>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    format!("forgeraster/{}", crate::ENGINE_VERSION)
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            origin: None,
            base_path: String::new(),
            asset_root: None,
            user_agent: default_user_agent(),
        }
    }
}

impl HostConfig {
    /// Load from a JSON file. A missing file means defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(path.to_path_buf(), e)),
        };
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = Some(root.into());
        self
    }

    /// Origin without a trailing slash, if one is set
    pub fn normalized_origin(&self) -> Option<&str> {
        self.origin
            .as_deref()
            .map(|o| o.trim_end_matches('/'))
            .filter(|o| !o.is_empty())
    }

    /// Base path as `/segment`, or `None` when it is empty or just `/`
    pub fn normalized_base_path(&self) -> Option<String> {
        let trimmed = self.base_path.trim().trim_matches('/');
        if trimmed.is_empty() {
            None
        } else {
            Some(format!("/{}", trimmed))
        }
    }
}
