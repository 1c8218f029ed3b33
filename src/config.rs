//! Plugin configuration (`<home>/config.toml`)
//!
//! Missing file means defaults, written out so the user has something to edit.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths;
use crate::storage::StoreConfig;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// When false the host bridge registers nothing
    pub enabled: bool,
    /// Inject the short reminder every N turns of a session
    pub reminder_interval: u32,
    pub storage: StorageConfig,
    pub embeddings: EmbeddingsConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Durable,
    Transient,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Pattern log location; `~` and `$VARS` are expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            reminder_interval: 10,
            storage: StorageConfig::default(),
            embeddings: EmbeddingsConfig::default(),
        }
    }
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load from `<home>/config.toml`, creating it with defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Self::create_default(path);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML: {}", path.display()))
    }

    fn create_default(path: &Path) -> Result<Self> {
        let config = Self::default();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let body = toml::to_string_pretty(&config).context("Failed to serialize default config")?;
        std::fs::write(path, format!("# BrainGuard configuration\n{}", body))
            .with_context(|| format!("Failed to write default config: {}", path.display()))?;

        Ok(config)
    }

    /// Resolved pattern log path
    pub fn log_path(&self) -> PathBuf {
        self.storage
            .path
            .as_deref()
            .map(paths::expand)
            .unwrap_or_else(paths::pattern_log_path)
    }

    /// Store selection derived from the `[storage]` table
    pub fn store_config(&self) -> StoreConfig {
        match self.storage.backend {
            BackendKind::Durable => StoreConfig::Durable {
                path: self.log_path(),
            },
            BackendKind::Transient => StoreConfig::Transient,
        }
    }
}
