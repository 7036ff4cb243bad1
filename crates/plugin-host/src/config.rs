//! Plugin configuration storage
//!
//! One JSON file holds the engine limits, the generation service settings
//! and the request timeout. A missing file means defaults.

use std::path::Path;

use generation::GenerationConfig;
use selection_engine::SelectionConfig;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{PluginError, Result};

/// Default wait for a reply before the bridge falls back
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Full plugin configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginConfig {
    pub selection: SelectionConfig,
    pub generation: GenerationConfig,
    /// How long a bridged request waits before resolving with its default
    pub request_timeout_ms: u64,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            generation: GenerationConfig::default(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl PluginConfig {
    /// Load configuration from disk
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No configuration at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).await?;
        serde_json::from_str(&contents).map_err(|err| PluginError::parse("config", err))
    }

    /// Save configuration to disk
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|err| PluginError::parse("config", err))?;
        fs::write(path, contents).await?;

        log::info!("Configuration saved to {:?}", path);
        Ok(())
    }
}
