// Server configuration
//
// Settings are read from ~/.diliguard/config.toml and may be overridden by
// DILIGUARD_* environment variables. The config file holds the webhook and
// store endpoints plus their credentials; it should be gitignored wherever
// it is checked out.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings stored in ~/.diliguard/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiliguardConfig {
    /// Research automation webhook endpoint
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Base URL of the hosted record store's collection API
    #[serde(default)]
    pub store_url: Option<String>,
    /// API key for the record store
    #[serde(default)]
    pub store_api_key: Option<String>,
    /// Fixed auth token for the server session (random when unset)
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl DiliguardConfig {
    /// Get the config file path (~/.diliguard/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".diliguard").join("config.toml"))
    }

    /// Load from the default location, then apply env overrides
    pub fn load() -> Result<Self> {
        let path =
            Self::default_path().ok_or_else(|| anyhow!("Could not determine home directory"))?;
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path (missing file yields defaults)
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: DiliguardConfig = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DILIGUARD_WEBHOOK_URL") {
            self.webhook_url = Some(url);
        }
        if let Ok(url) = std::env::var("DILIGUARD_STORE_URL") {
            self.store_url = Some(url);
        }
        if let Ok(key) = std::env::var("DILIGUARD_STORE_API_KEY") {
            self.store_api_key = Some(key);
        }
        if let Ok(token) = std::env::var("DILIGUARD_AUTH_TOKEN") {
            self.auth_token = Some(token);
        }
    }

    /// Whether the hosted store is configured (otherwise the server runs on
    /// the in-process store)
    pub fn has_remote_store(&self) -> bool {
        self.store_url.is_some() && self.store_api_key.is_some()
    }
}
