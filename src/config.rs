//! Configuration
//!
//! Settings come from an optional JSON file with every field defaulted, then
//! environment overrides:
//! - `KICKLAB_API_URL`: backend base URL
//! - `KICKLAB_API_TIMEOUT_MS`: per-request timeout
//! - `KICKLAB_ASSET_URL`: prefix for relative engine/sample URLs

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::samples::{default_ir_bank, default_kick_bank, default_noise_bank, BankEntry};
use crate::error::{KicklabError, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KicklabConfig {
    pub backend: BackendConfig,
    pub engine: EngineConfig,
}

/// REST backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Audio engine startup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Prefix joined to relative URLs below
    pub asset_base_url: String,
    /// Engine bytecode sent with `init`
    pub script_url: String,
    /// Rendering worklet module
    pub worklet_url: String,
    /// How long to wait for the `ready` acknowledgement
    pub handshake_timeout_ms: u64,
    pub kick_bank: Vec<BankEntry>,
    pub noise_bank: Vec<BankEntry>,
    pub ir_bank: Vec<BankEntry>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset_base_url: String::new(),
            script_url: "/engine/kicklab-engine.js".to_string(),
            worklet_url: "/engine/kicklab-worklet.js".to_string(),
            handshake_timeout_ms: 10_000,
            kick_bank: default_kick_bank(),
            noise_bank: default_noise_bank(),
            ir_bank: default_ir_bank(),
        }
    }
}

impl EngineConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    /// Resolve a possibly relative URL against `asset_base_url`
    pub fn resolve(&self, url: &str) -> String {
        if self.asset_base_url.is_empty() || url.contains("://") {
            return url.to_string();
        }
        format!(
            "{}/{}",
            self.asset_base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }
}

impl KicklabConfig {
    /// Load from a JSON file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: KicklabConfig =
            serde_json::from_str(&content).map_err(|e| KicklabError::Config {
                reason: format!("{}: {}", path.display(), e),
            })?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Defaults plus environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = env::var("KICKLAB_API_URL") {
            self.backend.base_url = url;
        }
        if let Ok(raw) = env::var("KICKLAB_API_TIMEOUT_MS") {
            self.backend.timeout_ms = raw.parse().map_err(|_| KicklabError::Config {
                reason: format!("KICKLAB_API_TIMEOUT_MS is not a number: {raw}"),
            })?;
        }
        if let Ok(url) = env::var("KICKLAB_ASSET_URL") {
            self.engine.asset_base_url = url;
        }
        Ok(())
    }
}
