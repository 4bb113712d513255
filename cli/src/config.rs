//! CLI config file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use substrpc_core::SessionConfig;

use crate::tracing_setup::LogConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_url() -> String {
    "ws://127.0.0.1:9944".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            session: SessionConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
