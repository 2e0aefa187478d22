//! Configuration management for the Formica CLI.

use anyhow::{Context, Result};
use formica::prelude::{ColonyConfig, TuningPatch};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "formica.toml";
pub const DATA_DIR: &str = ".formica";

/// Formica project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// World size and pass cadences for newly founded colonies.
    #[serde(default)]
    pub colony: ColonyConfig,
    /// Parameter overrides merged into newly founded colonies.
    #[serde(default)]
    pub tuning: TuningPatch,
    #[serde(default)]
    pub run: RunConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Frames advanced by `formica run` without `--ticks`.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Wall-clock budget per run in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_ms: Option<u64>,
}

fn default_ticks() -> u64 { 1_800 }

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            budget_ms: None,
        }
    }
}

impl Config {
    /// Load config from formica.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Find formica.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Get the Formica data directory (.formica/).
pub fn data_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join(DATA_DIR))
}

/// Get the sessions directory.
pub fn sessions_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("sessions"))
}

/// Get the current colony checkpoint path.
pub fn current_session_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("current.json"))
}
