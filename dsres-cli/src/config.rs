//! Configuration loading and parsing

use anyhow::{Context, Result};
use dsres_decoder::{ExtractorConfig, SignalSelection};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub trajectories: SignalSelection,
    #[serde(default)]
    pub finals: SignalSelection,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Write JSON here instead of stdout
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub pretty: bool,
}

impl AppConfig {
    /// Extractor configuration for the library
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig::new()
            .with_trajectories(self.trajectories.clone())
            .with_finals(self.finals.clone())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if config.trajectories.is_empty() && config.finals.is_empty() {
        log::warn!("Config {:?} selects no trajectories and no finals", path);
    }

    Ok(config)
}
