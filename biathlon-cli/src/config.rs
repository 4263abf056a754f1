//! Configuration loading
//!
//! Reads the competition configuration from a JSON file and validates it
//! before any event is processed.

use anyhow::{Context, Result};
use biathlon_core::CompetitionConfig;
use std::fs;
use std::path::Path;

/// Load and validate the competition configuration from a JSON file
pub fn load_config(path: &Path) -> Result<CompetitionConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: CompetitionConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    log::debug!("Configuration loaded: {:?}", config);
    Ok(config)
}
