//! Application configuration.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::registry::DEFAULT_MAX_BUSES;

/// Directory under the user config root holding BusTUI files.
pub const CONFIG_DIR: &str = "bustui";
/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.json";

/// Settings loaded at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Maximum number of buses the registry accepts.
    #[serde(default = "default_max_buses")]
    pub max_buses: usize,
}

fn default_max_buses() -> usize {
    DEFAULT_MAX_BUSES
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_buses: DEFAULT_MAX_BUSES,
        }
    }
}

impl AppConfig {
    /// Default config file location under the user's config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join(CONFIG_FILE)
    }

    /// Loads the config from the default location, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Loads the config from the given path; a missing file yields the
    /// defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Persists the config to the given path, creating parent
    /// directories if needed.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let serialized = serde_json::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write config {}", path.display()))
    }
}

/// Writes a default config file at the default location if none
/// exists yet.
pub fn ensure_default_config() -> Result<()> {
    let path = AppConfig::default_path();
    if path.exists() {
        return Ok(());
    }
    AppConfig::default().persist(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.json"))?;
        assert_eq!(config.max_buses, DEFAULT_MAX_BUSES);
        Ok(())
    }

    #[test]
    fn persist_and_reload_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = AppConfig { max_buses: 4 };
        config.persist(&path)?;

        let loaded = AppConfig::load_from(&path)?;
        assert_eq!(loaded.max_buses, 4);
        Ok(())
    }

    #[test]
    fn partial_file_fills_in_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{}")?;

        let loaded = AppConfig::load_from(&path)?;
        assert_eq!(loaded.max_buses, DEFAULT_MAX_BUSES);
        Ok(())
    }
}
