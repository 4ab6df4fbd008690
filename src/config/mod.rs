//! Configuration management

use crate::attendance::DEFAULT_CAPACITY;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub attendance: AttendanceConfig,
    pub console: ConsoleConfig,
}

/// Attendance tracker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttendanceConfig {
    /// Capacity of events created without an explicit one
    pub default_capacity: u32,
}

impl Default for AttendanceConfig {
    fn default() -> Self {
        Self {
            default_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Console front end settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Prompt shown in interactive mode
    pub prompt: String,

    /// Print a line whenever a tracker reports a change
    pub echo_notifications: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: "rollcall> ".to_string(),
            echo_notifications: true,
        }
    }
}

impl Config {
    /// Load config from the default location, or return defaults if not found
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(config)
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rollcall")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.attendance.default_capacity, 100);
        assert_eq!(config.console.prompt, "rollcall> ");
        assert!(config.console.echo_notifications);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[attendance]\ndefault_capacity = 25\n").unwrap();
        assert_eq!(config.attendance.default_capacity, 25);
        assert_eq!(config.console, ConsoleConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }
}
