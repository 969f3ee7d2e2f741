//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/focustrace/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/focustrace/` (~/.config/focustrace/)
//! - Data: `$XDG_DATA_HOME/focustrace/` (~/.local/share/focustrace/)
//! - State/Logs: `$XDG_STATE_HOME/focustrace/` (~/.local/state/focustrace/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Metrics aggregation configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metrics aggregation configuration
#[derive(Debug, Deserialize)]
pub struct MetricsConfig {
    /// Number of daily buckets retained per user
    #[serde(default = "default_window_days")]
    pub window_days: usize,

    /// Reload-and-retry rounds for conflicting metrics writes
    #[serde(default = "default_merge_retries")]
    pub merge_retries: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            merge_retries: default_merge_retries(),
        }
    }
}

fn default_window_days() -> usize {
    crate::types::WINDOW_DAYS
}

fn default_merge_retries() -> usize {
    crate::metrics::DEFAULT_MERGE_RETRIES
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate loaded settings
    pub fn validate(&self) -> Result<()> {
        if self.metrics.window_days == 0 {
            return Err(Error::Config(
                "metrics.window_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/focustrace/config.toml` (~/.config/focustrace/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("focustrace").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/focustrace/` (~/.local/share/focustrace/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("focustrace")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/focustrace/` (~/.local/state/focustrace/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("focustrace")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/focustrace/data.db` (~/.local/share/focustrace/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/focustrace/focustrace.log` (~/.local/state/focustrace/focustrace.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("focustrace.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.metrics.window_days, 30);
        assert_eq!(config.metrics.merge_retries, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[metrics]
window_days = 14
merge_retries = 3

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.metrics.window_days, 14);
        assert_eq!(config.metrics.merge_retries, 3);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_zero_window_rejected() {
        let config: Config = toml::from_str("[metrics]\nwindow_days = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_paths_end_with_app_dir() {
        assert!(Config::config_path().ends_with("focustrace/config.toml"));
        assert!(Config::database_path().ends_with("focustrace/data.db"));
    }
}
