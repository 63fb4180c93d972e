//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use sieve_core::{PoolConfig, ScoreParams};

/// Global configuration for sieve
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pool: PoolConfig,
    pub scoring: ScoreParams,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Append the unfiltered input table after the results
    pub show_input: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { show_input: true }
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./sieve.toml (current directory)
    /// 2. ~/.config/sieve/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("sieve.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "sieve") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.pool.workers, 4);
        assert_eq!(config.pool.queue_capacity, 10);
        assert_eq!(config.pool.result_capacity, 150);
        assert_eq!(config.scoring.divider, 5);
        assert_eq!(config.scoring.modifier, 2);
        assert!(config.report.show_input);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[pool]
workers = 2
queue_capacity = 4

[scoring]
modifier = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.pool.workers, 2);
        assert_eq!(config.pool.queue_capacity, 4);
        // unspecified keys keep their defaults
        assert_eq!(config.pool.result_capacity, 150);
        assert_eq!(config.scoring.divider, 5);
        assert_eq!(config.scoring.modifier, 3);
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sieve.toml");
        std::fs::write(&path, "[report]\nshow_input = false\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert!(!config.report.show_input);
    }

    #[test]
    fn from_file_missing_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read config file"));
    }

    #[test]
    fn from_file_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[pool\nworkers = ").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }
}
