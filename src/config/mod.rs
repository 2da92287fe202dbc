//! Configuration management module.
//!
//! Handles loading and saving application configuration from JSON file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const CONFIG_FILE_NAME: &str = "sql_utf8_config.json";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory the file picker opens in.
    #[serde(default)]
    pub last_directory: String,
    /// Where auto-saved files go; empty means beside the source file.
    #[serde(default)]
    pub output_dir: String,
    /// Source encoding forced on every conversion; empty means auto-detect.
    #[serde(default)]
    pub encoding_hint: String,
    #[serde(default)]
    pub auto_save: bool,
    #[serde(default)]
    pub auto_copy: bool,
    #[serde(default = "default_extension")]
    pub allowed_extension: String,
}

fn default_extension() -> String {
    ".sql".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            last_directory: String::new(),
            output_dir: String::new(),
            encoding_hint: String::new(),
            auto_save: false,
            auto_copy: false,
            allowed_extension: default_extension(),
        }
    }
}

impl Config {
    /// The encoding hint to pass to the resolver, if any.
    pub fn hint(&self) -> Option<&str> {
        let hint = self.encoding_hint.trim();
        (!hint.is_empty()).then_some(hint)
    }
}

/// Configuration manager for loading/saving config.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_path(Self::get_exe_directory().join(CONFIG_FILE_NAME))
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Get the directory containing the executable.
    fn get_exe_directory() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Get the config file path.
    pub fn get_config_file_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from file.
    pub fn load(&self) -> Config {
        let mut config = self.try_load().unwrap_or_default();

        if config.allowed_extension.trim().is_empty() {
            config.allowed_extension = default_extension();
        }

        config
    }

    fn try_load(&self) -> Option<Config> {
        if !self.config_path.exists() {
            return None;
        }

        let content = fs::read_to_string(&self.config_path).ok()?;
        match serde_json::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %self.config_path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Save configuration to file.
    pub fn save(&self, config: &Config) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, json)?;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.auto_save);
        assert_eq!(config.allowed_extension, ".sql");
        assert_eq!(config.hint(), None);
    }

    #[test]
    fn test_hint() {
        let config = Config {
            encoding_hint: " cp866 ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.hint(), Some("cp866"));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let parsed: Config = serde_json::from_str(r#"{"auto_copy": true}"#).unwrap();
        assert!(parsed.auto_copy);
        assert_eq!(parsed.allowed_extension, ".sql");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join(CONFIG_FILE_NAME));
        let config = Config {
            output_dir: "/tmp/out".to_string(),
            encoding_hint: "koi8r".to_string(),
            auto_save: true,
            ..Default::default()
        };

        manager.save(&config).unwrap();
        assert_eq!(manager.load(), config);
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(ConfigManager::with_path(path).load(), Config::default());
    }
}
