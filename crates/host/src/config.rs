//! Configuration system for settings-sync
//!
//! Reads config from ~/.config/settings-sync/config.toml

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub http_port: u16,
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            bind: "127.0.0.1".to_string(),
        }
    }
}

/// Settings document configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// JSON file served as /settings.json and updated by /changed
    pub path: PathBuf,
    /// Events buffered per subscriber before it starts lagging
    pub channel_capacity: usize,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("settings.json"),
            channel_capacity: 64,
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub settings: SettingsConfig,
}

const DEFAULT_CONFIG: &str = r#"# settings-sync Configuration

[server]
http_port = 8080
bind = "127.0.0.1"

[settings]
path = "settings.json"
channel_capacity = 64
"#;

impl Config {
    /// Load configuration from default path, falling back to defaults
    pub fn load() -> Self {
        let config_path = Self::default_config_path();
        if !config_path.exists() {
            return Self::default();
        }
        Self::load_from_path(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring config {}: {e:#}", config_path.display());
            Self::default()
        })
    }

    /// Get default config path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("settings-sync")
            .join("config.toml")
    }

    /// Load from specific path
    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Invalid config file")
    }

    /// Create default config file if it doesn't exist
    pub fn create_default_if_missing() {
        let path = Self::default_config_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = std::fs::write(&path, DEFAULT_CONFIG);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.settings.path, PathBuf::from("settings.json"));
    }

    #[test]
    fn test_default_file_matches_defaults() {
        let config = Config::parse(DEFAULT_CONFIG).expect("default config parses");
        assert_eq!(config.server.http_port, 8080);
        assert_eq!(config.settings.channel_capacity, 64);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse("[server]\nhttp_port = 9090\n").expect("valid toml");
        assert_eq!(config.server.http_port, 9090);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.settings.path, PathBuf::from("settings.json"));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings]\npath = \"/data/device.json\"\n").expect("write");

        let config = Config::load_from_path(&path).expect("loads");
        assert_eq!(config.settings.path, PathBuf::from("/data/device.json"));

        assert!(Config::load_from_path(&dir.path().join("missing.toml")).is_err());
        assert!(Config::parse("[server]\nhttp_port = \"x\"").is_err());
    }
}
