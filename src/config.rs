//! User preferences, stored as TOML in the platform config directory.

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured API key.
const API_KEY_ENV: &str = "TUBEFEED_API_KEY";

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    /// Override for the catalog base URL, mainly for testing against a stub.
    pub api_base_url: Option<String>,
    /// Override for the data directory holding the JSON store and logs.
    pub data_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Self {
        let mut config = Self::config_file_path()
            .and_then(|path| Self::read_from(&path))
            .unwrap_or_default();
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            config.api_key = Some(key);
        }
        config
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_file_path()
            .context("no config directory available on this platform")?;
        self.save_to(&path)
    }

    fn config_file_path() -> Option<PathBuf> {
        let proj_dirs = ProjectDirs::from("", "", "tubefeed")?;
        Some(proj_dirs.config_dir().join("prefs.toml"))
    }

    fn read_from(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        toml::from_str(&content).ok()
    }

    fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.toml");

        let config = Config {
            api_key: Some("abc123".to_string()),
            api_base_url: None,
            data_dir: Some(PathBuf::from("/tmp/tubefeed")),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::read_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_or_invalid_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::read_from(&dir.path().join("absent.toml")).is_none());

        let bad = dir.path().join("prefs.toml");
        std::fs::write(&bad, "not = [valid").unwrap();
        assert!(Config::read_from(&bad).is_none());
    }
}
