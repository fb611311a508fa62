//! Config persistence and path resolution for `Config`.
//!
//! Covers:
//! - `load_from` (YAML file I/O, defaults written on first run)
//! - `save_to` (atomic write via temp file + rename)
//! - XDG-style path helpers (`config_dir`, `config_path`, `state_dir`)

use super::Config;
use crate::error::ConfigError;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Load configuration from a specific path
    ///
    /// A missing file yields the defaults, which are written back so the user
    /// has a file to edit. An existing file must parse; callers validate once
    /// command-line overrides are applied.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Config path: {:?}", path);

        if !path.exists() {
            log::info!("Config file not found, creating default at {:?}", path);
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                // Running with defaults is still useful on a read-only home.
                log::warn!("Failed to save default config: {}", e);
            }
            return Ok(config);
        }

        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml_ng::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(self)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Get the configuration directory path (`~/.config/par-mux`)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir()
                .map(|d| d.join("par-mux"))
                .unwrap_or_else(|| PathBuf::from("."))
        }
        #[cfg(not(target_os = "windows"))]
        {
            dirs::home_dir()
                .map(|h| h.join(".config").join("par-mux"))
                .unwrap_or_else(|| PathBuf::from("."))
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the directory holding per-session state (stored layouts)
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::cache_dir)
            .map(|d| d.join("par-mux"))
            .unwrap_or_else(|| Self::config_dir().join("state"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_writes_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("config.yaml");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        let config = Config::new()
            .with_bridge_url("wss://bridge.internal/ssh")
            .with_dimensions(132, 43)
            .with_layout_expiry_secs(60);
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!path.with_extension("yaml.tmp").exists());
    }

    #[test]
    fn test_load_corrupt_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "cols: [[[").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_leaves_validation_to_caller() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "bridge_url: ftp://nope\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.bridge_url, "ftp://nope");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }
}
