//! Configuration file locations and load/save plumbing.
//!
//! The file format is INI with one section per source. A missing file is
//! not an error; loading one yields the default configuration so first runs
//! work without any setup.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::builder::Configuration;
use super::parser;

/// Directory under the user's home directory holding tracker files.
pub const CONFIG_DIR_NAME: &str = ".envtracker";

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors from reading or writing a configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read configuration file: {0}")]
    Read(#[from] ini::Error),

    #[error("failed to write configuration file: {0}")]
    Write(#[from] std::io::Error),

    #[error("invalid value for {section}.{key}: '{value}' ({reason})")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// Returns the tracker's configuration directory, `~/.envtracker`.
///
/// Falls back to the current directory when no home directory exists.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Returns the default configuration file path.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

impl Configuration {
    /// Loads the configuration from the default path.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Loads a configuration from `path`.
    ///
    /// A missing file yields [`Configuration::default`]. Sections and keys
    /// absent from the file keep their default values; unknown sections and
    /// keys are ignored.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Configuration::default());
        }
        let ini = Ini::load_from_file(path)?;
        parser::from_ini(&ini)
    }

    /// Saves the configuration to the default path, creating the config
    /// directory if needed.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let dir = config_directory();
        std::fs::create_dir_all(&dir)?;
        self.save_to(&dir.join(CONFIG_FILE_NAME))
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        parser::to_ini(self).write_to_file(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::params::WifiParams;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("does-not-exist.ini");

        let config = Configuration::load_from(&path).unwrap();

        assert_eq!(config, Configuration::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");

        let config = Configuration::builder()
            .use_gps(false)
            .use_bluetooth(true)
            .wifi(WifiParams::new(2_500))
            .build();

        config.save_to(&path).unwrap();
        let loaded = Configuration::load_from(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_reports_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[wifi]\nenabled = maybe\n").unwrap();

        let err = Configuration::load_from(&path).unwrap_err();

        match err {
            ConfigFileError::InvalidValue { section, key, value, .. } => {
                assert_eq!(section, "wifi");
                assert_eq!(key, "enabled");
                assert_eq!(value, "maybe");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_config_paths() {
        let dir = config_directory();
        assert!(dir.ends_with(CONFIG_DIR_NAME));

        let path = config_file_path();
        assert!(path.ends_with(CONFIG_FILE_NAME));
        assert!(path.starts_with(&dir));
    }
}
