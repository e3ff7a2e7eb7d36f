//! Store configuration via `apiary.toml`
//!
//! A small config file next to the data names the data file and the save
//! durability. Relative data file paths resolve against the directory the
//! config file was read from.

use apiary_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "apiary.toml";

/// Default data file name
pub const DEFAULT_DATA_FILE: &str = "DataFile.txt";

/// Store configuration loaded from `apiary.toml`.
///
/// # Example
///
/// ```toml
/// data_file = "DataFile.txt"
/// sync_on_save = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiaryConfig {
    /// Data file path; relative paths resolve against the config directory
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Fsync each save before it replaces the data file
    #[serde(default = "default_sync_on_save")]
    pub sync_on_save: bool,
    /// Directory the config was read from
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}

fn default_sync_on_save() -> bool {
    true
}

impl Default for ApiaryConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            sync_on_save: default_sync_on_save(),
            base_dir: None,
        }
    }
}

impl ApiaryConfig {
    /// Default config pointed at `data_file`, relative to the working directory
    pub fn for_data_file(data_file: impl Into<PathBuf>) -> Self {
        Self::default().with_data_file(data_file)
    }

    /// Replace the data file; a relative path now resolves against the
    /// working directory, not the config directory
    pub fn with_data_file(mut self, data_file: impl Into<PathBuf>) -> Self {
        self.data_file = data_file.into();
        self.base_dir = None;
        self
    }

    /// Set `sync_on_save`
    pub fn with_sync_on_save(mut self, sync_on_save: bool) -> Self {
        self.sync_on_save = sync_on_save;
        self
    }

    /// The data file path with any config-relative base applied
    pub fn data_path(&self) -> PathBuf {
        match &self.base_dir {
            Some(base) if self.data_file.is_relative() => base.join(&self.data_file),
            _ => self.data_file.clone(),
        }
    }

    /// Check field values.
    ///
    /// # Errors
    ///
    /// Returns a config error if `data_file` is empty.
    pub fn validate(&self) -> Result<()> {
        if self.data_file.as_os_str().is_empty() {
            return Err(Error::config("data_file must not be empty"));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Apiary store configuration
#
# Data file holding accounts, locations, hives and tasks.
# Relative paths resolve against the directory of this file.
data_file = "DataFile.txt"

# Fsync every save before it replaces the data file (default: true).
# Turning this off trades crash safety for faster saves.
sync_on_save = true
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns a config error if the file cannot be read, parsed or
    /// validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let mut config: ApiaryConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        config.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns whether the file was created.
    pub fn write_default_if_missing(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        std::fs::write(path, Self::default_toml()).map_err(|e| {
            Error::config(format!(
                "Failed to write default config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(true)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiary_core::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ApiaryConfig::default();
        assert_eq!(config.data_file, PathBuf::from("DataFile.txt"));
        assert!(config.sync_on_save);
        assert_eq!(config.data_path(), PathBuf::from("DataFile.txt"));
    }

    #[test]
    fn test_default_toml_parses_to_default() {
        let config: ApiaryConfig = toml::from_str(ApiaryConfig::default_toml()).unwrap();
        assert_eq!(config, ApiaryConfig::default());
    }

    #[test]
    fn test_relative_data_file_resolves_against_config_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "data_file = \"hives/data.txt\"\n").unwrap();

        let config = ApiaryConfig::from_file(&path).unwrap();
        assert_eq!(config.data_path(), dir.path().join("hives").join("data.txt"));
        assert!(config.sync_on_save);
    }

    #[test]
    fn test_absolute_data_file_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let data = dir.path().join("elsewhere.txt");
        let config = ApiaryConfig::for_data_file(&data).with_sync_on_save(false);
        config.write_to_file(&path).unwrap();

        let loaded = ApiaryConfig::from_file(&path).unwrap();
        assert_eq!(loaded.data_path(), data);
        assert!(!loaded.sync_on_save);
    }

    #[test]
    fn test_override_drops_config_base() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        ApiaryConfig::write_default_if_missing(&path).unwrap();

        let config = ApiaryConfig::from_file(&path)
            .unwrap()
            .with_data_file("local.txt");
        assert_eq!(config.data_path(), PathBuf::from("local.txt"));
    }

    #[test]
    fn test_write_default_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "sync_on_save = false\n").unwrap();

        assert!(!ApiaryConfig::write_default_if_missing(&path).unwrap());
        let config = ApiaryConfig::from_file(&path).unwrap();
        assert!(!config.sync_on_save);
        assert_eq!(config.data_file, PathBuf::from(DEFAULT_DATA_FILE));
    }

    #[test]
    fn test_bad_config_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        std::fs::write(&path, "sync_on_save = \"sometimes\"\n").unwrap();
        let err = ApiaryConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        std::fs::write(&path, "data_file = \"\"\n").unwrap();
        let err = ApiaryConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = ApiaryConfig::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
