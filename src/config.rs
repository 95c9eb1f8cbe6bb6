//! Store configuration
//!
//! Loaded from a JSON file:
//!
//! ```json
//! { "path_to_tables": "./database/tables", "log_events": false }
//! ```
//!
//! Table files resolve to `<path_to_tables>/<table>.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{Event, Logger};

/// Extension of every table file.
pub const TABLE_FILE_EXTENSION: &str = "json";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "JSONTABLE_CONFIG_READ_FAILED",
            ConfigError::Parse { .. } => "JSONTABLE_CONFIG_INVALID_JSON",
            ConfigError::Invalid(_) => "JSONTABLE_CONFIG_INVALID",
        }
    }
}

/// Result type for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Table directory and logging switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one `<table>.json` file per record kind
    #[serde(default = "default_path_to_tables")]
    pub path_to_tables: String,

    /// Emit structured log lines for writes (default: false)
    #[serde(default)]
    pub log_events: bool,
}

fn default_path_to_tables() -> String {
    "./tables".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path_to_tables: default_path_to_tables(),
            log_events: false,
        }
    }
}

impl StoreConfig {
    /// Creates a config for the given tables directory, logging disabled.
    pub fn new(path_to_tables: impl Into<String>) -> Self {
        Self {
            path_to_tables: path_to_tables.into(),
            log_events: false,
        }
    }

    /// Enables or disables structured log lines.
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_events = enabled;
        self
    }

    /// Loads and validates configuration from a JSON file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: StoreConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;

        if config.log_events {
            Logger::info(
                Event::ConfigLoaded.as_str(),
                &[
                    ("config", &path.display().to_string()),
                    ("path_to_tables", &config.path_to_tables),
                ],
            );
        }

        Ok(config)
    }

    /// Rejects configurations that cannot resolve table paths.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.path_to_tables.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "path_to_tables must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the tables directory.
    pub fn tables_dir(&self) -> &Path {
        Path::new(&self.path_to_tables)
    }

    /// Resolves the file path of a table.
    pub fn table_path(&self, table: &str) -> PathBuf {
        Self::table_path_in(self.tables_dir(), table)
    }

    /// Resolves the file path of a table inside `dir`.
    pub fn table_path_in(dir: &Path, table: &str) -> PathBuf {
        dir.join(format!("{}.{}", table, TABLE_FILE_EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.path_to_tables, "./tables");
        assert!(!config.log_events);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_table_path() {
        let config = StoreConfig::new("/srv/tables");
        assert_eq!(
            config.table_path("samples"),
            PathBuf::from("/srv/tables/samples.json")
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jsontable.json");
        fs::write(&path, r#"{"path_to_tables": "/srv/tables"}"#).unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.path_to_tables, "/srv/tables");
        assert!(!config.log_events);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = StoreConfig::load(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.code(), "JSONTABLE_CONFIG_READ_FAILED");
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jsontable.json");
        fs::write(&path, "{not json").unwrap();

        let err = StoreConfig::load(&path).unwrap_err();
        assert_eq!(err.code(), "JSONTABLE_CONFIG_INVALID_JSON");
    }

    #[test]
    fn test_empty_tables_path_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("jsontable.json");
        fs::write(&path, r#"{"path_to_tables": "  "}"#).unwrap();

        let err = StoreConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
