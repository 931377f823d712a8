/// Application configuration
///
/// Read from `config.toml` in the user's config directory
/// (`~/.config/timetable-viewer/config.toml` on Linux) or from the file
/// named by `TIMETABLE_CONFIG`. Every field has a default, so a missing
/// file or a partial file is fine.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TimetableError};
use crate::state::preferences::DEFAULT_RETENTION_DAYS;

const APP_DIR: &str = "timetable-viewer";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "TIMETABLE_CONFIG";

/// Environment variable overriding the database URL
pub const DATABASE_URL_ENV: &str = "TIMETABLE_DATABASE_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the realtime document store
    pub database_url: String,
    /// Path of the record collection below the base URL; empty is the root
    pub collection: String,
    /// SQLite file holding the remembered filters
    pub preferences_path: PathBuf,
    /// Days a remembered filter value is kept
    pub retention_days: i64,
    /// First drawn row of the grid, "HH:MM"
    pub grid_start: String,
    /// Last drawn row of the grid, "HH:MM"
    pub grid_end: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "https://plan-zajec-3c0d7-default-rtdb.europe-west1.firebasedatabase.app"
                .to_string(),
            collection: String::new(),
            preferences_path: default_preferences_path(),
            retention_days: DEFAULT_RETENTION_DAYS,
            grid_start: "08:00".to_string(),
            grid_end: "20:00".to_string(),
        }
    }
}

fn default_preferences_path() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path.push("preferences.db");
    path
}

/// Default location of the config file, if a config directory exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

impl AppConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| TimetableError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            TimetableError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Load from `TIMETABLE_CONFIG` or the default location, then apply
    /// environment overrides. A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                tracing::info!("reading config from {}", path.display());
                Self::from_file(&path)?
            }
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            config.database_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject values the rest of the app cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(TimetableError::Config("database_url is empty".to_string()));
        }
        if self.retention_days <= 0 {
            return Err(TimetableError::Config(format!(
                "retention_days must be positive, got {}",
                self.retention_days
            )));
        }
        let start = crate::state::layout::parse_clock(&self.grid_start);
        let end = crate::state::layout::parse_clock(&self.grid_end);
        match (start, end) {
            (Some(start), Some(end)) if start < end => Ok(()),
            _ => Err(TimetableError::Config(format!(
                "grid window {}-{} is not a valid HH:MM range",
                self.grid_start, self.grid_end
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retention_days, 365);
        assert!(config.preferences_path.ends_with("timetable-viewer/preferences.db"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            collection = "plan"
            retention_days = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.collection, "plan");
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.grid_start, "08:00");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = AppConfig {
            retention_days: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Config);

        let config = AppConfig {
            grid_start: "20:00".into(),
            grid_end: "08:00".into(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "database_url = \"http://localhost:9000\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.database_url, "http://localhost:9000");

        std::fs::write(&path, "retention_days = \"lots\"\n").unwrap();
        assert_eq!(AppConfig::from_file(&path).unwrap_err().kind(), ErrorKind::Config);
    }
}
