//! Runtime configuration for the `schoolplanner` binary.
//!
//! Values resolve in order: command-line flag (or its environment variable),
//! TOML config file, platform default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "schoolplanner";
const DB_FILE_NAME: &str = "schoolplanner.sqlite3";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Optional settings read from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub db_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file `{}`", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("invalid config file `{}`", path.display()))
    }

    /// Loads an explicit config path, or the default one when it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }
}

/// Command-line values that override the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub db_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Result<Self> {
        let data_dir = default_data_dir();
        let db_path = overrides
            .db_path
            .or(file.db_path)
            .unwrap_or_else(|| data_dir.join(DB_FILE_NAME));
        let log_dir = overrides
            .log_dir
            .or(file.log_dir)
            .unwrap_or_else(|| data_dir.join("logs"));
        let log_level = overrides
            .log_level
            .or(file.log_level)
            .unwrap_or_else(|| schoolplanner_core::default_log_level().to_string());

        Ok(Self {
            db_path,
            log_dir: absolutize(log_dir)?,
            log_level,
        })
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn absolutize(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(path))
}
