//! Optional `config.toml`.
//!
//! ```toml
//! data_dir = "/home/me/.content-tui"
//! export_dir = "/home/me/Downloads"
//! log_level = "info"
//! tick_rate_ms = 250
//! default_videos_per_day = 1
//! default_project_days = 10
//! ```
//!
//! Every key is optional. Unknown keys are rejected.

use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::model::{MAX_DEFAULT_PROJECT_DAYS, MAX_VIDEOS_PER_DAY};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("could not determine home directory")]
    NoHome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the database and log live. Defaults to `$HOME/.content-tui`.
    pub data_dir: Option<PathBuf>,
    /// Where backups are written. Defaults to the current directory.
    pub export_dir: Option<PathBuf>,
    pub log_level: String,
    pub tick_rate_ms: u64,
    pub default_videos_per_day: u32,
    pub default_project_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: None,
            export_dir: None,
            log_level: "warn".to_string(),
            tick_rate_ms: 250,
            default_videos_per_day: 1,
            default_project_days: 10,
        }
    }
}

impl Config {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_ms == 0 {
            return Err(ConfigError::Validation("tick_rate_ms must be positive".into()));
        }
        if self.default_videos_per_day == 0 || self.default_videos_per_day > MAX_VIDEOS_PER_DAY {
            return Err(ConfigError::Validation(format!(
                "default_videos_per_day must be 1-{}",
                MAX_VIDEOS_PER_DAY
            )));
        }
        if self.default_project_days > MAX_DEFAULT_PROJECT_DAYS {
            return Err(ConfigError::Validation(format!(
                "default_project_days must be at most {}",
                MAX_DEFAULT_PROJECT_DAYS
            )));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    let home_dir: PathBuf = env::var_os("HOME").ok_or(ConfigError::NoHome)?.into();
    Ok(home_dir.join(".content-tui"))
}
