use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::efivar::DEFAULT_EFIVARS_DIR;
use crate::partition::DEFAULT_DISK_DIR;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    efivars_dir: PathBuf,
    disk_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self { efivars_dir: PathBuf::from(DEFAULT_EFIVARS_DIR), disk_dir: PathBuf::from(DEFAULT_DISK_DIR) }
    }
}

impl Config {
    /// Directory where efivarfs is mounted.
    pub fn efivars_dir(&self) -> &Path {
        &self.efivars_dir
    }

    /// Root of the udev `by-*` link directories.
    pub fn disk_dir(&self) -> &Path {
        &self.disk_dir
    }

    /// Loads `path` as JSON, or the built-in defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let Some(path) = path else {
            return Ok(Config::default());
        };
        let config = fs::read(path).with_context(|| format!("Cannot read config file {}", path.display()))?;
        let config = String::from_utf8_lossy(&config);
        let config = serde_json::from_str::<Config>(&config)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }
}
