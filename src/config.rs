use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::process::terminator::DEFAULT_GRACE_PERIOD;

const APP_DIR: &str = "group-launcher";
const CONFIG_FILE: &str = "config.json";
const GROUPS_FILE: &str = "software_groups.json";

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub termination: TerminationConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct StorageConfig {
    /// Overrides the default location of the group file.
    #[serde(default)]
    pub groups_file: Option<PathBuf>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TerminationConfig {
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
}

fn default_grace_period_ms() -> u64 {
    DEFAULT_GRACE_PERIOD.as_millis() as u64
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: default_grace_period_ms(),
        }
    }
}

impl TerminationConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

impl Config {
    pub fn groups_path(&self) -> PathBuf {
        self.storage
            .groups_file
            .clone()
            .unwrap_or_else(|| app_dir().join(GROUPS_FILE))
    }
}

fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

pub fn get_config_path() -> PathBuf {
    app_dir().join(CONFIG_FILE)
}

pub fn load_or_create_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = fs::read_to_string(path).context("failed to read config file")?;
        serde_json::from_str::<Config>(&content).context("failed to parse config file")
    } else {
        let config = Config::default();
        save_config(path, &config)?;
        Ok(config)
    }
}

pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    let content = serde_json::to_string_pretty(config).context("failed to serialize config")?;
    fs::write(path, content).context("failed to write config file")?;
    Ok(())
}
