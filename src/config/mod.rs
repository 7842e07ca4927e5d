use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ui::theme::ThemeName;

pub const APP_NAME: &str = "cassette";

const MAX_SEEK_STEP_SECS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: ThemeName,
    /// Step used by the seek keys, in seconds
    pub seek_step_secs: u64,
    /// Default filter when RUST_LOG is not set
    pub log_level: String,
    /// Base directory for relative paths typed into the add-song prompt
    pub music_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeName::default(),
            seek_step_secs: 5,
            log_level: "info".to_string(),
            music_dir: dirs::audio_dir(),
        }
    }
}

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
    pub created: bool,
}

pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not find config directory")?
        .join(APP_NAME);

    Ok(config_dir.join("config.yml"))
}

pub fn log_dir() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .context("Could not find cache directory")?
        .join(APP_NAME);
    Ok(dir)
}

/// Reads the config at `path`, writing the defaults there first if it does not exist.
pub fn load_or_create_config(path: Option<&Path>) -> Result<LoadedConfig> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let default_config = Config::default();
        let yaml =
            serde_yaml::to_string(&default_config).context("Failed to serialize default config")?;

        fs::write(&config_path, yaml).context("Failed to write default config file")?;

        return Ok(LoadedConfig {
            config: default_config,
            path: config_path,
            created: true,
        });
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;

    let config: Config = serde_yaml::from_str(&config_content)
        .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;

    if !(1..=MAX_SEEK_STEP_SECS).contains(&config.seek_step_secs) {
        anyhow::bail!(
            "seek_step_secs must be between 1 and {} in {}",
            MAX_SEEK_STEP_SECS,
            config_path.display()
        );
    }

    Ok(LoadedConfig {
        config,
        path: config_path,
        created: false,
    })
}
