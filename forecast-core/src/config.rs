use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::time::CalendarZone;

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Where "use my location" gets its position from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationSourceKind {
    /// Approximate position from the public IP address.
    #[default]
    Ip,
    /// No position capability; location requests fail as unsupported.
    #[serde(rename = "none")]
    Disabled,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// zone = "local"
/// location_source = "ip"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,

    /// Override for the forecast API root, mainly for testing against a proxy.
    pub base_url: Option<String>,

    /// Calendar zone used for day grouping: "local", "utc" or "+HH:MM".
    pub zone: Option<String>,

    #[serde(default)]
    pub location_source: LocationSourceKind,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key from `OPENWEATHER_API_KEY`, falling back to the stored key.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with_env(&self, env: Option<String>) -> Option<String> {
        env.into_iter()
            .chain(self.api_key.clone())
            .map(|k| k.trim().to_string())
            .find(|k| !k.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Calendar zone for day grouping; defaults to the host timezone.
    pub fn calendar_zone(&self) -> Result<CalendarZone> {
        match self.zone.as_deref() {
            Some(zone) => zone.parse(),
            None => Ok(CalendarZone::default()),
        }
    }
}
