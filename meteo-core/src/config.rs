use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::Coordinate;

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_MAP_EMBED_URL: &str = "https://www.openstreetmap.org/export/embed.html";
pub const DEFAULT_MAX_WIDGETS: usize = 10;
pub const DEFAULT_ZOOM_HALF_EXTENT: f64 = 0.01;

/// Moscow, the map center used when nothing else is known.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    latitude: 55.7558,
    longitude: 37.6173,
};

/// Weather provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
        }
    }
}

/// Map view settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub default_center: Coordinate,
    /// Degrees added on each side of the focus point.
    pub zoom_half_extent: f64,
    pub embed_base_url: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center: DEFAULT_CENTER,
            zoom_half_extent: DEFAULT_ZOOM_HALF_EXTENT,
            embed_base_url: DEFAULT_MAP_EMBED_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Where persisted widgets live; the platform data dir when unset.
    pub data_dir: Option<PathBuf>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// max_widgets = 10
///
/// [weather]
/// base_url = "https://api.open-meteo.com/v1/forecast"
///
/// [map]
/// zoom_half_extent = 0.01
/// default_center = { latitude = 55.7558, longitude = 37.6173 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_widgets: usize,
    pub weather: WeatherConfig,
    pub map: MapConfig,
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_widgets: DEFAULT_MAX_WIDGETS,
            weather: WeatherConfig::default(),
            map: MapConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_widgets == 0 {
            bail!("max_widgets must be at least 1");
        }

        let extent = self.map.zoom_half_extent;
        if !(extent.is_finite() && extent > 0.0) {
            bail!("map.zoom_half_extent must be a positive number, got {extent}");
        }

        let center = self.map.default_center;
        if Coordinate::new(center.latitude, center.longitude).is_none() {
            bail!("map.default_center is out of range: {center}");
        }

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding persisted widgets.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().to_path_buf()),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "meteo", "meteo")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
