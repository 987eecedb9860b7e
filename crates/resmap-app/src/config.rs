//! Configuration management for resmap
//!
//! Config stored at: ~/.config/resmap/config.json

use std::path::{Path, PathBuf};

use resmap_domain::constants::DEFAULT_CENTER;
use resmap_domain::mock::DEFAULT_MOCK_COUNT;
use resmap_types::{ConfigError, GeoPoint, OutputFormat, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STYLE_URL: &str = "https://tiles.openfreemap.org/styles/liberty";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding map-resources.json
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// Directory containing `pins/<type>.png`
    #[serde(default)]
    pub assets_dir: Option<PathBuf>,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Base map style
    #[serde(default = "default_style_url")]
    pub style_url: String,

    /// Location reported by the location lookup and initial map center
    #[serde(default = "default_home")]
    pub home: GeoPoint,

    /// Number of entries in the type distribution
    #[serde(default = "default_top_types")]
    pub top_types: usize,

    /// Records generated by `seed` and demo mode
    #[serde(default = "default_mock_count")]
    pub mock_count: usize,

    /// Show generated records while the store is empty
    #[serde(default = "default_true")]
    pub demo_data: bool,
}

fn default_style_url() -> String {
    DEFAULT_STYLE_URL.to_string()
}

fn default_home() -> GeoPoint {
    DEFAULT_CENTER
}

fn default_top_types() -> usize {
    8
}

fn default_mock_count() -> usize {
    DEFAULT_MOCK_COUNT
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: None,
            assets_dir: None,
            output_format: OutputFormat::default(),
            style_url: default_style_url(),
            home: default_home(),
            top_types: default_top_types(),
            mock_count: default_mock_count(),
            demo_data: true,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("resmap");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Get the store directory path
    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.store_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir()
            .ok_or(ConfigError::NotFound)?
            .join("resmap");
        Ok(data_dir)
    }

    /// Get the assets directory path (defaults to `./assets`)
    pub fn assets_dir(&self) -> PathBuf {
        self.assets_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("assets"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Resource Map Configuration")?;
        writeln!(f, "==========================")?;
        writeln!(f)?;
        writeln!(
            f,
            "Store dir:      {}",
            self.store_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "(error)".to_string())
        )?;
        writeln!(f, "Assets dir:     {}", self.assets_dir().display())?;
        writeln!(f, "Output format:  {}", self.output_format)?;
        writeln!(f, "Style URL:      {}", self.style_url)?;
        writeln!(
            f,
            "Home:           {:.6}, {:.6}",
            self.home.latitude, self.home.longitude
        )?;
        writeln!(f, "Top types:      {}", self.top_types)?;
        writeln!(f, "Mock count:     {}", self.mock_count)?;
        writeln!(f, "Demo data:      {}", self.demo_data)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:    {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.top_types, 8);
        assert_eq!(config.mock_count, 45);
        assert_eq!(config.style_url, DEFAULT_STYLE_URL);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"output_format":"json","demo_data":false}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.output_format, OutputFormat::Json);
        assert!(!config.demo_data);
        assert_eq!(config.home, DEFAULT_CENTER);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            store_dir: Some(dir.path().join("data")),
            top_types: 5,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(resmap_types::Error::Config(ConfigError::ParseError(_)))
        ));
    }
}
