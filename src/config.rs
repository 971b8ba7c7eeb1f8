//! Configuration for Residue Gallery
//!
//! Settings are read from `residue-gallery.toml` in the working directory or
//! from the user's config directory. A missing file yields the defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "residue-gallery.toml";
const THUMBNAIL_MIN_WIDTH: f32 = 64.0;
const THUMBNAIL_MAX_WIDTH: f32 = 1024.0;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub gallery: GalleryConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

/// Files opened on startup
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GalleryConfig {
    /// Gallery manifest or directory of PNG charts
    pub manifest: Option<PathBuf>,
    /// Residue log used for the monthly weight plot
    pub records: Option<PathBuf>,
}

/// Window and thumbnail sizes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub thumbnail_width: f32,
    pub window_width: f32,
    pub window_height: f32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `env_logger` filter; `RUST_LOG` takes precedence
    pub filter: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            thumbnail_width: 240.0,
            window_width: 1200.0,
            window_height: 800.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Option<PathBuf> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from(CONFIG_FILE_NAME);
        if current_dir_config.exists() {
            return Some(current_dir_config);
        }

        // 2. Check XDG config directory
        let xdg_config = dirs::config_dir()?.join("residue-gallery").join("config.toml");
        xdg_config.exists().then_some(xdg_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let width = self.ui.thumbnail_width;
        if !(THUMBNAIL_MIN_WIDTH..=THUMBNAIL_MAX_WIDTH).contains(&width) {
            anyhow::bail!(
                "thumbnail_width must be between {} and {}, got {}",
                THUMBNAIL_MIN_WIDTH,
                THUMBNAIL_MAX_WIDTH,
                width
            );
        }

        if self.ui.window_width <= 0.0 || self.ui.window_height <= 0.0 {
            anyhow::bail!(
                "window size must be positive, got {}x{}",
                self.ui.window_width,
                self.ui.window_height
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.gallery.manifest, None);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[gallery]\nmanifest = \"charts/gallery.json\"\n\n[ui]\nthumbnail_width = 320.0\n",
        )
        .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.gallery.manifest, Some(PathBuf::from("charts/gallery.json")));
        assert_eq!(config.ui.thumbnail_width, 320.0);
        assert_eq!(config.ui.window_width, 1200.0);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_rejects_out_of_range_thumbnail_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[ui]\nthumbnail_width = 8.0\n").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("thumbnail_width"));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[ui\nthumbnail_width = ").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }
}
