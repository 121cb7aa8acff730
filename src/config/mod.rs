//! Configuration module
//!
//! Handles loading and saving xwrap configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::overlay::{OverlayConfig, DEFAULT_NAME};
use crate::screen::{EdgeDetectorConfig, EdgeMask, ScreenEdge};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Display connection settings
    #[serde(default)]
    pub display: DisplayConfig,

    /// Overlay window settings
    #[serde(default)]
    pub overlay: OverlaySettings,

    /// Edges that wrap the pointer
    #[serde(default)]
    pub edges: EdgesConfig,
}

/// General configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

/// Display configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// X display to connect to (default: `$DISPLAY`)
    pub name: Option<String>,
}

/// Overlay window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Window name shown to window-manager tools
    #[serde(default = "default_overlay_name")]
    pub name: String,
    /// Draw the frame in white, for debugging
    #[serde(default)]
    pub visible: bool,
}

fn default_overlay_name() -> String {
    DEFAULT_NAME.to_string()
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            name: default_overlay_name(),
            visible: false,
        }
    }
}

/// Per-edge wrap switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgesConfig {
    #[serde(default = "default_true")]
    pub left: bool,
    #[serde(default = "default_true")]
    pub right: bool,
    #[serde(default = "default_true")]
    pub top: bool,
    #[serde(default = "default_true")]
    pub bottom: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EdgesConfig {
    fn default() -> Self {
        Self {
            left: true,
            right: true,
            top: true,
            bottom: true,
        }
    }
}

impl EdgesConfig {
    fn is_enabled(&self, edge: ScreenEdge) -> bool {
        match edge {
            ScreenEdge::Left => self.left,
            ScreenEdge::Right => self.right,
            ScreenEdge::Top => self.top,
            ScreenEdge::Bottom => self.bottom,
        }
    }

    pub fn mask(&self) -> EdgeMask {
        let mut mask = EdgeMask::NONE;
        for edge in ScreenEdge::ALL {
            if self.is_enabled(edge) {
                mask.enable(edge);
            } else {
                mask.disable(edge);
            }
        }
        mask
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> ConfigResult<Self> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("xwrap/config.toml")),
            Some(PathBuf::from("./xwrap.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                return Self::load(path);
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn overlay_config(&self) -> OverlayConfig {
        OverlayConfig {
            name: self.overlay.name.clone(),
            visible: self.overlay.visible,
        }
    }

    pub fn edge_detector_config(&self) -> EdgeDetectorConfig {
        EdgeDetectorConfig {
            enabled_edges: self.edges.mask(),
        }
    }
}

/// Configuration written by `--generate-config`
pub fn sample_config() -> Config {
    Config {
        display: DisplayConfig {
            name: Some(":0".to_string()),
        },
        ..Default::default()
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> ConfigResult<String> {
    Ok(toml::to_string_pretty(&sample_config())?)
}
