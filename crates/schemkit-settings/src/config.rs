//! Configuration and settings management for SchemKit
//!
//! Provides configuration file handling and validation for the drawing
//! editor. Supports JSON and TOML file formats stored in the
//! platform-specific configuration directory.
//!
//! Configuration is organized into logical sections:
//! - History settings (undo capacity)
//! - Grid settings (spacing, snapping, pin attraction)
//! - Net settings (junction dot size, geometric tolerance)
//! - Selection settings (hit-test tolerance)
//! - Style defaults for newly drawn items

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Directory name used under the platform config directory
const APP_DIR: &str = "schemkit";

/// Default config file name
const CONFIG_FILE: &str = "config.toml";

/// Undo history settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of undo entries kept before the oldest is discarded
    pub undo_limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { undo_limit: 1000 }
    }
}

/// Grid and snapping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Grid spacing in scene units
    pub spacing: f64,
    /// Snap points to the grid
    pub snap_enabled: bool,
    /// A point closer than this to a symbol pin is pulled onto it. Kept
    /// below `spacing` so a neighbouring grid point stays reachable.
    pub pin_snap_threshold: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            spacing: 10.0,
            snap_enabled: true,
            pin_snap_threshold: 5.0,
        }
    }
}

/// Net connectivity settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetSettings {
    /// Radius of junction dots
    pub dot_radius: f64,
    /// Coordinate tolerance used for collinearity and coincidence tests
    pub tolerance: f64,
}

impl Default for NetSettings {
    fn default() -> Self {
        Self {
            dot_radius: 5.0,
            tolerance: 1e-6,
        }
    }
}

/// Selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Pick distance for hit tests, in scene units
    pub hit_tolerance: f64,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self { hit_tolerance: 3.0 }
    }
}

/// Style defaults applied to newly drawn items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSettings {
    /// Pen width
    pub pen_width: f64,
    /// Pen colour as `#rrggbb` or `#rrggbbaa`
    pub pen_color: String,
    /// Brush colour as `#rrggbb` or `#rrggbbaa`
    pub brush_color: String,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            pen_width: 2.0,
            pen_color: "#000000".to_string(),
            brush_color: "#000000".to_string(),
        }
    }
}

/// Complete editor configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo history
    pub history: HistorySettings,
    /// Grid and snapping
    pub grid: GridSettings,
    /// Net connectivity
    pub nets: NetSettings,
    /// Selection
    pub selection: SelectionSettings,
    /// Style defaults
    pub style: StyleSettings,
    /// Recently opened documents
    pub recent_files: Vec<PathBuf>,
    /// Number of recent files to remember
    pub recent_files_count: usize,
}

impl EditorConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self {
            recent_files_count: 10,
            ..Self::default()
        }
    }

    /// Default location of the config file in the platform config directory
    pub fn default_path() -> SettingsResult<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| {
            ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string())
        })?;
        Ok(base.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load the config from the default location, falling back to defaults
    /// when no file exists yet.
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::new())
        }
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match extension(path).as_deref() {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                )
                .into())
            }
        };

        config.validate()?;
        tracing::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path).as_deref() {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                )
                .into())
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
            }
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.history.undo_limit == 0 {
            return Err(SettingsError::invalid(
                "history.undo_limit",
                "must be greater than 0",
            ));
        }

        if !(self.grid.spacing.is_finite() && self.grid.spacing > 0.0) {
            return Err(SettingsError::invalid("grid.spacing", "must be > 0"));
        }

        if !(self.grid.pin_snap_threshold.is_finite() && self.grid.pin_snap_threshold >= 0.0) {
            return Err(SettingsError::invalid(
                "grid.pin_snap_threshold",
                "must be >= 0",
            ));
        }

        if self.grid.pin_snap_threshold > self.grid.spacing {
            return Err(SettingsError::invalid(
                "grid.pin_snap_threshold",
                "must not exceed grid.spacing",
            ));
        }

        if !(self.nets.dot_radius.is_finite() && self.nets.dot_radius > 0.0) {
            return Err(SettingsError::invalid("nets.dot_radius", "must be > 0"));
        }

        if !(self.nets.tolerance.is_finite() && self.nets.tolerance > 0.0) {
            return Err(SettingsError::invalid("nets.tolerance", "must be > 0"));
        }

        if self.selection.hit_tolerance < 0.0 {
            return Err(SettingsError::invalid(
                "selection.hit_tolerance",
                "must be >= 0",
            ));
        }

        if self.style.pen_width < 0.0 {
            return Err(SettingsError::invalid("style.pen_width", "must be >= 0"));
        }

        Ok(())
    }

    /// Add file to recent files list
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|f| f != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(self.recent_files_count.max(1));
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
