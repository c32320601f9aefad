//! SchemKit Settings Crate
//!
//! Handles editor configuration and its persistence.

pub mod config;
pub mod error;

pub use config::{
    EditorConfig, GridSettings, HistorySettings, NetSettings, SelectionSettings, StyleSettings,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
