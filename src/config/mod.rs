//! Configuration module for Inquisitio-RS
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use crate::error::Result;
use std::path::PathBuf;
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_ENV: &str = "INQUISITIO_SETTINGS_PATH";

/// Locations searched for a settings file, in order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("inquisitio-rs/settings.yml"));
    }
    paths
}

/// Load settings from the first file found, falling back to defaults.
///
/// `INQUISITIO_SETTINGS_PATH` wins over the default locations, and
/// environment overrides are applied on top in every case.
pub fn discover() -> Result<Settings> {
    let mut candidates = Vec::new();
    if let Ok(path) = std::env::var(SETTINGS_PATH_ENV) {
        candidates.push(PathBuf::from(path));
    }
    candidates.extend(default_paths());

    let mut settings = match candidates.iter().find(|p| p.exists()) {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(path)?
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };
    settings.merge_env();
    Ok(settings)
}
