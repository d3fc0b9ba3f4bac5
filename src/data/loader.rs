//! RON config loader
//!
//! Loads generation parameters and the biome palette from RON files, with
//! fallback to the built-in defaults.

use std::fs;
use std::path::Path;

use ron::ser::PrettyConfig;
use thiserror::Error;

use crate::world::generation::GenerationParams;
use crate::world::palette::BiomePalette;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("RON write error: {0}")]
    Write(#[from] ron::Error),
}

/// Read generation parameters, failing on any I/O or parse problem
pub fn try_load_params(path: &Path) -> Result<GenerationParams, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(ron::from_str(&content)?)
}

/// Load generation parameters from a RON file.
///
/// Missing fields take their defaults; a missing or unparsable file gives
/// the default parameters.
pub fn load_params(path: &Path) -> GenerationParams {
    if path.exists() {
        match try_load_params(path) {
            Ok(params) => {
                log::info!("Loaded generation parameters from {:?}", path);
                return params;
            }
            Err(e) => log::warn!("Failed to load {:?}: {}. Using defaults.", path, e),
        }
    } else {
        log::info!("No parameter file at {:?}, using defaults", path);
    }
    GenerationParams::default()
}

/// Write the default parameters out as a starting point for editing
pub fn export_default_params(path: &Path) -> Result<(), ConfigError> {
    write_ron(path, &GenerationParams::default())
}

/// Load a biome palette.
///
/// A missing file gives the default palette. A file that does not parse, or
/// that lists no biomes, is an error.
pub fn load_palette(path: &Path) -> Result<BiomePalette, ConfigError> {
    if !path.exists() {
        log::info!("No palette file at {:?}, using the default palette", path);
        return Ok(BiomePalette::default());
    }
    let content = fs::read_to_string(path)?;
    let palette: BiomePalette = ron::from_str(&content)?;
    log::info!("Loaded {} palette entries from {:?}", palette.entries().len(), path);
    Ok(palette)
}

pub fn export_default_palette(path: &Path) -> Result<(), ConfigError> {
    write_ron(path, &BiomePalette::default())
}

fn write_ron<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = ron::ser::to_string_pretty(value, PrettyConfig::default())?;
    fs::write(path, text)?;
    log::info!("Wrote {:?}", path);
    Ok(())
}
