//! Named-file JSON store
//!
//! Saves biome maps, tile maps, layer bundles and rulesets as
//! `<name>.<kind>.json` records in one directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wfc::Ruleset;
use crate::world::biome::BiomeGrid;
use crate::world::generation::ProceduralLayers;
use crate::world::tile::TileGrid;

/// Record format version
const STORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What a record holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Biomes,
    Tiles,
    Layers,
    Ruleset,
}

impl RecordKind {
    pub fn extension(self) -> &'static str {
        match self {
            RecordKind::Biomes => "biomes.json",
            RecordKind::Tiles => "tiles.json",
            RecordKind::Layers => "layers.json",
            RecordKind::Ruleset => "ruleset.json",
        }
    }
}

fn current_version() -> u32 {
    STORE_VERSION
}

#[derive(Debug, Serialize, Deserialize)]
struct Record<T> {
    #[serde(default = "current_version")]
    version: u32,
    data: T,
}

/// Default store location
pub fn default_dir() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "worldsketch", "Worldsketch") {
        proj_dirs.data_local_dir().join("saved_data")
    } else {
        PathBuf::from("./saved_data")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapStore {
    dir: PathBuf,
}

impl Default for MapStore {
    fn default() -> Self {
        Self::new(default_dir())
    }
}

impl MapStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str, kind: RecordKind) -> PathBuf {
        self.dir.join(format!("{}.{}", name, kind.extension()))
    }

    pub fn exists(&self, name: &str, kind: RecordKind) -> bool {
        self.path(name, kind).exists()
    }

    /// Names of every stored record of one kind, sorted
    pub fn list(&self, kind: RecordKind) -> Vec<String> {
        let suffix = format!(".{}", kind.extension());
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter_map(|f| f.strip_suffix(&suffix).map(str::to_string))
            .collect();
        names.sort();
        names
    }

    pub fn delete(&self, name: &str, kind: RecordKind) -> Result<(), SaveError> {
        let path = self.path(name, kind);
        if path.exists() {
            fs::remove_file(&path)?;
            log::info!("Deleted {:?}", path);
        }
        Ok(())
    }

    fn save<T: Serialize>(&self, name: &str, kind: RecordKind, data: &T) -> Result<PathBuf, SaveError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(name, kind);
        let json = serde_json::to_string_pretty(&Record {
            version: STORE_VERSION,
            data,
        })?;
        fs::write(&path, json)?;
        log::info!("Saved {:?}", path);
        Ok(path)
    }

    /// Missing, unreadable, corrupt and version-mismatched records all read
    /// as `None`
    fn load<T: DeserializeOwned>(&self, name: &str, kind: RecordKind) -> Option<T> {
        let path = self.path(name, kind);
        if !path.exists() {
            log::debug!("No saved record at {:?}", path);
            return None;
        }
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Failed to read {:?}: {}", path, e);
                return None;
            }
        };
        let record: Record<T> = match serde_json::from_str(&text) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Failed to parse {:?}: {}", path, e);
                return None;
            }
        };
        if record.version != STORE_VERSION {
            log::warn!(
                "Ignoring {:?}: version {} (expected {})",
                path,
                record.version,
                STORE_VERSION
            );
            return None;
        }
        Some(record.data)
    }

    fn reject<T>(&self, name: &str, kind: RecordKind) -> Option<T> {
        log::warn!("Ignoring {:?}: inconsistent dimensions", self.path(name, kind));
        None
    }

    pub fn save_biomes(&self, name: &str, grid: &BiomeGrid) -> Result<PathBuf, SaveError> {
        self.save(name, RecordKind::Biomes, grid)
    }

    /// Grids whose cell count disagrees with their size fail to parse
    pub fn load_biomes(&self, name: &str) -> Option<BiomeGrid> {
        self.load(name, RecordKind::Biomes)
    }

    pub fn save_tiles(&self, name: &str, tiles: &TileGrid) -> Result<PathBuf, SaveError> {
        self.save(name, RecordKind::Tiles, tiles)
    }

    pub fn load_tiles(&self, name: &str) -> Option<TileGrid> {
        let tiles: TileGrid = self.load(name, RecordKind::Tiles)?;
        let same_size = tiles.tiles.width() == tiles.biomes.width()
            && tiles.tiles.height() == tiles.biomes.height();
        if same_size {
            Some(tiles)
        } else {
            self.reject(name, RecordKind::Tiles)
        }
    }

    pub fn save_layers(&self, name: &str, layers: &ProceduralLayers) -> Result<PathBuf, SaveError> {
        self.save(name, RecordKind::Layers, layers)
    }

    pub fn load_layers(&self, name: &str) -> Option<ProceduralLayers> {
        let layers: ProceduralLayers = self.load(name, RecordKind::Layers)?;
        if layers.is_consistent() {
            Some(layers)
        } else {
            self.reject(name, RecordKind::Layers)
        }
    }

    pub fn save_ruleset(&self, name: &str, ruleset: &Ruleset) -> Result<PathBuf, SaveError> {
        self.save(name, RecordKind::Ruleset, ruleset)
    }

    pub fn load_ruleset(&self, name: &str) -> Option<Ruleset> {
        let ruleset: Ruleset = self.load(name, RecordKind::Ruleset)?;
        if ruleset.is_consistent() {
            Some(ruleset)
        } else {
            self.reject(name, RecordKind::Ruleset)
        }
    }
}
