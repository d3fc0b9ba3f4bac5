//! World module
//!
//! Grids, biomes, tiles, the biome palette and procedural generation.

pub mod biome;
pub mod generation;
pub mod grid;
pub mod palette;
pub mod tile;

pub use biome::{Biome, BiomeGrid};
pub use generation::{generate_map, GenerationParams, LayerView, MapOutput, ProceduralLayers};
pub use grid::{BoolField, Grid, GridError, ScalarField};
pub use palette::{BiomeColor, BiomePalette, PaletteError};
pub use tile::{TileGrid, TileId};
