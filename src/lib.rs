//! Worldsketch - procedural 2D tile worlds from painted biome maps
//!
//! A coarse biome map is expanded, detailed with layered noise, caves,
//! tunnels and water, and converted into tiles. A Wave Function Collapse
//! solver can grow new biome maps from a hand-drawn example.

pub mod data;
pub mod render;
pub mod save;
pub mod session;
pub mod wfc;
pub mod world;

// Re-export commonly used types
pub use session::{MapSession, ProgressSink, WfcSession};
pub use world::generation::{generate_map, GenerationParams, MapOutput};
pub use world::{Biome, BiomeGrid, TileGrid, TileId};
