//! Tile definitions
//!
//! Discrete tile kinds produced by the biome mappers, and the finished tile map.

use serde::{Deserialize, Serialize};

use super::biome::{Biome, BiomeGrid};
use super::grid::{Grid, GridError};

/// Types of tiles in the generated world, in their persisted numeric order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileId {
    /// Open sky above the surface
    #[default]
    None = 0,

    // Basic terrain
    Stone = 1,
    Cobblestone = 2,
    Gravel = 3,
    Grass = 4,
    Dirt = 5,
    Mud = 6,
    Ice = 7,
    Sand = 8,
    HardSand = 9,
    Molten = 10,
    Magma = 11,
    Cloud = 12,
    Air = 13,

    // Structures
    BuriedItem = 14,
    TreeLog = 15,
    TreeLeaves = 16,

    // Resources
    Obsidian = 17,
    LowValOre = 18,
    HighValOre = 19,

    // Plants
    Vines = 20,
    Bushes = 21,
    Flowers = 22,

    RadioactiveBlock = 23,
    HardIce = 24,
    ColdWater = 25,
    Icicles = 26,
    Snow = 27,

    // Open cave space and liquids
    Water = 28,
    Wall = 29,
    Stalactite = 30,
    Stalagmite = 31,
    Lava = 32,

    // Crystal cluster variants
    Crystal01 = 33,
    Crystal02 = 34,
    Crystal03 = 35,
    Crystal04 = 36,
    Crystal05 = 37,
    Crystal06 = 38,
}

impl TileId {
    /// Crystal variants in order
    pub const CRYSTALS: [TileId; 6] = [
        TileId::Crystal01,
        TileId::Crystal02,
        TileId::Crystal03,
        TileId::Crystal04,
        TileId::Crystal05,
        TileId::Crystal06,
    ];

    /// Pick a crystal variant, wrapping past the sixth
    pub fn crystal(variant: usize) -> TileId {
        Self::CRYSTALS[variant % Self::CRYSTALS.len()]
    }

    pub fn is_crystal(&self) -> bool {
        Self::CRYSTALS.contains(self)
    }

    pub fn is_liquid(&self) -> bool {
        matches!(self, TileId::Water | TileId::ColdWater | TileId::Lava)
    }

    /// Open cave tiles (background wall plus anything hanging in it)
    pub fn is_cave(&self) -> bool {
        matches!(
            self,
            TileId::Wall
                | TileId::Icicles
                | TileId::Stalactite
                | TileId::Stalagmite
                | TileId::Vines
                | TileId::Flowers
        ) || self.is_liquid()
    }

    /// Cave background tiles take the owning biome's colour when rendered
    pub fn uses_biome_color(&self) -> bool {
        matches!(self, TileId::Wall)
    }

    /// Default preview colour, `None` for transparent sky
    pub fn color(&self) -> Option<(u8, u8, u8)> {
        let rgb = match self {
            TileId::None => return None,
            TileId::Stone => (120, 120, 125),
            TileId::Cobblestone => (100, 100, 100),
            TileId::Gravel => (140, 130, 120),
            TileId::Grass => (70, 160, 60),
            TileId::Dirt => (120, 85, 55),
            TileId::Mud => (85, 65, 45),
            TileId::Ice => (170, 210, 235),
            TileId::Sand => (220, 200, 140),
            TileId::HardSand => (195, 170, 110),
            TileId::Molten => (90, 30, 20),
            TileId::Magma => (200, 70, 20),
            TileId::Cloud => (235, 235, 240),
            TileId::Air => (200, 225, 255),
            TileId::BuriedItem => (255, 215, 0),
            TileId::TreeLog => (100, 70, 40),
            TileId::TreeLeaves => (50, 120, 40),
            TileId::Obsidian => (40, 25, 55),
            TileId::LowValOre => (170, 120, 90),
            TileId::HighValOre => (90, 200, 220),
            TileId::Vines => (40, 110, 40),
            TileId::Bushes => (60, 140, 50),
            TileId::Flowers => (220, 90, 160),
            TileId::RadioactiveBlock => (130, 255, 60),
            TileId::HardIce => (120, 170, 210),
            TileId::ColdWater => (90, 150, 210),
            TileId::Icicles => (210, 240, 255),
            TileId::Snow => (245, 245, 250),
            TileId::Water => (40, 90, 200),
            TileId::Wall => (45, 40, 40),
            TileId::Stalactite => (150, 140, 130),
            TileId::Stalagmite => (150, 140, 130),
            TileId::Lava => (255, 110, 0),
            TileId::Crystal01 => (180, 80, 255),
            TileId::Crystal02 => (150, 60, 230),
            TileId::Crystal03 => (210, 120, 255),
            TileId::Crystal04 => (120, 200, 255),
            TileId::Crystal05 => (90, 160, 240),
            TileId::Crystal06 => (250, 170, 255),
        };
        Some(rgb)
    }
}

/// A finished tile map, with the expanded biome map kept for wall colouring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    pub tiles: Grid<TileId>,
    pub biomes: BiomeGrid,
}

impl TileGrid {
    /// Create an all-sky map over an expanded biome map
    pub fn new(biomes: BiomeGrid) -> Self {
        Self {
            tiles: Grid::new(biomes.width(), biomes.height(), TileId::None),
            biomes,
        }
    }

    /// Pair a tile map with its biome map, checking the sizes agree
    pub fn from_parts(tiles: Grid<TileId>, biomes: BiomeGrid) -> Result<Self, GridError> {
        if tiles.width() != biomes.width() || tiles.height() != biomes.height() {
            return Err(GridError::LengthMismatch {
                width: tiles.width(),
                height: tiles.height(),
                found: biomes.len(),
            });
        }
        Ok(Self { tiles, biomes })
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<TileId> {
        self.tiles.get(x, y).copied()
    }

    pub fn biome(&self, x: i32, y: i32) -> Option<Biome> {
        self.biomes.get(x, y).copied()
    }

    /// Count tiles of one kind
    pub fn count(&self, id: TileId) -> usize {
        self.tiles.cells().iter().filter(|t| **t == id).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crystal_variants_wrap() {
        assert_eq!(TileId::crystal(0), TileId::Crystal01);
        assert_eq!(TileId::crystal(5), TileId::Crystal06);
        assert_eq!(TileId::crystal(6), TileId::Crystal01);
        assert!(TileId::crystal(3).is_crystal());
    }

    #[test]
    fn test_sky_is_transparent() {
        assert!(TileId::None.color().is_none());
        assert!(TileId::Stone.color().is_some());
    }

    #[test]
    fn test_from_parts_checks_size() {
        let biomes = Grid::new(4, 4, Biome::Standard);
        assert!(TileGrid::from_parts(Grid::new(4, 3, TileId::None), biomes.clone()).is_err());
        let grid = TileGrid::from_parts(Grid::new(4, 4, TileId::Stone), biomes).unwrap();
        assert_eq!(grid.count(TileId::Stone), 16);
    }
}
