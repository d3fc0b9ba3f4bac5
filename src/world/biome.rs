//! Biome definitions
//!
//! Coarse terrain classes painted by hand or synthesized by the WFC solver.

use serde::{Deserialize, Serialize};

use super::grid::Grid;

/// Biome types, in their persisted numeric order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Biome {
    #[default]
    None = 0,
    Standard = 1,
    Frozen = 2,
    Desert = 3,
    Swamp = 4,
    Rocky = 5,
    SharpRocky = 6,
    Lava = 7,
    Jungle = 8,
    Radioactive = 9,
    Luscious = 10,
}

/// A coarse or expanded map of biomes
pub type BiomeGrid = Grid<Biome>;

impl Biome {
    /// Number of biome kinds, including `None`
    pub const COUNT: usize = 11;

    /// Every biome in index order
    pub const ALL: [Biome; Biome::COUNT] = [
        Biome::None,
        Biome::Standard,
        Biome::Frozen,
        Biome::Desert,
        Biome::Swamp,
        Biome::Rocky,
        Biome::SharpRocky,
        Biome::Lava,
        Biome::Jungle,
        Biome::Radioactive,
        Biome::Luscious,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Biome> {
        Biome::ALL.get(index).copied()
    }

    /// Get the biome name for display
    pub fn name(&self) -> &'static str {
        match self {
            Biome::None => "None",
            Biome::Standard => "Standard",
            Biome::Frozen => "Frozen",
            Biome::Desert => "Desert",
            Biome::Swamp => "Swamp",
            Biome::Rocky => "Rocky",
            Biome::SharpRocky => "Sharp Rocky",
            Biome::Lava => "Lava",
            Biome::Jungle => "Jungle",
            Biome::Radioactive => "Radioactive",
            Biome::Luscious => "Luscious",
        }
    }

    /// Biomes that can host crystal clusters
    pub fn is_rocky(&self) -> bool {
        matches!(self, Biome::Rocky | Biome::SharpRocky)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for biome in Biome::ALL {
            assert_eq!(Biome::from_index(biome.index()), Some(biome));
        }
        assert_eq!(Biome::from_index(Biome::COUNT), None);
    }
}
