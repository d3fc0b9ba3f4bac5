//! Biome tile tables
//!
//! Each biome is a small table of tile choices for the surface, the band
//! beneath it, the three ore/filler masks, the bedrock and its caves.

use rand::rngs::StdRng;
use rand::Rng;

use super::layers::ProceduralLayers;
use crate::session::ProgressSink;
use crate::world::biome::{Biome, BiomeGrid};
use crate::world::grid::Grid;
use crate::world::tile::TileId;

/// Percent chance a cave decoration grows on an eligible cell
const DECORATION_CHANCE: u32 = 30;

/// Percent chance of a canopy tile above a surface cell
const CANOPY_CHANCE: u32 = 20;

/// Columns converted between progress checkpoints
const PROGRESS_COLUMNS: usize = 64;

/// Tile choices for one biome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiomeTiles {
    /// The surface row itself
    pub surface: TileId,
    /// Tile and depth of the band directly below the surface
    pub subsurface: Option<(TileId, i32)>,
    pub large_clump: TileId,
    pub small_clump: Option<TileId>,
    pub dots: TileId,
    /// Everything else below the surface
    pub base: TileId,
    /// Liquid settled in caves; caves stay dry when `None`
    pub liquid: Option<TileId>,
    /// Hangs from cave ceilings
    pub ceiling: Option<TileId>,
    /// Grows on cave floors
    pub floor: Option<TileId>,
    /// Occasional tile on the row above the surface
    pub canopy: Option<TileId>,
}

impl BiomeTiles {
    const fn rock(surface: TileId, large: TileId, small: TileId, dots: TileId, base: TileId) -> Self {
        Self {
            surface,
            subsurface: None,
            large_clump: large,
            small_clump: Some(small),
            dots,
            base,
            liquid: Some(TileId::Water),
            ceiling: None,
            floor: None,
            canopy: None,
        }
    }
}

impl Biome {
    /// Tile table of this biome, `None` for the empty biome
    pub fn tiles(&self) -> Option<BiomeTiles> {
        use TileId::{
            Bushes, Cobblestone, ColdWater, Dirt, Flowers, Grass, Gravel, HardIce, HardSand,
            HighValOre, Ice, Icicles, LowValOre, Magma, Molten, Mud, Obsidian, RadioactiveBlock,
            Sand, Snow, Stalactite, Stalagmite, Stone, Vines,
        };
        let tiles = match self {
            Biome::None => return None,
            Biome::Standard => BiomeTiles {
                subsurface: Some((Dirt, 4)),
                ..BiomeTiles::rock(Grass, Gravel, LowValOre, Dirt, Stone)
            },
            Biome::Frozen => BiomeTiles {
                liquid: Some(ColdWater),
                ceiling: Some(Icicles),
                ..BiomeTiles::rock(Snow, HardIce, ColdWater, HardIce, Ice)
            },
            Biome::Desert => BiomeTiles {
                small_clump: None,
                liquid: None,
                ..BiomeTiles::rock(Sand, HardSand, HardSand, HardSand, Sand)
            },
            Biome::Swamp => BiomeTiles::rock(Mud, Gravel, Mud, Mud, Dirt),
            Biome::Rocky => BiomeTiles::rock(Cobblestone, Gravel, LowValOre, Gravel, Stone),
            Biome::SharpRocky => BiomeTiles {
                ceiling: Some(Stalactite),
                floor: Some(Stalagmite),
                ..BiomeTiles::rock(Cobblestone, Gravel, LowValOre, Gravel, Stone)
            },
            Biome::Lava => BiomeTiles {
                liquid: Some(TileId::Lava),
                ..BiomeTiles::rock(Magma, Magma, Obsidian, Magma, Molten)
            },
            Biome::Jungle => BiomeTiles {
                ceiling: Some(Vines),
                floor: Some(Flowers),
                canopy: Some(Bushes),
                ..BiomeTiles::rock(Grass, Gravel, Mud, Mud, Stone)
            },
            Biome::Radioactive => {
                BiomeTiles::rock(Cobblestone, RadioactiveBlock, HighValOre, Gravel, Stone)
            }
            Biome::Luscious => BiomeTiles::rock(Grass, Dirt, Grass, Grass, Stone),
        };
        Some(tiles)
    }
}

/// Pick the tile for one cell.
///
/// `rng` only drives cosmetic choices (decorations, canopy).
pub fn tile_at(
    rng: &mut StdRng,
    biome: Biome,
    x: i32,
    y: i32,
    layers: &ProceduralLayers,
) -> TileId {
    let Some(tiles) = biome.tiles() else {
        return TileId::None;
    };
    let surface = layers.surface_at(x);
    let top = if tiles.canopy.is_some() { surface + 1 } else { surface };
    if y > top {
        return TileId::None;
    }

    let cave = &layers.cave;
    if cave.get_or(x, y, false) {
        if layers.water.get_or(x, y, false) {
            if let Some(liquid) = tiles.liquid {
                return liquid;
            }
        }
        return cave_decoration(rng, &tiles, x, y, layers);
    }

    if let Some(canopy) = tiles.canopy.filter(|_| y == surface + 1) {
        return if rng.gen_range(0..100) < CANOPY_CHANCE {
            canopy
        } else {
            TileId::None
        };
    }
    if y == surface {
        return tiles.surface;
    }
    if let Some((band, depth)) = tiles.subsurface {
        if y >= surface - depth {
            return band;
        }
    }

    if layers.large_clump.get_or(x, y, false) {
        tiles.large_clump
    } else if let Some(small) = tiles.small_clump.filter(|_| layers.small_clump.get_or(x, y, false)) {
        small
    } else if layers.dots.get_or(x, y, false) {
        tiles.dots
    } else {
        tiles.base
    }
}

/// Open cave cell: a wall backdrop, or a ceiling/floor decoration when the
/// cell above/below is solid rock
fn cave_decoration(
    rng: &mut StdRng,
    tiles: &BiomeTiles,
    x: i32,
    y: i32,
    layers: &ProceduralLayers,
) -> TileId {
    let cave = &layers.cave;
    let top_row = y + 1 >= cave.height() as i32;

    if let Some(ceiling) = tiles.ceiling {
        if top_row {
            return TileId::Wall;
        }
        if !cave.get_or(x, y + 1, true) && rng.gen_range(0..100) < DECORATION_CHANCE {
            return ceiling;
        }
    }
    if let Some(floor) = tiles.floor {
        if top_row || y == 0 {
            return TileId::Wall;
        }
        if !cave.get_or(x, y - 1, true) && rng.gen_range(0..100) < DECORATION_CHANCE {
            return floor;
        }
    }
    TileId::Wall
}

/// Convert a whole expanded biome map, column by column, reporting progress
/// every 64 columns (starting with column 0) between 0.7 and 0.8
pub fn convert_map(
    rng: &mut StdRng,
    biomes: &BiomeGrid,
    layers: &ProceduralLayers,
    progress: &mut dyn ProgressSink,
) -> Grid<TileId> {
    let (w, h) = (biomes.width(), biomes.height());
    let mut tiles = Grid::new(w, h, TileId::None);

    for x in 0..w {
        if x % PROGRESS_COLUMNS == 0 {
            let percent = x * 100 / w;
            progress.report(
                0.7 + x as f32 / w as f32 * 0.1,
                &format!("Tile Conversion {}%", percent),
                "Structure Generation",
            );
        }
        for y in 0..h {
            tiles[(x, y)] = tile_at(rng, biomes[(x, y)], x as i32, y as i32, layers);
        }
    }

    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::grid::BoolField;
    use rand::SeedableRng;

    /// 8x12 world with the surface at row 8 and nothing else set
    fn flat_layers() -> ProceduralLayers {
        let (w, h) = (8, 12);
        let empty = BoolField::new(w, h, false);
        ProceduralLayers {
            width: w,
            height: h,
            surface_height: vec![8.0; w],
            cave: empty.clone(),
            large_clump: empty.clone(),
            small_clump: empty.clone(),
            dots: empty.clone(),
            water: empty.clone(),
            cave_without_tunnels: empty.clone(),
            water_before_settle: empty,
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    #[test]
    fn test_standard_column() {
        let layers = flat_layers();
        let mut rng = rng();
        let column: Vec<TileId> = (0..12)
            .map(|y| tile_at(&mut rng, Biome::Standard, 2, y, &layers))
            .collect();
        assert_eq!(column[9], TileId::None);
        assert_eq!(column[8], TileId::Grass);
        for y in 4..8 {
            assert_eq!(column[y], TileId::Dirt);
        }
        assert_eq!(column[3], TileId::Stone);
    }

    #[test]
    fn test_every_biome_has_surface_tile() {
        let layers = flat_layers();
        for biome in &Biome::ALL[1..] {
            let tile = tile_at(&mut rng(), *biome, 1, 8, &layers);
            assert_eq!(Some(tile), biome.tiles().map(|t| t.surface));
        }
        assert_eq!(tile_at(&mut rng(), Biome::None, 1, 3, &layers), TileId::None);
    }

    #[test]
    fn test_cave_liquid_and_wall() {
        let mut layers = flat_layers();
        layers.cave[(3, 2)] = true;
        layers.water[(3, 2)] = true;
        layers.cave[(4, 2)] = true;
        assert_eq!(tile_at(&mut rng(), Biome::Lava, 3, 2, &layers), TileId::Lava);
        assert_eq!(tile_at(&mut rng(), Biome::Frozen, 3, 2, &layers), TileId::ColdWater);
        assert_eq!(tile_at(&mut rng(), Biome::Desert, 3, 2, &layers), TileId::Wall);
        assert_eq!(tile_at(&mut rng(), Biome::Standard, 4, 2, &layers), TileId::Wall);
    }

    #[test]
    fn test_clump_priority() {
        let mut layers = flat_layers();
        layers.large_clump[(1, 2)] = true;
        layers.small_clump[(1, 2)] = true;
        layers.small_clump[(1, 1)] = true;
        layers.dots[(1, 1)] = true;
        layers.dots[(1, 0)] = true;
        let mut rng = rng();
        assert_eq!(tile_at(&mut rng, Biome::Rocky, 1, 2, &layers), TileId::Gravel);
        assert_eq!(tile_at(&mut rng, Biome::Radioactive, 1, 1, &layers), TileId::HighValOre);
        assert_eq!(tile_at(&mut rng, Biome::Lava, 1, 0, &layers), TileId::Magma);
        // Desert skips the small clump mask
        assert_eq!(tile_at(&mut rng, Biome::Desert, 1, 1, &layers), TileId::HardSand);
    }

    #[test]
    fn test_decorations_only_under_rock() {
        let mut layers = flat_layers();
        // A one-cell pocket: rock above and below
        layers.cave[(5, 4)] = true;
        let mut seen = std::collections::HashSet::new();
        let mut rng = rng();
        for _ in 0..200 {
            seen.insert(tile_at(&mut rng, Biome::SharpRocky, 5, 4, &layers));
        }
        assert!(seen.contains(&TileId::Stalactite));
        assert!(seen.contains(&TileId::Stalagmite));
        assert!(seen.contains(&TileId::Wall));

        // Tall open shaft: the middle cell has no rock to hang from
        for y in 1..6 {
            layers.cave[(6, y)] = true;
        }
        for _ in 0..100 {
            assert_eq!(tile_at(&mut rng, Biome::Frozen, 6, 3, &layers), TileId::Wall);
        }
    }

    #[test]
    fn test_jungle_canopy() {
        let layers = flat_layers();
        let mut rng = rng();
        let mut bushes = 0;
        for _ in 0..500 {
            match tile_at(&mut rng, Biome::Jungle, 0, 9, &layers) {
                TileId::Bushes => bushes += 1,
                TileId::None => {}
                other => panic!("unexpected canopy tile {:?}", other),
            }
        }
        assert!(bushes > 50 && bushes < 150);
        assert_eq!(tile_at(&mut rng, Biome::Jungle, 0, 10, &layers), TileId::None);
    }

    #[test]
    fn test_cave_wins_over_canopy() {
        let mut layers = flat_layers();
        layers.cave[(2, 9)] = true;
        layers.cave[(2, 10)] = true;
        let mut rng = rng();
        for _ in 0..100 {
            let tile = tile_at(&mut rng, Biome::Jungle, 2, 9, &layers);
            assert!(
                matches!(tile, TileId::Wall | TileId::Flowers),
                "canopy row inside a cave gave {:?}",
                tile
            );
        }
    }

    #[test]
    fn test_convert_map_reports_progress() {
        use crate::session::progress::RecordingProgress;
        let biomes = Grid::new(130, 4, Biome::Standard);
        let mut layers = flat_layers();
        layers.width = 130;
        layers.height = 4;
        layers.surface_height = vec![2.0; 130];
        for mask in [
            &mut layers.cave,
            &mut layers.large_clump,
            &mut layers.small_clump,
            &mut layers.dots,
            &mut layers.water,
        ] {
            *mask = BoolField::new(130, 4, false);
        }
        let mut progress = RecordingProgress::default();
        let tiles = convert_map(&mut rng(), &biomes, &layers, &mut progress);
        let fractions: Vec<f32> = progress.checkpoints.iter().map(|c| c.0).collect();
        assert_eq!(fractions.len(), 3);
        assert_eq!(fractions[0], 0.7);
        assert_eq!(progress.checkpoints[0].1, "Tile Conversion 0%");
        assert_eq!(tiles[(0, 2)], TileId::Grass);
        assert_eq!(tiles[(129, 3)], TileId::None);
    }
}
