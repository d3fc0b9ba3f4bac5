//! Structure pass
//!
//! Stamps buried treasure pockets under the surface and crystal clusters
//! into rocky biomes once the tile map is converted.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use super::layers::ProceduralLayers;
use super::noise::{voronoi, worley};
use super::params::StructureParams;
use super::random::roll;
use crate::world::biome::BiomeGrid;
use crate::world::grid::Grid;
use crate::world::tile::TileId;

/// Seed points per crystal cluster
const CRYSTAL_REGIONS: usize = 20;

/// What the structure pass placed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructureReport {
    pub treasures: usize,
    pub crystal_clusters: usize,
}

/// Run the treasure and crystal passes over a converted tile map
pub fn structure_pass(
    rng: &mut StdRng,
    tiles: &mut Grid<TileId>,
    biomes: &BiomeGrid,
    layers: &ProceduralLayers,
    params: &StructureParams,
) -> StructureReport {
    let treasures = place_treasure(rng, tiles, layers, params);
    let crystal_clusters = place_crystals(rng, tiles, biomes, layers, params);
    log::debug!(
        "Structures: {} treasure pockets, {} crystal clusters",
        treasures,
        crystal_clusters
    );
    StructureReport {
        treasures,
        crystal_clusters,
    }
}

/// Bury items under random surface columns whose pocket is clear of caves
fn place_treasure(
    rng: &mut StdRng,
    tiles: &mut Grid<TileId>,
    layers: &ProceduralLayers,
    params: &StructureParams,
) -> usize {
    let width = tiles.width() as i32;
    // Out-of-bounds cells count as blocked
    let blocked = |x: i32, y: i32| layers.cave.get_or(x, y, true);

    let mut candidates = Vec::new();
    for x in 1..width - 1 {
        let depth = roll(rng, params.min_treasure_depth, params.max_treasure_depth);
        let surface = layers.surface_at(x);
        let item_y = surface - depth;
        if item_y < 0
            || blocked(x, surface)
            || blocked(x, item_y)
            || blocked(x + 1, item_y)
            || blocked(x - 1, item_y)
            || blocked(x, item_y + 1)
            || blocked(x, item_y - 1)
        {
            continue;
        }
        candidates.push((x, surface, item_y));
    }

    candidates.shuffle(rng);
    let count = (roll(rng, params.min_treasure, params.max_treasure).max(0) as usize).min(candidates.len());

    for &(x, surface, item_y) in &candidates[..count] {
        tiles.set(x, surface, TileId::Mud);
        tiles.set(x, item_y, TileId::BuriedItem);
        for (nx, ny) in [(x + 1, item_y), (x - 1, item_y), (x, item_y + 1), (x, item_y - 1)] {
            if tiles.get(nx, ny) != Some(&TileId::BuriedItem) {
                tiles.set(nx, ny, TileId::Mud);
            }
        }
    }

    count
}

/// Grow crystal clusters at random rocky positions below the surface
fn place_crystals(
    rng: &mut StdRng,
    tiles: &mut Grid<TileId>,
    biomes: &BiomeGrid,
    layers: &ProceduralLayers,
    params: &StructureParams,
) -> usize {
    let width = tiles.width() as i32;
    let mut radius = roll(rng, params.min_crystal_radius, params.max_crystal_radius).max(0);

    let mut candidates: Vec<((i32, i32), i32)> = Vec::new();
    for x in 0..width - radius {
        for y in 0..layers.surface_at(x) - radius {
            if x < radius || y < radius {
                continue;
            }
            if !biomes.get(x, y).is_some_and(|b| b.is_rocky()) {
                continue;
            }
            candidates.push(((x, y), radius));
            radius = roll(rng, params.min_crystal_radius, params.max_crystal_radius).max(0);
        }
    }

    let count = (roll(rng, params.min_crystal_clusters, params.max_crystal_clusters).max(0) as usize)
        .min(candidates.len());

    for _ in 0..count {
        let use_voronoi = rng.gen_bool(0.5);
        let index = rng.gen_range(0..candidates.len());
        let ((cx, cy), r) = candidates.swap_remove(index);
        let size = (1 + 2 * r) as usize;
        let seed = rng.gen_range(100_000..100_000_000);

        let variant_at: Box<dyn Fn(usize, usize) -> usize> = if use_voronoi {
            let regions = voronoi(size, size, CRYSTAL_REGIONS, seed);
            Box::new(move |bx, by| regions[(bx, by)] % TileId::CRYSTALS.len())
        } else {
            let levels = worley(size, size, CRYSTAL_REGIONS, seed, 1, r as f32 * 0.5);
            Box::new(move |bx, by| ((levels[(bx, by)] * 6.0) as usize).min(5))
        };

        for x in cx - r..=cx + r {
            for y in cy - r..=cy + r {
                let (dx, dy) = ((x - cx) as f32, (y - cy) as f32);
                if (dx * dx + dy * dy).sqrt() > r as f32 || layers.cave.get_or(x, y, true) {
                    continue;
                }
                let (bx, by) = ((x - cx + r) as usize, (y - cy + r) as usize);
                tiles.set(x, y, TileId::crystal(variant_at(bx, by)));
            }
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::biome::Biome;
    use crate::world::grid::BoolField;
    use rand::SeedableRng;

    fn layers(w: usize, h: usize, surface: f32) -> ProceduralLayers {
        let empty = BoolField::new(w, h, false);
        ProceduralLayers {
            width: w,
            height: h,
            surface_height: vec![surface; w],
            cave: empty.clone(),
            large_clump: empty.clone(),
            small_clump: empty.clone(),
            dots: empty.clone(),
            water: empty.clone(),
            cave_without_tunnels: empty.clone(),
            water_before_settle: empty,
        }
    }

    fn treasure_only() -> StructureParams {
        StructureParams {
            min_treasure: 4,
            max_treasure: 5,
            min_treasure_depth: 3,
            max_treasure_depth: 4,
            min_crystal_clusters: 0,
            max_crystal_clusters: 0,
            ..StructureParams::default()
        }
    }

    #[test]
    fn test_no_eligible_positions_places_nothing() {
        let mut layers = layers(20, 20, 15.0);
        layers.cave = BoolField::new(20, 20, true);
        let mut tiles = Grid::new(20, 20, TileId::Stone);
        let biomes = Grid::new(20, 20, Biome::Standard);
        let mut rng = StdRng::seed_from_u64(1);
        let report = structure_pass(&mut rng, &mut tiles, &biomes, &layers, &treasure_only());
        assert_eq!(report, StructureReport::default());
        assert_eq!(tiles.cells().iter().filter(|t| **t == TileId::BuriedItem).count(), 0);
    }

    #[test]
    fn test_treasure_pockets() {
        let layers = layers(30, 20, 15.0);
        let mut tiles = Grid::new(30, 20, TileId::Stone);
        let biomes = Grid::new(30, 20, Biome::Standard);
        let mut rng = StdRng::seed_from_u64(2);
        let report = structure_pass(&mut rng, &mut tiles, &biomes, &layers, &treasure_only());
        assert_eq!(report.treasures, 4);

        let items: Vec<_> = (0..tiles.len())
            .filter(|i| tiles.cells()[*i] == TileId::BuriedItem)
            .map(|i| tiles.idx_to_xy(i))
            .collect();
        assert_eq!(items.len(), 4);
        for (x, y) in items {
            assert_eq!(y, 12, "depth 3 below a surface at row 15");
            assert_eq!(tiles[(x, 15)], TileId::Mud);
            assert_ne!(tiles[(x, 11)], TileId::Stone);
            assert_ne!(tiles[(x, 13)], TileId::Stone);
        }
    }

    #[test]
    fn test_crystals_only_in_rocky_biomes() {
        let layers = layers(60, 60, 50.0);
        let mut tiles = Grid::new(60, 60, TileId::Stone);
        let biomes = Grid::from_fn(60, 60, |x, _| if x < 30 { Biome::Rocky } else { Biome::Desert });
        let params = StructureParams {
            min_treasure: 0,
            max_treasure: 0,
            min_crystal_clusters: 3,
            max_crystal_clusters: 4,
            min_crystal_radius: 3,
            max_crystal_radius: 5,
            ..StructureParams::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let report = structure_pass(&mut rng, &mut tiles, &biomes, &layers, &params);
        assert_eq!(report.crystal_clusters, 3);

        for y in 0..60 {
            for x in 0..60 {
                if tiles[(x, y)].is_crystal() {
                    // Clusters are centred in rock and reach at most one radius out
                    assert!(x < 30 + 5);
                }
            }
        }
        assert!(tiles.cells().iter().any(|t| t.is_crystal()));
    }

    #[test]
    fn test_crystals_skip_caves() {
        let mut layers = layers(40, 40, 35.0);
        layers.cave = BoolField::from_fn(40, 40, |x, _| x % 2 == 0);
        let mut tiles = Grid::new(40, 40, TileId::Stone);
        let biomes = Grid::new(40, 40, Biome::SharpRocky);
        let params = StructureParams {
            min_treasure: 0,
            max_treasure: 0,
            min_crystal_clusters: 5,
            max_crystal_clusters: 6,
            ..StructureParams::default()
        };
        structure_pass(&mut StdRng::seed_from_u64(4), &mut tiles, &biomes, &layers, &params);
        for y in 0..40 {
            for x in (0..40).step_by(2) {
                assert!(!tiles[(x, y)].is_crystal());
            }
        }
    }
}
