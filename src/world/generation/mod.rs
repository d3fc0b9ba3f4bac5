//! Procedural map generation
//!
//! Expands a coarse biome map, synthesizes the procedural layers, converts
//! every cell to a tile and finishes with the structure pass.

pub mod biomes;
pub mod expand;
pub mod fields;
pub mod layers;
pub mod noise;
pub mod params;
pub mod random;
pub mod structures;
pub mod tunnel;
pub mod water;

pub use layers::{LayerView, ProceduralLayers};
pub use params::{
    GenerationParams, NoiseLayer, NoiseParams, NoiseVariable, ParamError, ParamValue,
    StructureParams, StructureVariable, TunnelClass, TunnelParams, TunnelVariable,
};
pub use structures::StructureReport;

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::session::ProgressSink;
use crate::world::biome::BiomeGrid;
use crate::world::tile::TileGrid;
use random::{scramble_seed, seeded_rng};

/// Seed step for the cosmetic stream, taken from the structure seed
const COSMETIC_SEED_FACTOR: f64 = 3.779;

/// Wall-clock time spent in each stage of one run
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StageTimings {
    pub expand: Duration,
    pub layers: Duration,
    /// Included in `layers`
    pub water: Duration,
    pub conversion: Duration,
    pub structures: Duration,
}

impl StageTimings {
    pub fn total(&self) -> Duration {
        self.expand + self.layers + self.conversion + self.structures
    }

    pub fn log(&self) {
        log::info!(
            "Map generated in {:.1?} (expand {:.1?}, layers {:.1?}, water {:.1?}, conversion {:.1?}, structures {:.1?})",
            self.total(),
            self.expand,
            self.layers,
            self.water,
            self.conversion,
            self.structures
        );
    }
}

/// Everything one map generation run produces
#[derive(Debug, Clone)]
pub struct MapOutput {
    pub tiles: TileGrid,
    pub layers: ProceduralLayers,
    pub structures: StructureReport,
    pub timings: StageTimings,
}

/// Stream for the dithering and decoration draws.
///
/// Derived from the structure seed unless cosmetic jitter is enabled, in
/// which case it is seeded from the OS.
pub fn cosmetic_rng(params: &GenerationParams) -> StdRng {
    if params.cosmetic_jitter {
        StdRng::from_entropy()
    } else {
        seeded_rng(scramble_seed(params.structures.seed, COSMETIC_SEED_FACTOR))
    }
}

/// Run the full map pipeline over a coarse biome map
pub fn generate_map(
    coarse: &BiomeGrid,
    params: &GenerationParams,
    progress: &mut dyn ProgressSink,
) -> MapOutput {
    let mut timings = StageTimings::default();
    let mut cosmetic = cosmetic_rng(params);
    progress.report(0.0, "", "Starting Up");

    let started = Instant::now();
    let fine = expand::expand(
        &mut cosmetic,
        coarse,
        params.biome_size,
        params.transition_percent,
    );
    timings.expand = started.elapsed();
    log::debug!(
        "Expanded {}x{} biome map to {}x{}",
        coarse.width(),
        coarse.height(),
        fine.width(),
        fine.height()
    );
    progress.report(0.1, "Biome expanding", "Procedural Layers");

    let layers = layers::synthesize(fine.width(), fine.height(), params, progress, &mut timings);

    let started = Instant::now();
    let mut tiles = biomes::convert_map(&mut cosmetic, &fine, &layers, progress);
    timings.conversion = started.elapsed();
    progress.report(0.8, "Converting Biomes To Tiles", "Structure Generation");

    let started = Instant::now();
    let mut structure_rng = seeded_rng(params.structures.seed);
    let report = structures::structure_pass(
        &mut structure_rng,
        &mut tiles,
        &fine,
        &layers,
        &params.structures,
    );
    timings.structures = started.elapsed();
    progress.report(0.9, "Structure Generation", "Finalising Processes");

    timings.log();
    progress.report(1.0, "Finalising Processes", "");

    MapOutput {
        tiles: TileGrid {
            tiles,
            biomes: fine,
        },
        layers,
        structures: report,
        timings,
    }
}
