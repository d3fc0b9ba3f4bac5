//! Procedural layers
//!
//! Builds the surface line and the boolean masks (cave, clumps, dots, water)
//! that the biome tile tables read from.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::fields::{feather_levels, fill_count_pass, threshold_pass, FeatherEdges};
use super::noise::{generate_1d, generate_2d_from};
use super::params::{GenerationParams, NoiseLayer, TunnelClass, TunnelParams};
use super::random::{roll, scramble_seed, seeded_rng};
use super::tunnel::{generate_tunnel, TunnelDirection};
use super::water::settle;
use super::StageTimings;
use crate::session::ProgressSink;
use crate::world::grid::{BoolField, ScalarField};

/// Distance kept between tunnel anchors and the map edge, and the width of
/// the cave feathering border
const EDGE_MARGIN: i32 = 16;

/// Noise levels along a tunnel are scaled by this
const TUNNEL_CARVE_FACTOR: f32 = 0.25;

/// Per-tunnel seed step within one class
const TUNNEL_SEED_FACTOR: f64 = 5.213;

/// Every layer derived for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProceduralLayers {
    pub width: usize,
    pub height: usize,
    /// Surface row per column, in tiles from the bottom
    pub surface_height: Vec<f32>,
    pub cave: BoolField,
    pub large_clump: BoolField,
    pub small_clump: BoolField,
    pub dots: BoolField,
    pub water: BoolField,
    /// Cave mask before tunnel carving
    pub cave_without_tunnels: BoolField,
    /// Water mask before settling
    pub water_before_settle: BoolField,
}

/// Selects one layer for viewing or export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerView {
    FullGen,
    CaveWith,
    CaveWithout,
    LargeClump,
    SmallClump,
    Dots,
    WaterBefore,
    WaterAfter,
}

impl LayerView {
    pub const ALL: [LayerView; 8] = [
        LayerView::FullGen,
        LayerView::CaveWith,
        LayerView::CaveWithout,
        LayerView::LargeClump,
        LayerView::SmallClump,
        LayerView::Dots,
        LayerView::WaterBefore,
        LayerView::WaterAfter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LayerView::FullGen => "full",
            LayerView::CaveWith => "cave",
            LayerView::CaveWithout => "cave_without_tunnels",
            LayerView::LargeClump => "large_clump",
            LayerView::SmallClump => "small_clump",
            LayerView::Dots => "dots",
            LayerView::WaterBefore => "water_before_settle",
            LayerView::WaterAfter => "water",
        }
    }
}

impl ProceduralLayers {
    /// Surface row of a column, or -1 outside the map
    pub fn surface_at(&self, x: i32) -> i32 {
        if x < 0 {
            return -1;
        }
        self.surface_height
            .get(x as usize)
            .map_or(-1, |h| *h as i32)
    }

    /// The mask behind a view; `FullGen` is the finished tile map, not a mask
    pub fn view(&self, view: LayerView) -> Option<&BoolField> {
        match view {
            LayerView::FullGen => None,
            LayerView::CaveWith => Some(&self.cave),
            LayerView::CaveWithout => Some(&self.cave_without_tunnels),
            LayerView::LargeClump => Some(&self.large_clump),
            LayerView::SmallClump => Some(&self.small_clump),
            LayerView::Dots => Some(&self.dots),
            LayerView::WaterBefore => Some(&self.water_before_settle),
            LayerView::WaterAfter => Some(&self.water),
        }
    }

    /// Check every mask matches the declared size
    pub fn is_consistent(&self) -> bool {
        let masks = [
            &self.cave,
            &self.large_clump,
            &self.small_clump,
            &self.dots,
            &self.water,
            &self.cave_without_tunnels,
            &self.water_before_settle,
        ];
        self.surface_height.len() == self.width
            && masks
                .iter()
                .all(|m| m.width() == self.width && m.height() == self.height)
    }
}

/// Build every layer in order, reporting a checkpoint after each stage
pub fn synthesize(
    width: usize,
    height: usize,
    params: &GenerationParams,
    progress: &mut dyn ProgressSink,
    timings: &mut StageTimings,
) -> ProceduralLayers {
    let started = Instant::now();

    let surface_height = surface_layer(width, height, params);
    progress.report(0.2, "Surface Layer", "Cave Layer");

    let (cave_without_tunnels, cave) = cave_layer(width, height, params, &surface_height);
    log::debug!("Cave layer: {} open cells", cave.count_true());
    progress.report(0.3, "Cave Layer", "Large Clump Layer");

    let large_clump = mask_layer(width, height, params, NoiseLayer::LargeClump);
    progress.report(0.4, "Large Clump Layer", "Small Clump Layer");

    let small_clump = mask_layer(width, height, params, NoiseLayer::SmallClump);
    progress.report(0.5, "Small Clump Layer", "Dots Layer");

    let dots = mask_layer(width, height, params, NoiseLayer::Dots);
    progress.report(0.6, "Dots Layer", "Water Layer");

    let water_started = Instant::now();
    let water_before_settle = mask_layer(width, height, params, NoiseLayer::Water);
    let water = settle(&water_before_settle, &cave, &surface_height);
    timings.water = water_started.elapsed();
    progress.report(0.7, "Water Layer", "Converting Biomes To Tiles");

    timings.layers = started.elapsed();

    ProceduralLayers {
        width,
        height,
        surface_height,
        cave,
        large_clump,
        small_clump,
        dots,
        water,
        cave_without_tunnels,
        water_before_settle,
    }
}

/// Surface row per column, rescaled into the configured height band
pub fn surface_layer(width: usize, height: usize, params: &GenerationParams) -> Vec<f32> {
    let h = height as f32;
    let band = (params.surface_max_percent - params.surface_min_percent) * h / 100.0;
    let base = params.surface_min_percent * h / 100.0;
    generate_1d(width, params.noise(NoiseLayer::Surface))
        .into_iter()
        .map(|v| band * v + base)
        .collect()
}

/// Cave mask before and after tunnel carving
fn cave_layer(
    width: usize,
    height: usize,
    params: &GenerationParams,
    surface: &[f32],
) -> (BoolField, BoolField) {
    let cave_params = params.noise(NoiseLayer::Cave);
    let band_top = (params.surface_max_percent * height as f32 / 100.0) as i32;
    let w = width as i32;

    let mut levels = generate_2d_from(width, height, cave_params);
    feather_levels(
        &mut levels,
        (0, 0),
        (w, band_top - EDGE_MARGIN),
        EDGE_MARGIN,
        FeatherEdges::TOP,
        true,
    );
    let without = threshold_pass(&levels, cave_params.threshold);

    carve_tunnels(&mut levels, surface, params);
    feather_levels(
        &mut levels,
        (0, 0),
        (w, band_top),
        EDGE_MARGIN,
        FeatherEdges::SIDES_AND_BOTTOM,
        true,
    );
    let mut cave = threshold_pass(&levels, cave_params.threshold);
    if params.min_cave_region > 0 {
        cave = fill_count_pass(&cave, true, params.min_cave_region);
    }

    (without, cave)
}

fn mask_layer(width: usize, height: usize, params: &GenerationParams, layer: NoiseLayer) -> BoolField {
    let noise = params.noise(layer);
    threshold_pass(&generate_2d_from(width, height, noise), noise.threshold)
}

/// Lower noise levels along every tunnel class so thresholding opens them.
///
/// Surface tunnels start on the surface line and head down; the rest start
/// at random points below it. Tunnel counts and anchors come from a stream
/// seeded by the surface tunnel seed.
pub fn carve_tunnels(levels: &mut ScalarField, surface: &[f32], params: &GenerationParams) {
    let (w, h) = (levels.width() as i32, levels.height() as i32);
    if w == 0 || h == 0 {
        return;
    }
    let mut rng = seeded_rng(params.tunnel(TunnelClass::Surface).seed);
    let surface_at = |x: i32| surface.get(x as usize).map_or(0, |s| *s as i32);
    let mut carved = 0usize;

    for class in TunnelClass::ALL {
        let mut tunnel_params: TunnelParams = *params.tunnel(class);
        let count = roll(&mut rng, tunnel_params.min_tunnels, tunnel_params.max_tunnels);

        for _ in 0..count.max(0) {
            let direction = match class {
                TunnelClass::Surface | TunnelClass::Vertical => TunnelDirection::Down,
                TunnelClass::Horizontal | TunnelClass::Flat => {
                    if roll(&mut rng, 0, 2) == 1 {
                        TunnelDirection::Right
                    } else {
                        TunnelDirection::Left
                    }
                }
            };
            let tunnel = generate_tunnel(&tunnel_params, direction);

            let x = roll(&mut rng, EDGE_MARGIN.min(w), (w - EDGE_MARGIN).max(0)).clamp(0, w - 1);
            let y = match class {
                TunnelClass::Surface => surface_at(x),
                _ => roll(&mut rng, EDGE_MARGIN.min(h), (surface_at(x) - EDGE_MARGIN).max(0)),
            };

            for (dx, dy) in tunnel {
                if let Some(level) = levels.get_mut(x + dx, y + dy) {
                    *level *= TUNNEL_CARVE_FACTOR;
                    carved += 1;
                }
            }
            tunnel_params.seed = scramble_seed(tunnel_params.seed, TUNNEL_SEED_FACTOR);
        }
    }

    log::debug!("Tunnel pass carved {} cells", carved);
}
