//! Coherent noise synthesis
//!
//! Fractal Perlin sums (1D and 2D) normalized to [0, 1], plus Worley and
//! Voronoi point fields used to texture crystal clusters.

use noise::{NoiseFn, Perlin};
use rand::Rng;

use super::params::NoiseParams;
use super::random::seeded_rng;
use crate::world::grid::{Grid, ScalarField};

/// Scales below this are clamped up
const MIN_SCALE: f64 = 0.0001;

/// Range of the per-octave sample offsets
const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// Generate a 2D fractal noise field with values in [0, 1]
#[allow(clippy::too_many_arguments)]
pub fn generate_2d(
    width: usize,
    height: usize,
    octaves: u32,
    seed: i64,
    persistence: f32,
    lacunarity: f32,
    scale: (f32, f32),
    offset: (f32, f32),
) -> ScalarField {
    let mut rng = seeded_rng(seed);
    let octave_offsets: Vec<(f64, f64)> = (0..octaves)
        .map(|_| {
            let ox = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64 + offset.0 as f64;
            let oy = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64 - offset.1 as f64;
            (ox, oy)
        })
        .collect();

    let perlin = Perlin::new(seed as u32);
    let scale_x = (scale.0 as f64).max(MIN_SCALE);
    let scale_y = (scale.1 as f64).max(MIN_SCALE);
    let half_width = width as f64 * 0.5;
    let half_height = height as f64 * 0.5;

    let mut min_value = f64::MAX;
    let mut max_value = f64::MIN;
    let raw = Grid::from_fn(width, height, |x, y| {
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut value = 0.0;

        for &(ox, oy) in &octave_offsets {
            let sample_x = (x as f64 - half_width) / scale_x * frequency + ox * frequency;
            let sample_y = (y as f64 - half_height) / scale_y * frequency - oy * frequency;
            value += perlin.get([sample_x, sample_y]) * amplitude;
            amplitude *= persistence as f64;
            frequency *= lacunarity as f64;
        }

        min_value = min_value.min(value);
        max_value = max_value.max(value);
        value
    });

    raw.map(|&v| inverse_lerp(min_value, max_value, v))
}

/// Generate a 2D field from a layer's parameters
pub fn generate_2d_from(width: usize, height: usize, params: &NoiseParams) -> ScalarField {
    generate_2d(
        width,
        height,
        params.octaves,
        params.seed,
        params.persistence,
        params.lacunarity,
        params.scale,
        params.offset,
    )
}

/// Generate a 1D fractal noise line with values in [0, 1]. Only the x
/// components of scale and offset are used.
pub fn generate_1d(size: usize, params: &NoiseParams) -> Vec<f32> {
    let mut rng = seeded_rng(params.seed);
    let octave_offsets: Vec<f64> = (0..params.octaves)
        .map(|_| rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64 + params.offset.0 as f64)
        .collect();

    let perlin = Perlin::new(params.seed as u32);
    let scale_x = (params.scale.0 as f64).max(MIN_SCALE);
    let half_width = size as f64 * 0.5;

    let mut min_value = f64::MAX;
    let mut max_value = f64::MIN;
    let raw: Vec<f64> = (0..size)
        .map(|x| {
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            let mut value = 0.0;
            for &ox in &octave_offsets {
                let sample_x = (x as f64 - half_width) / scale_x * frequency + ox * frequency;
                value += perlin.get([sample_x, 0.0]) * amplitude;
                amplitude *= params.persistence as f64;
                frequency *= params.lacunarity as f64;
            }
            min_value = min_value.min(value);
            max_value = max_value.max(value);
            value
        })
        .collect();

    raw.into_iter()
        .map(|v| inverse_lerp(min_value, max_value, v))
        .collect()
}

/// Worley noise: `1 - clamp(d_k / max_dist, 0, 1)` where `d_k` is the
/// distance to the `closest_index`-th nearest of `region_count` seeded points
pub fn worley(
    width: usize,
    height: usize,
    region_count: usize,
    seed: i64,
    closest_index: usize,
    max_dist: f32,
) -> ScalarField {
    let points = region_points(width, height, region_count, seed);
    if points.is_empty() {
        return Grid::new(width, height, 0.0);
    }
    let k = closest_index.min(points.len() - 1);
    let max_dist = max_dist.max(f32::EPSILON);

    let mut dists = vec![0.0f32; points.len()];
    Grid::from_fn(width, height, |x, y| {
        for (d, &(px, py)) in dists.iter_mut().zip(&points) {
            *d = distance(x, y, px, py);
        }
        dists.sort_by(|a, b| a.total_cmp(b));
        1.0 - (dists[k] / max_dist).clamp(0.0, 1.0)
    })
}

/// Voronoi labelling: index of the nearest seeded point per cell
pub fn voronoi(width: usize, height: usize, region_count: usize, seed: i64) -> Grid<usize> {
    let points = region_points(width, height, region_count, seed);
    Grid::from_fn(width, height, |x, y| {
        let mut nearest = 0;
        let mut best = f32::MAX;
        for (i, &(px, py)) in points.iter().enumerate() {
            let d = distance(x, y, px, py);
            if d < best {
                best = d;
                nearest = i;
            }
        }
        nearest
    })
}

fn region_points(width: usize, height: usize, count: usize, seed: i64) -> Vec<(usize, usize)> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let mut rng = seeded_rng(seed);
    (0..count)
        .map(|_| (rng.gen_range(0..width), rng.gen_range(0..height)))
        .collect()
}

fn distance(x: usize, y: usize, px: usize, py: usize) -> f32 {
    let dx = x as f32 - px as f32;
    let dy = y as f32 - py as f32;
    (dx * dx + dy * dy).sqrt()
}

/// Position of `v` between `min` and `max`, 0 when the range is empty
fn inverse_lerp(min: f64, max: f64, v: f64) -> f32 {
    if max > min {
        ((v - min) / (max - min)).clamp(0.0, 1.0) as f32
    } else {
        0.0
    }
}
