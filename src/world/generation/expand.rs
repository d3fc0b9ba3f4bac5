//! Biome map expansion
//!
//! Upsamples a coarse biome map so every coarse cell becomes a
//! `biome_size x biome_size` block, dithering the seams where biomes meet.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::Rng;

use crate::world::biome::{Biome, BiomeGrid};
use crate::world::grid::Grid;

/// Expand a coarse biome map into a fine one of size
/// `(width * biome_size) x (height * biome_size)`.
pub fn expand(
    rng: &mut StdRng,
    coarse: &BiomeGrid,
    biome_size: usize,
    transition_percent: f32,
) -> BiomeGrid {
    let (cw, ch) = (coarse.width() as i32, coarse.height() as i32);
    let bs = biome_size as i32;
    let (fw, fh) = (cw * bs, ch * bs);
    let mut fine = Grid::new(fw.max(0) as usize, fh.max(0) as usize, Biome::None);
    if coarse.is_empty() || bs == 0 {
        return fine;
    }

    let corners = transition_corners(coarse);
    let cell = |x: i32, y: i32| coarse[(x.clamp(0, cw - 1) as usize, y.clamp(0, ch - 1) as usize)];

    for cx in 0..=cw {
        for cy in 0..=ch {
            // Fine box centred on this corner
            let (x0, y0) = ((cx * bs - bs / 2).max(0), (cy * bs - bs / 2).max(0));
            let (x1, y1) = (
                (cx * bs + (bs - 1) / 2).min(fw - 1),
                (cy * bs + (bs - 1) / 2).min(fh - 1),
            );

            if corners.contains(&(cx, cy)) {
                let quadrants = [
                    cell(cx - 1, cy - 1),
                    cell(cx, cy - 1),
                    cell(cx - 1, cy),
                    cell(cx, cy),
                ];
                let lock_x = cx == 0 || cx == cw;
                let lock_y = cy == 0 || cy == ch;
                let block = transition_block(rng, quadrants, lock_x, lock_y, bs, transition_percent);

                let origin_x = (cx as f32 - 0.5) * bs as f32;
                let origin_y = (cy as f32 - 0.5) * bs as f32;
                for fx in x0..=x1 {
                    for fy in y0..=y1 {
                        let bx = ((fx as f32 - origin_x) as i32).clamp(0, bs - 1) as usize;
                        let by = ((fy as f32 - origin_y) as i32).clamp(0, bs - 1) as usize;
                        fine[(fx as usize, fy as usize)] = block[(bx, by)];
                    }
                }
            } else {
                let biome = cell(cx, cy);
                for fx in x0..=x1 {
                    for fy in y0..=y1 {
                        fine[(fx as usize, fy as usize)] = biome;
                    }
                }
            }
        }
    }

    fine
}

/// Coarse grid corners where the surrounding cells do not all match.
/// Corner `(x, y)` is the bottom-left corner of cell `(x, y)`.
pub fn transition_corners(coarse: &BiomeGrid) -> HashSet<(i32, i32)> {
    let mut corners = HashSet::new();
    let (w, h) = (coarse.width(), coarse.height());
    for x in 0..w {
        for y in 0..h {
            let here = coarse[(x, y)];
            let (xi, yi) = (x as i32, y as i32);
            if y + 1 < h && coarse[(x, y + 1)] != here {
                corners.insert((xi, yi + 1));
                corners.insert((xi + 1, yi + 1));
            }
            if x + 1 < w && coarse[(x + 1, y)] != here {
                corners.insert((xi + 1, yi));
                corners.insert((xi + 1, yi + 1));
            }
        }
    }
    corners
}

/// Build one dithered `size x size` block around a transition corner.
///
/// `quadrants` holds the bottom-left, bottom-right, top-left and top-right
/// biomes. Inside the transition zone each axis may flip to the opposite
/// quadrant; the chance of keeping the cell's own quadrant rises from 50% at
/// the centre to 100% at the zone edge. Locked axes never flip.
fn transition_block(
    rng: &mut StdRng,
    quadrants: [Biome; 4],
    lock_x: bool,
    lock_y: bool,
    size: i32,
    transition_percent: f32,
) -> Grid<Biome> {
    let half = (size - 1) as f32 * 0.5;
    let zone = transition_percent * 0.01;
    let dithered = half > 0.0 && zone > 0.0;

    Grid::from_fn(size as usize, size as usize, |x, y| {
        let dx = x as f32 - half;
        let dy = y as f32 - half;

        let mut flip_x = false;
        let mut flip_y = false;
        if dithered {
            let px = (dx.abs() / half) / zone;
            let py = (dy.abs() / half) / zone;
            if px <= 1.0 && py <= 1.0 {
                let roll = rng.gen_range(0..100) as f32 * 0.01;
                flip_x = roll > 0.5 + px * 0.5 && !lock_x;
                let roll = rng.gen_range(0..100) as f32 * 0.01;
                flip_y = roll > 0.5 + py * 0.5 && !lock_y;
            }
        }

        let right = (dx >= 0.0) != flip_x;
        let top = (dy >= 0.0) != flip_y;
        quadrants[right as usize + 2 * top as usize]
    })
}
