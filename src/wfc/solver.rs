//! WFC solver
//!
//! Collapses an output grid one cell at a time, always choosing among the
//! most constrained cells, and propagates each choice to the four
//! neighbours through the ruleset.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::Rng;

use super::cell::{Cell, PROXIMITY_RANGE};
use super::ruleset::{Direction, Ruleset};
use crate::session::ProgressSink;
use crate::world::biome::{Biome, BiomeGrid};
use crate::world::grid::Grid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveOptions {
    /// Publish the partial grid every this many collapses
    pub snapshot_every: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WfcTimings {
    pub selection: Duration,
    pub collapse: Duration,
    pub propagation: Duration,
}

#[derive(Debug, Clone)]
pub struct WfcOutput {
    pub grid: BiomeGrid,
    /// Cells that had no surviving option and took their source biome
    pub fallbacks: usize,
    pub passes: usize,
    pub timings: WfcTimings,
}

/// Per source cell, the distance to the nearest cell of each biome within
/// [`PROXIMITY_RANGE`]
pub fn proximity_table(source: &BiomeGrid) -> Grid<[f32; Biome::COUNT]> {
    let range = PROXIMITY_RANGE as i32;
    let (w, h) = (source.width() as i32, source.height() as i32);
    Grid::from_fn(source.width(), source.height(), |sx, sy| {
        let (sx, sy) = (sx as i32, sy as i32);
        let mut nearest = [PROXIMITY_RANGE; Biome::COUNT];
        for x in (sx - range).max(0)..(sx + range).min(w) {
            for y in (sy - range).max(0)..(sy + range).min(h) {
                let biome = source[(x as usize, y as usize)];
                let (dx, dy) = ((x - sx) as f32, (y - sy) as f32);
                let slot = &mut nearest[biome.index()];
                *slot = slot.min((dx * dx + dy * dy).sqrt());
            }
        }
        nearest
    })
}

/// One fresh cell per output position, each remembering the source cell
/// it overlays
pub fn init_cells(source: &BiomeGrid, width: usize, height: usize) -> Vec<Cell> {
    let proximity = proximity_table(source);
    let (sw, sh) = (source.width(), source.height());
    let mut cells = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let (fallback, near) = if source.is_empty() {
                (Biome::None, [PROXIMITY_RANGE; Biome::COUNT])
            } else {
                let sx = (sw * x / width).min(sw - 1);
                let sy = (sh * y / height).min(sh - 1);
                (source[(sx, sy)], proximity[(sx, sy)])
            };
            cells.push(Cell::new(x, y, width, height, fallback, near));
        }
    }
    cells
}

/// Synthesize a `width x height` biome grid from a ruleset.
///
/// `source` is the example the ruleset was learned from; it supplies the
/// fallback biome and the locality bias for each cell.
pub fn solve(
    rng: &mut StdRng,
    ruleset: &Ruleset,
    source: &BiomeGrid,
    width: usize,
    height: usize,
    options: &SolveOptions,
    progress: &mut dyn ProgressSink,
) -> WfcOutput {
    let started = Instant::now();
    let total = width * height;
    let mut cells = init_cells(source, width, height);
    let mut timings = WfcTimings::default();
    let mut lowest: Vec<usize> = Vec::new();
    let mut remaining = total;
    let mut passes = 0;
    let mut fallbacks = 0;
    progress.report(0.0, "", "Wave Function Collapse");

    while remaining > 0 && passes < total {
        let t = Instant::now();
        let index = select_cell(rng, &cells, &lowest);
        timings.selection += t.elapsed();

        let t = Instant::now();
        if cells[index].collapse(rng, ruleset) {
            fallbacks += 1;
        }
        remaining -= 1;
        lowest.retain(|i| *i != index);
        timings.collapse += t.elapsed();

        let t = Instant::now();
        propagate(&mut cells, index, width, height, ruleset, &mut lowest);
        timings.propagation += t.elapsed();

        passes += 1;
        if let Some(every) = options.snapshot_every.filter(|n| *n > 0) {
            if passes % every == 0 {
                progress.snapshot(&to_grid(&cells, width, height));
                progress.report(
                    passes as f32 / total as f32,
                    &format!("Collapsed {}/{}", passes, total),
                    "Wave Function Collapse",
                );
            }
        }
    }

    log::info!(
        "WFC {}x{} solved in {:.1?} ({} passes, {} fallbacks; selection {:.1?}, collapse {:.1?}, propagation {:.1?})",
        width,
        height,
        started.elapsed(),
        passes,
        fallbacks,
        timings.selection,
        timings.collapse,
        timings.propagation
    );
    progress.report(1.0, "Wave Function Collapse", "");

    WfcOutput {
        grid: to_grid(&cells, width, height),
        fallbacks,
        passes,
        timings,
    }
}

/// A random cell from the lowest-entropy list, or any uncollapsed cell
/// when the list is empty
fn select_cell(rng: &mut StdRng, cells: &[Cell], lowest: &[usize]) -> usize {
    if !lowest.is_empty() {
        return lowest[rng.gen_range(0..lowest.len())];
    }
    let start = rng.gen_range(0..cells.len());
    (0..cells.len())
        .map(|offset| (start + offset) % cells.len())
        .find(|i| !cells[*i].collapsed)
        .unwrap_or(start)
}

/// Apply the collapsed cell's rules to its uncollapsed neighbours and keep
/// the lowest-entropy list current
fn propagate(
    cells: &mut [Cell],
    index: usize,
    width: usize,
    height: usize,
    ruleset: &Ruleset,
    lowest: &mut Vec<usize>,
) {
    let (x, y) = ((index % width) as i32, (index / width) as i32);
    let rules = ruleset.biome_rules(cells[index].biome);

    for direction in Direction::ALL {
        let (dx, dy) = direction.offset();
        let (nx, ny) = (x + dx, y + dy);
        if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
            continue;
        }
        let neighbour = nx as usize + ny as usize * width;
        if cells[neighbour].collapsed {
            continue;
        }
        cells[neighbour].constrain(rules.rule(direction));

        let entropy = cells[neighbour].entropy();
        match lowest.first().map(|i| cells[*i].entropy()) {
            Some(current) if entropy < current => {
                lowest.clear();
                lowest.push(neighbour);
            }
            Some(current) if entropy > current => {}
            _ => {
                if !lowest.contains(&neighbour) {
                    lowest.push(neighbour);
                }
            }
        }
    }
}

/// Current state as a grid; uncollapsed cells read as `None`
fn to_grid(cells: &[Cell], width: usize, height: usize) -> BiomeGrid {
    Grid::from_fn(width, height, |x, y| {
        let cell = &cells[x + y * width];
        if cell.collapsed {
            cell.biome
        } else {
            Biome::None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::progress::{NullProgress, RecordingProgress};
    use rand::SeedableRng;

    fn example() -> BiomeGrid {
        Grid::from_fn(8, 6, |x, y| match (x / 4, y / 3) {
            (0, 0) => Biome::Desert,
            (1, 0) => Biome::Lava,
            (0, 1) => Biome::Standard,
            _ => Biome::Frozen,
        })
    }

    fn run(seed: u64, width: usize, height: usize) -> WfcOutput {
        let source = example();
        let ruleset = Ruleset::from_example(&source);
        let mut rng = StdRng::seed_from_u64(seed);
        solve(
            &mut rng,
            &ruleset,
            &source,
            width,
            height,
            &SolveOptions::default(),
            &mut NullProgress,
        )
    }

    #[test]
    fn test_every_cell_assigned() {
        for (w, h) in [(8, 6), (20, 14), (5, 17), (1, 1)] {
            let output = run(11, w, h);
            assert_eq!((output.grid.width(), output.grid.height()), (w, h));
            assert!(output.passes <= w * h);
            assert!(output.grid.cells().iter().all(|b| *b != Biome::None));
        }
    }

    #[test]
    fn test_only_example_biomes_appear() {
        let output = run(5, 24, 18);
        let allowed = [Biome::Desert, Biome::Lava, Biome::Standard, Biome::Frozen];
        assert!(output.grid.cells().iter().all(|b| allowed.contains(b)));
    }

    #[test]
    fn test_seeded_solve_is_deterministic() {
        assert_eq!(run(42, 16, 12).grid, run(42, 16, 12).grid);
    }

    #[test]
    fn test_rederived_ruleset_matches_output() {
        let output = run(7, 16, 12);
        let rs = Ruleset::from_example(&output.grid);
        let grid = &output.grid;
        for a in Biome::ALL {
            let mut up = [0.0f32; Biome::COUNT];
            for y in 0..grid.height() - 1 {
                for x in 0..grid.width() {
                    if grid[(x, y)] == a {
                        up[grid[(x, y + 1)].index()] += 1.0;
                    }
                }
            }
            assert_eq!(rs.biome_rules(a).up.weights, up);
        }
    }

    #[test]
    fn test_fallback_uses_source_biome() {
        // A ruleset learned elsewhere gives no weight to the source's biome
        let source = Grid::new(4, 4, Biome::Swamp);
        let ruleset = Ruleset::from_example(&Grid::new(4, 4, Biome::Rocky));
        let mut rng = StdRng::seed_from_u64(1);
        let output = solve(
            &mut rng,
            &ruleset,
            &source,
            6,
            6,
            &SolveOptions::default(),
            &mut NullProgress,
        );
        assert_eq!(output.fallbacks, 36);
        assert!(output.grid.cells().iter().all(|b| *b == Biome::Swamp));
    }

    #[test]
    fn test_fallbacks_rare_on_real_example() {
        let source = example();
        let ruleset = Ruleset::from_example(&source);
        let (w, h) = (30, 20);
        for seed in [3, 17, 99] {
            let output = run(seed, w, h);
            assert!(
                output.fallbacks * 20 <= w * h,
                "{} fallbacks in {} cells",
                output.fallbacks,
                w * h
            );

            // Every rule violation must touch a fallback cell
            let grid = &output.grid;
            let mut violations = 0;
            for y in 0..h as i32 {
                for x in 0..w as i32 {
                    let biome = grid[(x as usize, y as usize)];
                    for direction in [Direction::Up, Direction::Right] {
                        let (dx, dy) = direction.offset();
                        if let Some(next) = grid.get(x + dx, y + dy) {
                            if ruleset.biome_rules(biome).rule(direction).weight(*next) == 0.0 {
                                violations += 1;
                            }
                        }
                    }
                }
            }
            assert!(violations <= 4 * output.fallbacks, "{} violations", violations);
        }
    }

    #[test]
    fn test_snapshots_published() {
        let source = example();
        let ruleset = Ruleset::from_example(&source);
        let mut progress = RecordingProgress::default();
        let options = SolveOptions {
            snapshot_every: Some(10),
        };
        solve(
            &mut StdRng::seed_from_u64(2),
            &ruleset,
            &source,
            10,
            10,
            &options,
            &mut progress,
        );
        assert_eq!(progress.snapshots, 10);
    }

    #[test]
    fn test_proximity_table() {
        let table = proximity_table(&example());
        assert_eq!(table[(0, 0)][Biome::Desert.index()], 0.0);
        assert_eq!(table[(0, 0)][Biome::Lava.index()], 4.0);
        assert_eq!(table[(0, 0)][Biome::Jungle.index()], PROXIMITY_RANGE);
    }
}
