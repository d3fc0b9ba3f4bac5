//! WFC cell
//!
//! One output position with its remaining biome options.

use rand::rngs::StdRng;
use rand::Rng;

use super::ruleset::{Histogram, Rule, Ruleset};
use crate::world::biome::Biome;

/// Radius of the same-biome search around a cell's source position
pub const PROXIMITY_RANGE: f32 = 16.0;

/// Diagonal histogram lookups are clamped to this range
const DIAGONAL_CLAMP: (f32, f32) = (0.05, 5.0);

/// A biome still possible for a cell, with its running weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiomeOption {
    pub biome: Biome,
    pub weight: f32,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub index: usize,
    pub collapsed: bool,
    pub biome: Biome,
    pub options: Vec<BiomeOption>,
    /// Biome of the source cell this one overlays; used when no option survives
    pub fallback: Biome,
    pub perc_height: f32,
    pub perc_length: f32,
    pub perc_diag_tr: f32,
    pub perc_diag_br: f32,
    /// Distance to the nearest source cell of each biome, capped at
    /// [`PROXIMITY_RANGE`]
    pub proximity: [f32; Biome::COUNT],
}

impl Cell {
    /// Fresh cell at `(x, y)` of a `width x height` output, allowing every
    /// biome except `None` with weight 1
    pub fn new(
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        fallback: Biome,
        proximity: [f32; Biome::COUNT],
    ) -> Self {
        let options = Biome::ALL[1..]
            .iter()
            .map(|b| BiomeOption {
                biome: *b,
                weight: 1.0,
            })
            .collect();
        let (w, h) = (width as f32, height as f32);
        Self {
            index: x + y * width,
            collapsed: false,
            biome: Biome::None,
            options,
            fallback,
            perc_height: 1.0 - y as f32 / h,
            perc_length: x as f32 / w,
            perc_diag_tr: (x + y) as f32 / (w + h),
            perc_diag_br: (x + (height - y - 1)) as f32 / (w + h),
            proximity,
        }
    }

    /// Number of options left
    pub fn entropy(&self) -> usize {
        self.options.len()
    }

    /// Weight each option by position and locality, then draw one.
    ///
    /// Returns `true` when nothing survived and the fallback biome was used.
    pub fn collapse(&mut self, rng: &mut StdRng, ruleset: &Ruleset) -> bool {
        if self.collapsed {
            return false;
        }

        let (lo, hi) = DIAGONAL_CLAMP;
        let mut total = 0.0;
        let mut weighted = Vec::with_capacity(self.options.len());
        for option in &self.options {
            let b = option.biome;
            let mut weight = option.weight;
            weight *= ruleset.weight_at(Histogram::Height, b, self.perc_height);
            weight *= ruleset.weight_at(Histogram::Length, b, self.perc_length);
            weight *= ruleset.weight_at(Histogram::DiagonalBr, b, self.perc_diag_br).clamp(lo, hi);
            weight *= ruleset.weight_at(Histogram::DiagonalTr, b, self.perc_diag_tr).clamp(lo, hi);
            weight *= (1.0 - self.proximity[b.index()] / PROXIMITY_RANGE).clamp(0.0, 1.0);
            if weight > 0.0 {
                total += weight;
                weighted.push(BiomeOption { biome: b, weight });
            }
        }

        self.collapsed = true;
        if weighted.is_empty() || total <= 0.0 {
            self.biome = self.fallback;
            return true;
        }

        let mut point = rng.gen_range(0.0..total);
        let mut chosen = weighted.len() - 1;
        for (i, option) in weighted.iter().enumerate() {
            if option.weight < point {
                point -= option.weight;
            } else {
                chosen = i;
                break;
            }
        }
        self.biome = weighted[chosen].biome;
        false
    }

    /// Narrow the options by a neighbour's rule. Options the rule forbids are
    /// dropped and the rest are scaled by the rule weight; if nothing would
    /// survive the options stay as they were.
    pub fn constrain(&mut self, rule: &Rule) {
        if self.collapsed || self.options.is_empty() || rule.allow_all {
            return;
        }
        let narrowed: Vec<BiomeOption> = self
            .options
            .iter()
            .filter_map(|o| {
                let w = rule.weight(o.biome);
                (w != 0.0).then_some(BiomeOption {
                    biome: o.biome,
                    weight: o.weight * w,
                })
            })
            .collect();
        if !narrowed.is_empty() {
            self.options = narrowed;
        }
    }
}
