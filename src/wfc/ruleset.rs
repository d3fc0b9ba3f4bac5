//! WFC ruleset
//!
//! Adjacency counts and positional histograms learned from an example
//! biome map.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::world::biome::{Biome, BiomeGrid};

/// Neighbour direction. `Up` is towards larger `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Right => (1, 0),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
        }
    }
}

/// Weights a biome allows for its neighbour in one direction.
/// Raw co-occurrence counts, not probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Pass-through rule that leaves a neighbour's options untouched
    pub allow_all: bool,
    pub weights: [f32; Biome::COUNT],
}

impl Rule {
    pub fn empty() -> Self {
        Self {
            allow_all: false,
            weights: [0.0; Biome::COUNT],
        }
    }

    pub fn allow_all() -> Self {
        Self {
            allow_all: true,
            weights: [1.0; Biome::COUNT],
        }
    }

    pub fn weight(&self, biome: Biome) -> f32 {
        self.weights[biome.index()]
    }
}

/// Everything learned about one biome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomeRules {
    pub biome: Biome,
    pub up: Rule,
    pub right: Rule,
    pub down: Rule,
    pub left: Rule,
    /// Occurrences per row, top row first
    pub height: Vec<f32>,
    /// Occurrences per column
    pub length: Vec<f32>,
    /// Occurrences per `x + y`
    pub diag_tr: Vec<f32>,
    /// Occurrences per `x + (height - y - 1)`
    pub diag_br: Vec<f32>,
}

impl BiomeRules {
    fn new(biome: Biome, width: usize, height: usize) -> Self {
        Self {
            biome,
            up: Rule::empty(),
            right: Rule::empty(),
            down: Rule::empty(),
            left: Rule::empty(),
            height: vec![0.0; height],
            length: vec![0.0; width],
            diag_tr: vec![0.0; width + height],
            diag_br: vec![0.0; width + height],
        }
    }

    pub fn rule(&self, direction: Direction) -> &Rule {
        match direction {
            Direction::Up => &self.up,
            Direction::Right => &self.right,
            Direction::Down => &self.down,
            Direction::Left => &self.left,
        }
    }

    fn rule_mut(&mut self, direction: Direction) -> &mut Rule {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Right => &mut self.right,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
        }
    }
}

/// Which positional histogram to sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Histogram {
    Height,
    Length,
    DiagonalTr,
    DiagonalBr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Size of the example map the rules were learned from
    pub width: usize,
    pub height: usize,
    /// One entry per biome, in index order
    pub rules: Vec<BiomeRules>,
}

impl Ruleset {
    /// Count adjacencies and positional occurrences over an example map
    pub fn from_example(example: &BiomeGrid) -> Self {
        let started = Instant::now();
        let (w, h) = (example.width(), example.height());
        let mut rules: Vec<BiomeRules> = Biome::ALL.iter().map(|b| BiomeRules::new(*b, w, h)).collect();

        for y in 0..h {
            for x in 0..w {
                let biome = example[(x, y)];
                let entry = &mut rules[biome.index()];
                entry.height[h - 1 - y] += 1.0;
                entry.length[x] += 1.0;
                entry.diag_tr[x + y] += 1.0;
                entry.diag_br[x + (h - y - 1)] += 1.0;

                for direction in Direction::ALL {
                    let (dx, dy) = direction.offset();
                    if let Some(neighbour) = example.get(x as i32 + dx, y as i32 + dy) {
                        entry.rule_mut(direction).weights[neighbour.index()] += 1.0;
                    }
                }
            }
        }

        log::debug!("Ruleset built from {}x{} example in {:.1?}", w, h, started.elapsed());
        Self {
            width: w,
            height: h,
            rules,
        }
    }

    pub fn biome_rules(&self, biome: Biome) -> &BiomeRules {
        &self.rules[biome.index()]
    }

    /// Histogram value for `biome` at a position fraction in `[0, 1]`
    pub fn weight_at(&self, histogram: Histogram, biome: Biome, percent: f32) -> f32 {
        let entry = self.biome_rules(biome);
        let chance = match histogram {
            Histogram::Height => &entry.height,
            Histogram::Length => &entry.length,
            Histogram::DiagonalTr => &entry.diag_tr,
            Histogram::DiagonalBr => &entry.diag_br,
        };
        if chance.is_empty() {
            return 0.0;
        }
        let index = ((percent * chance.len() as f32).floor() as i64).clamp(0, chance.len() as i64 - 1);
        chance[index as usize]
    }

    /// Check the table has one entry per biome with consistent histogram sizes
    pub fn is_consistent(&self) -> bool {
        self.rules.len() == Biome::COUNT
            && self.rules.iter().enumerate().all(|(i, r)| {
                r.biome.index() == i
                    && r.height.len() == self.height
                    && r.length.len() == self.width
                    && r.diag_tr.len() == self.width + self.height
                    && r.diag_br.len() == self.width + self.height
            })
    }
}
