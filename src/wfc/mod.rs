//! Wave Function Collapse
//!
//! Learns a ruleset from a hand-drawn biome map and synthesizes new biome
//! maps of any size from it.

pub mod cell;
pub mod ruleset;
pub mod solver;

pub use cell::{BiomeOption, Cell};
pub use ruleset::{BiomeRules, Direction, Histogram, Rule, Ruleset};
pub use solver::{solve, SolveOptions, WfcOutput, WfcTimings};
