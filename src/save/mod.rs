//! Save/load system
//!
//! Persists generated grids, layer bundles and rulesets as JSON.

pub mod store;

pub use store::{default_dir, MapStore, RecordKind, SaveError};
