//! Configuration data
//!
//! Generation parameters and the biome palette live in external RON files
//! so they can be tuned without rebuilding.

pub mod loader;

pub use loader::{
    export_default_palette, export_default_params, load_palette, load_params, try_load_params,
    ConfigError,
};
