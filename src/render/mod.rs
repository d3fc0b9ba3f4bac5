//! Rendering
//!
//! Turns biome maps, tile maps and layers into PNG previews.

pub mod preview;

pub use preview::{biome_image, export_previews, layer_image, mask_image, tile_color, tile_image};
