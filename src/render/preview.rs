//! PNG previews
//!
//! Paints biome maps, tile maps and individual layers into images. Image
//! row 0 is the top of the world.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageResult, Rgba, RgbaImage};

use crate::world::biome::BiomeGrid;
use crate::world::generation::{LayerView, MapOutput};
use crate::world::grid::BoolField;
use crate::world::palette::BiomePalette;
use crate::world::tile::TileGrid;

/// Cave walls are drawn at this fraction of their biome's colour
const WALL_SHADE: f32 = 0.45;

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Colour of one tile. Walls take their biome's colour, darkened; sky is
/// transparent.
pub fn tile_color(tiles: &TileGrid, palette: &BiomePalette, x: usize, y: usize) -> Rgba<u8> {
    let tile = tiles.tiles[(x, y)];
    if tile.uses_biome_color() {
        let [r, g, b] = palette.color_of(tiles.biomes[(x, y)]);
        let shade = |c: u8| (c as f32 * WALL_SHADE) as u8;
        return Rgba([shade(r), shade(g), shade(b), 255]);
    }
    match tile.color() {
        Some((r, g, b)) => Rgba([r, g, b, 255]),
        None => CLEAR,
    }
}

pub fn tile_image(tiles: &TileGrid, palette: &BiomePalette) -> RgbaImage {
    let (w, h) = (tiles.width(), tiles.height());
    RgbaImage::from_fn(w as u32, h as u32, |x, y| {
        tile_color(tiles, palette, x as usize, h - 1 - y as usize)
    })
}

pub fn biome_image(grid: &BiomeGrid, palette: &BiomePalette) -> RgbaImage {
    let (w, h) = (grid.width(), grid.height());
    RgbaImage::from_fn(w as u32, h as u32, |x, y| {
        let [r, g, b] = palette.color_of(grid[(x as usize, h - 1 - y as usize)]);
        Rgba([r, g, b, 255])
    })
}

/// Set cells white, the rest black
pub fn mask_image(mask: &BoolField) -> RgbaImage {
    let (w, h) = (mask.width(), mask.height());
    RgbaImage::from_fn(w as u32, h as u32, |x, y| {
        if mask[(x as usize, h - 1 - y as usize)] {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    })
}

/// Image for one layer view of a finished run
pub fn layer_image(output: &MapOutput, view: LayerView, palette: &BiomePalette) -> RgbaImage {
    match output.layers.view(view) {
        Some(mask) => mask_image(mask),
        None => tile_image(&output.tiles, palette),
    }
}

/// Write `<name>_<view>.png` for every layer view into `dir`
pub fn export_previews(
    dir: &Path,
    name: &str,
    output: &MapOutput,
    palette: &BiomePalette,
) -> ImageResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(LayerView::ALL.len() + 1);

    let path = dir.join(format!("{}_biomes.png", name));
    biome_image(&output.tiles.biomes, palette).save(&path)?;
    written.push(path);

    for view in LayerView::ALL {
        let path = dir.join(format!("{}_{}.png", name, view.name()));
        layer_image(output, view, palette).save(&path)?;
        written.push(path);
    }

    log::info!("Wrote {} preview images to {:?}", written.len(), dir);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::biome::Biome;
    use crate::world::grid::Grid;
    use crate::world::tile::TileId;

    fn tiles() -> TileGrid {
        let biomes = Grid::new(2, 2, Biome::Lava);
        let tiles = Grid::from_fn(2, 2, |x, y| match (x, y) {
            (0, 0) => TileId::Wall,
            (1, 0) => TileId::Stone,
            _ => TileId::None,
        });
        TileGrid { tiles, biomes }
    }

    #[test]
    fn test_wall_uses_darkened_biome_color() {
        let palette = BiomePalette::default();
        let [r, _, _] = palette.color_of(Biome::Lava);
        let c = tile_color(&tiles(), &palette, 0, 0);
        assert_eq!(c.0[0], (r as f32 * WALL_SHADE) as u8);
        assert_eq!(c.0[3], 255);
    }

    #[test]
    fn test_sky_is_transparent_and_rows_flip() {
        let palette = BiomePalette::default();
        let img = tile_image(&tiles(), &palette);
        // Image top row is world row 1 (all sky)
        assert_eq!(*img.get_pixel(0, 0), CLEAR);
        assert_eq!(img.get_pixel(1, 1).0[3], 255);
    }

    #[test]
    fn test_mask_image() {
        let mask = Grid::from_fn(3, 1, |x, _| x == 1);
        let img = mask_image(&mask);
        assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }
}
