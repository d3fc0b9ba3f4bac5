//! Biome palette
//!
//! Maps biomes to paint colours and back. Hand-painted maps are imported by
//! snapping every pixel to the nearest palette colour.

use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::biome::{Biome, BiomeGrid};
use super::grid::Grid;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("biome palette has no entries")]
    Empty,
    #[error("failed to read biome image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// One palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiomeColor {
    pub biome: Biome,
    pub rgb: [u8; 3],
}

/// Ordered biome → colour table. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BiomePalette {
    entries: Vec<BiomeColor>,
}

impl BiomePalette {
    /// Build a palette, rejecting an empty entry list
    pub fn new(entries: Vec<BiomeColor>) -> Result<Self, PaletteError> {
        if entries.is_empty() {
            return Err(PaletteError::Empty);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[BiomeColor] {
        &self.entries
    }

    /// Colour of a biome; biomes missing from the table use the first entry
    pub fn color_of(&self, biome: Biome) -> [u8; 3] {
        self.entries
            .iter()
            .find(|e| e.biome == biome)
            .unwrap_or(&self.entries[0])
            .rgb
    }

    /// Biome whose colour is closest to `rgb`
    pub fn biome_of(&self, rgb: [u8; 3]) -> Biome {
        let mut closest = self.entries[0].biome;
        let mut lowest = u32::MAX;
        for entry in &self.entries {
            let variance = color_variance(rgb, entry.rgb);
            if variance < lowest {
                lowest = variance;
                closest = entry.biome;
            }
        }
        closest
    }

    /// Convert an image into a biome map. Image row 0 is the top of the map.
    pub fn grid_from_image(&self, img: &RgbImage) -> BiomeGrid {
        let (w, h) = (img.width() as usize, img.height() as usize);
        Grid::from_fn(w, h, |x, y| {
            let px = img.get_pixel(x as u32, (h - 1 - y) as u32);
            self.biome_of(px.0)
        })
    }

    /// Load a painted PNG as a biome map
    pub fn import_png<P: AsRef<Path>>(&self, path: P) -> Result<BiomeGrid, PaletteError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| PaletteError::Image {
            path: path.display().to_string(),
            source,
        })?;
        let grid = self.grid_from_image(&img.to_rgb8());
        log::info!(
            "Imported {}x{} biome map from {}",
            grid.width(),
            grid.height(),
            path.display()
        );
        Ok(grid)
    }

    /// Paint a biome map into an image, flipping rows so the top of the world is up
    pub fn grid_to_image(&self, grid: &BiomeGrid) -> RgbImage {
        let (w, h) = (grid.width(), grid.height());
        RgbImage::from_fn(w as u32, h as u32, |x, y| {
            let biome = grid[(x as usize, h - 1 - y as usize)];
            image::Rgb(self.color_of(biome))
        })
    }
}

impl Default for BiomePalette {
    fn default() -> Self {
        let table = [
            (Biome::None, [0, 0, 0]),
            (Biome::Standard, [94, 160, 72]),
            (Biome::Frozen, [200, 230, 250]),
            (Biome::Desert, [232, 206, 128]),
            (Biome::Swamp, [88, 104, 60]),
            (Biome::Rocky, [128, 128, 128]),
            (Biome::SharpRocky, [80, 80, 96]),
            (Biome::Lava, [220, 72, 24]),
            (Biome::Jungle, [24, 120, 40]),
            (Biome::Radioactive, [150, 255, 60]),
            (Biome::Luscious, [255, 150, 200]),
        ];
        Self {
            entries: table
                .iter()
                .map(|&(biome, rgb)| BiomeColor { biome, rgb })
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for BiomePalette {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            entries: Vec<BiomeColor>,
        }

        let raw = Raw::deserialize(deserializer)?;
        BiomePalette::new(raw.entries).map_err(serde::de::Error::custom)
    }
}

fn color_variance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&p, &q)| {
            let d = p as i32 - q as i32;
            (d * d) as u32
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_palette_rejected() {
        assert!(matches!(BiomePalette::new(Vec::new()), Err(PaletteError::Empty)));
    }

    #[test]
    fn test_nearest_color_lookup() {
        let palette = BiomePalette::default();
        assert_eq!(palette.biome_of([230, 200, 130]), Biome::Desert);
        assert_eq!(palette.biome_of(palette.color_of(Biome::Lava)), Biome::Lava);
    }

    #[test]
    fn test_missing_biome_uses_first_entry() {
        let palette = BiomePalette::new(vec![BiomeColor {
            biome: Biome::Rocky,
            rgb: [1, 2, 3],
        }])
        .unwrap();
        assert_eq!(palette.color_of(Biome::Jungle), [1, 2, 3]);
    }

    #[test]
    fn test_image_rows_flip() {
        let palette = BiomePalette::default();
        let grid = Grid::from_fn(2, 2, |_, y| if y == 0 { Biome::Lava } else { Biome::Frozen });
        let img = palette.grid_to_image(&grid);
        // Top image row holds the top of the world
        assert_eq!(img.get_pixel(0, 0).0, palette.color_of(Biome::Frozen));
        assert_eq!(palette.grid_from_image(&img), grid);
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<BiomePalette>(r#"{"entries":[]}"#).is_err());
    }
}
