//! Dense 2D grids
//!
//! Every map structure (scalar fields, masks, biome and tile maps) is a flat
//! row-major vector with a fixed width and height. Row 0 is the bottom of the
//! world; y grows upward.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell count {found} does not match {width}x{height}")]
    LengthMismatch {
        width: usize,
        height: usize,
        found: usize,
    },
}

/// A fixed-size 2D grid stored as `cells[x + y * width]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

/// Continuous noise levels, usually normalized to [0, 1]
pub type ScalarField = Grid<f32>;

/// Boolean mask (cave, clump, water...)
pub type BoolField = Grid<bool>;

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `fill`
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Wrap an existing row-major vector
    pub fn from_vec(width: usize, height: usize, cells: Vec<T>) -> Result<Self, GridError> {
        if width.checked_mul(height) != Some(cells.len()) {
            return Err(GridError::LengthMismatch {
                width,
                height,
                found: cells.len(),
            });
        }
        Ok(Self { width, height, cells })
    }

    /// Build a grid by evaluating `f(x, y)` for every cell
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self { width, height, cells }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Convert 2D coordinates to the flat index
    #[inline]
    pub fn xy_to_idx(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    /// Convert a flat index back to 2D coordinates
    #[inline]
    pub fn idx_to_xy(&self, idx: usize) -> (usize, usize) {
        (idx % self.width, idx / self.width)
    }

    /// Check if signed coordinates are inside the grid
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Get the cell at signed coordinates, `None` when out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<&T> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.xy_to_idx(x as usize, y as usize)])
        } else {
            None
        }
    }

    /// Mutable access at signed coordinates
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut T> {
        if self.in_bounds(x, y) {
            let idx = self.xy_to_idx(x as usize, y as usize);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// Set a cell, ignoring out-of-bounds writes
    pub fn set(&mut self, x: i32, y: i32, value: T) {
        if let Some(cell) = self.get_mut(x, y) {
            *cell = value;
        }
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    pub fn into_cells(self) -> Vec<T> {
        self.cells
    }

    /// Map every cell into a new grid of the same size
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            cells: self.cells.iter().map(f).collect(),
        }
    }
}

impl<T: Copy> Grid<T> {
    /// Copy out the cell at signed coordinates, or `default` outside the grid
    #[inline]
    pub fn get_or(&self, x: i32, y: i32, default: T) -> T {
        self.get(x, y).copied().unwrap_or(default)
    }
}

impl BoolField {
    /// Number of true cells
    pub fn count_true(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}

impl<T> Index<(usize, usize)> for Grid<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        &self.cells[x + y * self.width]
    }
}

impl<T> IndexMut<(usize, usize)> for Grid<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        &mut self.cells[x + y * self.width]
    }
}

/// Records whose cell count disagrees with their dimensions are rejected
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Grid<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<U> {
            width: usize,
            height: usize,
            cells: Vec<U>,
        }

        let raw = Raw::<T>::deserialize(deserializer)?;
        Grid::from_vec(raw.width, raw.height, raw.cells).map_err(serde::de::Error::custom)
    }
}
