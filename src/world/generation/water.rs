//! Water settling
//!
//! Drops water markers through open cave space, then raises a contiguous
//! water table in every column that caught water.

use crate::world::grid::BoolField;

/// Settle a thresholded water mask into the cave mask.
///
/// Only water cells inside the cave and at or below the surface take part.
pub fn settle(water: &BoolField, cave: &BoolField, surface: &[f32]) -> BoolField {
    let mut settled = drop_water(water, cave, surface);
    fill_columns(&mut settled, cave);
    settled
}

/// Drop phase: move each marker down, then left until blocked, then
/// diagonally down-left, then right, and mark where it comes to rest.
///
/// Cells outside the grid count as solid.
pub fn drop_water(water: &BoolField, cave: &BoolField, surface: &[f32]) -> BoolField {
    let (w, h) = (water.width() as i32, water.height() as i32);
    let mut occupied = BoolField::new(water.width(), water.height(), false);

    for y in 0..h {
        for x in (0..w).rev() {
            let surface_y = surface.get(x as usize).map_or(h, |s| *s as i32);
            if !water.get_or(x, y, false) || !cave.get_or(x, y, false) || y > surface_y {
                continue;
            }

            let open = |occupied: &BoolField, px: i32, py: i32| {
                cave.get_or(px, py, false) && !occupied.get_or(px, py, true)
            };

            let (mut px, mut py) = (x, y);
            let mut hit_left = false;
            loop {
                if open(&occupied, px, py - 1) {
                    py -= 1;
                    hit_left = false;
                } else if !hit_left {
                    if open(&occupied, px - 1, py) {
                        px -= 1;
                    } else {
                        hit_left = true;
                    }
                } else if open(&occupied, px - 1, py - 1) {
                    px -= 1;
                    py -= 1;
                } else if open(&occupied, px + 1, py) {
                    px += 1;
                } else {
                    break;
                }
            }
            occupied.set(px, py, true);
        }
    }

    occupied
}

/// Within each vertical run of open cave, everything above the first water
/// cell is flooded up to the next solid cell.
pub fn fill_columns(water: &mut BoolField, cave: &BoolField) {
    for x in 0..water.width() {
        let mut filling = false;
        for y in 0..water.height() {
            if !cave[(x, y)] {
                filling = false;
            } else if water[(x, y)] {
                filling = true;
            } else if filling {
                water[(x, y)] = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::grid::Grid;

    /// 3 wide, 6 tall, open shaft in column 1 from row 0 to row 4
    fn shaft() -> BoolField {
        Grid::from_fn(3, 6, |x, y| x == 1 && y <= 4)
    }

    #[test]
    fn test_single_shaft_drops_to_bottom() {
        let cave = shaft();
        let mut water = Grid::new(3, 6, false);
        water[(1, 4)] = true;
        let surface = vec![5.0; 3];

        let dropped = drop_water(&water, &cave, &surface);
        assert_eq!(dropped.count_true(), 1);
        assert!(dropped[(1, 0)]);
    }

    #[test]
    fn test_settled_shaft_fills_upward() {
        let cave = shaft();
        let mut water = Grid::new(3, 6, false);
        water[(1, 2)] = true;
        let settled = settle(&water, &cave, &[5.0; 3]);
        for y in 0..=4 {
            assert!(settled[(1, y)]);
        }
        assert!(!settled[(1, 5)]);
    }

    #[test]
    fn test_water_above_surface_ignored() {
        let cave = shaft();
        let mut water = Grid::new(3, 6, false);
        water[(1, 4)] = true;
        let settled = settle(&water, &cave, &[2.0; 3]);
        assert_eq!(settled.count_true(), 0);
    }

    #[test]
    fn test_water_outside_cave_ignored() {
        let cave = shaft();
        let water = Grid::from_fn(3, 6, |x, _| x != 1);
        assert_eq!(settle(&water, &cave, &[5.0; 3]).count_true(), 0);
    }

    #[test]
    fn test_markers_pack_along_floor() {
        // Flat chamber two rows tall; markers run left to the wall, then
        // back right until they meet the far wall or settled water
        let cave = Grid::from_fn(6, 4, |x, y| y <= 1 && x >= 1);
        let mut water = Grid::new(6, 4, false);
        water[(5, 1)] = true;
        water[(4, 1)] = true;
        let dropped = drop_water(&water, &cave, &[3.0; 6]);
        assert_eq!(dropped.count_true(), 2);
        assert!(dropped[(5, 0)]);
        assert!(dropped[(4, 0)]);
    }

    #[test]
    fn test_settled_water_stays_in_cave() {
        let cave = Grid::from_fn(12, 12, |x, y| (x + y) % 3 != 0);
        let water = Grid::from_fn(12, 12, |x, y| (x * y) % 4 == 1);
        let settled = settle(&water, &cave, &[11.0; 12]);
        for (w, c) in settled.cells().iter().zip(cave.cells()) {
            assert!(!*w || *c);
        }
    }
}
