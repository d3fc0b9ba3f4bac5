//! Field utilities
//!
//! Thresholding, edge feathering and connected-region filtering over
//! scalar and boolean fields.

use crate::world::grid::{BoolField, ScalarField};

/// 4-connected neighbour offsets
const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Mark cells whose level is at or *below* `threshold`.
///
/// Lower noise passes. Every threshold in the pipeline is tuned against this
/// convention, so raising a threshold grows the mask.
pub fn threshold_pass(field: &ScalarField, threshold: f32) -> BoolField {
    field.map(|&v| v <= threshold)
}

/// Which edges of a feather box ramp off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatherEdges {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl FeatherEdges {
    pub const TOP: FeatherEdges = FeatherEdges {
        top: true,
        right: false,
        bottom: false,
        left: false,
    };

    pub const ALL: FeatherEdges = FeatherEdges {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };

    /// Right, bottom and left, leaving the top open
    pub const SIDES_AND_BOTTOM: FeatherEdges = FeatherEdges {
        top: false,
        right: true,
        bottom: true,
        left: true,
    };
}

/// Push levels toward failing the threshold near the edges of a box.
///
/// Cells outside `[start, end)` are forced to 1.0. Inside, each enabled edge
/// ramps from 0 at the boundary to 1 over `border` cells; the ramps multiply
/// and `1 - ramp` is added to the level, so values never drop.
pub fn feather_levels(
    field: &mut ScalarField,
    start: (i32, i32),
    end: (i32, i32),
    border: i32,
    edges: FeatherEdges,
    root_falloff: bool,
) {
    let (w, h) = (field.width() as i32, field.height() as i32);
    let (sx, sy) = (start.0.clamp(0, w), start.1.clamp(0, h));
    let (ex, ey) = (end.0.clamp(sx, w), end.1.clamp(sy, h));
    let border_f = border.max(1) as f32;

    for y in 0..h {
        for x in 0..w {
            let Some(level) = field.get_mut(x, y) else {
                continue;
            };
            if x < sx || x >= ex || y < sy || y >= ey {
                *level = 1.0;
                continue;
            }

            let mut ramp = 1.0f32;
            if edges.bottom && y < sy + border {
                ramp *= (y - sy) as f32 / border_f;
            }
            if edges.top && y >= ey - border {
                ramp *= (ey - y - 1) as f32 / border_f;
            }
            if edges.left && x < sx + border {
                ramp *= (x - sx) as f32 / border_f;
            }
            if edges.right && x >= ex - border {
                ramp *= (ex - x - 1) as f32 / border_f;
            }

            if root_falloff {
                ramp = ramp.sqrt();
            }
            *level += 1.0 - ramp;
        }
    }
}

/// Clear 4-connected true regions by size.
///
/// With `keep_if_below` set, regions smaller than `quantity` are cleared;
/// otherwise regions larger than `quantity` are cleared.
pub fn fill_count_pass(mask: &BoolField, keep_if_below: bool, quantity: usize) -> BoolField {
    let mut output = mask.clone();
    let mut visited = vec![false; mask.len()];
    let mut region = Vec::new();
    let mut stack = Vec::new();

    for start in 0..mask.len() {
        if visited[start] || !mask.cells()[start] {
            continue;
        }

        region.clear();
        visited[start] = true;
        stack.push(start);
        while let Some(idx) = stack.pop() {
            region.push(idx);
            let (x, y) = mask.idx_to_xy(idx);
            for (dx, dy) in DIRECTIONS {
                let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                if !mask.get_or(nx, ny, false) {
                    continue;
                }
                let nidx = mask.xy_to_idx(nx as usize, ny as usize);
                if !visited[nidx] {
                    visited[nidx] = true;
                    stack.push(nidx);
                }
            }
        }

        let size = region.len();
        if (keep_if_below && size < quantity) || (!keep_if_below && size > quantity) {
            for &idx in &region {
                output.cells_mut()[idx] = false;
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::grid::Grid;

    #[test]
    fn test_threshold_scenario() {
        // Rows listed bottom-up: row 0 = [0.2, 0.8], row 1 = [0.5, 0.5]
        let field = Grid::from_vec(2, 2, vec![0.2, 0.8, 0.5, 0.5]).unwrap();
        let mask = threshold_pass(&field, 0.5);
        assert_eq!(mask.cells(), &[true, false, true, true]);
    }

    #[test]
    fn test_threshold_monotonic() {
        let field = Grid::from_fn(10, 10, |x, y| ((x * 7 + y * 13) % 10) as f32 / 10.0);
        let low = threshold_pass(&field, 0.3);
        let high = threshold_pass(&field, 0.6);
        for (l, h) in low.cells().iter().zip(high.cells()) {
            assert!(!*l || *h);
        }
        assert!(high.count_true() > low.count_true());
    }

    #[test]
    fn test_feather_never_lowers_levels() {
        let original = Grid::from_fn(20, 20, |x, y| ((x + y) % 5) as f32 / 5.0);
        let mut field = original.clone();
        feather_levels(&mut field, (0, 0), (20, 15), 4, FeatherEdges::ALL, true);
        for (before, after) in original.cells().iter().zip(field.cells()) {
            assert!(after >= before);
        }
        // Outside the box is forced to 1
        assert_eq!(field[(3, 17)], 1.0);
        // Boundary cells get the full push, interior cells none
        assert_eq!(field[(0, 5)], original[(0, 5)] + 1.0);
        assert_eq!(field[(10, 7)], original[(10, 7)]);
    }

    #[test]
    fn test_feather_top_only() {
        let mut field = Grid::new(10, 10, 0.0f32);
        feather_levels(&mut field, (0, 0), (10, 8), 4, FeatherEdges::TOP, false);
        assert_eq!(field[(0, 0)], 0.0);
        assert_eq!(field[(5, 7)], 1.0);
        assert_eq!(field[(5, 9)], 1.0);
        assert!((field[(5, 5)] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fill_count_removes_small_regions() {
        #[rustfmt::skip]
        let cells = vec![
            true,  true,  false, false, true,
            true,  true,  false, false, false,
            false, false, false, true,  false,
        ];
        let mask = Grid::from_vec(5, 3, cells).unwrap();
        let filtered = fill_count_pass(&mask, true, 2);
        assert_eq!(filtered.count_true(), 4);
        assert!(!filtered[(4, 0)]);
        assert!(!filtered[(3, 2)]);

        let large_removed = fill_count_pass(&mask, false, 2);
        assert_eq!(large_removed.count_true(), 2);
    }

    #[test]
    fn test_fill_count_idempotent() {
        let mask = Grid::from_fn(16, 16, |x, y| (x * 3 + y * 5) % 7 < 3);
        let once = fill_count_pass(&mask, true, 4);
        let twice = fill_count_pass(&once, true, 4);
        assert_eq!(once, twice);
    }
}
