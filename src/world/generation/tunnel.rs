//! Tunnel carving
//!
//! Randomized polyline tunnels: a chain of vertices joined by biased grid
//! walks, oriented by direction and thickened by a BFS dilation.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::Rng;

use super::params::TunnelParams;
use super::random::{roll, seeded_rng};

const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Which way a tunnel heads from its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TunnelDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Generate the cell offsets of one tunnel, relative to its anchor.
///
/// The result always contains the origin. Cells are unique and ordered
/// centerline first, then each dilation ring.
pub fn generate_tunnel(params: &TunnelParams, direction: TunnelDirection) -> Vec<(i32, i32)> {
    let mut rng = seeded_rng(params.seed);
    let centerline = carve_centerline(&mut rng, params);
    let oriented = orient(centerline, direction);
    dilate(&oriented, params.thickness)
}

/// Build the raw polyline heading right, wandering up and down
fn carve_centerline(rng: &mut StdRng, params: &TunnelParams) -> Vec<(i32, i32)> {
    let mut tiles = vec![(0, 0)];
    let vertices = roll(rng, params.min_vertex_count, params.max_vertex_count);
    let mut flip_aim = rng.gen_bool(0.5);
    let mut from = (0i32, 0i32);

    for i in 0..vertices.max(0) {
        let dist = roll(
            rng,
            (100.0 * params.min_vertex_dist) as i32,
            (100.0 * params.max_vertex_dist) as i32,
        ) as f32
            * 0.01;
        let ratio = roll(
            rng,
            (100.0 * params.min_ratio) as i32,
            (100.0 * params.max_ratio) as i32,
        ) as f32
            * 0.01;
        let angle = (ratio * 90.0).to_radians();
        let rise = if i == 0 { 1 } else { 2 };
        let aim = if flip_aim { -1 } else { 1 };
        let to = (
            from.0 + (dist * angle.cos()) as i32,
            from.1 + (dist * angle.sin()) as i32 * rise * aim,
        );
        flip_aim = !flip_aim;

        walk(rng, from, to, &mut tiles);
        from = to;
    }

    tiles
}

/// Step from `from` to `to` one cell at a time, biased toward the axis with
/// more distance left. Ends exactly on `to`.
fn walk(rng: &mut StdRng, from: (i32, i32), to: (i32, i32), tiles: &mut Vec<(i32, i32)>) {
    let mut cur = from;
    while cur != to {
        let (dx, dy) = (to.0 - cur.0, to.1 - cur.1);
        let horizontal = if dy == 0 {
            true
        } else if dx == 0 {
            false
        } else {
            roll(rng, 0, dx.abs() + dy.abs()) < dx.abs()
        };
        if horizontal {
            cur.0 += dx.signum();
        } else {
            cur.1 += dy.signum();
        }
        tiles.push(cur);
    }
}

/// Rotate a rightward path into the requested direction
fn orient(tiles: Vec<(i32, i32)>, direction: TunnelDirection) -> Vec<(i32, i32)> {
    match direction {
        TunnelDirection::Right => tiles,
        TunnelDirection::Up => tiles.into_iter().map(|(x, y)| (y, x)).collect(),
        TunnelDirection::Left => tiles.into_iter().map(|(x, y)| (-x, y)).collect(),
        TunnelDirection::Down => tiles.into_iter().map(|(x, y)| (y, -x)).collect(),
    }
}

/// Grow a set of cells outward by `thickness` 4-neighbour rings
pub fn dilate(tiles: &[(i32, i32)], thickness: u32) -> Vec<(i32, i32)> {
    let mut seen: HashSet<(i32, i32)> = HashSet::with_capacity(tiles.len());
    let mut all: Vec<(i32, i32)> = tiles.iter().copied().filter(|t| seen.insert(*t)).collect();
    let mut frontier = all.clone();

    for _ in 0..thickness {
        let mut next = Vec::new();
        for &(x, y) in &frontier {
            for (dx, dy) in DIRECTIONS {
                let target = (x + dx, y + dy);
                if seen.insert(target) {
                    next.push(target);
                }
            }
        }
        all.extend_from_slice(&next);
        frontier = next;
    }

    all
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params() -> TunnelParams {
        TunnelParams {
            seed: 918_273,
            min_tunnels: 1,
            max_tunnels: 3,
            min_vertex_count: 2,
            max_vertex_count: 6,
            min_vertex_dist: 5.0,
            max_vertex_dist: 20.0,
            min_ratio: 0.1,
            max_ratio: 0.9,
            thickness: 0,
        }
    }

    #[test]
    fn test_tunnel_contains_origin() {
        for direction in [
            TunnelDirection::Up,
            TunnelDirection::Down,
            TunnelDirection::Left,
            TunnelDirection::Right,
        ] {
            let tunnel = generate_tunnel(&sample_params(), direction);
            assert!(!tunnel.is_empty());
            assert!(tunnel.contains(&(0, 0)));
        }
    }

    #[test]
    fn test_degenerate_params_still_non_empty() {
        let mut params = sample_params();
        params.min_vertex_count = 0;
        params.max_vertex_count = 0;
        assert_eq!(generate_tunnel(&params, TunnelDirection::Right), vec![(0, 0)]);
    }

    #[test]
    fn test_centerline_is_connected() {
        let tunnel = generate_tunnel(&sample_params(), TunnelDirection::Right);
        let set: HashSet<_> = tunnel.iter().copied().collect();
        assert_eq!(set.len(), tunnel.len());
        for &(x, y) in &tunnel {
            if (x, y) == (0, 0) {
                continue;
            }
            assert!(DIRECTIONS
                .iter()
                .any(|(dx, dy)| set.contains(&(x + dx, y + dy))));
        }
    }

    #[test]
    fn test_dilation_is_superset() {
        let mut params = sample_params();
        for k in 1..4 {
            params.thickness = k - 1;
            let thin: HashSet<_> = generate_tunnel(&params, TunnelDirection::Down)
                .into_iter()
                .collect();
            params.thickness = k;
            let thick: HashSet<_> = generate_tunnel(&params, TunnelDirection::Down)
                .into_iter()
                .collect();
            assert!(thin.is_subset(&thick));
            assert!(thick.len() > thin.len());
        }
    }

    #[test]
    fn test_dilate_single_cell() {
        assert_eq!(dilate(&[(0, 0)], 1).len(), 5);
        assert_eq!(dilate(&[(0, 0)], 2).len(), 13);
        assert_eq!(dilate(&[(0, 0), (0, 0)], 0), vec![(0, 0)]);
    }

    #[test]
    fn test_direction_transforms() {
        let path = vec![(0, 0), (3, 1)];
        assert_eq!(orient(path.clone(), TunnelDirection::Up)[1], (1, 3));
        assert_eq!(orient(path.clone(), TunnelDirection::Left)[1], (-3, 1));
        assert_eq!(orient(path, TunnelDirection::Down)[1], (1, -3));
    }

    #[test]
    fn test_same_seed_same_tunnel() {
        let a = generate_tunnel(&sample_params(), TunnelDirection::Left);
        let b = generate_tunnel(&sample_params(), TunnelDirection::Left);
        assert_eq!(a, b);
    }
}
