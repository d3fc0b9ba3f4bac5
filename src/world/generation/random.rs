//! Seeded random helpers
//!
//! Range rolls that tolerate inverted or empty ranges, and the seed
//! scramble recurrence used to evolve seeds between runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Modulus of the seed scramble recurrence
pub const SEED_MODULUS: i64 = 10_000_000;

/// Roll an integer in `[min, max)`. Inverted bounds are swapped and an empty
/// range returns the lower bound.
pub fn roll(rng: &mut StdRng, min: i32, max: i32) -> i32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if lo >= hi {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}

/// Roll a float in `[min, max)` with the same tolerance as [`roll`]
pub fn roll_f32(rng: &mut StdRng, min: f32, max: f32) -> f32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if lo >= hi {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}

/// Advance a seed: `|trunc(seed * factor) mod 10_000_000|`
pub fn scramble_seed(seed: i64, factor: f64) -> i64 {
    (((seed as f64) * factor) as i64 % SEED_MODULUS).abs()
}

/// Deterministic generator for a signed seed
pub fn seeded_rng(seed: i64) -> StdRng {
    StdRng::seed_from_u64(seed as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_handles_degenerate_ranges() {
        let mut rng = seeded_rng(1);
        assert_eq!(roll(&mut rng, 5, 5), 5);
        for _ in 0..50 {
            let v = roll(&mut rng, 10, 2);
            assert!((2..10).contains(&v));
        }
        assert_eq!(roll_f32(&mut rng, 0.5, 0.5), 0.5);
    }

    #[test]
    fn test_scramble_seed_stays_in_range() {
        let mut seed = 1234;
        for _ in 0..100 {
            seed = scramble_seed(seed, 5.213);
            assert!((0..SEED_MODULUS).contains(&seed));
        }
        assert_eq!(scramble_seed(1000, 4.51), 4510);
        assert_eq!(scramble_seed(-1000, 4.51), 4510);
    }
}
