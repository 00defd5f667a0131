//! Integer hash noise for uncorrelated per-cell jitter.

/// Seed multipliers, primes for better distribution
const SEED_X: i32 = 1619;
const SEED_Y: i32 = 31337;

/// Maximum value for positive i32 as f64 for safe conversion
const MAX_I32_POSITIVE: f64 = 0x7fff_ffff as f64;

/// Deterministic pseudo-random value in `[-1, 1]` for grid cell `(x, y)`.
///
/// Neighboring cells are uncorrelated; the same `(x, y, seed)` always maps to
/// the same value.
#[inline]
pub fn cell_jitter(x: usize, y: usize, seed: u32) -> f32 {
    let mut n = (x as i32)
        .wrapping_mul(SEED_X)
        .wrapping_add((y as i32).wrapping_mul(SEED_Y))
        .wrapping_add(seed as i32);
    n = (n << 13) ^ n;
    n = n
        .wrapping_mul(n.wrapping_mul(n).wrapping_mul(15731).wrapping_add(789_221))
        .wrapping_add(1_376_312_589);
    let unit = f64::from(n & 0x7fff_ffff) / MAX_I32_POSITIVE;
    (unit * 2.0 - 1.0) as f32
}
