//! Perlin-style gradient noise.
//!
//! A single-octave lattice gradient noise: each integer lattice point gets one
//! of eight unit gradients picked through a seed-shuffled permutation table,
//! and the corner contributions are blended with the quintic fade curve.
//! Octaves are layered on top by [`super::fbm`].

use super::NoiseSource;

/// Permutation table size (must be power of 2).
const PERM_SIZE: usize = 256;

/// Eight unit gradients, 45° apart.
const GRADIENTS: [(f64, f64); 8] = {
    use std::f64::consts::FRAC_1_SQRT_2;
    [
        (1.0, 0.0),
        (FRAC_1_SQRT_2, FRAC_1_SQRT_2),
        (0.0, 1.0),
        (-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
        (-1.0, 0.0),
        (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
        (0.0, -1.0),
        (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    ]
};

/// Seeded 2D gradient noise.
///
/// Deterministic for a given seed; returns values in roughly `[-0.71, 0.71]`.
#[derive(Clone, Debug)]
pub struct GradientNoise {
    /// Seed the permutation table was shuffled with.
    pub seed: u64,

    /// Doubled permutation table, avoids wrapping on the second lookup.
    perm: Vec<u8>,
}

impl GradientNoise {
    /// Create gradient noise for `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            perm: Self::generate_permutation(seed),
        }
    }

    /// Generate permutation table from seed.
    ///
    /// Fisher-Yates shuffle driven by a MINSTD linear congruential generator.
    fn generate_permutation(seed: u64) -> Vec<u8> {
        let mut perm: Vec<u8> = (0..=255).collect();

        // A zero state would stay zero forever
        let mut rng_state = seed.wrapping_rem(2_147_483_647).max(1);
        for i in (1..PERM_SIZE).rev() {
            rng_state = rng_state.wrapping_mul(48_271).wrapping_rem(2_147_483_647);
            let j = (rng_state as usize) % (i + 1);
            perm.swap(i, j);
        }

        let mut doubled = perm.clone();
        doubled.extend_from_slice(&perm);
        doubled
    }

    /// Hash lattice coordinates to a gradient index.
    #[inline]
    fn hash(&self, x: i64, y: i64) -> usize {
        let px = (x & 0xFF) as usize;
        let py = (y & 0xFF) as usize;
        (self.perm[self.perm[px] as usize + py] as usize) & 0x07
    }

    /// Dot product between a corner gradient and the offset to the sample.
    #[inline]
    fn gradient_dot(&self, ix: i64, iy: i64, dx: f64, dy: f64) -> f64 {
        let grad = GRADIENTS[self.hash(ix, iy)];
        grad.0 * dx + grad.1 * dy
    }

    /// Quintic fade `6t^5 - 15t^4 + 10t^3`.
    #[inline]
    fn fade(t: f64) -> f64 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    #[inline]
    fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + t * (b - a)
    }
}

impl NoiseSource for GradientNoise {
    fn sample(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let x1 = x0 + 1;
        let y1 = y0 + 1;

        let fx = x - x.floor();
        let fy = y - y.floor();

        let sx = Self::fade(fx);
        let sy = Self::fade(fy);

        let n00 = self.gradient_dot(x0, y0, fx, fy);
        let n10 = self.gradient_dot(x1, y0, fx - 1.0, fy);
        let n01 = self.gradient_dot(x0, y1, fx, fy - 1.0);
        let n11 = self.gradient_dot(x1, y1, fx - 1.0, fy - 1.0);

        let nx0 = Self::lerp(n00, n10, sx);
        let nx1 = Self::lerp(n01, n11, sx);
        Self::lerp(nx0, nx1, sy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_noise_zero_at_lattice_points() {
        let n = GradientNoise::new(12345);
        for i in -5..5 {
            for j in -5..5 {
                let v = n.sample(f64::from(i), f64::from(j));
                assert!(v.abs() < 1e-12, "Lattice value at ({i}, {j}) was {v}");
            }
        }
    }

    #[test]
    fn gradient_noise_produces_valid_range() {
        let n = GradientNoise::new(12345);
        for i in 0..1000 {
            let x = f64::from(i) * 0.73;
            let y = f64::from(i) * 1.17;
            let value = n.sample(x, y);
            assert!(
                (-1.0..=1.0).contains(&value),
                "Noise value {value} at ({x}, {y}) is outside [-1, 1] range"
            );
        }
    }

    #[test]
    fn gradient_noise_deterministic_with_seed() {
        let a = GradientNoise::new(99999);
        let b = GradientNoise::new(99999);
        let c = GradientNoise::new(11111);

        let mut all_same = true;
        for i in 0..100 {
            let x = f64::from(i) * 1.37 + 0.5;
            let y = f64::from(i) * 1.93 + 0.25;
            assert_eq!(a.sample(x, y).to_bits(), b.sample(x, y).to_bits());
            if (a.sample(x, y) - c.sample(x, y)).abs() > 1e-12 {
                all_same = false;
            }
        }
        assert!(!all_same, "Different seeds should produce different noise");
    }

    #[test]
    fn gradient_noise_is_continuous() {
        let n = GradientNoise::new(7);
        let base = n.sample(3.3, 4.4);
        let near = n.sample(3.3001, 4.4001);
        assert!((base - near).abs() < 0.01);
    }

    #[test]
    fn zero_seed_still_shuffles() {
        let n = GradientNoise::new(0);
        let identity: Vec<u8> = (0..=255).collect();
        assert_ne!(&n.perm[..PERM_SIZE], identity.as_slice());
    }
}
