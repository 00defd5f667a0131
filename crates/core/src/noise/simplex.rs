//! Simplex noise backed by the `noise` crate.

use super::NoiseSource;
use noise::{NoiseFn, Simplex};

/// Seeded 2D simplex noise
#[derive(Clone, Debug)]
pub struct SimplexNoise {
    inner: Simplex,
}

impl SimplexNoise {
    /// Create simplex noise for `seed`
    #[must_use]
    pub fn new(seed: u32) -> Self {
        Self {
            inner: Simplex::new(seed),
        }
    }
}

impl NoiseSource for SimplexNoise {
    #[inline]
    fn sample(&self, x: f64, y: f64) -> f64 {
        self.inner.get([x, y])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplex_deterministic() {
        let a = SimplexNoise::new(42);
        let b = SimplexNoise::new(42);
        for i in 0..100 {
            let x = f64::from(i) * 0.173;
            let y = f64::from(i) * 0.291;
            assert_eq!(a.sample(x, y).to_bits(), b.sample(x, y).to_bits());
        }
    }

    #[test]
    fn test_simplex_is_bounded_and_varies() {
        let n = SimplexNoise::new(3);
        let values: Vec<f64> = (0..1000)
            .map(|i| n.sample(f64::from(i) * 0.071, f64::from(i) * 0.113))
            .collect();
        assert!(values.iter().all(|v| v.is_finite() && v.abs() <= 1.5));
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        assert!(max - min > 0.5, "Simplex field looks flat: [{min}, {max}]");
    }
}
