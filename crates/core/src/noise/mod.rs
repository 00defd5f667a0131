//! Noise primitives and fractal accumulation
//!
//! The heightfield only depends on the [`NoiseSource`] trait, a seeded coherent
//! noise sampled at continuous `(x, y)`. Two sources ship with the crate:
//!
//! - [`SimplexNoise`]: simplex noise from the `noise` crate (default)
//! - [`GradientNoise`]: Perlin-style gradient noise with a seed-shuffled permutation table
//!
//! [`fbm`] composes any source across octaves, and [`cell_jitter`] provides the
//! uncorrelated per-cell perturbation used to texture water.

pub mod fractal;
pub mod gradient;
pub mod hash;
pub mod simplex;

pub use fractal::{fbm, FractalParams};
pub use gradient::GradientNoise;
pub use hash::cell_jitter;
pub use simplex::SimplexNoise;

use serde::{Deserialize, Serialize};

/// Seeded coherent noise over the plane
///
/// Implementations must be deterministic for a given seed and safe to sample
/// from many band workers at once.
pub trait NoiseSource: Send + Sync {
    /// Sample the field at `(x, y)`; values lie roughly in `[-1, 1]`
    fn sample(&self, x: f64, y: f64) -> f64;
}

/// Which noise primitive drives heightfield synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    /// Simplex noise
    #[default]
    Simplex,
    /// Perlin-style gradient noise
    Gradient,
}

impl NoiseKind {
    /// Build the noise source for this kind and seed
    #[must_use]
    pub fn build(self, seed: u32) -> Box<dyn NoiseSource> {
        match self {
            Self::Simplex => Box::new(SimplexNoise::new(seed)),
            Self::Gradient => Box::new(GradientNoise::new(u64::from(seed))),
        }
    }
}
