//! Fractal Brownian motion over any [`NoiseSource`].

use super::NoiseSource;
use serde::{Deserialize, Serialize};

/// Octave layering parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractalParams {
    /// Number of noise layers, at least one
    pub octaves: u32,
    /// Frequency multiplier applied after each octave
    pub lacunarity: f64,
    /// Amplitude multiplier applied after each octave
    pub gain: f64,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            octaves: 32,
            lacunarity: 1.2,
            gain: 0.85,
        }
    }
}

impl FractalParams {
    /// Sum of the octave amplitudes, the largest magnitude [`fbm`] can reach
    /// for a source bounded by one.
    #[must_use]
    pub fn amplitude_sum(&self) -> f64 {
        let mut amplitude = 1.0;
        let mut sum = 0.0;
        for _ in 0..self.octaves {
            sum += amplitude;
            amplitude *= self.gain;
        }
        sum
    }
}

/// Fractal sum of `noise` at `(x, y)`.
///
/// Starts at amplitude 1 and frequency 1; each octave adds
/// `amplitude * noise(freq * x, freq * y)` and then scales the frequency by
/// `lacunarity` and the amplitude by `gain`. The sum is not normalized.
#[inline]
pub fn fbm(noise: &dyn NoiseSource, x: f64, y: f64, params: &FractalParams) -> f64 {
    let mut sum = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    for _ in 0..params.octaves {
        sum += amplitude * noise.sample(frequency * x, frequency * y);
        frequency *= params.lacunarity;
        amplitude *= params.gain;
    }
    sum
}
