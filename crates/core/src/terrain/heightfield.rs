//! Heightfield synthesis and range normalization
//!
//! Grid cell `(x, y)` is sampled at `(x * scale, y * scale)` with
//! `scale = rect_size / size / zoom`, so `zoom` controls the apparent feature
//! size independently of the grid resolution.

use crate::core_types::HeightField;
use crate::noise::{fbm, FractalParams, NoiseSource};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Whether raw fbm output is kept or rescaled to `[-1, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightMode {
    /// Raw fractal sum, unbounded by the number of octaves
    #[default]
    Raw,
    /// Global min/max rescale to `[-1, 1]`
    Normalized,
}

/// Closed value range of a field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightRange {
    /// Smallest value seen
    pub min: f32,
    /// Largest value seen
    pub max: f32,
}

impl HeightRange {
    /// Identity for [`HeightRange::merge`]
    pub const EMPTY: Self = Self {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    /// Range of the values in `values`
    #[must_use]
    pub fn of(values: &[f32]) -> Self {
        values.iter().fold(Self::EMPTY, |r, &v| r.include(v))
    }

    /// Widen the range to contain `value`
    #[inline]
    #[must_use]
    pub fn include(self, value: f32) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }

    /// Smallest range containing both
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// `max - min`; zero or negative for constant or empty input
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// True when normalization would divide by zero
    pub fn is_degenerate(&self) -> bool {
        self.span().partial_cmp(&0.0) != Some(std::cmp::Ordering::Greater)
    }
}

/// Fractal height sampler over a noise source
pub struct HeightSampler<'a> {
    noise: &'a dyn NoiseSource,
    fractal: FractalParams,
    sample_scale: f64,
}

impl<'a> HeightSampler<'a> {
    /// # Arguments
    ///
    /// * `noise` - Seeded noise primitive
    /// * `fractal` - Octave layering
    /// * `sample_scale` - Grid-to-noise coordinate factor, `rect_size / size / zoom`
    pub fn new(noise: &'a dyn NoiseSource, fractal: FractalParams, sample_scale: f64) -> Self {
        Self {
            noise,
            fractal,
            sample_scale,
        }
    }

    /// Raw fbm height of grid cell `(x, y)`
    #[inline]
    pub fn height_at(&self, x: usize, y: usize) -> f32 {
        let sx = x as f64 * self.sample_scale;
        let sy = y as f64 * self.sample_scale;
        fbm(self.noise, sx, sy, &self.fractal) as f32
    }
}

/// Fill a block of whole rows starting at `first_row`
///
/// `rows.len()` must be a multiple of `size`. Returns the range of the written values.
pub fn fill_height_rows(
    sampler: &HeightSampler<'_>,
    first_row: usize,
    size: usize,
    rows: &mut [f32],
) -> HeightRange {
    let mut range = HeightRange::EMPTY;
    for (local_y, row) in rows.chunks_mut(size).enumerate() {
        let y = first_row + local_y;
        for (x, cell) in row.iter_mut().enumerate() {
            let h = sampler.height_at(x, y);
            *cell = h;
            range = range.include(h);
        }
    }
    range
}

/// Map `value` from `range` onto `[-1, 1]`
///
/// A degenerate range maps everything to 0.
#[inline]
pub fn normalize_value(value: f32, range: HeightRange) -> f32 {
    if range.is_degenerate() {
        return 0.0;
    }
    (value - range.min) / range.span() * 2.0 - 1.0
}

/// Rescale the whole field to `[-1, 1]` using its global range
///
/// `range` must be the range of `heights`. A constant field becomes all zeros.
pub fn normalize_heights(heights: &mut HeightField, range: HeightRange) {
    if range.is_degenerate() {
        warn!(
            min = range.min,
            max = range.max,
            "Constant heightfield, normalizing to zero"
        );
        heights.as_mut_slice().par_iter_mut().for_each(|h| *h = 0.0);
        return;
    }
    heights
        .as_mut_slice()
        .par_iter_mut()
        .for_each(|h| *h = normalize_value(*h, range));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::SimplexNoise;
    use approx::assert_relative_eq;

    struct Plane;

    impl NoiseSource for Plane {
        fn sample(&self, x: f64, y: f64) -> f64 {
            x + 2.0 * y
        }
    }

    #[test]
    fn test_sampler_scales_grid_coordinates() {
        let fractal = FractalParams {
            octaves: 1,
            lacunarity: 2.0,
            gain: 0.5,
        };
        let sampler = HeightSampler::new(&Plane, fractal, 0.25);
        assert_relative_eq!(sampler.height_at(0, 0), 0.0);
        assert_relative_eq!(sampler.height_at(4, 0), 1.0);
        assert_relative_eq!(sampler.height_at(0, 2), 1.0);
    }

    #[test]
    fn test_fill_rows_offsets_by_first_row() {
        let fractal = FractalParams {
            octaves: 1,
            lacunarity: 2.0,
            gain: 0.5,
        };
        let sampler = HeightSampler::new(&Plane, fractal, 1.0);
        let mut rows = vec![0.0; 6];
        let range = fill_height_rows(&sampler, 2, 3, &mut rows);
        // rows y = 2 and y = 3 of a 3-wide grid
        assert_eq!(rows, vec![4.0, 5.0, 6.0, 6.0, 7.0, 8.0]);
        assert_eq!(range.min, 4.0);
        assert_eq!(range.max, 8.0);
    }

    #[test]
    fn test_normalization_maps_to_unit_range() {
        let mut field = HeightField::from_vec(2, vec![2.0, 4.0, 3.0, 6.0]).unwrap();
        let range = HeightRange::of(field.as_slice());
        normalize_heights(&mut field, range);
        assert_eq!(field.as_slice(), &[-1.0, 0.0, -0.5, 1.0]);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let noise = SimplexNoise::new(5);
        let sampler = HeightSampler::new(&noise, FractalParams::default(), 0.01);
        let mut data = vec![0.0; 32 * 32];
        let range = fill_height_rows(&sampler, 0, 32, &mut data);
        let mut field = HeightField::from_vec(32, data).unwrap();

        normalize_heights(&mut field, range);
        let once = field.clone();
        let range = HeightRange::of(field.as_slice());
        normalize_heights(&mut field, range);

        for (a, b) in once.as_slice().iter().zip(field.as_slice()) {
            assert_relative_eq!(a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_constant_field_normalizes_to_zero() {
        let mut field = HeightField::with_value(4, 0.37);
        let range = HeightRange::of(field.as_slice());
        assert!(range.is_degenerate());
        normalize_heights(&mut field, range);
        assert!(field.as_slice().iter().all(|&h| h == 0.0));
        assert_eq!(normalize_value(0.37, range), 0.0);
    }

    #[test]
    fn test_range_merge() {
        let a = HeightRange::of(&[1.0, 2.0]);
        let b = HeightRange::of(&[-3.0, 0.5]);
        let m = a.merge(b).merge(HeightRange::EMPTY);
        assert_eq!(m.min, -3.0);
        assert_eq!(m.max, 2.0);
        assert!(HeightRange::EMPTY.is_degenerate());
    }
}
