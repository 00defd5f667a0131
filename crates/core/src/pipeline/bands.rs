//! Band-parallel generation
//!
//! The grid is split into horizontal bands of whole rows and processed in two
//! fork-join phases over preallocated row-major buffers:
//!
//! 1. every band fills its rows of the heightfield with raw fbm heights,
//!    followed by an optional global normalization;
//! 2. every band runs shadow, normal and color passes over its own rows while
//!    reading the complete, now immutable heightfield.
//!
//! Workers only ever receive disjoint `&mut` slices of the output buffers, so no
//! locking is needed. Shadow seeds for each band are resolved from the finished
//! heightfield before phase 2 starts.

use super::cancel::CancelToken;
use super::profiler::{BandTiming, GenerationStats, ProfilerScope};
use crate::config::{GenerationConfig, RenderParams};
use crate::core_types::{
    ColorBuffer, HeightField, LightRayField, NormalField, Rgba, ShadowField, Vec3,
};
use crate::error::{TerrainError, TerrainResult};
use crate::noise::NoiseSource;
use crate::terrain::{
    fill_height_rows, fill_normal_rows, normalize_heights, HeightMode, HeightRange, HeightSampler,
    Shader, ShadowScanner,
};
use rayon::prelude::*;
use std::ops::Range;
use std::time::Instant;
use tracing::{debug, info};

/// Partition of `size` rows into equal bands (the last may be shorter)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandPlan {
    size: usize,
    rows_per_band: usize,
    count: usize,
}

impl BandPlan {
    /// Plan at most `bands` bands over a `size x size` grid
    ///
    /// The requested count is clamped to `[1, size]`. When `size` is not a
    /// multiple of the band height fewer bands may be produced.
    pub fn new(size: usize, bands: usize) -> Self {
        let size = size.max(1);
        let requested = bands.clamp(1, size);
        let rows_per_band = size.div_ceil(requested);
        Self {
            size,
            rows_per_band,
            count: size.div_ceil(rows_per_band),
        }
    }

    /// Number of bands
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn rows_per_band(&self) -> usize {
        self.rows_per_band
    }

    /// Cells in a full band, the chunk length of every per-band slice
    pub fn chunk_len(&self) -> usize {
        self.rows_per_band * self.size
    }

    /// Rows covered by `band`
    pub fn rows(&self, band: usize) -> Range<usize> {
        let start = (band * self.rows_per_band).min(self.size);
        let end = (start + self.rows_per_band).min(self.size);
        start..end
    }
}

/// Every field produced by one run
///
/// Allocated fresh for each run and never mutated after it is returned.
#[derive(Debug, Clone)]
pub struct TerrainMaps {
    pub heights: HeightField,
    pub normals: NormalField,
    pub shadows: ShadowField,
    /// Present when light-ray tracing was enabled
    pub light_rays: Option<LightRayField>,
    pub colors: ColorBuffer,
    pub stats: GenerationStats,
}

impl TerrainMaps {
    /// Grid side length
    pub fn size(&self) -> usize {
        self.heights.size()
    }
}

/// Per-band output slices handed to one phase-2 worker
struct BandSlices<'a> {
    index: usize,
    first_row: usize,
    shadows: &'a mut [f32],
    normals: &'a mut [Vec3],
    colors: &'a mut [Rgba],
    light_rays: Option<&'a mut [f32]>,
}

/// Generate terrain with the configured noise source
pub fn generate(config: &GenerationConfig) -> TerrainResult<TerrainMaps> {
    config.validate()?;
    let noise = config.noise.build(config.seed);
    generate_with(config, noise.as_ref(), &CancelToken::new())
}

/// Generate terrain from an explicit noise source
///
/// `config.seed` and `config.noise` are ignored; `noise` is used as given.
/// Returns [`TerrainError::Cancelled`] if `cancel` fires before the run ends.
pub fn generate_with(
    config: &GenerationConfig,
    noise: &dyn NoiseSource,
    cancel: &CancelToken,
) -> TerrainResult<TerrainMaps> {
    let params = config.render_params()?;
    let scope = ProfilerScope::new("generate");
    let size = params.size;
    let plan = BandPlan::new(size, params.bands);

    info!(
        "Generating {}x{} terrain: seed={}, octaves={}, bands={}",
        size,
        size,
        config.seed,
        config.octaves,
        plan.count()
    );

    let sampler = HeightSampler::new(noise, config.fractal(), config.sample_scale());
    let mut heights = HeightField::with_value(size, 0.0);

    let phase1: Vec<(HeightRange, f64)> = heights
        .as_mut_slice()
        .par_chunks_mut(plan.chunk_len())
        .enumerate()
        .map(|(band, rows)| {
            cancel.check()?;
            let start = Instant::now();
            let range = fill_height_rows(&sampler, plan.rows(band).start, size, rows);
            Ok((range, start.elapsed().as_secs_f64() * 1000.0))
        })
        .collect::<TerrainResult<_>>()?;
    cancel.check()?;

    let raw_range = phase1
        .iter()
        .fold(HeightRange::EMPTY, |acc, (range, _)| acc.merge(*range));
    debug!("Raw height range [{:.4}, {:.4}]", raw_range.min, raw_range.max);

    if config.height_mode == HeightMode::Normalized {
        normalize_heights(&mut heights, raw_range);
        cancel.check()?;
    }

    let height_ms: Vec<f64> = phase1.iter().map(|(_, ms)| *ms).collect();
    let maps = shade_bands(heights, &params, &plan, &height_ms, cancel, &scope)?;

    info!(
        "Terrain generated in {:.1} ms: heights [{:.3}, {:.3}], {} water, {} shadowed cells",
        maps.stats.total_ms,
        maps.stats.height_range.min,
        maps.stats.height_range.max,
        maps.stats.water_cells,
        maps.stats.shadowed_cells
    );
    Ok(maps)
}

/// Shadow, normal and color passes over an existing heightfield
///
/// `heights` must be `params.size` cells on a side.
pub fn render_heightfield(heights: HeightField, params: &RenderParams) -> TerrainResult<TerrainMaps> {
    render_heightfield_with(heights, params, &CancelToken::new())
}

/// [`render_heightfield`] with cancellation
pub fn render_heightfield_with(
    heights: HeightField,
    params: &RenderParams,
    cancel: &CancelToken,
) -> TerrainResult<TerrainMaps> {
    if heights.size() != params.size {
        return Err(TerrainError::SizeMismatch {
            expected: params.size * params.size,
            actual: heights.len(),
        });
    }
    if params.size == 0 {
        return Err(TerrainError::invalid_config("size", "must be at least 1, got 0"));
    }
    if !(params.delta_h.is_finite() && params.delta_h >= 0.0) {
        return Err(TerrainError::invalid_config(
            "delta_h",
            format!("must be finite and non-negative, got {}", params.delta_h),
        ));
    }
    if !(params.normal_scale.is_finite() && params.normal_scale > 0.0) {
        return Err(TerrainError::invalid_config(
            "normal_scale",
            format!("must be finite and positive, got {}", params.normal_scale),
        ));
    }

    let scope = ProfilerScope::new("render_heightfield");
    let plan = BandPlan::new(params.size, params.bands);
    let height_ms = vec![0.0; plan.count()];
    shade_bands(heights, params, &plan, &height_ms, cancel, &scope)
}

fn shade_bands(
    heights: HeightField,
    params: &RenderParams,
    plan: &BandPlan,
    height_ms: &[f64],
    cancel: &CancelToken,
    scope: &ProfilerScope,
) -> TerrainResult<TerrainMaps> {
    let size = params.size;
    let chunk = plan.chunk_len();
    let scanner = ShadowScanner::new(params.delta_h, params.shadow);
    let shader = Shader::new(params.shading, params.sun_direction);

    let mut shadows = ShadowField::with_value(size, 0.0);
    let mut normals = NormalField::with_value(size, Vec3::zeros());
    let mut colors = ColorBuffer::with_value(size, Rgba::BLACK);
    let mut light_rays = params
        .shadow
        .trace_light_rays
        .then(|| LightRayField::with_value(size, 0.0));

    let timings: Vec<BandTiming> = {
        let heights = heights.as_slice();
        let mut light_chunks = light_rays
            .as_mut()
            .map(|field| field.as_mut_slice().chunks_mut(chunk));

        let slices: Vec<BandSlices<'_>> = shadows
            .as_mut_slice()
            .chunks_mut(chunk)
            .zip(normals.as_mut_slice().chunks_mut(chunk))
            .zip(colors.as_mut_slice().chunks_mut(chunk))
            .enumerate()
            .map(|(index, ((shadows, normals), colors))| BandSlices {
                index,
                first_row: plan.rows(index).start,
                shadows,
                normals,
                colors,
                light_rays: light_chunks.as_mut().and_then(Iterator::next),
            })
            .collect();

        // Seeds depend only on the finished heightfield
        let seeds: Vec<_> = slices
            .iter()
            .map(|band| scanner.band_seed_state(heights, size, band.first_row))
            .collect();

        slices
            .into_par_iter()
            .map(|band| {
                cancel.check()?;
                let start = Instant::now();
                let BandSlices {
                    index,
                    first_row,
                    shadows,
                    normals,
                    colors,
                    mut light_rays,
                } = band;
                let rows = shadows.len() / size;
                let band_heights = &heights[first_row * size..(first_row + rows) * size];

                scanner.scan_rows(band_heights, size, seeds[index], shadows, light_rays.as_deref_mut());
                fill_normal_rows(heights, size, params.normal_scale, first_row, normals);
                shader.fill_color_rows(
                    heights,
                    size,
                    first_row,
                    normals,
                    shadows,
                    light_rays.as_deref(),
                    colors,
                );

                let timing = BandTiming {
                    band: index,
                    first_row,
                    rows,
                    height_ms: height_ms.get(index).copied().unwrap_or(0.0),
                    shade_ms: start.elapsed().as_secs_f64() * 1000.0,
                };
                debug!(
                    "Band {} (rows {}..{}) finished: heights {:.2} ms, shading {:.2} ms",
                    index,
                    first_row,
                    first_row + rows,
                    timing.height_ms,
                    timing.shade_ms
                );
                Ok(timing)
            })
            .collect::<TerrainResult<_>>()?
    };
    cancel.check()?;

    let stats = collect_stats(
        size,
        heights.as_slice(),
        shadows.as_slice(),
        timings,
        scope.elapsed_ms(),
    );
    Ok(TerrainMaps {
        heights,
        normals,
        shadows,
        light_rays,
        colors,
        stats,
    })
}

fn collect_stats(
    size: usize,
    heights: &[f32],
    shadows: &[f32],
    bands: Vec<BandTiming>,
    total_ms: f64,
) -> GenerationStats {
    let height_range = heights
        .par_iter()
        .fold(|| HeightRange::EMPTY, |acc, &h| acc.include(h))
        .reduce(|| HeightRange::EMPTY, HeightRange::merge);
    let water_cells = heights.par_iter().filter(|&&h| h < 0.0).count();
    let shadowed_cells = shadows.par_iter().filter(|&&s| s == 1.0).count();
    let penumbra_cells = shadows.par_iter().filter(|&&s| s > 0.0 && s < 1.0).count();

    GenerationStats {
        size,
        bands,
        height_range,
        total_ms,
        water_cells,
        shadowed_cells,
        penumbra_cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::GridField;
    use crate::noise::SimplexNoise;

    #[test]
    fn test_band_plan_even_split() {
        let plan = BandPlan::new(16, 4);
        assert_eq!(plan.count(), 4);
        assert_eq!(plan.rows_per_band(), 4);
        assert_eq!(plan.rows(0), 0..4);
        assert_eq!(plan.rows(3), 12..16);
        assert_eq!(plan.chunk_len(), 64);
    }

    #[test]
    fn test_band_plan_uneven_split() {
        // 3 rows per band: 3, 3, 3, 1
        let plan = BandPlan::new(10, 4);
        assert_eq!(plan.count(), 4);
        assert_eq!(plan.rows(3), 9..10);

        // 2 rows per band leaves only 5 bands
        let plan = BandPlan::new(10, 8);
        assert_eq!(plan.count(), 5);
        let covered: usize = (0..plan.count()).map(|b| plan.rows(b).len()).sum();
        assert_eq!(covered, 10);
    }

    #[test]
    fn test_band_plan_clamps() {
        assert_eq!(BandPlan::new(4, 0).count(), 1);
        assert_eq!(BandPlan::new(4, 100).count(), 4);
        assert_eq!(BandPlan::new(1, 8).rows(0), 0..1);
    }

    fn small_config() -> GenerationConfig {
        GenerationConfig {
            map_size: 24,
            octaves: 6,
            bands: 5,
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn test_generate_fills_every_field() {
        let maps = generate(&small_config()).unwrap();
        assert_eq!(maps.size(), 24);
        assert_eq!(maps.heights.len(), 576);
        assert_eq!(maps.normals.len(), 576);
        assert_eq!(maps.shadows.len(), 576);
        assert_eq!(maps.colors.len(), 576);
        assert_eq!(maps.light_rays.as_ref().map(GridField::len), Some(576));
        assert_eq!(maps.stats.bands.len(), BandPlan::new(24, 5).count());
        assert!(maps.normals.as_slice().iter().all(|n| (n.norm() - 1.0).abs() < 1e-4));
        assert!(maps.shadows.as_slice().iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn test_light_rays_optional() {
        let mut config = small_config();
        config.shadow.trace_light_rays = false;
        let maps = generate(&config).unwrap();
        assert!(maps.light_rays.is_none());
    }

    #[test]
    fn test_normalized_mode_spans_unit_range() {
        let config = GenerationConfig {
            height_mode: HeightMode::Normalized,
            ..small_config()
        };
        let maps = generate(&config).unwrap();
        assert_eq!(maps.stats.height_range.min, -1.0);
        assert_eq!(maps.stats.height_range.max, 1.0);
    }

    #[test]
    fn test_cancelled_run_returns_error() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let noise = SimplexNoise::new(1);
        let result = generate_with(&small_config(), &noise, &cancel);
        assert!(matches!(result, Err(TerrainError::Cancelled)));
    }

    #[test]
    fn test_invalid_config_rejected_before_work() {
        let config = GenerationConfig {
            octaves: 0,
            ..small_config()
        };
        assert!(matches!(
            generate(&config),
            Err(TerrainError::InvalidConfig { field: "octaves", .. })
        ));
    }

    #[test]
    fn test_render_heightfield_size_mismatch() {
        let params = small_config().render_params().unwrap();
        let heights = HeightField::with_value(4, 0.0);
        assert!(matches!(
            render_heightfield(heights, &params),
            Err(TerrainError::SizeMismatch { expected: 576, actual: 16 })
        ));
    }
}
