//! FFI-exposed generation configuration.
//!
//! `TerrainShadeConfig` is a flat, `#[repr(C)]` mirror of the core
//! `GenerationConfig`. Start from `terrain_shade_default_config()` and override
//! the fields you need:
//!
//! ```c
//! TerrainShadeConfig config = terrain_shade_default_config();
//! config.map_size = 1024;
//! config.seed = 7;
//! config.fog = true;
//! ```

use terrain_shade_core::{
    BandSeeding, GenerationConfig, HeightMode, NoiseKind, Palette, RowCarry, ShadowPolicy,
};

/// Noise primitive used for heightfield synthesis.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainShadeNoise {
    /// Simplex noise.
    Simplex = 0,
    /// Perlin-style gradient noise.
    Gradient = 1,
}

/// Flat generation configuration for C callers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainShadeConfig {
    /// Grid side length in cells.
    pub map_size: u32,
    /// Cell edge length in world units.
    pub rect_size: f64,
    /// Noise seed.
    pub seed: u32,
    pub noise: TerrainShadeNoise,
    /// Fractal octave count.
    pub octaves: u32,
    /// Per-octave frequency multiplier.
    pub lacunarity: f64,
    /// Per-octave amplitude multiplier.
    pub gain: f64,
    /// Frequency divisor; larger values give larger features.
    pub zoom: f64,
    /// Rescale heights to [-1, 1] instead of keeping raw fbm output.
    pub normalize_heights: bool,
    /// Sun elevation in degrees, in [0, 90).
    pub sun_angle_degrees: f64,
    /// Vertical exaggeration of the shadow step.
    pub width_height_ratio: f64,
    /// Finite-difference scale, divided by the map width.
    pub normal_scale_factor: f64,
    /// Number of horizontal bands processed concurrently.
    pub bands: u32,
    /// Raymarch every cell instead of skipping cells that rise above a lit predecessor.
    pub exhaustive_shadows: bool,
    /// Produce the light-ray field (needed by fog).
    pub trace_light_rays: bool,
    /// Carry scan state from the end of one row into the next.
    pub carry_row_state: bool,
    /// Seed each band with the state of the row above it.
    pub seed_bands_from_previous: bool,
    /// White land showing only lighting and shadow.
    pub relief_palette: bool,
    pub land_ambient: f32,
    pub water_ambient: f32,
    pub diffuse_strength: f32,
    pub shadow_strength: f32,
    pub shore_height: f32,
    pub fertility_threshold: f32,
    pub water_jitter_seed: u32,
    /// Mix low, poorly lit cells towards sky blue.
    pub fog: bool,
}

impl From<&GenerationConfig> for TerrainShadeConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            map_size: u32::try_from(config.map_size).unwrap_or(u32::MAX),
            rect_size: config.rect_size,
            seed: config.seed,
            noise: match config.noise {
                NoiseKind::Simplex => TerrainShadeNoise::Simplex,
                NoiseKind::Gradient => TerrainShadeNoise::Gradient,
            },
            octaves: config.octaves,
            lacunarity: config.lacunarity,
            gain: config.gain,
            zoom: config.zoom,
            normalize_heights: config.height_mode == HeightMode::Normalized,
            sun_angle_degrees: config.sun_angle_degrees,
            width_height_ratio: config.width_height_ratio,
            normal_scale_factor: config.normal_scale_factor,
            bands: u32::try_from(config.bands).unwrap_or(u32::MAX),
            exhaustive_shadows: config.shadow.policy == ShadowPolicy::Exhaustive,
            trace_light_rays: config.shadow.trace_light_rays,
            carry_row_state: config.shadow.row_carry == RowCarry::CarryAcrossRows,
            seed_bands_from_previous: config.shadow.band_seeding == BandSeeding::PreviousBand,
            relief_palette: config.shading.palette == Palette::Relief,
            land_ambient: config.shading.land_ambient,
            water_ambient: config.shading.water_ambient,
            diffuse_strength: config.shading.diffuse_strength,
            shadow_strength: config.shading.shadow_strength,
            shore_height: config.shading.shore_height,
            fertility_threshold: config.shading.fertility_threshold,
            water_jitter_seed: config.shading.water_jitter_seed,
            fog: config.shading.fog,
        }
    }
}

impl From<&TerrainShadeConfig> for GenerationConfig {
    fn from(c: &TerrainShadeConfig) -> Self {
        let mut config = Self {
            map_size: c.map_size as usize,
            rect_size: c.rect_size,
            seed: c.seed,
            noise: match c.noise {
                TerrainShadeNoise::Simplex => NoiseKind::Simplex,
                TerrainShadeNoise::Gradient => NoiseKind::Gradient,
            },
            octaves: c.octaves,
            lacunarity: c.lacunarity,
            gain: c.gain,
            zoom: c.zoom,
            height_mode: if c.normalize_heights {
                HeightMode::Normalized
            } else {
                HeightMode::Raw
            },
            sun_angle_degrees: c.sun_angle_degrees,
            width_height_ratio: c.width_height_ratio,
            normal_scale_factor: c.normal_scale_factor,
            bands: c.bands as usize,
            ..Self::default()
        };

        let shadow = &mut config.shadow;
        shadow.policy = if c.exhaustive_shadows {
            ShadowPolicy::Exhaustive
        } else {
            ShadowPolicy::EarlyExit
        };
        shadow.trace_light_rays = c.trace_light_rays;
        shadow.row_carry = if c.carry_row_state {
            RowCarry::CarryAcrossRows
        } else {
            RowCarry::ResetEachRow
        };
        shadow.band_seeding = if c.seed_bands_from_previous {
            BandSeeding::PreviousBand
        } else {
            BandSeeding::Neutral
        };

        let shading = &mut config.shading;
        shading.palette = if c.relief_palette {
            Palette::Relief
        } else {
            Palette::Natural
        };
        shading.land_ambient = c.land_ambient;
        shading.water_ambient = c.water_ambient;
        shading.diffuse_strength = c.diffuse_strength;
        shading.shadow_strength = c.shadow_strength;
        shading.shore_height = c.shore_height;
        shading.fertility_threshold = c.fertility_threshold;
        shading.water_jitter_seed = c.water_jitter_seed;
        shading.fog = c.fog;
        config
    }
}

/// Default generation configuration.
///
/// A 4096x4096 map with 32 octaves of simplex noise, seed 42, 8 bands and
/// early-exit shadows. Reduce `map_size` for previews.
#[no_mangle]
pub extern "C" fn terrain_shade_default_config() -> TerrainShadeConfig {
    TerrainShadeConfig::from(&GenerationConfig::default())
}
