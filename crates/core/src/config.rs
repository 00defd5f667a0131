//! Generation configuration and derived render constants
//!
//! [`GenerationConfig`] is the single input of a run. It is validated before any
//! buffer is allocated and resolved once into [`RenderParams`], the constants
//! the per-cell stages actually consume.
//!
//! Configs deserialize from TOML with every field optional:
//!
//! ```toml
//! map_size = 512
//! seed = 7
//! height_mode = "normalized"
//!
//! [shadow]
//! policy = "exhaustive"
//!
//! [shading]
//! palette = "relief"
//! fog = true
//! ```

use crate::core_types::Vec3;
use crate::error::{TerrainError, TerrainResult};
use crate::noise::{FractalParams, NoiseKind};
use crate::terrain::{HeightMode, ShadingSettings, ShadowSettings};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to synthesize and shade one terrain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Grid side length in cells
    pub map_size: usize,
    /// Cell edge length in world units
    pub rect_size: f64,
    /// Noise seed
    pub seed: u32,
    /// Noise primitive
    pub noise: NoiseKind,
    pub octaves: u32,
    /// Per-octave frequency multiplier
    pub lacunarity: f64,
    /// Per-octave amplitude multiplier
    pub gain: f64,
    /// Frequency divisor; larger values give larger features
    pub zoom: f64,
    pub height_mode: HeightMode,
    /// Sun elevation above the horizon
    pub sun_angle_degrees: f64,
    /// Vertical exaggeration of the shadow step
    pub width_height_ratio: f64,
    /// Finite-difference scale, divided by the map width
    pub normal_scale_factor: f64,
    /// Number of horizontal bands processed concurrently
    pub bands: usize,
    pub shadow: ShadowSettings,
    pub shading: ShadingSettings,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            map_size: 4096,
            rect_size: 8.0,
            seed: 42,
            noise: NoiseKind::Simplex,
            octaves: 32,
            lacunarity: 1.2,
            gain: 0.85,
            zoom: 16.0,
            height_mode: HeightMode::Raw,
            sun_angle_degrees: 25.0,
            width_height_ratio: 10.0,
            normal_scale_factor: 16.0,
            bands: 8,
            shadow: ShadowSettings::default(),
            shading: ShadingSettings::default(),
        }
    }
}

/// Noise coordinates must stay below 2^52, where `f64` still resolves every lattice cell
const MAX_SAMPLE_COORDINATE: f64 = 4_503_599_627_370_496.0;

fn require(ok: bool, field: &'static str, message: impl FnOnce() -> String) -> TerrainResult<()> {
    if ok {
        Ok(())
    } else {
        Err(TerrainError::invalid_config(field, message()))
    }
}

fn positive_finite(value: f64, field: &'static str) -> TerrainResult<()> {
    require(value.is_finite() && value > 0.0, field, || {
        format!("must be finite and positive, got {value}")
    })
}

impl GenerationConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(source: &str) -> TerrainResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Same config with another seed
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Reject configurations that cannot produce a well-defined terrain
    pub fn validate(&self) -> TerrainResult<()> {
        require(self.map_size >= 1, "map_size", || {
            format!("must be at least 1, got {}", self.map_size)
        })?;
        require(self.map_size.checked_mul(self.map_size).is_some(), "map_size", || {
            format!("{} cells per side overflows the cell count", self.map_size)
        })?;
        positive_finite(self.rect_size, "rect_size")?;

        require(self.octaves >= 1, "octaves", || {
            format!("must be at least 1, got {}", self.octaves)
        })?;
        positive_finite(self.lacunarity, "lacunarity")?;
        positive_finite(self.gain, "gain")?;
        positive_finite(self.zoom, "zoom")?;

        // Highest frequency and amplitude reached by the last octave
        let last = f64::from(self.octaves - 1);
        require(self.lacunarity.powf(last).is_finite(), "lacunarity", || {
            format!("overflows after {} octaves", self.octaves)
        })?;
        require(self.gain.powf(last).is_finite(), "gain", || {
            format!("overflows after {} octaves", self.octaves)
        })?;

        let extent = (self.map_size - 1) as f64 * self.sample_scale();
        require(extent <= MAX_SAMPLE_COORDINATE, "rect_size", || {
            format!("grid spans {extent:e} noise units, limit is {MAX_SAMPLE_COORDINATE:e}")
        })?;
        let reach = extent * self.lacunarity.powf(last);
        require(reach <= MAX_SAMPLE_COORDINATE, "lacunarity", || {
            format!(
                "last octave samples up to {reach:e}, limit is {MAX_SAMPLE_COORDINATE:e}"
            )
        })?;
        // Heights are stored as f32
        let amplitude = self.fractal().amplitude_sum();
        require(amplitude <= f64::from(f32::MAX), "gain", || {
            format!("octave amplitudes sum to {amplitude:e}, beyond f32 range")
        })?;

        require(
            (0.0..90.0).contains(&self.sun_angle_degrees),
            "sun_angle_degrees",
            || format!("must be in [0, 90), got {}", self.sun_angle_degrees),
        )?;
        require(
            self.width_height_ratio.is_finite() && self.width_height_ratio >= 0.0,
            "width_height_ratio",
            || format!("must be finite and non-negative, got {}", self.width_height_ratio),
        )?;
        positive_finite(self.normal_scale_factor, "normal_scale_factor")?;

        require(
            (1..=self.map_size).contains(&self.bands),
            "bands",
            || format!("must be in [1, {}], got {}", self.map_size, self.bands),
        )?;
        require(self.shading.is_finite(), "shading", || {
            "factors must be finite".to_string()
        })?;
        Ok(())
    }

    pub fn fractal(&self) -> FractalParams {
        FractalParams {
            octaves: self.octaves,
            lacunarity: self.lacunarity,
            gain: self.gain,
        }
    }

    /// Grid-to-noise coordinate factor, `rect_size / map_size / zoom`
    pub fn sample_scale(&self) -> f64 {
        self.rect_size / self.map_size as f64 / self.zoom
    }

    /// Physical width of the map in world units
    pub fn map_width(&self) -> f64 {
        self.map_size as f64 * self.rect_size
    }

    /// Height a shadow ray gains per column, in normalized height units
    pub fn delta_h(&self) -> f32 {
        let angle = self.sun_angle_degrees.to_radians();
        (self.rect_size * angle.tan() / self.map_width() * self.width_height_ratio) as f32
    }

    pub fn normal_scale(&self) -> f32 {
        (self.normal_scale_factor / self.map_width()) as f32
    }

    /// Unit vector towards the sun, fixed along `-x` and up
    pub fn sun_direction(&self) -> Vec3 {
        Vec3::new(-1.0, 0.0, 1.0).normalize()
    }

    /// Validate and resolve the constants used by the shading stages
    pub fn render_params(&self) -> TerrainResult<RenderParams> {
        self.validate()?;
        Ok(RenderParams {
            size: self.map_size,
            delta_h: self.delta_h(),
            normal_scale: self.normal_scale(),
            sun_direction: self.sun_direction(),
            shadow: self.shadow,
            shading: self.shading,
            bands: self.bands,
        })
    }
}

/// Constants resolved from a [`GenerationConfig`] for the shading stages
///
/// Fields are public so hosts and tests can override individual values, such as
/// a fixed `delta_h` for a hand-built heightfield.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderParams {
    /// Grid side length in cells
    pub size: usize,
    pub delta_h: f32,
    pub normal_scale: f32,
    pub sun_direction: Vec3,
    pub shadow: ShadowSettings,
    pub shading: ShadingSettings,
    pub bands: usize,
}
