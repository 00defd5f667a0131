//! Material classification and lighting
//!
//! Every cell is colored independently from its height, normal, shadow
//! intensity and (for fog) light-ray height:
//!
//! ```text
//! water (h < 0):  base = blue jittered towards white, shade = water_ambient
//! land:           base = material tone,               shade = land_ambient + diffuse
//! all:            shade -= shadow_strength * shadow
//! color = base.shade(shade), then optionally mixed towards sky blue by fog
//! ```

use crate::core_types::{Rgba, Vec3, UP};
use crate::noise::cell_jitter;
use serde::{Deserialize, Serialize};

/// Base colors used for land
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Shore, forest and arid tones
    #[default]
    Natural,
    /// White land, so only lighting and shadow show relief
    Relief,
}

/// Surface class of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    Water,
    /// Fertile land just above sea level
    Shore,
    /// Fertile land above the shore line
    Forest,
    /// Steep or high land
    Arid,
}

impl Material {
    /// Classify a cell from its height and surface normal
    ///
    /// Land fertility is `(1 - 0.9 * slope) * (1 - h)` with `slope = 1 - n.z`.
    pub fn classify(height: f32, normal: &Vec3, settings: &ShadingSettings) -> Self {
        if height < 0.0 {
            return Self::Water;
        }
        let slope = 1.0 - normal.dot(&UP);
        let fertility = (1.0 - slope * 0.9) * (1.0 - height);
        if fertility > settings.fertility_threshold {
            if height < settings.shore_height {
                Self::Shore
            } else {
                Self::Forest
            }
        } else {
            Self::Arid
        }
    }

    pub fn is_water(self) -> bool {
        matches!(self, Self::Water)
    }
}

/// Shading factors and material thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingSettings {
    pub palette: Palette,
    /// Base shade of land before directional light
    pub land_ambient: f32,
    /// Base shade of water
    pub water_ambient: f32,
    /// Weight of `max(n . sun, 0)` on land
    pub diffuse_strength: f32,
    /// Shade removed by a fully shadowed cell
    pub shadow_strength: f32,
    /// Fertile land below this height is shore
    pub shore_height: f32,
    /// Land with fertility above this is vegetated
    pub fertility_threshold: f32,
    /// Seed of the per-cell water jitter
    pub water_jitter_seed: u32,
    /// Mix low, poorly lit cells towards sky blue
    pub fog: bool,
}

impl Default for ShadingSettings {
    fn default() -> Self {
        Self {
            palette: Palette::Natural,
            land_ambient: 0.5,
            water_ambient: 0.7,
            diffuse_strength: 0.5,
            shadow_strength: 0.3,
            shore_height: 0.05,
            fertility_threshold: 0.2,
            water_jitter_seed: 13,
            fog: false,
        }
    }
}

impl ShadingSettings {
    /// Darker land ambient of the single-threaded variant
    pub fn simplified() -> Self {
        Self {
            land_ambient: 0.3,
            ..Self::default()
        }
    }

    /// All factors finite
    pub fn is_finite(&self) -> bool {
        [
            self.land_ambient,
            self.water_ambient,
            self.diffuse_strength,
            self.shadow_strength,
            self.shore_height,
            self.fertility_threshold,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Fog density over a cell
///
/// `e^(-3 * light_ray - 2) + e^(-3 * max(h, 0) - 1.5)`, clamped to `[0, 1]`.
#[inline]
pub fn fog_amount(light_ray: f32, height: f32) -> f32 {
    let fog = (-3.0 * light_ray - 2.0).exp() + (-3.0 * height.max(0.0) - 1.5).exp();
    fog.clamp(0.0, 1.0)
}

/// Per-cell colorizer for one sun direction
#[derive(Debug, Clone, Copy)]
pub struct Shader {
    settings: ShadingSettings,
    sun_direction: Vec3,
}

impl Shader {
    pub fn new(settings: ShadingSettings, sun_direction: Vec3) -> Self {
        Self {
            settings,
            sun_direction,
        }
    }

    fn base_color(&self, material: Material, x: usize, y: usize) -> Rgba {
        match (material, self.settings.palette) {
            (Material::Water, _) => {
                let jitter = cell_jitter(x, y, self.settings.water_jitter_seed);
                Rgba::BLUE.mix(Rgba::WHITE, (0.1 + 0.2 * jitter).clamp(0.0, 1.0))
            }
            (_, Palette::Relief) => Rgba::WHITE,
            (Material::Shore, Palette::Natural) => Rgba::LIGHT_YELLOW,
            (Material::Forest, Palette::Natural) => Rgba::DARK_GREEN,
            (Material::Arid, Palette::Natural) => Rgba::KHAKI,
        }
    }

    /// Final color of cell `(x, y)`
    ///
    /// `light_ray` only matters when fog is enabled.
    pub fn shade_cell(
        &self,
        x: usize,
        y: usize,
        height: f32,
        normal: &Vec3,
        shadow: f32,
        light_ray: f32,
    ) -> Rgba {
        let s = &self.settings;
        let material = Material::classify(height, normal, s);

        let mut shade = if material.is_water() {
            s.water_ambient
        } else {
            s.land_ambient + normal.dot(&self.sun_direction).max(0.0) * s.diffuse_strength
        };
        shade -= s.shadow_strength * shadow;

        let mut color = self.base_color(material, x, y).shade(shade);
        if s.fog {
            color = color.mix(Rgba::LIGHT_SKY_BLUE, fog_amount(light_ray, height));
        }
        color.clamped()
    }

    /// Color the rows starting at `first_row`
    ///
    /// `heights` is the complete field; `normals`, `shadows`, `light_rays` and
    /// `out` cover only the band's rows. Without light rays the fog term falls
    /// back to `max(h, 0)`.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_color_rows(
        &self,
        heights: &[f32],
        size: usize,
        first_row: usize,
        normals: &[Vec3],
        shadows: &[f32],
        light_rays: Option<&[f32]>,
        out: &mut [Rgba],
    ) {
        let offset = first_row * size;
        for (i, color) in out.iter_mut().enumerate() {
            let x = i % size;
            let y = first_row + i / size;
            let h = heights[offset + i];
            let light_ray = light_rays.map_or(h.max(0.0), |l| l[i]);
            *color = self.shade_cell(x, y, h, &normals[i], shadows[i], light_ray);
        }
    }
}
