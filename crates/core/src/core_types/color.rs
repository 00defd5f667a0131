//! RGBA color values for the shaded output buffer.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Linear RGBA color with `f32` components nominally in `[0, 1]`.
///
/// The layout is `#[repr(C)]` and `Pod` so a color buffer can be handed to a
/// host renderer as a flat `&[f32]` with four components per cell.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgba {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
    /// Alpha component
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);
    pub const LIGHT_YELLOW: Self = Self::rgb(1.0, 1.0, 224.0 / 255.0);
    pub const DARK_GREEN: Self = Self::rgb(0.0, 100.0 / 255.0, 0.0);
    pub const KHAKI: Self = Self::rgb(240.0 / 255.0, 230.0 / 255.0, 140.0 / 255.0);
    pub const LIGHT_SKY_BLUE: Self = Self::rgb(135.0 / 255.0, 206.0 / 255.0, 250.0 / 255.0);

    /// Opaque color from red, green and blue.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Linear interpolation towards `other`; `t = 0` keeps `self`, `t = 1` gives `other`.
    #[must_use]
    pub fn mix(self, other: Self, t: f32) -> Self {
        let s = 1.0 - t;
        Self {
            r: self.r * s + other.r * t,
            g: self.g * s + other.g * t,
            b: self.b * s + other.b * t,
            a: self.a * s + other.a * t,
        }
    }

    /// Scale the color channels by `factor`, leaving alpha untouched.
    ///
    /// Factors below one darken, above one brighten; hue is preserved.
    #[must_use]
    pub fn shade(self, factor: f32) -> Self {
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
            a: self.a,
        }
    }

    /// Clamp every component into `[0, 1]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    /// Quantize to 8-bit RGBA, clamping out-of-range components.
    #[must_use]
    pub fn to_rgba8(self) -> [u8; 4] {
        let c = self.clamped();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
            (c.a * 255.0).round() as u8,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mix_endpoints() {
        let c = Rgba::BLUE.mix(Rgba::WHITE, 0.0);
        assert_eq!(c, Rgba::BLUE);
        let c = Rgba::BLUE.mix(Rgba::WHITE, 1.0);
        assert_eq!(c, Rgba::WHITE);

        let c = Rgba::BLUE.mix(Rgba::WHITE, 0.25);
        assert_relative_eq!(c.r, 0.25);
        assert_relative_eq!(c.g, 0.25);
        assert_relative_eq!(c.b, 1.0);
        assert_relative_eq!(c.a, 1.0);
    }

    #[test]
    fn test_shade_keeps_alpha() {
        let c = Rgba::KHAKI.shade(0.5);
        assert_relative_eq!(c.r, Rgba::KHAKI.r * 0.5);
        assert_relative_eq!(c.b, Rgba::KHAKI.b * 0.5);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_to_rgba8_clamps() {
        let c = Rgba::WHITE.shade(1.5);
        assert_eq!(c.to_rgba8(), [255, 255, 255, 255]);
        let c = Rgba::WHITE.shade(-0.2);
        assert_eq!(c.to_rgba8(), [0, 0, 0, 255]);
        assert_eq!(Rgba::DARK_GREEN.to_rgba8(), [0, 100, 0, 255]);
    }

    #[test]
    fn test_pod_cast_is_flat() {
        let colors = [Rgba::BLUE, Rgba::WHITE];
        let flat: &[f32] = bytemuck::cast_slice(&colors);
        assert_eq!(flat, &[0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
    }
}
