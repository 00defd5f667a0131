//! Directional self-shadowing by horizon raymarching along rows
//!
//! The sun shines along the x axis, so every cell only needs the cells to its
//! left on the same row. Rows are scanned left to right, carrying a small
//! [`RowScanState`] from one cell to the next that lets most cells skip the
//! raymarch entirely.
//!
//! # Per-cell algorithm
//!
//! ```text
//! ray_h = max(h, 0)
//! march if ray_h < prev_height || prev_shadow        (EarlyExit policy)
//! step x -= 1, ray_h += delta_h until x == 0, ray_h >= 1 or shadow == 1:
//!     diff = terrain(x) - ray_h
//!     diff > 0         -> shadow = 1
//!     diff > -delta_h  -> shadow = diff / -delta_h   (penumbra)
//! ```
//!
//! A penumbra hit walks the ray back towards the origin cell and records the
//! highest lit ray height over each cell in the light-ray field.

use serde::{Deserialize, Serialize};

/// Whether a cell may skip the raymarch based on its predecessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowPolicy {
    /// March only when the cell is lower than its predecessor or the
    /// predecessor was fully shadowed. Shadow intensities match
    /// `Exhaustive`; light rays are only recorded for marched cells.
    #[default]
    EarlyExit,
    /// March every cell
    Exhaustive,
}

/// How scan state flows from the end of one row into the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowCarry {
    /// Every row starts from the neutral state
    #[default]
    ResetEachRow,
    /// The last cell's height seeds the first cell of the next row
    CarryAcrossRows,
}

/// How the first row of a band is seeded when state carries across rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandSeeding {
    /// Neutral state at every band boundary; output depends on the band count
    Neutral,
    /// The state a sequential scan would hand over from the row above,
    /// read from the finished heightfield before bands start
    #[default]
    PreviousBand,
}

/// Shadow pass settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    pub policy: ShadowPolicy,
    /// Produce the light-ray field (needed by fog)
    pub trace_light_rays: bool,
    pub row_carry: RowCarry,
    pub band_seeding: BandSeeding,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            policy: ShadowPolicy::EarlyExit,
            trace_light_rays: true,
            row_carry: RowCarry::ResetEachRow,
            band_seeding: BandSeeding::PreviousBand,
        }
    }
}

/// State carried from one scanned cell to the next
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowScanState {
    /// Height of the previously scanned cell
    pub prev_height: f32,
    /// Whether the previously scanned cell was fully shadowed
    pub prev_shadow: bool,
}

impl RowScanState {
    /// State at the start of an unseeded row
    pub const NEUTRAL: Self = Self {
        prev_height: 0.0,
        prev_shadow: false,
    };
}

/// Row scanner for one sun geometry
#[derive(Debug, Clone, Copy)]
pub struct ShadowScanner {
    delta_h: f32,
    settings: ShadowSettings,
}

impl ShadowScanner {
    /// # Arguments
    ///
    /// * `delta_h` - Height a ray gains per column stepped towards the sun
    /// * `settings` - Policy, light-ray tracing and seeding behavior
    pub fn new(delta_h: f32, settings: ShadowSettings) -> Self {
        Self { delta_h, settings }
    }

    /// Scan one row, writing shadow intensities (and light rays, if given)
    ///
    /// Returns the state after the last cell. `shadows` and `light_rays` must be
    /// as long as `row`. Light rays are expected to be pre-initialized; see
    /// [`ShadowScanner::scan_rows`].
    pub fn scan_row(
        &self,
        row: &[f32],
        mut state: RowScanState,
        shadows: &mut [f32],
        mut light_rays: Option<&mut [f32]>,
    ) -> RowScanState {
        let delta_h = self.delta_h;
        let last = row.len().saturating_sub(1);

        for (x, &h) in row.iter().enumerate() {
            let mut shadow = 0.0_f32;
            let mut ray_h = h.max(0.0);
            let mut ray_x = x;

            let march = match self.settings.policy {
                ShadowPolicy::Exhaustive => true,
                ShadowPolicy::EarlyExit => ray_h < state.prev_height || state.prev_shadow,
            };

            if march {
                while ray_x > 0 && ray_h < 1.0 && shadow != 1.0 {
                    ray_x -= 1;
                    ray_h += delta_h;
                    let diff = row[ray_x] - ray_h;
                    if diff > 0.0 {
                        shadow = 1.0;
                    } else if diff > -delta_h {
                        shadow = diff / -delta_h;
                    }
                }

                if let Some(light) = light_rays.as_deref_mut() {
                    if shadow > 0.0 && shadow < 1.0 {
                        // Walk the grazing ray back towards the origin cell
                        while ray_x != x && ray_h > row[ray_x] {
                            light[ray_x] = ray_h.max(light[ray_x]).max(row[ray_x]);
                            ray_h -= delta_h;
                            ray_x += 1;
                        }
                    } else if shadow == 0.0 {
                        light[x] = h;
                    }
                }
            }

            let shadow = shadow.clamp(0.0, 1.0);
            state = RowScanState {
                prev_height: h,
                prev_shadow: shadow == 1.0 && x != last,
            };
            shadows[x] = shadow;
        }

        state
    }

    /// Scan a block of whole rows, starting from `seed`
    ///
    /// `heights`, `shadows` and `light_rays` cover the same rows; their length
    /// must be a multiple of `size`. Light rays are initialized to `max(h, 0)`
    /// before each row is scanned.
    pub fn scan_rows(
        &self,
        heights: &[f32],
        size: usize,
        seed: RowScanState,
        shadows: &mut [f32],
        mut light_rays: Option<&mut [f32]>,
    ) -> RowScanState {
        let mut state = seed;
        for (y, row) in heights.chunks(size).enumerate() {
            let span = y * size..(y + 1) * size;
            let row_shadows = &mut shadows[span.clone()];
            let row_light = light_rays.as_deref_mut().map(|light| {
                let row_light = &mut light[span];
                for (l, &h) in row_light.iter_mut().zip(row) {
                    *l = h.max(0.0);
                }
                row_light
            });

            let start = match self.settings.row_carry {
                RowCarry::ResetEachRow => RowScanState::NEUTRAL,
                RowCarry::CarryAcrossRows => state,
            };
            state = self.scan_row(row, start, row_shadows, row_light);
        }
        state
    }

    /// Starting state for a band whose first row is `first_row`
    ///
    /// Resolved from the complete heightfield, so every band can be seeded
    /// before any band runs. At the end of a row `prev_shadow` is always false,
    /// which leaves the last height of the row above as the only state to hand over.
    pub fn band_seed_state(&self, heights: &[f32], size: usize, first_row: usize) -> RowScanState {
        match (self.settings.row_carry, self.settings.band_seeding) {
            (RowCarry::CarryAcrossRows, BandSeeding::PreviousBand) if first_row > 0 => {
                RowScanState {
                    prev_height: heights[first_row * size - 1],
                    prev_shadow: false,
                }
            }
            _ => RowScanState::NEUTRAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scanner(delta_h: f32, policy: ShadowPolicy) -> ShadowScanner {
        ShadowScanner::new(
            delta_h,
            ShadowSettings {
                policy,
                ..ShadowSettings::default()
            },
        )
    }

    fn scan(s: &ShadowScanner, row: &[f32]) -> Vec<f32> {
        let mut shadows = vec![0.0; row.len()];
        s.scan_row(row, RowScanState::NEUTRAL, &mut shadows, None);
        shadows
    }

    #[test]
    fn test_cliff_casts_full_shadow() {
        let s = scanner(0.1, ShadowPolicy::EarlyExit);
        // The peak at x = 1 shadows x = 2 (ray 0.1 vs 0.8) and x = 3 (0.2 vs 0.8)
        let shadows = scan(&s, &[0.0, 0.8, 0.0, 0.0, 0.0]);
        assert_eq!(shadows[0], 0.0);
        assert_eq!(shadows[1], 0.0);
        assert_eq!(shadows[2], 1.0);
        assert_eq!(shadows[3], 1.0);
    }

    #[test]
    fn test_shadow_fades_into_penumbra() {
        let s = scanner(0.25, ShadowPolicy::Exhaustive);
        // Ray from x = 4 passes over the 0.6 peak at 0.75, within one step
        let shadows = scan(&s, &[0.0, 0.6, 0.0, 0.0, 0.0]);
        assert_eq!(shadows[2], 1.0);
        assert_eq!(shadows[3], 1.0);
        assert_relative_eq!(shadows[4], 0.6, epsilon = 1e-5);
    }

    #[test]
    fn test_penumbra_is_linear_in_clearance() {
        let s = scanner(0.1, ShadowPolicy::Exhaustive);
        // Ray from x = 1 reaches x = 0 at 0.1; terrain 0.07 => diff = -0.03
        let shadows = scan(&s, &[0.07, 0.0]);
        assert_relative_eq!(shadows[1], 0.3, epsilon = 1e-5);
    }

    #[test]
    fn test_early_exit_matches_exhaustive_on_ridges() {
        let rows: [&[f32]; 3] = [
            &[0.0, 0.9, 0.0, 0.05, 0.31, 0.12, 0.44, 0.02],
            &[0.13, 0.52, 0.47, 0.39, 0.61, 0.58, 0.2, -0.3],
            &[-0.2, 0.33, 0.07, 0.29, 0.27, 0.71, 0.05, 0.66],
        ];
        for row in rows {
            let early = scan(&scanner(0.11, ShadowPolicy::EarlyExit), row);
            let full = scan(&scanner(0.11, ShadowPolicy::Exhaustive), row);
            assert_eq!(early, full, "row {row:?}");
        }

        let shadows = scan(&scanner(0.11, ShadowPolicy::EarlyExit), rows[0]);
        assert_eq!(&shadows[..6], &[0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        assert_relative_eq!(shadows[6], 0.818_182_6, epsilon = 1e-5);
        assert_eq!(shadows[7], 1.0);
    }

    #[test]
    fn test_zero_delta_terminates_with_binary_shadows() {
        let s = scanner(0.0, ShadowPolicy::Exhaustive);
        let row = [0.2, 0.5, 0.1, 0.5, 0.6, -0.4, 0.7];
        let shadows = scan(&s, &row);
        for (x, &shadow) in shadows.iter().enumerate() {
            let ray = row[x].max(0.0);
            let blocked = row[..x].iter().any(|&t| t > ray);
            assert_eq!(shadow, if blocked { 1.0 } else { 0.0 }, "cell {x}");
        }
    }

    #[test]
    fn test_water_rays_start_at_sea_level() {
        let s = scanner(0.1, ShadowPolicy::Exhaustive);
        // Deep water next to a low shore: the ray starts at 0, not -0.5
        let shadows = scan(&s, &[0.05, -0.5]);
        assert_relative_eq!(shadows[1], 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_stops_above_unit_height() {
        let s = scanner(0.6, ShadowPolicy::Exhaustive);
        // From x = 3 the ray is at 1.2 over x = 1 and stops before reaching the wall
        let shadows = scan(&s, &[5.0, 0.0, 0.0, 0.0]);
        assert_eq!(shadows, vec![0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_last_column_never_carries_shadow() {
        let s = scanner(0.1, ShadowPolicy::EarlyExit);
        let mut shadows = vec![0.0; 3];
        let state = s.scan_row(&[0.9, 0.0, 0.0], RowScanState::NEUTRAL, &mut shadows, None);
        assert_eq!(shadows[2], 1.0);
        assert!(!state.prev_shadow);
        assert_eq!(state.prev_height, 0.0);
    }

    #[test]
    fn test_light_rays_back_propagate_from_penumbra() {
        let s = scanner(0.1, ShadowPolicy::Exhaustive);
        let row = [0.07, 0.0, 0.0];
        let mut shadows = vec![0.0; 3];
        let mut light = vec![0.07, 0.0, 0.0];
        s.scan_row(&row, RowScanState::NEUTRAL, &mut shadows, Some(&mut light));

        // x = 1 grazes x = 0 (ray 0.1 over 0.07): nothing left of it to walk back over
        assert_relative_eq!(shadows[1], 0.3, epsilon = 1e-5);
        // x = 2 passes x = 0 at 0.2, more than one step above 0.07
        assert_eq!(shadows[2], 0.0);
        // The grazing ray from x = 1 starts over x = 0 at 0.1
        assert_relative_eq!(light[0], 0.1, epsilon = 1e-6);
        // x = 2 was marched and ended lit, so it records its own height
        assert_eq!(light[2], 0.0);
    }

    #[test]
    fn test_scan_rows_resets_or_carries() {
        let heights = [0.0, 0.0, 0.5, 0.3, 0.0, 0.0];
        let reset = ShadowScanner::new(0.1, ShadowSettings::default());
        let mut shadows = vec![0.0; 6];
        let end = reset.scan_rows(&heights, 2, RowScanState::NEUTRAL, &mut shadows, None);
        assert_eq!(end.prev_height, 0.0);
        assert!(shadows.iter().all(|&s| s == 0.0 || s == 1.0));

        let carry = ShadowScanner::new(
            0.1,
            ShadowSettings {
                row_carry: RowCarry::CarryAcrossRows,
                ..ShadowSettings::default()
            },
        );
        let mut carried = vec![0.0; 6];
        carry.scan_rows(&heights, 2, RowScanState::NEUTRAL, &mut carried, None);
        // First cells have nothing to their left, so shadows agree either way
        assert_eq!(shadows, carried);
    }

    #[test]
    fn test_scan_rows_initializes_light_rays() {
        let s = ShadowScanner::new(0.1, ShadowSettings::default());
        let heights = [0.4, -0.2, 0.3, 0.6];
        let mut shadows = vec![0.0; 4];
        let mut light = vec![9.0; 4];
        s.scan_rows(&heights, 2, RowScanState::NEUTRAL, &mut shadows, Some(&mut light));
        assert_eq!(light[0], 0.4);
        assert_eq!(light[2], 0.3);
        assert_eq!(light[3], 0.6);
        // x = 1 of row 0 is below its predecessor, marched, and ends fully
        // shadowed (ray 0.1 < 0.4), so the light ray keeps its initial value
        assert_eq!(shadows[1], 1.0);
        assert_eq!(light[1], 0.0);
    }

    #[test]
    fn test_band_seed_uses_row_above() {
        let heights = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let carry = ShadowScanner::new(
            0.1,
            ShadowSettings {
                row_carry: RowCarry::CarryAcrossRows,
                band_seeding: BandSeeding::PreviousBand,
                ..ShadowSettings::default()
            },
        );
        assert_eq!(carry.band_seed_state(&heights, 2, 0), RowScanState::NEUTRAL);
        let seed = carry.band_seed_state(&heights, 2, 2);
        assert_eq!(seed.prev_height, 0.4);
        assert!(!seed.prev_shadow);

        let neutral = ShadowScanner::new(
            0.1,
            ShadowSettings {
                row_carry: RowCarry::CarryAcrossRows,
                band_seeding: BandSeeding::Neutral,
                ..ShadowSettings::default()
            },
        );
        assert_eq!(neutral.band_seed_state(&heights, 2, 2), RowScanState::NEUTRAL);

        let reset = ShadowScanner::new(0.1, ShadowSettings::default());
        assert_eq!(reset.band_seed_state(&heights, 2, 2), RowScanState::NEUTRAL);
    }
}
