//! Central-difference surface normals
//!
//! Neighbors outside the grid are replaced by the cell's own height, so edge
//! cells use a one-sided difference and never read out of bounds.

use crate::core_types::Vec3;

/// Surface normal of cell `(x, y)` in a square row-major grid
///
/// Builds the tangents `(s, 0, h(x+1) - h(x-1))` and `(0, s, h(y+1) - h(y-1))`
/// with `s = normal_scale`, normalizes each, and returns their normalized cross
/// product. Smaller `normal_scale` exaggerates slopes.
#[inline]
pub fn estimate_normal(heights: &[f32], size: usize, x: usize, y: usize, normal_scale: f32) -> Vec3 {
    let i = y * size + x;
    let h = heights[i];

    let left = if x > 0 { heights[i - 1] } else { h };
    let right = if x + 1 < size { heights[i + 1] } else { h };
    let up = if y > 0 { heights[i - size] } else { h };
    let down = if y + 1 < size { heights[i + size] } else { h };

    let tangent_x = Vec3::new(normal_scale, 0.0, right - left).normalize();
    let tangent_y = Vec3::new(0.0, normal_scale, down - up).normalize();
    tangent_x.cross(&tangent_y).normalize()
}

/// Fill normals for the rows starting at `first_row`
///
/// `heights` is the complete field so band-edge rows can see their neighbors;
/// `out.len()` must be a multiple of `size`.
pub fn fill_normal_rows(
    heights: &[f32],
    size: usize,
    normal_scale: f32,
    first_row: usize,
    out: &mut [Vec3],
) {
    for (local_y, row) in out.chunks_mut(size).enumerate() {
        let y = first_row + local_y;
        for (x, normal) in row.iter_mut().enumerate() {
            *normal = estimate_normal(heights, size, x, y, normal_scale);
        }
    }
}
