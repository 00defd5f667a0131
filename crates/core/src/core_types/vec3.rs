//! Vector type alias for normals and light directions.

use nalgebra::Vector3;

/// 3D vector type for surface normals, tangents and the sun direction.
///
/// This is a simple alias for `nalgebra::Vector3<f32>`. The z axis points up,
/// so a flat cell has the normal `(0, 0, 1)`.
pub type Vec3 = Vector3<f32>;

/// World up axis used for slope classification.
pub const UP: Vec3 = Vec3::new(0.0, 0.0, 1.0);
