//! Per-cell pipeline stages: heights, normals, shadows and colors
//!
//! Every stage works on row blocks of a square row-major grid so the band
//! scheduler can hand each worker its own slice of the output buffers.

pub mod heightfield;
pub mod normals;
pub mod shading;
pub mod shadow;

pub use heightfield::{
    fill_height_rows, normalize_heights, normalize_value, HeightMode, HeightRange, HeightSampler,
};
pub use normals::{estimate_normal, fill_normal_rows};
pub use shading::{fog_amount, Material, Palette, Shader, ShadingSettings};
pub use shadow::{BandSeeding, RowCarry, RowScanState, ShadowPolicy, ShadowScanner, ShadowSettings};
