//! Core types shared by all pipeline stages

pub mod color;
pub mod field;
pub mod vec3;

pub use color::Rgba;
pub use field::{ColorBuffer, GridField, HeightField, LightRayField, NormalField, ShadowField};
pub use vec3::{Vec3, UP};
