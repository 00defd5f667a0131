//! Terrain Shading Core Library
//!
//! Procedural heightfield synthesis and top-down shaded rendering. A seeded
//! fractal noise field is turned into a grid of colors through four per-cell
//! stages:
//!
//! - fbm heightfield synthesis, optionally normalized to `[-1, 1]`
//! - central-difference surface normals
//! - directional self-shadowing by horizon raymarching along rows, with
//!   penumbra antialiasing and light-ray back-propagation
//! - material classification and lighting
//!
//! The grid is processed in horizontal bands on the rayon thread pool. Band
//! workers write disjoint row ranges of freshly allocated buffers, and shadow
//! state crossing band boundaries is resolved before the bands start, so the
//! output does not depend on the band count.
//!
//! ```no_run
//! use terrain_shade_core::{generate, GenerationConfig};
//!
//! let config = GenerationConfig {
//!     map_size: 512,
//!     ..GenerationConfig::default()
//! };
//! let maps = generate(&config)?;
//! let first = maps.colors.get(0, 0);
//! # Ok::<(), terrain_shade_core::TerrainError>(())
//! ```

// Core types and utilities
pub mod config;
pub mod core_types;
pub mod error;

// Noise primitives and per-cell stages
pub mod noise;
pub mod terrain;

// Band scheduling and run control
pub mod pipeline;

// Re-export core types
pub use config::{GenerationConfig, RenderParams};
pub use core_types::{
    ColorBuffer, GridField, HeightField, LightRayField, NormalField, Rgba, ShadowField, Vec3,
};
pub use error::{TerrainError, TerrainResult};

// Re-export stage types
pub use noise::{NoiseKind, NoiseSource};
pub use terrain::{
    BandSeeding, HeightMode, HeightRange, Palette, RowCarry, RowScanState, ShadingSettings,
    ShadowPolicy, ShadowSettings,
};

// Re-export pipeline entry points
pub use pipeline::{
    generate, generate_with, render_heightfield, render_heightfield_with, BandTiming,
    CancelToken, GenerationStats, TerrainMaps, TerrainStore,
};
