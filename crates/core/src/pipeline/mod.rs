//! Band scheduling, run control and results

pub mod bands;
pub mod cancel;
pub mod profiler;
pub mod store;

pub use bands::{
    generate, generate_with, render_heightfield, render_heightfield_with, BandPlan, TerrainMaps,
};
pub use cancel::CancelToken;
pub use profiler::{BandTiming, GenerationStats, ProfilerScope};
pub use store::TerrainStore;
