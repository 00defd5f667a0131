//! Latest-result holder for hosts that regenerate repeatedly
//!
//! Each call to [`TerrainStore::regenerate`] starts a new run with fresh
//! buffers, cancels whichever run was in flight, and publishes its maps only if
//! no newer run was requested meanwhile. Readers never observe a partially
//! written buffer: the visible maps are swapped as a whole `Arc`.

use super::bands::{generate_with, TerrainMaps};
use super::cancel::CancelToken;
use crate::config::GenerationConfig;
use crate::error::{TerrainError, TerrainResult};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{info, warn};

#[derive(Debug, Default)]
struct RunState {
    generation: u64,
    cancel: CancelToken,
}

/// Holder of the most recently completed terrain
#[derive(Debug, Default)]
pub struct TerrainStore {
    run: Mutex<RunState>,
    current: RwLock<Option<Arc<TerrainMaps>>>,
}

impl TerrainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest completed maps, if any run has finished
    pub fn current(&self) -> Option<Arc<TerrainMaps>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sequence number of the newest requested run
    pub fn generation(&self) -> u64 {
        self.run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Cancel the in-flight run, if any, without starting another
    pub fn cancel(&self) {
        self.run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel
            .cancel();
    }

    /// Generate terrain for `config` and make it current
    ///
    /// Returns [`TerrainError::Cancelled`] if a newer request cancelled this
    /// run mid-flight, or [`TerrainError::Superseded`] if it finished after a
    /// newer request was made. In both cases the current maps are unchanged.
    pub fn regenerate(&self, config: &GenerationConfig) -> TerrainResult<Arc<TerrainMaps>> {
        config.validate()?;
        let (generation, cancel) = self.begin();
        let noise = config.noise.build(config.seed);
        let maps = generate_with(config, noise.as_ref(), &cancel)?;
        self.publish(generation, maps)
    }

    fn begin(&self) -> (u64, CancelToken) {
        let mut run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
        run.cancel.cancel();
        run.generation += 1;
        run.cancel = CancelToken::new();
        (run.generation, run.cancel.clone())
    }

    fn publish(&self, generation: u64, maps: TerrainMaps) -> TerrainResult<Arc<TerrainMaps>> {
        // Held across the swap so a newer run cannot begin in between
        let run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
        if run.generation != generation {
            warn!(
                "Discarding terrain from run {}, run {} is newer",
                generation, run.generation
            );
            return Err(TerrainError::Superseded { generation });
        }

        let maps = Arc::new(maps);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&maps));
        info!("Published terrain from run {}", generation);
        Ok(maps)
    }
}
