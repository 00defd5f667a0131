//! Timing helpers for generation runs.
//!
//! Provides an RAII profiling scope and the per-run statistics returned with
//! every set of terrain maps.

use crate::terrain::HeightRange;
use std::time::Instant;
use tracing::debug;

/// A profiling scope that measures elapsed time using RAII.
///
/// Elapsed time is logged at debug level when dropped.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    /// Creates a new profiling scope.
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Gets elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfilerScope {
    fn drop(&mut self) {
        debug!("{} took {:.2} ms", self.name, self.elapsed_ms());
    }
}

/// Time spent by one band in each phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandTiming {
    /// Band index, top to bottom
    pub band: usize,
    pub first_row: usize,
    pub rows: usize,
    /// Fractal height synthesis; zero for an externally supplied heightfield
    pub height_ms: f64,
    /// Shadow, normal and color passes
    pub shade_ms: f64,
}

impl BandTiming {
    pub fn total_ms(&self) -> f64 {
        self.height_ms + self.shade_ms
    }
}

/// Summary of one generation run
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStats {
    /// Grid side length
    pub size: usize,
    /// Per-band timings in band order
    pub bands: Vec<BandTiming>,
    /// Range of the final heightfield
    pub height_range: HeightRange,
    pub total_ms: f64,
    /// Cells below sea level
    pub water_cells: usize,
    /// Cells with shadow intensity 1
    pub shadowed_cells: usize,
    /// Cells with shadow intensity strictly between 0 and 1
    pub penumbra_cells: usize,
}

impl GenerationStats {
    /// Slowest band, the critical path of the fork-join
    pub fn slowest_band(&self) -> Option<&BandTiming> {
        self.bands
            .iter()
            .max_by(|a, b| a.total_ms().total_cmp(&b.total_ms()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_profiler_scope_measures_time() {
        let scope = ProfilerScope::new("test");
        thread::sleep(Duration::from_millis(10));
        let elapsed = scope.elapsed_ms();
        assert!(elapsed >= 10.0, "Expected at least 10ms, got {elapsed}");
    }

    #[test]
    fn test_slowest_band() {
        let timing = |band, height_ms, shade_ms| BandTiming {
            band,
            first_row: band * 4,
            rows: 4,
            height_ms,
            shade_ms,
        };
        let stats = GenerationStats {
            size: 8,
            bands: vec![timing(0, 1.0, 2.0), timing(1, 0.5, 4.0)],
            height_range: HeightRange { min: 0.0, max: 1.0 },
            total_ms: 5.0,
            water_cells: 0,
            shadowed_cells: 0,
            penumbra_cells: 0,
        };
        assert_eq!(stats.slowest_band().map(|b| b.band), Some(1));
    }
}
