//! Error types for terrain generation
//!
//! Only configuration problems and run control (cancellation) are errors.
//! Numeric degeneracies such as a constant field during normalization and
//! neighbor lookups at the grid edge are handled where they occur.

use thiserror::Error;

/// Errors produced by the terrain pipeline
#[derive(Error, Debug)]
pub enum TerrainError {
    /// A configuration value was rejected before generation began
    #[error("Invalid configuration: {field} {message}")]
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// What is wrong with it
        message: String,
    },

    /// A TOML configuration document could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configuration file could not be read
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// A field buffer did not match the grid it was paired with
    #[error("Field size mismatch: expected {expected} cells, got {actual}")]
    SizeMismatch {
        /// Cells required by the grid
        expected: usize,
        /// Cells supplied
        actual: usize,
    },

    /// The run was cancelled through its `CancelToken`
    #[error("Generation cancelled")]
    Cancelled,

    /// The run completed after a newer run had already been requested
    #[error("Generation {generation} was superseded by a newer request")]
    Superseded {
        /// Sequence number of the stale run
        generation: u64,
    },
}

impl TerrainError {
    /// Shorthand for building an [`TerrainError::InvalidConfig`]
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type TerrainResult<T> = Result<T, TerrainError>;
