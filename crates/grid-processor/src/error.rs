//! Error types for grid processing.

use terrain_common::TerrainError;
use thiserror::Error;

/// Errors that can occur during grid processing.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// Destination dimensions are zero.
    #[error("invalid destination dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// The source affine transform has no inverse.
    #[error("source transform is not invertible: {0}")]
    SingularTransform(String),

    /// Projection error.
    #[error("projection error: {0}")]
    ProjectionError(String),

    /// The output grid failed validation.
    #[error("invalid grid: {0}")]
    InvalidGrid(#[from] TerrainError),
}

impl From<GridProcessorError> for TerrainError {
    fn from(err: GridProcessorError) -> Self {
        match err {
            GridProcessorError::InvalidGrid(inner) => inner,
            GridProcessorError::ProjectionError(msg) => TerrainError::ProjectionError(msg),
            other => TerrainError::Processing(other.to_string()),
        }
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
