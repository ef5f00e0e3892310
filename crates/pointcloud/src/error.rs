//! Error types for point-cloud processing.

use terrain_common::TerrainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PointCloudError {
    /// Source file does not exist.
    #[error("point cloud '{0}' not found")]
    NotFound(String),

    /// The source could not be opened or parsed.
    #[error("failed to read point cloud '{name}': {message}")]
    Read { name: String, message: String },

    /// The source names no usable coordinate reference system.
    #[error("point cloud CRS: {0}")]
    Crs(String),

    /// The source parsed but holds no points.
    #[error("point cloud '{0}' contains no points")]
    Empty(String),

    /// Collection arrays disagree in length.
    #[error("inconsistent point collection: {0}")]
    Inconsistent(String),

    /// Metadata document could not be (de)serialized.
    #[error("metadata error: {0}")]
    Metadata(#[from] serde_json::Error),

    /// Elevation ramp could not be built.
    #[error("colour ramp error: {0}")]
    Render(#[from] renderer::RenderError),

    /// Cache store failure.
    #[error(transparent)]
    Storage(#[from] TerrainError),
}

impl From<PointCloudError> for TerrainError {
    fn from(err: PointCloudError) -> Self {
        match err {
            PointCloudError::NotFound(name) => TerrainError::NotFound(format!("point cloud '{}'", name)),
            PointCloudError::Crs(message) => TerrainError::InvalidCrs(message),
            PointCloudError::Storage(inner) => inner,
            other => TerrainError::Processing(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PointCloudError>;
