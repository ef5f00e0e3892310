//! Error types for rendering.

use terrain_common::TerrainError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("unknown colormap: {0}")]
    UnknownRamp(String),

    #[error("invalid render input: {0}")]
    InvalidInput(String),

    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

impl From<RenderError> for TerrainError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::UnknownRamp(name) => TerrainError::invalid_parameter("colormap", format!("unknown colormap '{}'", name)),
            RenderError::InvalidInput(msg) => TerrainError::Processing(msg),
            RenderError::Encode(msg) => TerrainError::InternalError(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
