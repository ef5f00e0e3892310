//! Error types shared by the terrain tile services.

use thiserror::Error;

use crate::crs::CrsParseError;

/// Result type alias using TerrainError.
pub type TerrainResult<T> = Result<T, TerrainError>;

/// Primary error type, split along the client / not-found / server lines
/// the HTTP layer reports.
#[derive(Debug, Error)]
pub enum TerrainError {
    // === Input Validation Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid CRS: {0}")]
    InvalidCrs(String),

    // === Resource Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    // === Processing Errors ===
    #[error("Processing failed: {0}")]
    Processing(String),

    #[error("Failed to read data: {0}")]
    DataReadError(String),

    #[error("Projection error: {0}")]
    ProjectionError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl TerrainError {
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        TerrainError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            TerrainError::MissingParameter(_)
            | TerrainError::InvalidParameter { .. }
            | TerrainError::InvalidCrs(_) => 400,

            TerrainError::NotFound(_) => 404,

            _ => 500,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TerrainError::NotFound(_))
    }
}

// Conversion from common error types
impl From<std::io::Error> for TerrainError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => TerrainError::NotFound(err.to_string()),
            _ => TerrainError::InternalError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for TerrainError {
    fn from(err: serde_json::Error) -> Self {
        TerrainError::InternalError(format!("JSON error: {}", err))
    }
}

impl From<CrsParseError> for TerrainError {
    fn from(err: CrsParseError) -> Self {
        TerrainError::InvalidCrs(err.to_string())
    }
}
