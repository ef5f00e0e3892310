//! Shared handler utilities.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use terrain_common::{TerrainError, TerrainResult};
use tracing::error;

/// Error response: `{"error": message}` with the taxonomy status code.
#[derive(Debug)]
pub struct ApiError(pub TerrainError);

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<TerrainError>,
{
    fn from(err: E) -> Self {
        ApiError(err.into())
    }
}

/// Run blocking work (file I/O, rendering) off the async workers.
pub async fn run_blocking<T, F>(f: F) -> TerrainResult<T>
where
    F: FnOnce() -> TerrainResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| TerrainError::InternalError(format!("worker task failed: {}", e)))?
}

pub fn png_response(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], bytes).into_response()
}

/// Parse the final tile path segment, `"{y}.png"` or bare `"{y}"`.
pub fn parse_tile_y(segment: &str) -> TerrainResult<u32> {
    let (y, _) = segment.rsplit_once('.').unwrap_or((segment, "png"));
    y.parse()
        .map_err(|_| TerrainError::invalid_parameter("y", format!("'{}' is not a tile row", segment)))
}

/// Display name for a layer file: extension dropped, underscores as
/// spaces, each word capitalised.
pub fn display_name(file_name: &str) -> String {
    let stem = file_name.rsplit_once('.').map_or(file_name, |(stem, _)| stem);
    let mut prev_cased = false;
    stem.chars()
        .map(|c| if c == '_' { ' ' } else { c })
        .flat_map(|c| {
            let out: Vec<char> = if !c.is_alphabetic() {
                vec![c]
            } else if prev_cased {
                c.to_lowercase().collect()
            } else {
                c.to_uppercase().collect()
            };
            prev_cased = c.is_alphabetic();
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tile_y() {
        assert_eq!(parse_tile_y("475.png").unwrap(), 475);
        assert_eq!(parse_tile_y("12").unwrap(), 12);
        assert!(parse_tile_y("abc.png").is_err());
        assert!(parse_tile_y("-1.png").is_err());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("dem_bangalore.tif"), "Dem Bangalore");
        assert_eq!(display_name("SENTINEL_false_color.tiff"), "Sentinel False Color");
        assert_eq!(display_name("srtm30m.tif"), "Srtm30M");
        assert_eq!(display_name("noext"), "Noext");
    }
}
