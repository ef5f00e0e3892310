//! Point-cloud handlers.

use axum::{
    extract::{Extension, Path},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use pointcloud::PointCloudMeta;
use terrain_common::TerrainError;

use super::common::{run_blocking, ApiResult};
use crate::metrics::record_preprocess;
use crate::state::AppState;

/// `GET /api/get_pointcloud_metadata/{file}`
///
/// Preprocesses the source on first request; later requests read the
/// cached descriptor.
pub async fn pointcloud_metadata_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(file): Path<String>,
) -> ApiResult<Json<PointCloudMeta>> {
    debug!(file = %file, "Point-cloud metadata request");
    let result = run_blocking(move || state.pointclouds.preprocess(&file).map_err(TerrainError::from)).await;
    record_preprocess(if result.is_ok() { "ok" } else { "error" });
    Ok(Json(result?))
}

/// `GET /api/get_pointcloud_data/{file}`
pub async fn pointcloud_data_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(file): Path<String>,
) -> ApiResult<Response> {
    let bytes = run_blocking(move || state.pointcloud_cache.get_buffer(&file)).await?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response())
}
