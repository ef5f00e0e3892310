//! Analytic raster operations and elevation queries.
//!
//! Every operation reads band 1 of a source DEM. Operations that produce
//! a grid store it in the raster cache and return the generated name,
//! which the tile endpoint then serves like any other layer.

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use storage::read_geotiff;
use terrain_analysis::hazard::DEFAULT_RAINFALL_MM;
use terrain_analysis::{generate_profile, query_elevation, run_and_cache, AnalyticOp, CachedAnalysis, ProfilePoint};
use terrain_common::{Grid, TerrainError, TerrainResult};

use super::common::{run_blocking, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DemRequest {
    pub dem_filename: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HazardRequest {
    pub dem_filename: Option<String>,
    pub rainfall_mm: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ElevationQuery {
    pub dem_filename: Option<String>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub dem_filename: Option<String>,
    pub line: Option<Vec<[f64; 2]>>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub result: CachedAnalysis,
}

#[derive(Debug, Serialize)]
pub struct ElevationResponse {
    pub elevation: Option<f32>,
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile_data: Vec<ProfilePoint>,
}

fn required<T>(value: Option<T>, name: &str) -> TerrainResult<T> {
    value.ok_or_else(|| TerrainError::MissingParameter(name.to_string()))
}

fn load_dem(path: &Path) -> TerrainResult<Grid> {
    read_geotiff(path)?.band(1)
}

async fn analyse(state: Arc<AppState>, dem_filename: Option<String>, op: AnalyticOp) -> ApiResult<Json<AnalysisResponse>> {
    let path = state.elevation_path(&required(dem_filename, "dem_filename")?)?;
    info!(dem = %path.display(), op = op.cache_prefix(), "Running analysis");
    let result = run_blocking(move || {
        let dem = load_dem(&path)?;
        run_and_cache(op, &dem, state.raster_cache.as_ref())
    })
    .await?;
    Ok(Json(AnalysisResponse {
        status: "success",
        result,
    }))
}

/// `POST /api/calculate_slope`
pub async fn slope_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<DemRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    analyse(state, req.dem_filename, AnalyticOp::Slope).await
}

/// `POST /api/calculate_aspect`
pub async fn aspect_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<DemRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    analyse(state, req.dem_filename, AnalyticOp::Aspect).await
}

/// `POST /api/landslide_hazard`
pub async fn landslide_hazard_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<HazardRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    let rainfall_mm = req.rainfall_mm.unwrap_or(DEFAULT_RAINFALL_MM);
    if !rainfall_mm.is_finite() {
        return Err(TerrainError::invalid_parameter("rainfall_mm", "must be a finite number").into());
    }
    analyse(state, req.dem_filename, AnalyticOp::LandslideHazard { rainfall_mm }).await
}

/// `POST /api/query_elevation`
pub async fn query_elevation_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<ElevationQuery>,
) -> ApiResult<Json<ElevationResponse>> {
    let lon = required(req.lon, "lon")?;
    let lat = required(req.lat, "lat")?;
    let path = state.elevation_path(&required(req.dem_filename, "dem_filename")?)?;
    let elevation = run_blocking(move || query_elevation(&load_dem(&path)?, lon, lat)).await?;
    Ok(Json(ElevationResponse { elevation, lon, lat }))
}

/// `POST /api/generate_profile`
pub async fn profile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<ProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let line = required(req.line, "line")?;
    if line.len() < 2 {
        return Err(TerrainError::invalid_parameter("line", "needs at least two vertices").into());
    }
    let path = state.elevation_path(&required(req.dem_filename, "dem_filename")?)?;
    let profile_data = run_blocking(move || generate_profile(&load_dem(&path)?, &line)).await?;
    Ok(Json(ProfileResponse { profile_data }))
}
