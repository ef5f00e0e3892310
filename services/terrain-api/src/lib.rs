//! Terrain tile and analysis HTTP service.
//!
//! Serves XYZ raster and terrain-RGB tiles, point-cloud buffers for WebGL
//! viewers, and analytic rasters (slope, aspect, landslide hazard) that are
//! cached and then tiled like any other layer.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod rendering;
pub mod state;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// All API routes with their middleware. `/metrics` is added by the
/// binary, which owns the Prometheus recorder.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        // Tiles
        .route("/api/raster_tile/:layer/:z/:x/:y", get(handlers::raster_tile_handler))
        .route("/api/dem_tile/:layer/:z/:x/:y", get(handlers::dem_tile_handler))
        // Point clouds
        .route("/api/get_pointcloud_metadata/:file", get(handlers::pointcloud_metadata_handler))
        .route("/api/get_pointcloud_data/:file", get(handlers::pointcloud_data_handler))
        // Analysis
        .route("/api/calculate_slope", post(handlers::slope_handler))
        .route("/api/calculate_aspect", post(handlers::aspect_handler))
        .route("/api/landslide_hazard", post(handlers::landslide_hazard_handler))
        .route("/api/query_elevation", post(handlers::query_elevation_handler))
        .route("/api/generate_profile", post(handlers::profile_handler))
        // Layers
        .route("/api/elevation_layers", get(handlers::elevation_layers_handler))
        .route("/api/raster_layers", get(handlers::raster_layers_handler))
        .route("/api/pointcloud_layers", get(handlers::pointcloud_layers_handler))
        .route("/api/layer_bounds/:layer_type/:file", get(handlers::layer_bounds_handler))
        .route("/api/layer_bounds_polygon/:file", get(handlers::layer_bounds_polygon_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
