//! HTTP request handlers.
//!
//! - `tiles`: raster and terrain-RGB tile endpoints
//! - `pointcloud`: point-cloud metadata and buffer endpoints
//! - `analysis`: analytic raster operations and elevation queries
//! - `layers`: layer listings and bounds
//! - `health`: health check and Prometheus metrics
//! - `common`: error responses and shared helpers

pub mod analysis;
pub mod common;
pub mod health;
pub mod layers;
pub mod pointcloud;
pub mod tiles;

pub use analysis::{
    aspect_handler, landslide_hazard_handler, profile_handler, query_elevation_handler, slope_handler,
};
pub use common::{ApiError, ApiResult};
pub use health::{health_handler, metrics_handler};
pub use layers::{
    elevation_layers_handler, layer_bounds_handler, layer_bounds_polygon_handler, pointcloud_layers_handler,
    raster_layers_handler,
};
pub use pointcloud::{pointcloud_data_handler, pointcloud_metadata_handler};
pub use tiles::{dem_tile_handler, raster_tile_handler};
