//! Common types and utilities shared across the terrain tile workspace.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod grid;
pub mod tile;

pub use bbox::BoundingBox;
pub use crs::{geokey, CrsCode};
pub use error::{TerrainError, TerrainResult};
pub use grid::{GeoTransform, Grid, Raster, DEFAULT_NODATA};
pub use tile::{TileExtent, TileKey, TILE_SIZE};
