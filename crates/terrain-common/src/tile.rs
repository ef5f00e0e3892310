//! Web Mercator quad-tile addressing.
//!
//! Tile extents follow the mercantile / slippy-map convention: the world is
//! the EPSG:3857 square of half-width `pi * R`, tile rows grow southwards,
//! and each tile is rendered as a 256x256 grid with row 0 at its north edge.

use crate::{BoundingBox, CrsCode, GeoTransform, TerrainError, TerrainResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Destination tile edge length in pixels.
pub const TILE_SIZE: usize = 256;

/// Semi-major axis of WGS84, the sphere radius Web Mercator uses.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Half the Web Mercator world width (20037508.342789244 m).
pub const MERCATOR_HALF_EXTENT: f64 = PI * EARTH_RADIUS;

/// Deepest zoom accepted; keeps `2^z` inside u32.
pub const MAX_ZOOM: u32 = 30;

/// A quad-tile index (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileKey {
    pub z: u32,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    /// Validated tile key: `0 <= x, y < 2^z`.
    pub fn new(z: u32, x: u32, y: u32) -> TerrainResult<Self> {
        if z > MAX_ZOOM {
            return Err(TerrainError::invalid_parameter(
                "z",
                format!("zoom {} exceeds maximum {}", z, MAX_ZOOM),
            ));
        }
        let n = 1u64 << z;
        if x as u64 >= n || y as u64 >= n {
            return Err(TerrainError::invalid_parameter(
                "tile",
                format!("tile {}/{}/{} outside 0..{} at zoom {}", z, x, y, n, z),
            ));
        }
        Ok(Self { z, x, y })
    }

    /// EPSG:3857 bounds of this tile, as `mercantile.xy_bounds`.
    pub fn mercator_bounds(&self) -> BoundingBox {
        let tile_size = 2.0 * MERCATOR_HALF_EXTENT / (1u64 << self.z) as f64;
        let left = self.x as f64 * tile_size - MERCATOR_HALF_EXTENT;
        let top = MERCATOR_HALF_EXTENT - self.y as f64 * tile_size;
        BoundingBox::new(left, top - tile_size, left + tile_size, top)
    }

    /// Lon/lat bounds of this tile.
    pub fn lonlat_bounds(&self) -> BoundingBox {
        let n = (1u64 << self.z) as f64;

        let lon_min = self.x as f64 / n * 360.0 - 180.0;
        let lon_max = (self.x + 1) as f64 / n * 360.0 - 180.0;

        let lat_max = (PI * (1.0 - 2.0 * self.y as f64 / n)).sinh().atan().to_degrees();
        let lat_min = (PI * (1.0 - 2.0 * (self.y + 1) as f64 / n)).sinh().atan().to_degrees();

        BoundingBox::new(lon_min, lat_min, lon_max, lat_max)
    }

    /// Destination grid geometry for rendering this tile.
    pub fn extent(&self) -> TileExtent {
        let bounds = self.mercator_bounds();
        TileExtent {
            key: *self,
            bounds,
            transform: GeoTransform::from_bounds(
                bounds.min_x,
                bounds.min_y,
                bounds.max_x,
                bounds.max_y,
                TILE_SIZE,
                TILE_SIZE,
            ),
            crs: CrsCode::Epsg3857,
            width: TILE_SIZE,
            height: TILE_SIZE,
        }
    }
}

/// Bounds, transform and size of the grid a tile is rendered into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileExtent {
    pub key: TileKey,
    pub bounds: BoundingBox,
    pub transform: GeoTransform,
    pub crs: CrsCode,
    pub width: usize,
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Addressing tests
    // ========================================================================

    #[test]
    fn test_zoom_zero_covers_world() {
        let bounds = TileKey::new(0, 0, 0).unwrap().mercator_bounds();
        assert_eq!(bounds.min_x, -20037508.342789244);
        assert_eq!(bounds.max_x, 20037508.342789244);
        assert_eq!(bounds.min_y, -20037508.342789244);
        assert_eq!(bounds.max_y, 20037508.342789244);
    }

    #[test]
    fn test_known_tile_bounds() {
        // mercantile.xy_bounds(1, 1, 1)
        let bounds = TileKey::new(1, 1, 1).unwrap().mercator_bounds();
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.max_x, 20037508.342789244);
        assert_eq!(bounds.min_y, -20037508.342789244);
        assert_eq!(bounds.max_y, 0.0);
    }

    #[test]
    fn test_horizontal_neighbours_share_edge() {
        for z in [1u32, 5, 12, 18] {
            let n = 1u32 << z;
            for x in [0, n / 3, n - 2] {
                let a = TileKey::new(z, x, n / 2).unwrap().mercator_bounds();
                let b = TileKey::new(z, x + 1, n / 2).unwrap().mercator_bounds();
                assert!((a.max_x - b.min_x).abs() < 1e-6, "gap at z={} x={}", z, x);
                assert_eq!(a.min_y, b.min_y);
                assert_eq!(a.max_y, b.max_y);
            }
        }
    }

    #[test]
    fn test_out_of_range_tiles_rejected() {
        assert!(TileKey::new(0, 1, 0).is_err());
        assert!(TileKey::new(3, 0, 8).is_err());
        assert!(TileKey::new(31, 0, 0).is_err());
        assert!(TileKey::new(3, 7, 7).is_ok());
    }

    #[test]
    fn test_extent_transform_north_up() {
        let extent = TileKey::new(2, 1, 1).unwrap().extent();
        assert_eq!(extent.width, TILE_SIZE);
        let (west, north) = extent.transform.apply(0.0, 0.0);
        assert_eq!(west, extent.bounds.min_x);
        assert_eq!(north, extent.bounds.max_y);
        let (east, south) = extent.transform.apply(256.0, 256.0);
        assert!((east - extent.bounds.max_x).abs() < 1e-6);
        assert!((south - extent.bounds.min_y).abs() < 1e-6);
    }

    #[test]
    fn test_lonlat_bounds() {
        let bounds = TileKey::new(0, 0, 0).unwrap().lonlat_bounds();
        assert_eq!(bounds.min_x, -180.0);
        assert_eq!(bounds.max_x, 180.0);
        assert!((bounds.max_y - 85.0511287798).abs() < 1e-6);
    }
}
