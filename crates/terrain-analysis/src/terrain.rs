//! Slope and aspect using Horn's third-order finite difference.
//!
//! ```text
//!   a b c
//!   d e f      dz/dx = ((c + 2f + i) - (a + 2d + g)) / (8 dx)
//!   g h i      dz/dy = ((g + 2h + i) - (a + 2b + c)) / (8 dy)
//! ```
//!
//! Row 0 is north, so `dz/dy` is positive when elevation rises to the
//! south. Neighbours beyond the grid edge repeat the edge cell. A cell
//! whose 3x3 window touches no-data is itself no-data.

use rayon::prelude::*;
use terrain_common::tile::EARTH_RADIUS;
use terrain_common::{Grid, TerrainResult, DEFAULT_NODATA};

/// Aspect assigned to cells with zero gradient.
pub const FLAT_ASPECT: f32 = -1.0;

/// Ground distance covered by one pixel along x and y, in metres.
///
/// Geographic grids are scaled at the latitude of the grid centre.
pub fn cell_size_metres(dem: &Grid) -> (f64, f64) {
    let (xs, ys) = dem.transform.pixel_size();
    if dem.crs.is_geographic() {
        let metres_per_degree = EARTH_RADIUS * std::f64::consts::PI / 180.0;
        let (_, lat) = dem.bounds().center();
        (xs * metres_per_degree * lat.to_radians().cos(), ys * metres_per_degree)
    } else {
        (xs, ys)
    }
}

/// Slope in degrees from horizontal.
pub fn slope_degrees(dem: &Grid) -> TerrainResult<Grid> {
    map_gradient(dem, |dzdx, dzdy| dzdx.hypot(dzdy).atan().to_degrees() as f32)
}

/// Aspect in degrees clockwise from north, facing downslope.
/// Flat cells get [`FLAT_ASPECT`].
pub fn aspect_degrees(dem: &Grid) -> TerrainResult<Grid> {
    map_gradient(dem, |dzdx, dzdy| {
        if dzdx == 0.0 && dzdy == 0.0 {
            return FLAT_ASPECT;
        }
        let angle = dzdy.atan2(-dzdx).to_degrees();
        let aspect = if angle < 0.0 {
            90.0 - angle
        } else if angle > 90.0 {
            450.0 - angle
        } else {
            90.0 - angle
        };
        aspect as f32
    })
}

/// Apply `f(dz/dx, dz/dy)` to every cell with a complete window.
fn map_gradient<F>(dem: &Grid, f: F) -> TerrainResult<Grid>
where
    F: Fn(f64, f64) -> f32 + Sync,
{
    let (w, h) = (dem.width, dem.height);
    let (dx, dy) = cell_size_metres(dem);
    let mut out = vec![DEFAULT_NODATA; w * h];

    let value = |col: isize, row: isize| -> Option<f64> {
        let c = col.clamp(0, w as isize - 1) as usize;
        let r = row.clamp(0, h as isize - 1) as usize;
        let v = dem.data[r * w + c];
        dem.is_valid(v).then_some(v as f64)
    };

    out.par_chunks_mut(w).enumerate().for_each(|(row, out_row)| {
        let r = row as isize;
        for (col, cell) in out_row.iter_mut().enumerate() {
            let c = col as isize;
            let window = (|| {
                Some([
                    [value(c - 1, r - 1)?, value(c, r - 1)?, value(c + 1, r - 1)?],
                    [value(c - 1, r)?, value(c, r)?, value(c + 1, r)?],
                    [value(c - 1, r + 1)?, value(c, r + 1)?, value(c + 1, r + 1)?],
                ])
            })();
            let Some([[a, b, cc], [d, _, ff], [g, hh, i]]) = window else {
                continue;
            };
            let dzdx = ((cc + 2.0 * ff + i) - (a + 2.0 * d + g)) / (8.0 * dx);
            let dzdy = ((g + 2.0 * hh + i) - (a + 2.0 * b + cc)) / (8.0 * dy);
            *cell = f(dzdx, dzdy);
        }
    });

    Grid::new(w, h, out, dem.transform, dem.crs, DEFAULT_NODATA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrain_common::{CrsCode, GeoTransform};

    /// 5x5 projected grid with 10 m cells and `z(col, row)`.
    fn plane(z: impl Fn(usize, usize) -> f32) -> Grid {
        let data = (0..25).map(|i| z(i % 5, i / 5)).collect();
        Grid::new(
            5,
            5,
            data,
            GeoTransform::from_origin(500000.0, 4000000.0, 10.0, 10.0),
            CrsCode::Utm { zone: 33, north: true },
            -9999.0,
        )
        .unwrap()
    }

    #[test]
    fn test_slope_of_inclined_plane() {
        // 10 m rise per 10 m cell: 45 degrees
        let slope = slope_degrees(&plane(|c, _| c as f32 * 10.0)).unwrap();
        assert!((slope.get(2, 2).unwrap() - 45.0).abs() < 1e-4);
    }

    #[test]
    fn test_flat_plane() {
        let dem = plane(|_, _| 100.0);
        assert_eq!(slope_degrees(&dem).unwrap().get(2, 2), Some(0.0));
        assert_eq!(aspect_degrees(&dem).unwrap().get(2, 2), Some(FLAT_ASPECT));
    }

    #[test]
    fn test_aspect_faces_downhill() {
        // Rising east: faces west
        let east = aspect_degrees(&plane(|c, _| c as f32)).unwrap();
        assert!((east.get(2, 2).unwrap() - 270.0).abs() < 1e-4);
        // Rising south: faces north
        let south = aspect_degrees(&plane(|_, r| r as f32)).unwrap();
        assert!(south.get(2, 2).unwrap().abs() < 1e-4);
        // Rising north: faces south
        let north = aspect_degrees(&plane(|_, r| 10.0 - r as f32)).unwrap();
        assert!((north.get(2, 2).unwrap() - 180.0).abs() < 1e-4);
        // Rising west: faces east
        let west = aspect_degrees(&plane(|c, _| 10.0 - c as f32)).unwrap();
        assert!((west.get(2, 2).unwrap() - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_nodata_spreads_to_neighbours() {
        let dem = plane(|c, r| if (c, r) == (2, 2) { -9999.0 } else { 1.0 });
        let slope = slope_degrees(&dem).unwrap();
        for (c, r) in [(1, 1), (2, 2), (3, 3), (1, 3)] {
            assert_eq!(slope.get(c, r), Some(-9999.0));
        }
        assert_eq!(slope.get(0, 0), Some(0.0));
    }

    #[test]
    fn test_geographic_cell_size() {
        let dem = Grid::filled(
            2,
            2,
            0.0,
            GeoTransform::from_bounds(-1.0, -1.0, 1.0, 1.0, 2, 2),
            CrsCode::Epsg4326,
            -9999.0,
        )
        .unwrap();
        let (dx, dy) = cell_size_metres(&dem);
        assert!((dx - 111_319.49).abs() < 0.01);
        assert!((dy - 111_319.49).abs() < 0.01);
    }
}
