//! Point and line elevation sampling in WGS84 coordinates.

use projection::CrsTransform;
use serde::{Deserialize, Serialize};
use terrain_common::{CrsCode, Grid, TerrainError, TerrainResult};

/// Samples taken along each profile segment, endpoints included.
pub const SAMPLES_PER_SEGMENT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    pub lon: f64,
    pub lat: f64,
    pub elev: Option<f32>,
}

fn project(t: &CrsTransform, x: f64, y: f64) -> TerrainResult<(f64, f64)> {
    t.transform(x, y).ok_or_else(|| {
        TerrainError::ProjectionError(format!("cannot transform ({}, {}) from {} to {}", x, y, t.src(), t.dst()))
    })
}

/// Elevation of the DEM pixel containing (`lon`, `lat`); `None` outside
/// the grid or on no-data.
pub fn query_elevation(dem: &Grid, lon: f64, lat: f64) -> TerrainResult<Option<f32>> {
    let (x, y) = project(&CrsTransform::new(CrsCode::Epsg4326, dem.crs), lon, lat)?;
    Ok(dem.sample_nearest(x, y))
}

/// Elevation profile along a WGS84 polyline.
///
/// Each segment is sampled at [`SAMPLES_PER_SEGMENT`] evenly spaced points
/// in the DEM's CRS. The shared vertex between consecutive segments
/// appears once.
pub fn generate_profile(dem: &Grid, line: &[[f64; 2]]) -> TerrainResult<Vec<ProfilePoint>> {
    if line.len() < 2 {
        return Err(TerrainError::invalid_parameter("line", "a profile needs at least two vertices"));
    }
    let to_dem = CrsTransform::new(CrsCode::Epsg4326, dem.crs);
    let to_wgs84 = CrsTransform::new(dem.crs, CrsCode::Epsg4326);

    let segments = line.len() - 1;
    let mut profile = Vec::with_capacity(segments * (SAMPLES_PER_SEGMENT - 1) + 1);
    let last = SAMPLES_PER_SEGMENT - 1;

    for (i, pair) in line.windows(2).enumerate() {
        let (sx, sy) = project(&to_dem, pair[0][0], pair[0][1])?;
        let (ex, ey) = project(&to_dem, pair[1][0], pair[1][1])?;
        let (step_x, step_y) = ((ex - sx) / last as f64, (ey - sy) / last as f64);

        for j in 0..SAMPLES_PER_SEGMENT {
            if j == last && i + 1 < segments {
                continue;
            }
            let (x, y) = if j == last {
                (ex, ey)
            } else {
                (sx + step_x * j as f64, sy + step_y * j as f64)
            };
            let (lon, lat) = project(&to_wgs84, x, y)?;
            profile.push(ProfilePoint {
                lon,
                lat,
                elev: dem.sample_nearest(x, y),
            });
        }
    }
    Ok(profile)
}
