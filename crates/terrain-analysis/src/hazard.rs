//! Rainfall-weighted landslide susceptibility.

use terrain_common::{Grid, TerrainError, TerrainResult, DEFAULT_NODATA};

use crate::terrain::slope_degrees;

/// Rainfall at which the rainfall term saturates.
pub const RAINFALL_SATURATION_MM: f64 = 150.0;

/// Default rainfall when a request omits it.
pub const DEFAULT_RAINFALL_MM: f64 = 50.0;

/// `0.5 * clip(slope / 90, 0, 1) + 0.5 * clip(rainfall / 150, 0, 1)`.
///
/// Output lies in [0, 1]; cells without a slope are [`DEFAULT_NODATA`].
pub fn landslide_hazard(dem: &Grid, rainfall_mm: f64) -> TerrainResult<Grid> {
    if !rainfall_mm.is_finite() {
        return Err(TerrainError::invalid_parameter("rainfall_mm", "must be a finite number"));
    }
    let slope = slope_degrees(dem)?;
    let rain_term = 0.5 * (rainfall_mm / RAINFALL_SATURATION_MM).clamp(0.0, 1.0);

    let data = slope
        .data
        .iter()
        .map(|&s| {
            if slope.is_valid(s) {
                (0.5 * (s as f64 / 90.0).clamp(0.0, 1.0) + rain_term) as f32
            } else {
                DEFAULT_NODATA
            }
        })
        .collect();

    Grid::new(dem.width, dem.height, data, dem.transform, dem.crs, DEFAULT_NODATA)
}
