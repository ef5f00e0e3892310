//! Terrain-RGB elevation encoding.
//!
//! Elevation `e` (meters) is stored as the 24-bit integer
//! `floor((e + 10000) * 10)` split big-endian across R, G and B, giving
//! 0.1 m steps. Decoders recover it as
//! `(R * 65536 + G * 256 + B) / 10 - 10000`.

use terrain_common::Grid;

pub const ELEVATION_OFFSET: f64 = 10000.0;
pub const ELEVATION_SCALE: f64 = 10.0;

/// Largest value the three bytes can hold.
const MAX_ENCODED: f64 = 16_777_215.0;

/// Added before flooring so f32 inputs that sit a representation error
/// below a 0.1 m step (e.g. `-9999.9f32`) land on that step.
const FLOOR_TOLERANCE: f64 = 0.01;

/// Encode one elevation, truncating to the 0.1 m step below. No-data and
/// non-finite values encode as 0 m; values beyond the 24-bit domain
/// saturate at its ends.
pub fn encode_elevation(elevation: f32, nodata: f32) -> [u8; 3] {
    let e = if elevation.is_finite() && elevation != nodata {
        elevation as f64
    } else {
        0.0
    };
    let encoded = ((e + ELEVATION_OFFSET) * ELEVATION_SCALE + FLOOR_TOLERANCE)
        .floor()
        .clamp(0.0, MAX_ENCODED) as u32;
    [(encoded >> 16) as u8, (encoded >> 8 & 0xff) as u8, (encoded & 0xff) as u8]
}

/// Invert [`encode_elevation`].
pub fn decode_elevation(rgb: [u8; 3]) -> f64 {
    let encoded = (rgb[0] as u32) << 16 | (rgb[1] as u32) << 8 | rgb[2] as u32;
    encoded as f64 / ELEVATION_SCALE - ELEVATION_OFFSET
}

/// Encode a whole grid as interleaved RGB bytes.
pub fn encode_terrain_rgb(grid: &Grid) -> Vec<u8> {
    grid.data
        .iter()
        .flat_map(|&e| encode_elevation(e, grid.nodata))
        .collect()
}
