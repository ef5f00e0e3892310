//! Interpolation methods for grid resampling.
//!
//! Coordinates are continuous pixel-corner coordinates: pixel `(c, r)`
//! covers `[c, c + 1) x [r, r + 1)` and its sample sits at its centre.

/// Fractional offsets closer than this to a sample centre snap onto it.
const SNAP_EPSILON: f64 = 1e-9;

/// Bilinear interpolation.
///
/// Weights the four samples whose centres surround (`x`, `y`). Indices are
/// clamped at the grid edges. Returns `None` when the point lies outside
/// the grid or any sample carrying non-zero weight is no-data.
pub fn bilinear_sample(data: &[f32], width: usize, height: usize, x: f64, y: f64, nodata: f32) -> Option<f32> {
    if !(x >= 0.0 && y >= 0.0 && x < width as f64 && y < height as f64) {
        return None;
    }

    let (x0, xf) = split_coordinate(x - 0.5);
    let (y0, yf) = split_coordinate(y - 0.5);

    let clamp_col = |c: i64| c.clamp(0, width as i64 - 1) as usize;
    let clamp_row = |r: i64| r.clamp(0, height as i64 - 1) as usize;

    let corners = [
        (x0, y0, (1.0 - xf) * (1.0 - yf)),
        (x0 + 1, y0, xf * (1.0 - yf)),
        (x0, y0 + 1, (1.0 - xf) * yf),
        (x0 + 1, y0 + 1, xf * yf),
    ];

    let mut acc = 0.0f64;
    for (col, row, weight) in corners {
        if weight == 0.0 {
            continue;
        }
        let value = data[clamp_row(row) * width + clamp_col(col)];
        if !value.is_finite() || value == nodata {
            return None;
        }
        acc += weight * value as f64;
    }
    Some(acc as f32)
}

/// Split a sample-space coordinate into its integer cell and fractional
/// offset, snapping offsets within [`SNAP_EPSILON`] of a sample centre.
fn split_coordinate(v: f64) -> (i64, f64) {
    let base = v.floor();
    let frac = v - base;
    if frac < SNAP_EPSILON {
        (base as i64, 0.0)
    } else if frac > 1.0 - SNAP_EPSILON {
        (base as i64 + 1, 0.0)
    } else {
        (base as i64, frac)
    }
}
