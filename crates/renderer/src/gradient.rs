//! Single-band colour-ramp rendering.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use terrain_common::Grid;

use crate::ramp::ColorRamp;

/// Width substituted for degenerate (max <= min) ranges.
pub const RANGE_EPSILON: f64 = 1e-9;

/// A display value range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Copy with `max` pushed to `min + RANGE_EPSILON` when the range is
    /// empty or inverted, so normalization never divides by zero.
    pub fn widened(&self) -> Self {
        if self.max > self.min {
            *self
        } else {
            Self::new(self.min, self.min + RANGE_EPSILON)
        }
    }

    /// `clip((v - min) / (max - min), 0, 1)` over the widened range.
    pub fn normalize(&self, value: f64) -> f64 {
        let r = self.widened();
        ((value - r.min) / (r.max - r.min)).clamp(0.0, 1.0)
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// Render grid data through a colour ramp.
///
/// Valid cells become opaque ramp colours; no-data and non-finite cells
/// become fully transparent.
///
/// # Returns
/// RGBA pixel data (4 bytes per pixel), row-major, row 0 first.
pub fn render_single_band(grid: &Grid, range: ValueRange, ramp: &ColorRamp) -> Vec<u8> {
    let mut pixels = vec![0u8; grid.width * grid.height * 4];
    pixels
        .par_chunks_mut(grid.width * 4)
        .zip(grid.data.par_chunks(grid.width))
        .for_each(|(out_row, values)| {
            for (pixel, &value) in out_row.chunks_exact_mut(4).zip(values) {
                if !grid.is_valid(value) {
                    continue;
                }
                let color = ramp.lookup(range.normalize(value as f64));
                pixel.copy_from_slice(&[color.r, color.g, color.b, 255]);
            }
        });
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widened() {
        let r = ValueRange::new(3.0, 3.0).widened();
        assert_eq!(r.min, 3.0);
        assert!(r.max > r.min);
        assert_eq!(ValueRange::new(0.0, 2.0).widened(), ValueRange::new(0.0, 2.0));
    }

    #[test]
    fn test_normalize_clips() {
        let r = ValueRange::new(10.0, 20.0);
        assert_eq!(r.normalize(5.0), 0.0);
        assert_eq!(r.normalize(15.0), 0.5);
        assert_eq!(r.normalize(25.0), 1.0);
    }

    #[test]
    fn test_degenerate_range_is_step() {
        let r = ValueRange::new(0.0, 0.0);
        assert_eq!(r.normalize(-1.0), 0.0);
        assert_eq!(r.normalize(1.0), 1.0);
    }
}
