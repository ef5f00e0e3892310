//! Three-band false-colour composites.

use terrain_common::Grid;

use crate::error::{RenderError, Result};
use crate::gradient::ValueRange;

/// Stretch three co-registered bands into an opaque RGB image.
///
/// Each band is linearly stretched from its own range onto [0, 255],
/// clipped and truncated to a byte. Pixels are opaque everywhere: no-data
/// cells are stretched like any other value, and non-finite values become 0.
///
/// # Returns
/// RGB pixel data (3 bytes per pixel).
pub fn render_composite(bands: [&Grid; 3], ranges: [ValueRange; 3]) -> Result<Vec<u8>> {
    let (width, height) = (bands[0].width, bands[0].height);
    if bands.iter().any(|b| b.width != width || b.height != height) {
        return Err(RenderError::InvalidInput("composite bands differ in size".into()));
    }

    let ranges = ranges.map(|r| r.widened());
    let mut pixels = vec![0u8; width * height * 3];
    for (channel, (band, range)) in bands.iter().zip(ranges.iter()).enumerate() {
        let span = range.max - range.min;
        for (i, &value) in band.data.iter().enumerate() {
            if !value.is_finite() {
                continue;
            }
            let stretched = ((value as f64 - range.min) / span * 255.0).clamp(0.0, 255.0);
            pixels[i * 3 + channel] = stretched as u8;
        }
    }
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrain_common::{CrsCode, GeoTransform};

    fn grid(data: Vec<f32>) -> Grid {
        let transform = GeoTransform::from_origin(0.0, 2.0, 1.0, 1.0);
        Grid::new(2, 1, data, transform, CrsCode::Epsg4326, -9999.0).unwrap()
    }

    #[test]
    fn test_stretch_and_clip() {
        let r = grid(vec![0.0, 10.0]);
        let g = grid(vec![5.0, 20.0]);
        let b = grid(vec![-9999.0, 2.5]);
        let range = ValueRange::new(0.0, 10.0);
        let pixels = render_composite([&r, &g, &b], [range; 3]).unwrap();
        assert_eq!(pixels, vec![0, 127, 0, 255, 255, 63]);
    }

    #[test]
    fn test_zero_range_does_not_divide_by_zero() {
        let band = grid(vec![0.0, 1.0]);
        let pixels = render_composite([&band, &band, &band], [ValueRange::new(0.0, 0.0); 3]).unwrap();
        assert_eq!(pixels, vec![0, 0, 0, 255, 255, 255]);
    }

    #[test]
    fn test_size_mismatch() {
        let a = grid(vec![0.0, 1.0]);
        let transform = GeoTransform::from_origin(0.0, 1.0, 1.0, 1.0);
        let b = Grid::new(1, 1, vec![0.0], transform, CrsCode::Epsg4326, -9999.0).unwrap();
        assert!(render_composite([&a, &b, &a], [ValueRange::default(); 3]).is_err());
    }
}
