//! Georeferenced raster grids.

use crate::{BoundingBox, CrsCode, TerrainError, TerrainResult};
use serde::{Deserialize, Serialize};

/// Sentinel used when a source raster declares no usable no-data value.
pub const DEFAULT_NODATA: f32 = -9999.0;

/// Affine pixel-to-map transform.
///
/// Maps a (col, row) pixel-corner coordinate to map space:
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
///
/// For north-up rasters `b == d == 0` and `e` is negative, so row 0 is the
/// north edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform with the top-left corner at (`west`, `north`).
    pub fn from_origin(west: f64, north: f64, x_size: f64, y_size: f64) -> Self {
        Self::new(x_size, 0.0, west, 0.0, -y_size, north)
    }

    /// North-up transform stretching `width` x `height` pixels uniformly
    /// across the given bounds.
    pub fn from_bounds(west: f64, south: f64, east: f64, north: f64, width: usize, height: usize) -> Self {
        Self::from_origin(
            west,
            north,
            (east - west) / width as f64,
            (north - south) / height as f64,
        )
    }

    /// Map a pixel coordinate (col, row) to map coordinates.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// Inverse transform (map -> pixel), or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<GeoTransform> {
        let det = self.a * self.e - self.b * self.d;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let ia = self.e / det;
        let ib = -self.b / det;
        let id = -self.d / det;
        let ie = self.a / det;
        Some(GeoTransform::new(
            ia,
            ib,
            -(ia * self.c + ib * self.f),
            id,
            ie,
            -(id * self.c + ie * self.f),
        ))
    }

    /// Map-space envelope of a `width` x `height` raster.
    pub fn bounds(&self, width: usize, height: usize) -> BoundingBox {
        let (w, h) = (width as f64, height as f64);
        let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];
        let mut bbox = BoundingBox::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for (col, row) in corners {
            let (x, y) = self.apply(col, row);
            bbox.min_x = bbox.min_x.min(x);
            bbox.min_y = bbox.min_y.min(y);
            bbox.max_x = bbox.max_x.max(x);
            bbox.max_y = bbox.max_y.max(y);
        }
        bbox
    }

    /// Approximate pixel size in map units along each axis.
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.a.hypot(self.d), self.b.hypot(self.e))
    }
}

/// A single band of float32 samples with georeferencing.
///
/// Every cell holds either a finite sample or exactly `nodata`; NaN is
/// folded into the sentinel on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
    pub transform: GeoTransform,
    pub crs: CrsCode,
    pub nodata: f32,
}

impl Grid {
    pub fn new(
        width: usize,
        height: usize,
        mut data: Vec<f32>,
        transform: GeoTransform,
        crs: CrsCode,
        nodata: f32,
    ) -> TerrainResult<Self> {
        if width == 0 || height == 0 {
            return Err(TerrainError::invalid_parameter(
                "dimensions",
                format!("grid must be non-empty, got {}x{}", width, height),
            ));
        }
        if data.len() != width * height {
            return Err(TerrainError::invalid_parameter(
                "data",
                format!("expected {} samples for {}x{}, got {}", width * height, width, height, data.len()),
            ));
        }
        if !nodata.is_finite() {
            return Err(TerrainError::invalid_parameter("nodata", "no-data sentinel must be finite"));
        }
        normalize_nodata(&mut data, nodata);
        Ok(Self {
            width,
            height,
            data,
            transform,
            crs,
            nodata,
        })
    }

    /// Grid with every cell set to `value`.
    pub fn filled(
        width: usize,
        height: usize,
        value: f32,
        transform: GeoTransform,
        crs: CrsCode,
        nodata: f32,
    ) -> TerrainResult<Self> {
        Self::new(width, height, vec![value; width * height], transform, crs, nodata)
    }

    /// True when `value` is a usable sample for this grid.
    pub fn is_valid(&self, value: f32) -> bool {
        value.is_finite() && value != self.nodata
    }

    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        Some(self.data[row * self.width + col])
    }

    /// Iterator over the valid samples, skipping no-data.
    pub fn valid_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied().filter(move |v| self.is_valid(*v))
    }

    /// (min, max) over valid samples.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.valid_values().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    pub fn bounds(&self) -> BoundingBox {
        self.transform.bounds(self.width, self.height)
    }

    /// Value of the pixel containing map point (`x`, `y`), `None` outside
    /// the grid or on no-data.
    pub fn sample_nearest(&self, x: f64, y: f64) -> Option<f32> {
        let inverse = self.transform.invert()?;
        let (col, row) = inverse.apply(x, y);
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let value = self.get(col.floor() as usize, row.floor() as usize)?;
        self.is_valid(value).then_some(value)
    }
}

/// Replace every non-finite sample with `nodata`.
pub fn normalize_nodata(data: &mut [f32], nodata: f32) {
    for v in data.iter_mut() {
        if !v.is_finite() {
            *v = nodata;
        }
    }
}

/// A multi-band raster as read from disk. Bands share one transform, CRS
/// and no-data sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
    pub crs: CrsCode,
    pub nodata: f32,
    pub bands: Vec<Vec<f32>>,
}

impl Raster {
    pub fn from_grid(grid: Grid) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
            transform: grid.transform,
            crs: grid.crs,
            nodata: grid.nodata,
            bands: vec![grid.data],
        }
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    /// Band `index` as a standalone grid. Indices are 1-based.
    pub fn band(&self, index: usize) -> TerrainResult<Grid> {
        if index == 0 || index > self.bands.len() {
            return Err(TerrainError::invalid_parameter(
                "band",
                format!("band {} out of range 1..={}", index, self.bands.len()),
            ));
        }
        Grid::new(
            self.width,
            self.height,
            self.bands[index - 1].clone(),
            self.transform,
            self.crs,
            self.nodata,
        )
    }

    pub fn bounds(&self) -> BoundingBox {
        self.transform.bounds(self.width, self.height)
    }
}
