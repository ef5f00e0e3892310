//! Reprojection of a source grid onto a destination transform and CRS.

use projection::CrsTransform;
use rayon::prelude::*;
use terrain_common::{CrsCode, GeoTransform, Grid, TileExtent};
use tracing::debug;

use super::interpolation::bilinear_sample;
use crate::error::{GridProcessorError, Result};

/// Resample `src` onto a `width` x `height` grid described by
/// `dst_transform` in `dst_crs`.
///
/// Each destination pixel centre is carried through the destination
/// affine, the CRS chain `dst_crs -> src.crs` and the inverse source
/// affine, then sampled bilinearly. Cells that land outside the source,
/// or whose interpolation window touches source no-data, are set to
/// `nodata`.
pub fn reproject(
    src: &Grid,
    dst_transform: &GeoTransform,
    dst_crs: CrsCode,
    width: usize,
    height: usize,
    nodata: f32,
) -> Result<Grid> {
    if width == 0 || height == 0 {
        return Err(GridProcessorError::InvalidDimensions { width, height });
    }
    let src_inverse = src
        .transform
        .invert()
        .ok_or_else(|| GridProcessorError::SingularTransform(format!("{:?}", src.transform)))?;
    let to_source = CrsTransform::new(dst_crs, src.crs);

    let mut output = vec![nodata; width * height];
    output.par_chunks_mut(width).enumerate().for_each(|(row, line)| {
        for (col, cell) in line.iter_mut().enumerate() {
            let (x, y) = dst_transform.apply(col as f64 + 0.5, row as f64 + 0.5);
            let Some((sx, sy)) = to_source.transform(x, y) else {
                continue;
            };
            let (px, py) = src_inverse.apply(sx, sy);
            if let Some(v) = bilinear_sample(&src.data, src.width, src.height, px, py, src.nodata) {
                *cell = v;
            }
        }
    });

    debug!(
        src_crs = %src.crs,
        dst_crs = %dst_crs,
        src_width = src.width,
        src_height = src.height,
        width,
        height,
        "Reprojected grid"
    );

    Ok(Grid::new(width, height, output, *dst_transform, dst_crs, nodata)?)
}

/// Resample `src` onto a tile extent, keeping the source no-data value.
pub fn reproject_to_tile(src: &Grid, extent: &TileExtent) -> Result<Grid> {
    reproject(src, &extent.transform, extent.crs, extent.width, extent.height, src.nodata)
}
