//! One-time conversion of a point collection into cached buffers.

use std::path::Path;
use std::sync::Arc;

use renderer::{named_ramp, ValueRange};
use storage::pointcloud_cache::{classification_file_name, color_file_name, positions_file_name};
use storage::PointCloudCacheStore;
use tracing::{debug, info};

use crate::classification::class_color_unit;
use crate::error::{PointCloudError, Result};
use crate::meta::{ColorAttribute, PointCloudBounds, PointCloudMeta};
use crate::source::{PointCollection, PointSource};

/// Ramp used for the elevation colour buffer.
pub const ELEVATION_RAMP: &str = "viridis";

/// Converts point collections into flat buffers, once per base name.
///
/// Concurrent first requests for the same file may both do the work;
/// the outputs are identical, so the last metadata write wins harmlessly.
pub struct PointCloudPreprocessor {
    source: Arc<dyn PointSource>,
    cache: Arc<dyn PointCloudCacheStore>,
}

impl PointCloudPreprocessor {
    pub fn new(source: Arc<dyn PointSource>, cache: Arc<dyn PointCloudCacheStore>) -> Self {
        Self { source, cache }
    }

    /// Cache key for a source file: its name without extension.
    pub fn base_name(filename: &str) -> Result<String> {
        storage::check_file_name(filename)?;
        Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| PointCloudError::NotFound(filename.to_string()))
    }

    /// Return the metadata for `filename`, processing the source on the
    /// first call only.
    pub fn preprocess(&self, filename: &str) -> Result<PointCloudMeta> {
        let base = Self::base_name(filename)?;

        if let Some(bytes) = self.cache.get_meta(&base)? {
            debug!(file = %filename, "Point cloud metadata cache hit");
            return Ok(serde_json::from_slice(&bytes)?);
        }

        info!(file = %filename, "Pre-processing point cloud for the first time");
        let collection = self.source.read(filename)?;
        collection.validate()?;
        let meta = self.write_buffers(&base, &collection)?;

        // Metadata last: its presence is the cache-hit signal
        self.cache.put_meta(&base, &serde_json::to_vec(&meta)?)?;
        info!(
            file = %filename,
            points = meta.point_count,
            attributes = ?meta.color_attributes,
            "Point cloud pre-processed"
        );
        Ok(meta)
    }

    fn write_buffers(&self, base: &str, points: &PointCollection) -> Result<PointCloudMeta> {
        let bbox = PointCloudBounds::from_positions(&points.positions)
            .ok_or_else(|| PointCloudError::Empty(base.to_string()))?;
        let [cx, cy, cz] = bbox.center();

        let positions = f32_buffer(
            points
                .positions
                .iter()
                .map(|p| [(p[0] - cx) as f32, (p[1] - cy) as f32, (p[2] - cz) as f32]),
        );
        self.cache.put_buffer(&positions_file_name(base), &positions)?;

        let mut attributes = Vec::new();

        if let Some(colors) = &points.colors {
            let rgb = f32_buffer(colors.iter().map(|c| {
                [
                    c[0] as f32 / u16::MAX as f32,
                    c[1] as f32 / u16::MAX as f32,
                    c[2] as f32 / u16::MAX as f32,
                ]
            }));
            self.put_color(base, ColorAttribute::Rgb, &rgb)?;
            attributes.push(ColorAttribute::Rgb);
        }

        let classification_available = points.classifications.is_some();
        if let Some(classes) = &points.classifications {
            let colors = f32_buffer(classes.iter().map(|&code| class_color_unit(code)));
            self.put_color(base, ColorAttribute::Classification, &colors)?;
            self.cache.put_buffer(&classification_file_name(base), classes)?;
            attributes.push(ColorAttribute::Classification);
        }

        let elevation = self.elevation_colors(points, &bbox)?;
        self.put_color(base, ColorAttribute::Elevation, &elevation)?;
        attributes.push(ColorAttribute::Elevation);

        Ok(PointCloudMeta::new(
            base,
            points.len(),
            bbox,
            attributes,
            classification_available,
        ))
    }

    /// Z normalized over its own range through [`ELEVATION_RAMP`].
    fn elevation_colors(&self, points: &PointCollection, bbox: &PointCloudBounds) -> Result<Vec<u8>> {
        let range = ValueRange::new(bbox.min[2], bbox.max[2]);
        let ramp = named_ramp(ELEVATION_RAMP, range)?;
        Ok(f32_buffer(points.positions.iter().map(|p| {
            let c = ramp.lookup(range.normalize(p[2]));
            [c.r as f32 / 255.0, c.g as f32 / 255.0, c.b as f32 / 255.0]
        })))
    }

    fn put_color(&self, base: &str, attribute: ColorAttribute, bytes: &[u8]) -> Result<()> {
        self.cache.put_buffer(&color_file_name(base, attribute.as_str()), bytes)?;
        Ok(())
    }
}

/// Flatten f32 triples into little-endian bytes.
fn f32_buffer<I>(triples: I) -> Vec<u8>
where
    I: Iterator<Item = [f32; 3]>,
{
    triples.flatten().flat_map(f32::to_le_bytes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(PointCloudPreprocessor::base_name("site.laz").unwrap(), "site");
        assert_eq!(PointCloudPreprocessor::base_name("a.b.las").unwrap(), "a.b");
        assert!(PointCloudPreprocessor::base_name("../x.las").is_err());
    }

    #[test]
    fn test_f32_buffer_little_endian() {
        let bytes = f32_buffer([[1.0f32, 0.0, -2.0]].into_iter());
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[8..12], &(-2.0f32).to_le_bytes());
    }
}
