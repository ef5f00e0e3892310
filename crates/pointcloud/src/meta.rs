//! Metadata document persisted alongside the point buffers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use storage::pointcloud_cache::{classification_file_name, color_file_name, positions_file_name};

/// A per-point colour buffer the client can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorAttribute {
    Rgb,
    Classification,
    Elevation,
}

impl ColorAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorAttribute::Rgb => "rgb",
            ColorAttribute::Classification => "classification",
            ColorAttribute::Elevation => "elevation",
        }
    }
}

/// Axis-aligned 3D bounds in source coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointCloudBounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl PointCloudBounds {
    /// Bounds of `positions`, `None` when empty.
    pub fn from_positions(positions: &[[f64; 3]]) -> Option<Self> {
        let first = *positions.first()?;
        Some(positions.iter().fold(Self { min: first, max: first }, |mut acc, p| {
            for axis in 0..3 {
                acc.min[axis] = acc.min[axis].min(p[axis]);
                acc.max[axis] = acc.max[axis].max(p[axis]);
            }
            acc
        }))
    }

    pub fn center(&self) -> [f64; 3] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }
}

/// Buffer file names, relative to the cache directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferFiles {
    pub positions: String,
    pub colors: BTreeMap<ColorAttribute, String>,
    pub classification_raw: Option<String>,
}

/// Descriptor returned by the metadata endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloudMeta {
    pub point_count: usize,
    pub bbox: PointCloudBounds,
    pub color_attributes: Vec<ColorAttribute>,
    pub classification_available: bool,
    pub files: BufferFiles,
}

impl PointCloudMeta {
    /// Build the descriptor with file names derived from `base`.
    pub fn new(
        base: &str,
        point_count: usize,
        bbox: PointCloudBounds,
        color_attributes: Vec<ColorAttribute>,
        classification_available: bool,
    ) -> Self {
        let colors = color_attributes
            .iter()
            .map(|attr| (*attr, color_file_name(base, attr.as_str())))
            .collect();
        Self {
            point_count,
            bbox,
            classification_available,
            files: BufferFiles {
                positions: positions_file_name(base),
                colors,
                classification_raw: classification_available.then(|| classification_file_name(base)),
            },
            color_attributes,
        }
    }
}
