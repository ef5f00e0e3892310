//! Point collection sources.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use las::{Reader, Vlr};
use terrain_common::{BoundingBox, CrsCode};
use tracing::debug;

use crate::error::{PointCloudError, Result};

/// A fully loaded point collection.
///
/// Optional attribute arrays, when present, have one entry per position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCollection {
    pub positions: Vec<[f64; 3]>,
    /// 16-bit RGB as stored in LAS.
    pub colors: Option<Vec<[u16; 3]>>,
    /// ASPRS class codes.
    pub classifications: Option<Vec<u8>>,
}

impl PointCollection {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Check that every attribute array matches the position count.
    pub fn validate(&self) -> Result<()> {
        let n = self.positions.len();
        if let Some(colors) = &self.colors {
            if colors.len() != n {
                return Err(PointCloudError::Inconsistent(format!("{} colours for {} points", colors.len(), n)));
            }
        }
        if let Some(classes) = &self.classifications {
            if classes.len() != n {
                return Err(PointCloudError::Inconsistent(format!(
                    "{} classifications for {} points",
                    classes.len(),
                    n
                )));
            }
        }
        Ok(())
    }
}

/// VLR carrying the GeoTIFF GeoKeyDirectory of a LAS file.
const PROJECTION_USER_ID: &str = "LASF_Projection";
const GEOKEY_DIRECTORY_RECORD: u16 = 34735;

/// Horizontal extent of a LAS/LAZ file, taken from its header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LasExtent {
    pub bounds: BoundingBox,
    pub crs: CrsCode,
}

/// Something that can load a named point collection.
pub trait PointSource: Send + Sync {
    fn read(&self, name: &str) -> Result<PointCollection>;
}

/// Reads `.las` / `.laz` files from a directory.
pub struct LasPointSource {
    dir: PathBuf,
}

impl LasPointSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LasPointSource {
    /// Header bounds and GeoKey CRS of `name`, without reading any points.
    pub fn extent(&self, name: &str) -> Result<LasExtent> {
        storage::check_file_name(name)?;
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(PointCloudError::NotFound(name.to_string()));
        }
        let file = File::open(&path).map_err(|e| PointCloudError::Read {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        let reader = Reader::new(BufReader::new(file)).map_err(|e| PointCloudError::Read {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        let header = reader.header();
        let directory = header
            .vlrs()
            .iter()
            .chain(header.evlrs())
            .find(|vlr| vlr.user_id == PROJECTION_USER_ID && vlr.record_id == GEOKEY_DIRECTORY_RECORD)
            .map(geokey_directory)
            .ok_or_else(|| PointCloudError::Crs(format!("'{}' has no GeoKeyDirectory record", name)))?;
        let crs = CrsCode::from_geokeys(&directory).map_err(|e| PointCloudError::Crs(format!("'{}': {}", name, e)))?;

        let b = header.bounds();
        Ok(LasExtent {
            bounds: BoundingBox::new(b.min.x, b.min.y, b.max.x, b.max.y),
            crs,
        })
    }
}

/// Little-endian u16 words of a GeoKeyDirectory record.
fn geokey_directory(vlr: &Vlr) -> Vec<u16> {
    vlr.data
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

impl PointSource for LasPointSource {
    fn read(&self, name: &str) -> Result<PointCollection> {
        storage::check_file_name(name)?;
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(PointCloudError::NotFound(name.to_string()));
        }
        let read_err = |message: String| PointCloudError::Read {
            name: name.to_string(),
            message,
        };

        let file = File::open(&path).map_err(|e| read_err(e.to_string()))?;
        let mut reader = Reader::new(BufReader::new(file)).map_err(|e| read_err(e.to_string()))?;

        let has_color = reader.header().point_format().has_color;
        let expected = reader.header().number_of_points() as usize;
        let mut collection = PointCollection {
            positions: Vec::with_capacity(expected),
            colors: has_color.then(|| Vec::with_capacity(expected)),
            classifications: Some(Vec::with_capacity(expected)),
        };

        for point in reader.points() {
            let point = point.map_err(|e| read_err(e.to_string()))?;
            collection.positions.push([point.x, point.y, point.z]);
            if let Some(colors) = collection.colors.as_mut() {
                colors.push(point.color.map(|c| [c.red, c.green, c.blue]).unwrap_or([0; 3]));
            }
            if let Some(classes) = collection.classifications.as_mut() {
                classes.push(u8::from(point.classification));
            }
        }

        debug!(
            file = %name,
            points = collection.len(),
            has_color,
            "Read point cloud"
        );
        Ok(collection)
    }
}
