//! Storage abstractions for the terrain tile services.
//!
//! Provides:
//! - GeoTIFF reading and writing for source and derived rasters
//! - A write-once raster cache for analytic outputs
//! - A buffer and metadata store for pre-processed point clouds
//!
//! Both caches are traits with filesystem and in-memory implementations
//! so components can be exercised without touching disk.

pub mod geotiff;
pub mod pointcloud_cache;
pub mod raster_cache;

pub use geotiff::{read_geotiff, write_geotiff};
pub use pointcloud_cache::{FsPointCloudCache, MemoryPointCloudCache, PointCloudCacheStore};
pub use raster_cache::{FsRasterCache, MemoryRasterCache, RasterCacheStore};

use std::fs;
use std::path::Path;

use terrain_common::{TerrainError, TerrainResult};
use uuid::Uuid;

/// Reject names that could escape their directory.
pub fn check_file_name(name: &str) -> TerrainResult<()> {
    let bad = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.contains("..");
    if bad {
        return Err(TerrainError::invalid_parameter("filename", format!("invalid file name '{}'", name)));
    }
    Ok(())
}

/// Write `dir/name` through a hidden per-writer temporary file and an
/// atomic rename. Concurrent writers of the same name never share a temp
/// file; the last rename wins and readers only ever see complete files.
pub(crate) fn write_via_temp<F>(dir: &Path, name: &str, write: F) -> TerrainResult<()>
where
    F: FnOnce(&Path) -> TerrainResult<()>,
{
    check_file_name(name)?;
    let tmp = dir.join(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()));
    if let Err(e) = write(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, dir.join(name)) {
        let _ = fs::remove_file(&tmp);
        return Err(TerrainError::StorageError(format!("cannot publish '{}': {}", name, e)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_file_name() {
        assert!(check_file_name("dem_bangalore.tif").is_ok());
        assert!(check_file_name("slope_1a2b3c4d.tif").is_ok());
        assert!(check_file_name("").is_err());
        assert!(check_file_name("../etc/passwd").is_err());
        assert!(check_file_name("a/b.tif").is_err());
        assert!(check_file_name(".hidden").is_err());
    }

    #[test]
    fn test_write_via_temp_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        write_via_temp(dir.path(), "a.bin", |tmp| Ok(fs::write(tmp, b"abc")?)).unwrap();
        let failed = write_via_temp(dir.path(), "b.bin", |tmp| {
            fs::write(tmp, b"partial")?;
            Err(TerrainError::Processing("boom".into()))
        });
        assert!(failed.is_err());

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["a.bin".to_string()]);
    }
}
