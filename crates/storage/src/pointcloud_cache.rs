//! Buffer and metadata store for pre-processed point clouds.
//!
//! A point cloud with base name `b` is stored as:
//!
//! | File                         | Contents                          |
//! |------------------------------|-----------------------------------|
//! | `b.json`                     | metadata document                 |
//! | `b_positions.bin`            | f32 xyz triples, little-endian     |
//! | `b_color_{attr}.bin`         | f32 rgb triples in [0, 1]          |
//! | `b_classification_raw.bin`   | u8 class codes                     |
//!
//! Metadata is written last, so its presence marks a complete entry.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use terrain_common::{TerrainError, TerrainResult};
use tracing::debug;

use crate::{check_file_name, write_via_temp};

pub fn meta_file_name(base: &str) -> String {
    format!("{}.json", base)
}

pub fn positions_file_name(base: &str) -> String {
    format!("{}_positions.bin", base)
}

pub fn color_file_name(base: &str, attribute: &str) -> String {
    format!("{}_color_{}.bin", base, attribute)
}

pub fn classification_file_name(base: &str) -> String {
    format!("{}_classification_raw.bin", base)
}

/// Store for point-cloud buffers and their metadata document.
pub trait PointCloudCacheStore: Send + Sync {
    /// Metadata bytes for `base`, or `None` if it was never completed.
    fn get_meta(&self, base: &str) -> TerrainResult<Option<Vec<u8>>>;

    fn put_meta(&self, base: &str, bytes: &[u8]) -> TerrainResult<()>;

    fn put_buffer(&self, name: &str, bytes: &[u8]) -> TerrainResult<()>;

    /// Raw buffer bytes; `NotFound` when absent.
    fn get_buffer(&self, name: &str) -> TerrainResult<Vec<u8>>;
}

/// Filesystem-backed point-cloud cache.
pub struct FsPointCloudCache {
    dir: PathBuf,
}

impl FsPointCloudCache {
    pub fn new(dir: impl Into<PathBuf>) -> TerrainResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_atomic(&self, name: &str, bytes: &[u8]) -> TerrainResult<()> {
        write_via_temp(&self.dir, name, |tmp| Ok(fs::write(tmp, bytes)?))?;
        debug!(name = %name, size = bytes.len(), "Wrote point cloud file");
        Ok(())
    }

    fn read(&self, name: &str) -> TerrainResult<Vec<u8>> {
        check_file_name(name)?;
        Ok(fs::read(self.dir.join(name))?)
    }
}

impl PointCloudCacheStore for FsPointCloudCache {
    fn get_meta(&self, base: &str) -> TerrainResult<Option<Vec<u8>>> {
        match self.read(&meta_file_name(base)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn put_meta(&self, base: &str, bytes: &[u8]) -> TerrainResult<()> {
        self.write_atomic(&meta_file_name(base), bytes)
    }

    fn put_buffer(&self, name: &str, bytes: &[u8]) -> TerrainResult<()> {
        self.write_atomic(name, bytes)
    }

    fn get_buffer(&self, name: &str) -> TerrainResult<Vec<u8>> {
        self.read(name)
    }
}

/// In-memory point-cloud cache.
#[derive(Default)]
pub struct MemoryPointCloudCache {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryPointCloudCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every stored file, sorted.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .files
            .read()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    fn insert(&self, name: String, bytes: &[u8]) -> TerrainResult<()> {
        check_file_name(&name)?;
        self.files
            .write()
            .map_err(|_| TerrainError::InternalError("point cloud cache lock poisoned".into()))?
            .insert(name, bytes.to_vec());
        Ok(())
    }

    fn lookup(&self, name: &str) -> TerrainResult<Option<Vec<u8>>> {
        Ok(self
            .files
            .read()
            .map_err(|_| TerrainError::InternalError("point cloud cache lock poisoned".into()))?
            .get(name)
            .cloned())
    }
}

impl PointCloudCacheStore for MemoryPointCloudCache {
    fn get_meta(&self, base: &str) -> TerrainResult<Option<Vec<u8>>> {
        self.lookup(&meta_file_name(base))
    }

    fn put_meta(&self, base: &str, bytes: &[u8]) -> TerrainResult<()> {
        self.insert(meta_file_name(base), bytes)
    }

    fn put_buffer(&self, name: &str, bytes: &[u8]) -> TerrainResult<()> {
        self.insert(name.to_string(), bytes)
    }

    fn get_buffer(&self, name: &str) -> TerrainResult<Vec<u8>> {
        self.lookup(name)?
            .ok_or_else(|| TerrainError::NotFound(format!("point cloud buffer '{}'", name)))
    }
}
