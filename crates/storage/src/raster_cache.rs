//! Write-once cache for derived rasters (slope, aspect, hazard, ...).
//!
//! Each stored grid gets a fresh name `{prefix}_{8 hex}.tif`; names are
//! never reused, so a cached file can be read without locking once its
//! name has been handed out.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use terrain_common::{Grid, Raster, TerrainError, TerrainResult};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{check_file_name, write_via_temp};
use crate::geotiff::{read_geotiff, write_geotiff};

/// Attempts at finding an unused name before giving up.
const MAX_NAME_ATTEMPTS: usize = 8;

/// Store for analytic outputs, addressed by generated file name.
pub trait RasterCacheStore: Send + Sync {
    /// Persist `grid` and return the name it was stored under.
    fn put(&self, prefix: &str, grid: &Grid) -> TerrainResult<String>;

    /// Load a previously stored raster.
    fn get(&self, name: &str) -> TerrainResult<Raster>;

    fn exists(&self, name: &str) -> bool;
}

/// `{prefix}_{8 hex}.tif` with a random suffix.
pub fn generate_name(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}_{}.tif", prefix, &id[..8])
}

fn unused_name<S: RasterCacheStore + ?Sized>(store: &S, prefix: &str) -> TerrainResult<String> {
    check_file_name(prefix)?;
    (0..MAX_NAME_ATTEMPTS)
        .map(|_| generate_name(prefix))
        .find(|name| !store.exists(name))
        .ok_or_else(|| TerrainError::StorageError(format!("no free cache name for prefix '{}'", prefix)))
}

/// Filesystem-backed raster cache. Files are GeoTIFFs in one directory.
pub struct FsRasterCache {
    dir: PathBuf,
}

impl FsRasterCache {
    /// Open (creating if needed) a cache rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> TerrainResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!(dir = %dir.display(), "Raster cache ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> TerrainResult<PathBuf> {
        check_file_name(name)?;
        Ok(self.dir.join(name))
    }
}

impl RasterCacheStore for FsRasterCache {
    fn put(&self, prefix: &str, grid: &Grid) -> TerrainResult<String> {
        let name = unused_name(self, prefix)?;
        write_via_temp(&self.dir, &name, |tmp| write_geotiff(tmp, grid))?;

        debug!(name = %name, width = grid.width, height = grid.height, "Cached raster");
        Ok(name)
    }

    fn get(&self, name: &str) -> TerrainResult<Raster> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(TerrainError::NotFound(format!("cached raster '{}'", name)));
        }
        read_geotiff(&path)
    }

    fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }
}

/// In-memory raster cache for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryRasterCache {
    rasters: RwLock<HashMap<String, Raster>>,
}

impl MemoryRasterCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rasters.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> TerrainError {
    TerrainError::InternalError("raster cache lock poisoned".into())
}

impl RasterCacheStore for MemoryRasterCache {
    fn put(&self, prefix: &str, grid: &Grid) -> TerrainResult<String> {
        let name = unused_name(self, prefix)?;
        self.rasters
            .write()
            .map_err(poisoned)?
            .insert(name.clone(), Raster::from_grid(grid.clone()));
        Ok(name)
    }

    fn get(&self, name: &str) -> TerrainResult<Raster> {
        self.rasters
            .read()
            .map_err(poisoned)?
            .get(name)
            .cloned()
            .ok_or_else(|| TerrainError::NotFound(format!("cached raster '{}'", name)))
    }

    fn exists(&self, name: &str) -> bool {
        self.rasters.read().map(|m| m.contains_key(name)).unwrap_or(false)
    }
}
