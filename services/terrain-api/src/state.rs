//! Application state and shared resources.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use pointcloud::{LasPointSource, PointCloudPreprocessor, PointSource};
use storage::{check_file_name, read_geotiff, FsPointCloudCache, FsRasterCache, PointCloudCacheStore, RasterCacheStore};
use terrain_common::{Raster, TerrainError, TerrainResult};

use crate::config::ServerConfig;

/// Where a named raster layer lives.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerSource {
    /// Analytic output in the raster cache.
    Cache(String),
    /// Source file on disk.
    File(PathBuf),
}

/// Shared application state. Holds no mutable data of its own; the
/// caches are the only shared resource.
pub struct AppState {
    pub config: ServerConfig,
    pub raster_cache: Arc<dyn RasterCacheStore>,
    pub pointcloud_cache: Arc<dyn PointCloudCacheStore>,
    pub pointclouds: PointCloudPreprocessor,
}

impl AppState {
    /// Filesystem-backed state. Both caches share the cache directory.
    pub fn new(config: ServerConfig) -> Result<Self> {
        let raster_cache = Arc::new(FsRasterCache::new(&config.cache_dir)?);
        let pointcloud_cache = Arc::new(FsPointCloudCache::new(&config.cache_dir)?);
        let source = Arc::new(LasPointSource::new(&config.pointcloud_dir));
        info!(
            elevation_dir = %config.elevation_dir.display(),
            raster_dir = %config.raster_dir.display(),
            pointcloud_dir = %config.pointcloud_dir.display(),
            cache_dir = %config.cache_dir.display(),
            "Data directories"
        );
        Ok(Self::with_stores(config, raster_cache, pointcloud_cache, source))
    }

    /// State over explicit stores, for tests and embedding.
    pub fn with_stores(
        config: ServerConfig,
        raster_cache: Arc<dyn RasterCacheStore>,
        pointcloud_cache: Arc<dyn PointCloudCacheStore>,
        point_source: Arc<dyn PointSource>,
    ) -> Self {
        let pointclouds = PointCloudPreprocessor::new(point_source, pointcloud_cache.clone());
        Self {
            config,
            raster_cache,
            pointcloud_cache,
            pointclouds,
        }
    }

    /// Resolve a layer name, trying the raster cache before `dir`.
    pub fn resolve_layer(&self, name: &str, dir: &Path) -> TerrainResult<LayerSource> {
        check_file_name(name)?;
        if self.raster_cache.exists(name) {
            return Ok(LayerSource::Cache(name.to_string()));
        }
        let path = dir.join(name);
        if path.is_file() {
            Ok(LayerSource::File(path))
        } else {
            Err(TerrainError::NotFound(format!("layer '{}'", name)))
        }
    }

    pub fn load_layer(&self, source: &LayerSource) -> TerrainResult<Raster> {
        match source {
            LayerSource::Cache(name) => self.raster_cache.get(name),
            LayerSource::File(path) => read_geotiff(path),
        }
    }

    /// Path of a source DEM, `NotFound` if absent.
    pub fn elevation_path(&self, name: &str) -> TerrainResult<PathBuf> {
        source_path(&self.config.elevation_dir, name, "DEM")
    }

    pub fn raster_path(&self, name: &str) -> TerrainResult<PathBuf> {
        source_path(&self.config.raster_dir, name, "raster")
    }
}

fn source_path(dir: &Path, name: &str, kind: &str) -> TerrainResult<PathBuf> {
    check_file_name(name)?;
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(TerrainError::NotFound(format!("{} '{}'", kind, name)))
    }
}
