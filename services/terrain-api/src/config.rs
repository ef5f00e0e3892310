//! Command-line and environment configuration.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(name = "terrain-api")]
#[command(about = "Terrain tile, analytic raster and point-cloud server")]
pub struct Args {
    /// Listen address
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:5000")]
    pub listen: String,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long, env = "WORKER_THREADS")]
    pub worker_threads: Option<usize>,

    /// Root holding the elevation, rasters, pointclouds and cache directories
    #[arg(long, env = "DATA_ROOT", default_value = "./data")]
    pub data_root: PathBuf,

    /// Source DEMs (default: <data-root>/elevation)
    #[arg(long, env = "ELEVATION_DIR")]
    pub elevation_dir: Option<PathBuf>,

    /// Source analytic rasters (default: <data-root>/rasters)
    #[arg(long, env = "RASTER_DIR")]
    pub raster_dir: Option<PathBuf>,

    /// Source LAS/LAZ files (default: <data-root>/pointclouds)
    #[arg(long, env = "POINTCLOUD_DIR")]
    pub pointcloud_dir: Option<PathBuf>,

    /// Derived rasters and point-cloud buffers (default: <data-root>/cache)
    #[arg(long, env = "CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub elevation_dir: PathBuf,
    pub raster_dir: PathBuf,
    pub pointcloud_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl ServerConfig {
    /// Resolve directories against the data root and create the cache
    /// directory if it does not exist.
    pub fn from_args(args: &Args) -> Result<Self> {
        let listen: SocketAddr = args
            .listen
            .parse()
            .with_context(|| format!("invalid listen address '{}'", args.listen))?;

        let config = Self {
            listen,
            ..Self::with_root(&args.data_root)
        };
        let config = Self {
            elevation_dir: args.elevation_dir.clone().unwrap_or(config.elevation_dir),
            raster_dir: args.raster_dir.clone().unwrap_or(config.raster_dir),
            pointcloud_dir: args.pointcloud_dir.clone().unwrap_or(config.pointcloud_dir),
            cache_dir: args.cache_dir.clone().unwrap_or(config.cache_dir),
            ..config
        };

        std::fs::create_dir_all(&config.cache_dir)
            .with_context(|| format!("cannot create cache directory {}", config.cache_dir.display()))?;
        Ok(config)
    }

    /// Default layout under `root`, without touching the filesystem.
    pub fn with_root(root: &Path) -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 5000)),
            elevation_dir: root.join("elevation"),
            raster_dir: root.join("rasters"),
            pointcloud_dir: root.join("pointclouds"),
            cache_dir: root.join("cache"),
        }
    }
}
