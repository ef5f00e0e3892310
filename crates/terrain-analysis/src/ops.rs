//! Analytic operations that feed the raster cache.

use serde::{Deserialize, Serialize};
use storage::RasterCacheStore;
use terrain_common::{Grid, TerrainResult};
use tracing::info;

use crate::hazard::landslide_hazard;
use crate::stats::{percentile_range, DisplayStats};
use crate::terrain::{aspect_degrees, slope_degrees};

/// Percentiles used to pick a display range.
pub const DISPLAY_PERCENTILES: (f64, f64) = (2.0, 98.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnalyticOp {
    Slope,
    Aspect,
    LandslideHazard { rainfall_mm: f64 },
}

/// A derived grid with its suggested display range.
#[derive(Debug, Clone)]
pub struct AnalyticOutput {
    pub grid: Grid,
    pub stats: DisplayStats,
}

/// Where an operation's output was cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAnalysis {
    pub cache_filename: String,
    pub stats: DisplayStats,
}

impl AnalyticOp {
    /// File name prefix for cached outputs.
    pub fn cache_prefix(&self) -> &'static str {
        match self {
            AnalyticOp::Slope => "slope",
            AnalyticOp::Aspect => "aspect",
            AnalyticOp::LandslideHazard { .. } => "hazard",
        }
    }

    pub fn run(&self, dem: &Grid) -> TerrainResult<AnalyticOutput> {
        let (lo, hi) = DISPLAY_PERCENTILES;
        match *self {
            AnalyticOp::Slope => {
                let grid = slope_degrees(dem)?;
                let mut stats = percentile_range(grid.valid_values(), lo, hi).unwrap_or(DisplayStats::new(0.0, 45.0));
                if stats.min >= stats.max {
                    stats.max = stats.min + 1.0;
                }
                Ok(AnalyticOutput { grid, stats })
            }
            AnalyticOp::Aspect => Ok(AnalyticOutput {
                grid: aspect_degrees(dem)?,
                stats: DisplayStats::new(0.0, 360.0),
            }),
            AnalyticOp::LandslideHazard { rainfall_mm } => {
                let grid = landslide_hazard(dem, rainfall_mm)?;
                let mut stats = percentile_range(grid.valid_values(), lo, hi).unwrap_or(DisplayStats::new(0.0, 1.0));
                if stats.max <= stats.min {
                    stats.max = stats.min + 0.1;
                }
                Ok(AnalyticOutput { grid, stats })
            }
        }
    }
}

/// Run `op` on `dem` and store the result under a fresh cache name.
pub fn run_and_cache(op: AnalyticOp, dem: &Grid, cache: &dyn RasterCacheStore) -> TerrainResult<CachedAnalysis> {
    let output = op.run(dem)?;
    let cache_filename = cache.put(op.cache_prefix(), &output.grid)?;
    info!(
        op = op.cache_prefix(),
        cache_filename = %cache_filename,
        min = output.stats.min,
        max = output.stats.max,
        "Cached analytic raster"
    );
    Ok(CachedAnalysis {
        cache_filename,
        stats: output.stats,
    })
}
