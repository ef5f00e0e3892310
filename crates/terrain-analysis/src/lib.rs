//! Analytic operations over elevation grids.
//!
//! Each operation turns a DEM into a derived grid plus a suggested display
//! range. [`run_and_cache`] stores the grid under a fresh cache name so
//! the tile server can render it like any other raster.

pub mod hazard;
pub mod ops;
pub mod query;
pub mod stats;
pub mod terrain;

pub use ops::{run_and_cache, AnalyticOp, AnalyticOutput, CachedAnalysis};
pub use query::{generate_profile, query_elevation, ProfilePoint, SAMPLES_PER_SEGMENT};
pub use stats::{percentile, percentile_range, DisplayStats};
pub use terrain::{aspect_degrees, slope_degrees, FLAT_ASPECT};
