//! Prometheus metric recording.
//!
//! Metrics go through the `metrics` facade; `main` installs the
//! Prometheus recorder and `/metrics` renders it. Without a recorder
//! (tests) every call is a no-op.

use metrics::{counter, histogram};
use std::time::Duration;

pub const TILE_KIND_RASTER: &str = "raster";
pub const TILE_KIND_DEM: &str = "dem";

/// A tile rendered successfully.
pub fn record_tile_rendered(kind: &'static str, elapsed: Duration) {
    counter!("terrain_tiles_rendered_total", "kind" => kind).increment(1);
    histogram!("terrain_tile_render_seconds", "kind" => kind).record(elapsed.as_secs_f64());
}

/// A tile request answered with the transparent fallback.
pub fn record_tile_fallback(kind: &'static str) {
    counter!("terrain_tile_fallbacks_total", "kind" => kind).increment(1);
}

/// A point-cloud metadata request, by outcome (`ok` / `error`).
pub fn record_preprocess(outcome: &'static str) {
    counter!("terrain_pointcloud_preprocess_total", "outcome" => outcome).increment(1);
}
