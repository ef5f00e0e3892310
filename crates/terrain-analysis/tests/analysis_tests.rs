//! Analytic operations end to end against an in-memory cache.

use projection::CrsTransform;
use storage::{MemoryRasterCache, RasterCacheStore};
use terrain_analysis::{
    generate_profile, query_elevation, run_and_cache, AnalyticOp, SAMPLES_PER_SEGMENT,
};
use terrain_common::{CrsCode, GeoTransform, Grid};

/// 10x10 geographic DEM over [77, 78] x [12, 13] with value = 10 * col + row.
fn geographic_dem() -> Grid {
    let data = (0..100).map(|i| ((i % 10) * 10 + i / 10) as f32).collect();
    Grid::new(
        10,
        10,
        data,
        GeoTransform::from_bounds(77.0, 12.0, 78.0, 13.0, 10, 10),
        CrsCode::Epsg4326,
        -9999.0,
    )
    .unwrap()
}

/// 20x20 UTM DEM rising 1 m per metre eastward.
fn ramp_dem() -> Grid {
    let data = (0..400).map(|i| ((i % 20) * 30) as f32).collect();
    Grid::new(
        20,
        20,
        data,
        GeoTransform::from_origin(500000.0, 1400000.0, 30.0, 30.0),
        CrsCode::Utm { zone: 43, north: true },
        -9999.0,
    )
    .unwrap()
}

#[test]
fn test_slope_is_cached_with_stats() {
    let cache = MemoryRasterCache::new();
    let result = run_and_cache(AnalyticOp::Slope, &ramp_dem(), &cache).unwrap();

    assert!(result.cache_filename.starts_with("slope_"));
    assert!(result.cache_filename.ends_with(".tif"));
    assert!(cache.exists(&result.cache_filename));

    // Interior is exactly 45 degrees, edges are gentler
    assert!(result.stats.max <= 45.0 + 1e-3);
    assert!(result.stats.min < result.stats.max);

    let cached = cache.get(&result.cache_filename).unwrap().band(1).unwrap();
    assert!((cached.get(10, 10).unwrap() - 45.0).abs() < 1e-3);
}

#[test]
fn test_constant_slope_range_is_widened() {
    let flat = Grid::filled(
        5,
        5,
        3.0,
        GeoTransform::from_origin(0.0, 50.0, 10.0, 10.0),
        CrsCode::Epsg3857,
        -9999.0,
    )
    .unwrap();
    let output = AnalyticOp::Slope.run(&flat).unwrap();
    assert_eq!(output.stats.min, 0.0);
    assert_eq!(output.stats.max, 1.0);

    let hazard = AnalyticOp::LandslideHazard { rainfall_mm: 50.0 }.run(&flat).unwrap();
    assert!((hazard.stats.max - hazard.stats.min - 0.1).abs() < 1e-6);
}

#[test]
fn test_all_nodata_uses_default_stats() {
    let empty = Grid::filled(
        3,
        3,
        -9999.0,
        GeoTransform::from_origin(0.0, 30.0, 10.0, 10.0),
        CrsCode::Epsg3857,
        -9999.0,
    )
    .unwrap();
    assert_eq!(AnalyticOp::Slope.run(&empty).unwrap().stats.max, 45.0);
    let hazard = AnalyticOp::LandslideHazard { rainfall_mm: 50.0 }.run(&empty).unwrap();
    assert_eq!((hazard.stats.min, hazard.stats.max), (0.0, 1.0));
}

#[test]
fn test_aspect_stats_fixed() {
    let cache = MemoryRasterCache::new();
    let result = run_and_cache(AnalyticOp::Aspect, &ramp_dem(), &cache).unwrap();
    assert!(result.cache_filename.starts_with("aspect_"));
    assert_eq!((result.stats.min, result.stats.max), (0.0, 360.0));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["stats"]["max"], 360.0);
}

#[test]
fn test_query_elevation_geographic() {
    let dem = geographic_dem();
    // Pixel (col 3, row 2) spans lon [77.3, 77.4], lat [12.7, 12.8]
    assert_eq!(query_elevation(&dem, 77.35, 12.75).unwrap(), Some(32.0));
    assert_eq!(query_elevation(&dem, 10.0, 10.0).unwrap(), None);
}

#[test]
fn test_query_elevation_projected() {
    let dem = ramp_dem();
    // Centre of pixel (col 4, row 7)
    let (x, y) = dem.transform.apply(4.5, 7.5);
    let (lon, lat) = CrsTransform::new(dem.crs, CrsCode::Epsg4326).transform(x, y).unwrap();
    assert_eq!(query_elevation(&dem, lon, lat).unwrap(), Some(120.0));
}

#[test]
fn test_profile_sample_count_and_joints() {
    let dem = geographic_dem();
    let line = [[77.05, 12.95], [77.95, 12.95], [77.95, 12.05]];
    let profile = generate_profile(&dem, &line).unwrap();

    assert_eq!(profile.len(), 2 * SAMPLES_PER_SEGMENT - 1);
    assert!((profile[0].lon - 77.05).abs() < 1e-9);
    // The joint vertex appears once, opening the second segment
    assert!((profile[SAMPLES_PER_SEGMENT - 1].lon - 77.95).abs() < 1e-9);
    assert!((profile[SAMPLES_PER_SEGMENT].lat - 12.95).abs() > 1e-6);
    let end = profile.last().unwrap();
    assert!((end.lat - 12.05).abs() < 1e-9);

    assert_eq!(profile[0].elev, Some(0.0));
    assert_eq!(end.elev, Some(99.0));
}

#[test]
fn test_profile_outside_dem_is_null() {
    let dem = geographic_dem();
    let profile = generate_profile(&dem, &[[70.0, 0.0], [71.0, 1.0]]).unwrap();
    assert_eq!(profile.len(), SAMPLES_PER_SEGMENT);
    assert!(profile.iter().all(|p| p.elev.is_none()));
}

#[test]
fn test_profile_needs_two_vertices() {
    let err = generate_profile(&geographic_dem(), &[[77.5, 12.5]]).unwrap_err();
    assert_eq!(err.http_status_code(), 400);
}
