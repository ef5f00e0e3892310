//! Tests for terrain-RGB elevation encoding.

use renderer::terrain_rgb::{decode_elevation, encode_elevation, encode_terrain_rgb};
use terrain_common::{CrsCode, GeoTransform, Grid};

#[test]
fn test_round_trip_within_half_decimeter() {
    // Sentinel outside the encodable domain so it never shadows a sample
    let nodata = -32768.0;
    let steps = ((6553.5 + 10000.0) * 10.0) as i64;
    for i in 0..=steps {
        let e = -10000.0 + i as f64 * 0.1;
        let decoded = decode_elevation(encode_elevation(e as f32, nodata));
        assert!((decoded - e).abs() <= 0.05, "elevation {} decoded as {}", e, decoded);
    }
}

#[test]
fn test_fractional_steps_truncate_downward() {
    let nodata = -32768.0;
    for i in 0..2000 {
        // Off-step values between 0 m and 200 m
        let e = i as f64 * 0.1 + 0.037;
        let decoded = decode_elevation(encode_elevation(e as f32, nodata));
        let expected = ((e + 10000.0) * 10.0).floor() / 10.0 - 10000.0;
        assert!((decoded - expected).abs() < 1e-6, "elevation {} decoded as {}", e, decoded);
        assert!(decoded <= e && e - decoded < 0.1);
    }
}

#[test]
fn test_grid_encoding_layout() {
    let grid = Grid::new(
        2,
        1,
        vec![-9999.0, 20.0],
        GeoTransform::from_origin(0.0, 1.0, 1.0, 1.0),
        CrsCode::Epsg3857,
        -9999.0,
    )
    .unwrap();
    let rgb = encode_terrain_rgb(&grid);
    assert_eq!(rgb.len(), 6);
    assert_eq!(decode_elevation([rgb[0], rgb[1], rgb[2]]), 0.0);
    assert_eq!(decode_elevation([rgb[3], rgb[4], rgb[5]]), 20.0);
}
