//! GeoTIFF and filesystem cache tests against real files.

use std::fs::File;
use std::io::BufWriter;

use storage::pointcloud_cache::positions_file_name;
use storage::{read_geotiff, write_geotiff, FsPointCloudCache, FsRasterCache, PointCloudCacheStore, RasterCacheStore};
use terrain_common::{CrsCode, GeoTransform, Grid};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

fn utm_grid() -> Grid {
    Grid::new(
        3,
        2,
        vec![10.0, 20.5, -9999.0, 40.0, 50.0, 60.25],
        GeoTransform::from_origin(500000.0, 4000000.0, 30.0, 30.0),
        CrsCode::Utm { zone: 43, north: true },
        -9999.0,
    )
    .unwrap()
}

#[test]
fn test_write_then_read_single_band() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dem.tif");
    write_geotiff(&path, &utm_grid()).unwrap();

    let raster = read_geotiff(&path).unwrap();
    assert_eq!(raster.band_count(), 1);
    assert_eq!(raster.crs, CrsCode::Utm { zone: 43, north: true });
    assert_eq!(raster.transform, utm_grid().transform);
    assert_eq!(raster.nodata, -9999.0);
    assert_eq!(raster.band(1).unwrap(), utm_grid());
}

#[test]
fn test_registry_crs_survives() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("laea.tif");
    let grid = Grid::filled(
        2,
        2,
        3.0,
        GeoTransform::from_origin(4321000.0, 3210000.0, 25.0, 25.0),
        CrsCode::Other(3035),
        -9999.0,
    )
    .unwrap();
    write_geotiff(&path, &grid).unwrap();
    assert_eq!(read_geotiff(&path).unwrap().crs, CrsCode::Other(3035));
}

#[test]
fn test_geographic_crs_survives() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geo.tif");
    let grid = Grid::filled(
        4,
        4,
        7.0,
        GeoTransform::from_bounds(77.0, 12.0, 78.0, 13.0, 4, 4),
        CrsCode::Epsg4326,
        -9999.0,
    )
    .unwrap();
    write_geotiff(&path, &grid).unwrap();

    let raster = read_geotiff(&path).unwrap();
    assert_eq!(raster.crs, CrsCode::Epsg4326);
    let b = raster.bounds();
    assert!((b.min_x - 77.0).abs() < 1e-9);
    assert!((b.max_y - 13.0).abs() < 1e-9);
}

fn write_rgb(path: &std::path::Path, raster_type: u16, nodata: Option<&str>) {
    let file = BufWriter::new(File::create(path).unwrap());
    let mut encoder = TiffEncoder::new(file).unwrap();
    let mut image = encoder.new_image::<colortype::RGB32Float>(2, 1).unwrap();
    let dir = image.encoder();
    dir.write_tag(Tag::ModelPixelScaleTag, &[10.0f64, 10.0, 0.0][..]).unwrap();
    dir.write_tag(Tag::ModelTiepointTag, &[0.0f64, 0.0, 0.0, 1000.0, 2000.0, 0.0][..])
        .unwrap();
    let keys: [u16; 12] = [1, 1, 0, 2, 1025, 0, 1, raster_type, 3072, 0, 1, 3857];
    dir.write_tag(Tag::GeoKeyDirectoryTag, &keys[..]).unwrap();
    if let Some(nodata) = nodata {
        dir.write_tag(Tag::GdalNodata, nodata).unwrap();
    }
    image
        .write_data(&[1.0f32, 2.0, 3.0, 4.0, f32::NAN, 6.0])
        .unwrap();
}

#[test]
fn test_multiband_deinterleave_and_default_nodata() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgb.tif");
    write_rgb(&path, 1, None);

    let raster = read_geotiff(&path).unwrap();
    assert_eq!(raster.band_count(), 3);
    assert_eq!(raster.nodata, -9999.0);
    assert_eq!(raster.bands[0], vec![1.0, 4.0]);
    assert_eq!(raster.bands[1], vec![2.0, -9999.0]);
    assert_eq!(raster.bands[2], vec![3.0, 6.0]);
    assert_eq!(raster.transform.c, 1000.0);
    assert_eq!(raster.transform.f, 2000.0);
    assert!(raster.band(4).is_err());
}

#[test]
fn test_pixel_is_point_shifts_origin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("point.tif");
    write_rgb(&path, 2, Some("-32768"));

    let raster = read_geotiff(&path).unwrap();
    assert_eq!(raster.nodata, -32768.0);
    assert_eq!(raster.transform.c, 995.0);
    assert_eq!(raster.transform.f, 2005.0);
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_geotiff(&dir.path().join("absent.tif")).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_fs_raster_cache_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FsRasterCache::new(dir.path().join("cache")).unwrap();
    let name = cache.put("slope", &utm_grid()).unwrap();

    assert!(name.starts_with("slope_") && name.ends_with(".tif"));
    assert!(cache.exists(&name));
    assert_eq!(cache.get(&name).unwrap().band(1).unwrap(), utm_grid());
    assert!(cache.get("slope_ffffffff.tif").unwrap_err().is_not_found());

    // Only the final file remains, no temporaries
    let entries: Vec<_> = std::fs::read_dir(cache.dir()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_fs_pointcloud_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FsPointCloudCache::new(dir.path()).unwrap();

    assert!(cache.get_meta("site").unwrap().is_none());
    cache.put_buffer(&positions_file_name("site"), &[0, 0, 128, 63]).unwrap();
    cache.put_meta("site", br#"{"pointCount":1}"#).unwrap();

    assert!(dir.path().join("site.json").is_file());
    assert_eq!(cache.get_buffer("site_positions.bin").unwrap(), vec![0, 0, 128, 63]);
    assert!(cache.get_buffer("../site.json").is_err());
    assert!(cache.get_buffer("missing.bin").unwrap_err().is_not_found());
}

#[test]
fn test_fs_pointcloud_cache_concurrent_writers() {
    use std::sync::{Arc, Barrier};

    let dir = tempfile::tempdir().unwrap();
    let cache = Arc::new(FsPointCloudCache::new(dir.path()).unwrap());
    let name = positions_file_name("site");

    for round in 0..20u8 {
        let barrier = Arc::new(Barrier::new(2));
        let writers: Vec<_> = (0..2)
            .map(|_| {
                let (cache, barrier, name) = (cache.clone(), barrier.clone(), name.clone());
                std::thread::spawn(move || {
                    let bytes = vec![round; 1 << 20];
                    barrier.wait();
                    cache.put_buffer(&name, &bytes)
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap().unwrap();
        }
        assert_eq!(cache.get_buffer(&name).unwrap(), vec![round; 1 << 20]);
    }

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}
