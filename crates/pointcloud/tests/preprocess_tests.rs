//! Pre-processing against in-memory sources and caches.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pointcloud::classification::DEFAULT_CLASS_COLOR;
use pointcloud::{ColorAttribute, PointCloudError, PointCloudPreprocessor, PointCollection, PointSource};
use storage::{MemoryPointCloudCache, PointCloudCacheStore};

/// Serves one fixed collection and counts reads.
struct CountingSource {
    points: PointCollection,
    reads: AtomicUsize,
}

impl CountingSource {
    fn new(points: PointCollection) -> Arc<Self> {
        Arc::new(Self {
            points,
            reads: AtomicUsize::new(0),
        })
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl PointSource for CountingSource {
    fn read(&self, _name: &str) -> pointcloud::Result<PointCollection> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.points.clone())
    }
}

fn sample_points() -> PointCollection {
    PointCollection {
        positions: vec![[10.0, 20.0, 100.0], [14.0, 28.0, 101.0], [12.0, 22.0, 104.0]],
        colors: Some(vec![[65535, 0, 0], [0, 65535, 0], [0, 0, 0]]),
        classifications: Some(vec![2, 6, 42]),
    }
}

fn f32s(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn setup(points: PointCollection) -> (Arc<CountingSource>, Arc<MemoryPointCloudCache>, PointCloudPreprocessor) {
    let source = CountingSource::new(points);
    let cache = Arc::new(MemoryPointCloudCache::new());
    let pre = PointCloudPreprocessor::new(source.clone(), cache.clone());
    (source, cache, pre)
}

#[test]
fn test_preprocess_is_idempotent() {
    let (source, _cache, pre) = setup(sample_points());

    let first = pre.preprocess("site.las").unwrap();
    let second = pre.preprocess("site.las").unwrap();

    assert_eq!(first, second);
    assert_eq!(source.reads(), 1);
}

#[test]
fn test_bbox_and_centered_positions() {
    let (_source, cache, pre) = setup(sample_points());
    let meta = pre.preprocess("site.las").unwrap();

    assert_eq!(meta.point_count, 3);
    assert_eq!(meta.bbox.min, [10.0, 20.0, 100.0]);
    assert_eq!(meta.bbox.max, [14.0, 28.0, 104.0]);

    let positions = f32s(&cache.get_buffer(&meta.files.positions).unwrap());
    assert_eq!(positions.len(), 9);
    // Centre is (12, 24, 102)
    assert_eq!(&positions[0..3], &[-2.0, -4.0, -2.0]);
    assert_eq!(&positions[3..6], &[2.0, 4.0, -1.0]);
    for axis in 0..3 {
        let lo = positions.iter().skip(axis).step_by(3).cloned().fold(f32::MAX, f32::min);
        let hi = positions.iter().skip(axis).step_by(3).cloned().fold(f32::MIN, f32::max);
        assert_eq!(lo, -hi);
    }
}

#[test]
fn test_attribute_buffers() {
    let (_source, cache, pre) = setup(sample_points());
    let meta = pre.preprocess("site.las").unwrap();

    assert_eq!(
        meta.color_attributes,
        vec![ColorAttribute::Rgb, ColorAttribute::Classification, ColorAttribute::Elevation]
    );
    assert!(meta.classification_available);
    assert_eq!(meta.files.classification_raw.as_deref(), Some("site_classification_raw.bin"));

    let rgb = f32s(&cache.get_buffer("site_color_rgb.bin").unwrap());
    assert_eq!(&rgb[0..3], &[1.0, 0.0, 0.0]);

    let classes = f32s(&cache.get_buffer("site_color_classification.bin").unwrap());
    assert_eq!(&classes[0..3], &[165.0 / 255.0, 80.0 / 255.0, 40.0 / 255.0]);
    let grey = DEFAULT_CLASS_COLOR[0] as f32 / 255.0;
    assert_eq!(&classes[6..9], &[grey, grey, grey]);

    assert_eq!(cache.get_buffer("site_classification_raw.bin").unwrap(), vec![2, 6, 42]);

    let elevation = f32s(&cache.get_buffer("site_color_elevation.bin").unwrap());
    assert_eq!(elevation.len(), 9);
    // Lowest point takes the first viridis colour (#440154)
    assert_eq!(&elevation[0..3], &[0x44 as f32 / 255.0, 0x01 as f32 / 255.0, 0x54 as f32 / 255.0]);
}

#[test]
fn test_without_optional_attributes() {
    let points = PointCollection {
        positions: vec![[0.0, 0.0, 5.0], [1.0, 1.0, 5.0]],
        colors: None,
        classifications: None,
    };
    let (_source, cache, pre) = setup(points);
    let meta = pre.preprocess("flat.laz").unwrap();

    assert_eq!(meta.color_attributes, vec![ColorAttribute::Elevation]);
    assert!(!meta.classification_available);
    assert!(meta.files.classification_raw.is_none());

    // Constant z: every point gets the first ramp colour
    let elevation = f32s(&cache.get_buffer("flat_color_elevation.bin").unwrap());
    assert_eq!(&elevation[0..3], &elevation[3..6]);
}

#[test]
fn test_empty_collection_leaves_no_metadata() {
    let (_source, cache, pre) = setup(PointCollection::default());

    let err = pre.preprocess("empty.las").unwrap_err();
    assert!(matches!(err, PointCloudError::Empty(_)));
    assert!(cache.get_meta("empty").unwrap().is_none());
    assert!(cache.file_names().is_empty());
}

#[test]
fn test_mismatched_attributes_rejected() {
    let points = PointCollection {
        positions: vec![[0.0, 0.0, 0.0]],
        colors: Some(vec![]),
        classifications: None,
    };
    let (_source, cache, pre) = setup(points);
    assert!(matches!(pre.preprocess("bad.las").unwrap_err(), PointCloudError::Inconsistent(_)));
    assert!(cache.get_meta("bad").unwrap().is_none());
}

#[test]
fn test_missing_las_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let source = pointcloud::LasPointSource::new(dir.path());
    assert!(matches!(source.read("absent.las").unwrap_err(), PointCloudError::NotFound(_)));
}
