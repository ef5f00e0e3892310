//! CRS-to-CRS transforms through a WGS84 lon/lat pivot.
//!
//! Web Mercator and UTM use the hand-written projections in this crate.
//! Other projected EPSG codes go through proj4rs.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use proj4rs::proj::Proj;

use crate::mercator::{lonlat_to_mercator, mercator_to_lonlat};
use crate::transverse_mercator::TransverseMercator;
use terrain_common::{BoundingBox, CrsCode};

const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs";

static WGS84: Lazy<Option<Proj>> = Lazy::new(|| Proj::from_proj_string(WGS84_PROJ4).ok());

/// How one side of the transform reaches WGS84 lon/lat.
#[derive(Clone)]
enum Leg {
    LonLat,
    Mercator,
    Utm(TransverseMercator),
    Proj(Arc<Proj>),
    /// Registry definition that proj4rs could not parse.
    Unusable,
}

impl Leg {
    fn for_crs(crs: CrsCode) -> Self {
        match crs {
            CrsCode::Epsg3857 => Leg::Mercator,
            CrsCode::Utm { zone, north } => Leg::Utm(TransverseMercator::utm(zone, north)),
            CrsCode::Other(_) if !crs.is_geographic() => crs
                .proj4()
                .and_then(|def| Proj::from_proj_string(def).ok())
                .map(|proj| Leg::Proj(Arc::new(proj)))
                .unwrap_or(Leg::Unusable),
            _ => Leg::LonLat,
        }
    }

    fn to_lonlat(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        match self {
            Leg::LonLat => Some((x, y)),
            Leg::Mercator => Some(mercator_to_lonlat(x, y)),
            Leg::Utm(tm) => Some(tm.inverse(x, y)),
            Leg::Proj(proj) => {
                let mut point = (x, y, 0.0);
                proj4rs::transform::transform(proj, WGS84.as_ref()?, &mut point).ok()?;
                Some((point.0.to_degrees(), point.1.to_degrees()))
            }
            Leg::Unusable => None,
        }
    }

    fn from_lonlat(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        match self {
            Leg::LonLat => Some((lon, lat)),
            Leg::Mercator => Some(lonlat_to_mercator(lon, lat)),
            Leg::Utm(tm) => Some(tm.forward(lon, lat)),
            Leg::Proj(proj) => {
                let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
                proj4rs::transform::transform(WGS84.as_ref()?, proj, &mut point).ok()?;
                Some((point.0, point.1))
            }
            Leg::Unusable => None,
        }
    }
}

/// A point transform from `src` to `dst`.
///
/// Identical CRS pairs pass coordinates through untouched so that pure
/// resampling introduces no floating point drift.
#[derive(Clone)]
pub struct CrsTransform {
    src: CrsCode,
    dst: CrsCode,
    src_leg: Leg,
    dst_leg: Leg,
}

impl fmt::Debug for CrsTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrsTransform")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .finish_non_exhaustive()
    }
}

impl CrsTransform {
    pub fn new(src: CrsCode, dst: CrsCode) -> Self {
        Self {
            src,
            dst,
            src_leg: Leg::for_crs(src),
            dst_leg: Leg::for_crs(dst),
        }
    }

    pub fn src(&self) -> CrsCode {
        self.src
    }

    pub fn dst(&self) -> CrsCode {
        self.dst
    }

    pub fn is_identity(&self) -> bool {
        self.src == self.dst || (self.src.is_geographic() && self.dst.is_geographic())
    }

    /// Transform a single point; `None` when the result is not finite.
    pub fn transform(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if self.is_identity() {
            return Some((x, y));
        }
        let (lon, lat) = self.src_leg.to_lonlat(x, y)?;
        let (ox, oy) = self.dst_leg.from_lonlat(lon, lat)?;
        (ox.is_finite() && oy.is_finite()).then_some((ox, oy))
    }

    /// Envelope of `bbox` after transformation, sampling `densify` points
    /// along each edge so curved edges are not under-estimated.
    pub fn transform_bounds(&self, bbox: &BoundingBox, densify: usize) -> Option<BoundingBox> {
        if self.is_identity() {
            return Some(*bbox);
        }
        let steps = densify.max(1) + 1;
        let mut points = Vec::with_capacity(steps * 4);
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = bbox.min_x + t * bbox.width();
            let y = bbox.min_y + t * bbox.height();
            points.push((x, bbox.min_y));
            points.push((x, bbox.max_y));
            points.push((bbox.min_x, y));
            points.push((bbox.max_x, y));
        }
        BoundingBox::from_points(points.into_iter().filter_map(|(x, y)| self.transform(x, y)))
    }
}
