//! Coordinate reference system transformations.
//!
//! Web Mercator and UTM are implemented from scratch. Other EPSG codes fall
//! back to proj4rs. Every supported CRS converts to and from WGS84 lon/lat, and
//! [`CrsTransform`] chains two of them through that pivot.

pub mod mercator;
pub mod transform;
pub mod transverse_mercator;

pub use transform::CrsTransform;
pub use transverse_mercator::TransverseMercator;
