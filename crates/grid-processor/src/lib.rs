//! Grid resampling for the tile pipeline.
//!
//! Takes a source [`Grid`](terrain_common::Grid) in any supported CRS and
//! produces a grid on a destination transform, CRS and size:
//!
//! ```text
//! destination pixel centre (col + 0.5, row + 0.5)
//!      │  destination affine
//!      ▼
//! destination map coords ──► CrsTransform ──► source map coords
//!      │  inverse source affine
//!      ▼
//! source pixel coords ──► bilinear sample (no-data aware)
//! ```

pub mod error;
pub mod projection;

pub use error::{GridProcessorError, Result};
pub use projection::interpolation::bilinear_sample;
pub use projection::reproject::{reproject, reproject_to_tile};
