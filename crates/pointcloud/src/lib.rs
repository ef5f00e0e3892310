//! Point-cloud pre-processing.
//!
//! A raw LAS/LAZ collection is read once and split into flat little-endian
//! buffers a WebGL client can upload directly:
//!
//! ```text
//! PointSource ──read──► PointCollection
//!                            │
//!              PointCloudPreprocessor
//!                            │
//!        ┌──────────┬────────┴─────┬───────────────┐
//!   positions    color_rgb   color_classification  color_elevation
//!                            │
//!                     metadata (written last)
//! ```
//!
//! The metadata document doubles as the cache-hit marker: if it exists
//! the source is never re-read.

pub mod classification;
pub mod error;
pub mod meta;
pub mod preprocess;
pub mod source;

pub use error::{PointCloudError, Result};
pub use meta::{BufferFiles, ColorAttribute, PointCloudMeta, PointCloudBounds};
pub use preprocess::PointCloudPreprocessor;
pub use source::{LasExtent, LasPointSource, PointCollection, PointSource};
