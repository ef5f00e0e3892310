//! Image rendering for terrain tiles.
//!
//! Implements the tile encoders:
//! - Single-band colour ramps with transparent no-data
//! - Three-band false-colour composites
//! - Terrain-RGB elevation encoding
//! - PNG encoding (indexed, RGBA, RGB)

pub mod composite;
pub mod error;
pub mod gradient;
pub mod png;
pub mod ramp;
pub mod terrain_rgb;

pub use error::{RenderError, Result};
pub use gradient::{render_single_band, ValueRange};
pub use ramp::{named_ramp, Color, ColorRamp, RampSpec};
