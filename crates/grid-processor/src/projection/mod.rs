//! Coordinate-driven resampling.
//!
//! This module maps destination pixels back into source pixel space and
//! interpolates source samples there.

pub mod interpolation;
pub mod reproject;
