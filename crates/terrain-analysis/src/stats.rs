//! Display-range statistics.

use serde::{Deserialize, Serialize};

/// Suggested colour-ramp range for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayStats {
    pub min: f64,
    pub max: f64,
}

impl DisplayStats {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Percentile `p` (0-100) of ascending `sorted` values using linear
/// interpolation between closest ranks. `None` for empty input.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (p / 100.0).clamp(0.0, 1.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// (`lo`, `hi`) percentiles over finite `values`.
pub fn percentile_range<I>(values: I, lo: f64, hi: f64) -> Option<DisplayStats>
where
    I: IntoIterator<Item = f32>,
{
    let mut sorted: Vec<f64> = values
        .into_iter()
        .filter(|v| v.is_finite())
        .map(f64::from)
        .collect();
    sorted.sort_by(f64::total_cmp);
    Some(DisplayStats::new(percentile(&sorted, lo)?, percentile(&sorted, hi)?))
}
