//! Colour ramps realised as 256-entry lookup tables.
//!
//! A ramp maps a normalized value `t` in [0, 1] to an RGB colour by
//! indexing `min(floor(t * 256), 255)` into its table, the same quantisation
//! matplotlib colormaps use.

use crate::error::{RenderError, Result};
use crate::gradient::ValueRange;

/// Lookup table resolution.
pub const LUT_SIZE: usize = 256;

/// Depth (meters) at which the flood ramp switches from shallow to deep.
pub const FLOOD_BREAKPOINT_DEPTH: f64 = 0.5;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse "#rrggbb" or "rrggbb" into an opaque colour.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self::rgb(r, g, b))
    }
}

/// A colour pinned at a normalized position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub position: f64,
    pub color: Color,
}

impl ColorStop {
    pub fn new(position: f64, color: Color) -> Self {
        Self { position, color }
    }
}

/// Linear color interpolation, rounded to the nearest byte.
fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Color::new(
        mix(color1.r, color2.r),
        mix(color1.g, color2.g),
        mix(color1.b, color2.b),
        mix(color1.a, color2.a),
    )
}

/// A continuous ramp sampled into a fixed lookup table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    lut: Vec<Color>,
}

impl ColorRamp {
    /// Build from stops with non-decreasing positions spanning exactly
    /// [0, 1]. Repeated positions create hard edges.
    pub fn from_stops(stops: &[ColorStop]) -> Result<Self> {
        if stops.len() < 2 {
            return Err(RenderError::InvalidInput("a ramp needs at least two stops".into()));
        }
        let first = stops[0].position;
        let last = stops[stops.len() - 1].position;
        if first != 0.0 || last != 1.0 {
            return Err(RenderError::InvalidInput(format!(
                "ramp stops must span [0, 1], got [{}, {}]",
                first, last
            )));
        }
        if stops.windows(2).any(|w| !(w[1].position >= w[0].position)) {
            return Err(RenderError::InvalidInput("ramp stop positions must be non-decreasing".into()));
        }

        let lut = (0..LUT_SIZE)
            .map(|i| {
                let x = i as f64 / (LUT_SIZE - 1) as f64;
                let segment = stops
                    .windows(2)
                    .find(|w| w[1].position > w[0].position && x <= w[1].position)
                    .unwrap_or(&stops[stops.len() - 2..]);
                let span = segment[1].position - segment[0].position;
                let t = if span > 0.0 { (x - segment[0].position) / span } else { 1.0 };
                interpolate_color(segment[0].color, segment[1].color, t)
            })
            .collect();

        Ok(Self { lut })
    }

    /// Colours spread at equal intervals over [0, 1].
    pub fn evenly_spaced(colors: &[Color]) -> Result<Self> {
        let n = colors.len().max(2) - 1;
        let stops: Vec<ColorStop> = colors
            .iter()
            .enumerate()
            .map(|(i, c)| ColorStop::new(i as f64 / n as f64, *c))
            .collect();
        Self::from_stops(&stops)
    }

    pub fn reversed(&self) -> Self {
        let mut lut = self.lut.clone();
        lut.reverse();
        Self { lut }
    }

    /// Colour for normalized `t`; NaN maps to the first entry.
    pub fn lookup(&self, t: f64) -> Color {
        let index = if t.is_nan() { 0 } else { (t.clamp(0.0, 1.0) * LUT_SIZE as f64) as usize };
        self.lut[index.min(LUT_SIZE - 1)]
    }

    pub fn lut(&self) -> &[Color] {
        &self.lut
    }
}

/// Built-in ramp families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampId {
    /// Perceptually uniform blue-green-yellow
    Viridis,
    /// ColorBrewer diverging red-yellow-blue
    Spectral,
    /// Green to deep blue to white
    Ocean,
    /// Cyclic hue wheel
    Hsv,
    /// 7-stop green to dark red, for slope angles
    Slope,
    /// Two blues with a hard edge at [`FLOOD_BREAKPOINT_DEPTH`]
    FloodCustom,
}

/// A parsed colormap name: ramp family plus optional reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampSpec {
    pub id: RampId,
    pub reversed: bool,
}

impl RampSpec {
    /// Parse a colormap name such as `viridis`, `Spectral_r` or
    /// `flood_custom`. A trailing `_r` reverses the ramp.
    pub fn parse(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let (base, reversed) = match lower.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (lower.as_str(), false),
        };
        let id = match base {
            "viridis" => RampId::Viridis,
            "spectral" => RampId::Spectral,
            "ocean" => RampId::Ocean,
            "hsv" => RampId::Hsv,
            "slope" => RampId::Slope,
            "flood_custom" => RampId::FloodCustom,
            _ => return Err(RenderError::UnknownRamp(name.to_string())),
        };
        Ok(Self { id, reversed })
    }

    /// Materialise the ramp. Only the flood ramp depends on `range`.
    pub fn build(&self, range: ValueRange) -> Result<ColorRamp> {
        let ramp = match self.id {
            RampId::Viridis => ColorRamp::evenly_spaced(&hex_colors(VIRIDIS))?,
            RampId::Spectral => ColorRamp::evenly_spaced(&hex_colors(SPECTRAL))?,
            RampId::Ocean => ColorRamp::from_stops(&[
                ColorStop::new(0.0, Color::rgb(0, 128, 0)),
                ColorStop::new(1.0 / 3.0, Color::rgb(0, 0, 85)),
                ColorStop::new(2.0 / 3.0, Color::rgb(0, 128, 170)),
                ColorStop::new(1.0, Color::rgb(255, 255, 255)),
            ])?,
            RampId::Hsv => ColorRamp::evenly_spaced(&hex_colors(HSV))?,
            RampId::Slope => ColorRamp::evenly_spaced(&hex_colors(SLOPE))?,
            RampId::FloodCustom => flood_ramp(range)?,
        };
        Ok(if self.reversed { ramp.reversed() } else { ramp })
    }
}

/// Convenience: parse and build in one step.
pub fn named_ramp(name: &str, range: ValueRange) -> Result<ColorRamp> {
    RampSpec::parse(name)?.build(range)
}

/// Normalized position of [`FLOOD_BREAKPOINT_DEPTH`] inside `range`;
/// 0.5 when the range is degenerate.
pub fn flood_breakpoint(range: ValueRange) -> f64 {
    if range.max > range.min {
        ((FLOOD_BREAKPOINT_DEPTH - range.min) / (range.max - range.min)).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

fn flood_ramp(range: ValueRange) -> Result<ColorRamp> {
    let shallow = Color::rgb(0xa6, 0xce, 0xe3);
    let deep = Color::rgb(0x1f, 0x78, 0xb4);
    ColorRamp::from_stops(&[
        ColorStop::new(0.0, shallow),
        ColorStop::new(flood_breakpoint(range), shallow),
        ColorStop::new(1.0, deep),
    ])
}

fn hex_colors(hex: &[&str]) -> Vec<Color> {
    hex.iter().filter_map(|h| Color::from_hex(h)).collect()
}

const VIRIDIS: &[&str] = &[
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58", "#b5de2b", "#fde725",
];

const SPECTRAL: &[&str] = &[
    "#9e0142", "#d53e4f", "#f46d43", "#fdae61", "#fee08b", "#ffffbf", "#e6f598", "#abdda4", "#66c2a5", "#3288bd",
    "#5e4fa2",
];

const HSV: &[&str] = &["#ff0000", "#ffff00", "#00ff00", "#00ffff", "#0000ff", "#ff00ff", "#ff0000"];

const SLOPE: &[&str] = &["#2ca25f", "#ffffbf", "#fee08b", "#fdae61", "#f46d43", "#d73027", "#a50026"];
