//! Tile rendering pipeline.
//!
//! ```text
//! Raster ─► band(s) ─► reproject_to_tile ─┬─► ramp ─► RGBA PNG
//!                                         ├─► composite ─► RGB PNG
//!                                         └─► terrain-RGB ─► RGB PNG
//! ```
//!
//! Every step reports failures as [`TileError`]; the HTTP layer decides
//! to serve a transparent tile instead.

use grid_processor::{reproject_to_tile, GridProcessorError};
use renderer::composite::render_composite;
use renderer::png::{create_png_auto, create_png_rgb};
use renderer::terrain_rgb::encode_terrain_rgb;
use renderer::{named_ramp, render_single_band, RenderError, ValueRange};
use serde::Deserialize;
use terrain_common::{Grid, Raster, TerrainError, TileKey, TILE_SIZE};
use thiserror::Error;

/// Colormap applied when a request names none.
pub const DEFAULT_COLORMAP: &str = "Spectral_r";

#[derive(Debug, Error)]
pub enum TileError {
    #[error("invalid tile request: {0}")]
    Request(#[from] TerrainError),

    #[error("reprojection failed: {0}")]
    Reproject(#[from] GridProcessorError),

    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
}

/// Raw query parameters of a raster tile request. Everything is parsed
/// by [`TileStyle::from_query`] so malformed values still end in a
/// transparent tile rather than a rejected request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RasterTileQuery {
    pub min: Option<String>,
    pub max: Option<String>,
    pub colormap: Option<String>,
    pub r: Option<String>,
    pub g: Option<String>,
    pub b: Option<String>,
    pub p_mins: Option<String>,
    pub p_maxs: Option<String>,
}

/// How a raster tile is coloured.
#[derive(Debug, Clone, PartialEq)]
pub enum TileStyle {
    SingleBand { range: ValueRange, colormap: String },
    /// 1-based band indices with per-band stretch ranges.
    Composite { bands: [usize; 3], ranges: [ValueRange; 3] },
}

impl TileStyle {
    pub fn from_query(query: &RasterTileQuery) -> Result<Self, TileError> {
        if let (Some(r), Some(g), Some(b)) = (&query.r, &query.g, &query.b) {
            let bands = [parse_band(r)?, parse_band(g)?, parse_band(b)?];
            let mins = parse_triple("p_mins", query.p_mins.as_deref().unwrap_or("0,0,0"))?;
            let maxs = parse_triple("p_maxs", query.p_maxs.as_deref().unwrap_or("1,1,1"))?;
            let ranges = [0, 1, 2].map(|i| ValueRange::new(mins[i], maxs[i]));
            return Ok(TileStyle::Composite { bands, ranges });
        }

        let min = parse_number("min", query.min.as_deref())?.unwrap_or(0.0);
        let max = parse_number("max", query.max.as_deref())?.unwrap_or(1.0);
        Ok(TileStyle::SingleBand {
            range: ValueRange::new(min, max),
            colormap: query.colormap.clone().unwrap_or_else(|| DEFAULT_COLORMAP.to_string()),
        })
    }
}

fn parse_number(param: &str, value: Option<&str>) -> Result<Option<f64>, TerrainError> {
    value
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| TerrainError::invalid_parameter(param, format!("'{}' is not a number", v)))
        })
        .transpose()
}

fn parse_band(value: &str) -> Result<usize, TerrainError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| TerrainError::invalid_parameter("band", format!("'{}' is not a band index", value)))
}

fn parse_triple(param: &str, value: &str) -> Result<[f64; 3], TerrainError> {
    let parts = value
        .split(',')
        .map(|v| parse_number(param, Some(v)).map(|n| n.unwrap_or(0.0)))
        .collect::<Result<Vec<_>, _>>()?;
    <[f64; 3]>::try_from(parts)
        .map_err(|_| TerrainError::invalid_parameter(param, "expected three comma-separated values"))
}

fn band_tile(raster: &Raster, band: usize, key: TileKey) -> Result<Grid, TileError> {
    let grid = raster.band(band)?;
    Ok(reproject_to_tile(&grid, &key.extent())?)
}

/// Render one colour-mapped or composite tile as PNG bytes.
pub fn render_raster_tile(raster: &Raster, key: TileKey, style: &TileStyle) -> Result<Vec<u8>, TileError> {
    match style {
        TileStyle::SingleBand { range, colormap } => {
            let ramp = named_ramp(colormap, *range)?;
            let tile = band_tile(raster, 1, key)?;
            let pixels = render_single_band(&tile, *range, &ramp);
            Ok(create_png_auto(&pixels, TILE_SIZE, TILE_SIZE)?)
        }
        TileStyle::Composite { bands, ranges } => {
            let [r, g, b] = [
                band_tile(raster, bands[0], key)?,
                band_tile(raster, bands[1], key)?,
                band_tile(raster, bands[2], key)?,
            ];
            let pixels = render_composite([&r, &g, &b], *ranges)?;
            Ok(create_png_rgb(&pixels, TILE_SIZE, TILE_SIZE)?)
        }
    }
}

/// Render band 1 of an elevation raster as a terrain-RGB PNG.
pub fn render_dem_tile(raster: &Raster, key: TileKey) -> Result<Vec<u8>, TileError> {
    let tile = band_tile(raster, 1, key)?;
    let pixels = encode_terrain_rgb(&tile);
    Ok(create_png_rgb(&pixels, TILE_SIZE, TILE_SIZE)?)
}
