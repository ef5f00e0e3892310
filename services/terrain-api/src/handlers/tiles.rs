//! XYZ tile handlers.
//!
//! A missing layer is the only tile failure that reaches the client as an
//! error. Everything else (bad style parameters, tiles outside the layer,
//! unreadable data) is logged and answered with a transparent tile so map
//! clients keep drawing.

use axum::{
    extract::{Extension, Path, Query},
    response::{IntoResponse, Response},
};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;
use tracing::warn;

use renderer::png::transparent_tile;
use terrain_common::TileKey;

use super::common::{parse_tile_y, png_response, ApiError};
use crate::metrics::{record_tile_fallback, record_tile_rendered, TILE_KIND_DEM, TILE_KIND_RASTER};
use crate::rendering::{render_dem_tile, render_raster_tile, RasterTileQuery, TileError, TileStyle};
use crate::state::{AppState, LayerSource};

/// `GET /api/raster_tile/{layer}/{z}/{x}/{y}.png`
pub async fn raster_tile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((layer, z, x, y)): Path<(String, u32, u32, String)>,
    Query(query): Query<RasterTileQuery>,
) -> Response {
    let source = match resolve(&state, &layer, TILE_KIND_RASTER) {
        Ok(source) => source,
        Err(response) => return response,
    };

    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, TileError> {
        let key = TileKey::new(z, x, parse_tile_y(&y)?)?;
        let style = TileStyle::from_query(&query)?;
        let raster = state.load_layer(&source)?;
        render_raster_tile(&raster, key, &style)
    })
    .await;

    finish(TILE_KIND_RASTER, &layer, started, result)
}

/// `GET /api/dem_tile/{layer}/{z}/{x}/{y}.png`
pub async fn dem_tile_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((layer, z, x, y)): Path<(String, u32, u32, String)>,
) -> Response {
    let source = match resolve(&state, &layer, TILE_KIND_DEM) {
        Ok(source) => source,
        Err(response) => return response,
    };

    let started = Instant::now();
    let result = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, TileError> {
        let key = TileKey::new(z, x, parse_tile_y(&y)?)?;
        let raster = state.load_layer(&source)?;
        render_dem_tile(&raster, key)
    })
    .await;

    finish(TILE_KIND_DEM, &layer, started, result)
}

/// Cached outputs shadow source files of the same name.
fn resolve(state: &AppState, layer: &str, kind: &'static str) -> Result<LayerSource, Response> {
    let dir = if kind == TILE_KIND_DEM {
        &state.config.elevation_dir
    } else {
        &state.config.raster_dir
    };
    match state.resolve_layer(layer, dir) {
        Ok(source) => Ok(source),
        Err(e) if e.is_not_found() => Err(ApiError(e).into_response()),
        Err(e) => Err(fallback(kind, layer, &e)),
    }
}

fn finish(
    kind: &'static str,
    layer: &str,
    started: Instant,
    result: Result<Result<Vec<u8>, TileError>, JoinError>,
) -> Response {
    match result {
        Ok(Ok(png)) => {
            record_tile_rendered(kind, started.elapsed());
            png_response(png)
        }
        Ok(Err(e)) => fallback(kind, layer, &e),
        Err(e) => fallback(kind, layer, &e),
    }
}

fn fallback(kind: &'static str, layer: &str, err: &dyn Display) -> Response {
    warn!(layer = %layer, kind = kind, error = %err, "Tile render failed, serving transparent tile");
    record_tile_fallback(kind);
    png_response(transparent_tile())
}
