//! Layer listings and bounds.

use axum::{
    extract::{Extension, Path},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path as FsPath;
use std::sync::Arc;
use tracing::warn;

use projection::CrsTransform;
use storage::read_geotiff;
use terrain_analysis::{percentile_range, DisplayStats};
use pointcloud::LasPointSource;
use terrain_common::{BoundingBox, CrsCode, Raster, TerrainError, TerrainResult};

use super::common::{display_name, run_blocking, ApiResult};
use crate::state::{AppState, LayerSource};

const RASTER_EXTENSIONS: &[&str] = &["tif", "tiff"];
const POINTCLOUD_EXTENSIONS: &[&str] = &["las", "laz"];
const LAYER_PERCENTILES: (f64, f64) = (2.0, 98.0);

#[derive(Debug, Serialize)]
pub struct ElevationLayer {
    pub id: String,
    pub name: String,
    pub stats: DisplayStats,
}

#[derive(Debug, Serialize)]
pub struct RasterLayer {
    pub id: String,
    pub name: String,
    pub bands: usize,
    pub stats: Vec<DisplayStats>,
}

#[derive(Debug, Serialize)]
pub struct PointCloudLayer {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct BoundsResponse {
    /// `[west, south, east, north]` in EPSG:4326.
    pub bounds: [f64; 4],
}

/// Sorted names of regular files in `dir` whose extension matches.
/// A missing directory lists as empty.
fn list_files(dir: &FsPath, extensions: &[&str]) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| {
            FsPath::new(name)
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        })
        .collect();
    names.sort();
    names
}

/// `GET /api/elevation_layers`
pub async fn elevation_layers_handler(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Json<Vec<ElevationLayer>>> {
    let layers = run_blocking(move || {
        let dir = &state.config.elevation_dir;
        let mut layers = Vec::new();
        for file in list_files(dir, RASTER_EXTENSIONS) {
            let min_max = read_geotiff(&dir.join(&file)).and_then(|raster| raster.band(1)).map(|dem| dem.min_max());
            match min_max {
                Ok(Some((min, max))) => layers.push(ElevationLayer {
                    name: display_name(&file),
                    stats: DisplayStats::new(min as f64, max as f64),
                    id: file,
                }),
                Ok(None) => warn!(file = %file, "Skipping DEM without valid cells"),
                Err(e) => warn!(file = %file, error = %e, "Skipping unreadable DEM"),
            }
        }
        Ok(layers)
    })
    .await?;
    Ok(Json(layers))
}

fn band_stats(raster: &Raster) -> Vec<DisplayStats> {
    let (lo, hi) = LAYER_PERCENTILES;
    raster
        .bands
        .iter()
        .map(|band| {
            let valid = band.iter().copied().filter(|v| *v != raster.nodata);
            percentile_range(valid, lo, hi).unwrap_or(DisplayStats::new(0.0, 0.0))
        })
        .collect()
}

/// `GET /api/raster_layers`
pub async fn raster_layers_handler(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Json<Vec<RasterLayer>>> {
    let layers = run_blocking(move || {
        let dir = &state.config.raster_dir;
        let mut layers = Vec::new();
        for file in list_files(dir, RASTER_EXTENSIONS) {
            match read_geotiff(&dir.join(&file)) {
                Ok(raster) => layers.push(RasterLayer {
                    name: display_name(&file),
                    bands: raster.band_count(),
                    stats: band_stats(&raster),
                    id: file,
                }),
                Err(e) => warn!(file = %file, error = %e, "Skipping unreadable raster"),
            }
        }
        Ok(layers)
    })
    .await?;
    Ok(Json(layers))
}

/// `GET /api/pointcloud_layers`
///
/// Point clouds are named by their plain file stem; they are not read
/// until their metadata is requested.
pub async fn pointcloud_layers_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<Json<Vec<PointCloudLayer>>> {
    let layers = list_files(&state.config.pointcloud_dir, POINTCLOUD_EXTENSIONS)
        .into_iter()
        .map(|file| PointCloudLayer {
            name: file.rsplit_once('.').map_or(file.as_str(), |(stem, _)| stem).to_string(),
            id: file,
        })
        .collect();
    Ok(Json(layers))
}

/// `GET /api/layer_bounds/{dem|raster|pointcloud}/{file}`
pub async fn layer_bounds_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((layer_type, file)): Path<(String, String)>,
) -> ApiResult<Json<BoundsResponse>> {
    let source = match layer_type.as_str() {
        "dem" => LayerSource::File(state.elevation_path(&file)?),
        "raster" => match state.raster_path(&file) {
            Ok(path) => LayerSource::File(path),
            Err(e) if e.is_not_found() && state.raster_cache.exists(&file) => LayerSource::Cache(file.clone()),
            Err(e) => return Err(e.into()),
        },
        "pointcloud" => {
            let las = LasPointSource::new(&state.config.pointcloud_dir);
            let bounds = run_blocking(move || {
                let extent = las.extent(&file)?;
                geographic_bounds(extent.crs, &extent.bounds)
            })
            .await?;
            return Ok(Json(BoundsResponse { bounds: bounds.to_array() }));
        }
        other => {
            return Err(TerrainError::NotFound(format!("layer type '{}'", other)).into());
        }
    };

    let bounds = run_blocking(move || {
        let raster = state.load_layer(&source)?;
        geographic_bounds(raster.crs, &raster.bounds())
    })
    .await?;
    Ok(Json(BoundsResponse { bounds: bounds.to_array() }))
}

/// `GET /api/layer_bounds_polygon/{dem}`
///
/// The DEM footprint as a one-feature GeoJSON `FeatureCollection`. Only the
/// four corners are reprojected, so the ring is a quadrilateral in lon/lat.
pub async fn layer_bounds_polygon_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(file): Path<String>,
) -> ApiResult<Json<Value>> {
    let path = state.elevation_path(&file)?;
    let ring = run_blocking(move || {
        let raster = read_geotiff(&path)?;
        let b = raster.bounds();
        let to_wgs84 = CrsTransform::new(raster.crs, CrsCode::Epsg4326);
        [(b.max_x, b.min_y), (b.max_x, b.max_y), (b.min_x, b.max_y), (b.min_x, b.min_y), (b.max_x, b.min_y)]
            .into_iter()
            .map(|(x, y)| {
                to_wgs84
                    .transform(x, y)
                    .map(|(lon, lat)| [lon, lat])
                    .ok_or_else(|| projection_error(raster.crs))
            })
            .collect::<TerrainResult<Vec<[f64; 2]>>>()
    })
    .await?;

    Ok(Json(json!({
        "type": "FeatureCollection",
        "features": [{
            "id": "0",
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "Polygon", "coordinates": [ring] },
        }],
    })))
}

/// Extent of `bounds` in EPSG:4326, from its corners and edge midpoints.
fn geographic_bounds(crs: CrsCode, bounds: &BoundingBox) -> TerrainResult<BoundingBox> {
    CrsTransform::new(crs, CrsCode::Epsg4326)
        .transform_bounds(bounds, 1)
        .ok_or_else(|| projection_error(crs))
}

fn projection_error(crs: CrsCode) -> TerrainError {
    TerrainError::ProjectionError(format!("cannot transform bounds from {}", crs))
}
