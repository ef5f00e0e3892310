//! GeoTIFF reading and writing.
//!
//! Reads strip or tile organised, chunky (pixel-interleaved) TIFFs of any
//! integer or float sample type. Georeferencing comes from the GeoTIFF
//! tags:
//!
//! - `ModelTransformationTag`, or `ModelPixelScaleTag` + `ModelTiepointTag`
//! - `GeoKeyDirectoryTag` keys `ProjectedCSTypeGeoKey` (3072),
//!   `GeographicTypeGeoKey` (2048) and `GTRasterTypeGeoKey` (1025)
//! - `GDAL_NODATA` for the no-data sentinel
//!
//! Written files are single-band float32 with the same tags.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use terrain_common::crs::{GEOKEY_GEOGRAPHIC_TYPE, GEOKEY_PROJECTED_CS_TYPE};
use terrain_common::grid::normalize_nodata;
use terrain_common::{geokey, CrsCode, GeoTransform, Grid, Raster, TerrainError, TerrainResult, DEFAULT_NODATA};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tracing::debug;

const KEY_MODEL_TYPE: u16 = 1024;
const KEY_RASTER_TYPE: u16 = 1025;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;
const RASTER_PIXEL_IS_POINT: u16 = 2;

fn tiff_err(err: tiff::TiffError) -> TerrainError {
    match err {
        tiff::TiffError::IoError(io) => io.into(),
        other => TerrainError::DataReadError(other.to_string()),
    }
}

/// Read a GeoTIFF file into a multi-band raster.
pub fn read_geotiff(path: &Path) -> TerrainResult<Raster> {
    let file = File::open(path)?;
    let raster = decode_geotiff(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        width = raster.width,
        height = raster.height,
        bands = raster.band_count(),
        crs = %raster.crs,
        "Read GeoTIFF"
    );
    Ok(raster)
}

/// Decode a GeoTIFF from any seekable reader.
pub fn decode_geotiff<R: Read + Seek>(reader: R) -> TerrainResult<Raster> {
    let mut decoder = Decoder::new(reader).map_err(tiff_err)?;
    let (width, height) = decoder.dimensions().map_err(tiff_err)?;
    let (width, height) = (width as usize, height as usize);

    let samples = match decoder.find_tag(Tag::SamplesPerPixel).map_err(tiff_err)? {
        Some(v) => v.into_u16().map_err(tiff_err)? as usize,
        None => 1,
    };
    if let Some(planar) = decoder.find_tag(Tag::PlanarConfiguration).map_err(tiff_err)? {
        if planar.into_u16().map_err(tiff_err)? == 2 && samples > 1 {
            return Err(TerrainError::DataReadError("planar multi-band TIFFs are not supported".into()));
        }
    }

    let geokeys = match decoder.find_tag(Tag::GeoKeyDirectoryTag).map_err(tiff_err)? {
        Some(v) => v.into_u16_vec().map_err(tiff_err)?,
        None => Vec::new(),
    };
    let crs = crs_from_geokeys(&geokeys)?;
    let transform = read_transform(&mut decoder, geokey(&geokeys, KEY_RASTER_TYPE))?;

    let declared_nodata = match decoder.find_tag(Tag::GdalNodata).map_err(tiff_err)? {
        Some(v) => v.into_string().map_err(tiff_err)?.trim_matches(char::from(0)).trim().parse::<f32>().ok(),
        None => None,
    };
    let nodata = declared_nodata.filter(|v| v.is_finite()).unwrap_or(DEFAULT_NODATA);

    let values = decoding_result_to_f32(decoder.read_image().map_err(tiff_err)?);
    if values.len() != width * height * samples {
        return Err(TerrainError::DataReadError(format!(
            "decoded {} samples, expected {}x{}x{}",
            values.len(),
            width,
            height,
            samples
        )));
    }

    let bands = (0..samples)
        .map(|band| {
            let mut data: Vec<f32> = values.iter().skip(band).step_by(samples).copied().collect();
            normalize_nodata(&mut data, nodata);
            data
        })
        .collect();

    Ok(Raster {
        width,
        height,
        transform,
        crs,
        nodata,
        bands,
    })
}

fn decoding_result_to_f32(result: DecodingResult) -> Vec<f32> {
    match result {
        DecodingResult::U8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I16(data) => data.into_iter().map(f32::from).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
    }
}

fn crs_from_geokeys(directory: &[u16]) -> TerrainResult<CrsCode> {
    CrsCode::from_geokeys(directory).map_err(|e| TerrainError::InvalidCrs(format!("GeoTIFF: {}", e)))
}

fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>, raster_type: Option<u16>) -> TerrainResult<GeoTransform> {
    let mut transform = if let Some(matrix) = decoder.find_tag(Tag::ModelTransformationTag).map_err(tiff_err)? {
        let m = matrix.into_f64_vec().map_err(tiff_err)?;
        if m.len() < 8 {
            return Err(TerrainError::DataReadError("ModelTransformationTag too short".into()));
        }
        GeoTransform::new(m[0], m[1], m[3], m[4], m[5], m[7])
    } else {
        let scale = decoder
            .find_tag(Tag::ModelPixelScaleTag)
            .map_err(tiff_err)?
            .map(|v| v.into_f64_vec())
            .transpose()
            .map_err(tiff_err)?;
        let tiepoint = decoder
            .find_tag(Tag::ModelTiepointTag)
            .map_err(tiff_err)?
            .map(|v| v.into_f64_vec())
            .transpose()
            .map_err(tiff_err)?;
        match (scale, tiepoint) {
            (Some(s), Some(t)) if s.len() >= 2 && t.len() >= 6 => {
                let (sx, sy) = (s[0], s[1]);
                GeoTransform::new(sx, 0.0, t[3] - t[0] * sx, 0.0, -sy, t[4] + t[1] * sy)
            }
            _ => return Err(TerrainError::DataReadError("GeoTIFF has no georeferencing tags".into())),
        }
    };

    // Tiepoints on pixel centres: move the origin to the pixel corner
    if raster_type == Some(RASTER_PIXEL_IS_POINT) {
        transform.c -= 0.5 * (transform.a + transform.b);
        transform.f -= 0.5 * (transform.d + transform.e);
    }
    Ok(transform)
}

/// Write a single-band float32 GeoTIFF.
pub fn write_geotiff(path: &Path, grid: &Grid) -> TerrainResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode_geotiff(&mut writer, grid)?;
    writer.flush()?;
    Ok(())
}

/// Encode a single-band float32 GeoTIFF into any seekable writer.
pub fn encode_geotiff<W: Write + Seek>(writer: W, grid: &Grid) -> TerrainResult<()> {
    let mut encoder = TiffEncoder::new(writer).map_err(tiff_err)?;
    let mut image = encoder
        .new_image::<colortype::Gray32Float>(grid.width as u32, grid.height as u32)
        .map_err(tiff_err)?;

    let t = &grid.transform;
    let dir = image.encoder();
    if t.b == 0.0 && t.d == 0.0 && t.e < 0.0 {
        dir.write_tag(Tag::ModelPixelScaleTag, &[t.a, -t.e, 0.0][..]).map_err(tiff_err)?;
        dir.write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, t.c, t.f, 0.0][..])
            .map_err(tiff_err)?;
    } else {
        let matrix = [
            t.a, t.b, 0.0, t.c, //
            t.d, t.e, 0.0, t.f, //
            0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ];
        dir.write_tag(Tag::ModelTransformationTag, &matrix[..]).map_err(tiff_err)?;
    }

    let (model_type, cs_key) = if grid.crs.is_geographic() {
        (MODEL_TYPE_GEOGRAPHIC, GEOKEY_GEOGRAPHIC_TYPE)
    } else {
        (MODEL_TYPE_PROJECTED, GEOKEY_PROJECTED_CS_TYPE)
    };
    let geokeys: [u16; 16] = [
        1, 1, 0, 3, //
        KEY_MODEL_TYPE, 0, 1, model_type, //
        KEY_RASTER_TYPE, 0, 1, RASTER_PIXEL_IS_AREA, //
        cs_key, 0, 1, grid.crs.epsg() as u16,
    ];
    dir.write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..]).map_err(tiff_err)?;
    let nodata = grid.nodata.to_string();
    dir.write_tag(Tag::GdalNodata, nodata.as_str()).map_err(tiff_err)?;

    image.write_data(&grid.data).map_err(tiff_err)?;
    Ok(())
}
