//! GeoTIFF raster source backed by the `tiff` decoder.
//!
//! Georeferencing is read from ModelPixelScale + ModelTiepoint or
//! ModelTransformation, the CRS from the GeoKeyDirectory and nodata from the
//! GDAL_NODATA ASCII tag. Pixel data is decoded lazily on the first band read.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use projection::Affine;
use tiff::decoder::ifd::Value;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tiff::ColorType;
use tile_common::CrsCode;
use tracing::{debug, warn};

use super::{mask_nodata, RasterSource};
use crate::error::{GridProcessorError, Result};
use crate::types::{DataType, RasterInfo};

// GeoTIFF tag codes
const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

// GeoKey ids
const GT_RASTER_TYPE_GEO_KEY: u32 = 1025;
const GEOGRAPHIC_TYPE_GEO_KEY: u32 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u32 = 3072;

const RASTER_PIXEL_IS_POINT: u32 = 2;
const USER_DEFINED: u32 = 32767;

/// An open GeoTIFF file.
#[derive(Debug)]
pub struct GeoTiffSource {
    path: PathBuf,
    info: RasterInfo,
    band: Option<Vec<f32>>,
}

impl GeoTiffSource {
    /// Open `path` and read its georeferencing. Pixels are not decoded yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut decoder = open_decoder(&path)?;

        let (width, height) = decoder.dimensions()?;
        let bits = match decoder.colortype()? {
            ColorType::Gray(bits) => bits,
            other => {
                return Err(GridProcessorError::unsupported_layout(format!(
                    "expected a single band, found {:?}",
                    other
                )))
            }
        };
        let data_type = read_data_type(&mut decoder, bits)?;

        let geokeys = read_geokeys(&mut decoder)?;
        let crs = crs_from_geokeys(&geokeys)?;
        let mut transform = read_transform(&mut decoder)?;
        if geokey(&geokeys, GT_RASTER_TYPE_GEO_KEY) == Some(RASTER_PIXEL_IS_POINT) {
            // Tiepoints reference pixel centers; move the origin to the corner
            let (c, f) = transform.apply(-0.5, -0.5);
            transform.c = c;
            transform.f = f;
        }
        let nodata = read_nodata(&mut decoder, &path)?;

        let info = RasterInfo {
            width: width as usize,
            height: height as usize,
            band_count: 1,
            bounds: transform.bounds(width, height),
            crs,
            nodata,
            data_type,
            transform,
        };

        debug!(
            path = %path.display(),
            width,
            height,
            crs = %crs,
            data_type = %data_type,
            nodata = ?nodata,
            "Opened GeoTIFF"
        );

        Ok(Self {
            path,
            info,
            band: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<f32>> {
        let mut decoder = open_decoder(&self.path)?;
        let mut values = match decoder.read_image()? {
            DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
            DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
            DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
            DecodingResult::U64(v) => v.into_iter().map(|x| x as f32).collect(),
            DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
            DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
            DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
            DecodingResult::I64(v) => v.into_iter().map(|x| x as f32).collect(),
            DecodingResult::F32(v) => v,
            DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
            #[allow(unreachable_patterns)]
            _ => {
                return Err(GridProcessorError::unsupported_layout(format!(
                    "sample type of {}",
                    self.path.display()
                )))
            }
        };

        let expected = self.info.width * self.info.height;
        if values.len() != expected {
            return Err(GridProcessorError::read_failed(format!(
                "decoded {} samples, expected {}",
                values.len(),
                expected
            )));
        }

        mask_nodata(&mut values, self.info.nodata);
        debug!(path = %self.path.display(), samples = values.len(), "Decoded GeoTIFF band");
        Ok(values)
    }
}

impl RasterSource for GeoTiffSource {
    fn info(&self) -> &RasterInfo {
        &self.info
    }

    fn read_band(&mut self, band: usize) -> Result<&[f32]> {
        if band != 1 {
            return Err(GridProcessorError::BandOutOfRange {
                band,
                count: self.info.band_count,
            });
        }
        if self.band.is_none() {
            self.band = Some(self.load()?);
        }
        Ok(self.band.as_deref().unwrap_or_default())
    }
}

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>> {
    let file = File::open(path)
        .map_err(|e| GridProcessorError::open_failed(format!("{}: {}", path.display(), e)))?;
    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| GridProcessorError::open_failed(format!("{}: {}", path.display(), e)))?;
    Ok(decoder.with_limits(Limits::unlimited()))
}

fn find<R: Read + Seek>(decoder: &mut Decoder<R>, code: u16) -> Result<Option<Value>> {
    Ok(decoder.find_tag(Tag::from_u16_exhaustive(code))?)
}

fn values_u32(value: Value) -> Result<Vec<u32>> {
    match value {
        Value::List(items) => Ok(items
            .into_iter()
            .map(|v| v.into_u32())
            .collect::<tiff::TiffResult<Vec<_>>>()?),
        other => Ok(vec![other.into_u32()?]),
    }
}

fn values_f64(value: Value) -> Result<Vec<f64>> {
    match value {
        Value::List(items) => Ok(items
            .into_iter()
            .map(|v| v.into_f64())
            .collect::<tiff::TiffResult<Vec<_>>>()?),
        other => Ok(vec![other.into_f64()?]),
    }
}

fn read_data_type<R: Read + Seek>(decoder: &mut Decoder<R>, bits: u8) -> Result<DataType> {
    let format = match decoder.find_tag(Tag::SampleFormat)? {
        Some(value) => values_u32(value)?.first().copied().unwrap_or(1),
        None => 1,
    };
    let data_type = match (format, bits) {
        (1, 8) => DataType::UInt8,
        (1, 16) => DataType::UInt16,
        (1, 32) => DataType::UInt32,
        (1, 64) => DataType::UInt64,
        (2, 8) => DataType::Int8,
        (2, 16) => DataType::Int16,
        (2, 32) => DataType::Int32,
        (2, 64) => DataType::Int64,
        (3, 32) => DataType::Float32,
        (3, 64) => DataType::Float64,
        _ => {
            return Err(GridProcessorError::unsupported_layout(format!(
                "sample format {} with {} bits",
                format, bits
            )))
        }
    };
    Ok(data_type)
}

fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Affine> {
    if let Some(value) = find(decoder, MODEL_TRANSFORMATION)? {
        let m = values_f64(value)?;
        if m.len() < 8 {
            return Err(GridProcessorError::invalid_metadata(
                "ModelTransformation needs 16 values",
            ));
        }
        return Ok(Affine::new(m[0], m[1], m[3], m[4], m[5], m[7]));
    }

    let scale = find(decoder, MODEL_PIXEL_SCALE)?
        .map(values_f64)
        .transpose()?
        .ok_or_else(|| GridProcessorError::invalid_metadata("missing ModelPixelScale"))?;
    let tiepoint = find(decoder, MODEL_TIEPOINT)?
        .map(values_f64)
        .transpose()?
        .ok_or_else(|| GridProcessorError::invalid_metadata("missing ModelTiepoint"))?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(GridProcessorError::invalid_metadata(
            "malformed ModelPixelScale/ModelTiepoint",
        ));
    }

    let (sx, sy) = (scale[0], scale[1]);
    let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
    Ok(Affine::new(sx, 0.0, x - i * sx, 0.0, -sy, y + j * sy))
}

fn read_geokeys<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Vec<u32>> {
    find(decoder, GEO_KEY_DIRECTORY)?
        .map(values_u32)
        .transpose()?
        .ok_or_else(|| GridProcessorError::invalid_metadata("missing GeoKeyDirectory"))
}

/// Value of an inline (location 0) GeoKey.
fn geokey(directory: &[u32], id: u32) -> Option<u32> {
    directory
        .get(4..)?
        .chunks_exact(4)
        .find(|key| key[0] == id && key[1] == 0)
        .map(|key| key[3])
}

fn crs_from_geokeys(directory: &[u32]) -> Result<CrsCode> {
    let code = geokey(directory, PROJECTED_CS_TYPE_GEO_KEY)
        .or_else(|| geokey(directory, GEOGRAPHIC_TYPE_GEO_KEY))
        .ok_or_else(|| GridProcessorError::invalid_metadata("no EPSG code in GeoKeyDirectory"))?;
    if code == USER_DEFINED {
        return Err(GridProcessorError::UnsupportedCrs(
            "user-defined CRS".to_string(),
        ));
    }
    Ok(CrsCode::from_epsg(code)?)
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>, path: &Path) -> Result<Option<f64>> {
    let Some(value) = find(decoder, GDAL_NODATA)? else {
        return Ok(None);
    };
    let text = match value {
        Value::Ascii(s) => s,
        other => {
            warn!(path = %path.display(), value = ?other, "Ignoring non-ASCII GDAL_NODATA tag");
            return Ok(None);
        }
    };
    let trimmed = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    match trimmed.parse::<f64>() {
        Ok(v) => Ok(Some(v)),
        Err(_) => {
            warn!(path = %path.display(), nodata = trimmed, "Unparseable GDAL_NODATA value");
            Ok(None)
        }
    }
}
