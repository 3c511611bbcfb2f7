//! Common test fixtures for rgbify tests.
//!
//! Besides a few bounding boxes, this module writes small GeoTIFF files so
//! the GeoTIFF source and the end-to-end pipeline can be tested without
//! committed binary data.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tiff::encoder::colortype::{Gray32Float, RGB32Float};
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

/// Common bounding box definitions for testing, as (west, south, east, north).
pub mod bbox {
    /// Global geographic extent
    pub const GLOBAL: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Full web-mercator square in meters
    pub const WEB_MERCATOR: (f64, f64, f64, f64) = (
        -20_037_508.342_789_244,
        -20_037_508.342_789_244,
        20_037_508.342_789_244,
        20_037_508.342_789_244,
    );

    /// A small area in the western United States
    pub const SMALL: (f64, f64, f64, f64) = (-112.0, 36.0, -111.0, 37.0);
}

// GeoTIFF tag IDs
const GEOTIFF_MODELPIXELSCALE: u16 = 33550;
const GEOTIFF_MODELTIEPOINT: u16 = 33922;
const GEOTIFF_GEOKEYDIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

// GeoKey IDs
const GT_MODEL_TYPE_GEO_KEY: u16 = 1024;
const GT_RASTER_TYPE_GEO_KEY: u16 = 1025;
const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Description of a north-up GeoTIFF to write.
#[derive(Debug, Clone)]
pub struct GeoTiffFixture {
    pub width: u32,
    pub height: u32,
    /// 1 (gray) or 3 (RGB); samples are interleaved.
    pub bands: u16,
    pub data: Vec<f32>,
    /// (west, south, east, north) in the CRS given by `epsg`.
    pub bounds: (f64, f64, f64, f64),
    pub epsg: u16,
    pub nodata: Option<f64>,
}

impl GeoTiffFixture {
    /// Single-band float raster.
    pub fn new(
        width: u32,
        height: u32,
        data: Vec<f32>,
        bounds: (f64, f64, f64, f64),
        epsg: u16,
    ) -> Self {
        Self {
            width,
            height,
            bands: 1,
            data,
            bounds,
            epsg,
            nodata: None,
        }
    }

    /// Global EPSG:4326 raster holding `value` everywhere.
    pub fn global_constant(width: u32, height: u32, value: f32) -> Self {
        let data = vec![value; (width * height) as usize];
        Self::new(width, height, data, bbox::GLOBAL, 4326)
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    /// Repeat every sample into three interleaved bands.
    pub fn with_three_bands(mut self) -> Self {
        self.data = self.data.iter().flat_map(|v| [*v, *v, *v]).collect();
        self.bands = 3;
        self
    }

    /// Write the fixture to `path`.
    pub fn write(&self, path: &Path) -> tiff::TiffResult<()> {
        let file = File::create(path)?;
        let mut encoder = TiffEncoder::new(BufWriter::new(file))?;

        match self.bands {
            3 => {
                let mut image = encoder.new_image::<RGB32Float>(self.width, self.height)?;
                self.write_geotiff_tags(image.encoder())?;
                image.write_data(&self.data)?;
            }
            _ => {
                let mut image = encoder.new_image::<Gray32Float>(self.width, self.height)?;
                self.write_geotiff_tags(image.encoder())?;
                image.write_data(&self.data)?;
            }
        }
        Ok(())
    }

    /// Write the fixture into a fresh temporary directory.
    ///
    /// The directory is removed when the returned `TempDir` is dropped.
    pub fn write_temp(&self, name: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join(name);
        self.write(&path).expect("Failed to write GeoTIFF fixture");
        (dir, path)
    }

    fn write_geotiff_tags<W: std::io::Write + std::io::Seek, K: tiff::encoder::TiffKind>(
        &self,
        dir: &mut tiff::encoder::DirectoryEncoder<W, K>,
    ) -> tiff::TiffResult<()> {
        let (west, south, east, north) = self.bounds;
        let scale_x = (east - west) / self.width as f64;
        let scale_y = (north - south) / self.height as f64;

        // ModelPixelScale: [ScaleX, ScaleY, ScaleZ]
        let pixel_scale = [scale_x, scale_y, 0.0];
        dir.write_tag(Tag::Unknown(GEOTIFF_MODELPIXELSCALE), pixel_scale.as_slice())?;

        // ModelTiepoint: pixel (0, 0) is the (west, north) corner
        let tiepoint = [0.0, 0.0, 0.0, west, north, 0.0];
        dir.write_tag(Tag::Unknown(GEOTIFF_MODELTIEPOINT), tiepoint.as_slice())?;

        let geokeys = self.geokey_directory();
        dir.write_tag(Tag::Unknown(GEOTIFF_GEOKEYDIRECTORY), geokeys.as_slice())?;

        if let Some(nodata) = self.nodata {
            let text = nodata.to_string();
            dir.write_tag(Tag::Unknown(GDAL_NODATA), text.as_str())?;
        }
        Ok(())
    }

    fn geokey_directory(&self) -> Vec<u16> {
        let geographic = self.epsg == 4326;
        let mut keys = vec![1, 1, 0, 3];
        keys.extend_from_slice(&[
            GT_MODEL_TYPE_GEO_KEY,
            0,
            1,
            if geographic {
                MODEL_TYPE_GEOGRAPHIC
            } else {
                MODEL_TYPE_PROJECTED
            },
        ]);
        keys.extend_from_slice(&[GT_RASTER_TYPE_GEO_KEY, 0, 1, RASTER_PIXEL_IS_AREA]);
        if geographic {
            keys.extend_from_slice(&[GEOGRAPHIC_TYPE_GEO_KEY, 0, 1, self.epsg]);
        } else {
            keys.extend_from_slice(&[PROJECTED_CS_TYPE_GEO_KEY, 0, 1, self.epsg]);
        }
        keys
    }
}
