//! Raster sources.
//!
//! A [`RasterSource`] is an open, read-only handle to a single-band raster.
//! Handles are not shared: each consumer opens its own.

mod geotiff;
mod memory;

pub use geotiff::GeoTiffSource;
pub use memory::InMemoryRaster;

use projection::Affine;
use tile_common::CrsCode;

use crate::error::Result;
use crate::projection::reproject_to_grid;
use crate::types::{InterpolationMethod, RasterInfo, TargetGrid};

/// Read access to a georeferenced raster.
pub trait RasterSource {
    /// Dimensions, footprint, CRS and nodata of the raster.
    fn info(&self) -> &RasterInfo;

    /// Pixel values of a band (1-based), nodata already replaced by NaN.
    fn read_band(&mut self, band: usize) -> Result<&[f32]>;

    /// Resample a band onto a `width × height` grid described by
    /// `dst_transform` in `dst_crs`.
    fn reproject(
        &mut self,
        band: usize,
        dst_transform: &Affine,
        width: usize,
        height: usize,
        dst_crs: CrsCode,
        method: InterpolationMethod,
    ) -> Result<Vec<f32>> {
        let info = self.info().clone();
        let data = self.read_band(band)?;
        let target = TargetGrid {
            transform: *dst_transform,
            width,
            height,
            crs: dst_crs,
        };
        reproject_to_grid(data, &info, &target, method)
    }
}

/// Replace every occurrence of `nodata` with NaN.
pub(crate) fn mask_nodata(values: &mut [f32], nodata: Option<f64>) {
    let Some(nodata) = nodata else {
        return;
    };
    if nodata.is_nan() {
        return;
    }
    let nodata_f32 = nodata as f32;
    for value in values.iter_mut() {
        if *value == nodata_f32 || *value as f64 == nodata {
            *value = f32::NAN;
        }
    }
}
