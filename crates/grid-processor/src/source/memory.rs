use super::{mask_nodata, RasterSource};
use crate::error::{GridProcessorError, Result};
use crate::types::RasterInfo;

/// A single-band raster held entirely in memory.
#[derive(Debug, Clone)]
pub struct InMemoryRaster {
    info: RasterInfo,
    data: Vec<f32>,
}

impl InMemoryRaster {
    /// Wrap `data` (row-major, top-to-bottom) described by `info`.
    pub fn new(info: RasterInfo, mut data: Vec<f32>) -> Result<Self> {
        if data.len() != info.width * info.height {
            return Err(GridProcessorError::invalid_metadata(format!(
                "{} values for a {}x{} raster",
                data.len(),
                info.width,
                info.height
            )));
        }
        if info.band_count != 1 {
            return Err(GridProcessorError::unsupported_layout(format!(
                "{} bands",
                info.band_count
            )));
        }
        mask_nodata(&mut data, info.nodata);
        Ok(Self { info, data })
    }

    /// A raster with every pixel set to `value`.
    pub fn constant(info: RasterInfo, value: f32) -> Self {
        let data = vec![value; info.width * info.height];
        Self { info, data }
    }
}

impl RasterSource for InMemoryRaster {
    fn info(&self) -> &RasterInfo {
        &self.info
    }

    fn read_band(&mut self, band: usize) -> Result<&[f32]> {
        if band != 1 {
            return Err(GridProcessorError::BandOutOfRange { band, count: 1 });
        }
        Ok(&self.data)
    }
}
