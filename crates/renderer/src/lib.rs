//! Tile encoding: continuous values to RGB pixels to image bytes.
//!
//! - [`encoding`]: quantization of float grids into 3-byte step counts
//! - [`png`]: RGB PNG writer
//! - [`webp`]: lossless WebP writer
//! - [`format`]: [`ImageFormat`] dispatch

pub mod encoding;
pub mod format;
pub mod png;
pub mod webp;

pub use encoding::{decode_pixels, decode_rgb, encode_rgb, quantize, MAX_ENCODED};
pub use format::ImageFormat;
