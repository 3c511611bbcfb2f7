//! Output image format selection.

use std::fmt;

use crate::png::create_png_rgb;
use crate::webp::create_webp_lossless;

/// Tile image format. Both variants are lossless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Webp,
}

impl ImageFormat {
    /// Parse a format name (case-insensitive). Returns `None` for anything
    /// other than `png` or `webp`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// Encode interleaved RGB bytes.
    pub fn encode(&self, rgb: &[u8], width: usize, height: usize) -> Result<Vec<u8>, String> {
        match self {
            Self::Png => create_png_rgb(rgb, width, height),
            Self::Webp => create_webp_lossless(rgb, width, height),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(ImageFormat::parse("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::parse("webp"), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::parse("tiff"), None);
        assert_eq!(ImageFormat::parse("jpg"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ImageFormat::Webp.to_string(), "webp");
        assert_eq!(ImageFormat::default().to_string(), "png");
    }
}
