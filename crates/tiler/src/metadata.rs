//! Tileset metadata stored in the archive.

use archive::TileType;
use renderer::ImageFormat;
use serde::{Deserialize, Serialize};

use crate::config::EncodingConfig;

/// JSON metadata block written alongside the tiles.
///
/// `encoding` carries what a consumer needs to turn pixels back into
/// values: `value = base_val + (R * 65536 + G * 256 + B) * interval`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetMetadata {
    pub name: String,
    pub format: String,
    #[serde(rename = "type")]
    pub layer_type: String,
    pub minzoom: u8,
    pub maxzoom: u8,
    /// `[west, south, east, north]` in degrees.
    pub bounds: [f64; 4],
    /// `[lon, lat, zoom]`.
    pub center: [f64; 3],
    pub encoding: EncodingMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingMetadata {
    pub scheme: String,
    pub base_val: f64,
    pub interval: f64,
    pub round_digits: i32,
    pub tile_size: u32,
}

impl TilesetMetadata {
    pub fn new(
        name: impl Into<String>,
        config: &EncodingConfig,
        bounds: (f64, f64, f64, f64),
        min_zoom: u8,
        max_zoom: u8,
    ) -> Self {
        let (west, south, east, north) = bounds;
        Self {
            name: name.into(),
            format: config.format.as_str().to_string(),
            layer_type: "baselayer".to_string(),
            minzoom: min_zoom,
            maxzoom: max_zoom,
            bounds: [west, south, east, north],
            center: [(west + east) / 2.0, (south + north) / 2.0, min_zoom as f64],
            encoding: EncodingMetadata {
                scheme: "rgb".to_string(),
                base_val: config.base_val,
                interval: config.interval,
                round_digits: config.round_digits,
                tile_size: config.tile_size,
            },
        }
    }
}

/// Archive tile type for an image format.
pub fn tile_type(format: ImageFormat) -> TileType {
    match format {
        ImageFormat::Png => TileType::Png,
        ImageFormat::Webp => TileType::WebP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let config = EncodingConfig {
            base_val: -10000.0,
            interval: 0.1,
            ..EncodingConfig::default()
        };
        let meta = TilesetMetadata::new("dem", &config, (-10.0, 40.0, 10.0, 60.0), 2, 9);
        let json = serde_json::to_value(&meta).unwrap();

        assert_eq!(json["type"], "baselayer");
        assert_eq!(json["format"], "png");
        assert_eq!(json["minzoom"], 2);
        assert_eq!(json["bounds"][1], 40.0);
        assert_eq!(json["center"][0], 0.0);
        assert_eq!(json["center"][1], 50.0);
        assert_eq!(json["center"][2], 2.0);
        assert_eq!(json["encoding"]["base_val"], -10000.0);
        assert_eq!(json["encoding"]["interval"], 0.1);

        let back: TilesetMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_tile_type() {
        assert_eq!(tile_type(ImageFormat::Png), TileType::Png);
        assert_eq!(tile_type(ImageFormat::Webp), TileType::WebP);
    }
}
