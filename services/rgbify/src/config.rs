//! Building a [`TilerConfig`] from a YAML file and command-line flags.
//!
//! Values from the file are the starting point; every flag given on the
//! command line overrides the matching file value.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tiler::TilerConfig;

/// Command-line values that can override the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub min_zoom: Option<u8>,
    pub max_zoom: Option<u8>,
    pub base_val: Option<f64>,
    pub interval: Option<f64>,
    pub round_digits: Option<i32>,
    pub format: Option<String>,
    pub bounding_tile: Option<[u32; 3]>,
}

/// Read a YAML configuration file.
pub fn load_file(path: &Path) -> Result<TilerConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge `overrides` onto `base` (or the defaults when there is no file).
///
/// Without a configuration file the source, output and both zoom levels
/// must come from the command line.
pub fn resolve(base: Option<TilerConfig>, overrides: Overrides) -> Result<TilerConfig> {
    let from_file = base.is_some();
    let mut config = base.unwrap_or_default();

    if !from_file {
        let mut missing = Vec::new();
        if overrides.source.is_none() {
            missing.push("SRC");
        }
        if overrides.output.is_none() {
            missing.push("DST");
        }
        if overrides.min_zoom.is_none() {
            missing.push("--min-z");
        }
        if overrides.max_zoom.is_none() {
            missing.push("--max-z");
        }
        if !missing.is_empty() {
            bail!("missing required arguments: {}", missing.join(", "));
        }
    }

    if let Some(source) = overrides.source {
        config.source_path = source;
    }
    if let Some(output) = overrides.output {
        config.output_path = output;
    }
    if let Some(z) = overrides.min_zoom {
        config.min_zoom = z;
    }
    if let Some(z) = overrides.max_zoom {
        config.max_zoom = z;
    }
    if let Some(v) = overrides.base_val {
        config.base_val = v;
    }
    if let Some(v) = overrides.interval {
        config.interval = v;
    }
    if let Some(v) = overrides.round_digits {
        config.round_digits = v;
    }
    if let Some(format) = overrides.format {
        config.format = format;
    }
    if let Some(tile) = overrides.bounding_tile {
        config.bounding_tile = Some(tile);
    }

    if config.source_path.as_os_str().is_empty() || config.output_path.as_os_str().is_empty() {
        bail!("both a source and an output path are required");
    }
    Ok(config)
}

/// Parse a bounding tile written as `[x, y, z]` or `x,y,z`.
pub fn parse_bounding_tile(s: &str) -> std::result::Result<[u32; 3], String> {
    let trimmed = s.trim();
    let json = if trimmed.starts_with('[') {
        trimmed.to_string()
    } else {
        format!("[{}]", trimmed)
    };
    serde_json::from_str(&json)
        .map_err(|_| format!("expected a tile as \"[x, y, z]\", got '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> Overrides {
        Overrides {
            source: Some("dem.tif".into()),
            output: Some("dem.pmtiles".into()),
            min_zoom: Some(0),
            max_zoom: Some(5),
            ..Overrides::default()
        }
    }

    #[test]
    fn test_cli_only() {
        let config = resolve(None, cli()).unwrap();
        assert_eq!(config.source_path, PathBuf::from("dem.tif"));
        assert_eq!(config.max_zoom, 5);
        assert_eq!(config.interval, 1.0);
        assert_eq!(config.format, "png");
    }

    #[test]
    fn test_cli_requires_zooms_without_file() {
        let overrides = Overrides {
            max_zoom: None,
            ..cli()
        };
        let err = resolve(None, overrides).unwrap_err();
        assert!(err.to_string().contains("--max-z"));
    }

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgbify.yaml");
        fs::write(
            &path,
            "source_path: a.tif\noutput_path: a.pmtiles\nmin_zoom: 2\nmax_zoom: 9\ninterval: 0.1\nbase_val: -10000\nformat: webp\n",
        )
        .unwrap();

        let file = load_file(&path).unwrap();
        let overrides = Overrides {
            max_zoom: Some(4),
            bounding_tile: Some([1, 1, 2]),
            ..Overrides::default()
        };
        let config = resolve(Some(file), overrides).unwrap();
        assert_eq!(config.source_path, PathBuf::from("a.tif"));
        assert_eq!(config.min_zoom, 2);
        assert_eq!(config.max_zoom, 4);
        assert_eq!(config.interval, 0.1);
        assert_eq!(config.base_val, -10000.0);
        assert_eq!(config.format, "webp");
        assert_eq!(config.bounding_tile, Some([1, 1, 2]));
    }

    #[test]
    fn test_missing_file() {
        assert!(load_file(Path::new("/definitely/not/here.yaml")).is_err());
    }

    #[test]
    fn test_parse_bounding_tile() {
        assert_eq!(parse_bounding_tile("[1, 1, 2]").unwrap(), [1, 1, 2]);
        assert_eq!(parse_bounding_tile("3,5,4").unwrap(), [3, 5, 4]);
        assert!(parse_bounding_tile("[1, 2]").is_err());
        assert!(parse_bounding_tile("a,b,c").is_err());
    }
}
