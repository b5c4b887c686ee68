use std::collections::HashMap;
use std::path::{Path, PathBuf};

use palette_dither::{ColorMetric, Euclidean, Manhattan, Palette, PaletteError, WeightedEuclidean, WorkingColor};
use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable naming a config file when `--config` is absent
pub const CONFIG_ENV: &str = "DITHERKIT_CONFIG";

/// Built-in copy of config.yaml
const EMBEDDED_CONFIG: &str = include_str!("../config.yaml");

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Named palettes
    #[serde(default)]
    pub palettes: HashMap<String, PaletteConfig>,

    /// Palette used when the CLI names none
    #[serde(default = "default_palette")]
    pub default_palette: String,

    /// Catalog name used when the CLI names none
    #[serde(default = "default_algorithm")]
    pub default_algorithm: String,

    /// Error / threshold strength in [0, 1]
    #[serde(default = "default_strength")]
    pub strength: f32,

    /// Alternate scan direction per row for error diffusion
    #[serde(default = "default_serpentine")]
    pub serpentine: bool,

    /// Color distance
    #[serde(default)]
    pub metric: MetricKind,

    /// Horizontal slicing for parallel-safe algorithms
    #[serde(default)]
    pub tiling: TilingConfig,
}

fn default_palette() -> String {
    "gray4".to_string()
}

fn default_algorithm() -> String {
    "floyd-steinberg".to_string()
}

fn default_strength() -> f32 {
    1.0
}

fn default_serpentine() -> bool {
    true
}

/// A palette as a list of hex colors
#[derive(Debug, Deserialize, Clone)]
pub struct PaletteConfig {
    /// `#RGB`, `#RRGGBB` or `#RRGGBBAA`
    pub colors: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TilingConfig {
    /// Rows per slice; 0 disables slicing
    #[serde(default = "default_rows_per_slice")]
    pub rows_per_slice: usize,
}

fn default_rows_per_slice() -> usize {
    64
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            rows_per_slice: default_rows_per_slice(),
        }
    }
}

/// Metric selectable from config and CLI.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[default]
    Euclidean,
    /// Rec.601 channel weights
    Weighted,
    Manhattan,
}

impl ColorMetric for MetricKind {
    fn distance(&self, a: WorkingColor, b: WorkingColor) -> f32 {
        match self {
            MetricKind::Euclidean => Euclidean.distance(a, b),
            MetricKind::Weighted => WeightedEuclidean::default().distance(a, b),
            MetricKind::Manhattan => Manhattan.distance(a, b),
        }
    }
}

impl AppConfig {
    /// Parse a YAML document
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Read and parse a config file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Load configuration from `path`, else [`CONFIG_ENV`], else the
    /// built-in config. Falls back to defaults on any error.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let loaded = match &path {
            Some(path) => Self::load_from_path(path),
            None => Self::from_yaml(EMBEDDED_CONFIG),
        };

        let source = match &path {
            Some(path) => path.display().to_string(),
            None => "built-in".to_string(),
        };
        match loaded {
            Ok(config) => {
                tracing::info!(
                    %source,
                    palettes = config.palettes.len(),
                    "Loaded configuration"
                );
                config
            }
            Err(e) => {
                tracing::warn!(%source, %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Build a named palette
    pub fn palette(&self, name: &str) -> Result<Palette, ConfigError> {
        let entry = self
            .palettes
            .get(name)
            .ok_or_else(|| ConfigError::UnknownPalette(name.to_string()))?;
        Palette::from_hex(entry.colors.as_slice()).map_err(|source| ConfigError::Palette {
            name: name.to_string(),
            source,
        })
    }

    /// Palette names, sorted
    pub fn palette_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.palettes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Parse a comma-separated color list such as `"#000,#fff"`.
pub fn parse_colors(list: &str) -> Result<Palette, PaletteError> {
    let colors: Vec<&str> = list.split(',').map(str::trim).filter(|c| !c.is_empty()).collect();
    Palette::from_hex(colors.as_slice())
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut palettes = HashMap::new();
        palettes.insert(
            "bw".to_string(),
            PaletteConfig {
                colors: vec!["#000000".to_string(), "#ffffff".to_string()],
            },
        );
        palettes.insert(
            "gray4".to_string(),
            PaletteConfig {
                colors: ["#000000", "#555555", "#aaaaaa", "#ffffff"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            },
        );

        Self {
            palettes,
            default_palette: default_palette(),
            default_algorithm: default_algorithm(),
            strength: default_strength(),
            serpentine: default_serpentine(),
            metric: MetricKind::default(),
            tiling: TilingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.default_palette, "gray4");
        assert_eq!(config.default_algorithm, "floyd-steinberg");
        assert_eq!(config.strength, 1.0);
        assert!(config.serpentine);
        assert_eq!(config.metric, MetricKind::Euclidean);
        assert_eq!(config.tiling.rows_per_slice, 64);
        assert_eq!(config.palette_names(), vec!["bw", "gray4"]);
        assert_eq!(config.palette("gray4").unwrap().len(), 4);
    }

    #[test]
    fn test_embedded_config_parses() {
        let config = AppConfig::from_yaml(EMBEDDED_CONFIG).unwrap();

        assert_eq!(config.default_palette, "gray4");
        assert!(config.palettes.contains_key("spectra6"));
        assert_eq!(config.palette("gray16").unwrap().len(), 16);
        assert_eq!(config.palette(&config.default_palette).unwrap().len(), 4);
    }

    #[test]
    fn test_config_with_minimal_fields() {
        let config = AppConfig::from_yaml("palettes: {}").unwrap();

        assert!(config.palettes.is_empty());
        assert_eq!(config.default_algorithm, "floyd-steinberg");
        assert_eq!(config.tiling.rows_per_slice, 64);
    }

    #[test]
    fn test_parse_metric_and_tiling() {
        let yaml = r##"
palettes:
  duo:
    colors: ["#000", "#fff"]
metric: manhattan
serpentine: false
tiling:
  rows_per_slice: 0
"##;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.metric, MetricKind::Manhattan);
        assert!(!config.serpentine);
        assert_eq!(config.tiling.rows_per_slice, 0);
        assert_eq!(config.palette("duo").unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_palette() {
        let config = AppConfig::default();
        match config.palette("cga") {
            Err(ConfigError::UnknownPalette(name)) => assert_eq!(name, "cga"),
            other => panic!("Expected UnknownPalette, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_palette_color() {
        let config = AppConfig::from_yaml("palettes:\n  bad:\n    colors: [\"#12\"]\n").unwrap();
        assert!(matches!(config.palette("bad"), Err(ConfigError::Palette { .. })));
    }

    #[test]
    fn test_invalid_yaml_is_parse_error() {
        let result = AppConfig::from_yaml("palettes: [unclosed");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load(Some(Path::new("/nonexistent/ditherkit.yaml")));
        assert_eq!(config.palette_names(), vec!["bw", "gray4"]);
    }

    #[test]
    fn test_parse_colors_list() {
        let palette = parse_colors("#000, #ffffff ,#ff000080").unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(palette.color(2).to_u8(), [255, 0, 0, 128]);
        assert!(parse_colors("#000,red").is_err());
    }

    #[test]
    fn test_metric_kind_dispatch() {
        let a = WorkingColor::opaque(0.0, 0.0, 0.0);
        let b = WorkingColor::opaque(0.5, 0.5, 0.5);

        assert_eq!(MetricKind::Euclidean.distance(a, b), Euclidean.distance(a, b));
        assert_eq!(MetricKind::Manhattan.distance(a, b), Manhattan.distance(a, b));
        assert_eq!(
            MetricKind::Weighted.distance(a, b),
            WeightedEuclidean::default().distance(a, b)
        );
    }
}
