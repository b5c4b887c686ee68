use std::path::PathBuf;

use palette_dither::{DitherError, PaletteError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Unknown palette: {0}")]
    UnknownPalette(String),

    #[error("Invalid palette {name}: {source}")]
    Palette {
        name: String,
        #[source]
        source: PaletteError,
    },
}

#[derive(Debug, Error)]
pub enum ImageIoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG decode error: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("PNG encode error: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("Unsupported PNG layout: {0}")]
    Unsupported(String),

    #[error("Palette must have 1 to 256 colors, got {0}")]
    PaletteSize(usize),

    #[error("Index buffer holds {actual} pixels, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Invalid algorithm parameters: {0}")]
    Dither(#[from] DitherError),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Dither error: {0}")]
    Dither(#[from] DitherError),
}
