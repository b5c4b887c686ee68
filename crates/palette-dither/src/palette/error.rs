//! Error types for palette operations

use std::num::ParseIntError;

use thiserror::Error;

/// Error type for parsing hex color strings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseColorError {
    /// Hex string has invalid length (must be 3, 6 or 8 digits after '#')
    #[error("invalid hex color length {0} (expected 3, 6 or 8 digits)")]
    InvalidLength(usize),
    /// Invalid hexadecimal character encountered
    #[error("invalid hex character: {0}")]
    InvalidHex(#[from] ParseIntError),
}

/// Error type for palette validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaletteError {
    /// More entries than an 8-bit index can address
    #[error("palette has {count} colors, at most {max} are supported")]
    TooManyColors { count: usize, max: usize },
    /// Invalid hex color string
    #[error("invalid color at index {index}: {source}")]
    ParseColor {
        index: usize,
        #[source]
        source: ParseColorError,
    },
}
