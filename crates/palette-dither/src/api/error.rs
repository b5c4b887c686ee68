//! Unified error type for the palette-dither public API.

use thiserror::Error;

use crate::palette::PaletteError;

/// Configuration error raised when a ditherer or region is constructed.
///
/// Nothing in the pixel loops returns an error: every strategy validates its
/// parameters up front and then runs as a total function over the region.
///
/// # Example
///
/// ```
/// use palette_dither::{DitherError, OrderedDither};
///
/// let err = OrderedDither::bayer(6, 1.0).unwrap_err();
/// assert!(matches!(err, DitherError::InvalidMatrixSize { size: 6, .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DitherError {
    /// Threshold matrix size rejected (e.g. not a power of two for Bayer)
    #[error("invalid matrix size {size}: {reason}")]
    InvalidMatrixSize { size: usize, reason: &'static str },
    /// Strength outside `[0, 1]` or not finite
    #[error("strength must be a finite value in [0, 1], got {0}")]
    InvalidStrength(f32),
    /// Any other out-of-range strategy parameter
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    /// Row stride shorter than the region width
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { stride: usize, width: usize },
    /// Buffer too short for the region's rows at the given stride
    #[error("{buffer} buffer holds {len} elements, region needs {required}")]
    RegionTooSmall {
        buffer: &'static str,
        len: usize,
        required: usize,
    },
    /// Palette validation error
    #[error("palette error: {0}")]
    Palette(#[from] PaletteError),
}

/// Reject strengths outside `[0, 1]`.
pub(crate) fn validate_strength(strength: f32) -> Result<f32, DitherError> {
    if strength.is_finite() && (0.0..=1.0).contains(&strength) {
        Ok(strength)
    } else {
        Err(DitherError::InvalidStrength(strength))
    }
}
