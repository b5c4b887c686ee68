//! Ordered (threshold matrix) dithering.

use std::sync::Arc;

use crate::api::{validate_strength, DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder};
use crate::matrix::bayer::bayer_matrix;
use crate::matrix::halftone::halftone_matrix;
use crate::matrix::void_and_cluster;
use crate::matrix::ThresholdMatrix;
use crate::palette::Palette;

use super::{quantize_with_threshold, Dither};

/// Adds `matrix[y mod n][x mod n] * strength` to the color channels before
/// the palette lookup. `y` is the absolute image row, so slices of one image
/// share a single tiling.
///
/// # Example
///
/// ```
/// use palette_dither::OrderedDither;
///
/// let bayer = OrderedDither::bayer(8, 1.0).unwrap();
/// assert_eq!(bayer.matrix().size(), 8);
/// assert!(OrderedDither::halftone(5, 1.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedDither {
    matrix: Arc<ThresholdMatrix>,
    strength: f32,
}

impl OrderedDither {
    /// Ordered dithering over any threshold matrix.
    pub fn new(matrix: Arc<ThresholdMatrix>, strength: f32) -> Result<Self, DitherError> {
        Ok(Self {
            matrix,
            strength: validate_strength(strength)?,
        })
    }

    /// Bayer matrix, `size` a power of two in `2..=256`.
    pub fn bayer(size: usize, strength: f32) -> Result<Self, DitherError> {
        Self::new(Arc::new(bayer_matrix(size)?), strength)
    }

    /// Clustered-dot halftone, `size` one of 3, 4 or 8.
    pub fn halftone(size: usize, strength: f32) -> Result<Self, DitherError> {
        Self::new(Arc::new(halftone_matrix(size)?), strength)
    }

    /// Void-and-cluster blue noise; the matrix comes from the shared cache.
    pub fn void_and_cluster(size: usize, strength: f32) -> Result<Self, DitherError> {
        Self::new(void_and_cluster::cached(size)?, strength)
    }

    /// Caller-supplied rank matrix (a permutation of `0..size²`).
    pub fn from_ranks(size: usize, ranks: Vec<u32>, strength: f32) -> Result<Self, DitherError> {
        Self::new(Arc::new(ThresholdMatrix::from_ranks(size, ranks)?), strength)
    }

    #[inline]
    pub fn matrix(&self) -> &ThresholdMatrix {
        &self.matrix
    }

    #[inline]
    pub fn strength(&self) -> f32 {
        self.strength
    }
}

impl Dither for OrderedDither {
    fn requires_sequential_processing(&self) -> bool {
        false
    }

    fn dither<P, D, M>(
        &self,
        region: &mut PixelRegion<'_, P>,
        decoder: &D,
        metric: &M,
        palette: &Palette,
    ) where
        D: PixelDecoder<P> + ?Sized,
        M: ColorMetric + ?Sized,
    {
        if palette.is_empty() {
            return;
        }
        for y in 0..region.height() {
            let ay = region.absolute_y(y);
            for x in 0..region.width() {
                let color = decoder.decode(region.pixel(x, y));
                let threshold = self.matrix.threshold(x, ay) * self.strength;
                let idx = quantize_with_threshold(palette, color, threshold, metric);
                region.set_index(x, y, idx);
            }
        }
    }
}
