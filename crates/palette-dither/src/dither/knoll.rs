//! Knoll pattern dithering.
//!
//! For each pixel, `n²` candidates are produced by repeatedly quantizing the
//! color plus the accumulated quantization error, then sorted by luminance.
//! The Bayer rank of the position selects one of them.

use std::sync::Arc;

use crate::api::{DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder, WorkingColor};
use crate::matrix::ThresholdMatrix;
use crate::palette::Palette;

use super::candidates::candidate_matrix;
use super::Dither;

const KNOLL_SIZES: [usize; 3] = [2, 4, 8];

/// Knoll (Adobe pattern) dithering.
#[derive(Debug, Clone, PartialEq)]
pub struct Knoll {
    matrix: Arc<ThresholdMatrix>,
    multiplier: f32,
}

impl Knoll {
    /// `size` is the Bayer size, one of 2, 4 or 8.
    pub fn new(size: usize) -> Result<Self, DitherError> {
        if !KNOLL_SIZES.contains(&size) {
            return Err(DitherError::InvalidMatrixSize {
                size,
                reason: "knoll size must be 2, 4 or 8",
            });
        }
        Ok(Self {
            matrix: candidate_matrix(size)?,
            multiplier: 1.0,
        })
    }

    /// Scale of the accumulated error added between candidates.
    pub fn with_multiplier(mut self, multiplier: f32) -> Result<Self, DitherError> {
        if !multiplier.is_finite() || !(0.0..=1.0).contains(&multiplier) {
            return Err(DitherError::InvalidParameter {
                name: "multiplier",
                reason: format!("must be in [0, 1], got {}", multiplier),
            });
        }
        self.multiplier = multiplier;
        Ok(self)
    }

    fn candidates<M: ColorMetric + ?Sized>(&self, color: WorkingColor, metric: &M, palette: &Palette) -> Vec<usize> {
        let count = self.matrix.size() * self.matrix.size();
        let target = color.channels();
        let mut error = [0.0f32; 4];
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let attempt = WorkingColor::from_channels([
                target[0] + error[0] * self.multiplier,
                target[1] + error[1] * self.multiplier,
                target[2] + error[2] * self.multiplier,
                target[3] + error[3] * self.multiplier,
            ]);
            let (idx, chosen, _) = palette.find_nearest_color(attempt, metric);
            out.push(idx);
            let chosen = chosen.channels();
            for c in 0..4 {
                error[c] += target[c] - chosen[c];
            }
        }
        out.sort_by(|&a, &b| palette.color(a).luminance().total_cmp(&palette.color(b).luminance()));
        out
    }
}

impl Dither for Knoll {
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
                let idx = match palette.is_exact(color, metric) {
                    Some(idx) => idx,
                    None => self.candidates(color, metric, palette)[self.matrix.rank(x, ay) as usize],
                };
                region.set_index(x, y, idx as u8);
            }
        }
    }
}
