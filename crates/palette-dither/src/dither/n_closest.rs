//! N-closest dithering: inverse-distance weights over the `n` closest
//! palette entries.

use std::sync::Arc;

use crate::api::{DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder};
use crate::matrix::ThresholdMatrix;
use crate::palette::Palette;

use super::candidates::{candidate_matrix, pick_weighted, unit_threshold, DEFAULT_MATRIX_SIZE};
use super::Dither;

/// Largest candidate count for the N-closest and N-convex strategies.
pub const MAX_CANDIDATES: usize = 16;

pub(crate) fn validate_count(n: usize) -> Result<usize, DitherError> {
    if !(1..=MAX_CANDIDATES).contains(&n) {
        return Err(DitherError::InvalidParameter {
            name: "n",
            reason: format!("must be between 1 and {}, got {}", MAX_CANDIDATES, n),
        });
    }
    Ok(n)
}

/// N-closest dithering.
#[derive(Debug, Clone, PartialEq)]
pub struct NClosest {
    n: usize,
    matrix: Arc<ThresholdMatrix>,
}

impl NClosest {
    pub fn new(n: usize) -> Result<Self, DitherError> {
        Ok(Self {
            n: validate_count(n)?,
            matrix: candidate_matrix(DEFAULT_MATRIX_SIZE)?,
        })
    }

    pub fn with_matrix_size(mut self, size: usize) -> Result<Self, DitherError> {
        self.matrix = candidate_matrix(size)?;
        Ok(self)
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }
}

impl Dither for NClosest {
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
                    Some(idx) => idx as u8,
                    None => {
                        let mut candidates: Vec<(usize, f32)> = palette
                            .find_n_closest(color, self.n, metric)
                            .into_iter()
                            .map(|(idx, dist)| (idx, 1.0 / dist.max(f32::EPSILON)))
                            .collect();
                        pick_weighted(palette, &mut candidates, unit_threshold(&self.matrix, x, ay))
                    }
                };
                region.set_index(x, y, idx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Euclidean, IdentityDecoder, WorkingColor};

    #[test]
    fn test_single_candidate_is_nearest() {
        let palette = Palette::from_hex(&["#000", "#777", "#fff"]).unwrap();
        let pixels: Vec<WorkingColor> = (0..16).map(|i| WorkingColor::gray(i as f32 / 15.0)).collect();
        let mut out = vec![0u8; 16];
        let mut region = PixelRegion::packed(&pixels, &mut out, 16, 1, 0).unwrap();
        NClosest::new(1)
            .unwrap()
            .dither(&mut region, &IdentityDecoder, &Euclidean, &palette);
        for (px, &idx) in pixels.iter().zip(&out) {
            assert_eq!(idx as usize, palette.find_nearest(*px, &Euclidean).0);
        }
    }

    #[test]
    fn test_only_closest_entries_used() {
        let palette = Palette::from_hex(&["#000", "#444", "#888", "#fff"]).unwrap();
        let pixels = vec![WorkingColor::gray(0.4); 64];
        let mut out = vec![0u8; 64];
        let mut region = PixelRegion::packed(&pixels, &mut out, 8, 8, 0).unwrap();
        NClosest::new(2)
            .unwrap()
            .dither(&mut region, &IdentityDecoder, &Euclidean, &palette);
        assert!(out.iter().all(|&i| i == 1 || i == 2));
        assert!(out.contains(&1) && out.contains(&2));
    }

    #[test]
    fn test_rejects_bad_count() {
        assert!(NClosest::new(0).is_err());
        assert!(NClosest::new(MAX_CANDIDATES + 1).is_err());
    }
}
