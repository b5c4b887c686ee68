//! Tetrahedral (TIN) dithering over the four closest palette colors.
//!
//! The pixel's barycentric coordinates in the tetrahedron of its four
//! closest entries become selection weights. Flat tetrahedra and pixels
//! outside it fall back to [`Barycentric`](super::Barycentric) candidates.

use std::sync::Arc;

use crate::api::{DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder, WorkingColor};
use crate::matrix::ThresholdMatrix;
use crate::palette::Palette;

use super::barycentric::barycentric_candidates;
use super::candidates::{
    candidate_matrix, inside, pick_weighted, point, tetrahedron_weights, unit_threshold, DEFAULT_MATRIX_SIZE,
};
use super::Dither;

fn tin_candidates<M: ColorMetric + ?Sized>(color: WorkingColor, metric: &M, palette: &Palette) -> Vec<(usize, f32)> {
    let closest = palette.find_n_closest(color, 4, metric);
    if let [(a, _), (b, _), (c, _), (d, _)] = closest[..] {
        let weights = tetrahedron_weights(
            point(color),
            point(palette.color(a)),
            point(palette.color(b)),
            point(palette.color(c)),
            point(palette.color(d)),
        )
        .and_then(inside);
        if let Some([wa, wb, wc, wd]) = weights {
            return vec![(a, wa), (b, wb), (c, wc), (d, wd)];
        }
    }
    barycentric_candidates(color, metric, palette)
}

/// Tetrahedral interpolation dithering.
#[derive(Debug, Clone, PartialEq)]
pub struct Tin {
    matrix: Arc<ThresholdMatrix>,
}

impl Tin {
    pub fn new() -> Result<Self, DitherError> {
        Self::with_matrix_size(DEFAULT_MATRIX_SIZE)
    }

    pub fn with_matrix_size(size: usize) -> Result<Self, DitherError> {
        Ok(Self {
            matrix: candidate_matrix(size)?,
        })
    }
}

impl Dither for Tin {
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
                        let mut candidates = tin_candidates(color, metric, palette);
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
    use crate::color::Euclidean;

    #[test]
    fn test_inside_tetrahedron() {
        let palette = Palette::from_hex(&["#000000", "#ff0000", "#00ff00", "#0000ff", "#ffffff"]).unwrap();
        let color = WorkingColor::opaque(0.2, 0.1, 0.3);
        let candidates = tin_candidates(color, &Euclidean, &palette);
        assert_eq!(candidates.len(), 4);
        for (axis, expected) in [0.2f32, 0.1, 0.3].into_iter().enumerate() {
            let mixed: f32 = candidates
                .iter()
                .map(|&(i, w)| w * palette.color(i).color_channels()[axis])
                .sum();
            assert!((mixed - expected).abs() < 1e-4, "axis {} mixed to {}", axis, mixed);
        }
    }

    #[test]
    fn test_flat_palette_falls_back() {
        // Four grays are collinear, so no tetrahedron exists.
        let palette = Palette::from_hex(&["#000", "#555", "#aaa", "#fff"]).unwrap();
        let candidates = tin_candidates(WorkingColor::gray(0.5), &Euclidean, &palette);
        assert!(candidates.len() <= 3);
        assert!(candidates.iter().all(|&(i, _)| i == 1 || i == 2));
    }
}
