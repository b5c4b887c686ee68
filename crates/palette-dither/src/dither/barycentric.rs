//! Barycentric dithering over the three closest palette colors.
//!
//! The pixel is projected onto the triangle of its three closest entries.
//! Inside the triangle, the barycentric weights become selection
//! probabilities; outside (or for a degenerate triangle) the two closest
//! entries are blended along their segment, and with a single usable entry
//! the nearest color is used.

use std::sync::Arc;

use crate::api::{DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder, WorkingColor};
use crate::matrix::ThresholdMatrix;
use crate::palette::Palette;

use super::candidates::{
    candidate_matrix, inside, pick_weighted, point, segment_weight, triangle_weights, unit_threshold,
    DEFAULT_MATRIX_SIZE,
};
use super::Dither;

/// Weighted candidates from the closest triangle, segment or point.
pub(crate) fn barycentric_candidates<M: ColorMetric + ?Sized>(
    color: WorkingColor,
    metric: &M,
    palette: &Palette,
) -> Vec<(usize, f32)> {
    let closest = palette.find_n_closest(color, 3, metric);
    let p = point(color);
    if let [(a, _), (b, _), (c, _)] = closest[..] {
        let weights = triangle_weights(
            p,
            point(palette.color(a)),
            point(palette.color(b)),
            point(palette.color(c)),
        )
        .and_then(inside);
        if let Some([wa, wb, wc]) = weights {
            return vec![(a, wa), (b, wb), (c, wc)];
        }
    }
    match closest[..] {
        [(a, _), (b, _), ..] => match segment_weight(p, point(palette.color(a)), point(palette.color(b))) {
            Some(t) => vec![(a, 1.0 - t), (b, t)],
            None => vec![(a, 1.0)],
        },
        [(a, _)] => vec![(a, 1.0)],
        [] => Vec::new(),
    }
}

/// Barycentric triangle dithering.
#[derive(Debug, Clone, PartialEq)]
pub struct Barycentric {
    matrix: Arc<ThresholdMatrix>,
}

impl Barycentric {
    pub fn new() -> Result<Self, DitherError> {
        Self::with_matrix_size(DEFAULT_MATRIX_SIZE)
    }

    pub fn with_matrix_size(size: usize) -> Result<Self, DitherError> {
        Ok(Self {
            matrix: candidate_matrix(size)?,
        })
    }
}

impl Dither for Barycentric {
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
                        let mut candidates = barycentric_candidates(color, metric, palette);
                        pick_weighted(palette, &mut candidates, unit_threshold(&self.matrix, x, ay))
                    }
                };
                region.set_index(x, y, idx);
            }
        }
    }
}
