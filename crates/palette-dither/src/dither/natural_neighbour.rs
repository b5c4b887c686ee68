//! Natural-neighbour style dithering.
//!
//! Up to eight closest palette entries are considered in ascending distance.
//! An entry is dropped when an already kept entry lies closer to it than the
//! pixel does, leaving the entries that surround the pixel rather than ones
//! hiding behind a nearer neighbour. Kept entries are weighted by inverse
//! squared distance.

use std::sync::Arc;

use crate::api::{DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder, WorkingColor};
use crate::matrix::ThresholdMatrix;
use crate::palette::Palette;

use super::candidates::{
    candidate_matrix, length_sq, pick_weighted, point, sub, unit_threshold, DEFAULT_MATRIX_SIZE,
};
use super::Dither;

const MAX_NEIGHBOURS: usize = 8;

fn neighbour_candidates<M: ColorMetric + ?Sized>(
    color: WorkingColor,
    metric: &M,
    palette: &Palette,
) -> Vec<(usize, f32)> {
    let p = point(color);
    let mut kept: Vec<(usize, f32)> = Vec::with_capacity(MAX_NEIGHBOURS);
    for (idx, _) in palette.find_n_closest(color, MAX_NEIGHBOURS, metric) {
        let c = point(palette.color(idx));
        let to_pixel = length_sq(sub(c, p));
        let shadowed = kept
            .iter()
            .any(|&(k, _)| length_sq(sub(c, point(palette.color(k)))) < to_pixel);
        if !shadowed {
            kept.push((idx, 1.0 / to_pixel.max(f32::EPSILON)));
        }
    }
    kept
}

/// Natural-neighbour interpolation dithering.
#[derive(Debug, Clone, PartialEq)]
pub struct NaturalNeighbour {
    matrix: Arc<ThresholdMatrix>,
}

impl NaturalNeighbour {
    pub fn new() -> Result<Self, DitherError> {
        Self::with_matrix_size(DEFAULT_MATRIX_SIZE)
    }

    pub fn with_matrix_size(size: usize) -> Result<Self, DitherError> {
        Ok(Self {
            matrix: candidate_matrix(size)?,
        })
    }
}

impl Dither for NaturalNeighbour {
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
                        let mut candidates = neighbour_candidates(color, metric, palette);
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
    fn test_hidden_entries_are_dropped() {
        let palette = Palette::from_hex(&["#000", "#333", "#fff"]).unwrap();
        // 0.3 sits between #333 (0.2) and white; black hides behind #333.
        let candidates = neighbour_candidates(WorkingColor::gray(0.3), &Euclidean, &palette);
        let kept: Vec<usize> = candidates.iter().map(|&(i, _)| i).collect();
        assert_eq!(kept, vec![1, 2]);
    }

    #[test]
    fn test_closer_entries_weigh_more() {
        let palette = Palette::new(vec![WorkingColor::BLACK, WorkingColor::WHITE]).unwrap();
        let candidates = neighbour_candidates(WorkingColor::gray(0.2), &Euclidean, &palette);
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].1 > candidates[1].1);
    }
}
