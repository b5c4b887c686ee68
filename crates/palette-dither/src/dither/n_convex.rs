//! N-convex dithering.
//!
//! Finds convex weights over the `n` closest palette entries whose mix is
//! as close as possible to the pixel (a least-squares fit on the simplex,
//! solved with Frank-Wolfe iterations from the nearest entry), then uses
//! them as selection weights.

use std::sync::Arc;

use crate::api::{DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder, WorkingColor};
use crate::matrix::ThresholdMatrix;
use crate::palette::Palette;

use super::candidates::{
    candidate_matrix, dot, length_sq, pick_weighted, point, sub, unit_threshold, Vec3, DEFAULT_MATRIX_SIZE,
};
use super::n_closest::validate_count;
use super::Dither;

const ITERATIONS: usize = 32;

const CONVERGED: f32 = 1e-10;

/// Convex weights over `corners` approximating `target`.
fn convex_weights(target: Vec3, corners: &[Vec3]) -> Vec<f32> {
    let mut weights = vec![0.0f32; corners.len()];
    let Some(first) = corners.first() else {
        return weights;
    };
    weights[0] = 1.0;
    let mut mix = *first;
    for _ in 0..ITERATIONS {
        let residual = sub(mix, target);
        // Vertex minimizing the linearized objective.
        let (best, _) = corners
            .iter()
            .enumerate()
            .map(|(i, &c)| (i, dot(c, residual)))
            .fold((0, f32::INFINITY), |acc, cur| if cur.1 < acc.1 { cur } else { acc });
        let direction = sub(corners[best], mix);
        let span = length_sq(direction);
        if span < CONVERGED {
            break;
        }
        let gamma = (-dot(residual, direction) / span).clamp(0.0, 1.0);
        if gamma <= 0.0 {
            break;
        }
        for w in weights.iter_mut() {
            *w *= 1.0 - gamma;
        }
        weights[best] += gamma;
        for ch in 0..3 {
            mix[ch] += gamma * direction[ch];
        }
    }
    weights
}

/// N-convex dithering.
#[derive(Debug, Clone, PartialEq)]
pub struct NConvex {
    n: usize,
    matrix: Arc<ThresholdMatrix>,
}

impl NConvex {
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

    fn candidates<M: ColorMetric + ?Sized>(&self, color: WorkingColor, metric: &M, palette: &Palette) -> Vec<(usize, f32)> {
        let closest = palette.find_n_closest(color, self.n, metric);
        let corners: Vec<Vec3> = closest.iter().map(|&(i, _)| point(palette.color(i))).collect();
        let weights = convex_weights(point(color), &corners);
        closest.into_iter().map(|(i, _)| i).zip(weights).collect()
    }
}

impl Dither for NConvex {
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
                        let mut candidates = self.candidates(color, metric, palette);
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
    use crate::color::{Euclidean, IdentityDecoder};

    #[test]
    fn test_weights_reproduce_interior_point() {
        let corners = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let w = convex_weights([0.2, 0.3, 0.0], &corners);
        assert!((w.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(w.iter().all(|&x| x >= 0.0));
        let mixed = [w[1], w[2]];
        assert!((mixed[0] - 0.2).abs() < 0.05 && (mixed[1] - 0.3).abs() < 0.05, "weights {:?}", w);
    }

    #[test]
    fn test_outside_point_projects_to_hull() {
        let corners = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let w = convex_weights([2.0, 0.0, 0.0], &corners);
        assert!((w[1] - 1.0).abs() < 1e-5, "weights {:?}", w);
    }

    #[test]
    fn test_gray_coverage() {
        let palette = Palette::new(vec![WorkingColor::BLACK, WorkingColor::WHITE]).unwrap();
        let pixels = vec![WorkingColor::gray(0.75); 64];
        let mut out = vec![0u8; 64];
        let mut region = PixelRegion::packed(&pixels, &mut out, 8, 8, 0).unwrap();
        NConvex::new(2)
            .unwrap()
            .dither(&mut region, &IdentityDecoder, &Euclidean, &palette);
        let white = out.iter().filter(|&&i| i == 1).count();
        assert!((47..=49).contains(&white), "expected about 48 white, got {}", white);
    }
}
