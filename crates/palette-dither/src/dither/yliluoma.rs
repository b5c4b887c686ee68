//! Yliluoma's mixing-plan dithering (algorithm 2).
//!
//! A plan of `steps` palette entries is grown greedily. At each round every
//! candidate color is tried at 1, 2, 4, ... copies (up to the current plan
//! length) and the color and count whose mean with the plan so far lands
//! closest to the pixel are appended. The finished plan is sorted by
//! luminance and the threshold rank of the position selects one entry.

use std::sync::Arc;

use crate::api::{DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder, WorkingColor};
use crate::matrix::ThresholdMatrix;
use crate::palette::Palette;

use super::candidates::{candidate_matrix, DEFAULT_MATRIX_SIZE};
use super::Dither;

/// Palettes larger than this only consider their closest colors.
const MAX_PLAN_CANDIDATES: usize = 16;

const MAX_STEPS: usize = 64;

/// Yliluoma mixing-plan dithering.
#[derive(Debug, Clone, PartialEq)]
pub struct Yliluoma {
    matrix: Arc<ThresholdMatrix>,
}

impl Yliluoma {
    pub fn new() -> Result<Self, DitherError> {
        Self::with_matrix_size(DEFAULT_MATRIX_SIZE)
    }

    /// Bayer size of the threshold matrix; also sets the plan length.
    pub fn with_matrix_size(size: usize) -> Result<Self, DitherError> {
        Ok(Self {
            matrix: candidate_matrix(size)?,
        })
    }

    fn steps(&self) -> usize {
        (self.matrix.size() * self.matrix.size()).min(MAX_STEPS)
    }

    fn plan<M: ColorMetric + ?Sized>(&self, color: WorkingColor, metric: &M, palette: &Palette) -> Vec<usize> {
        let pool: Vec<usize> = if palette.len() > MAX_PLAN_CANDIDATES {
            palette
                .find_n_closest(color, MAX_PLAN_CANDIDATES, metric)
                .into_iter()
                .map(|(idx, _)| idx)
                .collect()
        } else {
            (0..palette.len()).collect()
        };

        let steps = self.steps();
        let mut plan = Vec::with_capacity(steps);
        let mut sum = [0.0f32; 4];
        while plan.len() < steps {
            let max_copies = plan.len().max(1);
            let mut best: Option<(usize, usize, f32)> = None;
            for &idx in &pool {
                let c = palette.color(idx).channels();
                let mut copies = 1;
                while copies <= max_copies {
                    let total = (plan.len() + copies) as f32;
                    let mean = WorkingColor::from_channels([
                        (sum[0] + c[0] * copies as f32) / total,
                        (sum[1] + c[1] * copies as f32) / total,
                        (sum[2] + c[2] * copies as f32) / total,
                        (sum[3] + c[3] * copies as f32) / total,
                    ]);
                    let penalty = metric.distance(color, mean);
                    if best.map_or(true, |(_, _, p)| penalty < p) {
                        best = Some((idx, copies, penalty));
                    }
                    copies *= 2;
                }
            }
            let Some((idx, copies, _)) = best else {
                break;
            };
            let c = palette.color(idx).channels();
            let copies = copies.min(steps - plan.len());
            for ch in 0..4 {
                sum[ch] += c[ch] * copies as f32;
            }
            plan.extend(std::iter::repeat(idx).take(copies));
        }
        plan.sort_by(|&a, &b| palette.color(a).luminance().total_cmp(&palette.color(b).luminance()));
        plan
    }
}

impl Dither for Yliluoma {
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
        let cells = self.matrix.size() * self.matrix.size();
        for y in 0..region.height() {
            let ay = region.absolute_y(y);
            for x in 0..region.width() {
                let color = decoder.decode(region.pixel(x, y));
                let idx = match palette.is_exact(color, metric) {
                    Some(idx) => idx,
                    None => {
                        let plan = self.plan(color, metric, palette);
                        let rank = self.matrix.rank(x, ay) as usize;
                        plan[rank * plan.len() / cells]
                    }
                };
                region.set_index(x, y, idx as u8);
            }
        }
    }
}
