//! Direct Binary Search: local-search refinement of a quantized image.
//!
//! The perceived error is modelled by filtering the per-pixel difference
//! `original - assigned` with a Gaussian (the HVS filter) and summing the
//! luminance-weighted squares of the filtered field `E`:
//!
//! ```text
//! total = sum_p sum_c lambda_c * E_c(p)²,   E_c = G * (original_c - assigned_c)
//! ```
//!
//! Starting from nearest-color quantization, each pass visits the pixels in
//! a freshly shuffled order and tries
//!
//! 1. replacing the pixel's index with every other palette index, keeping
//!    the best strictly improving one, then
//! 2. swapping its index with each of its 8 neighbours, keeping a swap only
//!    if it strictly lowers the total.
//!
//! Every move's effect on `total` is computed exactly from `E` and applied
//! incrementally, so the total never increases. The search stops after a
//! pass without accepted moves or after `max_iterations` passes.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::api::{DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder};
use crate::palette::Palette;

use super::Dither;

/// Per-channel weights of the error total (luma for color, small for alpha).
const CHANNEL_WEIGHTS: [f32; 4] = [0.299, 0.587, 0.114, 0.1];

/// Improvements smaller than this are treated as no change.
const IMPROVEMENT_EPSILON: f32 = 1e-9;

/// Outcome of one search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DbsReport {
    pub iterations: usize,
    pub accepted_moves: usize,
    pub initial_error: f32,
    pub final_error: f32,
    pub converged: bool,
}

/// Direct Binary Search ditherer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectBinarySearch {
    radius: usize,
    sigma: f32,
    max_iterations: usize,
    seed: u64,
}

impl Default for DirectBinarySearch {
    fn default() -> Self {
        Self {
            radius: 2,
            sigma: 1.5,
            max_iterations: 10,
            seed: 0,
        }
    }
}

impl DirectBinarySearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter radius in pixels (`1..=8`).
    pub fn with_radius(mut self, radius: usize) -> Result<Self, DitherError> {
        if !(1..=8).contains(&radius) {
            return Err(DitherError::InvalidParameter {
                name: "radius",
                reason: format!("must be between 1 and 8, got {}", radius),
            });
        }
        self.radius = radius;
        Ok(self)
    }

    /// Gaussian deviation of the HVS filter.
    pub fn with_sigma(mut self, sigma: f32) -> Result<Self, DitherError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(DitherError::InvalidParameter {
                name: "sigma",
                reason: format!("must be a positive finite value, got {}", sigma),
            });
        }
        self.sigma = sigma;
        Ok(self)
    }

    #[inline]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[inline]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Dither `region` and report how the search went.
    pub fn run<P, D, M>(
        &self,
        region: &mut PixelRegion<'_, P>,
        decoder: &D,
        metric: &M,
        palette: &Palette,
    ) -> DbsReport
    where
        D: PixelDecoder<P> + ?Sized,
        M: ColorMetric + ?Sized,
    {
        if palette.is_empty() || region.is_empty() {
            return DbsReport {
                iterations: 0,
                accepted_moves: 0,
                initial_error: 0.0,
                final_error: 0.0,
                converged: true,
            };
        }
        let mut state = SearchState::new(region, decoder, metric, palette, self.radius, self.sigma);
        let initial_error = state.total_error();
        let mut order: Vec<usize> = (0..state.indices.len()).collect();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut iterations = 0;
        let mut accepted_moves = 0;
        let mut converged = false;
        while iterations < self.max_iterations {
            order.shuffle(&mut rng);
            let accepted = state.pass(&order);
            iterations += 1;
            accepted_moves += accepted;
            if accepted == 0 {
                converged = true;
                break;
            }
        }

        for (i, &idx) in state.indices.iter().enumerate() {
            region.set_index(i % state.width, i / state.width, idx);
        }
        let report = DbsReport {
            iterations,
            accepted_moves,
            initial_error,
            final_error: state.total_error(),
            converged,
        };
        debug!(?report, "direct binary search finished");
        report
    }
}

impl Dither for DirectBinarySearch {
    fn requires_sequential_processing(&self) -> bool {
        true
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
        self.run(region, decoder, metric, palette);
    }
}

/// Incrementally maintained filtered error field.
struct SearchState {
    width: usize,
    height: usize,
    radius: isize,
    kernel: Vec<f32>,
    palette: Vec<[f32; 4]>,
    indices: Vec<u8>,
    field: Vec<[f32; 4]>,
}

impl SearchState {
    fn new<P, D, M>(
        region: &PixelRegion<'_, P>,
        decoder: &D,
        metric: &M,
        palette: &Palette,
        radius: usize,
        sigma: f32,
    ) -> Self
    where
        D: PixelDecoder<P> + ?Sized,
        M: ColorMetric + ?Sized,
    {
        let (width, height) = (region.width(), region.height());
        let r = radius as isize;
        let side = 2 * radius + 1;
        let two_sigma_sq = 2.0 * sigma * sigma;
        let mut kernel = Vec::with_capacity(side * side);
        for dy in -r..=r {
            for dx in -r..=r {
                kernel.push((-((dx * dx + dy * dy) as f32) / two_sigma_sq).exp());
            }
        }
        let norm: f32 = kernel.iter().sum();
        kernel.iter_mut().for_each(|k| *k /= norm);

        let mut state = Self {
            width,
            height,
            radius: r,
            kernel,
            palette: palette.colors().iter().map(|c| c.channels()).collect(),
            indices: Vec::with_capacity(width * height),
            field: vec![[0.0; 4]; width * height],
        };
        for y in 0..height {
            for x in 0..width {
                let color = decoder.decode(region.pixel(x, y));
                let (idx, _) = palette.find_nearest(color, metric);
                state.indices.push(idx as u8);
                let original = color.channels();
                let assigned = state.palette[idx];
                let diff = [
                    original[0] - assigned[0],
                    original[1] - assigned[1],
                    original[2] - assigned[2],
                    original[3] - assigned[3],
                ];
                state.add_impulse(y * width + x, diff);
            }
        }
        state
    }

    #[inline]
    fn weight(&self, dx: isize, dy: isize) -> f32 {
        let r = self.radius;
        if dx.abs() > r || dy.abs() > r {
            return 0.0;
        }
        let side = 2 * r + 1;
        self.kernel[((dy + r) * side + dx + r) as usize]
    }

    /// Clipped window `[x0, x1) x [y0, y1)` around a pixel span.
    fn window(&self, min_x: usize, min_y: usize, max_x: usize, max_y: usize) -> (usize, usize, usize, usize) {
        let r = self.radius as usize;
        (
            min_x.saturating_sub(r),
            min_y.saturating_sub(r),
            (max_x + r + 1).min(self.width),
            (max_y + r + 1).min(self.height),
        )
    }

    fn add_impulse(&mut self, q: usize, delta: [f32; 4]) {
        let (qx, qy) = (q % self.width, q / self.width);
        let (x0, y0, x1, y1) = self.window(qx, qy, qx, qy);
        for py in y0..y1 {
            for px in x0..x1 {
                let g = self.weight(px as isize - qx as isize, py as isize - qy as isize);
                let cell = &mut self.field[py * self.width + px];
                for c in 0..4 {
                    cell[c] += g * delta[c];
                }
            }
        }
    }

    /// Change of the total when `E` gains `g(p - q) * delta` around `q`.
    fn toggle_delta(&self, q: usize, delta: [f32; 4]) -> f32 {
        let (qx, qy) = (q % self.width, q / self.width);
        let (x0, y0, x1, y1) = self.window(qx, qy, qx, qy);
        let mut change = 0.0;
        for py in y0..y1 {
            for px in x0..x1 {
                let g = self.weight(px as isize - qx as isize, py as isize - qy as isize);
                let e = self.field[py * self.width + px];
                for c in 0..4 {
                    change += CHANNEL_WEIGHTS[c] * (2.0 * g * delta[c] * e[c] + g * g * delta[c] * delta[c]);
                }
            }
        }
        change
    }

    /// Change of the total for simultaneous impulses at `a` and `b`.
    fn swap_delta(&self, a: usize, delta_a: [f32; 4], b: usize, delta_b: [f32; 4]) -> f32 {
        let (ax, ay) = (a % self.width, a / self.width);
        let (bx, by) = (b % self.width, b / self.width);
        let (x0, y0, x1, y1) = self.window(ax.min(bx), ay.min(by), ax.max(bx), ay.max(by));
        let mut change = 0.0;
        for py in y0..y1 {
            for px in x0..x1 {
                let ga = self.weight(px as isize - ax as isize, py as isize - ay as isize);
                let gb = self.weight(px as isize - bx as isize, py as isize - by as isize);
                let e = self.field[py * self.width + px];
                for c in 0..4 {
                    let shifted = e[c] + ga * delta_a[c] + gb * delta_b[c];
                    change += CHANNEL_WEIGHTS[c] * (shifted * shifted - e[c] * e[c]);
                }
            }
        }
        change
    }

    /// `assigned(from) - assigned(to)`, the change of `original - assigned`.
    #[inline]
    fn reassign_delta(&self, from: u8, to: u8) -> [f32; 4] {
        let a = self.palette[from as usize];
        let b = self.palette[to as usize];
        [a[0] - b[0], a[1] - b[1], a[2] - b[2], a[3] - b[3]]
    }

    fn total_error(&self) -> f32 {
        self.field
            .iter()
            .map(|e| (0..4).map(|c| CHANNEL_WEIGHTS[c] * e[c] * e[c]).sum::<f32>())
            .sum()
    }

    /// One pass over `order`; returns the number of accepted moves.
    fn pass(&mut self, order: &[usize]) -> usize {
        let mut accepted = 0;
        for &q in order {
            // Toggle: best strictly improving replacement index.
            let current = self.indices[q];
            let mut best: Option<(u8, f32)> = None;
            for candidate in 0..self.palette.len() as u16 {
                let candidate = candidate as u8;
                if candidate == current {
                    continue;
                }
                let change = self.toggle_delta(q, self.reassign_delta(current, candidate));
                if change < -IMPROVEMENT_EPSILON && best.map_or(true, |(_, b)| change < b) {
                    best = Some((candidate, change));
                }
            }
            if let Some((candidate, _)) = best {
                let delta = self.reassign_delta(current, candidate);
                self.add_impulse(q, delta);
                self.indices[q] = candidate;
                accepted += 1;
            }

            // Swap with each of the 8 neighbours.
            let (qx, qy) = ((q % self.width) as isize, (q / self.width) as isize);
            for (dx, dy) in NEIGHBOURS {
                let (nx, ny) = (qx + dx, qy + dy);
                if nx < 0 || ny < 0 || nx as usize >= self.width || ny as usize >= self.height {
                    continue;
                }
                let n = ny as usize * self.width + nx as usize;
                let (mine, theirs) = (self.indices[q], self.indices[n]);
                if mine == theirs {
                    continue;
                }
                let delta_q = self.reassign_delta(mine, theirs);
                let delta_n = self.reassign_delta(theirs, mine);
                if self.swap_delta(q, delta_q, n, delta_n) < -IMPROVEMENT_EPSILON {
                    self.add_impulse(q, delta_q);
                    self.add_impulse(n, delta_n);
                    self.indices.swap(q, n);
                    accepted += 1;
                }
            }
        }
        accepted
    }
}

const NEIGHBOURS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];
