//! Per-block content statistics.

use crate::color::WorkingColor;

use super::ContentClass;

const EXTREME_DARK: f32 = 0.12;
const EXTREME_BRIGHT: f32 = 0.88;
const STRUCTURE_EDGE: f32 = 0.1;
const STRUCTURE_COHERENCE: f32 = 0.5;
const DETAIL_VARIANCE: f32 = 0.015;
const SMOOTH_COHERENCE: f32 = 0.6;
const SMOOTH_MIN_EDGE: f32 = 0.02;

/// Largest Sobel magnitude on a `[0, 1]` image is `4 * sqrt(2)`; normalize
/// by 4 so a hard step edge reads about 1.
const SOBEL_SCALE: f32 = 0.25;

/// Statistics of one block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlockStats {
    /// Mean normalized Sobel magnitude.
    pub edge: f32,
    /// Mean per-channel variance of c1..c3.
    pub variance: f32,
    /// Mean luminance.
    pub brightness: f32,
    /// Structure-tensor coherence in `[0, 1]`; 1 for a single gradient
    /// direction.
    pub coherence: f32,
}

impl BlockStats {
    pub fn classify(&self) -> ContentClass {
        if self.brightness < EXTREME_DARK || self.brightness > EXTREME_BRIGHT {
            ContentClass::Extreme
        } else if self.edge > STRUCTURE_EDGE && self.coherence > STRUCTURE_COHERENCE {
            ContentClass::Structure
        } else if self.variance > DETAIL_VARIANCE {
            ContentClass::Detail
        } else if self.coherence > SMOOTH_COHERENCE && self.edge > SMOOTH_MIN_EDGE {
            ContentClass::Smooth
        } else {
            ContentClass::Balanced
        }
    }
}

/// Decoded image in row-major order with its luminance plane.
pub(crate) struct Plane<'c> {
    pub colors: &'c [WorkingColor],
    pub luma: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl<'c> Plane<'c> {
    pub fn new(colors: &'c [WorkingColor], width: usize, height: usize) -> Self {
        Self {
            colors,
            luma: colors.iter().map(WorkingColor::luminance).collect(),
            width,
            height,
        }
    }

    #[inline]
    fn luma_at(&self, x: isize, y: isize) -> f32 {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.luma[y * self.width + x]
    }

    /// Sobel gradient at `(x, y)` with edge-clamped borders.
    fn sobel(&self, x: usize, y: usize) -> (f32, f32) {
        let (x, y) = (x as isize, y as isize);
        let l = |dx: isize, dy: isize| self.luma_at(x + dx, y + dy);
        let gx = (l(1, -1) + 2.0 * l(1, 0) + l(1, 1)) - (l(-1, -1) + 2.0 * l(-1, 0) + l(-1, 1));
        let gy = (l(-1, 1) + 2.0 * l(0, 1) + l(1, 1)) - (l(-1, -1) + 2.0 * l(0, -1) + l(1, -1));
        (gx, gy)
    }

    /// Statistics of the block covering `[x0, x1) x [y0, y1)`.
    pub fn block(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> BlockStats {
        let count = ((x1 - x0) * (y1 - y0)) as f32;
        let mut edge = 0.0;
        let mut brightness = 0.0;
        let (mut jxx, mut jyy, mut jxy) = (0.0f32, 0.0f32, 0.0f32);
        let mut sum = [0.0f32; 3];
        let mut sum_sq = [0.0f32; 3];
        for y in y0..y1 {
            for x in x0..x1 {
                let (gx, gy) = self.sobel(x, y);
                edge += (gx * gx + gy * gy).sqrt() * SOBEL_SCALE;
                jxx += gx * gx;
                jyy += gy * gy;
                jxy += gx * gy;
                let i = y * self.width + x;
                brightness += self.luma[i];
                for (c, v) in self.colors[i].color_channels().into_iter().enumerate() {
                    sum[c] += v;
                    sum_sq[c] += v * v;
                }
            }
        }
        let variance = (0..3)
            .map(|c| {
                let mean = sum[c] / count;
                (sum_sq[c] / count - mean * mean).max(0.0)
            })
            .sum::<f32>()
            / 3.0;
        let trace = jxx + jyy;
        let coherence = if trace > 1e-8 {
            ((jxx - jyy).powi(2) + 4.0 * jxy * jxy).sqrt() / trace
        } else {
            0.0
        };
        BlockStats {
            edge: edge / count,
            variance,
            brightness: brightness / count,
            coherence: coherence.min(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_of(colors: &[WorkingColor], w: usize, h: usize) -> BlockStats {
        Plane::new(colors, w, h).block(0, 0, w, h)
    }

    #[test]
    fn test_flat_block_is_balanced() {
        let colors = vec![WorkingColor::gray(0.5); 64];
        let s = stats_of(&colors, 8, 8);
        assert_eq!(s.edge, 0.0);
        assert!(s.variance < 1e-6);
        assert_eq!(s.classify(), ContentClass::Balanced);
    }

    #[test]
    fn test_dark_block_is_extreme() {
        let colors = vec![WorkingColor::gray(0.05); 64];
        assert_eq!(stats_of(&colors, 8, 8).classify(), ContentClass::Extreme);
    }

    #[test]
    fn test_step_edge_is_structure() {
        let colors: Vec<WorkingColor> = (0..64)
            .map(|i| WorkingColor::gray(if i % 8 < 4 { 0.2 } else { 0.8 }))
            .collect();
        let s = stats_of(&colors, 8, 8);
        assert!(s.coherence > 0.99, "single direction edge, got {}", s.coherence);
        assert_eq!(s.classify(), ContentClass::Structure);
    }

    #[test]
    fn test_gentle_ramp_is_smooth() {
        let colors: Vec<WorkingColor> = (0..64)
            .map(|i| WorkingColor::gray(0.4 + (i % 8) as f32 * 0.02))
            .collect();
        let s = stats_of(&colors, 8, 8);
        assert_eq!(s.classify(), ContentClass::Smooth, "stats {:?}", s);
    }

    #[test]
    fn test_checkerboard_is_detail() {
        let colors: Vec<WorkingColor> = (0..64)
            .map(|i| WorkingColor::gray(if (i % 8 + i / 8) % 2 == 0 { 0.35 } else { 0.65 }))
            .collect();
        let s = stats_of(&colors, 8, 8);
        assert_eq!(s.classify(), ContentClass::Detail, "stats {:?}", s);
    }

    #[test]
    fn test_incoherent_edges_are_detail() {
        let colors: Vec<WorkingColor> = (0..64)
            .map(|i| WorkingColor::gray(((i * 37) % 17) as f32 / 16.0 * 0.6 + 0.2))
            .collect();
        let s = stats_of(&colors, 8, 8);
        assert!(s.edge > STRUCTURE_EDGE && s.coherence < STRUCTURE_COHERENCE, "stats {:?}", s);
        assert_eq!(s.classify(), ContentClass::Detail);
    }
}
