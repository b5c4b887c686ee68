//! Distance metrics between working colors.
//!
//! The engine treats the metric as a black box. It must be non-negative and
//! symmetric; the triangle inequality is not required, which is why the
//! default [`Euclidean`] metric returns the *squared* distance.

use super::WorkingColor;

/// Distance between two working colors.
///
/// Any `Fn(WorkingColor, WorkingColor) -> f32` closure is a metric.
pub trait ColorMetric {
    /// Distance between `a` and `b`. Must be `>= 0` and symmetric.
    fn distance(&self, a: WorkingColor, b: WorkingColor) -> f32;
}

impl<F> ColorMetric for F
where
    F: Fn(WorkingColor, WorkingColor) -> f32,
{
    #[inline]
    fn distance(&self, a: WorkingColor, b: WorkingColor) -> f32 {
        self(a, b)
    }
}

/// Squared Euclidean distance over all four channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl ColorMetric for Euclidean {
    #[inline]
    fn distance(&self, a: WorkingColor, b: WorkingColor) -> f32 {
        let a = a.channels();
        let b = b.channels();
        let mut sum = 0.0;
        for c in 0..4 {
            let d = a[c] - b[c];
            sum += d * d;
        }
        sum
    }
}

/// Squared Euclidean distance with per-channel weights.
///
/// The default weights are the Rec.601 luma coefficients for the color
/// channels plus a small alpha weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedEuclidean {
    weights: [f32; 4],
}

impl WeightedEuclidean {
    /// Create a weighted metric. Negative weights are treated as zero.
    pub fn new(weights: [f32; 4]) -> Self {
        Self {
            weights: weights.map(|w| w.max(0.0)),
        }
    }

    #[inline]
    pub fn weights(&self) -> [f32; 4] {
        self.weights
    }
}

impl Default for WeightedEuclidean {
    fn default() -> Self {
        Self::new([0.299, 0.587, 0.114, 0.25])
    }
}

impl ColorMetric for WeightedEuclidean {
    #[inline]
    fn distance(&self, a: WorkingColor, b: WorkingColor) -> f32 {
        let a = a.channels();
        let b = b.channels();
        let mut sum = 0.0;
        for c in 0..4 {
            let d = a[c] - b[c];
            sum += self.weights[c] * d * d;
        }
        sum
    }
}

/// Sum of absolute channel differences.
#[derive(Debug, Clone, Copy, Default)]
pub struct Manhattan;

impl ColorMetric for Manhattan {
    #[inline]
    fn distance(&self, a: WorkingColor, b: WorkingColor) -> f32 {
        let a = a.channels();
        let b = b.channels();
        (0..4).map(|c| (a[c] - b[c]).abs()).sum()
    }
}
