//! Threshold matrices for ordered dithering.
//!
//! A [`ThresholdMatrix`] is an `n x n` rank permutation normalized to
//! thresholds in `[-0.5, 0.5]` via `(rank + 0.5) / n² - 0.5`, and tiled over
//! the image by modulo indexing. Three generators produce ranks:
//!
//! - [`bayer`]: recursive dispersed-dot matrices, any power of two
//! - [`halftone`]: fixed clustered-dot tables (3x3, 4x4, 8x8)
//! - [`void_and_cluster`]: blue-noise ranks, expensive, cached by size

pub mod bayer;
pub mod halftone;
pub mod void_and_cluster;

use crate::api::DitherError;

/// Normalized rank matrix tiled over image coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdMatrix {
    size: usize,
    ranks: Vec<u32>,
    thresholds: Vec<f32>,
}

impl ThresholdMatrix {
    /// Build from row-major ranks.
    ///
    /// # Errors
    ///
    /// [`DitherError::InvalidMatrixSize`] when `size` is zero, `ranks` does
    /// not hold `size²` entries, or the ranks are not a permutation of
    /// `0..size²`.
    pub fn from_ranks(size: usize, ranks: Vec<u32>) -> Result<Self, DitherError> {
        if size == 0 {
            return Err(DitherError::InvalidMatrixSize {
                size,
                reason: "size must be at least 1",
            });
        }
        let cells = size * size;
        if ranks.len() != cells {
            return Err(DitherError::InvalidMatrixSize {
                size,
                reason: "rank count must equal size squared",
            });
        }
        if !is_permutation(&ranks) {
            return Err(DitherError::InvalidMatrixSize {
                size,
                reason: "ranks must be a permutation of 0..size squared",
            });
        }
        let n2 = cells as f32;
        let thresholds = ranks
            .iter()
            .map(|&r| (r as f32 + 0.5) / n2 - 0.5)
            .collect();
        Ok(Self {
            size,
            ranks,
            thresholds,
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major ranks.
    #[inline]
    pub fn ranks(&self) -> &[u32] {
        &self.ranks
    }

    /// Rank at `(x mod n, y mod n)`.
    #[inline]
    pub fn rank(&self, x: usize, y: usize) -> u32 {
        self.ranks[(y % self.size) * self.size + x % self.size]
    }

    /// Threshold in `[-0.5, 0.5]` at `(x mod n, y mod n)`.
    #[inline]
    pub fn threshold(&self, x: usize, y: usize) -> f32 {
        self.thresholds[(y % self.size) * self.size + x % self.size]
    }
}

/// True when `ranks` holds every value in `0..ranks.len()` exactly once.
pub fn is_permutation(ranks: &[u32]) -> bool {
    let mut seen = vec![false; ranks.len()];
    for &r in ranks {
        match seen.get_mut(r as usize) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bayer2_thresholds() {
        let m = ThresholdMatrix::from_ranks(2, vec![0, 2, 3, 1]).unwrap();
        assert_eq!(m.threshold(0, 0), -0.375);
        assert_eq!(m.threshold(1, 0), 0.125);
        assert_eq!(m.threshold(0, 1), 0.375);
        assert_eq!(m.threshold(1, 1), -0.125);
    }

    #[test]
    fn test_threshold_tiles_by_modulo() {
        let m = ThresholdMatrix::from_ranks(2, vec![0, 2, 3, 1]).unwrap();
        assert_eq!(m.threshold(4, 6), m.threshold(0, 0));
        assert_eq!(m.rank(3, 5), 1);
    }

    #[test]
    fn test_thresholds_stay_in_range() {
        let ranks: Vec<u32> = (0..64).rev().collect();
        let m = ThresholdMatrix::from_ranks(8, ranks).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                let t = m.threshold(x, y);
                assert!((-0.5..=0.5).contains(&t), "threshold {} out of range", t);
            }
        }
    }

    #[test]
    fn test_rejects_non_permutation() {
        assert!(ThresholdMatrix::from_ranks(2, vec![0, 1, 1, 3]).is_err());
        assert!(ThresholdMatrix::from_ranks(2, vec![0, 1, 2, 4]).is_err());
        assert!(ThresholdMatrix::from_ranks(2, vec![0, 1, 2]).is_err());
        assert!(ThresholdMatrix::from_ranks(0, vec![]).is_err());
    }

    #[test]
    fn test_single_cell_matrix() {
        let m = ThresholdMatrix::from_ranks(1, vec![0]).unwrap();
        assert_eq!(m.threshold(17, 3), 0.0);
    }
}
