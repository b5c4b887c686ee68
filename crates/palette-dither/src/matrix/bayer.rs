//! Recursive Bayer (dispersed-dot) matrices.
//!
//! `B(2) = [[0, 2], [3, 1]]`, and `B(2n)` tiles four quadrants
//! `4 * B(n) + {0, 2, 3, 1}` (top-left, top-right, bottom-left, bottom-right).

use super::ThresholdMatrix;
use crate::api::DitherError;

/// Largest supported Bayer size.
pub const MAX_BAYER_SIZE: usize = 256;

/// Check that `size` is a power of two in `2..=256`.
pub fn validate_size(size: usize) -> Result<(), DitherError> {
    if !(2..=MAX_BAYER_SIZE).contains(&size) {
        return Err(DitherError::InvalidMatrixSize {
            size,
            reason: "bayer size must be between 2 and 256",
        });
    }
    if !size.is_power_of_two() {
        return Err(DitherError::InvalidMatrixSize {
            size,
            reason: "bayer size must be a power of two",
        });
    }
    Ok(())
}

/// Row-major Bayer ranks for `size`.
pub fn bayer_ranks(size: usize) -> Result<Vec<u32>, DitherError> {
    validate_size(size)?;
    Ok(build(size))
}

fn build(size: usize) -> Vec<u32> {
    if size == 2 {
        return vec![0, 2, 3, 1];
    }
    let half = size / 2;
    let inner = build(half);
    let mut out = vec![0u32; size * size];
    for (quadrant, offset) in [0u32, 2, 3, 1].into_iter().enumerate() {
        let ox = (quadrant % 2) * half;
        let oy = (quadrant / 2) * half;
        for y in 0..half {
            for x in 0..half {
                out[(oy + y) * size + ox + x] = 4 * inner[y * half + x] + offset;
            }
        }
    }
    out
}

/// Normalized Bayer threshold matrix.
pub fn bayer_matrix(size: usize) -> Result<ThresholdMatrix, DitherError> {
    let ranks = bayer_ranks(size)?;
    ThresholdMatrix::from_ranks(size, ranks)
}
