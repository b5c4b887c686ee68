//! Clustered-dot halftone tables.
//!
//! Unlike Bayer matrices, consecutive ranks sit next to each other so that
//! "on" pixels grow as round dots from the cell centre, imitating print
//! halftone screens.

use super::ThresholdMatrix;
use crate::api::DitherError;

#[rustfmt::skip]
const HALFTONE_3: [u32; 9] = [
    8, 4, 5,
    3, 0, 1,
    7, 2, 6,
];

#[rustfmt::skip]
const HALFTONE_4: [u32; 16] = [
    12,  5,  6, 13,
     4,  0,  1,  7,
    11,  3,  2,  8,
    15, 10,  9, 14,
];

/// Four 4x4 dots interleaved in Bayer-2 order.
#[rustfmt::skip]
const HALFTONE_8: [u32; 64] = [
    48, 20, 24, 52, 50, 22, 26, 54,
    16,  0,  4, 28, 18,  2,  6, 30,
    44, 12,  8, 32, 46, 14, 10, 34,
    60, 40, 36, 56, 62, 42, 38, 58,
    51, 23, 27, 55, 49, 21, 25, 53,
    19,  3,  7, 31, 17,  1,  5, 29,
    47, 15, 11, 35, 45, 13,  9, 33,
    63, 43, 39, 59, 61, 41, 37, 57,
];

/// Sizes with a built-in halftone table.
pub const HALFTONE_SIZES: [usize; 3] = [3, 4, 8];

/// Row-major ranks of the `size x size` halftone table.
pub fn halftone_ranks(size: usize) -> Result<&'static [u32], DitherError> {
    match size {
        3 => Ok(&HALFTONE_3),
        4 => Ok(&HALFTONE_4),
        8 => Ok(&HALFTONE_8),
        _ => Err(DitherError::InvalidMatrixSize {
            size,
            reason: "halftone tables exist for sizes 3, 4 and 8",
        }),
    }
}

/// Normalized halftone threshold matrix.
pub fn halftone_matrix(size: usize) -> Result<ThresholdMatrix, DitherError> {
    let ranks = halftone_ranks(size)?;
    ThresholdMatrix::from_ranks(size, ranks.to_vec())
}
