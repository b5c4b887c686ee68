//! Error diffusion kernel definitions.
//!
//! Each kernel is a row-major weight grid. Row 0 is the current row; the
//! column at `shift` holds the current pixel (`X` below) and always carries
//! weight 0, as does everything left of it on row 0, because those pixels
//! are already quantized. The divisor is the sum of the weights.

/// A named error diffusion kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    /// Display name.
    pub name: &'static str,
    /// Row-major weights, `columns` per row.
    pub weights: &'static [u8],
    /// Columns per row.
    pub columns: usize,
    /// Column of the current pixel.
    pub shift: usize,
    /// Strength the kernel is usually run at.
    ///
    /// Everything but Atkinson propagates the full error. Atkinson's classic
    /// form spreads 6/8 of it, which is expressed here as strength 0.75.
    pub default_strength: f32,
}

impl Kernel {
    /// Number of rows the kernel reaches, including the current one.
    #[inline]
    pub fn rows(&self) -> usize {
        self.weights.len() / self.columns.max(1)
    }

    /// Sum of all weights.
    pub fn divisor(&self) -> u32 {
        self.weights.iter().map(|&w| w as u32).sum()
    }
}

/// Floyd-Steinberg (1976).
///
/// ```text
///        X   7
///    3   5   1
/// ```
#[rustfmt::skip]
pub const FLOYD_STEINBERG: Kernel = Kernel {
    name: "Floyd-Steinberg",
    weights: &[
        0, 0, 7,
        3, 5, 1,
    ],
    columns: 3,
    shift: 1,
    default_strength: 1.0,
};

/// "False" Floyd-Steinberg: the three-neighbour shortcut.
///
/// ```text
///    X   3
///    3   2
/// ```
#[rustfmt::skip]
pub const FALSE_FLOYD_STEINBERG: Kernel = Kernel {
    name: "False Floyd-Steinberg",
    weights: &[
        0, 3,
        3, 2,
    ],
    columns: 2,
    shift: 0,
    default_strength: 1.0,
};

/// Jarvis, Judice and Ninke (1976).
///
/// ```text
///            X   7   5
///    3   5   7   5   3
///    1   3   5   3   1
/// ```
#[rustfmt::skip]
pub const JARVIS_JUDICE_NINKE: Kernel = Kernel {
    name: "Jarvis-Judice-Ninke",
    weights: &[
        0, 0, 0, 7, 5,
        3, 5, 7, 5, 3,
        1, 3, 5, 3, 1,
    ],
    columns: 5,
    shift: 2,
    default_strength: 1.0,
};

/// Stucki (1981), a sharper JJN.
///
/// ```text
///            X   8   4
///    2   4   8   4   2
///    1   2   4   2   1
/// ```
#[rustfmt::skip]
pub const STUCKI: Kernel = Kernel {
    name: "Stucki",
    weights: &[
        0, 0, 0, 8, 4,
        2, 4, 8, 4, 2,
        1, 2, 4, 2, 1,
    ],
    columns: 5,
    shift: 2,
    default_strength: 1.0,
};

/// Burkes: Stucki without the third row.
///
/// ```text
///            X   8   4
///    2   4   8   4   2
/// ```
#[rustfmt::skip]
pub const BURKES: Kernel = Kernel {
    name: "Burkes",
    weights: &[
        0, 0, 0, 8, 4,
        2, 4, 8, 4, 2,
    ],
    columns: 5,
    shift: 2,
    default_strength: 1.0,
};

/// Sierra (Sierra-3).
///
/// ```text
///            X   5   3
///    2   4   5   4   2
///        2   3   2
/// ```
#[rustfmt::skip]
pub const SIERRA: Kernel = Kernel {
    name: "Sierra",
    weights: &[
        0, 0, 0, 5, 3,
        2, 4, 5, 4, 2,
        0, 2, 3, 2, 0,
    ],
    columns: 5,
    shift: 2,
    default_strength: 1.0,
};

/// Sierra Two-Row.
///
/// ```text
///            X   4   3
///    1   2   3   2   1
/// ```
#[rustfmt::skip]
pub const SIERRA_TWO_ROW: Kernel = Kernel {
    name: "Sierra Two-Row",
    weights: &[
        0, 0, 0, 4, 3,
        1, 2, 3, 2, 1,
    ],
    columns: 5,
    shift: 2,
    default_strength: 1.0,
};

/// Sierra Lite.
///
/// ```text
///        X   2
///    1   1
/// ```
#[rustfmt::skip]
pub const SIERRA_LITE: Kernel = Kernel {
    name: "Sierra Lite",
    weights: &[
        0, 0, 2,
        1, 1, 0,
    ],
    columns: 3,
    shift: 1,
    default_strength: 1.0,
};

/// Atkinson (Apple Macintosh).
///
/// ```text
///        X   1   1
///    1   1   1
///        1
/// ```
#[rustfmt::skip]
pub const ATKINSON: Kernel = Kernel {
    name: "Atkinson",
    weights: &[
        0, 0, 1, 1,
        1, 1, 1, 0,
        0, 1, 0, 0,
    ],
    columns: 4,
    shift: 1,
    default_strength: 0.75,
};

/// Stevenson and Arce (1985), designed for hexagonal grids.
///
/// ```text
///                X       32
///    12      26      30      16
///        12      26      12
///     5      12      12       5
/// ```
#[rustfmt::skip]
pub const STEVENSON_ARCE: Kernel = Kernel {
    name: "Stevenson-Arce",
    weights: &[
         0, 0,  0, 0,  0, 32,  0,
        12, 0, 26, 0, 30,  0, 16,
         0, 12, 0, 26, 0, 12,  0,
         5, 0, 12, 0, 12,  0,  5,
    ],
    columns: 7,
    shift: 3,
    default_strength: 1.0,
};

/// Shiau and Fan (1996).
///
/// ```text
///            X   4
///    1   1   2
/// ```
#[rustfmt::skip]
pub const SHIAU_FAN: Kernel = Kernel {
    name: "Shiau-Fan",
    weights: &[
        0, 0, 0, 4,
        1, 1, 2, 0,
    ],
    columns: 4,
    shift: 2,
    default_strength: 1.0,
};

/// Shiau and Fan, wider variant.
///
/// ```text
///                X   8
///    1   1   2   4
/// ```
#[rustfmt::skip]
pub const SHIAU_FAN_2: Kernel = Kernel {
    name: "Shiau-Fan 2",
    weights: &[
        0, 0, 0, 0, 8,
        1, 1, 2, 4, 0,
    ],
    columns: 5,
    shift: 3,
    default_strength: 1.0,
};

/// Fan (1992).
///
/// ```text
///            X   7
///    1   3   5
/// ```
#[rustfmt::skip]
pub const FAN: Kernel = Kernel {
    name: "Fan",
    weights: &[
        0, 0, 0, 7,
        1, 3, 5, 0,
    ],
    columns: 4,
    shift: 2,
    default_strength: 1.0,
};

/// Two-neighbour split: half right, half below.
///
/// ```text
///    X   1
///    1
/// ```
#[rustfmt::skip]
pub const TWO_D: Kernel = Kernel {
    name: "Two-D",
    weights: &[
        0, 1,
        1, 0,
    ],
    columns: 2,
    shift: 0,
    default_strength: 1.0,
};

/// Every built-in kernel.
pub const ALL_KERNELS: [&Kernel; 14] = [
    &FLOYD_STEINBERG,
    &FALSE_FLOYD_STEINBERG,
    &JARVIS_JUDICE_NINKE,
    &STUCKI,
    &BURKES,
    &SIERRA,
    &SIERRA_TWO_ROW,
    &SIERRA_LITE,
    &ATKINSON,
    &STEVENSON_ARCE,
    &SHIAU_FAN,
    &SHIAU_FAN_2,
    &FAN,
    &TWO_D,
];
