//! Weighted-matrix error diffusion.
//!
//! Per pixel: decode, add the error accumulated for this cell, quantize to
//! the nearest palette color, then spread the residual over the matrix
//! footprint of not-yet-visited pixels. Error only ever lives in a ring of
//! `rows` image rows, never in a full-frame buffer.

use crate::api::{validate_strength, DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder, WorkingColor};
use crate::palette::Palette;

use super::kernel::Kernel;
use super::Dither;

/// Scan policy for error diffusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScanOrder {
    /// Every row left to right.
    Linear,
    /// Odd rows (in absolute image coordinates) right to left, with the
    /// matrix mirrored so the footprint stays ahead of the scan.
    #[default]
    Serpentine,
}

impl ScanOrder {
    /// True when row `absolute_y` is scanned right to left.
    #[inline]
    pub fn is_reversed(&self, absolute_y: usize) -> bool {
        matches!(self, ScanOrder::Serpentine) && absolute_y & 1 == 1
    }
}

/// Validated diffusion weights plus strength.
///
/// Invariants checked by [`DiffusionMatrix::new`]: the grid is rectangular,
/// `shift < columns`, the current-pixel cell and everything left of it on
/// row 0 weigh 0, the divisor (sum of weights) is positive, and strength is
/// a finite value in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionMatrix {
    weights: Vec<u8>,
    rows: usize,
    columns: usize,
    shift: usize,
    divisor: u32,
    strength: f32,
}

impl DiffusionMatrix {
    pub fn new(
        weights: Vec<u8>,
        columns: usize,
        shift: usize,
        strength: f32,
    ) -> Result<Self, DitherError> {
        let invalid = |reason: &str| DitherError::InvalidParameter {
            name: "diffusion matrix",
            reason: reason.to_string(),
        };
        if columns == 0 || weights.is_empty() || weights.len() % columns != 0 {
            return Err(invalid("weights must fill at least one whole row"));
        }
        if shift >= columns {
            return Err(invalid("shift must be inside the first row"));
        }
        if weights[..=shift].iter().any(|&w| w != 0) {
            return Err(invalid("current pixel and the cells before it must weigh 0"));
        }
        let divisor: u32 = weights.iter().map(|&w| w as u32).sum();
        if divisor == 0 {
            return Err(invalid("at least one weight must be non-zero"));
        }
        let strength = validate_strength(strength)?;
        Ok(Self {
            rows: weights.len() / columns,
            weights,
            columns,
            shift,
            divisor,
            strength,
        })
    }

    /// Matrix for a built-in kernel at `strength`.
    pub fn from_kernel(kernel: &Kernel, strength: f32) -> Result<Self, DitherError> {
        Self::new(kernel.weights.to_vec(), kernel.columns, kernel.shift, strength)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn shift(&self) -> usize {
        self.shift
    }

    #[inline]
    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    #[inline]
    pub fn strength(&self) -> f32 {
        self.strength
    }

    /// Factor applied when accumulated error is read back.
    #[inline]
    pub fn read_scale(&self) -> f32 {
        self.strength / self.divisor as f32
    }

    /// Non-zero taps as `(dx, dy, weight)` relative to the current pixel.
    pub fn taps(&self) -> impl Iterator<Item = (isize, usize, f32)> + '_ {
        self.weights.iter().enumerate().filter_map(move |(i, &w)| {
            (w != 0).then(|| {
                let row = i / self.columns;
                let col = i % self.columns;
                (col as isize - self.shift as isize, row, w as f32)
            })
        })
    }
}

/// Ring of `rows x width x 4` error accumulators.
///
/// Row `y` of the region lives in slot `y % rows`. Writers store
/// `residual * weight`; [`take`](Self::take) scales the sum on the way out
/// and zeroes the cell, and [`clear_row`](Self::clear_row) wipes the row once
/// the scan has left it, so no slot carries error from more than `rows` rows
/// back.
#[derive(Debug, Clone)]
pub struct ErrorRingBuffer {
    rows: usize,
    width: usize,
    cells: Vec<[f32; 4]>,
}

impl ErrorRingBuffer {
    pub fn new(rows: usize, width: usize) -> Self {
        let rows = rows.max(1);
        Self {
            rows,
            width,
            cells: vec![[0.0; 4]; rows * width],
        }
    }

    #[inline]
    fn slot(&self, x: usize, y: usize) -> usize {
        (y % self.rows) * self.width + x
    }

    /// Accumulate `residual * weight` into `(x, y)`.
    #[inline]
    pub fn add(&mut self, x: usize, y: usize, residual: [f32; 4], weight: f32) {
        let slot = self.slot(x, y);
        let cell = &mut self.cells[slot];
        for c in 0..4 {
            cell[c] += residual[c] * weight;
        }
    }

    /// Read the accumulated error at `(x, y)` times `scale`, zeroing the cell.
    #[inline]
    pub fn take(&mut self, x: usize, y: usize, scale: f32) -> [f32; 4] {
        let slot = self.slot(x, y);
        let cell = std::mem::take(&mut self.cells[slot]);
        cell.map(|v| v * scale)
    }

    /// Zero every cell of row `y`'s slot.
    pub fn clear_row(&mut self, y: usize) {
        let start = (y % self.rows) * self.width;
        self.cells[start..start + self.width].fill([0.0; 4]);
    }

    /// Sum of every stored value per channel, unscaled.
    pub fn total(&self) -> [f32; 4] {
        let mut sum = [0.0; 4];
        for cell in &self.cells {
            for c in 0..4 {
                sum[c] += cell[c];
            }
        }
        sum
    }
}

/// Spread `residual` from `(x, y)` across the matrix footprint.
///
/// Targets outside `[0, width) x [0, height)` are skipped.
pub(crate) fn spread_residual(
    buffer: &mut ErrorRingBuffer,
    matrix: &DiffusionMatrix,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    reversed: bool,
    residual: [f32; 4],
) {
    for (dx, dy, weight) in matrix.taps() {
        let dx = if reversed { -dx } else { dx };
        let tx = x as isize + dx;
        let ty = y + dy;
        if tx < 0 || tx as usize >= width || ty >= height {
            continue;
        }
        buffer.add(tx as usize, ty, residual, weight);
    }
}

/// Add error to a decoded color and clamp back into range.
#[inline]
pub(crate) fn apply_error(color: WorkingColor, error: [f32; 4]) -> WorkingColor {
    let c = color.channels();
    WorkingColor::new(
        c[0] + error[0],
        c[1] + error[1],
        c[2] + error[2],
        c[3] + error[3],
    )
}

/// Per-channel `a - b`.
#[inline]
pub(crate) fn residual(a: WorkingColor, b: WorkingColor) -> [f32; 4] {
    let a = a.channels();
    let b = b.channels();
    [a[0] - b[0], a[1] - b[1], a[2] - b[2], a[3] - b[3]]
}

/// Classic error diffusion over a [`DiffusionMatrix`].
///
/// # Example
///
/// ```
/// use palette_dither::{Dither, ErrorDiffusion, Euclidean, Palette, PixelRegion, Rgba8Decoder};
/// use palette_dither::dither::kernel::FLOYD_STEINBERG;
///
/// let palette = Palette::from_hex(&["#000", "#fff"]).unwrap();
/// let pixels = vec![[128u8, 128, 128, 255]; 16];
/// let mut indices = vec![0u8; 16];
/// let mut region = PixelRegion::packed(&pixels, &mut indices, 4, 4, 0).unwrap();
///
/// let fs = ErrorDiffusion::new(&FLOYD_STEINBERG, 1.0).unwrap();
/// fs.dither(&mut region, &Rgba8Decoder, &Euclidean, &palette);
/// assert!(indices.contains(&0) && indices.contains(&1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDiffusion {
    name: &'static str,
    matrix: DiffusionMatrix,
    scan: ScanOrder,
}

impl ErrorDiffusion {
    /// Diffusion with a built-in kernel; serpentine by default.
    pub fn new(kernel: &Kernel, strength: f32) -> Result<Self, DitherError> {
        Ok(Self {
            name: kernel.name,
            matrix: DiffusionMatrix::from_kernel(kernel, strength)?,
            scan: ScanOrder::default(),
        })
    }

    /// Built-in kernel at its customary strength.
    pub fn preset(kernel: &Kernel) -> Result<Self, DitherError> {
        Self::new(kernel, kernel.default_strength)
    }

    /// Diffusion with a caller-supplied matrix.
    pub fn from_matrix(matrix: DiffusionMatrix) -> Self {
        Self {
            name: "Custom",
            matrix,
            scan: ScanOrder::default(),
        }
    }

    #[inline]
    pub fn with_scan(mut self, scan: ScanOrder) -> Self {
        self.scan = scan;
        self
    }

    #[inline]
    pub fn serpentine(self, enabled: bool) -> Self {
        self.with_scan(if enabled {
            ScanOrder::Serpentine
        } else {
            ScanOrder::Linear
        })
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn matrix(&self) -> &DiffusionMatrix {
        &self.matrix
    }

    #[inline]
    pub fn scan(&self) -> ScanOrder {
        self.scan
    }
}

impl Dither for ErrorDiffusion {
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
        if palette.is_empty() || region.is_empty() {
            return;
        }
        let (width, height) = (region.width(), region.height());
        let scale = self.matrix.read_scale();
        let mut buffer = ErrorRingBuffer::new(self.matrix.rows(), width);

        for y in 0..height {
            let reversed = self.scan.is_reversed(region.absolute_y(y));
            for step in 0..width {
                let x = if reversed { width - 1 - step } else { step };
                let error = buffer.take(x, y, scale);
                let adjusted = apply_error(decoder.decode(region.pixel(x, y)), error);
                let (idx, chosen, _) = palette.find_nearest_color(adjusted, metric);
                region.set_index(x, y, idx as u8);
                spread_residual(
                    &mut buffer,
                    &self.matrix,
                    x,
                    y,
                    width,
                    height,
                    reversed,
                    residual(adjusted, chosen),
                );
            }
            buffer.clear_row(y);
        }
    }
}
