//! Palette struct and nearest-color matching.

use super::error::{PaletteError, ParseColorError};
use crate::color::{ColorMetric, WorkingColor};

/// Largest palette an 8-bit index buffer can address.
pub const MAX_PALETTE_SIZE: usize = 256;

/// Distance below which a pixel counts as an exact palette member.
///
/// Ordered and noise strategies skip threshold perturbation for such pixels
/// so flat regions of palette colors survive untouched.
pub const EXACT_MATCH_EPSILON: f32 = 1e-6;

/// An ordered, fixed set of output colors.
///
/// Entry `i` is emitted as index `i` into the destination buffer, so a palette
/// holds at most [`MAX_PALETTE_SIZE`] colors. An empty palette is allowed:
/// every strategy treats it as a no-op and leaves the destination untouched.
/// The lookup methods themselves require a non-empty palette.
///
/// # Example
///
/// ```
/// use palette_dither::{Euclidean, Palette, WorkingColor};
///
/// let palette = Palette::from_hex(&["#000", "#fff"]).unwrap();
/// let (idx, _) = palette.find_nearest(WorkingColor::gray(0.8), &Euclidean);
/// assert_eq!(idx, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Palette {
    colors: Vec<WorkingColor>,
}

impl Palette {
    /// Create a palette from working colors.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::TooManyColors`] for more than 256 entries.
    pub fn new(colors: Vec<WorkingColor>) -> Result<Self, PaletteError> {
        if colors.len() > MAX_PALETTE_SIZE {
            return Err(PaletteError::TooManyColors {
                count: colors.len(),
                max: MAX_PALETTE_SIZE,
            });
        }
        Ok(Self { colors })
    }

    /// Create a palette from hex strings (`#RGB`, `#RRGGBB` or `#RRGGBBAA`).
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::ParseColor`] naming the first bad entry.
    pub fn from_hex<S: AsRef<str>>(hex: &[S]) -> Result<Self, PaletteError> {
        let colors = hex
            .iter()
            .enumerate()
            .map(|(index, s)| {
                parse_hex(s.as_ref()).map_err(|source| PaletteError::ParseColor { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(colors)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The color at `idx`. Panics when out of range.
    #[inline]
    pub fn color(&self, idx: usize) -> WorkingColor {
        self.colors[idx]
    }

    #[inline]
    pub fn colors(&self) -> &[WorkingColor] {
        &self.colors
    }

    /// Index of the nearest entry and its distance.
    ///
    /// Linear scan keeping the minimum; ties go to the lowest index. The
    /// palette must not be empty (an empty palette yields `(0, f32::MAX)`).
    #[inline]
    pub fn find_nearest<M: ColorMetric + ?Sized>(&self, color: WorkingColor, metric: &M) -> (usize, f32) {
        let mut best_idx = 0;
        let mut best_dist = f32::MAX;
        for (i, &entry) in self.colors.iter().enumerate() {
            let dist = metric.distance(color, entry);
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }
        (best_idx, best_dist)
    }

    /// Like [`find_nearest`](Self::find_nearest), also returning the matched color.
    #[inline]
    pub fn find_nearest_color<M: ColorMetric + ?Sized>(
        &self,
        color: WorkingColor,
        metric: &M,
    ) -> (usize, WorkingColor, f32) {
        let (idx, dist) = self.find_nearest(color, metric);
        let matched = self.colors.get(idx).copied().unwrap_or_default();
        (idx, matched, dist)
    }

    /// Up to `n` entries ordered by ascending distance, ties by ascending index.
    pub fn find_n_closest<M: ColorMetric + ?Sized>(
        &self,
        color: WorkingColor,
        n: usize,
        metric: &M,
    ) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self
            .colors
            .iter()
            .enumerate()
            .map(|(i, &entry)| (i, metric.distance(color, entry)))
            .collect();
        // Stable sort keeps index order among equal distances.
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(n);
        ranked
    }

    /// The matching index when `color` is within [`EXACT_MATCH_EPSILON`] of an entry.
    #[inline]
    pub fn is_exact<M: ColorMetric + ?Sized>(&self, color: WorkingColor, metric: &M) -> Option<usize> {
        if self.colors.is_empty() {
            return None;
        }
        let (idx, dist) = self.find_nearest(color, metric);
        (dist < EXACT_MATCH_EPSILON).then_some(idx)
    }
}

/// Parse a `#RGB`, `#RRGGBB` or `#RRGGBBAA` string (the `#` is optional).
pub fn parse_hex(s: &str) -> Result<WorkingColor, ParseColorError> {
    let hex = s.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return Err(match u32::from_str_radix(hex, 16) {
            Err(err) => ParseColorError::InvalidHex(err),
            Ok(_) => ParseColorError::InvalidLength(hex.len()),
        });
    }
    let byte = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
    match hex.len() {
        3 => {
            let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
            Ok(WorkingColor::from_u8(nibble(0)?, nibble(1)?, nibble(2)?, 255))
        }
        6 => Ok(WorkingColor::from_u8(byte(0..2)?, byte(2..4)?, byte(4..6)?, 255)),
        8 => Ok(WorkingColor::from_u8(
            byte(0..2)?,
            byte(2..4)?,
            byte(4..6)?,
            byte(6..8)?,
        )),
        len => Err(ParseColorError::InvalidLength(len)),
    }
}
