//! Ostromoukhov variable-coefficient error diffusion.
//!
//! Same three-neighbour footprint as a reduced Floyd-Steinberg, but the
//! weights depend on the intensity of the pixel being quantized, looked up
//! in a 128-entry table mirrored around mid grey. Scanning is serpentine.
//!
//! Reference: V. Ostromoukhov, "A Simple and Efficient Error-Diffusion
//! Algorithm", SIGGRAPH 2001.

use crate::api::{validate_strength, DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder};
use crate::palette::Palette;

use super::diffusion::{apply_error, residual, ErrorRingBuffer, ScanOrder};
use super::Dither;

/// `[next in scan direction, diagonal behind on next row, directly below]`
/// for intensity levels 0..=127. Level `l > 127` uses entry `255 - l`.
#[rustfmt::skip]
const COEFFICIENTS: [[u16; 3]; 128] = [
    [13, 0, 5], [13, 0, 5], [21, 0, 10], [7, 0, 4],
    [8, 0, 5], [47, 3, 28], [23, 3, 13], [15, 3, 8],
    [22, 6, 11], [43, 15, 20], [7, 3, 3], [501, 224, 211],
    [249, 116, 103], [165, 80, 67], [123, 62, 49], [489, 256, 191],
    [81, 44, 31], [483, 272, 181], [60, 35, 22], [53, 32, 19],
    [237, 148, 83], [471, 304, 161], [3, 2, 1], [481, 314, 185],
    [354, 226, 155], [1389, 866, 685], [227, 138, 125], [267, 158, 163],
    [327, 188, 220], [61, 34, 45], [627, 338, 505], [1227, 638, 1075],
    [20, 10, 19], [1937, 1000, 1767], [977, 520, 855], [657, 360, 551],
    [71, 40, 57], [2005, 1160, 1539], [337, 200, 247], [2039, 1240, 1425],
    [257, 160, 171], [691, 440, 437], [1045, 680, 627], [301, 200, 171],
    [177, 120, 95], [2141, 1480, 1083], [1079, 760, 513], [725, 520, 323],
    [137, 100, 57], [2209, 1640, 855], [53, 40, 19], [2243, 1720, 741],
    [565, 440, 171], [759, 600, 209], [1147, 920, 285], [2311, 1880, 513],
    [97, 80, 19], [335, 280, 57], [1181, 1000, 171], [793, 680, 95],
    [599, 520, 57], [2413, 2120, 171], [405, 360, 19], [2447, 2200, 57],
    [11, 10, 0], [158, 151, 3], [178, 179, 7], [1030, 1091, 63],
    [248, 277, 21], [318, 375, 35], [458, 571, 63], [878, 1159, 147],
    [5, 7, 1], [172, 181, 37], [97, 76, 22], [72, 41, 17],
    [119, 47, 29], [4, 1, 1], [4, 1, 1], [4, 1, 1],
    [4, 1, 1], [4, 1, 1], [4, 1, 1], [4, 1, 1],
    [4, 1, 1], [4, 1, 1], [65, 18, 17], [95, 29, 26],
    [185, 62, 53], [30, 11, 9], [35, 14, 11], [85, 37, 28],
    [55, 26, 19], [80, 41, 29], [155, 86, 59], [5, 3, 2],
    [5, 3, 2], [5, 3, 2], [5, 3, 2], [5, 3, 2],
    [5, 3, 2], [5, 3, 2], [5, 3, 2], [5, 3, 2],
    [5, 3, 2], [5, 3, 2], [5, 3, 2], [5, 3, 2],
    [305, 176, 119], [155, 86, 59], [105, 56, 39], [80, 41, 29],
    [65, 32, 23], [55, 26, 19], [335, 152, 113], [85, 37, 28],
    [115, 48, 37], [35, 14, 11], [355, 136, 109], [30, 11, 9],
    [365, 128, 107], [185, 62, 53], [25, 8, 7], [95, 29, 26],
    [385, 112, 103], [65, 18, 17], [395, 104, 101], [4, 1, 1],
];

/// Normalized weights for a luminance in `[0, 1]`.
fn weights_for(luminance: f32) -> [f32; 3] {
    let level = ((luminance * 255.0 + 0.5) as usize).min(255);
    let entry = COEFFICIENTS[if level > 127 { 255 - level } else { level }];
    let sum = (entry[0] + entry[1] + entry[2]) as f32;
    entry.map(|w| w as f32 / sum)
}

/// Ostromoukhov error diffusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ostromoukhov {
    strength: f32,
    scan: ScanOrder,
}

impl Default for Ostromoukhov {
    fn default() -> Self {
        Self {
            strength: 1.0,
            scan: ScanOrder::Serpentine,
        }
    }
}

impl Ostromoukhov {
    pub fn new(strength: f32) -> Result<Self, DitherError> {
        Ok(Self {
            strength: validate_strength(strength)?,
            ..Self::default()
        })
    }

    #[inline]
    pub fn with_scan(mut self, scan: ScanOrder) -> Self {
        self.scan = scan;
        self
    }
}

impl Dither for Ostromoukhov {
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
        let mut buffer = ErrorRingBuffer::new(2, width);

        for y in 0..height {
            let reversed = self.scan.is_reversed(region.absolute_y(y));
            let dir: isize = if reversed { -1 } else { 1 };
            for step in 0..width {
                let x = if reversed { width - 1 - step } else { step };
                let original = decoder.decode(region.pixel(x, y));
                let adjusted = apply_error(original, buffer.take(x, y, self.strength));
                let (idx, chosen, _) = palette.find_nearest_color(adjusted, metric);
                region.set_index(x, y, idx as u8);

                let err = residual(adjusted, chosen);
                let [next, behind, below] = weights_for(original.luminance());
                let targets = [(dir, 0usize, next), (-dir, 1, behind), (0, 1, below)];
                for (dx, dy, weight) in targets {
                    let tx = x as isize + dx;
                    let ty = y + dy;
                    if weight > 0.0 && tx >= 0 && (tx as usize) < width && ty < height {
                        buffer.add(tx as usize, ty, err, weight);
                    }
                }
            }
            buffer.clear_row(y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Euclidean, IdentityDecoder, WorkingColor};

    #[test]
    fn test_weights_are_normalized() {
        for level in 0..=255 {
            let w = weights_for(level as f32 / 255.0);
            let sum: f32 = w.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "level {} sums to {}", level, sum);
        }
    }

    #[test]
    fn test_table_is_mirrored() {
        assert_eq!(weights_for(10.0 / 255.0), weights_for(245.0 / 255.0));
        assert_eq!(weights_for(0.0), weights_for(1.0));
    }

    #[test]
    fn test_mid_gray_mixes() {
        let palette = Palette::new(vec![WorkingColor::BLACK, WorkingColor::WHITE]).unwrap();
        let pixels = vec![WorkingColor::gray(0.5); 256];
        let mut out = vec![0u8; 256];
        let mut region = PixelRegion::packed(&pixels, &mut out, 16, 16, 0).unwrap();
        Ostromoukhov::default().dither(&mut region, &IdentityDecoder, &Euclidean, &palette);
        let white = out.iter().filter(|&&i| i == 1).count();
        assert!((112..=144).contains(&white), "expected about half white, got {}", white);
    }

    #[test]
    fn test_strength_validated() {
        assert!(Ostromoukhov::new(1.5).is_err());
        assert!(Ostromoukhov::new(0.5).unwrap().requires_sequential_processing());
    }
}
