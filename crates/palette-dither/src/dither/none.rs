//! Plain nearest-color quantization.

use crate::api::PixelRegion;
use crate::color::{ColorMetric, PixelDecoder};
use crate::palette::Palette;

use super::Dither;

/// Maps every pixel to its nearest palette entry independently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoDither;

impl Dither for NoDither {
    fn requires_sequential_processing(&self) -> bool {
        false
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
        if palette.is_empty() {
            return;
        }
        for y in 0..region.height() {
            for x in 0..region.width() {
                let color = decoder.decode(region.pixel(x, y));
                let (idx, _) = palette.find_nearest(color, metric);
                region.set_index(x, y, idx as u8);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Euclidean, Rgba8Decoder, WorkingColor};

    #[test]
    fn test_matches_per_pixel_lookup() {
        let palette = Palette::from_hex(&["#000", "#f00", "#0f0", "#00f", "#fff"]).unwrap();
        let pixels: Vec<[u8; 4]> = (0..25u32)
            .map(|i| [(i * 37 % 256) as u8, (i * 91 % 256) as u8, (i * 53 % 256) as u8, 255])
            .collect();
        let mut out = vec![0u8; 25];
        let mut region = PixelRegion::packed(&pixels, &mut out, 5, 5, 0).unwrap();
        NoDither.dither(&mut region, &Rgba8Decoder, &Euclidean, &palette);

        for (i, p) in pixels.iter().enumerate() {
            let c = WorkingColor::from_u8(p[0], p[1], p[2], p[3]);
            assert_eq!(out[i] as usize, palette.find_nearest(c, &Euclidean).0, "pixel {}", i);
        }
    }

    #[test]
    fn test_empty_palette_writes_nothing() {
        let palette = Palette::default();
        let pixels = [[10u8, 10, 10, 255]; 4];
        let mut out = [9u8; 4];
        let mut region = PixelRegion::packed(&pixels, &mut out, 2, 2, 0).unwrap();
        NoDither.dither(&mut region, &Rgba8Decoder, &Euclidean, &palette);
        assert_eq!(out, [9; 4]);
    }
}
