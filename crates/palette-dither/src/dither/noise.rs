//! Noise-threshold dithering.

use crate::api::{validate_strength, DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder};
use crate::noise::{NoiseGenerator, NoiseKind};
use crate::palette::Palette;

use super::{quantize_with_threshold, Dither};

/// Adds `noise(x, y) * strength` to the color channels before lookup.
#[derive(Debug, Clone)]
pub struct NoiseDither {
    generator: NoiseGenerator,
    strength: f32,
}

impl NoiseDither {
    pub fn new(kind: NoiseKind, seed: u32, strength: f32) -> Result<Self, DitherError> {
        Ok(Self {
            generator: NoiseGenerator::new(kind, seed)?,
            strength: validate_strength(strength)?,
        })
    }

    #[inline]
    pub fn kind(&self) -> NoiseKind {
        self.generator.kind()
    }

    #[inline]
    pub fn strength(&self) -> f32 {
        self.strength
    }
}

impl Dither for NoiseDither {
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
            let ay = region.absolute_y(y);
            for x in 0..region.width() {
                let color = decoder.decode(region.pixel(x, y));
                let threshold = self.generator.threshold(x, ay) * self.strength;
                let idx = quantize_with_threshold(palette, color, threshold, metric);
                region.set_index(x, y, idx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Euclidean, IdentityDecoder, WorkingColor};

    fn white_share(kind: NoiseKind, value: f32) -> f32 {
        let d = NoiseDither::new(kind, 42, 1.0).unwrap();
        let palette = Palette::new(vec![WorkingColor::BLACK, WorkingColor::WHITE]).unwrap();
        let (w, h) = (128, 128);
        let pixels = vec![WorkingColor::gray(value); w * h];
        let mut out = vec![0u8; w * h];
        let mut region = PixelRegion::packed(&pixels, &mut out, w, h, 0).unwrap();
        d.dither(&mut region, &IdentityDecoder, &Euclidean, &palette);
        out.iter().filter(|&&i| i == 1).count() as f32 / (w * h) as f32
    }

    #[test]
    fn test_white_noise_tracks_intensity() {
        let share = white_share(NoiseKind::White, 0.25);
        assert!((share - 0.25).abs() < 0.05, "expected ~25% white, got {}", share);
    }

    #[test]
    fn test_blue_noise_tracks_intensity() {
        let share = white_share(NoiseKind::Blue, 0.75);
        assert!((share - 0.75).abs() < 0.05, "expected ~75% white, got {}", share);
    }

    #[test]
    fn test_every_kind_mixes_mid_gray() {
        for kind in NoiseKind::ALL {
            let share = white_share(kind, 0.5);
            assert!(share > 0.2 && share < 0.8, "{} noise gave {} white", kind, share);
        }
    }

    #[test]
    fn test_rejects_bad_strength() {
        assert!(NoiseDither::new(NoiseKind::White, 0, f32::INFINITY).is_err());
    }
}
