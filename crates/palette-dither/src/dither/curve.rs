//! Riemersma-style error diffusion along a space-filling curve.
//!
//! The region is visited in curve order. Instead of a 2-D kernel, each pixel
//! receives a weighted sum of the last `history` residuals along the path,
//! with weights decaying exponentially from 1 (most recent) to `decay`
//! (oldest), normalized by their sum.

use tracing::warn;

use crate::api::{validate_strength, DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder};
use crate::curve::{traverse, CurveKind};
use crate::palette::Palette;

use super::diffusion::{apply_error, residual};
use super::Dither;

/// Curve diffusion.
///
/// # Example
///
/// ```
/// use palette_dither::{CurveDither, CurveKind};
///
/// let hilbert = CurveDither::new(CurveKind::Hilbert, 1.0)
///     .unwrap()
///     .with_history(16, 1.0 / 16.0)
///     .unwrap();
/// assert_eq!(hilbert.history(), 16);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CurveDither {
    kind: CurveKind,
    strength: f32,
    history: usize,
    weights: Vec<f32>,
    order: Option<u32>,
}

fn decay_weights(history: usize, decay: f32) -> Vec<f32> {
    let span = (history.saturating_sub(1)).max(1) as f32;
    let raw: Vec<f32> = (0..history).map(|i| decay.powf(i as f32 / span)).collect();
    let sum: f32 = raw.iter().sum();
    raw.into_iter().map(|w| w / sum).collect()
}

impl CurveDither {
    /// Curve diffusion with 16 residuals of history decaying to 1/16.
    pub fn new(kind: CurveKind, strength: f32) -> Result<Self, DitherError> {
        Ok(Self {
            kind,
            strength: validate_strength(strength)?,
            history: 16,
            weights: decay_weights(16, 1.0 / 16.0),
            order: None,
        })
    }

    /// Set the history length and the weight of its oldest entry.
    pub fn with_history(mut self, history: usize, decay: f32) -> Result<Self, DitherError> {
        if history == 0 {
            return Err(DitherError::InvalidParameter {
                name: "history",
                reason: "must keep at least one residual".into(),
            });
        }
        if !(decay > 0.0 && decay <= 1.0) {
            return Err(DitherError::InvalidParameter {
                name: "decay",
                reason: format!("must be in (0, 1], got {}", decay),
            });
        }
        self.history = history;
        self.weights = decay_weights(history, decay);
        Ok(self)
    }

    /// Fix a minimum curve order instead of fitting it to the image.
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    #[inline]
    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    #[inline]
    pub fn history(&self) -> usize {
        self.history
    }
}

impl Dither for CurveDither {
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
        let path = match traverse(self.kind, width, height, region.start_y(), self.order) {
            Ok(path) => path,
            Err(err) => {
                warn!(%err, curve = %self.kind, "falling back to linear traversal");
                (0..height)
                    .flat_map(|y| (0..width).map(move |x| (x, y)))
                    .collect()
            }
        };

        // Ring of recent residuals; `head` is the slot written next.
        let mut ring = vec![[0.0f32; 4]; self.history];
        let mut head = 0usize;
        for (x, y) in path {
            let mut error = [0.0f32; 4];
            for (age, &weight) in self.weights.iter().enumerate() {
                let past = ring[(head + self.history - 1 - age) % self.history];
                for c in 0..4 {
                    error[c] += past[c] * weight * self.strength;
                }
            }
            let adjusted = apply_error(decoder.decode(region.pixel(x, y)), error);
            let (idx, chosen, _) = palette.find_nearest_color(adjusted, metric);
            region.set_index(x, y, idx as u8);
            ring[head] = residual(adjusted, chosen);
            head = (head + 1) % self.history;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Euclidean, IdentityDecoder, WorkingColor};

    fn share(kind: CurveKind, value: f32) -> f32 {
        let palette = Palette::new(vec![WorkingColor::BLACK, WorkingColor::WHITE]).unwrap();
        let (w, h) = (20, 20);
        let pixels = vec![WorkingColor::gray(value); w * h];
        let mut out = vec![0u8; w * h];
        let mut region = PixelRegion::packed(&pixels, &mut out, w, h, 0).unwrap();
        CurveDither::new(kind, 1.0)
            .unwrap()
            .dither(&mut region, &IdentityDecoder, &Euclidean, &palette);
        out.iter().filter(|&&i| i == 1).count() as f32 / (w * h) as f32
    }

    #[test]
    fn test_weights_normalized_and_decaying() {
        let w = decay_weights(8, 0.125);
        assert!((w.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(w.windows(2).all(|p| p[0] >= p[1]), "weights should decay with age");
        assert!((w[7] / w[0] - 0.125).abs() < 1e-5);
    }

    #[test]
    fn test_tracks_intensity_on_every_curve() {
        for kind in [CurveKind::Hilbert, CurveKind::Peano, CurveKind::Linear] {
            let s = share(kind, 0.3);
            assert!((s - 0.3).abs() < 0.1, "{} curve gave {} white for 0.3", kind, s);
        }
    }

    #[test]
    fn test_rejects_bad_history() {
        let d = CurveDither::new(CurveKind::Hilbert, 1.0).unwrap();
        assert!(d.clone().with_history(0, 0.5).is_err());
        assert!(d.with_history(4, 0.0).is_err());
    }

    #[test]
    fn test_every_pixel_written() {
        let palette = Palette::new(vec![WorkingColor::BLACK, WorkingColor::WHITE]).unwrap();
        let pixels = vec![WorkingColor::WHITE; 7 * 5];
        let mut out = vec![9u8; 7 * 5];
        let mut region = PixelRegion::packed(&pixels, &mut out, 7, 5, 3).unwrap();
        CurveDither::new(CurveKind::Peano, 1.0)
            .unwrap()
            .dither(&mut region, &IdentityDecoder, &Euclidean, &palette);
        assert!(out.iter().all(|&i| i == 1));
    }
}
