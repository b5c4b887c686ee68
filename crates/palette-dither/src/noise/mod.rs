//! Coordinate-hashed noise thresholds.
//!
//! Every generator is a pure function of `(x, y, seed)`: no state is shared
//! between pixels, so noise dithering can be split across threads freely.
//! All spectra produce thresholds in `[-0.5, 0.5]` with roughly the standard
//! deviation of uniform white noise (`1 / sqrt(12)`), so one strength setting
//! behaves similarly across kinds.

use std::fmt;
use std::sync::Arc;

use crate::api::DitherError;
use crate::matrix::void_and_cluster;
use crate::matrix::ThresholdMatrix;

/// Tile size sampled by [`NoiseKind::Blue`].
pub const BLUE_NOISE_TILE: usize = 32;

/// Octaves summed by the pink and brown lattice generators.
const OCTAVES: u32 = 5;

/// Noise spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoiseKind {
    /// Flat spectrum, independent per pixel.
    #[default]
    White,
    /// High-frequency only; sampled from a cached void-and-cluster tile.
    Blue,
    /// `1/f`: equal energy per octave.
    Pink,
    /// `1/f²`: energy dominated by coarse octaves.
    Brown,
    /// `f²`: Laplacian high-pass of white noise.
    Violet,
    /// Mix of violet and brown, losing the mid band.
    Grey,
}

impl NoiseKind {
    pub const ALL: [NoiseKind; 6] = [
        NoiseKind::White,
        NoiseKind::Blue,
        NoiseKind::Pink,
        NoiseKind::Brown,
        NoiseKind::Violet,
        NoiseKind::Grey,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NoiseKind::White => "white",
            NoiseKind::Blue => "blue",
            NoiseKind::Pink => "pink",
            NoiseKind::Brown => "brown",
            NoiseKind::Violet => "violet",
            NoiseKind::Grey => "grey",
        }
    }
}

impl fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-coordinate threshold source for one [`NoiseKind`].
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    kind: NoiseKind,
    seed: u32,
    tile: Option<Arc<ThresholdMatrix>>,
}

impl NoiseGenerator {
    /// Create a generator. Blue noise fetches (or builds) its shared tile here.
    pub fn new(kind: NoiseKind, seed: u32) -> Result<Self, DitherError> {
        let tile = match kind {
            NoiseKind::Blue => Some(void_and_cluster::cached(BLUE_NOISE_TILE)?),
            _ => None,
        };
        Ok(Self { kind, seed, tile })
    }

    #[inline]
    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Threshold in `[-0.5, 0.5]` at absolute image coordinates.
    pub fn threshold(&self, x: usize, y: usize) -> f32 {
        let (x, y) = (x as i64, y as i64);
        let value = match self.kind {
            NoiseKind::White => self.white(x, y, 0),
            NoiseKind::Blue => self.blue(x, y),
            NoiseKind::Pink => self.lattice(x, y, |_| 1.0),
            NoiseKind::Brown => self.lattice(x, y, |k| (1u32 << k) as f32),
            NoiseKind::Violet => self.violet(x, y),
            NoiseKind::Grey => {
                (self.violet(x, y) + self.lattice(x, y, |k| (1u32 << k) as f32))
                    * 0.5
                    * std::f32::consts::SQRT_2
            }
        };
        value.clamp(-0.5, 0.5)
    }

    #[inline]
    fn white(&self, x: i64, y: i64, layer: u32) -> f32 {
        let h = hash_coords(x as u32, y as u32, self.seed.wrapping_add(layer.wrapping_mul(0x9e37_79b9)));
        h as f32 / u32::MAX as f32 - 0.5
    }

    fn blue(&self, x: i64, y: i64) -> f32 {
        match &self.tile {
            Some(tile) => {
                // The seed shifts the tile so different seeds decorrelate.
                let ox = (self.seed & 0xffff) as usize;
                let oy = (self.seed >> 16) as usize;
                tile.threshold(x as usize + ox, y as usize + oy)
            }
            None => self.white(x, y, 0),
        }
    }

    /// Sum of blocky lattice octaves weighted by `weight(octave)`,
    /// rescaled to the white-noise deviation.
    fn lattice(&self, x: i64, y: i64, weight: impl Fn(u32) -> f32) -> f32 {
        let mut sum = 0.0;
        let mut norm = 0.0;
        for k in 0..OCTAVES {
            let w = weight(k);
            sum += w * self.white(x >> k, y >> k, k + 1);
            norm += w * w;
        }
        sum / norm.sqrt()
    }

    fn violet(&self, x: i64, y: i64) -> f32 {
        let neighbours = self.white(x - 1, y, 0)
            + self.white(x + 1, y, 0)
            + self.white(x, y - 1, 0)
            + self.white(x, y + 1, 0);
        // Variance of w - n/4 is 1.25x the white variance.
        (self.white(x, y, 0) - 0.25 * neighbours) / 1.25f32.sqrt()
    }
}

/// Murmur3-style avalanche over packed coordinates.
#[inline]
pub fn hash_coords(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed ^ x.wrapping_mul(0x27d4_eb2d);
    h = h.rotate_left(13) ^ y.wrapping_mul(0x1656_67b1);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}
