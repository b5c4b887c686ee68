//! Void-and-cluster blue-noise rank matrices.
//!
//! Two passes over an `n x n` torus, both starting from a checkerboard seed
//! holding `n² / 2` "on" cells:
//!
//! 1. Cluster removal: turn off the "on" cell with the highest Gaussian
//!    energy (the tightest cluster), giving it the next-lower rank, until
//!    none remain.
//! 2. Void filling: from the restored seed, turn on the "off" cell with the
//!    lowest energy (the largest void), giving it the next-higher rank,
//!    until every cell is on.
//!
//! The energy field is updated incrementally on every toggle, so a build
//! costs `O(n⁴)`. Matrices are still too expensive to rebuild per call;
//! [`cached`] keeps one immutable copy per size for the whole process.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use super::ThresholdMatrix;
use crate::api::DitherError;

/// Largest supported void-and-cluster size.
pub const MAX_VOID_AND_CLUSTER_SIZE: usize = 128;

static MATRIX_CACHE: OnceLock<RwLock<HashMap<usize, Arc<ThresholdMatrix>>>> = OnceLock::new();

/// Void-and-cluster matrix builder.
///
/// # Example
///
/// ```
/// use palette_dither::matrix::void_and_cluster::VoidAndCluster;
///
/// let matrix = VoidAndCluster::new(8).unwrap().build().unwrap();
/// assert_eq!(matrix.size(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoidAndCluster {
    size: usize,
    sigma: f32,
}

impl VoidAndCluster {
    /// Builder for an `size x size` matrix with `sigma = size / 4`.
    pub fn new(size: usize) -> Result<Self, DitherError> {
        if !(2..=MAX_VOID_AND_CLUSTER_SIZE).contains(&size) {
            return Err(DitherError::InvalidMatrixSize {
                size,
                reason: "void-and-cluster size must be between 2 and 128",
            });
        }
        Ok(Self {
            size,
            sigma: (size as f32 / 4.0).max(1.0),
        })
    }

    /// Override the Gaussian energy radius.
    pub fn with_sigma(mut self, sigma: f32) -> Result<Self, DitherError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(DitherError::InvalidParameter {
                name: "sigma",
                reason: format!("must be a positive finite value, got {}", sigma),
            });
        }
        self.sigma = sigma;
        Ok(self)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// Row-major rank permutation of `0..size²`.
    pub fn build_ranks(&self) -> Vec<u32> {
        let n = self.size;
        let cells = n * n;
        let seed = checkerboard(n);
        let ones = seed.iter().filter(|&&on| on).count();
        let mut ranks = vec![0u32; cells];

        let mut pattern = seed.clone();
        let mut field = EnergyField::from_pattern(n, self.sigma, &pattern);
        let mut rank = ones;
        while rank > 0 {
            let idx = field.tightest_cluster(&pattern);
            pattern[idx] = false;
            field.toggle(idx, -1.0);
            rank -= 1;
            ranks[idx] = rank as u32;
        }

        let mut pattern = seed;
        let mut field = EnergyField::from_pattern(n, self.sigma, &pattern);
        for rank in ones..cells {
            let idx = field.largest_void(&pattern);
            pattern[idx] = true;
            field.toggle(idx, 1.0);
            ranks[idx] = rank as u32;
        }
        ranks
    }

    /// Build the normalized threshold matrix.
    pub fn build(&self) -> Result<ThresholdMatrix, DitherError> {
        ThresholdMatrix::from_ranks(self.size, self.build_ranks())
    }
}

/// Shared, lazily built matrix for `size` (default sigma).
///
/// The first request for a size builds the matrix; later requests get the
/// same `Arc`. Two threads racing on a new size may both build it, and one
/// result wins. The build is deterministic, so both are identical.
pub fn cached(size: usize) -> Result<Arc<ThresholdMatrix>, DitherError> {
    let cache = MATRIX_CACHE.get_or_init(|| RwLock::new(HashMap::new()));
    if let Some(hit) = cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&size)
    {
        return Ok(Arc::clone(hit));
    }

    let matrix = Arc::new(VoidAndCluster::new(size)?.build()?);
    debug!(size, "built void-and-cluster matrix");

    let mut guard = cache.write().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(guard.entry(size).or_insert(matrix)))
}

/// First `n² / 2` cells of the `(x + y)` even checkerboard.
fn checkerboard(n: usize) -> Vec<bool> {
    let target = n * n / 2;
    let mut placed = 0;
    let mut pattern = vec![false; n * n];
    for y in 0..n {
        for x in 0..n {
            if (x + y) % 2 == 0 && placed < target {
                pattern[y * n + x] = true;
                placed += 1;
            }
        }
    }
    pattern
}

/// Gaussian-weighted "on" density at every cell of the torus.
struct EnergyField {
    size: usize,
    lut: Vec<f32>,
    energy: Vec<f32>,
}

impl EnergyField {
    fn from_pattern(size: usize, sigma: f32, pattern: &[bool]) -> Self {
        let two_sigma_sq = 2.0 * sigma * sigma;
        let mut lut = vec![0.0f32; size * size];
        for dy in 0..size {
            let ty = dy.min(size - dy) as f32;
            for dx in 0..size {
                let tx = dx.min(size - dx) as f32;
                lut[dy * size + dx] = (-(tx * tx + ty * ty) / two_sigma_sq).exp();
            }
        }
        let mut field = Self {
            size,
            lut,
            energy: vec![0.0; size * size],
        };
        for (idx, &on) in pattern.iter().enumerate() {
            if on {
                field.toggle(idx, 1.0);
            }
        }
        field
    }

    fn toggle(&mut self, idx: usize, sign: f32) {
        let n = self.size;
        let (cx, cy) = (idx % n, idx / n);
        for y in 0..n {
            let dy = (y + n - cy) % n;
            let lut_row = &self.lut[dy * n..(dy + 1) * n];
            let row = &mut self.energy[y * n..(y + 1) * n];
            for (x, e) in row.iter_mut().enumerate() {
                *e += sign * lut_row[(x + n - cx) % n];
            }
        }
    }

    /// Highest-energy "on" cell, lowest index on ties.
    fn tightest_cluster(&self, pattern: &[bool]) -> usize {
        let mut best = 0;
        let mut best_energy = f32::NEG_INFINITY;
        for (idx, (&on, &e)) in pattern.iter().zip(&self.energy).enumerate() {
            if on && e > best_energy {
                best_energy = e;
                best = idx;
            }
        }
        best
    }

    /// Lowest-energy "off" cell, lowest index on ties.
    fn largest_void(&self, pattern: &[bool]) -> usize {
        let mut best = 0;
        let mut best_energy = f32::INFINITY;
        for (idx, (&on, &e)) in pattern.iter().zip(&self.energy).enumerate() {
            if !on && e < best_energy {
                best_energy = e;
                best = idx;
            }
        }
        best
    }
}
