//! Named algorithm presets.
//!
//! Maps the kebab-case names accepted on the command line to configured
//! [`Algorithm`] values. Strength scales each preset's own default and the
//! serpentine flag applies to diffusion-style strategies only.

use std::sync::Arc;

use palette_dither::dither::kernel::{self, Kernel};
use palette_dither::matrix::{bayer, halftone, void_and_cluster};
use palette_dither::{
    AdaptiveDither, Algorithm, Barycentric, CurveDither, CurveKind, DirectBinarySearch, DitherError,
    ErrorDiffusion, Knoll, NClosest, NConvex, NaturalNeighbour, NoDither, NoiseDither, NoiseKind, OrderedDither,
    Ostromoukhov, ScanOrder, ThresholdMatrix, Tin, Yliluoma,
};

use crate::error::CatalogError;

/// Candidate count for the `n-closest` and `n-convex` presets
const CANDIDATE_COUNT: usize = 4;

/// Bayer size for the `knoll` preset
const KNOLL_SIZE: usize = 4;

#[derive(Debug, Clone, Copy)]
enum Preset {
    None,
    Diffusion(&'static Kernel),
    Ostromoukhov,
    Bayer(usize),
    Halftone(usize),
    VoidAndCluster(usize),
    Noise(NoiseKind),
    Curve(CurveKind),
    DirectBinarySearch,
    Adaptive,
    Knoll,
    Yliluoma,
    Barycentric,
    Tin,
    NaturalNeighbour,
    NClosest,
    NConvex,
}

/// One named preset.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub description: &'static str,
    /// Whether the built algorithm must see the whole image in one pass
    pub sequential: bool,
    preset: Preset,
}

const fn entry(name: &'static str, description: &'static str, sequential: bool, preset: Preset) -> CatalogEntry {
    CatalogEntry {
        name,
        description,
        sequential,
        preset,
    }
}

static CATALOG: &[CatalogEntry] = &[
    entry("none", "Nearest palette color, no dithering", false, Preset::None),
    entry(
        "floyd-steinberg",
        "Floyd-Steinberg error diffusion",
        true,
        Preset::Diffusion(&kernel::FLOYD_STEINBERG),
    ),
    entry(
        "false-floyd-steinberg",
        "Three-tap Floyd-Steinberg approximation",
        true,
        Preset::Diffusion(&kernel::FALSE_FLOYD_STEINBERG),
    ),
    entry(
        "jarvis-judice-ninke",
        "Jarvis, Judice and Ninke 12-tap diffusion",
        true,
        Preset::Diffusion(&kernel::JARVIS_JUDICE_NINKE),
    ),
    entry("stucki", "Stucki 12-tap diffusion", true, Preset::Diffusion(&kernel::STUCKI)),
    entry("burkes", "Burkes two-row diffusion", true, Preset::Diffusion(&kernel::BURKES)),
    entry("sierra", "Sierra three-row diffusion", true, Preset::Diffusion(&kernel::SIERRA)),
    entry(
        "sierra-two-row",
        "Sierra two-row diffusion",
        true,
        Preset::Diffusion(&kernel::SIERRA_TWO_ROW),
    ),
    entry(
        "sierra-lite",
        "Sierra Lite three-tap diffusion",
        true,
        Preset::Diffusion(&kernel::SIERRA_LITE),
    ),
    entry(
        "atkinson",
        "Atkinson diffusion, 3/4 of the error",
        true,
        Preset::Diffusion(&kernel::ATKINSON),
    ),
    entry(
        "stevenson-arce",
        "Stevenson-Arce hexagonal-grid diffusion",
        true,
        Preset::Diffusion(&kernel::STEVENSON_ARCE),
    ),
    entry("shiau-fan", "Shiau-Fan diffusion", true, Preset::Diffusion(&kernel::SHIAU_FAN)),
    entry(
        "shiau-fan-2",
        "Shiau-Fan second variant",
        true,
        Preset::Diffusion(&kernel::SHIAU_FAN_2),
    ),
    entry("fan", "Fan diffusion", true, Preset::Diffusion(&kernel::FAN)),
    entry("two-d", "Two-tap right/down diffusion", true, Preset::Diffusion(&kernel::TWO_D)),
    entry(
        "ostromoukhov",
        "Ostromoukhov variable-coefficient diffusion",
        true,
        Preset::Ostromoukhov,
    ),
    entry("bayer-2", "Ordered dither, Bayer 2x2", false, Preset::Bayer(2)),
    entry("bayer-4", "Ordered dither, Bayer 4x4", false, Preset::Bayer(4)),
    entry("bayer-8", "Ordered dither, Bayer 8x8", false, Preset::Bayer(8)),
    entry("bayer-16", "Ordered dither, Bayer 16x16", false, Preset::Bayer(16)),
    entry("halftone-3", "Clustered-dot halftone 3x3", false, Preset::Halftone(3)),
    entry("halftone-4", "Clustered-dot halftone 4x4", false, Preset::Halftone(4)),
    entry("halftone-8", "Clustered-dot halftone 8x8", false, Preset::Halftone(8)),
    entry(
        "void-and-cluster-16",
        "Blue-noise threshold matrix 16x16",
        false,
        Preset::VoidAndCluster(16),
    ),
    entry(
        "void-and-cluster-32",
        "Blue-noise threshold matrix 32x32",
        false,
        Preset::VoidAndCluster(32),
    ),
    entry(
        "void-and-cluster-64",
        "Blue-noise threshold matrix 64x64",
        false,
        Preset::VoidAndCluster(64),
    ),
    entry("noise-white", "White noise threshold", false, Preset::Noise(NoiseKind::White)),
    entry("noise-blue", "Blue noise threshold", false, Preset::Noise(NoiseKind::Blue)),
    entry("noise-pink", "Pink noise threshold", false, Preset::Noise(NoiseKind::Pink)),
    entry("noise-brown", "Brown noise threshold", false, Preset::Noise(NoiseKind::Brown)),
    entry("noise-violet", "Violet noise threshold", false, Preset::Noise(NoiseKind::Violet)),
    entry("noise-grey", "Grey noise threshold", false, Preset::Noise(NoiseKind::Grey)),
    entry(
        "curve-hilbert",
        "Riemersma error history along a Hilbert curve",
        true,
        Preset::Curve(CurveKind::Hilbert),
    ),
    entry(
        "curve-peano",
        "Riemersma error history along a Peano curve",
        true,
        Preset::Curve(CurveKind::Peano),
    ),
    entry(
        "curve-linear",
        "Riemersma error history in raster order",
        true,
        Preset::Curve(CurveKind::Linear),
    ),
    entry(
        "dbs",
        "Direct Binary Search, iterative error minimization",
        true,
        Preset::DirectBinarySearch,
    ),
    entry(
        "adaptive",
        "Per-block strategy chosen from image content",
        true,
        Preset::Adaptive,
    ),
    entry("knoll", "Knoll pattern dithering, 16 candidates", false, Preset::Knoll),
    entry("yliluoma", "Yliluoma mixing plan", false, Preset::Yliluoma),
    entry(
        "barycentric",
        "Mix of the three closest colors by barycentric weight",
        false,
        Preset::Barycentric,
    ),
    entry("tin", "Mix of the four closest colors by tetrahedral weight", false, Preset::Tin),
    entry(
        "natural-neighbour",
        "Mix of unshadowed close colors by inverse distance",
        false,
        Preset::NaturalNeighbour,
    ),
    entry(
        "n-closest",
        "Mix of the four closest colors by inverse distance",
        false,
        Preset::NClosest,
    ),
    entry(
        "n-convex",
        "Convex mix of the four closest colors",
        false,
        Preset::NConvex,
    ),
];

impl CatalogEntry {
    /// Build the preset with `strength` in `[0, 1]`.
    pub fn build(&self, strength: f32, serpentine: bool) -> Result<Algorithm, DitherError> {
        let scan = if serpentine {
            ScanOrder::Serpentine
        } else {
            ScanOrder::Linear
        };

        let algorithm: Algorithm = match self.preset {
            Preset::None => NoDither.into(),
            Preset::Diffusion(kernel) => ErrorDiffusion::new(kernel, kernel.default_strength * strength)?
                .with_scan(scan)
                .into(),
            Preset::Ostromoukhov => Ostromoukhov::new(strength)?.with_scan(scan).into(),
            Preset::Bayer(size) => OrderedDither::bayer(size, strength)?.into(),
            Preset::Halftone(size) => OrderedDither::halftone(size, strength)?.into(),
            Preset::VoidAndCluster(size) => OrderedDither::void_and_cluster(size, strength)?.into(),
            Preset::Noise(kind) => NoiseDither::new(kind, 0, strength)?.into(),
            Preset::Curve(kind) => CurveDither::new(kind, strength)?.into(),
            Preset::DirectBinarySearch => DirectBinarySearch::new().into(),
            Preset::Adaptive => AdaptiveDither::with_serpentine(serpentine)?.into(),
            Preset::Knoll => Knoll::new(KNOLL_SIZE)?.with_multiplier(strength)?.into(),
            Preset::Yliluoma => Yliluoma::new()?.into(),
            Preset::Barycentric => Barycentric::new()?.into(),
            Preset::Tin => Tin::new()?.into(),
            Preset::NaturalNeighbour => NaturalNeighbour::new()?.into(),
            Preset::NClosest => NClosest::new(CANDIDATE_COUNT)?.into(),
            Preset::NConvex => NConvex::new(CANDIDATE_COUNT)?.into(),
        };
        Ok(algorithm)
    }
}

/// All presets in listing order.
pub fn entries() -> &'static [CatalogEntry] {
    CATALOG
}

/// Look up a preset by name, case-insensitively.
pub fn find(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|e| e.name.eq_ignore_ascii_case(name))
}

/// Resolve a preset name to a configured algorithm.
pub fn resolve(name: &str, strength: f32, serpentine: bool) -> Result<Algorithm, CatalogError> {
    let entry = find(name).ok_or_else(|| CatalogError::UnknownAlgorithm(name.to_string()))?;
    tracing::debug!(algorithm = entry.name, strength, serpentine, "Resolved algorithm");
    Ok(entry.build(strength, serpentine)?)
}

/// Threshold matrix families printable by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MatrixKind {
    Bayer,
    VoidAndCluster,
    Halftone,
}

impl MatrixKind {
    pub fn build(self, size: usize) -> Result<Arc<ThresholdMatrix>, DitherError> {
        match self {
            MatrixKind::Bayer => Ok(Arc::new(bayer::bayer_matrix(size)?)),
            MatrixKind::VoidAndCluster => void_and_cluster::cached(size),
            MatrixKind::Halftone => Ok(Arc::new(halftone::halftone_matrix(size)?)),
        }
    }
}
