//! Content-adaptive dispatch over error-diffusion strategies.
//!
//! The region is split into square blocks. Each block is classified from
//! its Sobel edge strength, color variance, brightness and gradient
//! coherence ([`stats`]). Block labels are expanded to pixels and
//! majority-smoothed ([`label_map`]), every strategy that owns at least one
//! pixel dithers the whole region into a scratch buffer, and the final
//! indices are composited from those buffers by label.

pub mod label_map;
pub mod stats;

use std::fmt;

use tracing::debug;

use crate::api::{DitherError, PixelRegion};
use crate::color::{ColorMetric, PixelDecoder, WorkingColor};
use crate::palette::Palette;

use super::diffusion::ErrorDiffusion;
use super::kernel::{ATKINSON, FLOYD_STEINBERG, JARVIS_JUDICE_NINKE, SIERRA_TWO_ROW, STUCKI};
use super::{Algorithm, Dither};

pub use label_map::LabelMap;
pub use stats::BlockStats;

/// Content classes a block can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentClass {
    /// Strong coherent edges: text, line art.
    Structure,
    /// Low-variance directional gradients.
    Smooth,
    /// High-variance texture.
    Detail,
    /// Near-black or near-white areas.
    Extreme,
    Balanced,
}

impl ContentClass {
    pub const COUNT: usize = 5;

    pub const ALL: [ContentClass; Self::COUNT] = [
        ContentClass::Structure,
        ContentClass::Smooth,
        ContentClass::Detail,
        ContentClass::Extreme,
        ContentClass::Balanced,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ContentClass::Structure => "structure",
            ContentClass::Smooth => "smooth",
            ContentClass::Detail => "detail",
            ContentClass::Extreme => "extreme",
            ContentClass::Balanced => "balanced",
        }
    }
}

impl fmt::Display for ContentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Content-adaptive ditherer.
///
/// Default mapping: structure → Stucki, smooth → Jarvis-Judice-Ninke,
/// detail → Floyd-Steinberg, extreme → Atkinson, balanced → Sierra
/// Two-Row, all serpentine.
#[derive(Debug, Clone)]
pub struct AdaptiveDither {
    block_size: usize,
    smoothing_radius: usize,
    strategies: Vec<Algorithm>,
}

impl AdaptiveDither {
    pub fn new() -> Result<Self, DitherError> {
        Self::with_serpentine(true)
    }

    /// Default mapping with the given scan order for every strategy.
    pub fn with_serpentine(serpentine: bool) -> Result<Self, DitherError> {
        let kernels = [&STUCKI, &JARVIS_JUDICE_NINKE, &FLOYD_STEINBERG, &ATKINSON, &SIERRA_TWO_ROW];
        let strategies = kernels
            .into_iter()
            .map(|k| ErrorDiffusion::preset(k).map(|d| Algorithm::from(d.serpentine(serpentine))))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            block_size: 8,
            smoothing_radius: 2,
            strategies,
        })
    }

    /// Block edge in pixels, `2..=64`.
    pub fn with_block_size(mut self, block_size: usize) -> Result<Self, DitherError> {
        if !(2..=64).contains(&block_size) {
            return Err(DitherError::InvalidParameter {
                name: "block_size",
                reason: format!("must be between 2 and 64, got {}", block_size),
            });
        }
        self.block_size = block_size;
        Ok(self)
    }

    /// Majority-filter radius in pixels; 0 disables smoothing.
    pub fn with_smoothing_radius(mut self, radius: usize) -> Self {
        self.smoothing_radius = radius;
        self
    }

    /// Replace the strategy used for `class`.
    pub fn with_strategy(mut self, class: ContentClass, algorithm: Algorithm) -> Result<Self, DitherError> {
        if matches!(algorithm, Algorithm::Adaptive(_)) {
            return Err(DitherError::InvalidParameter {
                name: "strategy",
                reason: "adaptive dispatch cannot nest".into(),
            });
        }
        self.strategies[class as usize] = algorithm;
        Ok(self)
    }

    #[inline]
    pub fn strategy(&self, class: ContentClass) -> &Algorithm {
        &self.strategies[class as usize]
    }

    /// Smoothed per-pixel labels for `region`.
    pub fn classify<P, D>(&self, region: &PixelRegion<'_, P>, decoder: &D) -> LabelMap
    where
        D: PixelDecoder<P> + ?Sized,
    {
        let (width, height) = (region.width(), region.height());
        let colors: Vec<WorkingColor> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| decoder.decode(region.pixel(x, y)))
            .collect();
        let plane = stats::Plane::new(&colors, width, height);

        let bs = self.block_size;
        let blocks_x = width.div_ceil(bs);
        let blocks_y = height.div_ceil(bs);
        let mut blocks = Vec::with_capacity(blocks_x * blocks_y);
        for by in 0..blocks_y {
            for bx in 0..blocks_x {
                let (x0, y0) = (bx * bs, by * bs);
                let block = plane.block(x0, y0, (x0 + bs).min(width), (y0 + bs).min(height));
                blocks.push(block.classify());
            }
        }
        LabelMap::from_blocks(&blocks, blocks_x, bs, width, height).smooth(self.smoothing_radius)
    }
}

impl Dither for AdaptiveDither {
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
        let labels = self.classify(region, decoder);
        let histogram = labels.histogram();
        debug!(
            width,
            height,
            structure = histogram[ContentClass::Structure as usize],
            smooth = histogram[ContentClass::Smooth as usize],
            detail = histogram[ContentClass::Detail as usize],
            extreme = histogram[ContentClass::Extreme as usize],
            balanced = histogram[ContentClass::Balanced as usize],
            "adaptive classification"
        );

        let mut scratch = vec![0u8; width * height];
        for class in ContentClass::ALL {
            if histogram[class as usize] == 0 {
                continue;
            }
            // Strategies see the whole region so their error state is continuous.
            // Scratch holds `width * height` indices at stride `width`, which
            // `with_dest` always accepts.
            let Ok(mut pass) = region.with_dest(&mut scratch, width) else {
                debug_assert!(false, "scratch buffer rejected for a {}x{} region", width, height);
                continue;
            };
            self.strategy(class).dither(&mut pass, decoder, metric, palette);
            for y in 0..height {
                for x in 0..width {
                    if labels.get(x, y) == class {
                        region.set_index(x, y, scratch[y * width + x]);
                    }
                }
            }
        }
    }
}
