// Coefficient tables and index-heavy kernels read better as written.
#![allow(
    clippy::excessive_precision,
    clippy::needless_range_loop,
    clippy::module_inception,
    clippy::doc_overindented_list_items,
    clippy::manual_range_contains,
    clippy::too_many_arguments
)]

//! palette-dither: palette quantization and dithering
//!
//! Maps pixels of any storage format to indices into a fixed palette of at
//! most 256 colors, using one of a closed set of strategies: plain nearest
//! color, error diffusion, ordered and noise thresholds, space-filling
//! curves, Direct Binary Search, content-adaptive dispatch or
//! candidate-mixing.
//!
//! # Quick Start
//!
//! ```
//! use palette_dither::{Dither, ErrorDiffusion, Euclidean, Palette, PixelRegion, Rgba8Decoder};
//! use palette_dither::dither::kernel::FLOYD_STEINBERG;
//!
//! let palette = Palette::from_hex(&["#000000", "#ffffff"]).unwrap();
//! let pixels = vec![[128u8, 128, 128, 255]; 64];
//! let mut indices = vec![0u8; 64];
//!
//! let mut region = PixelRegion::packed(&pixels, &mut indices, 8, 8, 0).unwrap();
//! ErrorDiffusion::new(&FLOYD_STEINBERG, 1.0)
//!     .unwrap()
//!     .dither(&mut region, &Rgba8Decoder, &Euclidean, &palette);
//!
//! let white = indices.iter().filter(|&&i| i == 1).count();
//! assert!(white > 16 && white < 48);
//! ```
//!
//! # Collaborators
//!
//! The engine never touches pixel formats or color spaces directly. Each
//! call receives:
//!
//! - a [`PixelDecoder`] turning one storage pixel into a [`WorkingColor`]
//!   (four channels clamped to `[0, 1]`),
//! - a [`ColorMetric`] measuring distance between working colors,
//! - a [`Palette`] of working colors.
//!
//! Decoders and metrics are traits with blanket impls for closures, so any
//! conversion can be plugged in.
//!
//! # Regions and slicing
//!
//! A [`PixelRegion`] describes source and destination buffers with their
//! strides plus `start_y`, the absolute row of the region's first line.
//! Threshold-based strategies index their matrices by absolute row, so an
//! image cut into horizontal slices tiles seamlessly. Error-carrying
//! strategies report [`Dither::requires_sequential_processing`]; slicing
//! those loses error propagation across slice edges, so callers should give
//! them the whole image.
//!
//! # Shared resources
//!
//! Void-and-cluster matrices are expensive to build and are cached per size
//! in a process-wide, read-only cache ([`matrix::void_and_cluster::cached`]).
//! Nothing else is shared between calls.

pub mod api;
pub mod color;
pub mod curve;
pub mod dither;
pub mod matrix;
pub mod noise;
pub mod palette;


pub use api::{DitherError, PixelRegion};
pub use color::{
    ColorMetric, Euclidean, Gray8Decoder, IdentityDecoder, Manhattan, PixelDecoder, Rgb8Decoder, Rgba8Decoder,
    WeightedEuclidean, WorkingColor,
};
pub use curve::CurveKind;
pub use dither::{
    AdaptiveDither, Algorithm, Barycentric, ContentClass, CurveDither, DirectBinarySearch, Dither, ErrorDiffusion,
    Kernel, Knoll, NClosest, NConvex, NaturalNeighbour, NoDither, NoiseDither, OrderedDither, Ostromoukhov,
    ScanOrder, Tin, Yliluoma,
};
pub use matrix::ThresholdMatrix;
pub use noise::NoiseKind;
pub use palette::{Palette, PaletteError, ParseColorError, EXACT_MATCH_EPSILON};
