//! Working color model.
//!
//! The engine only depends on three things from the caller's color space:
//!
//! - [`WorkingColor`]: four normalized channels `(c1, c2, c3, alpha)`
//! - [`PixelDecoder`]: unpacks a storage pixel into a working color
//! - [`ColorMetric`]: distance between two working colors
//!
//! Color space conversion formulas are deliberately absent; stock decoders
//! and metrics cover the common 8-bit cases.

mod decoder;
mod metric;
mod working;

pub use decoder::{Gray8Decoder, IdentityDecoder, PixelDecoder, Rgb8Decoder, Rgba8Decoder};
pub use metric::{ColorMetric, Euclidean, Manhattan, WeightedEuclidean};
pub use working::{WorkingColor, LUMA_WEIGHTS};
