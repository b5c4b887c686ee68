//! Public API surface: the [`DitherError`] error type and [`PixelRegion`].

mod error;
mod region;

pub(crate) use error::validate_strength;
pub use error::DitherError;
pub use region::PixelRegion;
