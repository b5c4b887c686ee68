//! Palette types and nearest-color lookup

mod error;
mod palette;

pub use error::{PaletteError, ParseColorError};
pub use palette::{parse_hex, Palette, EXACT_MATCH_EPSILON, MAX_PALETTE_SIZE};
