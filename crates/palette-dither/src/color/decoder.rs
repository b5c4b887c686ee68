//! Storage pixel decoders.
//!
//! A decoder unpacks one storage pixel into a [`WorkingColor`]. The engine
//! calls it once per pixel visit and never looks at the storage format itself.

use super::WorkingColor;

/// Converts a storage pixel into a [`WorkingColor`].
///
/// Any `Fn(&P) -> WorkingColor` closure is a decoder:
///
/// ```
/// use palette_dither::{PixelDecoder, WorkingColor};
///
/// let decoder = |p: &u16| WorkingColor::gray(*p as f32 / 65535.0);
/// assert_eq!(decoder.decode(&65535), WorkingColor::WHITE);
/// ```
pub trait PixelDecoder<P: ?Sized> {
    /// Decode one storage pixel.
    fn decode(&self, pixel: &P) -> WorkingColor;
}

impl<P: ?Sized, F> PixelDecoder<P> for F
where
    F: Fn(&P) -> WorkingColor,
{
    #[inline]
    fn decode(&self, pixel: &P) -> WorkingColor {
        self(pixel)
    }
}

/// Decoder for 8-bit RGBA pixels stored as `[u8; 4]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rgba8Decoder;

impl PixelDecoder<[u8; 4]> for Rgba8Decoder {
    #[inline]
    fn decode(&self, pixel: &[u8; 4]) -> WorkingColor {
        WorkingColor::from_u8(pixel[0], pixel[1], pixel[2], pixel[3])
    }
}

/// Decoder for opaque 8-bit RGB pixels stored as `[u8; 3]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rgb8Decoder;

impl PixelDecoder<[u8; 3]> for Rgb8Decoder {
    #[inline]
    fn decode(&self, pixel: &[u8; 3]) -> WorkingColor {
        WorkingColor::from_u8(pixel[0], pixel[1], pixel[2], 255)
    }
}

/// Decoder for 8-bit greyscale pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gray8Decoder;

impl PixelDecoder<u8> for Gray8Decoder {
    #[inline]
    fn decode(&self, pixel: &u8) -> WorkingColor {
        WorkingColor::from_u8(*pixel, *pixel, *pixel, 255)
    }
}

/// Pass-through decoder for buffers that already hold working colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityDecoder;

impl PixelDecoder<WorkingColor> for IdentityDecoder {
    #[inline]
    fn decode(&self, pixel: &WorkingColor) -> WorkingColor {
        *pixel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba8_decoder() {
        let c = Rgba8Decoder.decode(&[255, 0, 51, 102]);
        assert_eq!(c.c1(), 1.0);
        assert_eq!(c.c2(), 0.0);
        assert!((c.c3() - 0.2).abs() < 1e-6);
        assert!((c.alpha() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_rgb8_decoder_is_opaque() {
        assert_eq!(Rgb8Decoder.decode(&[0, 0, 0]), WorkingColor::BLACK);
    }

    #[test]
    fn test_gray8_decoder() {
        assert_eq!(Gray8Decoder.decode(&255), WorkingColor::WHITE);
    }

    #[test]
    fn test_closure_decoder() {
        let decoder = |p: &f32| WorkingColor::gray(*p);
        assert_eq!(decoder.decode(&0.0), WorkingColor::BLACK);
    }
}
