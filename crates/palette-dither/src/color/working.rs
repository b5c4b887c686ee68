//! The normalized four-channel working color.

/// Rec.601 luma weights applied to `c1`, `c2`, `c3`.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// A color in the caller's working color space.
///
/// Every channel is a normalized value in `[0, 1]`. Constructors clamp their
/// inputs (NaN becomes `0.0`), so a `WorkingColor` can never hold an
/// out-of-range channel. The engine never interprets the channels beyond
/// treating `c1..c3` as color and the fourth as alpha; what they mean (RGB,
/// Lab, ...) is up to the decoder and metric supplied by the caller.
///
/// # Example
///
/// ```
/// use palette_dither::WorkingColor;
///
/// let c = WorkingColor::new(1.5, 0.5, -0.25, 1.0);
/// assert_eq!(c.channels(), [1.0, 0.5, 0.0, 1.0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorkingColor {
    c1: f32,
    c2: f32,
    c3: f32,
    alpha: f32,
}

#[inline]
fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl WorkingColor {
    /// Opaque black.
    pub const BLACK: Self = Self {
        c1: 0.0,
        c2: 0.0,
        c3: 0.0,
        alpha: 1.0,
    };

    /// Opaque white.
    pub const WHITE: Self = Self {
        c1: 1.0,
        c2: 1.0,
        c3: 1.0,
        alpha: 1.0,
    };

    /// Create a color, clamping every channel to `[0, 1]`.
    #[inline]
    pub fn new(c1: f32, c2: f32, c3: f32, alpha: f32) -> Self {
        Self {
            c1: clamp_unit(c1),
            c2: clamp_unit(c2),
            c3: clamp_unit(c3),
            alpha: clamp_unit(alpha),
        }
    }

    /// Create an opaque color.
    #[inline]
    pub fn opaque(c1: f32, c2: f32, c3: f32) -> Self {
        Self::new(c1, c2, c3, 1.0)
    }

    /// Create an opaque grey with all color channels set to `value`.
    #[inline]
    pub fn gray(value: f32) -> Self {
        Self::new(value, value, value, 1.0)
    }

    /// Create a color from a `[c1, c2, c3, alpha]` array.
    #[inline]
    pub fn from_channels(channels: [f32; 4]) -> Self {
        Self::new(channels[0], channels[1], channels[2], channels[3])
    }

    /// Create a color from 8-bit channels.
    #[inline]
    pub fn from_u8(c1: u8, c2: u8, c3: u8, alpha: u8) -> Self {
        Self {
            c1: c1 as f32 / 255.0,
            c2: c2 as f32 / 255.0,
            c3: c3 as f32 / 255.0,
            alpha: alpha as f32 / 255.0,
        }
    }

    #[inline]
    pub fn c1(&self) -> f32 {
        self.c1
    }

    #[inline]
    pub fn c2(&self) -> f32 {
        self.c2
    }

    #[inline]
    pub fn c3(&self) -> f32 {
        self.c3
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// All four channels as `[c1, c2, c3, alpha]`.
    #[inline]
    pub fn channels(&self) -> [f32; 4] {
        [self.c1, self.c2, self.c3, self.alpha]
    }

    /// The three color channels, without alpha.
    #[inline]
    pub fn color_channels(&self) -> [f32; 3] {
        [self.c1, self.c2, self.c3]
    }

    /// Rec.601 weighted luminance of the color channels.
    #[inline]
    pub fn luminance(&self) -> f32 {
        LUMA_WEIGHTS[0] * self.c1 + LUMA_WEIGHTS[1] * self.c2 + LUMA_WEIGHTS[2] * self.c3
    }

    /// Quantize back to 8-bit channels (round to nearest).
    pub fn to_u8(&self) -> [u8; 4] {
        self.channels().map(|c| (c * 255.0 + 0.5) as u8)
    }

    /// True when every channel differs from `other` by at most `eps`.
    #[inline]
    pub fn is_near(&self, other: &WorkingColor, eps: f32) -> bool {
        let a = self.channels();
        let b = other.channels();
        (0..4).all(|c| (a[c] - b[c]).abs() <= eps)
    }

    /// Add `offset` to the three color channels, leaving alpha untouched.
    #[inline]
    pub fn offset(&self, offset: f32) -> Self {
        Self::new(
            self.c1 + offset,
            self.c2 + offset,
            self.c3 + offset,
            self.alpha,
        )
    }
}
