//! Dithering strategies.
//!
//! Every strategy implements [`Dither`]: given a [`PixelRegion`], a storage
//! decoder, a color metric and a palette, it writes one palette index per
//! region pixel. Strategies differ in the state they carry across pixels:
//!
//! - **Stateless** ([`NoDither`], [`OrderedDither`], [`NoiseDither`] and the
//!   candidate-mixing family): each pixel depends only on its own color and
//!   absolute coordinates. Any partition of the image is safe.
//! - **Sequential** ([`ErrorDiffusion`], [`Ostromoukhov`], [`CurveDither`],
//!   [`DirectBinarySearch`], [`AdaptiveDither`]): pixels depend on error
//!   produced by earlier pixels, so a region must be processed in one pass.
//!
//! [`Dither::requires_sequential_processing`] reports which class a strategy
//! belongs to; scheduling is left to the caller.
//!
//! [`Algorithm`] is the closed set of strategies, resolved before the pixel
//! loop starts so the hot loops never dispatch dynamically.
//!
//! Shared guarantees, for every strategy and input:
//!
//! - emitted indices are in `0..palette.len()`
//! - a pixel exactly equal to a palette entry (within
//!   [`EXACT_MATCH_EPSILON`]) stays that entry in flat regions
//! - an empty palette or empty region leaves the destination untouched

pub mod adaptive;
pub mod barycentric;
pub mod candidates;
pub mod curve;
pub mod dbs;
pub mod diffusion;
pub mod kernel;
pub mod knoll;
pub mod n_closest;
pub mod n_convex;
pub mod natural_neighbour;
pub mod noise;
pub mod none;
pub mod ordered;
pub mod ostromoukhov;
pub mod tin;
pub mod yliluoma;

pub use adaptive::{AdaptiveDither, ContentClass};
pub use barycentric::Barycentric;
pub use curve::CurveDither;
pub use dbs::{DbsReport, DirectBinarySearch};
pub use diffusion::{DiffusionMatrix, ErrorDiffusion, ErrorRingBuffer, ScanOrder};
pub use kernel::Kernel;
pub use knoll::Knoll;
pub use n_closest::NClosest;
pub use n_convex::NConvex;
pub use natural_neighbour::NaturalNeighbour;
pub use noise::NoiseDither;
pub use none::NoDither;
pub use ordered::OrderedDither;
pub use ostromoukhov::Ostromoukhov;
pub use tin::Tin;
pub use yliluoma::Yliluoma;

use crate::api::PixelRegion;
use crate::color::{ColorMetric, PixelDecoder, WorkingColor};
use crate::palette::{Palette, EXACT_MATCH_EPSILON};

/// A dithering strategy.
pub trait Dither {
    /// True when the strategy carries state from pixel to pixel and must see
    /// a region in one sequential pass.
    fn requires_sequential_processing(&self) -> bool;

    /// Write one palette index per pixel of `region`.
    ///
    /// Never fails: parameters are validated when the strategy is built. An
    /// empty palette leaves the destination untouched.
    fn dither<P, D, M>(
        &self,
        region: &mut PixelRegion<'_, P>,
        decoder: &D,
        metric: &M,
        palette: &Palette,
    ) where
        D: PixelDecoder<P> + ?Sized,
        M: ColorMetric + ?Sized;
}

/// Nearest index after offsetting the color channels by `threshold`.
///
/// Pixels already within [`EXACT_MATCH_EPSILON`] of an entry keep it,
/// so flat palette-colored areas are not perturbed.
#[inline]
pub(crate) fn quantize_with_threshold<M: ColorMetric + ?Sized>(
    palette: &Palette,
    color: WorkingColor,
    threshold: f32,
    metric: &M,
) -> u8 {
    let (idx, dist) = palette.find_nearest(color, metric);
    if dist < EXACT_MATCH_EPSILON || threshold == 0.0 {
        return idx as u8;
    }
    palette.find_nearest(color.offset(threshold), metric).0 as u8
}

/// The closed set of strategies.
///
/// # Example
///
/// ```
/// use palette_dither::{Algorithm, Dither, Euclidean, OrderedDither, Palette, PixelRegion, Rgba8Decoder};
///
/// let algorithm = Algorithm::from(OrderedDither::bayer(4, 1.0).unwrap());
/// assert!(!algorithm.requires_sequential_processing());
///
/// let palette = Palette::from_hex(&["#000", "#fff"]).unwrap();
/// let pixels = vec![[64u8, 64, 64, 255]; 16];
/// let mut indices = vec![0u8; 16];
/// let mut region = PixelRegion::packed(&pixels, &mut indices, 4, 4, 0).unwrap();
/// algorithm.dither(&mut region, &Rgba8Decoder, &Euclidean, &palette);
/// assert_eq!(indices.iter().filter(|&&i| i == 1).count(), 4);
/// ```
#[derive(Debug, Clone)]
pub enum Algorithm {
    None(NoDither),
    ErrorDiffusion(ErrorDiffusion),
    Ostromoukhov(Ostromoukhov),
    Ordered(OrderedDither),
    Noise(NoiseDither),
    Curve(CurveDither),
    DirectBinarySearch(DirectBinarySearch),
    Adaptive(AdaptiveDither),
    Knoll(Knoll),
    Yliluoma(Yliluoma),
    Barycentric(Barycentric),
    Tin(Tin),
    NaturalNeighbour(NaturalNeighbour),
    NClosest(NClosest),
    NConvex(NConvex),
}

macro_rules! algorithm_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Algorithm {
                fn from(value: $ty) -> Self {
                    Algorithm::$variant(value)
                }
            }
        )*
    };
}

algorithm_from! {
    None => NoDither,
    ErrorDiffusion => ErrorDiffusion,
    Ostromoukhov => Ostromoukhov,
    Ordered => OrderedDither,
    Noise => NoiseDither,
    Curve => CurveDither,
    DirectBinarySearch => DirectBinarySearch,
    Adaptive => AdaptiveDither,
    Knoll => Knoll,
    Yliluoma => Yliluoma,
    Barycentric => Barycentric,
    Tin => Tin,
    NaturalNeighbour => NaturalNeighbour,
    NClosest => NClosest,
    NConvex => NConvex,
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            Algorithm::None($inner) => $body,
            Algorithm::ErrorDiffusion($inner) => $body,
            Algorithm::Ostromoukhov($inner) => $body,
            Algorithm::Ordered($inner) => $body,
            Algorithm::Noise($inner) => $body,
            Algorithm::Curve($inner) => $body,
            Algorithm::DirectBinarySearch($inner) => $body,
            Algorithm::Adaptive($inner) => $body,
            Algorithm::Knoll($inner) => $body,
            Algorithm::Yliluoma($inner) => $body,
            Algorithm::Barycentric($inner) => $body,
            Algorithm::Tin($inner) => $body,
            Algorithm::NaturalNeighbour($inner) => $body,
            Algorithm::NClosest($inner) => $body,
            Algorithm::NConvex($inner) => $body,
        }
    };
}

impl Dither for Algorithm {
    fn requires_sequential_processing(&self) -> bool {
        dispatch!(self, inner => inner.requires_sequential_processing())
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
        dispatch!(self, inner => inner.dither(region, decoder, metric, palette))
    }
}
