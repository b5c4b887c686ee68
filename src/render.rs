//! Whole-image dithering with optional horizontal slicing.

use palette_dither::{Algorithm, ColorMetric, Dither, DitherError, Palette, PixelRegion, Rgba8Decoder};
use rayon::prelude::*;

use crate::error::RenderError;
use crate::image_io::RgbaImage;

/// Dither `image` to palette indices.
///
/// Parallel-safe algorithms run on slices of `rows_per_slice` rows spread
/// over the rayon thread pool, each slice carrying its absolute `start_y` so
/// threshold patterns stay continuous. Sequential algorithms, and any
/// image no taller than one slice, run as a single region. A
/// `rows_per_slice` of 0 disables slicing.
pub fn dither_rgba<M>(
    image: &RgbaImage,
    algorithm: &Algorithm,
    metric: &M,
    palette: &Palette,
    rows_per_slice: usize,
) -> Result<Vec<u8>, RenderError>
where
    M: ColorMetric + Sync,
{
    let (width, height) = (image.width, image.height);
    let mut indices = vec![0u8; width * height];
    if width == 0 || height == 0 {
        return Ok(indices);
    }

    if algorithm.requires_sequential_processing() || rows_per_slice == 0 || rows_per_slice >= height {
        tracing::debug!(width, height, "Dithering as a single region");
        let mut region = PixelRegion::packed(&image.pixels, &mut indices, width, height, 0)?;
        algorithm.dither(&mut region, &Rgba8Decoder, metric, palette);
        return Ok(indices);
    }

    if image.pixels.len() != width * height {
        return Err(DitherError::RegionTooSmall {
            buffer: "source",
            len: image.pixels.len(),
            required: width * height,
        }
        .into());
    }

    let chunk = rows_per_slice * width;
    let slices = height.div_ceil(rows_per_slice);
    tracing::debug!(width, height, slices, rows_per_slice, "Dithering in slices");

    image
        .pixels
        .par_chunks(chunk)
        .zip(indices.par_chunks_mut(chunk))
        .enumerate()
        .try_for_each(|(i, (source, dest))| -> Result<(), DitherError> {
            let rows = source.len() / width;
            let mut region = PixelRegion::packed(source, dest, width, rows, i * rows_per_slice)?;
            algorithm.dither(&mut region, &Rgba8Decoder, metric, palette);
            Ok(())
        })?;

    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette_dither::{ErrorDiffusion, Euclidean, OrderedDither};
    use palette_dither::dither::kernel::FLOYD_STEINBERG;
    use pretty_assertions::assert_eq;

    fn gradient(width: usize, height: usize) -> RgbaImage {
        let pixels = (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                let v = ((x * 255) / width.max(1)) as u8;
                [v, v, ((y * 255) / height.max(1)) as u8, 255]
            })
            .collect();
        RgbaImage { width, height, pixels }
    }

    fn palette() -> Palette {
        Palette::from_hex(&["#000", "#fff", "#f00", "#00f"]).unwrap()
    }

    #[test]
    fn test_sliced_ordered_matches_whole() {
        let image = gradient(24, 37);
        let bayer: Algorithm = OrderedDither::bayer(8, 1.0).unwrap().into();

        let whole = dither_rgba(&image, &bayer, &Euclidean, &palette(), 0).unwrap();
        for rows in [1, 5, 8, 36] {
            let sliced = dither_rgba(&image, &bayer, &Euclidean, &palette(), rows).unwrap();
            assert_eq!(sliced, whole, "Slices of {} rows changed the output", rows);
        }
    }

    #[test]
    fn test_sequential_ignores_slicing() {
        let image = gradient(16, 20);
        let fs: Algorithm = ErrorDiffusion::new(&FLOYD_STEINBERG, 1.0).unwrap().into();

        let whole = dither_rgba(&image, &fs, &Euclidean, &palette(), 0).unwrap();
        let sliced = dither_rgba(&image, &fs, &Euclidean, &palette(), 3).unwrap();
        assert_eq!(sliced, whole);
    }

    #[test]
    fn test_output_covers_every_pixel() {
        let image = gradient(10, 9);
        let bayer: Algorithm = OrderedDither::bayer(4, 1.0).unwrap().into();
        let palette = palette();

        let indices = dither_rgba(&image, &bayer, &Euclidean, &palette, 4).unwrap();
        assert_eq!(indices.len(), 90);
        assert!(indices.iter().all(|&i| (i as usize) < palette.len()));
    }

    #[test]
    fn test_empty_image() {
        let image = RgbaImage {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        };
        let none: Algorithm = palette_dither::NoDither.into();
        assert!(dither_rgba(&image, &none, &Euclidean, &palette(), 64).unwrap().is_empty());
    }

    #[test]
    fn test_zero_width_image_with_slicing() {
        let image = RgbaImage {
            width: 0,
            height: 10,
            pixels: Vec::new(),
        };
        let bayer: Algorithm = OrderedDither::bayer(2, 1.0).unwrap().into();
        assert!(dither_rgba(&image, &bayer, &Euclidean, &palette(), 2).unwrap().is_empty());
    }

    #[test]
    fn test_short_pixel_buffer_is_error() {
        let mut image = gradient(8, 8);
        image.pixels.truncate(60);
        let bayer: Algorithm = OrderedDither::bayer(2, 1.0).unwrap().into();

        for rows in [0, 2] {
            assert!(matches!(
                dither_rgba(&image, &bayer, &Euclidean, &palette(), rows),
                Err(RenderError::Dither(DitherError::RegionTooSmall { .. }))
            ));
        }
    }
}
