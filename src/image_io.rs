//! PNG input and indexed-PNG output.

use std::io::Cursor;
use std::path::Path;

use palette_dither::Palette;

use crate::error::ImageIoError;

/// An 8-bit RGBA image, rows packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[u8; 4]>,
}

/// Decode any PNG to RGBA8.
///
/// Palette, low bit-depth and 16-bit inputs are expanded to 8 bits per
/// channel; grayscale is replicated across the color channels.
pub fn decode_png(data: &[u8]) -> Result<RgbaImage, ImageIoError> {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;

    if info.bit_depth != png::BitDepth::Eight {
        return Err(ImageIoError::Unsupported(format!("bit depth {:?}", info.bit_depth)));
    }
    let channels = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        png::ColorType::Indexed => {
            return Err(ImageIoError::Unsupported("unexpanded palette image".to_string()));
        }
    };

    let width = info.width as usize;
    let height = info.height as usize;
    let mut pixels = Vec::with_capacity(width * height);
    for row in buf.chunks(info.line_size).take(height) {
        for px in row[..width * channels].chunks_exact(channels) {
            pixels.push(match *px {
                [g] => [g, g, g, 255],
                [g, a] => [g, g, g, a],
                [r, g, b] => [r, g, b, 255],
                [r, g, b, a] => [r, g, b, a],
                _ => unreachable!("chunks_exact yields {} channels", channels),
            });
        }
    }

    tracing::debug!(width, height, color_type = ?info.color_type, "Decoded PNG");
    Ok(RgbaImage { width, height, pixels })
}

/// Read and decode a PNG file.
pub fn read_png(path: &Path) -> Result<RgbaImage, ImageIoError> {
    let data = std::fs::read(path)?;
    decode_png(&data)
}

/// Smallest PNG bit depth addressing `colors` palette entries.
fn bits_for(colors: usize) -> u8 {
    match colors {
        0..=2 => 1,
        3..=4 => 2,
        5..=16 => 4,
        _ => 8,
    }
}

/// Encode palette indices as an indexed PNG.
///
/// The bit depth is the smallest of 1, 2, 4 or 8 that addresses every
/// entry. A tRNS chunk is written when any entry is not fully opaque.
pub fn encode_indexed(indices: &[u8], width: usize, height: usize, palette: &Palette) -> Result<Vec<u8>, ImageIoError> {
    if palette.is_empty() || palette.len() > 256 {
        return Err(ImageIoError::PaletteSize(palette.len()));
    }
    if indices.len() != width * height {
        return Err(ImageIoError::SizeMismatch {
            expected: width * height,
            actual: indices.len(),
        });
    }

    let colors: Vec<[u8; 4]> = palette.colors().iter().map(|c| c.to_u8()).collect();
    let plte: Vec<u8> = colors.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    let trns: Option<Vec<u8>> = colors.iter().any(|c| c[3] < 255).then(|| colors.iter().map(|c| c[3]).collect());

    let bits = bits_for(colors.len());
    let (depth, packed) = match bits {
        1 => (png::BitDepth::One, pack_nbits(indices, width, 1)),
        2 => (png::BitDepth::Two, pack_nbits(indices, width, 2)),
        4 => (png::BitDepth::Four, pack_nbits(indices, width, 4)),
        _ => (png::BitDepth::Eight, indices.to_vec()),
    };

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width as u32, height as u32);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(depth);
        encoder.set_compression(png::Compression::Fast);
        encoder.set_filter(png::FilterType::NoFilter);
        encoder.set_palette(plte);
        if let Some(trns) = trns {
            encoder.set_trns(trns);
        }
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&packed)?;
        writer.finish()?;
    }

    tracing::debug!(width, height, bits, colors = colors.len(), "Encoded indexed PNG");
    Ok(buf.into_inner())
}

/// Encode and write an indexed PNG file.
pub fn write_indexed_png(
    path: &Path,
    indices: &[u8],
    width: usize,
    height: usize,
    palette: &Palette,
) -> Result<(), ImageIoError> {
    let data = encode_indexed(indices, width, height, palette)?;
    std::fs::write(path, data)?;
    Ok(())
}

/// Pack pixel values into N-bit PNG row data (1, 2, or 4 bits per pixel).
///
/// Each row starts on a byte boundary.
fn pack_nbits(indices: &[u8], width: usize, bits: u8) -> Vec<u8> {
    if width == 0 {
        return Vec::new();
    }
    let pixels_per_byte = 8 / bits as usize;
    let bytes_per_row = width.div_ceil(pixels_per_byte);
    let height = indices.len() / width;
    let mask = (1u8 << bits) - 1;
    let mut packed = Vec::with_capacity(bytes_per_row * height);

    for row in indices.chunks(width) {
        let mut byte = 0u8;
        for (i, &idx) in row.iter().enumerate() {
            let shift = (8 - bits) - (i % pixels_per_byte) as u8 * bits;
            byte |= (idx & mask) << shift;

            if (i % pixels_per_byte) == pixels_per_byte - 1 || i == row.len() - 1 {
                packed.push(byte);
                byte = 0;
            }
        }
    }

    packed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header_of(data: &[u8]) -> (png::ColorType, png::BitDepth, Option<usize>) {
        let decoder = png::Decoder::new(Cursor::new(data));
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        (
            info.color_type,
            info.bit_depth,
            info.trns.as_ref().map(|t| t.len()),
        )
    }

    fn encode_gray(width: u32, height: u32, data: &[u8]) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut encoder = png::Encoder::new(&mut buf, width, height);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn test_pack_nbits_row_padding() {
        // 3 pixels at 2 bits: one byte per row, low bits zero
        let packed = pack_nbits(&[1, 2, 3, 3, 0, 1], 3, 2);
        assert_eq!(packed, vec![0b0110_1100, 0b1100_0100]);
    }

    #[test]
    fn test_pack_nbits_one_bit() {
        let packed = pack_nbits(&[1, 0, 1, 0, 1, 0, 1, 0, 1], 9, 1);
        assert_eq!(packed, vec![0b1010_1010, 0b1000_0000]);
    }

    #[test]
    fn test_bit_depth_follows_palette_size() {
        let cases = [
            (2, png::BitDepth::One),
            (4, png::BitDepth::Two),
            (5, png::BitDepth::Four),
            (16, png::BitDepth::Four),
            (17, png::BitDepth::Eight),
        ];
        for (n, expected) in cases {
            let hex: Vec<String> = (0..n).map(|i| format!("#{:02x}{:02x}{:02x}", i * 8, i * 8, i * 8)).collect();
            let palette = Palette::from_hex(&hex).unwrap();
            let indices: Vec<u8> = (0..12).map(|i| (i % n) as u8).collect();
            let png = encode_indexed(&indices, 4, 3, &palette).unwrap();
            let (color_type, depth, trns) = header_of(&png);
            assert_eq!(color_type, png::ColorType::Indexed);
            assert_eq!(depth, expected, "Wrong depth for {} colors", n);
            assert_eq!(trns, None);
        }
    }

    #[test]
    fn test_indexed_round_trip_colors() {
        let palette = Palette::from_hex(&["#000000", "#ff0000", "#00ff00", "#0000ff"]).unwrap();
        let indices = vec![0, 1, 2, 3, 3, 2, 1, 0];
        let png = encode_indexed(&indices, 4, 2, &palette).unwrap();

        let image = decode_png(&png).unwrap();
        assert_eq!((image.width, image.height), (4, 2));
        let expected: Vec<[u8; 4]> = indices.iter().map(|&i| palette.color(i as usize).to_u8()).collect();
        assert_eq!(image.pixels, expected);
    }

    #[test]
    fn test_transparent_entry_writes_trns() {
        let palette = Palette::from_hex(&["#00000000", "#ffffff"]).unwrap();
        let png = encode_indexed(&[0, 1, 1, 0], 2, 2, &palette).unwrap();

        assert_eq!(header_of(&png).2, Some(2));
        let image = decode_png(&png).unwrap();
        assert_eq!(image.pixels[0], [0, 0, 0, 0]);
        assert_eq!(image.pixels[1], [255, 255, 255, 255]);
    }

    #[test]
    fn test_decode_grayscale() {
        let png = encode_gray(3, 1, &[0, 128, 255]);
        let image = decode_png(&png).unwrap();
        assert_eq!(
            image.pixels,
            vec![[0, 0, 0, 255], [128, 128, 128, 255], [255, 255, 255, 255]]
        );
    }

    #[test]
    fn test_size_mismatch() {
        let palette = Palette::from_hex(&["#000", "#fff"]).unwrap();
        match encode_indexed(&[0, 1, 0], 2, 2, &palette) {
            Err(ImageIoError::SizeMismatch { expected, actual }) => assert_eq!((expected, actual), (4, 3)),
            other => panic!("Expected SizeMismatch, got {:?}", other.map(|v| v.len())),
        }
    }

    #[test]
    fn test_empty_palette_rejected() {
        assert!(matches!(
            encode_indexed(&[], 0, 0, &Palette::default()),
            Err(ImageIoError::PaletteSize(0))
        ));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        assert!(matches!(decode_png(b"not a png"), Err(ImageIoError::Decode(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let palette = Palette::from_hex(&["#000", "#fff"]).unwrap();

        write_indexed_png(&path, &[1, 0, 0, 1], 2, 2, &palette).unwrap();
        let image = read_png(&path).unwrap();
        assert_eq!(image.pixels[0], [255, 255, 255, 255]);
        assert_eq!(image.pixels[1], [0, 0, 0, 255]);
    }
}
