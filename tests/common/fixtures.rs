//! Test images and PNG helpers.

use std::io::Cursor;
use std::path::Path;

use ditherkit::image_io::RgbaImage;

/// Horizontal gray ramp over `width`, with a faint vertical tint.
pub fn gradient(width: usize, height: usize) -> RgbaImage {
    let pixels = (0..width * height)
        .map(|i| {
            let (x, y) = (i % width, i / width);
            let v = ((x * 255) / (width - 1).max(1)) as u8;
            let tint = ((y * 64) / height.max(1)) as u8;
            [v, v, v.saturating_add(tint), 255]
        })
        .collect();
    RgbaImage {
        width,
        height,
        pixels,
    }
}

/// Image of one color.
pub fn flat(width: usize, height: usize, color: [u8; 4]) -> RgbaImage {
    RgbaImage {
        width,
        height,
        pixels: vec![color; width * height],
    }
}

/// Encode an image as an 8-bit RGBA PNG.
pub fn encode_rgba(image: &RgbaImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, image.width as u32, image.height as u32);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        let data: Vec<u8> = image.pixels.iter().flatten().copied().collect();
        writer.write_image_data(&data).unwrap();
    }
    buf.into_inner()
}

/// Write an image as an RGBA PNG file.
pub fn write_rgba(path: &Path, image: &RgbaImage) {
    std::fs::write(path, encode_rgba(image)).unwrap();
}

/// Header facts and unpacked indices of an indexed PNG.
pub struct IndexedPng {
    pub width: usize,
    pub height: usize,
    pub bit_depth: png::BitDepth,
    pub palette: Vec<[u8; 3]>,
    pub indices: Vec<u8>,
}

/// Decode an indexed PNG without expanding its palette.
pub fn decode_indexed(data: &[u8]) -> IndexedPng {
    let decoder = png::Decoder::new(Cursor::new(data));
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    assert_eq!(info.color_type, png::ColorType::Indexed, "Expected an indexed PNG");

    let palette = reader
        .info()
        .palette
        .as_ref()
        .map(|p| p.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
        .unwrap_or_default();

    let bits = match info.bit_depth {
        png::BitDepth::One => 1,
        png::BitDepth::Two => 2,
        png::BitDepth::Four => 4,
        png::BitDepth::Eight => 8,
        png::BitDepth::Sixteen => panic!("16-bit indexed PNG"),
    };
    let width = info.width as usize;
    let height = info.height as usize;
    let per_byte = 8 / bits;
    let mask = ((1u16 << bits) - 1) as u8;

    let mut indices = Vec::with_capacity(width * height);
    for row in buf.chunks(info.line_size).take(height) {
        for x in 0..width {
            let byte = row[x / per_byte];
            let shift = 8 - bits - (x % per_byte) * bits;
            indices.push(if bits == 8 { byte } else { (byte >> shift) & mask });
        }
    }

    IndexedPng {
        width,
        height,
        bit_depth: info.bit_depth,
        palette,
        indices,
    }
}
