//! End-to-end tests: PNG in, catalog algorithm, indexed PNG out.

mod common;

use common::fixtures;
use ditherkit::config::{parse_colors, AppConfig};
use ditherkit::{catalog, image_io, render};
use palette_dither::Euclidean;
use pretty_assertions::assert_eq;

#[test]
fn test_png_round_trip_through_ditherer() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("gradient.png");
    let output = dir.path().join("dithered.png");
    fixtures::write_rgba(&input, &fixtures::gradient(32, 16));

    let config = AppConfig::default();
    let palette = config.palette("gray4").unwrap();
    let algorithm = catalog::resolve("floyd-steinberg", 1.0, true).unwrap();

    let image = image_io::read_png(&input).unwrap();
    assert_eq!((image.width, image.height), (32, 16));
    let indices = render::dither_rgba(&image, &algorithm, &Euclidean, &palette, 64).unwrap();
    image_io::write_indexed_png(&output, &indices, image.width, image.height, &palette).unwrap();

    let data = std::fs::read(&output).unwrap();
    common::assert_png(&data);
    let decoded = fixtures::decode_indexed(&data);
    assert_eq!((decoded.width, decoded.height), (32, 16));
    assert_eq!(decoded.bit_depth, png::BitDepth::Two);
    assert_eq!(
        decoded.palette,
        vec![[0, 0, 0], [85, 85, 85], [170, 170, 170], [255, 255, 255]]
    );
    assert_eq!(decoded.indices, indices);
    assert_eq!(indices[0], 0, "Black corner should stay black");
}

#[test]
fn test_every_catalog_entry_renders() {
    let image = fixtures::gradient(12, 10);
    let palette = parse_colors("#000,#fff,#f00,#0f0,#00f").unwrap();

    for entry in catalog::entries() {
        if entry.name == "void-and-cluster-64" {
            continue;
        }
        let algorithm = entry.build(1.0, true).unwrap();
        let indices = render::dither_rgba(&image, &algorithm, &Euclidean, &palette, 4)
            .unwrap_or_else(|e| panic!("{} failed: {}", entry.name, e));
        assert_eq!(indices.len(), 120, "{} produced a short buffer", entry.name);
        common::assert_indices_in_range(&indices, palette.len());
    }
}

#[test]
fn test_flat_palette_color_survives_png_round_trip() {
    let palette = AppConfig::default().palette("gray4").unwrap();
    let image = image_io::decode_png(&fixtures::encode_rgba(&fixtures::flat(8, 6, [0x55, 0x55, 0x55, 255]))).unwrap();

    for entry in catalog::entries() {
        if entry.name == "void-and-cluster-64" {
            continue;
        }
        let algorithm = entry.build(1.0, true).unwrap();
        let indices = render::dither_rgba(&image, &algorithm, &Euclidean, &palette, 2).unwrap();
        assert!(
            indices.iter().all(|&i| i == 1),
            "{} disturbed a flat palette color",
            entry.name
        );
    }
}

#[test]
fn test_slicing_is_deterministic() {
    let image = fixtures::gradient(20, 29);
    let palette = AppConfig::default().palette("gray4").unwrap();

    for name in ["bayer-8", "halftone-4", "noise-blue", "knoll", "n-convex"] {
        let algorithm = catalog::resolve(name, 1.0, true).unwrap();
        let whole = render::dither_rgba(&image, &algorithm, &Euclidean, &palette, 0).unwrap();
        let sliced = render::dither_rgba(&image, &algorithm, &Euclidean, &palette, 7).unwrap();
        assert_eq!(sliced, whole, "{} changed under slicing", name);
    }
}

#[test]
fn test_sequential_algorithm_runs_whole() {
    let image = fixtures::gradient(20, 29);
    let palette = AppConfig::default().palette("gray4").unwrap();
    let algorithm = catalog::resolve("jarvis-judice-ninke", 1.0, false).unwrap();

    let whole = render::dither_rgba(&image, &algorithm, &Euclidean, &palette, 0).unwrap();
    let sliced = render::dither_rgba(&image, &algorithm, &Euclidean, &palette, 5).unwrap();
    assert_eq!(sliced, whole);
}

#[test]
fn test_bit_depth_follows_palette() {
    let image = fixtures::gradient(9, 3);
    let algorithm = catalog::resolve("bayer-4", 1.0, true).unwrap();

    let cases = [
        ("#000,#fff", png::BitDepth::One),
        ("#000,#555,#aaa,#fff", png::BitDepth::Two),
        ("#000,#fff,#f00,#0f0,#00f", png::BitDepth::Four),
    ];
    for (colors, depth) in cases {
        let palette = parse_colors(colors).unwrap();
        let indices = render::dither_rgba(&image, &algorithm, &Euclidean, &palette, 0).unwrap();
        let data = image_io::encode_indexed(&indices, 9, 3, &palette).unwrap();
        let decoded = fixtures::decode_indexed(&data);
        assert_eq!(decoded.bit_depth, depth, "Wrong depth for {}", colors);
        assert_eq!(decoded.indices, indices, "Packing lost indices for {}", colors);
    }
}
