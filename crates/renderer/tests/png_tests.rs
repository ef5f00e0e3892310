//! Tests for PNG encoding functionality.
//!
//! Encoded tiles are decoded with the `image` crate to check they are
//! valid PNGs carrying the original pixels.

use renderer::png::{create_png, create_png_auto, create_png_rgb, transparent_tile};

// ============================================================================
// Helper functions
// ============================================================================

fn gradient_rgba(width: usize, height: usize, colors: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let idx = ((x + y * width) * colors / (width * height)) as u8;
            let alpha = if x == 0 { 0 } else { 255 };
            pixels.extend_from_slice(&[idx, 255 - idx, idx / 2, alpha]);
        }
    }
    pixels
}

// ============================================================================
// Decoding tests
// ============================================================================

#[test]
fn test_transparent_tile_decodes() {
    let img = image::load_from_memory(&transparent_tile()).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (256, 256));
    assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 0]));
}

#[test]
fn test_indexed_png_preserves_pixels() {
    let pixels = gradient_rgba(32, 16, 40);
    let png = create_png_auto(&pixels, 32, 16).unwrap();
    let img = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(img.into_raw(), pixels);
}

#[test]
fn test_auto_falls_back_to_rgba() {
    let mut pixels = Vec::new();
    for i in 0..400u32 {
        pixels.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 7, 255]);
    }
    let auto = create_png_auto(&pixels, 20, 20).unwrap();
    let explicit = create_png(&pixels, 20, 20).unwrap();
    assert_eq!(auto, explicit);
    let img = image::load_from_memory(&auto).unwrap().to_rgba8();
    assert_eq!(img.into_raw(), pixels);
}

#[test]
fn test_rgb_png() {
    let pixels: Vec<u8> = (0..4 * 3 * 3).map(|i| (i * 7) as u8).collect();
    let png = create_png_rgb(&pixels, 4, 3).unwrap();
    let img = image::load_from_memory(&png).unwrap();
    assert_eq!(img.color(), image::ColorType::Rgb8);
    assert_eq!(img.to_rgb8().into_raw(), pixels);
}

#[test]
fn test_encoding_is_deterministic() {
    let pixels = gradient_rgba(64, 64, 200);
    assert_eq!(create_png_auto(&pixels, 64, 64).unwrap(), create_png_auto(&pixels, 64, 64).unwrap());
}
