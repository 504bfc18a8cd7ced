use std::io::Cursor;

use super::*;

fn encode(img: image::DynamicImage, format: image::ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

#[test]
fn decode_png_keeps_straight_alpha() {
    let src = image::RgbaImage::from_raw(1, 1, vec![100u8, 50u8, 200u8, 3u8]).unwrap();
    let bytes = encode(image::DynamicImage::ImageRgba8(src), image::ImageFormat::Png);

    let layer = decode_layer_bytes(&bytes).unwrap();
    assert_eq!(layer.width(), 1);
    assert_eq!(layer.height(), 1);
    assert_eq!(layer.rgba8.as_raw().as_slice(), &[100, 50, 200, 3]);
}

#[test]
fn rgb_sources_gain_an_opaque_alpha_channel() {
    let src = image::RgbImage::from_raw(2, 1, vec![10, 20, 30, 40, 50, 60]).unwrap();
    let bytes = encode(image::DynamicImage::ImageRgb8(src), image::ImageFormat::Png);

    let layer = decode_layer_bytes(&bytes).unwrap();
    assert_eq!(
        layer.rgba8.as_raw().as_slice(),
        &[10, 20, 30, 255, 40, 50, 60, 255]
    );
}

#[test]
fn decode_from_disk_ignores_misleading_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actually_png.jpg");
    let src = image::RgbaImage::from_raw(1, 1, vec![1, 2, 3, 255]).unwrap();
    std::fs::write(
        &path,
        encode(image::DynamicImage::ImageRgba8(src), image::ImageFormat::Png),
    )
    .unwrap();

    let layer = decode_layer(&path).unwrap();
    assert_eq!(layer.rgba8.as_raw().as_slice(), &[1, 2, 3, 255]);
}

#[test]
fn decode_garbage_is_an_error() {
    assert!(decode_layer_bytes(b"not an image").is_err());
}
