use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = png_bytes(1, 1, [100, 50, 200, 128]);
    let prepared = decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_icon_dispatches_on_svg_markup() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="8"><rect width="16" height="8" fill="#ff0000"/></svg>"##;
    let icon = decode_icon("icons/thing.bin", svg).unwrap();
    assert_eq!(icon.width, SVG_ICON_RASTER_EDGE);
    assert_eq!(icon.height, SVG_ICON_RASTER_EDGE / 2);
    assert_eq!(&icon.rgba8_premul[0..4], &[255, 0, 0, 255]);
}

#[test]
fn decode_icon_rejects_garbage() {
    let err = decode_icon("icons/x.png", b"not an image").unwrap_err();
    assert!(matches!(err, PipevizError::Asset(_)));
    let err = decode_icon("icons/x.svg", b"<svg").unwrap_err();
    assert!(matches!(err, PipevizError::Asset(_)));
}
