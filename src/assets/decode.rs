use std::sync::Arc;

use crate::assets::icons::IconImage;
use crate::assets::svg_raster::{rasterize_svg_to_premul_rgba8, svg_raster_size};
use crate::foundation::error::{PipevizError, PipevizResult};

/// Edge length (in pixels) SVG icons are rasterized to before being scaled into node boxes.
pub(crate) const SVG_ICON_RASTER_EDGE: u32 = 128;

/// Decode icon bytes into a premultiplied RGBA8 image.
///
/// SVG sources (by extension or by sniffing the leading markup) are parsed with `usvg` and
/// rasterized; everything else goes through `image`.
pub(crate) fn decode_icon(source: &str, bytes: &[u8]) -> PipevizResult<IconImage> {
    if looks_like_svg(source, bytes) {
        let tree = parse_svg(bytes)?;
        let (w, h) = svg_raster_size(&tree, SVG_ICON_RASTER_EDGE)?;
        let rgba8_premul = rasterize_svg_to_premul_rgba8(&tree, w, h)?;
        return Ok(IconImage::from_premul(w, h, rgba8_premul));
    }
    decode_image(bytes)
}

pub(crate) fn decode_image(bytes: &[u8]) -> PipevizResult<IconImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| PipevizError::asset(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(IconImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub(crate) fn parse_svg(bytes: &[u8]) -> PipevizResult<usvg::Tree> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| PipevizError::asset(format!("parse svg tree: {e}")))?;
    Ok(tree)
}

fn looks_like_svg(source: &str, bytes: &[u8]) -> bool {
    if source.to_ascii_lowercase().ends_with(".svg") {
        return true;
    }
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
