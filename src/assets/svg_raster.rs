use crate::foundation::core::MAX_SURFACE_DIM;
use crate::foundation::error::{PipevizError, PipevizResult};

/// Pick a raster size for an SVG so its longer edge equals `max_edge`, keeping aspect ratio.
pub(crate) fn svg_raster_size(tree: &usvg::Tree, max_edge: u32) -> PipevizResult<(u32, u32)> {
    let size = tree.size();
    let (w, h) = (size.width(), size.height());
    if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
        return Err(PipevizError::asset("svg has invalid width/height"));
    }
    if max_edge == 0 || max_edge > MAX_SURFACE_DIM {
        return Err(PipevizError::asset(format!(
            "svg raster edge {max_edge} out of range"
        )));
    }

    let scale = (max_edge as f32) / w.max(h);
    let rw = ((w * scale).round() as u32).max(1);
    let rh = ((h * scale).round() as u32).max(1);
    Ok((rw, rh))
}

pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> PipevizResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PipevizError::asset("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}
