use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape;

use crate::assets::color::Color;
use crate::assets::icons::IconImage;
use crate::assets::text::{TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::{Affine, BezPath, Canvas, MAX_SURFACE_DIM, Point, Rect, Vec2};
use crate::foundation::error::{PipevizError, PipevizResult};
use crate::render::backend::FrameRGBA;
use crate::render::surface::{DrawSurface, FrameTarget, Shadow, StrokeStyle, TextAlign, TextStyle};

const PATH_TOLERANCE: f64 = 0.1;

/// Number of expanded layers used to approximate a blurred shadow.
const SHADOW_LAYERS: usize = 4;

/// CPU raster surface backed by `vello_cpu`.
///
/// Draws in the diagram's logical coordinate space; `scale` maps it onto a larger device grid.
pub struct CpuSurface {
    canvas: Canvas,
    scale: f64,
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    transform: Affine,
    shadow: Option<Shadow>,
    text: Option<TextLayoutEngine>,
    font: Option<vello_cpu::peniko::FontData>,
    image_cache: HashMap<String, vello_cpu::Image>,
    warned_no_font: bool,
}

impl CpuSurface {
    /// Surface for a `canvas`-sized logical space rendered at device pixel ratio `scale`.
    pub fn new(canvas: Canvas, scale: f64) -> PipevizResult<Self> {
        canvas.validate()?;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PipevizError::render("surface scale must be finite and > 0"));
        }
        let (w, h) = device_dims(canvas, scale)?;
        Ok(Self {
            canvas,
            scale,
            width: w,
            height: h,
            ctx: vello_cpu::RenderContext::new(w, h),
            transform: Affine::scale(scale),
            shadow: None,
            text: None,
            font: None,
            image_cache: HashMap::new(),
            warned_no_font: false,
        })
    }

    /// Logical size this surface draws in.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Device pixel ratio.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Whether a font is loaded; text draws are skipped without one.
    pub fn has_font(&self) -> bool {
        self.text.is_some()
    }

    fn base_transform(&self) -> Affine {
        Affine::scale(self.scale)
    }

    fn paint(&mut self, color: Color) {
        let [r, g, b, a] = color.to_rgba8();
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    }

    fn fill_with(&mut self, path: &BezPath, transform: Affine, color: Color) {
        self.ctx.set_transform(affine_to_cpu(transform));
        self.paint(color);
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    /// Blurred shadow approximated by stacked, progressively expanded outlines at low alpha.
    fn fill_shadow(&mut self, path: &BezPath, shadow: Shadow) {
        if shadow.color.a <= 0.0 {
            return;
        }
        let transform = self.transform * Affine::translate(shadow.offset);
        if shadow.blur <= 0.0 {
            self.fill_with(path, transform, shadow.color);
            return;
        }
        let layer = shadow.color.with_alpha(shadow.color.a / SHADOW_LAYERS as f64);
        for i in (1..=SHADOW_LAYERS).rev() {
            let spread = shadow.blur * i as f64 / SHADOW_LAYERS as f64;
            let stroke = kurbo::Stroke::new(spread * 2.0).with_join(kurbo::Join::Round);
            let ring = kurbo::stroke(
                path.elements().iter().copied(),
                &stroke,
                &kurbo::StrokeOpts::default(),
                PATH_TOLERANCE,
            );
            self.fill_with(&ring, transform, layer);
            self.fill_with(path, transform, layer);
        }
    }

    fn image_paint_for(&mut self, key: &str, image: &IconImage) -> PipevizResult<vello_cpu::Image> {
        if let Some(paint) = self.image_cache.get(key) {
            return Ok(paint.clone());
        }
        let pixmap = image_premul_bytes_to_pixmap(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.insert(key.to_owned(), paint.clone());
        Ok(paint)
    }

    fn draw_glyphs(
        &mut self,
        layout: &parley::Layout<TextBrushRgba8>,
        transform: Affine,
        color: Color,
    ) {
        let Some(font) = self.font.clone() else {
            return;
        };
        self.ctx.set_transform(affine_to_cpu(transform));
        self.paint(color);
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    fn layout_text(
        &mut self,
        text: &str,
        style: &TextStyle,
    ) -> Option<parley::Layout<TextBrushRgba8>> {
        let Some(engine) = self.text.as_mut() else {
            if !self.warned_no_font {
                tracing::warn!("no font loaded; text is not drawn");
                self.warned_no_font = true;
            }
            return None;
        };
        let [r, g, b, a] = style.color.to_rgba8();
        match engine.layout_line(text, style.size as f32, TextBrushRgba8 { r, g, b, a }) {
            Ok(layout) => Some(layout),
            Err(e) => {
                tracing::warn!(error = %e, text, "text layout failed");
                None
            }
        }
    }
}

impl DrawSurface for CpuSurface {
    fn device_size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn shadow(&self) -> Option<Shadow> {
        self.shadow
    }

    fn set_shadow(&mut self, shadow: Option<Shadow>) {
        self.shadow = shadow;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_path(&rect.to_path(PATH_TOLERANCE), color);
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        if let Some(shadow) = self.shadow {
            self.fill_shadow(path, shadow);
        }
        self.fill_with(path, self.transform, color);
    }

    fn stroke_path(&mut self, path: &BezPath, stroke: &StrokeStyle, color: Color) {
        if stroke.width <= 0.0 {
            return;
        }
        let mut style = kurbo::Stroke::new(stroke.width).with_caps(kurbo::Cap::Butt);
        if stroke.round_join {
            style = style.with_join(kurbo::Join::Round);
        }
        if stroke.dash.iter().sum::<f64>() > 0.0 {
            style = style.with_dashes(0.0, stroke.dash.iter().copied());
        }
        let outline = kurbo::stroke(
            path.elements().iter().copied(),
            &style,
            &kurbo::StrokeOpts::default(),
            PATH_TOLERANCE,
        );
        self.fill_path(&outline, color);
    }

    fn draw_image(&mut self, key: &str, image: &IconImage, dest: Rect) {
        if image.width == 0 || image.height == 0 || dest.area() <= 0.0 {
            return;
        }
        let paint = match self.image_paint_for(key, image) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(icon = key, error = %e, "icon could not be converted; skipping");
                return;
            }
        };
        let (iw, ih) = (f64::from(image.width), f64::from(image.height));
        let placed = self.transform
            * Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / iw, dest.height() / ih);
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(placed));
        self.ctx.set_paint(paint);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
    }

    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        if text.is_empty() {
            return;
        }
        let Some(layout) = self.layout_text(text, style) else {
            return;
        };
        let w = f64::from(layout.width());
        let h = f64::from(layout.height());
        let x = match style.align {
            TextAlign::Left => at.x,
            TextAlign::Center => at.x - w / 2.0,
        };
        let top_left = Vec2::new(x, at.y - h / 2.0);

        // Text shadows are a single offset pass; blur is not emulated for glyphs.
        if let Some(shadow) = self.shadow.filter(|s| s.color.a > 0.0) {
            let shadow_origin = self.transform * Affine::translate(top_left + shadow.offset);
            self.draw_glyphs(&layout, shadow_origin, shadow.color);
        }
        let origin = self.transform * Affine::translate(top_left);
        self.draw_glyphs(&layout, origin, style.color);
    }

    fn measure_text(&mut self, text: &str, style: &TextStyle) -> f64 {
        self.layout_text(text, style)
            .map(|l| f64::from(l.width()))
            .unwrap_or(0.0)
    }
}

impl FrameTarget for CpuSurface {
    fn begin_frame(&mut self) {
        self.ctx.reset();
        self.transform = self.base_transform();
        self.shadow = None;
    }

    fn finish_frame(&mut self) -> PipevizResult<FrameRGBA> {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn load_font(&mut self, font_bytes: Vec<u8>) -> PipevizResult<()> {
        let engine = TextLayoutEngine::from_font_bytes(font_bytes)?;
        let blob = vello_cpu::peniko::Blob::from(engine.font_bytes().to_vec());
        self.font = Some(vello_cpu::peniko::FontData::new(blob, 0));
        self.text = Some(engine);
        Ok(())
    }
}

fn device_dims(canvas: Canvas, scale: f64) -> PipevizResult<(u16, u16)> {
    let dim = |logical: u32| -> PipevizResult<u16> {
        let px = (f64::from(logical) * scale).ceil();
        if px < 1.0 || px > f64::from(MAX_SURFACE_DIM) || px > f64::from(u16::MAX) {
            return Err(PipevizError::render(format!(
                "device dimension {px} out of range for scale {scale}"
            )));
        }
        Ok(px as u16)
    };
    Ok((dim(canvas.width)?, dim(canvas.height)?))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> PipevizResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PipevizError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PipevizError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(PipevizError::render("icon byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
