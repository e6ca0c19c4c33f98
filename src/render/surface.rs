use kurbo::Shape;

use crate::assets::color::Color;
use crate::assets::icons::IconImage;
use crate::foundation::core::{Affine, BezPath, Point, Rect, Vec2};
use crate::foundation::error::PipevizResult;
use crate::render::backend::FrameRGBA;

/// Soft shadow applied to fills while set on a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    /// Shadow color (its alpha is the peak intensity).
    pub color: Color,
    /// Blur radius in logical pixels.
    pub blur: f64,
    /// Offset of the shadow relative to the shape.
    pub offset: Vec2,
}

impl Shadow {
    /// Centered halo, used for particle glow.
    pub fn glow(color: Color, blur: f64) -> Self {
        Self {
            color,
            blur,
            offset: Vec2::ZERO,
        }
    }

    /// Offset drop shadow.
    pub fn drop(color: Color, blur: f64, offset: Vec2) -> Self {
        Self {
            color,
            blur,
            offset,
        }
    }
}

/// Horizontal text anchoring. Text is always vertically centered on the anchor point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Anchor is the left edge.
    Left,
    /// Anchor is the horizontal center.
    #[default]
    Center,
}

/// Font parameters for a text draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in logical pixels.
    pub size: f64,
    /// Fill color.
    pub color: Color,
    /// Horizontal anchoring.
    pub align: TextAlign,
}

/// Stroke parameters. An empty `dash` means a solid line.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Line width in logical pixels.
    pub width: f64,
    /// Alternating on/off lengths.
    pub dash: Vec<f64>,
    /// Round joins instead of miter joins.
    pub round_join: bool,
}

/// Canvas-like 2D drawing target.
///
/// The surface carries two pieces of state that persist across draw calls: the current transform
/// (logical → device pixels) and the current shadow. Everything else is passed per call.
pub trait DrawSurface {
    /// Size of the underlying pixel grid.
    fn device_size(&self) -> (u32, u32);

    /// Current logical-to-device transform.
    fn transform(&self) -> Affine;

    /// Replace the current transform.
    fn set_transform(&mut self, transform: Affine);

    /// Current shadow, if any.
    fn shadow(&self) -> Option<Shadow>;

    /// Replace the current shadow; `None` disables shadowing.
    fn set_shadow(&mut self, shadow: Option<Shadow>);

    /// Fill an axis-aligned rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Fill an arbitrary path (non-zero winding).
    fn fill_path(&mut self, path: &BezPath, color: Color);

    /// Stroke a path.
    fn stroke_path(&mut self, path: &BezPath, stroke: &StrokeStyle, color: Color);

    /// Draw `image` scaled into `dest`. `key` identifies the image for caching.
    fn draw_image(&mut self, key: &str, image: &IconImage, dest: Rect);

    /// Draw one line of text anchored at `at` (vertically centered).
    fn fill_text(&mut self, text: &str, at: Point, style: &TextStyle);

    /// Advance width of one line of text in logical pixels.
    fn measure_text(&mut self, text: &str, style: &TextStyle) -> f64;

    /// Fill a circle.
    fn fill_circle(&mut self, center: Point, radius: f64, color: Color) {
        let path = kurbo::Circle::new(center, radius).to_path(0.1);
        self.fill_path(&path, color);
    }
}

/// A surface that produces one RGBA frame per `begin_frame` / `finish_frame` pair.
pub trait FrameTarget: DrawSurface {
    /// Start a new frame.
    fn begin_frame(&mut self);

    /// Finish the frame and read back its pixels.
    fn finish_frame(&mut self) -> PipevizResult<FrameRGBA>;

    /// Use `font_bytes` for all subsequent text. Targets that do not shape text ignore it.
    fn load_font(&mut self, font_bytes: Vec<u8>) -> PipevizResult<()> {
        let _ = font_bytes;
        Ok(())
    }
}

/// Run `draw` with `shadow` installed, then restore whatever shadow was set before.
pub fn with_shadow<S, R>(surface: &mut S, shadow: Option<Shadow>, draw: impl FnOnce(&mut S) -> R) -> R
where
    S: DrawSurface + ?Sized,
{
    let prev = surface.shadow();
    surface.set_shadow(shadow);
    let out = draw(surface);
    surface.set_shadow(prev);
    out
}

/// Run `draw` with `transform` installed, then restore the previous transform.
pub fn with_transform<S, R>(
    surface: &mut S,
    transform: Affine,
    draw: impl FnOnce(&mut S) -> R,
) -> R
where
    S: DrawSurface + ?Sized,
{
    let prev = surface.transform();
    surface.set_transform(transform);
    let out = draw(surface);
    surface.set_transform(prev);
    out
}
