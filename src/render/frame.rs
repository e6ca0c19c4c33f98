use kurbo::Shape;

use crate::assets::icons::IconCache;
use crate::foundation::core::{Affine, Point, Rect, Vec2};
use crate::layout::config::{Diagram, Theme};
use crate::layout::model::{Node, NodeIcons, NodeKind};
use crate::particle::Particle;
use crate::render::surface::{
    DrawSurface, Shadow, StrokeStyle, TextAlign, TextStyle, with_shadow, with_transform,
};

/// Horizontal padding added to a connection label's measured width for its backing box.
const CONNECTION_LABEL_PADDING: f64 = 16.0;

/// Row icons sit this far above the single-icon center line.
const ROW_ICON_RAISE: f64 = 20.0;

/// Draws one frame of a diagram onto a [`DrawSurface`].
///
/// Order is fixed: clear, connections, nodes, particles. Connections go before nodes so node boxes
/// hide the line endpoints.
#[derive(Clone, Copy, Debug)]
pub struct FrameRenderer<'a> {
    diagram: &'a Diagram,
    icons: &'a IconCache,
}

impl<'a> FrameRenderer<'a> {
    /// Renderer for `diagram`, drawing whatever icons `icons` holds.
    pub fn new(diagram: &'a Diagram, icons: &'a IconCache) -> Self {
        Self { diagram, icons }
    }

    /// Draw a full frame. Every particle is advanced one tick before it is drawn.
    pub fn draw_frame(&self, surface: &mut dyn DrawSurface, particles: &mut [Particle]) {
        self.clear(surface);
        self.draw_connections(surface);
        self.draw_nodes(surface);
        for p in particles.iter_mut() {
            p.update();
            self.draw_particle(surface, p);
        }
    }

    /// Fill the whole device grid with the background color, whatever transform is active.
    pub fn clear(&self, surface: &mut dyn DrawSurface) {
        let (w, h) = surface.device_size();
        let bg = self.diagram.background();
        with_transform(surface, Affine::IDENTITY, |s| {
            s.fill_rect(Rect::new(0.0, 0.0, f64::from(w), f64::from(h)), bg);
        });
    }

    /// Dashed route of every connection, plus its label.
    pub fn draw_connections(&self, surface: &mut dyn DrawSurface) {
        let theme = self.diagram.theme();
        let layout = self.diagram.layout();
        let stroke = StrokeStyle {
            width: theme.connection_width,
            dash: theme.connection_dash.clone(),
            round_join: false,
        };
        for (conn, route) in layout.connections().iter().zip(layout.routes()) {
            surface.stroke_path(&route.to_bez_path(), &stroke, theme.connection_color);
            if let Some(label) = conn.label.as_deref() {
                draw_connection_label(surface, theme, label, route.midpoint());
            }
        }
    }

    /// Every node, in definition order.
    pub fn draw_nodes(&self, surface: &mut dyn DrawSurface) {
        for node in self.diagram.layout().nodes() {
            self.draw_node(surface, node);
        }
    }

    /// One node, as a stage bar or a bordered box.
    pub fn draw_node(&self, surface: &mut dyn DrawSurface, node: &Node) {
        let theme = self.diagram.theme();
        let r = node.rect;
        match node.kind {
            NodeKind::Stage => {
                surface.fill_rect(r, node.color);
                let style = TextStyle {
                    size: theme.stage_text_size,
                    color: theme.stage_text_color,
                    align: TextAlign::Left,
                };
                let at = Point::new(r.x0 + theme.stage_text_inset, r.center().y);
                surface.fill_text(&node.label, at, &style);
            }
            NodeKind::Box => {
                let outline = kurbo::RoundedRect::from_rect(r, theme.box_corner_radius).to_path(0.1);
                surface.fill_path(&outline, node.color);
                let border = StrokeStyle {
                    width: theme.box_border_width,
                    dash: Vec::new(),
                    round_join: true,
                };
                surface.stroke_path(&outline, &border, theme.box_border_color);

                self.draw_icons(surface, node);
                draw_box_text(surface, theme, node);
            }
        }
    }

    fn draw_icons(&self, surface: &mut dyn DrawSurface, node: &Node) {
        let theme = self.diagram.theme();
        for (key, dest) in icon_slots(theme, node) {
            // Failed loads leave no cache entry; the node is drawn without that icon.
            if let Some(img) = self.icons.get(key) {
                surface.draw_image(key, img, dest);
            }
        }
    }

    /// Draw one particle at its current progress.
    pub fn draw_particle(&self, surface: &mut dyn DrawSurface, particle: &Particle) {
        let route = self.diagram.layout().route(particle.connection());
        particle.draw(surface, route);
    }
}

fn draw_connection_label(surface: &mut dyn DrawSurface, theme: &Theme, label: &str, mid: Point) {
    let style = TextStyle {
        size: theme.connection_label_size,
        color: theme.connection_label_color,
        align: TextAlign::Center,
    };
    let text_w = surface.measure_text(label, &style);
    let [min_w, h] = theme.connection_label_box;
    let w = min_w.max(text_w + CONNECTION_LABEL_PADDING);
    let backing = Rect::from_center_size(mid, (w, h));
    surface.fill_rect(backing, theme.connection_label_backing);
    surface.fill_text(label, mid, &style);
}

fn draw_box_text(surface: &mut dyn DrawSurface, theme: &Theme, node: &Node) {
    let r = node.rect;
    let cx = r.center().x;
    let style = TextStyle {
        size: theme.label_size,
        color: theme.label_color,
        align: TextAlign::Center,
    };
    let shadow = Shadow::drop(
        theme.label_shadow_color,
        theme.label_shadow_blur,
        Vec2::new(0.0, theme.label_shadow_offset_y),
    );
    with_shadow(surface, Some(shadow), |s| {
        for (line, y) in label_lines(theme, node) {
            s.fill_text(line, Point::new(cx, y), &style);
        }
    });

    if let Some(sub) = node.subtext.as_deref() {
        let style = TextStyle {
            size: theme.subtext_size,
            color: theme.subtext_color,
            align: TextAlign::Center,
        };
        surface.fill_text(sub, Point::new(cx, r.y1 - theme.subtext_bottom_inset), &style);
    }
}

/// Label lines with their vertical centers. The last line sits at the bottom inset; earlier lines
/// stack upward.
pub(crate) fn label_lines<'n>(theme: &Theme, node: &'n Node) -> Vec<(&'n str, f64)> {
    let lines: Vec<&str> = node.label.split('\n').collect();
    let last_y = node.rect.y1 - theme.label_bottom_inset;
    let n = lines.len();
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| (line, last_y - (n - 1 - i) as f64 * theme.label_line_height))
        .collect()
}

/// Destination rectangle of every icon on `node`.
///
/// A row is centered as a group: its width is `(n - 1) * spacing + size`.
pub(crate) fn icon_slots<'n>(theme: &Theme, node: &'n Node) -> Vec<(&'n str, Rect)> {
    let cx = node.rect.center().x;
    let cy = node.rect.y0 + theme.icon_center_y;
    match &node.icons {
        NodeIcons::None => Vec::new(),
        NodeIcons::Single(key) => {
            let dest = Rect::from_center_size((cx, cy), (theme.icon_size, theme.icon_size));
            vec![(key.as_str(), dest)]
        }
        NodeIcons::Row(keys) => {
            let size = theme.icon_row_size;
            let group_w = (keys.len().saturating_sub(1)) as f64 * theme.icon_row_spacing + size;
            let left = cx - group_w / 2.0;
            let top = cy - ROW_ICON_RAISE;
            keys.iter()
                .enumerate()
                .map(|(i, key)| {
                    let x = left + i as f64 * theme.icon_row_spacing;
                    (key.as_str(), Rect::new(x, top, x + size, top + size))
                })
                .collect()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
