use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::core::{Canvas, Fps, Rect};
use crate::foundation::error::{PipevizError, PipevizResult};
use crate::geometry::edge::{Anchor, Side};
use crate::geometry::route::RouteStyle;
use crate::layout::model::{Connection, Layout, Node, NodeIcons, NodeKind};
use crate::particle::ParticleTuning;

fn default_background() -> Color {
    Color::rgba8(0x0f, 0x14, 0x19, 0xff)
}

/// JSON-facing node record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDef {
    /// Unique key.
    pub id: String,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Display variant.
    #[serde(default)]
    pub kind: NodeKind,
    /// Fill color; the theme default for the kind when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Label; `\n` separates lines.
    pub label: String,
    /// Secondary line under the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtext: Option<String>,
    /// Single centered icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Row of icons. Mutually exclusive with `icon`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub icons: Vec<String>,
}

/// JSON-facing connection record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionDef {
    /// Source node id.
    pub from: String,
    /// Target node id.
    pub to: String,
    /// Optional label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Path layout.
    #[serde(default)]
    pub route: RouteStyle,
    /// Fixed attachment on the source node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_anchor: Option<Anchor>,
    /// Fixed attachment on the target node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_anchor: Option<Anchor>,
}

/// Colors and metrics used by the frame renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Theme {
    /// Dashed connection line color.
    pub connection_color: Color,
    /// Connection line width.
    pub connection_width: f64,
    /// Connection dash pattern (on, off, ...).
    pub connection_dash: Vec<f64>,
    /// Connection label text color.
    pub connection_label_color: Color,
    /// Connection label font size.
    pub connection_label_size: f64,
    /// Opaque rectangle behind connection labels.
    pub connection_label_backing: Color,
    /// Minimum size of the label backing rectangle.
    pub connection_label_box: [f64; 2],
    /// Fill for box nodes without an explicit color.
    pub box_fill: Color,
    /// Box node border color.
    pub box_border_color: Color,
    /// Box node border width.
    pub box_border_width: f64,
    /// Box node corner radius.
    pub box_corner_radius: f64,
    /// Fill for stage nodes without an explicit color.
    pub stage_fill: Color,
    /// Stage label color.
    pub stage_text_color: Color,
    /// Stage label font size.
    pub stage_text_size: f64,
    /// Left inset of the stage label.
    pub stage_text_inset: f64,
    /// Box label color.
    pub label_color: Color,
    /// Box label font size.
    pub label_size: f64,
    /// Distance between label lines.
    pub label_line_height: f64,
    /// Baseline of the last label line, measured up from the node bottom.
    pub label_bottom_inset: f64,
    /// Label drop shadow color.
    pub label_shadow_color: Color,
    /// Label drop shadow blur.
    pub label_shadow_blur: f64,
    /// Label drop shadow vertical offset.
    pub label_shadow_offset_y: f64,
    /// Subtext color.
    pub subtext_color: Color,
    /// Subtext font size.
    pub subtext_size: f64,
    /// Subtext center, measured up from the node bottom.
    pub subtext_bottom_inset: f64,
    /// Icon center, measured down from the node top.
    pub icon_center_y: f64,
    /// Edge of a single icon.
    pub icon_size: f64,
    /// Edge of each icon in a row.
    pub icon_row_size: f64,
    /// Center-to-center distance of icons in a row.
    pub icon_row_spacing: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            connection_color: Color::rgba8(0x37, 0x41, 0x51, 0xff),
            connection_width: 2.0,
            connection_dash: vec![8.0, 4.0],
            connection_label_color: Color::rgba8(0x9c, 0xa3, 0xaf, 0xff),
            connection_label_size: 14.0,
            connection_label_backing: default_background(),
            connection_label_box: [60.0, 24.0],
            box_fill: Color::rgba8(0x2d, 0x37, 0x48, 0xff),
            box_border_color: Color::rgba8(0x4a, 0x55, 0x68, 0xff),
            box_border_width: 5.0,
            box_corner_radius: 16.0,
            stage_fill: Color::rgba8(0x1e, 0x29, 0x3b, 0xff),
            stage_text_color: Color::rgba8(0x60, 0xa5, 0xfa, 0xff),
            stage_text_size: 16.0,
            stage_text_inset: 15.0,
            label_color: Color::rgba8(0xf3, 0xf4, 0xf6, 0xff),
            label_size: 16.0,
            label_line_height: 20.0,
            label_bottom_inset: 35.0,
            label_shadow_color: Color::rgba(0.0, 0.0, 0.0, 0.5),
            label_shadow_blur: 4.0,
            label_shadow_offset_y: 1.0,
            subtext_color: Color::rgba8(0x9c, 0xa3, 0xaf, 0xff),
            subtext_size: 12.0,
            subtext_bottom_inset: 15.0,
            icon_center_y: 45.0,
            icon_size: 60.0,
            icon_row_size: 50.0,
            icon_row_spacing: 70.0,
        }
    }
}

/// Diagram configuration as read from JSON.
///
/// This is the human-edited boundary object; [`Diagram::from_config`] validates it into the
/// runtime model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagramConfig {
    /// Fixed logical surface size.
    pub surface: Canvas,
    /// Clear color.
    #[serde(default = "default_background")]
    pub background: Color,
    /// Seed for per-particle randomness.
    #[serde(default)]
    pub seed: u64,
    /// Target frame rate for paced playback.
    #[serde(default)]
    pub fps: Fps,
    /// Font file for labels, relative to the assets root. Labels are skipped without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Icon key to source path, relative to the assets root.
    #[serde(default)]
    pub icons: BTreeMap<String, String>,
    /// Nodes in draw order.
    pub nodes: Vec<NodeDef>,
    /// Connections in draw order.
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
    /// Particle parameter ranges.
    #[serde(default)]
    pub particles: ParticleTuning,
    /// Renderer colors and metrics.
    #[serde(default)]
    pub theme: Theme,
}

impl DiagramConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> PipevizResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| PipevizError::serde(format!("parse diagram JSON: {e}")))
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json_str(s: &str) -> PipevizResult<Self> {
        serde_json::from_str(s).map_err(|e| PipevizError::serde(format!("parse diagram JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PipevizResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PipevizError::config(format!("open diagram JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> PipevizResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PipevizError::serde(e.to_string()))
    }

    /// Check referential integrity and value ranges. Fails on the first problem found.
    pub fn validate(&self) -> PipevizResult<()> {
        self.surface.validate()?;
        self.fps.validate()?;
        self.particles.validate()?;

        let mut seen = HashMap::<&str, usize>::new();
        for (i, n) in self.nodes.iter().enumerate() {
            if n.id.is_empty() {
                return Err(PipevizError::config(format!("node #{i} has an empty id")));
            }
            if seen.insert(n.id.as_str(), i).is_some() {
                return Err(PipevizError::config(format!("duplicate node id '{}'", n.id)));
            }
            let dims = [n.x, n.y, n.width, n.height];
            if dims.iter().any(|v| !v.is_finite()) {
                return Err(PipevizError::config(format!(
                    "node '{}' geometry must be finite",
                    n.id
                )));
            }
            if n.width <= 0.0 || n.height <= 0.0 {
                return Err(PipevizError::config(format!(
                    "node '{}' width and height must be > 0",
                    n.id
                )));
            }
            if n.icon.is_some() && !n.icons.is_empty() {
                return Err(PipevizError::config(format!(
                    "node '{}' sets both 'icon' and 'icons'",
                    n.id
                )));
            }
            for key in n.icon.iter().chain(n.icons.iter()) {
                if !self.icons.contains_key(key) {
                    return Err(PipevizError::config(format!(
                        "node '{}' references undeclared icon '{key}'",
                        n.id
                    )));
                }
            }
        }

        for (i, c) in self.connections.iter().enumerate() {
            for end in [&c.from, &c.to] {
                if !seen.contains_key(end.as_str()) {
                    return Err(PipevizError::config(format!(
                        "connection #{i} ({} -> {}) references undefined node '{end}'",
                        c.from, c.to
                    )));
                }
            }
            let ends = [(&c.from, c.from_anchor), (&c.to, c.to_anchor)];
            for (end, anchor) in ends {
                let Some(anchor) = anchor else { continue };
                if !anchor.offset.is_finite() {
                    return Err(PipevizError::config(format!(
                        "connection #{i} anchor offset must be finite"
                    )));
                }
                let node = &self.nodes[seen[end.as_str()]];
                let side_len = match anchor.side {
                    Side::Top | Side::Bottom => node.width,
                    Side::Left | Side::Right => node.height,
                };
                if anchor.offset.abs() > side_len {
                    return Err(PipevizError::config(format!(
                        "connection #{i} anchor offset {} runs past the {:?} side of '{end}' ({side_len})",
                        anchor.offset, anchor.side
                    )));
                }
            }
        }

        if self.theme.connection_dash.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(PipevizError::config(
                "theme connection_dash entries must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// A validated diagram: layout plus everything the renderer and driver need.
#[derive(Clone, Debug)]
pub struct Diagram {
    pub(crate) layout: Layout,
    pub(crate) background: Color,
    pub(crate) seed: u64,
    pub(crate) fps: Fps,
    pub(crate) font: Option<String>,
    pub(crate) icon_sources: BTreeMap<String, String>,
    pub(crate) tuning: ParticleTuning,
    pub(crate) theme: Theme,
}

impl Diagram {
    /// Validate `cfg` and build the runtime model. Configuration errors are fatal.
    pub fn from_config(cfg: DiagramConfig) -> PipevizResult<Self> {
        cfg.validate()?;

        let connections: Vec<Connection> = {
            let index: HashMap<&str, usize> = cfg
                .nodes
                .iter()
                .enumerate()
                .map(|(i, n)| (n.id.as_str(), i))
                .collect();
            cfg.connections
                .iter()
                .map(|c| Connection {
                    from: index[c.from.as_str()],
                    to: index[c.to.as_str()],
                    label: c.label.clone(),
                    route_style: c.route,
                    from_anchor: c.from_anchor,
                    to_anchor: c.to_anchor,
                })
                .collect()
        };

        let (box_fill, stage_fill) = (cfg.theme.box_fill, cfg.theme.stage_fill);
        let nodes = cfg
            .nodes
            .into_iter()
            .map(|n| {
                let color = n.color.unwrap_or(match n.kind {
                    NodeKind::Box => box_fill,
                    NodeKind::Stage => stage_fill,
                });
                let icons = match (n.icon, n.icons) {
                    (Some(k), _) => NodeIcons::Single(k),
                    (None, keys) if keys.is_empty() => NodeIcons::None,
                    (None, keys) => NodeIcons::Row(keys),
                };
                Node {
                    id: n.id,
                    rect: Rect::new(n.x, n.y, n.x + n.width, n.y + n.height),
                    kind: n.kind,
                    color,
                    label: n.label,
                    subtext: n.subtext,
                    icons,
                }
            })
            .collect();

        Ok(Self {
            layout: Layout::new(cfg.surface, nodes, connections),
            background: cfg.background,
            seed: cfg.seed,
            fps: cfg.fps,
            font: cfg.font,
            icon_sources: cfg.icons,
            tuning: cfg.particles,
            theme: cfg.theme,
        })
    }

    /// Node registry and routes.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Clear color.
    pub fn background(&self) -> Color {
        self.background
    }

    /// Particle randomness seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Target frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Font source, if configured.
    pub fn font(&self) -> Option<&str> {
        self.font.as_deref()
    }

    /// Icon key to source path.
    pub fn icon_sources(&self) -> &BTreeMap<String, String> {
        &self.icon_sources
    }

    /// Particle parameter ranges.
    pub fn tuning(&self) -> &ParticleTuning {
        &self.tuning
    }

    /// Renderer colors and metrics.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/config.rs"]
mod tests;
