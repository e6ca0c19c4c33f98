use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::assets::color::Color;
use crate::foundation::core::{Canvas, Rect};
use crate::geometry::edge::{Anchor, edge_point};
use crate::geometry::route::{Route, RouteStyle};

/// How a node is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Rounded, bordered box with icon(s), label and optional subtext.
    #[default]
    Box,
    /// Flat label bar with left-aligned text.
    Stage,
}

/// Icon references attached to a node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NodeIcons {
    /// No icon.
    #[default]
    None,
    /// One icon, centered.
    Single(String),
    /// Several icons laid out in a centered row.
    Row(Vec<String>),
}

impl NodeIcons {
    /// Every referenced icon key, in draw order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::None => &[],
            Self::Single(k) => std::slice::from_ref(k),
            Self::Row(keys) => keys,
        };
        slice.iter().map(String::as_str)
    }
}

/// A fixed rectangular pipeline stage. Immutable once the layout is built.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Unique key.
    pub id: String,
    /// Position and size in logical pixels.
    pub rect: Rect,
    /// Display variant.
    pub kind: NodeKind,
    /// Fill color.
    pub color: Color,
    /// Label; `\n` separates lines.
    pub label: String,
    /// Secondary line under the label.
    pub subtext: Option<String>,
    /// Icon references.
    pub icons: NodeIcons,
}

/// A directed edge between two nodes, stored by node index.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    /// Index of the source node in [`Layout::nodes`].
    pub from: usize,
    /// Index of the target node in [`Layout::nodes`].
    pub to: usize,
    /// Optional label drawn at the path midpoint.
    pub label: Option<String>,
    /// Path layout.
    pub route_style: RouteStyle,
    /// Fixed attachment on the source node, overriding the facing-side rule.
    pub from_anchor: Option<Anchor>,
    /// Fixed attachment on the target node, overriding the facing-side rule.
    pub to_anchor: Option<Anchor>,
}

/// Validated, read-only node registry and ordered connection list.
///
/// Routes are resolved once here; nodes never move, so neither do the paths.
#[derive(Clone, Debug)]
pub struct Layout {
    canvas: Canvas,
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    connections: Vec<Connection>,
    routes: Vec<Route>,
}

impl Layout {
    /// Assemble a layout. Callers guarantee every connection index is in bounds and ids are
    /// unique; [`crate::DiagramConfig::validate`] checks this for configuration input.
    pub(crate) fn new(canvas: Canvas, nodes: Vec<Node>, connections: Vec<Connection>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        let routes = connections
            .iter()
            .map(|c| resolve_route(&nodes[c.from], &nodes[c.to], c))
            .collect();
        Self {
            canvas,
            nodes,
            index,
            connections,
            routes,
        }
    }

    /// Logical surface size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Nodes in definition order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Connections in definition order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Resolved path of connection `i`.
    pub fn route(&self, i: usize) -> &Route {
        &self.routes[i]
    }

    /// Resolved paths, parallel to [`Layout::connections`].
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

/// Resolve both endpoints of `conn` and build its path.
pub(crate) fn resolve_route(from: &Node, to: &Node, conn: &Connection) -> Route {
    let start = conn
        .from_anchor
        .map(|a| a.resolve(from.rect))
        .unwrap_or_else(|| edge_point(from.rect, to.rect));
    let end = conn
        .to_anchor
        .map(|a| a.resolve(to.rect))
        .unwrap_or_else(|| edge_point(to.rect, from.rect));
    Route::new(conn.route_style, start, end)
}
