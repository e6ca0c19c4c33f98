use serde::{Deserialize, Serialize};

use crate::foundation::core::{Point, Rect};

/// One of the four sides of a node rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// `y = y0`.
    Top,
    /// `y = y1`.
    Bottom,
    /// `x = x0`.
    Left,
    /// `x = x1`.
    Right,
}

/// A fixed attachment point on a node side.
///
/// `offset` runs along the side from its left (top/bottom sides) or top (left/right sides) corner.
/// Negative offsets are measured back from the opposite corner, so `{bottom, -50}` is 50px left of
/// the bottom-right corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Anchor {
    /// Side the point lies on.
    pub side: Side,
    /// Distance along the side.
    #[serde(default)]
    pub offset: f64,
}

impl Anchor {
    /// Construct an anchor.
    pub const fn new(side: Side, offset: f64) -> Self {
        Self { side, offset }
    }

    /// Resolve the anchor against a node rectangle.
    pub fn resolve(self, rect: Rect) -> Point {
        let along = |lo: f64, hi: f64| {
            if self.offset.is_sign_negative() {
                hi + self.offset
            } else {
                lo + self.offset
            }
        };
        match self.side {
            Side::Top => Point::new(along(rect.x0, rect.x1), rect.y0),
            Side::Bottom => Point::new(along(rect.x0, rect.x1), rect.y1),
            Side::Left => Point::new(rect.x0, along(rect.y0, rect.y1)),
            Side::Right => Point::new(rect.x1, along(rect.y0, rect.y1)),
        }
    }
}

/// Midpoint of the side of `node` facing `target`.
///
/// The side is picked by the dominant center-to-center axis: left/right when `|dx| > |dy|`,
/// otherwise top/bottom (ties go vertical), with the sign of the delta choosing between the two.
pub fn edge_point(node: Rect, target: Rect) -> Point {
    let c = node.center();
    let d = target.center() - c;

    if d.x.abs() > d.y.abs() {
        if d.x > 0.0 {
            Point::new(node.x1, c.y)
        } else {
            Point::new(node.x0, c.y)
        }
    } else if d.y > 0.0 {
        Point::new(c.x, node.y1)
    } else {
        Point::new(c.x, node.y0)
    }
}

/// Return `true` when `p` lies on one of the four sides of `rect`.
pub fn on_boundary(rect: Rect, p: Point) -> bool {
    const EPS: f64 = 1e-9;
    let within_x = p.x >= rect.x0 - EPS && p.x <= rect.x1 + EPS;
    let within_y = p.y >= rect.y0 - EPS && p.y <= rect.y1 + EPS;
    let on_vertical = (p.x - rect.x0).abs() <= EPS || (p.x - rect.x1).abs() <= EPS;
    let on_horizontal = (p.y - rect.y0).abs() <= EPS || (p.y - rect.y1).abs() <= EPS;
    (on_vertical && within_y) || (on_horizontal && within_x)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/edge.rs"]
mod tests;
