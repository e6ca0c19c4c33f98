use serde::{Deserialize, Serialize};

use crate::foundation::core::{BezPath, Point};

/// Axis of the shared middle segment of an orthogonal route.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Vertical → horizontal → vertical, crossing at `y = (start.y + end.y) / 2`.
    #[default]
    Vertical,
    /// Horizontal → vertical → horizontal, crossing at `x = (start.x + end.x) / 2`.
    Horizontal,
}

/// How a connection's path is laid out between its two endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStyle {
    /// Single segment from start to end.
    #[default]
    Straight,
    /// Three axis-aligned segments through a shared midline.
    Orthogonal {
        /// Direction of the first and last segments.
        #[serde(default)]
        via: Axis,
    },
}

/// A resolved connection path: a polyline plus the progress value at which each vertex is reached.
///
/// Progress is distributed proportionally to segment length, so a particle moving at a constant
/// progress rate also moves at a constant visual speed.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    points: Vec<Point>,
    thresholds: Vec<f64>,
    length: f64,
}

impl Route {
    /// Build the route for `style` between two resolved endpoints.
    pub fn new(style: RouteStyle, start: Point, end: Point) -> Self {
        let points = match style {
            RouteStyle::Straight => vec![start, end],
            RouteStyle::Orthogonal { via: Axis::Vertical } => {
                let mid_y = (start.y + end.y) / 2.0;
                vec![
                    start,
                    Point::new(start.x, mid_y),
                    Point::new(end.x, mid_y),
                    end,
                ]
            }
            RouteStyle::Orthogonal {
                via: Axis::Horizontal,
            } => {
                let mid_x = (start.x + end.x) / 2.0;
                vec![
                    start,
                    Point::new(mid_x, start.y),
                    Point::new(mid_x, end.y),
                    end,
                ]
            }
        };
        Self::from_polyline(points)
    }

    fn from_polyline(points: Vec<Point>) -> Self {
        let seg_lens: Vec<f64> = points.windows(2).map(|w| w[0].distance(w[1])).collect();
        let length: f64 = seg_lens.iter().sum();

        let mut thresholds = Vec::with_capacity(points.len());
        thresholds.push(0.0);
        let mut acc = 0.0;
        for len in &seg_lens {
            acc += len;
            thresholds.push(if length > 0.0 { acc / length } else { 0.0 });
        }
        if let Some(last) = thresholds.last_mut() {
            *last = 1.0;
        }

        Self {
            points,
            thresholds,
            length,
        }
    }

    /// First point of the path.
    pub fn start(&self) -> Point {
        self.points[0]
    }

    /// Last point of the path.
    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Polyline vertices, start to end.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Progress value reached at each vertex; first is `0`, last is `1`.
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Total path length in logical pixels.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Position along the path at global `progress`.
    ///
    /// The segment is the first one whose end threshold is strictly greater than `progress`
    /// (the last segment otherwise); within it, progress is remapped to the segment's threshold
    /// band and interpolated linearly.
    pub fn point_at(&self, progress: f64) -> Point {
        if self.length <= 0.0 {
            return self.start();
        }

        let last = self.points.len() - 2;
        let seg = (0..last)
            .find(|&i| progress < self.thresholds[i + 1])
            .unwrap_or(last);

        let (t0, t1) = (self.thresholds[seg], self.thresholds[seg + 1]);
        let band = t1 - t0;
        let local = if band > 0.0 {
            (progress - t0) / band
        } else {
            1.0
        };

        let (a, b) = (self.points[seg], self.points[seg + 1]);
        Point::new(a.x + (b.x - a.x) * local, a.y + (b.y - a.y) * local)
    }

    /// Anchor for the connection label: halfway between start and end.
    ///
    /// For both route styles this point lies on the path itself.
    pub fn midpoint(&self) -> Point {
        self.start().midpoint(self.end())
    }

    /// Path through every vertex, for stroking.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut it = self.points.iter();
        if let Some(&first) = it.next() {
            path.move_to(first);
            for &p in it {
                path.line_to(p);
            }
        }
        path
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/route.rs"]
mod tests;
