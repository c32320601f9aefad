use lyon::geom::{point, CubicBezierSegment, QuadraticBezierSegment};
use lyon::path::Path;
use serde::{Deserialize, Serialize};

use super::{polyline_contains, polyline_path, DesignerShape, Outline, Point, Property, Rect};

const FLATTEN_TOLERANCE: f64 = 0.1;

/// Bezier curve built from up to four clicks: start, end, then one or two
/// control points. Two points give a line, three a quadratic, four a cubic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignArc {
    pub points: Vec<Point>,
}

impl DesignArc {
    pub const MAX_POINTS: usize = 4;

    pub fn new(start: Point) -> Self {
        Self {
            points: vec![start],
        }
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn is_complete(&self) -> bool {
        self.points.len() >= Self::MAX_POINTS
    }

    fn geom(p: Point) -> lyon::geom::Point<f64> {
        point(p.x, p.y)
    }

    /// The curve approximated by line segments.
    pub fn flattened(&self) -> Vec<Point> {
        match self.points.as_slice() {
            [s, e, c] => {
                let curve = QuadraticBezierSegment {
                    from: Self::geom(*s),
                    ctrl: Self::geom(*c),
                    to: Self::geom(*e),
                };
                std::iter::once(*s)
                    .chain(curve.flattened(FLATTEN_TOLERANCE).map(|p| Point::new(p.x, p.y)))
                    .collect()
            }
            [s, e, c1, c2, ..] => {
                let curve = CubicBezierSegment {
                    from: Self::geom(*s),
                    ctrl1: Self::geom(*c1),
                    ctrl2: Self::geom(*c2),
                    to: Self::geom(*e),
                };
                std::iter::once(*s)
                    .chain(curve.flattened(FLATTEN_TOLERANCE).map(|p| Point::new(p.x, p.y)))
                    .collect()
            }
            other => other.to_vec(),
        }
    }
}

impl DesignerShape for DesignArc {
    fn render(&self) -> Path {
        let mut builder = Path::builder();
        match self.points.as_slice() {
            [s, e, c] => {
                builder.begin(s.to_lyon());
                builder.quadratic_bezier_to(c.to_lyon(), e.to_lyon());
                builder.end(false);
                builder.build()
            }
            [s, e, c1, c2, ..] => {
                builder.begin(s.to_lyon());
                builder.cubic_bezier_to(c1.to_lyon(), c2.to_lyon(), e.to_lyon());
                builder.end(false);
                builder.build()
            }
            other => polyline_path(other),
        }
    }

    fn bounds(&self) -> Rect {
        let bb = match self.points.as_slice() {
            [s, e, c] => QuadraticBezierSegment {
                from: Self::geom(*s),
                ctrl: Self::geom(*c),
                to: Self::geom(*e),
            }
            .bounding_box(),
            [s, e, c1, c2, ..] => CubicBezierSegment {
                from: Self::geom(*s),
                ctrl1: Self::geom(*c1),
                ctrl2: Self::geom(*c2),
                to: Self::geom(*e),
            }
            .bounding_box(),
            other => return Rect::bounding(other).unwrap_or_default(),
        };
        Rect::new(bb.min.x, bb.min.y, bb.max.x - bb.min.x, bb.max.y - bb.min.y)
    }

    fn outline(&self) -> Outline {
        Outline::Polyline {
            points: self.flattened(),
            closed: false,
        }
    }

    fn properties(&self) -> Vec<Property> {
        vec![Property::number("Control Points", self.points.len() as f64)]
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        polyline_contains(&self.flattened(), p, tolerance)
    }

    fn redo_edit(&mut self, p: Point) -> bool {
        if self.is_complete() {
            return false;
        }
        self.points.push(p);
        true
    }

    fn undo_edit(&mut self) -> bool {
        if self.points.len() > 1 {
            self.points.pop();
            true
        } else {
            false
        }
    }
}
