//! Scene-space collision geometry and intersection tests.

use lyon::geom::euclid;

use crate::model::geometry::{map_point, point_in_polygon, segments_intersect};
use crate::model::{Outline, Point, Rect, Segment, Transform};

/// Segments used to approximate an ellipse when two ellipses are tested.
const ELLIPSE_SEGMENTS: usize = 64;

/// Collision geometry of one primitive, already mapped to scene coordinates.
#[derive(Debug, Clone)]
pub enum SceneOutline {
    Polyline { points: Vec<Point>, closed: bool },
    /// Filled ellipse, stored as the affine image of the unit disc.
    Ellipse { from_unit: Transform, to_unit: Transform },
}

impl SceneOutline {
    /// Map a local outline through the item's scene transform.
    pub fn from_local(outline: &Outline, scene: &Transform) -> Option<SceneOutline> {
        match outline {
            Outline::Empty => None,
            Outline::Polyline { points, closed } => Some(SceneOutline::Polyline {
                points: points.iter().map(|p| map_point(scene, *p)).collect(),
                closed: *closed,
            }),
            Outline::Ellipse { rect } => {
                let c = rect.center();
                let from_unit = Transform::scale(rect.width / 2.0, rect.height / 2.0)
                    .then_translate(euclid::vec2(c.x, c.y))
                    .then(scene);
                match from_unit.inverse() {
                    Some(to_unit) => Some(SceneOutline::Ellipse { from_unit, to_unit }),
                    // A flat ellipse collapses onto its bounding box outline.
                    None => Some(SceneOutline::Polyline {
                        points: rect.corners().iter().map(|p| map_point(scene, *p)).collect(),
                        closed: false,
                    }),
                }
            }
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            SceneOutline::Polyline { points, .. } => Rect::bounding(points).unwrap_or_default(),
            SceneOutline::Ellipse { from_unit, .. } => {
                Rect::new(-1.0, -1.0, 2.0, 2.0).transformed(from_unit)
            }
        }
    }

    fn polygon_of_ellipse(from_unit: &Transform) -> Vec<Point> {
        (0..ELLIPSE_SEGMENTS)
            .map(|i| {
                let a = i as f64 / ELLIPSE_SEGMENTS as f64 * std::f64::consts::TAU;
                map_point(from_unit, Point::new(a.cos(), a.sin()))
            })
            .collect()
    }
}

fn edges(points: &[Point], closed: bool) -> Vec<Segment> {
    match points {
        [] => Vec::new(),
        [only] => vec![Segment::new(*only, *only)],
        _ => {
            let mut out: Vec<Segment> = points
                .windows(2)
                .map(|w| Segment::new(w[0], w[1]))
                .collect();
            if closed && points.len() > 2 {
                out.push(Segment::new(points[points.len() - 1], points[0]));
            }
            out
        }
    }
}

fn polyline_hits_polyline(
    a: &[Point],
    a_closed: bool,
    b: &[Point],
    b_closed: bool,
    tol: f64,
) -> bool {
    let ea = edges(a, a_closed);
    let eb = edges(b, b_closed);
    if ea
        .iter()
        .any(|sa| eb.iter().any(|sb| segments_intersect(sa, sb, tol)))
    {
        return true;
    }
    (a_closed && b.first().is_some_and(|p| point_in_polygon(p, a)))
        || (b_closed && a.first().is_some_and(|p| point_in_polygon(p, b)))
}

fn polyline_hits_ellipse(
    points: &[Point],
    closed: bool,
    from_unit: &Transform,
    to_unit: &Transform,
    tol: f64,
) -> bool {
    let unit: Vec<Point> = points.iter().map(|p| map_point(to_unit, *p)).collect();
    let origin = Point::origin();
    if edges(&unit, closed)
        .iter()
        .any(|s| s.distance_to_point(&origin) <= 1.0 + tol)
    {
        return true;
    }
    closed && point_in_polygon(&map_point(from_unit, origin), points)
}

/// True when the two outlines share at least one point. Touching boundaries
/// and collinear overlaps count.
pub fn outlines_collide(a: &SceneOutline, b: &SceneOutline, tol: f64) -> bool {
    match (a, b) {
        (
            SceneOutline::Polyline {
                points: pa,
                closed: ca,
            },
            SceneOutline::Polyline {
                points: pb,
                closed: cb,
            },
        ) => polyline_hits_polyline(pa, *ca, pb, *cb, tol),
        (SceneOutline::Polyline { points, closed }, SceneOutline::Ellipse { from_unit, to_unit })
        | (SceneOutline::Ellipse { from_unit, to_unit }, SceneOutline::Polyline { points, closed }) => {
            polyline_hits_ellipse(points, *closed, from_unit, to_unit, tol)
        }
        (
            SceneOutline::Ellipse {
                from_unit: fa, ..
            },
            SceneOutline::Ellipse {
                from_unit: fb,
                to_unit: tb,
            },
        ) => {
            let polygon = SceneOutline::polygon_of_ellipse(fa);
            polyline_hits_ellipse(&polygon, true, fb, tb, tol)
        }
    }
}
