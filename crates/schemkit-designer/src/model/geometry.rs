//! Planar geometry shared by all primitives: points, rectangles, segments,
//! and the affine transforms items are placed with.

use lyon::geom::euclid;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Affine transform in `f64`, row-vector convention (`a.then(&b)` applies `a` first).
pub type Transform = euclid::default::Transform2D<f64>;

/// Default coordinate tolerance for coincidence tests.
pub const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Coincidence within `tol` on both axes.
    pub fn approx_eq(&self, other: &Point, tol: f64) -> bool {
        (self.x - other.x).abs() <= tol && (self.y - other.y).abs() <= tol
    }

    pub fn to_euclid(self) -> euclid::default::Point2D<f64> {
        euclid::point2(self.x, self.y)
    }

    pub fn from_euclid(p: euclid::default::Point2D<f64>) -> Self {
        Self::new(p.x, p.y)
    }

    pub fn to_lyon(self) -> lyon::math::Point {
        lyon::math::point(self.x as f32, self.y as f32)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle. Width and height are non-negative once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two opposite corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Smallest rectangle containing all points. `None` for an empty slice.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn contains(&self, p: Point, tolerance: f64) -> bool {
        p.x >= self.x - tolerance
            && p.x <= self.x + self.width + tolerance
            && p.y >= self.y - tolerance
            && p.y <= self.y + self.height + tolerance
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains(other.min(), 0.0) && self.contains(other.max(), 0.0)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }

    /// Image of the rectangle's corners under `t`, re-bounded.
    pub fn transformed(&self, t: &Transform) -> Rect {
        let corners = self.corners().map(|c| map_point(t, c));
        // Four corners are always present.
        Rect::bounding(&corners).unwrap_or(*self)
    }
}

/// Direction class of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
    Diagonal,
    Degenerate,
}

/// A straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn is_degenerate(&self, tol: f64) -> bool {
        self.start.approx_eq(&self.end, tol)
    }

    pub fn orientation(&self, tol: f64) -> Orientation {
        let dx = (self.end.x - self.start.x).abs();
        let dy = (self.end.y - self.start.y).abs();
        match (dx <= tol, dy <= tol) {
            (true, true) => Orientation::Degenerate,
            (false, true) => Orientation::Horizontal,
            (true, false) => Orientation::Vertical,
            (false, false) => Orientation::Diagonal,
        }
    }

    /// Direction angle in degrees, in `[0, 360)`.
    pub fn angle(&self) -> f64 {
        let deg = (self.end.y - self.start.y)
            .atan2(self.end.x - self.start.x)
            .to_degrees();
        if deg < 0.0 {
            deg + 360.0
        } else {
            deg
        }
    }

    /// The same segment with endpoints ordered by increasing coordinate
    /// along its main axis.
    pub fn normalized(&self) -> Segment {
        let swap = if (self.end.x - self.start.x).abs() >= (self.end.y - self.start.y).abs() {
            self.start.x > self.end.x
        } else {
            self.start.y > self.end.y
        };
        if swap {
            Segment::new(self.end, self.start)
        } else {
            *self
        }
    }

    pub fn has_endpoint(&self, p: &Point, tol: f64) -> bool {
        self.start.approx_eq(p, tol) || self.end.approx_eq(p, tol)
    }

    pub fn shares_endpoint(&self, other: &Segment, tol: f64) -> bool {
        self.has_endpoint(&other.start, tol) || self.has_endpoint(&other.end, tol)
    }

    /// Distance from `p` to the closest point of the segment.
    pub fn distance_to_point(&self, p: &Point) -> f64 {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return self.start.distance_to(p);
        }
        let t = (((p.x - self.start.x) * dx + (p.y - self.start.y) * dy) / len_sq).clamp(0.0, 1.0);
        let proj = Point::new(self.start.x + t * dx, self.start.y + t * dy);
        proj.distance_to(p)
    }

    /// True when `p` lies on the segment and is not one of its endpoints.
    pub fn contains_point_strict(&self, p: &Point, tol: f64) -> bool {
        !self.has_endpoint(p, tol) && self.distance_to_point(p) <= tol
    }

    /// Intersection point of two segments that cross at a single point.
    /// Parallel and collinear pairs yield `None`.
    pub fn crossing_point(&self, other: &Segment, tol: f64) -> Option<Point> {
        let r = self.end - self.start;
        let s = other.end - other.start;
        let denom = cross(r, s);
        if denom.abs() <= f64::EPSILON {
            return None;
        }
        let qp = other.start - self.start;
        let t = cross(qp, s) / denom;
        let u = cross(qp, r) / denom;
        let lt = tol / r.x.hypot(r.y).max(f64::EPSILON);
        let lu = tol / s.x.hypot(s.y).max(f64::EPSILON);
        if t < -lt || t > 1.0 + lt || u < -lu || u > 1.0 + lu {
            return None;
        }
        Some(Point::new(self.start.x + t * r.x, self.start.y + t * r.y))
    }

    pub fn transformed(&self, t: &Transform) -> Segment {
        Segment::new(map_point(t, self.start), map_point(t, self.end))
    }
}

fn cross(a: Point, b: Point) -> f64 {
    a.x * b.y - a.y * b.x
}

fn orient(a: &Point, b: &Point, c: &Point) -> f64 {
    cross(*b - *a, *c - *a)
}

fn on_segment_bbox(a: &Point, b: &Point, p: &Point, tol: f64) -> bool {
    p.x >= a.x.min(b.x) - tol
        && p.x <= a.x.max(b.x) + tol
        && p.y >= a.y.min(b.y) - tol
        && p.y <= a.y.max(b.y) + tol
}

/// Inclusive segment intersection test: touching endpoints and collinear
/// overlaps count as intersecting.
pub fn segments_intersect(a: &Segment, b: &Segment, tol: f64) -> bool {
    let (p1, p2, p3, p4) = (&a.start, &a.end, &b.start, &b.end);
    let scale_a = a.length().max(1.0);
    let scale_b = b.length().max(1.0);
    let d1 = orient(p3, p4, p1) / scale_b;
    let d2 = orient(p3, p4, p2) / scale_b;
    let d3 = orient(p1, p2, p3) / scale_a;
    let d4 = orient(p1, p2, p4) / scale_a;

    if ((d1 > tol && d2 < -tol) || (d1 < -tol && d2 > tol))
        && ((d3 > tol && d4 < -tol) || (d3 < -tol && d4 > tol))
    {
        return true;
    }

    (d1.abs() <= tol && on_segment_bbox(p3, p4, p1, tol))
        || (d2.abs() <= tol && on_segment_bbox(p3, p4, p2, tol))
        || (d3.abs() <= tol && on_segment_bbox(p1, p2, p3, tol))
        || (d4.abs() <= tol && on_segment_bbox(p1, p2, p4, tol))
}

/// Even-odd point-in-polygon test.
pub fn point_in_polygon(p: &Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (&polygon[i], &polygon[j]);
        if (pi.y > p.y) != (pj.y > p.y) && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Apply `t` to a point.
pub fn map_point(t: &Transform, p: Point) -> Point {
    Point::from_euclid(t.transform_point(p.to_euclid()))
}

/// Position plus linear transform: the local-to-parent placement of an item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub pos: Point,
    pub transform: Transform,
}

impl Placement {
    pub fn new(pos: Point, transform: Transform) -> Self {
        Self { pos, transform }
    }

    /// Local-to-parent matrix: the linear part first, then the translation.
    pub fn matrix(&self) -> Transform {
        self.transform
            .then_translate(euclid::vec2(self.pos.x, self.pos.y))
    }

    /// Split a full affine matrix back into position and linear part.
    pub fn from_matrix(m: &Transform) -> Self {
        Self {
            pos: Point::new(m.m31, m.m32),
            transform: Transform::new(m.m11, m.m12, m.m21, m.m22, 0.0, 0.0),
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(Point::origin(), Transform::identity())
    }
}

/// Rotation by `angle_deg` about `pivot`.
pub fn rotation_about(pivot: Point, angle_deg: f64) -> Transform {
    Transform::translation(-pivot.x, -pivot.y)
        .then_rotate(euclid::Angle::degrees(angle_deg))
        .then_translate(euclid::vec2(pivot.x, pivot.y))
}

/// Reflection across the vertical line `x = pivot.x`.
pub fn mirror_about(pivot: Point) -> Transform {
    Transform::translation(-pivot.x, -pivot.y)
        .then_scale(-1.0, 1.0)
        .then_translate(euclid::vec2(pivot.x, pivot.y))
}

/// Flatten a transform to its six coefficients for persistence.
pub fn transform_to_array(t: &Transform) -> [f64; 6] {
    [t.m11, t.m12, t.m21, t.m22, t.m31, t.m32]
}

pub fn transform_from_array(a: [f64; 6]) -> Transform {
    Transform::new(a[0], a[1], a[2], a[3], a[4], a[5])
}
