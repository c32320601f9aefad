use lyon::path::{Path, Winding};
use serde::{Deserialize, Serialize};

use super::ellipse::ellipse_contains;
use super::{DesignerShape, Outline, Point, Property, Rect};

/// Circle dragged out from a point on its rim.
///
/// The circle is inscribed in a square whose left edge midpoint is `start`,
/// rotated about `start` by `angle` degrees. Dragging to a point sets the
/// diameter to the drag distance and the angle to the drag direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignCircle {
    pub start: Point,
    pub diameter: f64,
    pub angle: f64,
    #[serde(skip)]
    edit_stack: Vec<(f64, f64)>,
}

impl DesignCircle {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            diameter: 0.0,
            angle: 0.0,
            edit_stack: Vec::new(),
        }
    }

    pub fn from_center(center: Point, radius: f64) -> Self {
        Self {
            start: Point::new(center.x - radius, center.y),
            diameter: radius * 2.0,
            angle: 0.0,
            edit_stack: Vec::new(),
        }
    }

    pub fn radius(&self) -> f64 {
        self.diameter / 2.0
    }

    pub fn center(&self) -> Point {
        let a = self.angle.to_radians();
        let r = self.radius();
        Point::new(self.start.x + r * a.cos(), self.start.y + r * a.sin())
    }

    fn square(&self) -> Rect {
        let c = self.center();
        let r = self.radius();
        Rect::new(c.x - r, c.y - r, self.diameter, self.diameter)
    }
}

/// Direction from `from` to `to` in degrees, with exact values on the axes.
/// A drag without length points along +x.
pub(crate) fn drag_angle(from: Point, to: Point) -> f64 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx == 0.0 && dy == 0.0 {
        0.0
    } else if dx == 0.0 {
        if dy > 0.0 {
            90.0
        } else {
            270.0
        }
    } else if dy == 0.0 {
        if dx >= 0.0 {
            0.0
        } else {
            180.0
        }
    } else {
        dy.atan2(dx).to_degrees()
    }
}

impl DesignerShape for DesignCircle {
    fn render(&self) -> Path {
        let mut builder = Path::builder();
        builder.add_circle(
            self.center().to_lyon(),
            self.radius() as f32,
            Winding::Positive,
        );
        builder.build()
    }

    fn bounds(&self) -> Rect {
        self.square()
    }

    fn outline(&self) -> Outline {
        Outline::Ellipse {
            rect: self.square(),
        }
    }

    fn properties(&self) -> Vec<Property> {
        let c = self.center();
        vec![
            Property::number("Center X", c.x),
            Property::number("Center Y", c.y),
            Property::number("Radius", self.radius()),
        ]
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        ellipse_contains(&self.square(), p, tolerance)
    }

    fn redo_edit(&mut self, p: Point) -> bool {
        self.edit_stack.push((self.diameter, self.angle));
        self.diameter = (p.x - self.start.x).hypot(p.y - self.start.y);
        if self.diameter > 0.0 {
            self.angle = drag_angle(self.start, p);
        }
        true
    }

    fn undo_edit(&mut self) -> bool {
        match self.edit_stack.pop() {
            Some((diameter, angle)) => {
                self.diameter = diameter;
                self.angle = angle;
                true
            }
            None => false,
        }
    }
}
