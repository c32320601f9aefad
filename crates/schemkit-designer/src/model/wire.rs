use lyon::path::Path;
use serde::{Deserialize, Serialize};

use super::{polyline_contains, polyline_path, DesignerShape, Outline, Point, Property, Rect};

/// Free-form polyline. Each edit step appends a vertex.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignWire {
    pub points: Vec<Point>,
}

impl DesignWire {
    pub fn new(start: Point) -> Self {
        Self {
            points: vec![start],
        }
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }
}

impl DesignerShape for DesignWire {
    fn render(&self) -> Path {
        polyline_path(&self.points)
    }

    fn bounds(&self) -> Rect {
        Rect::bounding(&self.points).unwrap_or_default()
    }

    fn outline(&self) -> Outline {
        Outline::Polyline {
            points: self.points.clone(),
            closed: false,
        }
    }

    fn properties(&self) -> Vec<Property> {
        vec![Property::number("Vertices", self.points.len() as f64)]
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        polyline_contains(&self.points, p, tolerance)
    }

    fn redo_edit(&mut self, p: Point) -> bool {
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
