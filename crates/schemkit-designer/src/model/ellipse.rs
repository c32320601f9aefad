use lyon::math::{vector, Angle};
use lyon::path::{Path, Winding};
use serde::{Deserialize, Serialize};

use super::{DesignerShape, Outline, Point, Property, Rect};

/// Ellipse inscribed in an axis-aligned rectangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignEllipse {
    pub anchor: Point,
    pub rect: Rect,
    #[serde(skip)]
    edit_stack: Vec<Rect>,
}

impl DesignEllipse {
    pub fn new(anchor: Point) -> Self {
        Self {
            anchor,
            rect: Rect::new(anchor.x, anchor.y, 0.0, 0.0),
            edit_stack: Vec::new(),
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self {
            anchor: rect.min(),
            rect,
            edit_stack: Vec::new(),
        }
    }
}

/// Point-in-ellipse test for the ellipse inscribed in `rect`, grown by `tolerance`.
pub(crate) fn ellipse_contains(rect: &Rect, p: Point, tolerance: f64) -> bool {
    let c = rect.center();
    let rx = rect.width / 2.0 + tolerance;
    let ry = rect.height / 2.0 + tolerance;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let dx = (p.x - c.x) / rx;
    let dy = (p.y - c.y) / ry;
    dx * dx + dy * dy <= 1.0
}

pub(crate) fn ellipse_path(rect: &Rect) -> Path {
    let mut builder = Path::builder();
    builder.add_ellipse(
        rect.center().to_lyon(),
        vector((rect.width / 2.0) as f32, (rect.height / 2.0) as f32),
        Angle::radians(0.0),
        Winding::Positive,
    );
    builder.build()
}

impl DesignerShape for DesignEllipse {
    fn render(&self) -> Path {
        ellipse_path(&self.rect)
    }

    fn bounds(&self) -> Rect {
        self.rect
    }

    fn outline(&self) -> Outline {
        Outline::Ellipse { rect: self.rect }
    }

    fn properties(&self) -> Vec<Property> {
        let c = self.rect.center();
        vec![
            Property::number("Center X", c.x),
            Property::number("Center Y", c.y),
            Property::number("Radius X", self.rect.width / 2.0),
            Property::number("Radius Y", self.rect.height / 2.0),
        ]
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        ellipse_contains(&self.rect, p, tolerance)
    }

    fn redo_edit(&mut self, p: Point) -> bool {
        self.edit_stack.push(self.rect);
        self.rect = Rect::from_corners(self.anchor, p);
        true
    }

    fn undo_edit(&mut self) -> bool {
        match self.edit_stack.pop() {
            Some(rect) => {
                self.rect = rect;
                true
            }
            None => false,
        }
    }
}
