use lyon::path::Path;
use serde::{Deserialize, Serialize};

use super::{polygon_path, DesignerShape, Outline, Point, Property, Rect};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignRectangle {
    /// Corner fixed while the rectangle is being dragged out.
    pub anchor: Point,
    pub rect: Rect,
    #[serde(skip)]
    edit_stack: Vec<Rect>,
}

impl DesignRectangle {
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

impl DesignerShape for DesignRectangle {
    fn render(&self) -> Path {
        polygon_path(&self.rect.corners())
    }

    fn bounds(&self) -> Rect {
        self.rect
    }

    fn outline(&self) -> Outline {
        Outline::Polyline {
            points: self.rect.corners().to_vec(),
            closed: true,
        }
    }

    fn properties(&self) -> Vec<Property> {
        vec![
            Property::number("X", self.rect.x),
            Property::number("Y", self.rect.y),
            Property::number("Width", self.rect.width),
            Property::number("Height", self.rect.height),
        ]
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        self.rect.contains(p, tolerance)
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
