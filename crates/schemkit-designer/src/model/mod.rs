use lyon::path::Path;
use serde::{Deserialize, Serialize};

mod arc;
mod circle;
mod ellipse;
pub mod geometry;
mod group;
mod image;
mod net;
mod rectangle;
pub mod style;
mod text;
mod wire;

pub use arc::DesignArc;
pub use circle::DesignCircle;
pub use ellipse::DesignEllipse;
pub use geometry::{Placement, Point, Rect, Segment, Transform};
pub use group::{DesignGroup, SymbolInfo};
pub use image::DesignImage;
pub use net::{DesignNet, RightAngleMode};
pub use rectangle::DesignRectangle;
pub use style::{Brush, BrushStyle, Color, Font, Pen, PenCap, PenJoin, PenStyle};
pub use text::DesignText;
pub use wire::DesignWire;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

impl Property {
    pub fn number(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value: PropertyValue::Number(value),
        }
    }

    pub fn string(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: PropertyValue::String(value.into()),
        }
    }

    pub fn bool(name: &str, value: bool) -> Self {
        Self {
            name: name.to_string(),
            value: PropertyValue::Bool(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Number(f64),
    String(String),
    Bool(bool),
}

/// Local-space collision geometry of a primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    /// Connected segments through `points`. A closed polyline also covers
    /// its interior.
    Polyline { points: Vec<Point>, closed: bool },
    /// Filled axis-aligned ellipse inscribed in `rect`.
    Ellipse { rect: Rect },
    Empty,
}

/// Behaviour shared by every primitive payload. All coordinates are local
/// to the owning item.
pub trait DesignerShape {
    fn render(&self) -> Path;
    fn bounds(&self) -> Rect;
    fn outline(&self) -> Outline;
    fn properties(&self) -> Vec<Property>;
    fn contains_point(&self, p: Point, tolerance: f64) -> bool;

    /// Apply one interactive edit step at `p`. Returns false when the
    /// shape has no editable geometry.
    fn redo_edit(&mut self, _p: Point) -> bool {
        false
    }

    /// Revert the most recent edit step.
    fn undo_edit(&mut self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeType {
    Net,
    Wire,
    Arc,
    Rectangle,
    Ellipse,
    Circle,
    Text,
    Image,
    Group,
}

impl ShapeType {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeType::Net => "Net",
            ShapeType::Wire => "Wire",
            ShapeType::Arc => "Arc",
            ShapeType::Rectangle => "Rectangle",
            ShapeType::Ellipse => "Ellipse",
            ShapeType::Circle => "Circle",
            ShapeType::Text => "Text",
            ShapeType::Image => "Image",
            ShapeType::Group => "Group",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    Net(DesignNet),
    Wire(DesignWire),
    Arc(DesignArc),
    Rectangle(DesignRectangle),
    Ellipse(DesignEllipse),
    Circle(DesignCircle),
    Text(DesignText),
    Image(DesignImage),
    Group(DesignGroup),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Shape::Net($s) => $body,
            Shape::Wire($s) => $body,
            Shape::Arc($s) => $body,
            Shape::Rectangle($s) => $body,
            Shape::Ellipse($s) => $body,
            Shape::Circle($s) => $body,
            Shape::Text($s) => $body,
            Shape::Image($s) => $body,
            Shape::Group($s) => $body,
        }
    };
}

impl DesignerShape for Shape {
    fn render(&self) -> Path {
        dispatch!(self, s => s.render())
    }

    fn bounds(&self) -> Rect {
        dispatch!(self, s => s.bounds())
    }

    fn outline(&self) -> Outline {
        dispatch!(self, s => s.outline())
    }

    fn properties(&self) -> Vec<Property> {
        dispatch!(self, s => s.properties())
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        dispatch!(self, s => s.contains_point(p, tolerance))
    }

    fn redo_edit(&mut self, p: Point) -> bool {
        dispatch!(self, s => s.redo_edit(p))
    }

    fn undo_edit(&mut self) -> bool {
        dispatch!(self, s => s.undo_edit())
    }
}

impl Shape {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Net(_) => ShapeType::Net,
            Shape::Wire(_) => ShapeType::Wire,
            Shape::Arc(_) => ShapeType::Arc,
            Shape::Rectangle(_) => ShapeType::Rectangle,
            Shape::Ellipse(_) => ShapeType::Ellipse,
            Shape::Circle(_) => ShapeType::Circle,
            Shape::Text(_) => ShapeType::Text,
            Shape::Image(_) => ShapeType::Image,
            Shape::Group(_) => ShapeType::Group,
        }
    }

    pub fn as_net(&self) -> Option<&DesignNet> {
        match self {
            Shape::Net(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_net_mut(&mut self) -> Option<&mut DesignNet> {
        match self {
            Shape::Net(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&DesignGroup> {
        match self {
            Shape::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut DesignGroup> {
        match self {
            Shape::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut DesignText> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Shape::Group(_))
    }
}

/// Closed lyon path through `points`, used by the box-shaped primitives.
pub(crate) fn polygon_path(points: &[Point]) -> Path {
    let mut builder = Path::builder();
    if let Some((first, rest)) = points.split_first() {
        builder.begin(first.to_lyon());
        for p in rest {
            builder.line_to(p.to_lyon());
        }
        builder.end(true);
    }
    builder.build()
}

/// Open lyon path through `points`.
pub(crate) fn polyline_path(points: &[Point]) -> Path {
    let mut builder = Path::builder();
    if let Some((first, rest)) = points.split_first() {
        builder.begin(first.to_lyon());
        for p in rest {
            builder.line_to(p.to_lyon());
        }
        builder.end(false);
    }
    builder.build()
}

/// Distance-based hit test against an open polyline.
pub(crate) fn polyline_contains(points: &[Point], p: Point, tolerance: f64) -> bool {
    match points {
        [] => false,
        [only] => only.distance_to(&p) <= tolerance,
        _ => points
            .windows(2)
            .any(|w| Segment::new(w[0], w[1]).distance_to_point(&p) <= tolerance),
    }
}
