use lyon::path::Path;
use serde::{Deserialize, Serialize};

use super::geometry::{Orientation, Segment, EPSILON};
use super::{polyline_contains, polyline_path, DesignerShape, Outline, Point, Property, Rect};

/// Which leg of a right-angle drag is drawn first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RightAngleMode {
    /// Horizontal leg first; the corner sits at `(end.x, start.y)`.
    #[default]
    Top,
    /// Vertical leg first; the corner sits at `(start.x, end.y)`.
    Bottom,
}

impl RightAngleMode {
    pub fn toggled(self) -> Self {
        match self {
            RightAngleMode::Top => RightAngleMode::Bottom,
            RightAngleMode::Bottom => RightAngleMode::Top,
        }
    }
}

/// An electrical connection drawn as a straight segment.
///
/// While being drawn, a diagonal drag is decomposed into the primary
/// `line` plus a `companion` leg meeting it at a right angle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignNet {
    pub line: Segment,
    #[serde(default)]
    pub mode: RightAngleMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companion: Option<Segment>,
    #[serde(skip)]
    edit_stack: Vec<(Segment, Option<Segment>)>,
}

impl DesignNet {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            line: Segment::new(start, end),
            mode: RightAngleMode::Top,
            companion: None,
            edit_stack: Vec::new(),
        }
    }

    pub fn with_mode(mut self, mode: RightAngleMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn start(&self) -> Point {
        self.line.start
    }

    pub fn end(&self) -> Point {
        self.line.end
    }

    /// Move the free end of the net, splitting a diagonal drag into two
    /// axis-aligned legs according to `mode`.
    pub fn set_end(&mut self, end: Point) {
        let start = self.line.start;
        let dragged = Segment::new(start, end);
        if dragged.orientation(EPSILON) != Orientation::Diagonal {
            self.line = dragged;
            self.companion = None;
            return;
        }
        let corner = match self.mode {
            RightAngleMode::Top => Point::new(end.x, start.y),
            RightAngleMode::Bottom => Point::new(start.x, end.y),
        };
        self.line = Segment::new(start, corner);
        self.companion = Some(Segment::new(corner, end));
    }

    /// The companion leg, leaving the net with only its primary line.
    pub fn take_companion(&mut self) -> Option<Segment> {
        self.companion.take()
    }

    pub fn is_axis_aligned(&self, tol: f64) -> bool {
        matches!(
            self.line.orientation(tol),
            Orientation::Horizontal | Orientation::Vertical
        )
    }

    fn points(&self) -> Vec<Point> {
        let mut points = vec![self.line.start, self.line.end];
        if let Some(c) = &self.companion {
            points.push(c.end);
        }
        points
    }
}

impl DesignerShape for DesignNet {
    fn render(&self) -> Path {
        polyline_path(&self.points())
    }

    fn bounds(&self) -> Rect {
        Rect::bounding(&self.points()).unwrap_or_default()
    }

    fn outline(&self) -> Outline {
        Outline::Polyline {
            points: self.points(),
            closed: false,
        }
    }

    fn properties(&self) -> Vec<Property> {
        vec![
            Property::number("Start X", self.line.start.x),
            Property::number("Start Y", self.line.start.y),
            Property::number("End X", self.line.end.x),
            Property::number("End Y", self.line.end.y),
            Property::string(
                "Right Angle",
                match self.mode {
                    RightAngleMode::Top => "Top",
                    RightAngleMode::Bottom => "Bottom",
                },
            ),
        ]
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        polyline_contains(&self.points(), p, tolerance)
    }

    fn redo_edit(&mut self, p: Point) -> bool {
        self.edit_stack.push((self.line, self.companion));
        self.set_end(p);
        true
    }

    fn undo_edit(&mut self) -> bool {
        match self.edit_stack.pop() {
            Some((line, companion)) => {
                self.line = line;
                self.companion = companion;
                true
            }
            None => false,
        }
    }
}
