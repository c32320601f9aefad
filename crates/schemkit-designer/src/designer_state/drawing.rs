//! Multi-click drawing gestures: nets, wires, arcs and box shapes.

use schemkit_core::ItemId;

use super::{DesignerState, InteractionMode};
use crate::commands::{AddItem, DesignerCommand, EditNet, EditShape};
use crate::document::DrawingItem;
use crate::error::{DesignerError, DesignerResult};
use crate::model::geometry::EPSILON;
use crate::model::{
    DesignArc, DesignCircle, DesignEllipse, DesignNet, DesignRectangle, DesignWire,
    DesignerShape, Point, Shape,
};

/// Shapes dragged out from an anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxShape {
    Rectangle,
    Ellipse,
    Circle,
}

impl DesignerState {
    pub(super) fn new_item(&mut self, shape: Shape) -> DrawingItem {
        let id = self.document.generate_id();
        DrawingItem::new(id, shape)
            .with_pen(self.default_pen())
            .with_brush(self.default_brush())
    }

    fn start_gesture(&mut self, name: &str) -> DesignerResult<()> {
        self.cancel()?;
        self.history.begin_macro(name);
        Ok(())
    }

    fn abandon_gesture(&mut self) -> DesignerResult<()> {
        self.mode = InteractionMode::Idle;
        self.history.abort_macro(&mut self.document)
    }

    // ------------------------------------------------------------------
    // Nets
    // ------------------------------------------------------------------

    /// Start dragging a net from `p`.
    pub fn begin_net(&mut self, p: Point) -> DesignerResult<()> {
        self.start_gesture("Draw Net")?;
        let start = self.snap_to_pins(p);
        self.mode = InteractionMode::DrawingNet { start, item: None };
        Ok(())
    }

    /// Move the free end of the net being drawn.
    pub fn update_net(&mut self, p: Point) -> DesignerResult<()> {
        let InteractionMode::DrawingNet { start, item } = self.mode.clone() else {
            return Ok(());
        };
        let end = self.snap_to_pins(p);
        match item {
            Some(id) => self.push_command(DesignerCommand::Edit(EditShape::new(id, end))),
            None if end.approx_eq(&start, EPSILON) => Ok(()),
            None => {
                let mut net = DesignNet::new(start, start).with_mode(self.right_angle_mode);
                net.set_end(end);
                let item = self.new_item(Shape::Net(net));
                let id = item.id;
                self.push_command(DesignerCommand::AddItem(AddItem::new(item, None)))?;
                self.mode = InteractionMode::DrawingNet {
                    start,
                    item: Some(id),
                };
                Ok(())
            }
        }
    }

    /// Commit the net ending at `p`. A bent drag becomes two nets. Every
    /// new net is merged and split against its neighbours in the same undo
    /// step. Returns the resulting nets; a zero-length drag leaves nothing.
    pub fn finish_net(&mut self, p: Point) -> DesignerResult<Vec<ItemId>> {
        if !matches!(self.mode, InteractionMode::DrawingNet { .. }) {
            return Ok(Vec::new());
        }
        self.update_net(p)?;
        let InteractionMode::DrawingNet { item, .. } = self.mode.clone() else {
            return Ok(Vec::new());
        };
        let net = item.and_then(|id| {
            self.document
                .get(id)
                .and_then(|i| i.shape.as_net())
                .map(|n| (id, n.clone()))
        });
        let Some((id, net)) = net.filter(|(_, n)| !n.line.is_degenerate(EPSILON)) else {
            self.abandon_gesture()?;
            return Ok(Vec::new());
        };
        self.mode = InteractionMode::Idle;

        let result = self.commit_net(id, &net);
        match result {
            Ok(nets) => {
                self.history.end_macro()?;
                tracing::debug!("Drew nets {:?}", nets);
                Ok(nets)
            }
            Err(e) => {
                self.history.abort_macro(&mut self.document)?;
                Err(e)
            }
        }
    }

    fn commit_net(&mut self, id: ItemId, net: &DesignNet) -> DesignerResult<Vec<ItemId>> {
        let mut nets = vec![id];
        if let Some(leg) = net.companion {
            let edit = EditNet::new(&self.document, id, net.line)?;
            self.push_command(DesignerCommand::EditNet(edit))?;
            if !leg.is_degenerate(EPSILON) {
                let item = self.new_item(Shape::Net(DesignNet::new(leg.start, leg.end)));
                nets.push(item.id);
                self.push_command(DesignerCommand::AddItem(AddItem::new(item, None)))?;
            }
        }
        self.resolve_nets(&nets)
    }

    // ------------------------------------------------------------------
    // Wires and arcs
    // ------------------------------------------------------------------

    /// Start a polyline at `p`.
    pub fn begin_wire(&mut self, p: Point) -> DesignerResult<ItemId> {
        self.start_gesture("Draw Wire")?;
        let item = self.new_item(Shape::Wire(DesignWire::new(self.snap(p))));
        let id = item.id;
        self.push_command(DesignerCommand::AddItem(AddItem::new(item, None)))?;
        self.mode = InteractionMode::DrawingWire { item: id };
        Ok(id)
    }

    /// Append a vertex to the wire being drawn.
    pub fn add_wire_point(&mut self, p: Point) -> DesignerResult<()> {
        let InteractionMode::DrawingWire { item } = self.mode else {
            return Ok(());
        };
        let p = self.snap(p);
        self.push_command(DesignerCommand::Draw(EditShape::new(item, p)))
    }

    /// Commit the wire. One with a single vertex is discarded.
    pub fn finish_wire(&mut self) -> DesignerResult<Option<ItemId>> {
        let InteractionMode::DrawingWire { item } = self.mode else {
            return Ok(None);
        };
        let vertices = match self.document.get(item).map(|i| &i.shape) {
            Some(Shape::Wire(w)) => w.points.len(),
            _ => 0,
        };
        if vertices < 2 {
            self.abandon_gesture()?;
            return Ok(None);
        }
        self.mode = InteractionMode::Idle;
        self.history.end_macro()?;
        Ok(Some(item))
    }

    /// Start a curve at `p`.
    pub fn begin_arc(&mut self, p: Point) -> DesignerResult<ItemId> {
        self.start_gesture("Draw Arc")?;
        let item = self.new_item(Shape::Arc(DesignArc::new(self.snap(p))));
        let id = item.id;
        self.push_command(DesignerCommand::AddItem(AddItem::new(item, None)))?;
        self.mode = InteractionMode::DrawingArc { item: id };
        Ok(id)
    }

    /// Add the next end or control point. The curve commits itself once
    /// all points are placed; returns whether that happened.
    pub fn add_arc_point(&mut self, p: Point) -> DesignerResult<bool> {
        let InteractionMode::DrawingArc { item } = self.mode else {
            return Ok(false);
        };
        let p = self.snap(p);
        self.push_command(DesignerCommand::Draw(EditShape::new(item, p)))?;
        let complete = matches!(
            self.document.get(item).map(|i| &i.shape),
            Some(Shape::Arc(a)) if a.is_complete()
        );
        if complete {
            self.finish_arc()?;
        }
        Ok(complete)
    }

    /// Commit the curve; fewer than three points are discarded.
    pub fn finish_arc(&mut self) -> DesignerResult<Option<ItemId>> {
        let InteractionMode::DrawingArc { item } = self.mode else {
            return Ok(None);
        };
        let points = match self.document.get(item).map(|i| &i.shape) {
            Some(Shape::Arc(a)) => a.points.len(),
            _ => 0,
        };
        if points < 3 {
            self.abandon_gesture()?;
            return Ok(None);
        }
        self.mode = InteractionMode::Idle;
        self.history.end_macro()?;
        Ok(Some(item))
    }

    // ------------------------------------------------------------------
    // Box shapes and handle edits
    // ------------------------------------------------------------------

    /// Start dragging out a new box shape anchored at `p`.
    pub fn begin_shape(&mut self, kind: BoxShape, p: Point) -> DesignerResult<ItemId> {
        let (name, shape) = match kind {
            BoxShape::Rectangle => ("Draw Rectangle", Shape::Rectangle(DesignRectangle::new(self.snap(p)))),
            BoxShape::Ellipse => ("Draw Ellipse", Shape::Ellipse(DesignEllipse::new(self.snap(p)))),
            BoxShape::Circle => ("Draw Circle", Shape::Circle(DesignCircle::new(self.snap(p)))),
        };
        self.start_gesture(name)?;
        let item = self.new_item(shape);
        let id = item.id;
        self.push_command(DesignerCommand::AddItem(AddItem::new(item, None)))?;
        self.mode = InteractionMode::EditingShape { item: id };
        Ok(id)
    }

    /// Start a handle drag on an existing shape.
    pub fn begin_edit(&mut self, item: ItemId) -> DesignerResult<()> {
        let shape = self
            .document
            .get(item)
            .map(|i| i.shape_type())
            .ok_or(schemkit_core::StructuralError::not_found(item))?;
        if matches!(
            shape,
            crate::model::ShapeType::Text | crate::model::ShapeType::Image | crate::model::ShapeType::Group
        ) {
            return Err(DesignerError::UnsupportedEdit(item));
        }
        self.start_gesture("Edit")?;
        self.mode = InteractionMode::EditingShape { item };
        Ok(())
    }

    pub fn drag_shape(&mut self, p: Point) -> DesignerResult<()> {
        let InteractionMode::EditingShape { item } = self.mode else {
            return Ok(());
        };
        let p = self.snap(p);
        self.push_command(DesignerCommand::Edit(EditShape::new(item, p)))
    }

    /// Commit the drag. A new shape left without area is discarded.
    pub fn finish_shape(&mut self) -> DesignerResult<Option<ItemId>> {
        let InteractionMode::EditingShape { item } = self.mode else {
            return Ok(None);
        };
        let bounds = self.document.get(item).map(|i| i.shape.bounds());
        if bounds.is_none_or(|b| b.width <= EPSILON || b.height <= EPSILON) {
            self.abandon_gesture()?;
            return Ok(None);
        }
        self.mode = InteractionMode::Idle;
        self.history.end_macro()?;
        Ok(Some(item))
    }
}
