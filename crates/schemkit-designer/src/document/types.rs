//! Document type definitions: DrawingItem, ItemSnapshot, DocumentEvent.

use schemkit_core::ItemId;

use crate::model::{Brush, DesignCircle, Pen, Placement, Point, Shape, ShapeType, Transform};

/// One primitive in the document tree: common state plus its shape payload.
#[derive(Debug, Clone)]
pub struct DrawingItem {
    pub id: ItemId,
    pub parent: Option<ItemId>,
    pub name: String,
    pub shape: Shape,
    pub pen: Pen,
    pub brush: Brush,
    /// Translation part of the local-to-parent mapping.
    pub pos: Point,
    /// Linear part of the local-to-parent mapping; no translation.
    pub transform: Transform,
    /// Number of mirror operations applied, modulo 2.
    pub reflections: u8,
    pub z: f64,
    pub selected: bool,
}

impl DrawingItem {
    pub fn new(id: ItemId, shape: Shape) -> Self {
        Self {
            id,
            parent: None,
            name: shape.shape_type().name().to_string(),
            shape,
            pen: Pen::default(),
            brush: Brush::default(),
            pos: Point::origin(),
            transform: Transform::identity(),
            reflections: 0,
            z: 0.0,
            selected: false,
        }
    }

    pub fn with_pen(mut self, pen: Pen) -> Self {
        self.pen = pen;
        self
    }

    pub fn with_brush(mut self, brush: Brush) -> Self {
        self.brush = brush;
        self
    }

    pub fn at(mut self, pos: Point) -> Self {
        self.pos = pos;
        self
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape.shape_type()
    }

    pub fn placement(&self) -> Placement {
        Placement::new(self.pos, self.transform)
    }

    pub fn set_placement(&mut self, placement: Placement) {
        self.pos = placement.pos;
        self.transform = placement.transform;
    }

    pub fn local_to_parent(&self) -> Transform {
        self.placement().matrix()
    }

    pub fn is_net(&self) -> bool {
        matches!(self.shape, Shape::Net(_))
    }

    pub fn is_group(&self) -> bool {
        self.shape.is_group()
    }

    pub fn is_symbol(&self) -> bool {
        self.shape.as_group().is_some_and(|g| g.is_symbol())
    }

    /// A filled circle centred on the local origin marks a net junction.
    pub fn is_junction_dot(&self) -> bool {
        match &self.shape {
            Shape::Circle(c) => {
                self.brush.is_filled() && c.center().approx_eq(&Point::origin(), 1e-9)
            }
            _ => false,
        }
    }

    /// Junction dot prototype of the given radius.
    pub fn junction_dot(id: ItemId, radius: f64, pen: Pen, brush: Brush) -> Self {
        let mut item = Self::new(
            id,
            Shape::Circle(DesignCircle::from_center(Point::origin(), radius)),
        )
        .with_pen(pen)
        .with_brush(brush);
        item.name = "Junction".to_string();
        item
    }
}

/// Deep copy of an item and its descendants, with the position it held
/// in its parent's child list.
#[derive(Debug, Clone)]
pub struct ItemSnapshot {
    pub item: DrawingItem,
    pub index: usize,
    pub children: Vec<ItemSnapshot>,
}

impl ItemSnapshot {
    pub fn leaf(item: DrawingItem) -> Self {
        Self {
            item,
            index: 0,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> ItemId {
        self.item.id
    }

    pub fn parent(&self) -> Option<ItemId> {
        self.item.parent
    }

    /// Every id in the subtree, root first.
    pub fn ids(&self) -> Vec<ItemId> {
        let mut out = vec![self.item.id];
        for child in &self.children {
            out.extend(child.ids());
        }
        out
    }

    /// The same subtree with every id replaced by one drawn from `next_id`.
    /// The root keeps no parent; group child lists follow the new ids.
    pub fn with_fresh_ids(&self, next_id: &mut impl FnMut() -> ItemId) -> ItemSnapshot {
        let mut copy = self.remap(next_id, None);
        copy.item.parent = None;
        copy
    }

    fn remap(&self, next_id: &mut impl FnMut() -> ItemId, parent: Option<ItemId>) -> ItemSnapshot {
        let mut item = self.item.clone();
        item.id = next_id();
        item.parent = parent;
        item.selected = false;
        let children: Vec<ItemSnapshot> = self
            .children
            .iter()
            .map(|c| c.remap(next_id, Some(item.id)))
            .collect();
        if let Some(group) = item.shape.as_group_mut() {
            group.children = children.iter().map(|c| c.item.id).collect();
        }
        ItemSnapshot {
            item,
            index: self.index,
            children,
        }
    }
}

/// Change notifications published by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    ItemAdded(ItemId),
    ItemRemoved(ItemId),
    ItemChanged(ItemId),
    SelectionChanged,
    Cleared,
}
