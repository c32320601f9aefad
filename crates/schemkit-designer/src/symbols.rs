//! Symbol prototypes. Instances are deep copies with fresh ids.

use std::collections::BTreeMap;

use schemkit_core::ItemId;

use crate::commands::AddItem;
use crate::document::{Document, DrawingItem, ItemSnapshot};
use crate::model::{
    Brush, Color, DesignGroup, DesignRectangle, DesignWire, Pen, Point, Rect, Shape, SymbolInfo,
    Transform,
};

/// Library key of the junction dot.
pub const DOT_SYMBOL: &str = "dot";

/// Radius of the standard junction dot.
pub const DOT_RADIUS: f64 = 5.0;

/// A solid dot centred on its origin.
pub fn dot_prototype(radius: f64, pen: Pen, brush: Brush) -> ItemSnapshot {
    ItemSnapshot::leaf(DrawingItem::junction_dot(ItemId(1), radius, pen, brush))
}

fn default_dot() -> ItemSnapshot {
    dot_prototype(DOT_RADIUS, Pen::default(), Brush::solid(Color::BLACK))
}

/// Assemble a symbol prototype from leaf shapes given in symbol
/// coordinates. Ids only need to be unique inside the prototype.
fn build_symbol(info: SymbolInfo, parts: Vec<Shape>) -> ItemSnapshot {
    let group_id = ItemId(1);
    let children: Vec<ItemSnapshot> = parts
        .into_iter()
        .enumerate()
        .map(|(i, shape)| {
            let mut item = DrawingItem::new(ItemId(i as u64 + 2), shape);
            item.parent = Some(group_id);
            ItemSnapshot {
                item,
                index: i,
                children: Vec::new(),
            }
        })
        .collect();
    let mut group = DesignGroup::symbol(info.clone());
    group.children = children.iter().map(|c| c.id()).collect();
    let mut item = DrawingItem::new(group_id, Shape::Group(group));
    item.name = info.name;
    ItemSnapshot {
        item,
        index: 0,
        children,
    }
}

fn lead(a: (f64, f64), b: (f64, f64)) -> Shape {
    Shape::Wire(DesignWire::from_points(vec![
        Point::new(a.0, a.1),
        Point::new(b.0, b.1),
    ]))
}

fn resistor() -> ItemSnapshot {
    build_symbol(
        SymbolInfo::new("resistor", vec![Point::new(-30.0, 0.0), Point::new(30.0, 0.0)]),
        vec![
            lead((-30.0, 0.0), (-15.0, 0.0)),
            Shape::Rectangle(DesignRectangle::from_rect(Rect::new(-15.0, -6.0, 30.0, 12.0))),
            lead((15.0, 0.0), (30.0, 0.0)),
        ],
    )
}

fn ground() -> ItemSnapshot {
    build_symbol(
        SymbolInfo::new("ground", vec![Point::origin()]),
        vec![
            lead((0.0, 0.0), (0.0, 10.0)),
            lead((-10.0, 10.0), (10.0, 10.0)),
            lead((-6.0, 14.0), (6.0, 14.0)),
            lead((-2.0, 18.0), (2.0, 18.0)),
        ],
    )
}

/// Named prototypes available for placement.
#[derive(Debug, Clone, Default)]
pub struct SymbolLibrary {
    prototypes: BTreeMap<String, ItemSnapshot>,
}

impl SymbolLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The junction dot plus a few basic symbols.
    pub fn with_builtins() -> Self {
        let mut library = Self::new();
        library.insert(DOT_SYMBOL, default_dot());
        library.register(resistor());
        library.register(ground());
        library
    }

    pub fn insert(&mut self, name: impl Into<String>, prototype: ItemSnapshot) {
        self.prototypes.insert(name.into(), prototype);
    }

    /// Add a prototype under its symbol name (or item name).
    pub fn register(&mut self, prototype: ItemSnapshot) {
        let name = prototype
            .item
            .shape
            .as_group()
            .and_then(|g| g.symbol.as_ref())
            .map(|s| s.name.clone())
            .unwrap_or_else(|| prototype.item.name.clone());
        self.insert(name, prototype);
    }

    pub fn get(&self, name: &str) -> Option<&ItemSnapshot> {
        self.prototypes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.prototypes.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    /// Add command for a new instance of `name` at `pos`.
    pub fn instantiate(
        &self,
        doc: &mut Document,
        name: &str,
        pos: Point,
        transform: Option<Transform>,
        reflections: u8,
        pins_visible: bool,
    ) -> Option<AddItem> {
        let prototype = self.get(name)?;
        Some(AddItem::symbol(
            doc,
            prototype,
            pos,
            transform,
            reflections,
            pins_visible,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::DesignerCommand;
    use crate::model::geometry::rotation_about;

    #[test]
    fn test_builtins() {
        let library = SymbolLibrary::with_builtins();
        assert_eq!(library.names().collect::<Vec<_>>(), vec!["dot", "ground", "resistor"]);
        assert!(library.get(DOT_SYMBOL).unwrap().item.is_junction_dot());
    }

    #[test]
    fn test_instances_get_fresh_ids() {
        let library = SymbolLibrary::with_builtins();
        let mut doc = Document::new();
        let first = library
            .instantiate(&mut doc, "resistor", Point::new(100.0, 0.0), None, 0, true)
            .unwrap();
        let second = library
            .instantiate(&mut doc, "resistor", Point::new(200.0, 0.0), None, 0, false)
            .unwrap();
        let (a, b) = (first.id(), second.id());
        DesignerCommand::AddItem(first).apply(&mut doc).unwrap();
        DesignerCommand::AddItem(second).apply(&mut doc).unwrap();

        assert_ne!(a, b);
        assert_eq!(doc.children(a).len(), 3);
        assert_eq!(doc.len(), 8);
        assert!(doc.get(a).unwrap().is_symbol());
        let pins = doc.pins();
        assert!(pins.contains(&Point::new(70.0, 0.0)));
        assert!(pins.contains(&Point::new(230.0, 0.0)));
    }

    #[test]
    fn test_instance_with_transform_and_reflection() {
        let library = SymbolLibrary::with_builtins();
        let mut doc = Document::new();
        let rotate = rotation_about(Point::origin(), 90.0);
        let add = library
            .instantiate(&mut doc, "resistor", Point::new(0.0, 0.0), Some(rotate), 3, false)
            .unwrap();
        assert_eq!(add.snapshot.item.reflections, 1);
        let id = add.id();
        DesignerCommand::AddItem(add).apply(&mut doc).unwrap();
        let pins = doc.pins();
        assert!(pins.iter().any(|p| p.approx_eq(&Point::new(0.0, 30.0), 1e-9)));
        let info = doc.get(id).unwrap().shape.as_group().unwrap().symbol.clone().unwrap();
        assert!(!info.pins_visible);
    }
}
