use lyon::path::Path;
use schemkit_core::ItemId;
use serde::{Deserialize, Serialize};

use super::{DesignerShape, Outline, Point, Property, Rect};

/// Library metadata attached to a group that represents a placed symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub name: String,
    /// Connection points in the group's local coordinates.
    pub pins: Vec<Point>,
    #[serde(default)]
    pub pins_visible: bool,
}

impl SymbolInfo {
    pub fn new(name: impl Into<String>, pins: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            pins,
            pins_visible: false,
        }
    }
}

/// Container of child items. Geometry comes from the children, so the
/// document computes bounds and outlines for groups itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DesignGroup {
    /// Rebuilt from the item tree on load.
    #[serde(skip)]
    pub children: Vec<ItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<SymbolInfo>,
}

impl DesignGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbol(info: SymbolInfo) -> Self {
        Self {
            children: Vec::new(),
            symbol: Some(info),
        }
    }

    pub fn is_symbol(&self) -> bool {
        self.symbol.is_some()
    }
}

impl DesignerShape for DesignGroup {
    fn render(&self) -> Path {
        Path::new()
    }

    fn bounds(&self) -> Rect {
        Rect::default()
    }

    fn outline(&self) -> Outline {
        Outline::Empty
    }

    fn properties(&self) -> Vec<Property> {
        let mut props = vec![Property::number("Children", self.children.len() as f64)];
        if let Some(symbol) = &self.symbol {
            props.push(Property::string("Symbol", symbol.name.clone()));
            props.push(Property::number("Pins", symbol.pins.len() as f64));
        }
        props
    }

    fn contains_point(&self, _p: Point, _tolerance: f64) -> bool {
        false
    }
}
