use lyon::path::Path;
use serde::{Deserialize, Serialize};

use super::{polygon_path, DesignerShape, Font, Outline, Point, Property, Rect};

/// Average advance of a glyph relative to the point size.
const GLYPH_WIDTH_FACTOR: f64 = 0.6;
const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// Text label anchored at its top-left corner, the local origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignText {
    pub text: String,
    pub font: Font,
}

impl DesignText {
    pub fn new(text: impl Into<String>, font: Font) -> Self {
        Self {
            text: text.into(),
            font,
        }
    }

    /// Layout box estimated from character counts; no glyph metrics are
    /// available without a renderer.
    fn layout_rect(&self) -> Rect {
        let lines: Vec<&str> = self.text.split('\n').collect();
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        Rect::new(
            0.0,
            0.0,
            longest as f64 * self.font.point_size * GLYPH_WIDTH_FACTOR,
            lines.len() as f64 * self.font.point_size * LINE_HEIGHT_FACTOR,
        )
    }
}

impl DesignerShape for DesignText {
    fn render(&self) -> Path {
        polygon_path(&self.layout_rect().corners())
    }

    fn bounds(&self) -> Rect {
        self.layout_rect()
    }

    fn outline(&self) -> Outline {
        Outline::Polyline {
            points: self.layout_rect().corners().to_vec(),
            closed: true,
        }
    }

    fn properties(&self) -> Vec<Property> {
        vec![
            Property::string("Text", self.text.clone()),
            Property::string("Font", self.font.family.clone()),
            Property::number("Size", self.font.point_size),
            Property::bool("Bold", self.font.bold),
            Property::bool("Italic", self.font.italic),
        ]
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        self.layout_rect().contains(p, tolerance)
    }
}
