use lyon::path::Path;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{polygon_path, DesignerShape, Outline, Point, Property, Rect};
use crate::error::{DesignerError, DesignerResult};

/// Raster image placed with its top-left corner at the local origin.
/// Only the source path and pixel size are kept; pixels are not loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignImage {
    pub source: PathBuf,
    pub width: f64,
    pub height: f64,
}

impl DesignImage {
    pub fn new(source: PathBuf, width: f64, height: f64) -> Self {
        Self {
            source,
            width,
            height,
        }
    }

    /// Read the pixel dimensions of an image file.
    pub fn from_file(path: impl Into<PathBuf>) -> DesignerResult<Self> {
        let source = path.into();
        let (w, h) = ::image::image_dimensions(&source).map_err(|e| {
            DesignerError::Persistence(format!("cannot read image {}: {e}", source.display()))
        })?;
        Ok(Self::new(source, w as f64, h as f64))
    }

    fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl DesignerShape for DesignImage {
    fn render(&self) -> Path {
        polygon_path(&self.rect().corners())
    }

    fn bounds(&self) -> Rect {
        self.rect()
    }

    fn outline(&self) -> Outline {
        Outline::Polyline {
            points: self.rect().corners().to_vec(),
            closed: true,
        }
    }

    fn properties(&self) -> Vec<Property> {
        vec![
            Property::string("Source", self.source.display().to_string()),
            Property::number("Width", self.width),
            Property::number("Height", self.height),
        ]
    }

    fn contains_point(&self, p: Point, tolerance: f64) -> bool {
        self.rect().contains(p, tolerance)
    }
}
