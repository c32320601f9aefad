//! Serialization and deserialization for design files.
//!
//! Documents are stored as JSON: a header with metadata plus the item tree.
//! Item ids are kept, so a loaded document hands out fresh ids above the
//! largest one in the file. Transient edit stacks are not written.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use schemkit_core::ItemId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::document::{Document, DrawingItem, ItemSnapshot};
use crate::error::{DesignerError, DesignerResult};
use crate::model::geometry::{transform_from_array, transform_to_array};
use crate::model::{Brush, Pen, Point, Shape};

/// Design file format version
const FILE_FORMAT_VERSION: &str = "1.0";

/// Complete design file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignFile {
    pub version: String,
    pub metadata: DesignMetadata,
    pub items: Vec<ItemData>,
}

/// Design metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignMetadata {
    pub id: Uuid,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
}

/// One serialized item with its subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemData {
    pub id: ItemId,
    pub name: String,
    pub shape: Shape,
    #[serde(default)]
    pub pen: Pen,
    #[serde(default)]
    pub brush: Brush,
    pub pos: Point,
    /// Linear part as `[m11, m12, m21, m22, m31, m32]`.
    pub transform: [f64; 6],
    #[serde(default)]
    pub reflections: u8,
    #[serde(default)]
    pub z: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ItemData>,
}

impl ItemData {
    fn from_snapshot(snapshot: &ItemSnapshot) -> Self {
        let item = &snapshot.item;
        Self {
            id: item.id,
            name: item.name.clone(),
            shape: item.shape.clone(),
            pen: item.pen,
            brush: item.brush,
            pos: item.pos,
            transform: transform_to_array(&item.transform),
            reflections: item.reflections,
            z: item.z,
            children: snapshot.children.iter().map(ItemData::from_snapshot).collect(),
        }
    }

    fn to_snapshot(&self, parent: Option<ItemId>, index: usize) -> ItemSnapshot {
        let mut item = DrawingItem::new(self.id, self.shape.clone());
        item.parent = parent;
        item.name = self.name.clone();
        item.pen = self.pen;
        item.brush = self.brush;
        item.pos = self.pos;
        item.transform = transform_from_array(self.transform);
        item.reflections = self.reflections % 2;
        item.z = self.z;
        let children = self
            .children
            .iter()
            .enumerate()
            .map(|(i, c)| c.to_snapshot(Some(self.id), i))
            .collect();
        ItemSnapshot {
            item,
            index,
            children,
        }
    }
}

impl DesignFile {
    /// Create a new design file with default values
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: DesignMetadata {
                id: Uuid::new_v4(),
                name: name.into(),
                created: now,
                modified: now,
                author: String::new(),
                description: String::new(),
            },
            items: Vec::new(),
        }
    }

    /// Capture every item of `doc`, roots in insertion order.
    pub fn from_document(doc: &Document, name: impl Into<String>) -> Self {
        let mut design = Self::new(name);
        design.items = doc
            .store()
            .root()
            .iter()
            .filter_map(|id| doc.snapshot(*id))
            .map(|s| ItemData::from_snapshot(&s))
            .collect();
        design
    }

    /// Rebuild a document. Fails on duplicate ids.
    pub fn to_document(&self) -> DesignerResult<Document> {
        if self.version != FILE_FORMAT_VERSION {
            tracing::warn!(
                "Design file version {} differs from {}",
                self.version,
                FILE_FORMAT_VERSION
            );
        }
        let mut doc = Document::new();
        for (i, data) in self.items.iter().enumerate() {
            doc.insert_subtree(&data.to_snapshot(None, i), None, None)?;
        }
        Ok(doc)
    }

    /// Number of items in the file, at any depth.
    pub fn item_count(&self) -> usize {
        fn count(items: &[ItemData]) -> usize {
            items.iter().map(|i| 1 + count(&i.children)).sum()
        }
        count(&self.items)
    }

    /// Save design to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize design")?;

        std::fs::write(path.as_ref(), json).context("Failed to write design file")?;

        tracing::info!("Saved design to {}", path.as_ref().display());
        Ok(())
    }

    /// Load design from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read design file")?;

        let design: DesignFile =
            serde_json::from_str(&content).context("Failed to parse design file")?;

        tracing::info!(
            "Loaded design '{}' ({} items) from {}",
            design.metadata.name,
            design.item_count(),
            path.as_ref().display()
        );
        Ok(design)
    }
}

/// Encode a whole document.
pub fn serialize(doc: &Document) -> DesignerResult<Vec<u8>> {
    let design = DesignFile::from_document(doc, "Untitled");
    serde_json::to_vec_pretty(&design).map_err(|e| DesignerError::Persistence(e.to_string()))
}

/// Decode a document produced by [`serialize`].
pub fn deserialize(bytes: &[u8]) -> DesignerResult<Document> {
    let design: DesignFile =
        serde_json::from_slice(bytes).map_err(|e| DesignerError::Persistence(e.to_string()))?;
    design.to_document()
}
