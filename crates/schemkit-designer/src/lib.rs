//! # SchemKit Designer
//!
//! This crate provides the editable-document engine of the SchemKit
//! schematic editor: a tree of drawing items, reversible commands with an
//! undo history, and the resolver that keeps net connectivity consistent
//! as the drawing changes.
//!
//! ## Core Components
//!
//! ### Design Elements
//! - **Shapes**: Nets, wires, arcs, rectangles, ellipses, circles, text, images
//! - **Groups**: Nested items; symbols are groups with pins
//! - **Document**: Item tree with selection, hit testing and collision queries
//!
//! ### Editing
//! - **Commands**: Every edit records what it overwrites and reverts exactly
//! - **History/Undo-Redo**: Capacity bound, clean watermark, nestable macros
//! - **Nets**: Merge collinear nets, split at junctions, junction dots
//! - **Snapping**: Grid and pin snapping for gesture input
//!
//! ### Persistence
//! - **Serialization**: JSON design files with metadata
//!
//! ## Architecture
//!
//! ```text
//! DesignerState (gestures, interaction mode)
//!   ├── CommandHistory (undo/redo, macros)
//!   │     └── DesignerCommand (apply/revert)
//!   ├── NetResolver (merge/split, dots)
//!   └── Document (item tree, selection, events)
//!         └── DrawingItem (placement, style, Shape)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use schemkit_designer::{DesignerState, Point};
//!
//! let mut state = DesignerState::new();
//! state.begin_net(Point::new(0.0, 0.0)).unwrap();
//! let nets = state.finish_net(Point::new(100.0, 0.0)).unwrap();
//! assert_eq!(nets.len(), 1);
//!
//! state.undo().unwrap();
//! assert!(state.document.is_empty());
//! ```

pub mod commands;
pub mod document;
pub mod error;
pub mod history;
pub mod model;
pub mod nets;
pub mod selection_manager;
pub mod serialization;
pub mod snap;
pub mod symbols;

// Integration modules
pub mod designer_state;

pub use commands::{
    AddItem, ChangeStyle, CompositeCommand, CopyItems, DeleteItems, DesignerCommand, EditNet,
    EditShape, GroupItems, MirrorItems, MoveItems, RotateItems, StyleValue, UngroupItems,
};
pub use document::{Document, DocumentEvent, DrawingItem, ItemSnapshot};
pub use error::{DesignerError, DesignerResult};
pub use history::CommandHistory;
pub use model::{
    Brush, Color, DesignArc, DesignCircle, DesignEllipse, DesignGroup, DesignImage, DesignNet,
    DesignRectangle, DesignText, DesignWire, DesignerShape, Font, Pen, Placement, Point, Rect,
    RightAngleMode, Segment, Shape, ShapeType, SymbolInfo, Transform,
};
pub use nets::NetResolver;
pub use serialization::{deserialize, serialize, DesignFile, DesignMetadata, ItemData};
pub use snap::{GridSnapper, NoSnap, Snapper};
pub use symbols::SymbolLibrary;

// State and integration
pub use designer_state::{BoxShape, DesignerState, InteractionMode, PinAttachment};
pub use schemkit_core::ItemId;
