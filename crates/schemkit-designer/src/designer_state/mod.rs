//! Designer state manager for UI integration.
//!
//! Owns one open document, its undo history and the current interaction
//! mode, and turns gestures into commands. Multi-step gestures run inside a
//! macro so they undo as one step, and cancelling one aborts that macro.
//!
//! This module is split into submodules:
//! - `drawing`: Net, wire, arc and box gestures
//! - `shapes`: Adding, deleting and copying items
//! - `transforms`: Move, rotate, mirror, group and ungroup
//! - `properties`: Pen, brush, font and height changes
//! - `file_io`: Save/load operations

mod drawing;
mod file_io;
mod properties;
mod shapes;
mod transforms;

pub use drawing::BoxShape;

use schemkit_core::ItemId;
use schemkit_settings::EditorConfig;

use crate::commands::DesignerCommand;
use crate::document::Document;
use crate::error::DesignerResult;
use crate::history::CommandHistory;
use crate::model::{Brush, Color, DesignNet, Pen, Point, RightAngleMode, Segment};
use crate::nets::NetResolver;
use crate::snap::{GridSnapper, Snapper};
use crate::symbols::SymbolLibrary;

/// What the pointer is currently doing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    /// A net is being dragged out from `start`; `item` exists once the
    /// drag has left the start point.
    DrawingNet { start: Point, item: Option<ItemId> },
    DrawingWire { item: ItemId },
    DrawingArc { item: ItemId },
    /// Dragging a handle of a new or existing box-like shape.
    EditingShape { item: ItemId },
    /// Dragging `items`; `neighbours` are the nets they touched when the
    /// drag began, `attached` the net ends resting on their pins.
    Moving {
        items: Vec<ItemId>,
        start: Point,
        last: Point,
        neighbours: Vec<ItemId>,
        attached: Vec<PinAttachment>,
    },
}

/// A net with one or both ends on pins of symbols being moved.
#[derive(Debug, Clone, PartialEq)]
pub struct PinAttachment {
    pub net: ItemId,
    /// Scene line of the net when the drag began.
    pub line: Segment,
    pub start_moves: bool,
    pub end_moves: bool,
}

impl PinAttachment {
    /// The net stretched to follow a drag by `delta`, as a scene-space
    /// primary line plus the right-angle leg a bent connection needs.
    pub fn stretched(&self, delta: Point, mode: RightAngleMode) -> (Segment, Option<Segment>) {
        let shift = |p: Point, moves: bool| if moves { p + delta } else { p };
        let start = shift(self.line.start, self.start_moves);
        let end = shift(self.line.end, self.end_moves);
        if self.start_moves == self.end_moves {
            return (Segment::new(start, end), None);
        }
        let (fixed, free) = if self.end_moves { (start, end) } else { (end, start) };
        let mut net = DesignNet::new(fixed, fixed).with_mode(mode);
        net.set_end(free);
        let line = if self.end_moves {
            net.line
        } else {
            Segment::new(net.line.end, net.line.start)
        };
        (line, net.companion)
    }
}

impl InteractionMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionMode::Idle)
    }
}

/// Designer state for UI integration
#[derive(Debug, Clone)]
pub struct DesignerState {
    pub document: Document,
    pub history: CommandHistory,
    pub mode: InteractionMode,
    pub config: EditorConfig,
    pub resolver: NetResolver,
    pub snapper: GridSnapper,
    pub symbols: SymbolLibrary,
    /// Bend used by the next net drag.
    pub right_angle_mode: RightAngleMode,
    pub current_file_path: Option<std::path::PathBuf>,
    pub design_name: String,
}

impl Default for DesignerState {
    fn default() -> Self {
        Self::new()
    }
}

impl DesignerState {
    /// Creates a new designer state with default settings.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::new())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            document: Document::new(),
            history: CommandHistory::new(config.history.undo_limit),
            mode: InteractionMode::Idle,
            resolver: NetResolver::from_config(&config),
            snapper: GridSnapper::from_settings(&config.grid),
            symbols: SymbolLibrary::with_builtins(),
            right_angle_mode: RightAngleMode::default(),
            current_file_path: None,
            design_name: "Untitled".to_string(),
            config,
        }
    }

    /// Pushes a command to the history, applying it.
    pub fn push_command(&mut self, cmd: DesignerCommand) -> DesignerResult<()> {
        self.history.push(cmd, &mut self.document)
    }

    /// Undo last operation. Not available while a gesture is in progress.
    pub fn undo(&mut self) -> DesignerResult<bool> {
        self.history.undo(&mut self.document)
    }

    /// Redo last undo
    pub fn redo(&mut self) -> DesignerResult<bool> {
        self.history.redo(&mut self.document)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Abandon the gesture in progress, restoring the document and history
    /// to where they were when it began.
    pub fn cancel(&mut self) -> DesignerResult<()> {
        if !self.mode.is_idle() {
            tracing::debug!("Cancelling {:?}", self.mode);
        }
        self.mode = InteractionMode::Idle;
        while self.history.in_macro() {
            self.history.abort_macro(&mut self.document)?;
        }
        Ok(())
    }

    /// Clear the undo history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn toggle_right_angle_mode(&mut self) {
        self.right_angle_mode = self.right_angle_mode.toggled();
    }

    pub fn snap(&self, p: Point) -> Point {
        self.snapper.snap(p)
    }

    /// Snap to a nearby pin, else to the grid.
    pub fn snap_to_pins(&self, p: Point) -> Point {
        self.snapper.snap_with_pins(p, &self.document.pins())
    }

    pub(crate) fn default_pen(&self) -> Pen {
        let color = self
            .config
            .style
            .pen_color
            .parse()
            .unwrap_or(Color::BLACK);
        Pen::new(color, self.config.style.pen_width)
    }

    pub(crate) fn default_brush(&self) -> Brush {
        Brush {
            color: self
                .config
                .style
                .brush_color
                .parse()
                .unwrap_or(Color::BLACK),
            ..Brush::default()
        }
    }

    /// Resolve each net in `nets` that still exists. Runs inside the
    /// caller's macro.
    pub(crate) fn resolve_nets(&mut self, nets: &[ItemId]) -> DesignerResult<Vec<ItemId>> {
        let mut out = Vec::new();
        for net in nets {
            if self.document.get(*net).is_some_and(|i| i.is_net()) {
                out.extend(
                    self.resolver
                        .resolve(&mut self.document, &mut self.history, *net)?,
                );
            }
        }
        Ok(out)
    }

    /// Selected top-level items in paint order.
    pub fn selected_roots(&self) -> Vec<ItemId> {
        self.document
            .selected_items()
            .into_iter()
            .filter(|id| self.document.parent(*id).is_none())
            .collect()
    }

    /// Runs `f` inside a macro named `name`. On error the macro is
    /// aborted and the document restored.
    pub(crate) fn in_macro<T, F>(&mut self, name: &str, f: F) -> DesignerResult<T>
    where
        F: FnOnce(&mut Self) -> DesignerResult<T>,
    {
        self.history.begin_macro(name);
        match f(self) {
            Ok(value) => {
                self.history.end_macro()?;
                Ok(value)
            }
            Err(e) => {
                tracing::warn!("{} failed: {}", name, e);
                self.history.abort_macro(&mut self.document)?;
                Err(e)
            }
        }
    }
}
