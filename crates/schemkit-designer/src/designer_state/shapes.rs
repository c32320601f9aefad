//! Adding, deleting and copying items.

use std::collections::BTreeSet;
use std::path::PathBuf;

use schemkit_core::ItemId;

use super::DesignerState;
use crate::commands::{AddItem, CopyItems, DeleteItems, DesignerCommand};
use crate::document::DrawingItem;
use crate::error::{DesignerError, DesignerResult};
use crate::model::geometry::map_point;
use crate::model::{DesignImage, DesignText, Font, Point, Rect, Shape, Transform};

impl DesignerState {
    /// Add a finished shape at the root, placed at `pos`.
    pub fn add_shape(&mut self, shape: Shape, pos: Point) -> DesignerResult<ItemId> {
        let id = self.document.generate_id();
        let item = DrawingItem::new(id, shape)
            .with_pen(self.default_pen())
            .with_brush(self.default_brush())
            .at(pos);
        self.push_command(DesignerCommand::AddItem(AddItem::new(item, None)))?;
        Ok(id)
    }

    pub fn add_text(&mut self, text: &str, pos: Point) -> DesignerResult<ItemId> {
        let shape = Shape::Text(DesignText::new(text, Font::default()));
        self.add_shape(shape, self.snap(pos))
    }

    /// Add a picture read from `path`, sized to its pixel dimensions.
    pub fn add_image(&mut self, path: impl Into<PathBuf>, pos: Point) -> DesignerResult<ItemId> {
        let image = DesignImage::from_file(path)?;
        self.add_shape(Shape::Image(image), self.snap(pos))
    }

    /// Place an instance of a library symbol and connect it to any nets
    /// already touching its pins. Returns `None` for an unknown symbol.
    pub fn place_symbol(&mut self, name: &str, pos: Point) -> DesignerResult<Option<ItemId>> {
        self.place_symbol_with(name, pos, None, 0)
    }

    pub fn place_symbol_with(
        &mut self,
        name: &str,
        pos: Point,
        transform: Option<Transform>,
        reflections: u8,
    ) -> DesignerResult<Option<ItemId>> {
        let pos = self.snap(pos);
        let Some(add) = self
            .symbols
            .instantiate(&mut self.document, name, pos, transform, reflections, true)
        else {
            tracing::warn!("Unknown symbol '{}'", name);
            return Ok(None);
        };
        let id = add.id();
        self.in_macro("Add Symbol", |state| {
            state.push_command(DesignerCommand::AddItem(add))?;
            let mut nets = state.nets_touching(&[id]);
            for net in state.nets_near_pins(id) {
                if !nets.contains(&net) {
                    nets.push(net);
                }
            }
            state.resolve_nets(&nets)?;
            Ok(Some(id))
        })
    }

    /// Click-select using the configured hit tolerance.
    pub fn select_at(&mut self, p: Point, multi: bool) -> Option<ItemId> {
        let tolerance = self.config.selection.hit_tolerance;
        self.document.select_at(p, tolerance, multi)
    }

    pub fn select_in_rect(&mut self, rect: &Rect, multi: bool) {
        self.document.select_in_rect(rect, multi);
    }

    /// Delete the selected items. Nets the deletion leaves behind are
    /// re-resolved and junction dots that lost their branches go too.
    pub fn delete_selection(&mut self) -> DesignerResult<usize> {
        let ids = self.selected_roots();
        if ids.is_empty() {
            return Ok(0);
        }
        let neighbours: Vec<ItemId> = self
            .nets_touching(&ids)
            .into_iter()
            .filter(|n| !ids.contains(n))
            .collect();
        let count = ids.len();
        self.in_macro("Delete", |state| {
            state.push_command(DesignerCommand::DeleteItems(DeleteItems::new(ids)))?;
            state.resolve_nets(&neighbours)?;
            state
                .resolver
                .prune_dots(&mut state.document, &mut state.history)?;
            Ok(())
        })?;
        tracing::debug!("Deleted {} items", count);
        Ok(count)
    }

    /// Paste copies of the selection so that `from` lands on `to`. The
    /// copies become the selection. Copied nets connect to whatever they
    /// land on.
    pub fn copy_selection(&mut self, from: Point, to: Point) -> DesignerResult<Vec<ItemId>> {
        let ids = self.selected_roots();
        if ids.is_empty() {
            return Err(DesignerError::EmptySelection);
        }
        let to = self.snap(to);
        let Some(copy) = CopyItems::prepare(&mut self.document, &ids, from, to) else {
            return Ok(Vec::new());
        };
        let copies = copy.ids();
        self.in_macro("Copy", |state| {
            state.push_command(DesignerCommand::CopyItems(copy))?;
            let nets: Vec<ItemId> = copies
                .iter()
                .copied()
                .filter(|id| state.document.get(*id).is_some_and(|i| i.is_net()))
                .collect();
            state.resolve_nets(&nets)?;
            Ok(())
        })?;
        Ok(copies)
    }

    /// Top-level nets with an end within pin snapping reach of a pin of
    /// `symbol`.
    pub(crate) fn nets_near_pins(&self, symbol: ItemId) -> Vec<ItemId> {
        let Some(t) = self.document.scene_transform(symbol) else {
            return Vec::new();
        };
        let pins: Vec<Point> = self
            .document
            .get(symbol)
            .and_then(|i| i.shape.as_group())
            .and_then(|g| g.symbol.as_ref())
            .map(|info| info.pins.iter().map(|p| map_point(&t, *p)).collect())
            .unwrap_or_default();
        let reach = self.resolver.pin_snap_threshold;
        self.document
            .nets()
            .into_iter()
            .filter(|net| {
                self.document.scene_line(*net).is_some_and(|line| {
                    pins.iter().any(|pin| {
                        pin.distance_to(&line.start) < reach || pin.distance_to(&line.end) < reach
                    })
                })
            })
            .collect()
    }

    /// Top-level nets whose geometry meets any of `ids` or their
    /// descendants, in id order.
    pub(crate) fn nets_touching(&self, ids: &[ItemId]) -> Vec<ItemId> {
        let mut nets = BTreeSet::new();
        for id in ids {
            if self.document.get(*id).is_some_and(|i| i.is_net()) {
                nets.insert(*id);
            }
            for sub in self.document.store().subtree(*id) {
                for hit in self.document.query_collisions(sub) {
                    let is_root_net = self
                        .document
                        .get(hit)
                        .is_some_and(|i| i.is_net() && i.parent.is_none());
                    if is_root_net {
                        nets.insert(hit);
                    }
                }
            }
        }
        nets.into_iter().collect()
    }
}
