//! Move, rotate, mirror, group and ungroup of the selection.

use schemkit_core::ItemId;

use super::{DesignerState, InteractionMode, PinAttachment};
use crate::commands::{
    AddItem, DeleteItems, DesignerCommand, EditNet, GroupItems, MirrorItems, MoveItems,
    RotateItems, UngroupItems,
};
use crate::error::{DesignerError, DesignerResult};
use crate::model::geometry::{map_point, EPSILON};
use crate::model::{DesignNet, Point, Shape, Transform};

impl DesignerState {
    fn selection_or_err(&self) -> DesignerResult<Vec<ItemId>> {
        let ids = self.selected_roots();
        if ids.is_empty() {
            return Err(DesignerError::EmptySelection);
        }
        Ok(ids)
    }

    /// Re-resolve everything a geometry change of `moved` may have
    /// connected or disconnected. `former` are the nets that touched
    /// `moved` before the change.
    fn reconnect(&mut self, moved: &[ItemId], former: &[ItemId]) -> DesignerResult<()> {
        let mut nets = self.nets_touching(moved);
        for id in moved {
            if self.document.get(*id).is_some_and(|i| i.is_symbol()) {
                nets.extend(self.nets_near_pins(*id));
            }
        }
        nets.extend_from_slice(former);
        let mut seen = Vec::with_capacity(nets.len());
        nets.retain(|n| {
            let fresh = !seen.contains(n);
            seen.push(*n);
            fresh
        });
        self.resolve_nets(&nets)?;
        self.resolver
            .prune_dots(&mut self.document, &mut self.history)?;
        Ok(())
    }

    fn former_neighbours(&self, ids: &[ItemId]) -> Vec<ItemId> {
        self.nets_touching(ids)
            .into_iter()
            .filter(|n| !ids.contains(n))
            .collect()
    }

    // ------------------------------------------------------------------
    // Move
    // ------------------------------------------------------------------

    /// Start dragging the selection from `p`.
    pub fn begin_move(&mut self, p: Point) -> DesignerResult<()> {
        let items = self.selection_or_err()?;
        self.cancel()?;
        self.history.begin_macro("Move");
        let start = self.snap(p);
        let neighbours = self.former_neighbours(&items);
        let attached = self.pin_attachments(&items);
        self.mode = InteractionMode::Moving {
            items,
            start,
            last: start,
            neighbours,
            attached,
        };
        Ok(())
    }

    /// Move the dragged items so that the grab point follows `p`. Nets
    /// ending on their pins stretch along.
    pub fn drag_move(&mut self, p: Point) -> DesignerResult<()> {
        let InteractionMode::Moving {
            items,
            start,
            last,
            attached,
            ..
        } = &self.mode
        else {
            return Ok(());
        };
        let p = self.snap(p);
        let Some(cmd) = MoveItems::new(&self.document, items.clone(), *last, p) else {
            return Ok(());
        };
        let (delta, attached) = (p - *start, attached.clone());
        self.push_command(DesignerCommand::MoveItems(cmd))?;
        for attachment in &attached {
            let (line, leg) = attachment.stretched(delta, self.right_angle_mode);
            let inv = self
                .document
                .scene_transform(attachment.net)
                .and_then(|t| t.inverse())
                .unwrap_or_else(Transform::identity);
            let edit = EditNet::new(&self.document, attachment.net, line.transformed(&inv))?
                .with_companion(leg.map(|l| l.transformed(&inv)));
            self.push_command(DesignerCommand::EditNet(edit))?;
        }
        if let InteractionMode::Moving { last, .. } = &mut self.mode {
            *last = p;
        }
        Ok(())
    }

    /// Drop the dragged items at `p` and reconnect nets around them. A
    /// drag that ends where it started leaves no undo step. Returns whether
    /// anything moved.
    pub fn finish_move(&mut self, p: Point) -> DesignerResult<bool> {
        if !matches!(self.mode, InteractionMode::Moving { .. }) {
            return Ok(false);
        }
        self.drag_move(p)?;
        let InteractionMode::Moving {
            items,
            start,
            last,
            mut neighbours,
            attached,
        } = std::mem::take(&mut self.mode)
        else {
            return Ok(false);
        };
        if start == last {
            self.history.abort_macro(&mut self.document)?;
            return Ok(false);
        }

        let result = self
            .settle_attachments(&attached, last - start)
            .and_then(|legs| {
                neighbours.extend(legs);
                self.reconnect(&items, &neighbours)
            });
        match result {
            Ok(()) => {
                self.history.end_macro()?;
                Ok(true)
            }
            Err(e) => {
                self.history.abort_macro(&mut self.document)?;
                Err(e)
            }
        }
    }

    /// Net ends lying on a pin of any symbol in `items`.
    fn pin_attachments(&self, items: &[ItemId]) -> Vec<PinAttachment> {
        let mut pins = Vec::new();
        for id in items {
            for sub in self.document.store().subtree(*id) {
                let info = self
                    .document
                    .get(sub)
                    .and_then(|i| i.shape.as_group())
                    .and_then(|g| g.symbol.as_ref());
                if let (Some(info), Some(t)) = (info, self.document.scene_transform(sub)) {
                    pins.extend(info.pins.iter().map(|p| map_point(&t, *p)));
                }
            }
        }
        if pins.is_empty() {
            return Vec::new();
        }

        let tol = self.resolver.tolerance;
        let on_pin = |p: Point| pins.iter().any(|pin| pin.distance_to(&p) <= tol);
        self.document
            .nets()
            .into_iter()
            .filter(|net| !items.contains(net))
            .filter_map(|net| {
                let line = self.document.scene_line(net)?;
                let (start_moves, end_moves) = (on_pin(line.start), on_pin(line.end));
                (start_moves || end_moves).then_some(PinAttachment {
                    net,
                    line,
                    start_moves,
                    end_moves,
                })
            })
            .collect()
    }

    /// Turn each stretched net into plain nets: a bent one gives up its
    /// companion leg as a new net, a collapsed one is deleted. Returns the
    /// new legs.
    fn settle_attachments(
        &mut self,
        attached: &[PinAttachment],
        delta: Point,
    ) -> DesignerResult<Vec<ItemId>> {
        let mut legs = Vec::new();
        for attachment in attached {
            let (line, leg) = attachment.stretched(delta, self.right_angle_mode);
            match leg {
                Some(leg) => {
                    let edit = EditNet::from_scene(&self.document, attachment.net, line)?;
                    self.push_command(DesignerCommand::EditNet(edit))?;
                    let item = self.new_item(Shape::Net(DesignNet::new(leg.start, leg.end)));
                    legs.push(item.id);
                    self.push_command(DesignerCommand::AddItem(AddItem::new(item, None)))?;
                }
                None if line.is_degenerate(EPSILON) => {
                    let delete = DeleteItems::new(vec![attachment.net]);
                    self.push_command(DesignerCommand::DeleteItems(delete))?;
                }
                None => {}
            }
        }
        Ok(legs)
    }

    // ------------------------------------------------------------------
    // Rotate and mirror
    // ------------------------------------------------------------------

    /// Rotate the selection by `angle` degrees about the centre of its
    /// bounding box. A selection holding nets only turns in multiples of
    /// 90 degrees.
    pub fn rotate_selection(&mut self, angle: f64) -> DesignerResult<()> {
        let ids = self.selection_or_err()?;
        let quarter_turn = ((angle / 90.0).round() * 90.0 - angle).abs() < EPSILON;
        let has_nets = ids.iter().any(|id| {
            self.document
                .store()
                .subtree(*id)
                .into_iter()
                .any(|sub| self.document.get(sub).is_some_and(|i| i.is_net()))
        });
        if has_nets && !quarter_turn {
            return Err(DesignerError::OffAxisRotation(angle));
        }
        let Some(pivot) = self.document.bounding_rect(&ids).map(|r| r.center()) else {
            return Ok(());
        };
        let former = self.former_neighbours(&ids);
        let cmd = RotateItems::new(&self.document, ids.clone(), pivot, angle);
        self.in_macro("Rotate", |state| {
            state.push_command(DesignerCommand::RotateItems(cmd))?;
            state.reconnect(&ids, &former)
        })
    }

    /// Mirror the selection about the vertical axis through the centre of
    /// its bounding box.
    pub fn mirror_selection(&mut self) -> DesignerResult<()> {
        let ids = self.selection_or_err()?;
        let Some(pivot) = self.document.bounding_rect(&ids).map(|r| r.center()) else {
            return Ok(());
        };
        let former = self.former_neighbours(&ids);
        self.in_macro("Mirror", |state| {
            state.push_command(DesignerCommand::MirrorItems(MirrorItems::new(ids.clone(), pivot)))?;
            state.reconnect(&ids, &former)
        })
    }

    // ------------------------------------------------------------------
    // Grouping
    // ------------------------------------------------------------------

    /// Group the selected top-level items. The new group becomes the
    /// selection.
    pub fn group_selection(&mut self) -> DesignerResult<Option<ItemId>> {
        let ids = self.selection_or_err()?;
        let Some(cmd) = GroupItems::new(&mut self.document, &ids) else {
            return Ok(None);
        };
        let group = cmd.group_id;
        self.push_command(DesignerCommand::GroupItems(cmd))?;
        self.document.deselect_all();
        self.document.set_selected(group, true);
        Ok(Some(group))
    }

    /// Dissolve every selected group. Returns the released children, which
    /// become the selection.
    pub fn ungroup_selection(&mut self) -> DesignerResult<Vec<ItemId>> {
        let groups: Vec<ItemId> = self
            .selection_or_err()?
            .into_iter()
            .filter(|id| self.document.get(*id).is_some_and(|i| i.is_group()))
            .collect();
        if groups.is_empty() {
            return Ok(Vec::new());
        }
        let released = self.in_macro("Ungroup", |state| {
            let mut released = Vec::new();
            for group in groups {
                released.extend(state.document.children(group));
                state.push_command(DesignerCommand::UngroupItems(UngroupItems::new(group)))?;
            }
            Ok(released)
        })?;
        self.document.deselect_all();
        for id in &released {
            self.document.set_selected(*id, true);
        }
        Ok(released)
    }
}
