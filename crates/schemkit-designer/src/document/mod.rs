//! Editable document: a tree of drawing items with selection and change
//! notification.
//!
//! Structural mutations (`add_item`, `insert_subtree`, `remove_item`,
//! `set_parent`, `reparent`, `set_placement`, `update_item`) are meant to be
//! called from command `apply`/`revert` only, so that every change is on the
//! undo history. Each checks its preconditions before touching any state.

mod collision;
mod store;
mod types;

pub use collision::{outlines_collide, SceneOutline};
pub use store::ItemStore;
pub use types::{DocumentEvent, DrawingItem, ItemSnapshot};

use std::collections::HashSet;

use schemkit_core::{EventDispatcher, ItemId, StructuralError, SubscriptionId};

use crate::error::DesignerResult;
use crate::model::geometry::{map_point, EPSILON};
use crate::model::{DesignerShape, Placement, Point, Rect, Segment, Shape, Transform};
use crate::selection_manager::SelectionManager;

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub(crate) store: ItemStore,
    pub selection_manager: SelectionManager,
    events: EventDispatcher<DocumentEvent>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.store.contains(id)
    }

    pub fn get(&self, id: ItemId) -> Option<&DrawingItem> {
        self.store.get(id)
    }

    pub fn generate_id(&mut self) -> ItemId {
        self.store.generate_id()
    }

    /// Top-level items in paint order.
    pub fn root_items(&self) -> Vec<ItemId> {
        self.store.draw_order(None)
    }

    /// Children of a group in insertion order.
    pub fn children(&self, id: ItemId) -> Vec<ItemId> {
        self.store.children_of(Some(id)).to_vec()
    }

    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.store.get(id).and_then(|i| i.parent)
    }

    /// Position of the item in its parent's child list (or the root list).
    pub fn index_in_parent(&self, id: ItemId) -> Option<usize> {
        let parent = self.store.get(id)?.parent;
        self.store.children_of(parent).iter().position(|c| *c == id)
    }

    /// Every item, parents first, siblings in paint order.
    pub fn walk(&self) -> Vec<ItemId> {
        self.store.walk()
    }

    // ------------------------------------------------------------------
    // Structural mutation
    // ------------------------------------------------------------------

    fn check_parent(&self, item: ItemId, parent: Option<ItemId>) -> DesignerResult<()> {
        if let Some(pid) = parent {
            let p = self
                .store
                .get(pid)
                .ok_or(StructuralError::not_found(pid))?;
            if !p.is_group() {
                return Err(StructuralError::InvalidParent { item, parent: pid }.into());
            }
            if self.store.is_ancestor_or_self(item, pid) {
                return Err(StructuralError::CycleDetected { item, parent: pid }.into());
            }
        }
        Ok(())
    }

    fn check_index(&self, parent: Option<ItemId>, index: Option<usize>) -> DesignerResult<()> {
        let len = self.store.children_of(parent).len();
        match index {
            Some(index) if index > len => {
                Err(StructuralError::IndexOutOfRange { index, len }.into())
            }
            _ => Ok(()),
        }
    }

    fn attach(&mut self, id: ItemId, parent: Option<ItemId>, index: Option<usize>) {
        if let Some(container) = self.store.container_mut(parent) {
            match index {
                Some(i) if i <= container.len() => container.insert(i, id),
                _ => container.push(id),
            }
        }
    }

    fn detach(&mut self, id: ItemId) -> Option<usize> {
        let parent = self.store.get(id)?.parent;
        let container = self.store.container_mut(parent)?;
        let index = container.iter().position(|c| *c == id)?;
        container.remove(index);
        Some(index)
    }

    /// Insert a new item under `parent` (or at the root), appended last.
    /// A group is inserted empty; its children are added afterwards.
    pub fn add_item(&mut self, mut item: DrawingItem, parent: Option<ItemId>) -> DesignerResult<ItemId> {
        let id = item.id;
        if self.store.contains(id) {
            return Err(StructuralError::DuplicateItem { id }.into());
        }
        self.check_parent(id, parent)?;

        item.parent = parent;
        item.selected = false;
        if let Some(group) = item.shape.as_group_mut() {
            group.children.clear();
        }
        self.store.insert_raw(item);
        self.attach(id, parent, None);
        tracing::trace!("Added item {}", id);
        self.events.publish(&DocumentEvent::ItemAdded(id));
        Ok(id)
    }

    /// Restore a removed subtree under `parent` at `index` (appended when
    /// `None`). Every id in the snapshot must be free.
    pub fn insert_subtree(
        &mut self,
        snapshot: &ItemSnapshot,
        parent: Option<ItemId>,
        index: Option<usize>,
    ) -> DesignerResult<()> {
        let ids = snapshot.ids();
        let mut seen = HashSet::new();
        for id in &ids {
            if self.store.contains(*id) || !seen.insert(*id) {
                return Err(StructuralError::DuplicateItem { id: *id }.into());
            }
        }
        if let Some(pid) = parent {
            if seen.contains(&pid) {
                return Err(StructuralError::CycleDetected {
                    item: snapshot.id(),
                    parent: pid,
                }
                .into());
            }
        }
        self.check_parent(snapshot.id(), parent)?;
        self.check_index(parent, index)?;

        self.insert_snapshot(snapshot, parent, index);
        Ok(())
    }

    fn insert_snapshot(&mut self, snapshot: &ItemSnapshot, parent: Option<ItemId>, index: Option<usize>) {
        let mut item = snapshot.item.clone();
        let id = item.id;
        item.parent = parent;
        if let Some(group) = item.shape.as_group_mut() {
            group.children.clear();
        }
        self.store.insert_raw(item);
        self.attach(id, parent, index);
        self.events.publish(&DocumentEvent::ItemAdded(id));
        for child in &snapshot.children {
            self.insert_snapshot(child, Some(id), None);
        }
    }

    /// Deep copy of an item and its descendants as they stand now.
    pub fn snapshot(&self, id: ItemId) -> Option<ItemSnapshot> {
        let item = self.store.get(id)?.clone();
        let index = self.index_in_parent(id).unwrap_or(0);
        let children = self
            .store
            .children_of(Some(id))
            .iter()
            .filter_map(|c| self.snapshot(*c))
            .collect();
        Some(ItemSnapshot {
            item,
            index,
            children,
        })
    }

    /// Detach an item and its descendants, returning a snapshot that
    /// `insert_subtree` can put back exactly.
    pub fn remove_item(&mut self, id: ItemId) -> DesignerResult<ItemSnapshot> {
        let snapshot = self
            .snapshot(id)
            .ok_or(StructuralError::not_found(id))?;
        self.detach(id);
        for sub in self.store.subtree(id) {
            self.store.remove_raw(sub);
            self.selection_manager.forget(sub);
            self.events.publish(&DocumentEvent::ItemRemoved(sub));
        }
        tracing::trace!("Removed item {}", id);
        Ok(snapshot)
    }

    /// Move one item to `new_parent` at `index`, keeping its scene placement.
    pub fn set_parent(
        &mut self,
        id: ItemId,
        new_parent: Option<ItemId>,
        index: Option<usize>,
    ) -> DesignerResult<()> {
        if !self.store.contains(id) {
            return Err(StructuralError::not_found(id).into());
        }
        self.check_parent(id, new_parent)?;

        let scene = self.scene_transform(id).unwrap_or_else(Transform::identity);
        let parent_scene = match new_parent {
            Some(p) => self.scene_transform(p).unwrap_or_else(Transform::identity),
            None => Transform::identity(),
        };
        let local = scene.then(&parent_scene.inverse().unwrap_or_else(Transform::identity));

        let mut len = self.store.children_of(new_parent).len();
        if self.parent(id) == new_parent {
            len -= 1;
        }
        if let Some(i) = index {
            if i > len {
                return Err(StructuralError::IndexOutOfRange { index: i, len }.into());
            }
        }

        self.detach(id);
        self.attach(id, new_parent, index);
        if let Some(item) = self.store.get_mut(id) {
            item.parent = new_parent;
            item.set_placement(Placement::from_matrix(&local));
        }
        self.events.publish(&DocumentEvent::ItemChanged(id));
        Ok(())
    }

    /// Move every child of `group` to `new_parent` (appended, in order),
    /// keeping scene placement. Returns the moved children.
    pub fn reparent(&mut self, group: ItemId, new_parent: Option<ItemId>) -> DesignerResult<Vec<ItemId>> {
        let g = self
            .store
            .get(group)
            .ok_or(StructuralError::not_found(group))?;
        if !g.is_group() {
            return Err(StructuralError::NotAGroup { id: group }.into());
        }
        if let Some(p) = new_parent {
            if self.store.is_ancestor_or_self(group, p) {
                return Err(StructuralError::CycleDetected {
                    item: group,
                    parent: p,
                }
                .into());
            }
        }
        let children = self.children(group);
        if let Some(first) = children.first() {
            self.check_parent(*first, new_parent)?;
        }
        for child in &children {
            self.set_parent(*child, new_parent, None)?;
        }
        Ok(children)
    }

    pub fn set_placement(&mut self, id: ItemId, placement: Placement) -> DesignerResult<()> {
        self.update_item(id, |item| item.set_placement(placement))
    }

    /// Mutate an item's non-structural state in place.
    pub fn update_item<F>(&mut self, id: ItemId, f: F) -> DesignerResult<()>
    where
        F: FnOnce(&mut DrawingItem),
    {
        let item = self
            .store
            .get_mut(id)
            .ok_or(StructuralError::not_found(id))?;
        f(item);
        self.events.publish(&DocumentEvent::ItemChanged(id));
        Ok(())
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.store.clear();
        self.selection_manager = SelectionManager::new();
        self.events.publish(&DocumentEvent::Cleared);
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    pub fn placement(&self, id: ItemId) -> Option<Placement> {
        self.store.get(id).map(|i| i.placement())
    }

    /// Local-to-scene mapping through every ancestor.
    pub fn scene_transform(&self, id: ItemId) -> Option<Transform> {
        let item = self.store.get(id)?;
        let mut m = item.local_to_parent();
        let mut parent = item.parent;
        while let Some(pid) = parent {
            let p = self.store.get(pid)?;
            m = m.then(&p.local_to_parent());
            parent = p.parent;
        }
        Some(m)
    }

    /// Scene mapping of the item's parent frame; identity at the root.
    pub fn parent_scene_transform(&self, id: ItemId) -> Option<Transform> {
        match self.store.get(id)?.parent {
            Some(p) => self.scene_transform(p),
            None => Some(Transform::identity()),
        }
    }

    pub fn map_to_scene(&self, id: ItemId, p: Point) -> Option<Point> {
        self.scene_transform(id).map(|t| map_point(&t, p))
    }

    pub fn map_from_scene(&self, id: ItemId, p: Point) -> Option<Point> {
        let inv = self.scene_transform(id)?.inverse()?;
        Some(map_point(&inv, p))
    }

    /// Bounds in the item's own coordinates. Empty groups have none.
    pub fn local_bounds(&self, id: ItemId) -> Option<Rect> {
        let item = self.store.get(id)?;
        if !item.is_group() {
            return Some(item.shape.bounds());
        }
        self.store
            .children_of(Some(id))
            .iter()
            .filter_map(|c| {
                let child = self.store.get(*c)?;
                let b = self.local_bounds(*c)?;
                Some(b.transformed(&child.local_to_parent()))
            })
            .reduce(|a, b| a.union(&b))
    }

    pub fn scene_bounds(&self, id: ItemId) -> Option<Rect> {
        let local = self.local_bounds(id)?;
        Some(local.transformed(&self.scene_transform(id)?))
    }

    /// Union of the scene bounds of `ids`; `None` when nothing has bounds.
    pub fn bounding_rect(&self, ids: &[ItemId]) -> Option<Rect> {
        ids.iter()
            .filter_map(|id| self.scene_bounds(*id))
            .reduce(|a, b| a.union(&b))
    }

    /// Collision geometry in scene coordinates. Groups contribute the
    /// outlines of all their descendants.
    pub fn scene_outlines(&self, id: ItemId) -> Vec<SceneOutline> {
        let mut out = Vec::new();
        for sub in self.store.subtree(id) {
            let Some(item) = self.store.get(sub) else {
                continue;
            };
            if item.is_group() {
                continue;
            }
            if let Some(scene) = self.scene_transform(sub) {
                if let Some(o) = SceneOutline::from_local(&item.shape.outline(), &scene) {
                    out.push(o);
                }
            }
        }
        out
    }

    /// Leaf items whose scene geometry intersects that of `id`, excluding
    /// its own ancestors and descendants.
    pub fn query_collisions(&self, id: ItemId) -> HashSet<ItemId> {
        let mut hits = HashSet::new();
        let outlines = self.scene_outlines(id);
        if outlines.is_empty() {
            return hits;
        }
        let Some(bounds) = outlines
            .iter()
            .map(|o| o.bounds())
            .reduce(|a, b| a.union(&b))
        else {
            return hits;
        };
        let bounds = Rect::new(
            bounds.x - EPSILON,
            bounds.y - EPSILON,
            bounds.width + 2.0 * EPSILON,
            bounds.height + 2.0 * EPSILON,
        );

        for other in self.store.iter() {
            let oid = other.id;
            if other.is_group()
                || self.store.is_ancestor_or_self(oid, id)
                || self.store.is_ancestor_or_self(id, oid)
            {
                continue;
            }
            let Some(scene) = self.scene_transform(oid) else {
                continue;
            };
            let Some(candidate) = SceneOutline::from_local(&other.shape.outline(), &scene) else {
                continue;
            };
            if !candidate.bounds().intersects(&bounds) {
                continue;
            }
            if outlines
                .iter()
                .any(|o| outlines_collide(o, &candidate, EPSILON))
            {
                hits.insert(oid);
            }
        }
        hits
    }

    /// Whether the scene point `p` lies on the item (or any descendant).
    pub fn hit_test(&self, id: ItemId, p: Point, tolerance: f64) -> bool {
        let Some(item) = self.store.get(id) else {
            return false;
        };
        if item.is_group() {
            return self
                .store
                .children_of(Some(id))
                .iter()
                .any(|c| self.hit_test(*c, p, tolerance));
        }
        self.map_from_scene(id, p)
            .is_some_and(|local| item.shape.contains_point(local, tolerance))
    }

    /// Top-level items under the scene point, topmost first.
    pub fn items_at(&self, p: Point, tolerance: f64) -> Vec<ItemId> {
        self.store
            .draw_order(None)
            .into_iter()
            .rev()
            .filter(|id| self.hit_test(*id, p, tolerance))
            .collect()
    }

    /// Top-level items whose bounds lie inside `rect`.
    pub fn items_in_rect(&self, rect: &Rect) -> Vec<ItemId> {
        self.store
            .draw_order(None)
            .into_iter()
            .filter(|id| self.scene_bounds(*id).is_some_and(|b| rect.contains_rect(&b)))
            .collect()
    }

    // ------------------------------------------------------------------
    // Schematic queries
    // ------------------------------------------------------------------

    /// Top-level nets in paint order.
    pub fn nets(&self) -> Vec<ItemId> {
        self.store
            .draw_order(None)
            .into_iter()
            .filter(|id| self.store.get(*id).is_some_and(|i| i.is_net()))
            .collect()
    }

    /// The net's primary segment in scene coordinates.
    pub fn scene_line(&self, id: ItemId) -> Option<Segment> {
        let net = self.store.get(id)?.shape.as_net()?;
        Some(net.line.transformed(&self.scene_transform(id)?))
    }

    /// Top-level junction dots in paint order.
    pub fn junction_dots(&self) -> Vec<ItemId> {
        self.store
            .draw_order(None)
            .into_iter()
            .filter(|id| self.store.get(*id).is_some_and(|i| i.is_junction_dot()))
            .collect()
    }

    /// Scene position of a junction dot's centre.
    pub fn dot_position(&self, id: ItemId) -> Option<Point> {
        match &self.store.get(id)?.shape {
            Shape::Circle(c) => self.map_to_scene(id, c.center()),
            _ => None,
        }
    }

    /// Junction dots centred on `p`.
    pub fn dots_at(&self, p: Point, tol: f64) -> Vec<ItemId> {
        self.junction_dots()
            .into_iter()
            .filter(|d| self.dot_position(*d).is_some_and(|c| c.approx_eq(&p, tol)))
            .collect()
    }

    /// Scene positions of every symbol pin.
    pub fn pins(&self) -> Vec<Point> {
        let mut out = Vec::new();
        for id in self.store.walk() {
            let Some(item) = self.store.get(id) else {
                continue;
            };
            let Some(info) = item.shape.as_group().and_then(|g| g.symbol.as_ref()) else {
                continue;
            };
            if let Some(t) = self.scene_transform(id) {
                out.extend(info.pins.iter().map(|p| map_point(&t, *p)));
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selected_items(&self) -> Vec<ItemId> {
        self.selection_manager.selected_ids(&self.store)
    }

    pub fn primary_selection(&self) -> Option<ItemId> {
        self.selection_manager.selected_id()
    }

    pub fn set_selected(&mut self, id: ItemId, selected: bool) {
        if self
            .selection_manager
            .set_selected(&mut self.store, id, selected)
        {
            self.events.publish(&DocumentEvent::SelectionChanged);
        }
    }

    pub fn select_all(&mut self) {
        self.selection_manager.select_all(&mut self.store);
        self.events.publish(&DocumentEvent::SelectionChanged);
    }

    pub fn deselect_all(&mut self) {
        self.selection_manager.deselect_all(&mut self.store);
        self.events.publish(&DocumentEvent::SelectionChanged);
    }

    /// Click selection at a scene point.
    pub fn select_at(&mut self, p: Point, tolerance: f64, multi: bool) -> Option<ItemId> {
        let hit = self.items_at(p, tolerance).first().copied();
        let primary = self
            .selection_manager
            .select_at(&mut self.store, hit, multi);
        self.events.publish(&DocumentEvent::SelectionChanged);
        primary
    }

    /// Rubber-band selection of top-level items inside `rect`.
    pub fn select_in_rect(&mut self, rect: &Rect, multi: bool) {
        let hits = self.items_in_rect(rect);
        self.selection_manager
            .select_in_rect(&mut self.store, &hits, multi);
        self.events.publish(&DocumentEvent::SelectionChanged);
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&DocumentEvent) + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Suppress notifications, e.g. while loading a file.
    pub fn set_events_muted(&mut self, muted: bool) {
        self.events.set_muted(muted);
    }
}
