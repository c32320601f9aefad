//! Arena of drawing items keyed by handle, with the ordered root list.

use std::collections::HashMap;

use schemkit_core::ItemId;

use super::types::DrawingItem;

#[derive(Debug, Clone)]
pub struct ItemStore {
    items: HashMap<ItemId, DrawingItem>,
    root: Vec<ItemId>,
    next_id: u64,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            root: Vec::new(),
            next_id: 1,
        }
    }

    /// Hand out a handle that has never been used in this store.
    pub fn generate_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Make sure future handles are above `id`.
    pub fn reserve_id(&mut self, id: ItemId) {
        if id.0 >= self.next_id {
            self.next_id = id.0 + 1;
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn get(&self, id: ItemId) -> Option<&DrawingItem> {
        self.items.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ItemId) -> Option<&mut DrawingItem> {
        self.items.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawingItem> {
        self.items.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut DrawingItem> {
        self.items.values_mut()
    }

    /// Root items in insertion order.
    pub fn root(&self) -> &[ItemId] {
        &self.root
    }

    /// Children of `parent` (the root list for `None`) in insertion order.
    /// Non-group items have no children.
    pub fn children_of(&self, parent: Option<ItemId>) -> &[ItemId] {
        match parent {
            None => &self.root,
            Some(id) => self
                .items
                .get(&id)
                .and_then(|item| item.shape.as_group())
                .map(|g| g.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub(crate) fn container_mut(&mut self, parent: Option<ItemId>) -> Option<&mut Vec<ItemId>> {
        match parent {
            None => Some(&mut self.root),
            Some(id) => self
                .items
                .get_mut(&id)
                .and_then(|item| item.shape.as_group_mut())
                .map(|g| &mut g.children),
        }
    }

    /// Children of `parent` in paint order: ascending z, ties by insertion.
    pub fn draw_order(&self, parent: Option<ItemId>) -> Vec<ItemId> {
        let mut ids = self.children_of(parent).to_vec();
        ids.sort_by(|a, b| {
            let za = self.items.get(a).map_or(0.0, |i| i.z);
            let zb = self.items.get(b).map_or(0.0, |i| i.z);
            za.total_cmp(&zb)
        });
        ids
    }

    /// Every item, parents before children, siblings in paint order.
    pub fn walk(&self) -> Vec<ItemId> {
        let mut out = Vec::with_capacity(self.items.len());
        let mut stack: Vec<ItemId> = self.draw_order(None).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.draw_order(Some(id)).into_iter().rev());
        }
        out
    }

    /// The item and all of its descendants, item first.
    pub fn subtree(&self, id: ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.items.contains_key(&current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children_of(Some(current)).iter().rev());
        }
        out
    }

    /// True when `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: ItemId, id: ItemId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.items.get(&c).and_then(|i| i.parent);
        }
        false
    }

    pub(crate) fn insert_raw(&mut self, item: DrawingItem) {
        self.reserve_id(item.id);
        self.items.insert(item.id, item);
    }

    pub(crate) fn remove_raw(&mut self, id: ItemId) -> Option<DrawingItem> {
        self.items.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.root.clear();
    }
}
