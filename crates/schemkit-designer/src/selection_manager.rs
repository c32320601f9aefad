use crate::document::ItemStore;
use schemkit_core::ItemId;

/// Manages item selection state and selection operations.
///
/// `SelectionManager` is responsible for:
/// - Tracking which item is the "primary" selected item
/// - Applying point hits (clicking on items) to the selection
/// - Applying rubber-band hits (drag-select) to the selection
/// - Multi-select operations (Shift+click)
///
/// # Selection Model
///
/// - **Primary Selection**: One item is designated as the "primary" selection (stored in `selected_id`)
/// - **Multiple Selection**: Multiple items can have their `selected` flag set to `true`
/// - **Groups**: Only top-level items are selectable; picking inside a group selects the group
/// - **Multi-select**: Holding Shift allows toggling selection without deselecting others
///
/// # Design
///
/// The manager modifies selection flags held in the `ItemStore`. Hit testing
/// is geometric and lives in the document, which hands the results in.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    /// The ID of the primary selected item, if any
    selected_id: Option<ItemId>,
}

impl SelectionManager {
    /// Creates a new `SelectionManager` with no selection.
    ///
    /// # Examples
    ///
    /// ```
    /// use schemkit_designer::selection_manager::SelectionManager;
    ///
    /// let manager = SelectionManager::new();
    /// assert_eq!(manager.selected_id(), None);
    /// ```
    pub fn new() -> Self {
        Self { selected_id: None }
    }

    /// Returns the ID of the primary selected item.
    pub fn selected_id(&self) -> Option<ItemId> {
        self.selected_id
    }

    /// Deselects all items and clears the primary selection.
    pub fn deselect_all(&mut self, store: &mut ItemStore) {
        for item in store.iter_mut() {
            item.selected = false;
        }
        self.selected_id = None;
    }

    /// Selects every top-level item.
    ///
    /// The primary selection becomes the topmost (last in draw order) item.
    pub fn select_all(&mut self, store: &mut ItemStore) {
        let order = store.draw_order(None);
        for id in &order {
            if let Some(item) = store.get_mut(*id) {
                item.selected = true;
            }
        }
        if let Some(last) = order.last() {
            self.selected_id = Some(*last);
        }
    }

    /// Applies a click that hit `hit` (or empty space for `None`).
    ///
    /// # Multi-select Behavior
    ///
    /// - If `multi` is `false`: Deselects all other items before selecting
    /// - If `multi` is `true`: Toggles the hit item without affecting others
    ///
    /// # Returns
    ///
    /// The primary selection after the click.
    pub fn select_at(
        &mut self,
        store: &mut ItemStore,
        hit: Option<ItemId>,
        multi: bool,
    ) -> Option<ItemId> {
        if !multi {
            self.deselect_all(store);
        }

        let Some(id) = hit else {
            return self.selected_id;
        };

        let was_selected = store.get(id).is_some_and(|i| i.selected);
        let should_select = !(multi && was_selected);
        if let Some(item) = store.get_mut(id) {
            item.selected = should_select;
        }

        if should_select {
            self.selected_id = Some(id);
        } else if self.selected_id == Some(id) {
            // Fall back to any other selected item
            self.selected_id = store.iter().find(|i| i.selected).map(|i| i.id);
        }

        self.selected_id
    }

    /// Selects every item in `hits`, typically the top-level items inside a
    /// rubber band.
    pub fn select_in_rect(&mut self, store: &mut ItemStore, hits: &[ItemId], multi: bool) {
        if !multi {
            self.deselect_all(store);
        }
        for id in hits {
            if let Some(item) = store.get_mut(*id) {
                item.selected = true;
                if self.selected_id.is_none() {
                    self.selected_id = Some(*id);
                }
            }
        }
    }

    /// Sets or clears the selection flag of one item.
    pub fn set_selected(&mut self, store: &mut ItemStore, id: ItemId, selected: bool) -> bool {
        let Some(item) = store.get_mut(id) else {
            return false;
        };
        let changed = item.selected != selected;
        item.selected = selected;
        if selected {
            self.selected_id = Some(id);
        } else if self.selected_id == Some(id) {
            self.selected_id = store.iter().find(|i| i.selected).map(|i| i.id);
        }
        changed
    }

    /// Selected items in paint order, any depth.
    pub fn selected_ids(&self, store: &ItemStore) -> Vec<ItemId> {
        store
            .walk()
            .into_iter()
            .filter(|id| store.get(*id).is_some_and(|i| i.selected))
            .collect()
    }

    /// Returns the number of currently selected items.
    pub fn selected_count(&self, store: &ItemStore) -> usize {
        store.iter().filter(|i| i.selected).count()
    }

    /// Drops the primary selection if it points at a removed item.
    pub fn forget(&mut self, id: ItemId) {
        if self.selected_id == Some(id) {
            self.selected_id = None;
        }
    }
}
