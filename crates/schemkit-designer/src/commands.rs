//! Reversible edits of a [`Document`].
//!
//! Every command records the state it overwrites the first time it runs and
//! restores that record on revert, so `revert(apply(s)) == s` for the items
//! it touches.

use lyon::geom::euclid;
use schemkit_core::{ItemId, StructuralError};

use crate::document::{Document, DrawingItem, ItemSnapshot};
use crate::error::{DesignerError, DesignerResult};
use crate::model::geometry::{mirror_about, rotation_about};
use crate::model::{
    Brush, DesignGroup, DesignerShape, Font, Pen, Placement, Point, Segment, Shape, Transform,
};

#[derive(Debug, Clone)]
#[allow(clippy::large_enum_variant)]
pub enum DesignerCommand {
    AddItem(AddItem),
    DeleteItems(DeleteItems),
    MoveItems(MoveItems),
    CopyItems(CopyItems),
    RotateItems(RotateItems),
    MirrorItems(MirrorItems),
    GroupItems(GroupItems),
    UngroupItems(UngroupItems),
    /// One more click of an in-progress wire, arc or box.
    Draw(EditShape),
    /// Handle drag on an existing shape.
    Edit(EditShape),
    EditNet(EditNet),
    ChangeStyle(ChangeStyle),
    Composite(CompositeCommand),
}

#[derive(Debug, Clone)]
pub struct CompositeCommand {
    pub commands: Vec<DesignerCommand>,
    pub name: String,
}

impl CompositeCommand {
    pub fn new(name: impl Into<String>, commands: Vec<DesignerCommand>) -> Self {
        Self {
            commands,
            name: name.into(),
        }
    }
}

/// Insert an item (or a whole subtree, for symbol instances).
#[derive(Debug, Clone)]
pub struct AddItem {
    pub snapshot: ItemSnapshot,
    pub parent: Option<ItemId>,
}

impl AddItem {
    pub fn new(item: DrawingItem, parent: Option<ItemId>) -> Self {
        Self {
            snapshot: ItemSnapshot::leaf(item),
            parent,
        }
    }

    pub fn from_snapshot(snapshot: ItemSnapshot, parent: Option<ItemId>) -> Self {
        Self { snapshot, parent }
    }

    /// Deep copy of a symbol prototype with fresh ids, placed at `pos`.
    pub fn symbol(
        doc: &mut Document,
        prototype: &ItemSnapshot,
        pos: Point,
        transform: Option<Transform>,
        reflections: u8,
        pins_visible: bool,
    ) -> Self {
        let mut snapshot = prototype.with_fresh_ids(&mut || doc.generate_id());
        snapshot.item.pos = pos;
        if let Some(t) = transform {
            snapshot.item.transform = t;
        }
        snapshot.item.reflections = reflections % 2;
        if let Some(info) = snapshot
            .item
            .shape
            .as_group_mut()
            .and_then(|g| g.symbol.as_mut())
        {
            info.pins_visible = pins_visible;
        }
        Self {
            snapshot,
            parent: None,
        }
    }

    pub fn id(&self) -> ItemId {
        self.snapshot.id()
    }
}

#[derive(Debug, Clone)]
pub struct DeleteItems {
    pub ids: Vec<ItemId>,
    removed: Vec<ItemSnapshot>,
}

impl DeleteItems {
    pub fn new(ids: Vec<ItemId>) -> Self {
        Self {
            ids,
            removed: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MoveItems {
    pub ids: Vec<ItemId>,
    pub start: Point,
    pub stop: Point,
    /// Scene delta expressed in each item's parent frame.
    deltas: Vec<Point>,
    before: Vec<Placement>,
}

impl MoveItems {
    /// `None` when `start == stop`.
    pub fn new(doc: &Document, ids: Vec<ItemId>, start: Point, stop: Point) -> Option<Self> {
        if start == stop || ids.is_empty() {
            return None;
        }
        let scene_delta = euclid::vec2(stop.x - start.x, stop.y - start.y);
        let deltas = ids
            .iter()
            .map(|id| {
                let parent = doc
                    .parent_scene_transform(*id)
                    .and_then(|p| p.inverse())
                    .unwrap_or_else(Transform::identity);
                let v = parent.transform_vector(scene_delta);
                Point::new(v.x, v.y)
            })
            .collect();
        Some(Self {
            ids,
            start,
            stop,
            deltas,
            before: Vec::new(),
        })
    }
}

/// Paste pre-built copies. The copies are created by [`CopyItems::prepare`]
/// before the command is pushed.
#[derive(Debug, Clone)]
pub struct CopyItems {
    pub copies: Vec<ItemSnapshot>,
    pub point: Point,
}

impl CopyItems {
    /// Deep-copy `ids` with fresh handles, offset so that `from` lands on
    /// `to`. Copies go to the root with their scene placement.
    pub fn prepare(doc: &mut Document, ids: &[ItemId], from: Point, to: Point) -> Option<Self> {
        let mut copies = Vec::new();
        for id in ids {
            let Some(snapshot) = doc.snapshot(*id) else {
                continue;
            };
            let scene = doc.scene_transform(*id).unwrap_or_else(Transform::identity);
            let mut copy = snapshot.with_fresh_ids(&mut || doc.generate_id());
            let mut placement = Placement::from_matrix(&scene);
            placement.pos = placement.pos + (to - from);
            copy.item.set_placement(placement);
            copies.push(copy);
        }
        if copies.is_empty() {
            return None;
        }
        Some(Self { copies, point: to })
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.copies.iter().map(|c| c.id()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct RotateItems {
    pub ids: Vec<ItemId>,
    pub pivot: Point,
    pub angle: f64,
    /// The pivot mapped into each item's local frame at construction.
    pivots_local: Vec<Point>,
    before: Vec<Placement>,
}

impl RotateItems {
    pub fn new(doc: &Document, ids: Vec<ItemId>, pivot: Point, angle: f64) -> Self {
        let pivots_local = ids
            .iter()
            .map(|id| doc.map_from_scene(*id, pivot).unwrap_or(pivot))
            .collect();
        Self {
            ids,
            pivot,
            angle,
            pivots_local,
            before: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MirrorItems {
    pub ids: Vec<ItemId>,
    pub pivot: Point,
    before: Vec<(Placement, u8)>,
}

impl MirrorItems {
    pub fn new(ids: Vec<ItemId>, pivot: Point) -> Self {
        Self {
            ids,
            pivot,
            before: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct ParentRecord {
    id: ItemId,
    parent: Option<ItemId>,
    index: usize,
    placement: Placement,
}

#[derive(Debug, Clone)]
pub struct GroupItems {
    pub ids: Vec<ItemId>,
    pub group_id: ItemId,
    origin: Point,
    records: Vec<ParentRecord>,
}

impl GroupItems {
    /// `None` for an empty selection or one without bounds. Items nested
    /// under another listed item travel with it.
    pub fn new(doc: &mut Document, ids: &[ItemId]) -> Option<Self> {
        let ids: Vec<ItemId> = ids
            .iter()
            .copied()
            .filter(|id| doc.contains(*id))
            .filter(|id| {
                !ids.iter()
                    .any(|other| other != id && doc.store().is_ancestor_or_self(*other, *id))
            })
            .collect();
        let bounds = doc.bounding_rect(&ids)?;
        let group_id = doc.generate_id();
        Some(Self {
            ids,
            group_id,
            origin: bounds.min(),
            records: Vec::new(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct UngroupItems {
    pub group: ItemId,
    removed: Option<ItemSnapshot>,
    children: Vec<(ItemId, Placement)>,
}

impl UngroupItems {
    pub fn new(group: ItemId) -> Self {
        Self {
            group,
            removed: None,
            children: Vec::new(),
        }
    }
}

/// One interactive edit step on a shape, delegated to the shape's
/// `redo_edit`/`undo_edit`.
#[derive(Debug, Clone)]
pub struct EditShape {
    pub id: ItemId,
    pub point: Point,
    applied: bool,
}

impl EditShape {
    pub fn new(id: ItemId, point: Point) -> Self {
        Self {
            id,
            point,
            applied: false,
        }
    }
}

/// Replace a net's line, in the net's local coordinates.
#[derive(Debug, Clone)]
pub struct EditNet {
    pub id: ItemId,
    pub old_line: Segment,
    pub new_line: Segment,
    pub new_companion: Option<Segment>,
    old_companion: Option<Segment>,
}

impl EditNet {
    pub fn new(doc: &Document, id: ItemId, new_line: Segment) -> DesignerResult<Self> {
        let item = doc.get(id).ok_or(StructuralError::not_found(id))?;
        let net = item.shape.as_net().ok_or(DesignerError::NotANet(id))?;
        Ok(Self {
            id,
            old_line: net.line,
            new_line,
            new_companion: None,
            old_companion: net.companion,
        })
    }

    /// Leave `leg` as the net's pending companion instead of clearing it.
    pub fn with_companion(mut self, leg: Option<Segment>) -> Self {
        self.new_companion = leg;
        self
    }

    /// Same edit with the new line given in scene coordinates.
    pub fn from_scene(doc: &Document, id: ItemId, scene_line: Segment) -> DesignerResult<Self> {
        let inv = doc
            .scene_transform(id)
            .and_then(|t| t.inverse())
            .unwrap_or_else(Transform::identity);
        Self::new(doc, id, scene_line.transformed(&inv))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Pen(Pen),
    Brush(Brush),
    Font(Font),
    /// Z-value.
    Height(f64),
}

impl StyleValue {
    fn read(&self, item: &DrawingItem) -> Option<StyleValue> {
        match self {
            StyleValue::Pen(_) => Some(StyleValue::Pen(item.pen)),
            StyleValue::Brush(_) => Some(StyleValue::Brush(item.brush)),
            StyleValue::Height(_) => Some(StyleValue::Height(item.z)),
            StyleValue::Font(_) => match &item.shape {
                Shape::Text(t) => Some(StyleValue::Font(t.font.clone())),
                _ => None,
            },
        }
    }

    fn write(&self, item: &mut DrawingItem) {
        match self {
            StyleValue::Pen(p) => item.pen = *p,
            StyleValue::Brush(b) => item.brush = *b,
            StyleValue::Height(z) => item.z = *z,
            StyleValue::Font(f) => {
                if let Some(text) = item.shape.as_text_mut() {
                    text.font = f.clone();
                }
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            StyleValue::Pen(_) => "Change Pen",
            StyleValue::Brush(_) => "Change Brush",
            StyleValue::Font(_) => "Change Font",
            StyleValue::Height(_) => "Change Height",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChangeStyle {
    pub id: ItemId,
    pub value: StyleValue,
    before: Option<StyleValue>,
}

impl ChangeStyle {
    pub fn new(id: ItemId, value: StyleValue) -> Self {
        Self {
            id,
            value,
            before: None,
        }
    }

    /// Style change over a list of items. Pen, brush and font cascade into
    /// group children; height applies to the listed items themselves.
    /// Several targets become a composite of single-item changes.
    pub fn for_items(doc: &Document, ids: &[ItemId], value: StyleValue) -> Option<DesignerCommand> {
        let mut targets = Vec::new();
        for id in ids {
            match value {
                StyleValue::Height(_) => targets.push(*id),
                _ => targets.extend(
                    doc.store()
                        .subtree(*id)
                        .into_iter()
                        .filter(|sub| doc.get(*sub).is_some_and(|i| !i.is_group())),
                ),
            }
        }
        if let StyleValue::Font(_) = value {
            targets.retain(|id| doc.get(*id).is_some_and(|i| matches!(i.shape, Shape::Text(_))));
        }
        targets.dedup();

        let mut commands: Vec<DesignerCommand> = targets
            .into_iter()
            .map(|id| DesignerCommand::ChangeStyle(ChangeStyle::new(id, value.clone())))
            .collect();
        match commands.len() {
            0 => None,
            1 => commands.pop(),
            _ => Some(DesignerCommand::Composite(CompositeCommand::new(
                value.label(),
                commands,
            ))),
        }
    }
}

fn missing(id: ItemId) -> DesignerError {
    StructuralError::not_found(id).into()
}

impl DesignerCommand {
    pub fn name(&self) -> String {
        match self {
            DesignerCommand::AddItem(cmd) => match cmd.snapshot.item.shape {
                Shape::Group(ref g) if g.is_symbol() => "Add Symbol".to_string(),
                ref shape => format!("Add {}", shape.shape_type().name()),
            },
            DesignerCommand::DeleteItems(_) => "Delete".to_string(),
            DesignerCommand::MoveItems(_) => "Move".to_string(),
            DesignerCommand::CopyItems(_) => "Copy".to_string(),
            DesignerCommand::RotateItems(_) => "Rotate".to_string(),
            DesignerCommand::MirrorItems(_) => "Mirror".to_string(),
            DesignerCommand::GroupItems(_) => "Group".to_string(),
            DesignerCommand::UngroupItems(_) => "Ungroup".to_string(),
            DesignerCommand::Draw(_) => "Draw".to_string(),
            DesignerCommand::Edit(_) => "Edit".to_string(),
            DesignerCommand::EditNet(_) => "Edit Net".to_string(),
            DesignerCommand::ChangeStyle(cmd) => cmd.value.label().to_string(),
            DesignerCommand::Composite(cmd) => cmd.name.clone(),
        }
    }

    /// Number of non-composite commands this command consists of.
    pub fn leaf_count(&self) -> usize {
        match self {
            DesignerCommand::Composite(c) => c.commands.iter().map(|c| c.leaf_count()).sum(),
            _ => 1,
        }
    }

    pub fn apply(&mut self, doc: &mut Document) -> DesignerResult<()> {
        match self {
            DesignerCommand::AddItem(cmd) => {
                doc.insert_subtree(&cmd.snapshot, cmd.parent, None)?;
            }
            DesignerCommand::DeleteItems(cmd) => {
                cmd.removed.clear();
                for id in &cmd.ids {
                    // Already gone with a deleted ancestor.
                    if !doc.contains(*id) {
                        continue;
                    }
                    cmd.removed.push(doc.remove_item(*id)?);
                }
            }
            DesignerCommand::MoveItems(cmd) => {
                cmd.before = placements(doc, &cmd.ids)?;
                for ((id, before), delta) in cmd.ids.iter().zip(&cmd.before).zip(&cmd.deltas) {
                    let moved = Placement::new(before.pos + *delta, before.transform);
                    doc.set_placement(*id, moved)?;
                }
            }
            DesignerCommand::CopyItems(cmd) => {
                for copy in &cmd.copies {
                    doc.insert_subtree(copy, None, None)?;
                }
                doc.deselect_all();
                for copy in &cmd.copies {
                    doc.set_selected(copy.id(), true);
                }
            }
            DesignerCommand::RotateItems(cmd) => {
                cmd.before = placements(doc, &cmd.ids)?;
                for ((id, before), pivot) in cmd.ids.iter().zip(&cmd.before).zip(&cmd.pivots_local) {
                    let mirrored = doc.get(*id).is_some_and(|i| i.reflections % 2 == 1);
                    let angle = if mirrored { -cmd.angle } else { cmd.angle };
                    let m = rotation_about(*pivot, angle).then(&before.matrix());
                    doc.set_placement(*id, Placement::from_matrix(&m))?;
                }
            }
            DesignerCommand::MirrorItems(cmd) => {
                cmd.before.clear();
                for id in &cmd.ids {
                    let item = doc.get(*id).ok_or_else(|| missing(*id))?;
                    cmd.before.push((item.placement(), item.reflections));
                }
                let reflect = mirror_about(cmd.pivot);
                for (id, (before, reflections)) in cmd.ids.iter().zip(&cmd.before) {
                    let parent = doc
                        .parent_scene_transform(*id)
                        .unwrap_or_else(Transform::identity);
                    let parent_inv = parent.inverse().unwrap_or_else(Transform::identity);
                    let m = before
                        .matrix()
                        .then(&parent)
                        .then(&reflect)
                        .then(&parent_inv);
                    let flipped = (reflections + 1) % 2;
                    doc.update_item(*id, |item| {
                        item.set_placement(Placement::from_matrix(&m));
                        item.reflections = flipped;
                    })?;
                }
            }
            DesignerCommand::GroupItems(cmd) => {
                for id in &cmd.ids {
                    if !doc.contains(*id) {
                        return Err(missing(*id));
                    }
                }
                let index = cmd
                    .ids
                    .iter()
                    .filter(|id| doc.parent(**id).is_none())
                    .filter_map(|id| doc.index_in_parent(*id))
                    .min();
                let group = DrawingItem::new(cmd.group_id, Shape::Group(DesignGroup::new()))
                    .at(cmd.origin);
                doc.insert_subtree(&ItemSnapshot::leaf(group), None, index)?;

                cmd.records.clear();
                for id in &cmd.ids {
                    let record = ParentRecord {
                        id: *id,
                        parent: doc.parent(*id),
                        index: doc.index_in_parent(*id).unwrap_or(0),
                        placement: doc.placement(*id).ok_or_else(|| missing(*id))?,
                    };
                    doc.set_parent(*id, Some(cmd.group_id), None)?;
                    cmd.records.push(record);
                }
            }
            DesignerCommand::UngroupItems(cmd) => {
                let group = doc.get(cmd.group).ok_or_else(|| missing(cmd.group))?;
                if !group.is_group() {
                    return Err(StructuralError::NotAGroup { id: cmd.group }.into());
                }
                let parent = group.parent;
                let index = doc.index_in_parent(cmd.group).unwrap_or(0);
                let children = doc.children(cmd.group);

                cmd.children.clear();
                for (offset, child) in children.iter().enumerate() {
                    let placement = doc.placement(*child).ok_or_else(|| missing(*child))?;
                    doc.set_parent(*child, parent, Some(index + 1 + offset))?;
                    cmd.children.push((*child, placement));
                }
                cmd.removed = Some(doc.remove_item(cmd.group)?);
            }
            DesignerCommand::Draw(cmd) | DesignerCommand::Edit(cmd) => {
                let mut edited = false;
                doc.update_item(cmd.id, |item| edited = item.shape.redo_edit(cmd.point))?;
                if !edited {
                    return Err(DesignerError::UnsupportedEdit(cmd.id));
                }
                cmd.applied = true;
            }
            DesignerCommand::EditNet(cmd) => {
                cmd.old_companion = doc
                    .get(cmd.id)
                    .and_then(|i| i.shape.as_net())
                    .and_then(|n| n.companion);
                set_net_line(doc, cmd.id, cmd.new_line, cmd.new_companion)?
            }
            DesignerCommand::ChangeStyle(cmd) => {
                let item = doc.get(cmd.id).ok_or_else(|| missing(cmd.id))?;
                cmd.before = cmd.value.read(item);
                let value = cmd.value.clone();
                doc.update_item(cmd.id, |item| value.write(item))?;
            }
            DesignerCommand::Composite(cmd) => {
                for i in 0..cmd.commands.len() {
                    if let Err(e) = cmd.commands[i].apply(doc) {
                        for done in cmd.commands[..i].iter_mut().rev() {
                            done.revert(doc)?;
                        }
                        return Err(e);
                    }
                }
            }
        }
        tracing::debug!("Applied {}", self.name());
        Ok(())
    }

    pub fn revert(&mut self, doc: &mut Document) -> DesignerResult<()> {
        match self {
            DesignerCommand::AddItem(cmd) => {
                cmd.snapshot = doc.remove_item(cmd.snapshot.id())?;
            }
            DesignerCommand::DeleteItems(cmd) => {
                while let Some(snapshot) = cmd.removed.pop() {
                    doc.insert_subtree(&snapshot, snapshot.parent(), Some(snapshot.index))?;
                }
            }
            DesignerCommand::MoveItems(cmd) => restore_placements(doc, &cmd.ids, &cmd.before)?,
            DesignerCommand::CopyItems(cmd) => {
                for copy in cmd.copies.iter().rev() {
                    doc.remove_item(copy.id())?;
                }
            }
            DesignerCommand::RotateItems(cmd) => {
                restore_placements(doc, &cmd.ids, &cmd.before)?
            }
            DesignerCommand::MirrorItems(cmd) => {
                for (id, (placement, reflections)) in cmd.ids.iter().zip(&cmd.before) {
                    let (placement, reflections) = (*placement, *reflections);
                    doc.update_item(*id, |item| {
                        item.set_placement(placement);
                        item.reflections = reflections;
                    })?;
                }
            }
            DesignerCommand::GroupItems(cmd) => {
                for record in cmd.records.iter().rev() {
                    doc.set_parent(record.id, record.parent, Some(record.index))?;
                    doc.set_placement(record.id, record.placement)?;
                }
                doc.remove_item(cmd.group_id)?;
            }
            DesignerCommand::UngroupItems(cmd) => {
                let Some(snapshot) = cmd.removed.take() else {
                    return Ok(());
                };
                let leaf = ItemSnapshot {
                    item: snapshot.item.clone(),
                    index: snapshot.index,
                    children: Vec::new(),
                };
                doc.insert_subtree(&leaf, snapshot.parent(), Some(snapshot.index))?;
                for (child, placement) in &cmd.children {
                    doc.set_parent(*child, Some(cmd.group), None)?;
                    doc.set_placement(*child, *placement)?;
                }
            }
            DesignerCommand::Draw(cmd) | DesignerCommand::Edit(cmd) => {
                if cmd.applied {
                    doc.update_item(cmd.id, |item| {
                        item.shape.undo_edit();
                    })?;
                    cmd.applied = false;
                }
            }
            DesignerCommand::EditNet(cmd) => {
                set_net_line(doc, cmd.id, cmd.old_line, cmd.old_companion)?
            }
            DesignerCommand::ChangeStyle(cmd) => {
                if let Some(before) = cmd.before.clone() {
                    doc.update_item(cmd.id, |item| before.write(item))?;
                }
            }
            DesignerCommand::Composite(cmd) => {
                for sub in cmd.commands.iter_mut().rev() {
                    sub.revert(doc)?;
                }
            }
        }
        tracing::debug!("Reverted {}", self.name());
        Ok(())
    }
}

fn placements(doc: &Document, ids: &[ItemId]) -> DesignerResult<Vec<Placement>> {
    ids.iter()
        .map(|id| doc.placement(*id).ok_or_else(|| missing(*id)))
        .collect()
}

fn restore_placements(doc: &mut Document, ids: &[ItemId], before: &[Placement]) -> DesignerResult<()> {
    for (id, placement) in ids.iter().zip(before) {
        doc.set_placement(*id, *placement)?;
    }
    Ok(())
}

fn set_net_line(
    doc: &mut Document,
    id: ItemId,
    line: Segment,
    companion: Option<Segment>,
) -> DesignerResult<()> {
    if !doc.get(id).ok_or_else(|| missing(id))?.is_net() {
        return Err(DesignerError::NotANet(id));
    }
    doc.update_item(id, |item| {
        if let Some(net) = item.shape.as_net_mut() {
            net.line = line;
            net.companion = companion;
        }
    })
}
