use schemkit_designer::model::geometry::rotation_about;
use schemkit_designer::{
    AddItem, CommandHistory, DeleteItems, DesignNet, DesignRectangle, DesignerCommand, Document,
    DrawingItem, GroupItems, ItemId, MoveItems, NetResolver, Placement, Point, Rect, Segment,
    Shape, UngroupItems,
};

fn net(doc: &mut Document, a: (f64, f64), b: (f64, f64)) -> ItemId {
    let id = doc.generate_id();
    let shape = Shape::Net(DesignNet::new(Point::new(a.0, a.1), Point::new(b.0, b.1)));
    doc.add_item(DrawingItem::new(id, shape), None).unwrap()
}

fn rect(doc: &mut Document, r: Rect) -> ItemId {
    let id = doc.generate_id();
    let shape = Shape::Rectangle(DesignRectangle::from_rect(r));
    doc.add_item(DrawingItem::new(id, shape), None).unwrap()
}

fn seg(a: (f64, f64), b: (f64, f64)) -> Segment {
    Segment::new(Point::new(a.0, a.1), Point::new(b.0, b.1))
}

#[test]
fn test_overlapping_nets_merge() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let a = net(&mut doc, (0.0, 0.0), (100.0, 0.0));
    let b = net(&mut doc, (50.0, 0.0), (150.0, 0.0));

    let survivor = NetResolver::new()
        .merge_nets(&mut doc, &mut history, a, &[b])
        .unwrap()
        .unwrap();

    assert!(!doc.contains(b));
    assert_eq!(doc.nets(), vec![survivor]);
    assert_eq!(doc.scene_line(survivor), Some(seg((0.0, 0.0), (150.0, 0.0))));
}

#[test]
fn test_crossing_net_splits_with_dot() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let a = net(&mut doc, (0.0, 0.0), (100.0, 0.0));
    let b = net(&mut doc, (50.0, -50.0), (50.0, 50.0));

    let pieces = NetResolver::new()
        .split_nets(&mut doc, &mut history, a, &[b])
        .unwrap();

    let mut lines: Vec<Segment> = pieces
        .iter()
        .map(|p| doc.scene_line(*p).unwrap().normalized())
        .collect();
    lines.sort_by(|l, r| l.start.x.total_cmp(&r.start.x));
    assert_eq!(lines, vec![seg((0.0, 0.0), (50.0, 0.0)), seg((50.0, 0.0), (100.0, 0.0))]);

    let dots = doc.junction_dots();
    assert_eq!(dots.len(), 1);
    assert!(doc
        .dot_position(dots[0])
        .is_some_and(|p| p.approx_eq(&Point::new(50.0, 0.0), 1e-9)));
}

#[test]
fn test_group_bounds_and_ungroup_restores() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let r1 = Rect::new(10.0, 10.0, 20.0, 10.0);
    let r2 = Rect::new(50.0, 40.0, 5.0, 30.0);
    let a = rect(&mut doc, r1);
    let b = rect(&mut doc, r2);

    let group = GroupItems::new(&mut doc, &[a, b]).unwrap();
    let gid = group.group_id;
    history
        .push(DesignerCommand::GroupItems(group), &mut doc)
        .unwrap();
    assert_eq!(doc.root_items(), vec![gid]);
    assert_eq!(doc.scene_bounds(gid), Some(r1.union(&r2)));

    history
        .push(DesignerCommand::UngroupItems(UngroupItems::new(gid)), &mut doc)
        .unwrap();
    assert!(!doc.contains(gid));
    assert_eq!(doc.root_items(), vec![a, b]);
    assert_eq!(doc.scene_bounds(a), Some(r1));
    assert_eq!(doc.scene_bounds(b), Some(r2));
    assert!(doc.get(a).unwrap().parent.is_none());
}

#[test]
fn test_move_undo_is_exact() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let id = rect(&mut doc, Rect::new(0.0, 0.0, 10.0, 10.0));

    let cmd = MoveItems::new(&doc, vec![id], Point::origin(), Point::new(10.0, 10.0)).unwrap();
    history.push(DesignerCommand::MoveItems(cmd), &mut doc).unwrap();
    assert_eq!(doc.get(id).unwrap().pos, Point::new(10.0, 10.0));

    history.undo(&mut doc).unwrap();
    assert_eq!(doc.get(id).unwrap().pos, Point::origin());
    assert_eq!(doc.placement(id), Some(Placement::default()));
}

#[test]
fn test_move_undo_is_exact_for_rotated_items() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let id = rect(&mut doc, Rect::new(0.0, 0.0, 10.0, 10.0));
    let placement = Placement::new(Point::new(0.1, 0.7), rotation_about(Point::origin(), 33.3));
    doc.set_placement(id, placement).unwrap();

    for _ in 0..25 {
        let cmd = MoveItems::new(&doc, vec![id], Point::new(0.3, 0.1), Point::new(1.7, 9.9)).unwrap();
        history.push(DesignerCommand::MoveItems(cmd), &mut doc).unwrap();
    }
    while history.undo(&mut doc).unwrap() {}
    assert_eq!(doc.placement(id), Some(placement));
}

#[test]
fn test_add_then_delete_in_one_macro() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let id = doc.generate_id();
    let item = DrawingItem::new(
        id,
        Shape::Rectangle(DesignRectangle::from_rect(Rect::new(0.0, 0.0, 5.0, 5.0))),
    );

    history.begin_macro("Scratch");
    history
        .push(DesignerCommand::AddItem(AddItem::new(item, None)), &mut doc)
        .unwrap();
    history
        .push(DesignerCommand::DeleteItems(DeleteItems::new(vec![id])), &mut doc)
        .unwrap();
    history.end_macro().unwrap();
    assert_eq!(history.len(), 1);
    assert!(!doc.contains(id));

    assert!(history.undo(&mut doc).unwrap());
    assert!(!doc.contains(id));
    assert!(doc.is_empty());
    assert!(!history.can_undo());

    assert!(history.redo(&mut doc).unwrap());
    assert!(doc.is_empty());
}
