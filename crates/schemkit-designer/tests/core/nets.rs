use schemkit_designer::model::geometry::rotation_about;
use schemkit_designer::{
    CommandHistory, DesignNet, DesignRectangle, DesignerError, Document, DrawingItem, ItemId,
    NetResolver, Placement, Point, Rect, Segment, Shape,
};
use schemkit_settings::EditorConfig;

fn net(doc: &mut Document, a: (f64, f64), b: (f64, f64)) -> ItemId {
    let id = doc.generate_id();
    let shape = Shape::Net(DesignNet::new(Point::new(a.0, a.1), Point::new(b.0, b.1)));
    doc.add_item(DrawingItem::new(id, shape), None).unwrap()
}

fn lines(doc: &Document) -> Vec<Segment> {
    let mut out: Vec<Segment> = doc
        .nets()
        .into_iter()
        .filter_map(|n| doc.scene_line(n))
        .map(|l| l.normalized())
        .collect();
    out.sort_by(|a, b| {
        a.start
            .x
            .total_cmp(&b.start.x)
            .then(a.start.y.total_cmp(&b.start.y))
    });
    out
}

fn close(a: &Segment, b: &Segment) -> bool {
    a.start.approx_eq(&b.start, 1e-9) && a.end.approx_eq(&b.end, 1e-9)
}

#[test]
fn test_crossing_heals_into_four_arms() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    net(&mut doc, (0.0, 0.0), (100.0, 0.0));
    net(&mut doc, (50.0, -50.0), (50.0, 50.0));

    NetResolver::new().resolve_all(&mut doc, &mut history).unwrap();
    assert_eq!(doc.nets().len(), 4);
    assert_eq!(doc.junction_dots().len(), 1);
    assert_eq!(doc.dots_at(Point::new(50.0, 0.0), 1e-6).len(), 1);

    let total: f64 = lines(&doc).iter().map(|l| l.length()).sum();
    assert!((total - 200.0).abs() < 1e-9);
}

#[test]
fn test_collinear_chain_becomes_one_net() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    net(&mut doc, (0.0, 0.0), (30.0, 0.0));
    net(&mut doc, (30.0, 0.0), (60.0, 0.0));
    net(&mut doc, (60.0, 0.0), (100.0, 0.0));

    NetResolver::new().resolve_all(&mut doc, &mut history).unwrap();
    assert_eq!(
        lines(&doc),
        vec![Segment::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0))]
    );
    assert!(doc.junction_dots().is_empty());
}

#[test]
fn test_resolve_all_is_idempotent() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let resolver = NetResolver::new();
    net(&mut doc, (0.0, 0.0), (100.0, 0.0));
    net(&mut doc, (40.0, 0.0), (40.0, 60.0));
    net(&mut doc, (80.0, -20.0), (80.0, 20.0));

    resolver.resolve_all(&mut doc, &mut history).unwrap();
    let settled = lines(&doc);
    let steps = history.len();
    assert_eq!(doc.junction_dots().len(), 2);

    resolver.resolve_all(&mut doc, &mut history).unwrap();
    assert_eq!(history.len(), steps);
    assert_eq!(lines(&doc), settled);
}

#[test]
fn test_removing_branch_lets_trunk_rejoin() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let resolver = NetResolver::new();
    net(&mut doc, (0.0, 0.0), (100.0, 0.0));
    let stub = net(&mut doc, (50.0, 0.0), (50.0, 40.0));

    resolver.resolve_all(&mut doc, &mut history).unwrap();
    assert_eq!(doc.nets().len(), 3);
    assert_eq!(doc.junction_dots().len(), 1);

    doc.remove_item(stub).unwrap();
    resolver.resolve_all(&mut doc, &mut history).unwrap();
    assert_eq!(
        lines(&doc),
        vec![Segment::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0))]
    );
    assert!(doc.junction_dots().is_empty());
}

#[test]
fn test_merge_works_in_scene_coordinates() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let rotated = net(&mut doc, (0.0, 0.0), (50.0, 0.0));
    doc.set_placement(
        rotated,
        Placement::new(Point::new(100.0, 0.0), rotation_about(Point::origin(), 90.0)),
    )
    .unwrap();
    let plain = net(&mut doc, (100.0, 25.0), (100.0, 100.0));

    let survivor = NetResolver::new()
        .merge_nets(&mut doc, &mut history, rotated, &[plain])
        .unwrap();
    assert_eq!(survivor, Some(rotated));
    assert!(!doc.contains(plain));
    let line = doc.scene_line(rotated).unwrap().normalized();
    assert!(close(
        &line,
        &Segment::new(Point::new(100.0, 0.0), Point::new(100.0, 100.0))
    ));
}

#[test]
fn test_nets_inside_groups_are_left_alone() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let group = doc.generate_id();
    doc.add_item(
        DrawingItem::new(group, Shape::Group(Default::default())),
        None,
    )
    .unwrap();
    let id = doc.generate_id();
    let inner = Shape::Net(DesignNet::new(Point::new(50.0, -50.0), Point::new(50.0, 50.0)));
    doc.add_item(DrawingItem::new(id, inner), Some(group)).unwrap();
    net(&mut doc, (0.0, 0.0), (100.0, 0.0));

    NetResolver::new().resolve_all(&mut doc, &mut history).unwrap();
    assert_eq!(doc.nets().len(), 1);
    assert!(doc.junction_dots().is_empty());
    assert!(history.is_empty());
}

#[test]
fn test_resolve_rejects_non_nets() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let id = doc.generate_id();
    let shape = Shape::Rectangle(DesignRectangle::from_rect(Rect::new(0.0, 0.0, 5.0, 5.0)));
    doc.add_item(DrawingItem::new(id, shape), None).unwrap();

    assert_eq!(
        NetResolver::new().resolve(&mut doc, &mut history, id),
        Err(DesignerError::NotANet(id))
    );
}

#[test]
fn test_resolver_follows_config() {
    let mut config = EditorConfig::default();
    config.nets.dot_radius = 4.0;
    let resolver = NetResolver::from_config(&config);
    assert_eq!(resolver.tolerance, config.nets.tolerance);
    assert_eq!(resolver.pin_snap_threshold, config.grid.pin_snap_threshold);

    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let dot = resolver
        .ensure_dot(&mut doc, &mut history, Point::new(10.0, 10.0))
        .unwrap()
        .unwrap();
    let bounds = doc.scene_bounds(dot).unwrap();
    assert!((bounds.width - 8.0).abs() < 1e-9);
    assert!(doc
        .dot_position(dot)
        .is_some_and(|p| p.approx_eq(&Point::new(10.0, 10.0), 1e-9)));
}
