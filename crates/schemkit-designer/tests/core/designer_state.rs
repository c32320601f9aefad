use schemkit_designer::{
    BoxShape, DesignerError, DesignerState, InteractionMode, ItemId, Point, Rect, Segment,
};
use schemkit_settings::EditorConfig;

fn state() -> DesignerState {
    let mut s = DesignerState::new();
    s.snapper.enabled = false;
    s
}

fn draw_net(s: &mut DesignerState, a: (f64, f64), b: (f64, f64)) -> Vec<ItemId> {
    s.begin_net(Point::new(a.0, a.1)).unwrap();
    s.finish_net(Point::new(b.0, b.1)).unwrap()
}

fn seg(a: (f64, f64), b: (f64, f64)) -> Segment {
    Segment::new(Point::new(a.0, a.1), Point::new(b.0, b.1))
}

fn box_at(s: &mut DesignerState, a: (f64, f64), b: (f64, f64)) -> ItemId {
    let id = s.begin_shape(BoxShape::Rectangle, Point::new(a.0, a.1)).unwrap();
    s.drag_shape(Point::new(b.0, b.1)).unwrap();
    assert_eq!(s.finish_shape().unwrap(), Some(id));
    id
}

#[test]
fn test_symbol_drag_pulls_attached_net() {
    let mut s = state();
    let sym = s.place_symbol("resistor", Point::new(100.0, 0.0)).unwrap().unwrap();
    let net = draw_net(&mut s, (0.0, 0.0), (70.0, 0.0))[0];

    assert_eq!(s.select_at(Point::new(100.0, 0.0), false), Some(sym));
    s.begin_move(Point::new(100.0, 0.0)).unwrap();
    s.drag_move(Point::new(103.0, 0.0)).unwrap();
    assert!(s.finish_move(Point::new(105.0, 0.0)).unwrap());

    assert_eq!(s.document.get(sym).unwrap().pos, Point::new(105.0, 0.0));
    assert_eq!(s.document.scene_line(net), Some(seg((0.0, 0.0), (75.0, 0.0))));
    assert_eq!(s.history.undo_text().as_deref(), Some("Move"));
    assert_eq!(s.history.len(), 3);

    s.undo().unwrap();
    assert_eq!(s.document.get(sym).unwrap().pos, Point::new(100.0, 0.0));
    assert_eq!(s.document.scene_line(net), Some(seg((0.0, 0.0), (70.0, 0.0))));
}

#[test]
fn test_long_symbol_drag_stretches_net() {
    let mut s = state();
    let sym = s.place_symbol("resistor", Point::new(100.0, 0.0)).unwrap().unwrap();
    let net = draw_net(&mut s, (0.0, 0.0), (70.0, 0.0))[0];
    s.document.deselect_all();
    s.document.set_selected(sym, true);

    s.begin_move(Point::new(100.0, 0.0)).unwrap();
    s.drag_move(Point::new(130.0, 0.0)).unwrap();
    assert_eq!(s.document.scene_line(net), Some(seg((0.0, 0.0), (100.0, 0.0))));
    assert!(s.finish_move(Point::new(160.0, 0.0)).unwrap());

    assert_eq!(s.document.scene_line(net), Some(seg((0.0, 0.0), (130.0, 0.0))));
    assert_eq!(s.document.nets(), vec![net]);
    assert_eq!(s.history.len(), 3);

    s.undo().unwrap();
    assert_eq!(s.document.scene_line(net), Some(seg((0.0, 0.0), (70.0, 0.0))));
}

#[test]
fn test_perpendicular_symbol_drag_bends_net() {
    let mut s = state();
    let sym = s.place_symbol("resistor", Point::new(100.0, 100.0)).unwrap().unwrap();
    let net = draw_net(&mut s, (0.0, 100.0), (70.0, 100.0))[0];
    s.document.deselect_all();
    s.document.set_selected(sym, true);

    s.begin_move(Point::new(100.0, 100.0)).unwrap();
    s.drag_move(Point::new(100.0, 130.0)).unwrap();
    let pending = s.document.get(net).and_then(|i| i.shape.as_net()).and_then(|n| n.companion);
    assert_eq!(pending, Some(seg((70.0, 100.0), (70.0, 130.0))));
    assert!(s.finish_move(Point::new(100.0, 150.0)).unwrap());

    let nets = s.document.nets();
    assert_eq!(nets.len(), 2);
    let lines: Vec<Segment> = nets
        .iter()
        .map(|n| s.document.scene_line(*n).unwrap().normalized())
        .collect();
    assert!(lines.contains(&seg((0.0, 100.0), (70.0, 100.0))));
    assert!(lines.contains(&seg((70.0, 100.0), (70.0, 150.0))));
    assert!(nets
        .iter()
        .all(|n| s.document.get(*n).and_then(|i| i.shape.as_net()).is_some_and(|n| n.companion.is_none())));
    assert!(s
        .document
        .pins()
        .iter()
        .any(|p| p.approx_eq(&Point::new(70.0, 150.0), 1e-9)));
    assert!(s.document.junction_dots().is_empty());

    s.undo().unwrap();
    assert_eq!(s.document.nets(), vec![net]);
    assert_eq!(s.document.scene_line(net), Some(seg((0.0, 100.0), (70.0, 100.0))));
}

#[test]
fn test_finish_move_leaves_other_gestures_alone() {
    let mut s = state();
    s.begin_net(Point::new(0.0, 0.0)).unwrap();
    s.update_net(Point::new(50.0, 0.0)).unwrap();

    assert!(!s.finish_move(Point::new(60.0, 0.0)).unwrap());
    assert!(matches!(s.mode, InteractionMode::DrawingNet { .. }));
    assert_eq!(s.document.len(), 1);

    s.cancel().unwrap();
    assert!(!s.history.in_macro());
    assert!(s.document.is_empty());
    assert!(s.history.is_clean());

    s.add_text("note", Point::new(0.0, 50.0)).unwrap();
    assert!(s.undo().unwrap());
    assert!(s.document.is_empty());
}

#[test]
fn test_cancel_closes_stray_macro() {
    let mut s = state();
    s.history.begin_macro("Stray");
    s.add_text("note", Point::new(0.0, 50.0)).unwrap();
    assert!(s.mode.is_idle());

    s.cancel().unwrap();
    assert!(!s.history.in_macro());
    assert!(s.document.is_empty());
    assert_eq!(s.undo(), Ok(false));
}

#[test]
fn test_gesture_blocks_undo_until_finished() {
    let mut s = state();
    s.add_text("note", Point::new(0.0, 50.0)).unwrap();

    s.begin_net(Point::new(0.0, 0.0)).unwrap();
    s.update_net(Point::new(30.0, 0.0)).unwrap();
    assert!(!s.can_undo());
    assert_eq!(
        s.undo(),
        Err(DesignerError::MacroInProgress("Draw Net".to_string()))
    );

    s.cancel().unwrap();
    assert!(s.mode.is_idle());
    assert!(s.document.nets().is_empty());
    assert!(s.undo().unwrap());
    assert!(s.document.is_empty());
}

#[test]
fn test_new_gesture_cancels_previous() {
    let mut s = state();
    s.begin_wire(Point::new(0.0, 0.0)).unwrap();
    s.add_wire_point(Point::new(10.0, 10.0)).unwrap();

    let id = box_at(&mut s, (50.0, 50.0), (80.0, 70.0));
    assert_eq!(s.document.root_items(), vec![id]);
    assert_eq!(s.history.len(), 1);
}

#[test]
fn test_bent_net_stays_axis_aligned() {
    let mut s = state();
    let nets = draw_net(&mut s, (0.0, 0.0), (50.0, 30.0));
    assert_eq!(nets.len(), 2);
    let total: f64 = nets
        .iter()
        .map(|n| s.document.scene_line(*n).unwrap())
        .inspect(|l| assert!(l.start.x == l.end.x || l.start.y == l.end.y))
        .map(|l| l.length())
        .sum();
    assert!((total - 80.0).abs() < 1e-9);
    assert_eq!(s.history.len(), 1);

    s.toggle_right_angle_mode();
    let other = draw_net(&mut s, (100.0, 0.0), (150.0, 30.0));
    assert_eq!(other.len(), 2);
}

#[test]
fn test_delete_symbol_keeps_its_nets() {
    let mut s = state();
    let sym = s.place_symbol("resistor", Point::new(100.0, 0.0)).unwrap().unwrap();
    draw_net(&mut s, (0.0, 0.0), (70.0, 0.0));
    draw_net(&mut s, (130.0, 0.0), (200.0, 0.0));

    s.document.deselect_all();
    s.document.set_selected(sym, true);
    assert_eq!(s.delete_selection().unwrap(), 1);
    assert!(!s.document.contains(sym));
    assert_eq!(s.document.nets().len(), 2);
    assert!(s.document.junction_dots().is_empty());

    s.undo().unwrap();
    assert!(s.document.contains(sym));
    assert_eq!(s.document.pins().len(), 2);
}

#[test]
fn test_group_move_ungroup_round_trip() {
    let mut s = state();
    let a = box_at(&mut s, (0.0, 0.0), (20.0, 10.0));
    let b = box_at(&mut s, (40.0, 0.0), (50.0, 30.0));
    s.select_in_rect(&Rect::new(-5.0, -5.0, 100.0, 100.0), false);
    assert_eq!(s.document.selected_items(), vec![a, b]);

    let group = s.group_selection().unwrap().unwrap();
    assert_eq!(s.document.children(group), vec![a, b]);

    s.begin_move(Point::new(10.0, 10.0)).unwrap();
    assert!(s.finish_move(Point::new(20.0, 20.0)).unwrap());
    let released = s.ungroup_selection().unwrap();
    assert_eq!(released, vec![a, b]);
    assert_eq!(s.document.root_items(), vec![a, b]);
    assert_eq!(
        s.document.scene_bounds(a),
        Some(Rect::new(10.0, 10.0, 20.0, 10.0))
    );

    for _ in 0..3 {
        s.undo().unwrap();
    }
    assert_eq!(s.document.root_items(), vec![a, b]);
    assert_eq!(s.document.scene_bounds(a), Some(Rect::new(0.0, 0.0, 20.0, 10.0)));
    assert_eq!(s.document.scene_bounds(b), Some(Rect::new(40.0, 0.0, 10.0, 30.0)));
}

#[test]
fn test_copy_lands_apart() {
    let mut s = state();
    let net = draw_net(&mut s, (0.0, 0.0), (50.0, 0.0))[0];
    s.document.deselect_all();
    s.document.set_selected(net, true);

    let copies = s
        .copy_selection(Point::new(0.0, 0.0), Point::new(0.0, 40.0))
        .unwrap();
    assert_eq!(copies.len(), 1);
    assert_eq!(
        s.document.scene_line(copies[0]),
        Some(seg((0.0, 40.0), (50.0, 40.0)))
    );
    assert_eq!(s.document.nets().len(), 2);

    s.undo().unwrap();
    assert_eq!(s.document.nets(), vec![net]);
}

#[test]
fn test_transforms_need_selection() {
    let mut s = state();
    box_at(&mut s, (0.0, 0.0), (10.0, 10.0));
    s.document.deselect_all();

    assert_eq!(s.rotate_selection(90.0), Err(DesignerError::EmptySelection));
    assert_eq!(s.mirror_selection(), Err(DesignerError::EmptySelection));
    assert_eq!(s.group_selection(), Err(DesignerError::EmptySelection));
    assert_eq!(s.history.len(), 1);
}

#[test]
fn test_undo_limit_from_config() {
    let mut config = EditorConfig::default();
    config.history.undo_limit = 2;
    let mut s = DesignerState::with_config(config);
    for i in 0..3 {
        s.add_text("t", Point::new(i as f64 * 10.0, 0.0)).unwrap();
    }
    assert_eq!(s.history.len(), 2);
    while s.undo().unwrap() {}
    assert_eq!(s.document.len(), 1);
}
