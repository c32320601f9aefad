use schemkit_designer::{
    AddItem, ChangeStyle, Color, CommandHistory, DesignRectangle, DesignerCommand, DesignerError,
    Document, DrawingItem, ItemId, MoveItems, Pen, Point, Rect, Shape, StyleValue,
};

fn add_rect(doc: &mut Document, history: &mut CommandHistory, x: f64) -> ItemId {
    let id = doc.generate_id();
    let item = DrawingItem::new(
        id,
        Shape::Rectangle(DesignRectangle::from_rect(Rect::new(x, 0.0, 10.0, 10.0))),
    );
    history
        .push(DesignerCommand::AddItem(AddItem::new(item, None)), doc)
        .unwrap();
    id
}

fn nudge(doc: &mut Document, history: &mut CommandHistory, id: ItemId) {
    let cmd = MoveItems::new(doc, vec![id], Point::origin(), Point::new(1.0, 0.0)).unwrap();
    history.push(DesignerCommand::MoveItems(cmd), doc).unwrap();
}

#[test]
fn test_undo_after_partial_undo_then_new_edit() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let a = add_rect(&mut doc, &mut history, 0.0);
    nudge(&mut doc, &mut history, a);
    nudge(&mut doc, &mut history, a);

    history.undo(&mut doc).unwrap();
    history.undo(&mut doc).unwrap();
    assert_eq!(history.redo_text().as_deref(), Some("Move"));

    let b = add_rect(&mut doc, &mut history, 50.0);
    assert!(!history.can_redo());
    assert_eq!(history.len(), 2);

    while history.undo(&mut doc).unwrap() {}
    assert!(doc.is_empty());
    while history.redo(&mut doc).unwrap() {}
    assert_eq!(doc.root_items(), vec![a, b]);
    assert_eq!(doc.get(a).unwrap().pos, Point::origin());
}

#[test]
fn test_watermark_lost_when_saved_state_is_discarded() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let a = add_rect(&mut doc, &mut history, 0.0);
    nudge(&mut doc, &mut history, a);
    history.set_clean();

    history.undo(&mut doc).unwrap();
    assert!(!history.is_clean());
    nudge(&mut doc, &mut history, a);
    assert!(!history.is_clean());

    // The saved state cannot be reached any more.
    history.undo(&mut doc).unwrap();
    assert!(!history.is_clean());
    history.undo(&mut doc).unwrap();
    assert!(!history.is_clean());
}

#[test]
fn test_capacity_keeps_newest_steps() {
    let mut doc = Document::new();
    let mut history = CommandHistory::new(3);
    let a = add_rect(&mut doc, &mut history, 0.0);
    for _ in 0..5 {
        nudge(&mut doc, &mut history, a);
    }
    assert_eq!(history.len(), 3);

    let mut undone = 0;
    while history.undo(&mut doc).unwrap() {
        undone += 1;
    }
    assert_eq!(undone, 3);
    assert_eq!(doc.get(a).unwrap().pos, Point::new(2.0, 0.0));

    history.set_capacity(1);
    assert_eq!(history.len(), 1);
    assert_eq!(history.index(), 0);
    assert!(history.redo(&mut doc).unwrap());
    assert!(!history.redo(&mut doc).unwrap());
}

#[test]
fn test_open_macro_blocks_undo_and_redo() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    let a = add_rect(&mut doc, &mut history, 0.0);

    history.begin_macro("Style");
    let cmd = ChangeStyle::for_items(
        &doc,
        &[a],
        StyleValue::Pen(Pen::new(Color::rgb(200, 0, 0), 3.0)),
    )
    .unwrap();
    history.push(cmd, &mut doc).unwrap();

    assert!(!history.can_undo());
    assert_eq!(
        history.undo(&mut doc),
        Err(DesignerError::MacroInProgress("Style".to_string()))
    );
    assert!(matches!(
        history.redo(&mut doc),
        Err(DesignerError::MacroInProgress(_))
    ));

    history.end_macro().unwrap();
    assert_eq!(history.undo_text().as_deref(), Some("Style"));
    assert_eq!(history.end_macro(), Err(DesignerError::NoOpenMacro));
    assert_eq!(history.abort_macro(&mut doc), Err(DesignerError::NoOpenMacro));
}

#[test]
fn test_nested_macros_revert_innermost_only() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();

    history.begin_macro("Outer");
    let a = add_rect(&mut doc, &mut history, 0.0);
    history.begin_macro("Inner");
    add_rect(&mut doc, &mut history, 20.0);
    add_rect(&mut doc, &mut history, 40.0);
    assert_eq!(history.macro_depth(), 2);
    history.abort_macro(&mut doc).unwrap();
    assert_eq!(doc.root_items(), vec![a]);

    history.begin_macro("Inner");
    let c = add_rect(&mut doc, &mut history, 60.0);
    history.end_macro().unwrap();
    history.end_macro().unwrap();
    assert_eq!(history.len(), 1);

    let step = history.undo_command().unwrap();
    assert_eq!(step.name(), "Outer");
    assert_eq!(step.leaf_count(), 2);

    history.undo(&mut doc).unwrap();
    assert!(doc.is_empty());
    history.redo(&mut doc).unwrap();
    assert_eq!(doc.root_items(), vec![a, c]);
}

#[test]
fn test_clear_resets_to_clean() {
    let mut doc = Document::new();
    let mut history = CommandHistory::default();
    add_rect(&mut doc, &mut history, 0.0);
    history.begin_macro("Dangling");
    history.clear();

    assert!(history.is_empty());
    assert!(!history.in_macro());
    assert!(history.is_clean());
    assert!(!history.can_undo());
    assert_eq!(doc.len(), 1);
}
