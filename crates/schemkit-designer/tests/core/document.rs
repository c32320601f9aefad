use std::cell::RefCell;
use std::rc::Rc;

use schemkit_core::StructuralError;
use schemkit_designer::{
    DesignEllipse, DesignGroup, DesignNet, DesignRectangle, DesignerError, Document,
    DocumentEvent, DrawingItem, ItemId, Point, Rect, Shape,
};

fn add(doc: &mut Document, shape: Shape, parent: Option<ItemId>) -> ItemId {
    let id = doc.generate_id();
    doc.add_item(DrawingItem::new(id, shape), parent).unwrap()
}

fn net(a: (f64, f64), b: (f64, f64)) -> Shape {
    Shape::Net(DesignNet::new(Point::new(a.0, a.1), Point::new(b.0, b.1)))
}

#[test]
fn test_structural_errors_leave_document_unchanged() {
    let mut doc = Document::new();
    let rect = add(
        &mut doc,
        Shape::Rectangle(DesignRectangle::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0))),
        None,
    );
    let outer = add(&mut doc, Shape::Group(DesignGroup::new()), None);
    let inner = add(&mut doc, Shape::Group(DesignGroup::new()), Some(outer));

    let id = doc.generate_id();
    let err = doc
        .add_item(DrawingItem::new(id, net((0.0, 0.0), (1.0, 0.0))), Some(rect))
        .unwrap_err();
    assert_eq!(
        err,
        DesignerError::Structural(StructuralError::InvalidParent {
            item: id,
            parent: rect
        })
    );

    let err = doc.set_parent(outer, Some(inner), None).unwrap_err();
    assert!(matches!(
        err,
        DesignerError::Structural(StructuralError::CycleDetected { .. })
    ));

    let dup = DrawingItem::new(rect, net((0.0, 0.0), (1.0, 0.0)));
    assert!(doc.add_item(dup, None).unwrap_err().is_structural());

    assert_eq!(doc.len(), 3);
    assert_eq!(doc.root_items(), vec![rect, outer]);
    assert_eq!(doc.children(outer), vec![inner]);
}

#[test]
fn test_remove_and_restore_subtree() {
    let mut doc = Document::new();
    let group = add(&mut doc, Shape::Group(DesignGroup::new()), None);
    let a = add(&mut doc, net((0.0, 0.0), (10.0, 0.0)), Some(group));
    let b = add(&mut doc, net((0.0, 5.0), (10.0, 5.0)), Some(group));
    let tail = add(&mut doc, net((0.0, 9.0), (10.0, 9.0)), None);

    let snapshot = doc.remove_item(group).unwrap();
    assert!(!doc.contains(a) && !doc.contains(b));
    assert_eq!(doc.root_items(), vec![tail]);

    doc.insert_subtree(&snapshot, None, Some(snapshot.index))
        .unwrap();
    assert_eq!(doc.root_items(), vec![group, tail]);
    assert_eq!(doc.children(group), vec![a, b]);
}

#[test]
fn test_collisions_cover_touching_and_containment() {
    let mut doc = Document::new();
    let base = add(&mut doc, net((0.0, 0.0), (100.0, 0.0)), None);
    let touching = add(&mut doc, net((100.0, 0.0), (100.0, 40.0)), None);
    let apart = add(&mut doc, net((0.0, 10.0), (100.0, 10.0)), None);
    let ellipse = add(
        &mut doc,
        Shape::Ellipse(DesignEllipse::from_rect(Rect::new(40.0, -5.0, 20.0, 10.0))),
        None,
    );

    let hits = doc.query_collisions(base);
    assert!(hits.contains(&touching));
    assert!(hits.contains(&ellipse));
    assert!(!hits.contains(&apart));
    assert!(!hits.contains(&base));
}

#[test]
fn test_bounding_rect_and_hits() {
    let mut doc = Document::new();
    assert_eq!(doc.bounding_rect(&[]), None);

    let low = add(
        &mut doc,
        Shape::Rectangle(DesignRectangle::from_rect(Rect::new(0.0, 0.0, 50.0, 50.0))),
        None,
    );
    let high = add(
        &mut doc,
        Shape::Rectangle(DesignRectangle::from_rect(Rect::new(25.0, 25.0, 50.0, 50.0))),
        None,
    );
    assert_eq!(
        doc.bounding_rect(&[low, high]),
        Some(Rect::new(0.0, 0.0, 75.0, 75.0))
    );
    assert_eq!(doc.items_at(Point::new(30.0, 30.0), 0.5), vec![high, low]);
    assert_eq!(doc.items_at(Point::new(10.0, 10.0), 0.5), vec![low]);
}

#[test]
fn test_observers_see_mutations() {
    let mut doc = Document::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let sub = doc.subscribe(move |e: &DocumentEvent| sink.borrow_mut().push(*e));

    let a = add(&mut doc, net((0.0, 0.0), (10.0, 0.0)), None);
    doc.set_selected(a, true);
    doc.remove_item(a).unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![
            DocumentEvent::ItemAdded(a),
            DocumentEvent::SelectionChanged,
            DocumentEvent::ItemRemoved(a),
        ]
    );

    assert!(doc.unsubscribe(sub));
    add(&mut doc, net((0.0, 0.0), (10.0, 0.0)), None);
    assert_eq!(seen.borrow().len(), 3);
}
