use schemkit_designer::model::geometry::rotation_about;
use schemkit_designer::{
    deserialize, serialize, DesignFile, DesignerError, DesignerState, Point, Shape,
};

fn sorted(mut points: Vec<Point>) -> Vec<Point> {
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    points
}

fn close(a: &[Point], b: &[Point]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| p.approx_eq(q, 1e-9))
}

fn schematic() -> DesignerState {
    let mut state = DesignerState::new();
    state.place_symbol("resistor", Point::new(100.0, 0.0)).unwrap();
    state
        .place_symbol_with(
            "resistor",
            Point::new(200.0, 100.0),
            Some(rotation_about(Point::origin(), 90.0)),
            1,
        )
        .unwrap();
    state.begin_net(Point::new(0.0, 0.0)).unwrap();
    state.finish_net(Point::new(70.0, 0.0)).unwrap();
    state.begin_net(Point::new(40.0, -40.0)).unwrap();
    state.finish_net(Point::new(40.0, 0.0)).unwrap();
    state.add_text("R1", Point::new(90.0, -20.0)).unwrap();
    state
}

#[test]
fn test_schematic_survives_round_trip() {
    let state = schematic();
    let doc = &state.document;
    assert_eq!(doc.junction_dots().len(), 1);

    let loaded = deserialize(&serialize(doc).unwrap()).unwrap();
    assert_eq!(loaded.len(), doc.len());
    assert_eq!(loaded.root_items(), doc.root_items());
    assert_eq!(loaded.nets().len(), doc.nets().len());
    assert_eq!(loaded.junction_dots().len(), 1);
    assert!(close(&sorted(loaded.pins()), &sorted(doc.pins())));

    for id in doc.walk() {
        let (a, b) = (doc.get(id).unwrap(), loaded.get(id).unwrap());
        assert_eq!(a.reflections, b.reflections);
        assert_eq!(a.parent, b.parent);
        assert_eq!(doc.children(id), loaded.children(id));
    }
}

#[test]
fn test_symbol_metadata_is_kept() {
    let state = schematic();
    let design = DesignFile::from_document(&state.document, "amp");
    let symbols: Vec<&str> = design
        .items
        .iter()
        .filter_map(|i| match &i.shape {
            Shape::Group(g) => g.symbol.as_ref().map(|s| s.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(symbols, vec!["resistor", "resistor"]);

    let mirrored = design.items.iter().find(|i| i.reflections == 1).unwrap();
    assert!(!mirrored.children.is_empty());
}

#[test]
fn test_reloaded_state_keeps_editing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("amp.schem");
    let mut state = schematic();
    state.save_to_file(&path).unwrap();

    let mut reopened = DesignerState::new();
    reopened.load_from_file(&path).unwrap();
    let count = reopened.document.len();

    // Branch off the loaded trunk: two halves, the new net and a dot.
    reopened.begin_net(Point::new(20.0, 0.0)).unwrap();
    reopened.finish_net(Point::new(20.0, 50.0)).unwrap();
    assert_eq!(reopened.document.len(), count + 3);
    assert_eq!(reopened.document.junction_dots().len(), 2);

    reopened.undo().unwrap();
    assert_eq!(reopened.document.len(), count);
    assert!(!reopened.is_modified());
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let state = schematic();
    let mut design = DesignFile::from_document(&state.document, "dup");
    let copy = design.items[0].clone();
    design.items.push(copy);

    let err = design.to_document().unwrap_err();
    assert!(err.is_structural());

    let bytes = serde_json::to_vec(&design).unwrap();
    assert!(matches!(
        deserialize(&bytes),
        Err(DesignerError::Structural(_))
    ));
}

#[test]
fn test_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.schem");
    std::fs::write(&path, "{\"version\": \"1.0\"").unwrap();
    assert!(DesignFile::load_from_file(&path).is_err());

    let mut state = DesignerState::new();
    assert!(state.load_from_file(&path).is_err());
    assert!(state.document.is_empty());
}
