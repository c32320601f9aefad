use proptest::prelude::*;
use schemkit_designer::{
    AddItem, ChangeStyle, Color, CommandHistory, DeleteItems, DesignFile, DesignNet,
    DesignRectangle, DesignerCommand, Document, DrawingItem, GroupItems, ItemId, MirrorItems,
    MoveItems, NetResolver, Pen, Point, Rect, RotateItems, Shape, StyleValue, UngroupItems,
};

#[derive(Debug, Clone)]
enum Op {
    Add(i32, i32),
    Move(usize, i32, i32),
    Rotate(usize, i32),
    Mirror(usize),
    Pen(usize, u8),
    Group(usize, usize),
    Ungroup(usize),
    Delete(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-50..50, -50..50).prop_map(|(x, y)| Op::Add(x, y)),
        (any::<usize>(), -20..20, -20..20).prop_map(|(i, x, y)| Op::Move(i, x, y)),
        (any::<usize>(), -8..8).prop_map(|(i, a)| Op::Rotate(i, a)),
        any::<usize>().prop_map(Op::Mirror),
        (any::<usize>(), any::<u8>()).prop_map(|(i, v)| Op::Pen(i, v)),
        (any::<usize>(), any::<usize>()).prop_map(|(i, j)| Op::Group(i, j)),
        any::<usize>().prop_map(Op::Ungroup),
        any::<usize>().prop_map(Op::Delete),
    ]
}

fn rect(doc: &mut Document, x: f64, y: f64) -> DrawingItem {
    let id = doc.generate_id();
    DrawingItem::new(
        id,
        Shape::Rectangle(DesignRectangle::from_rect(Rect::new(x, y, 12.0, 8.0))),
    )
}

fn seeded() -> Document {
    let mut doc = Document::new();
    for x in [0.0, 30.0, 60.0] {
        let item = rect(&mut doc, x, 10.0);
        doc.add_item(item, None).unwrap();
    }
    doc
}

/// Build the command for `op` against the current roots, if it applies.
fn command(doc: &mut Document, op: &Op) -> Option<DesignerCommand> {
    let roots = doc.root_items();
    let pick = |i: usize| (!roots.is_empty()).then(|| roots[i % roots.len()]);
    let pivot = |doc: &Document, id: ItemId| {
        doc.scene_bounds(id)
            .map(|b| b.center())
            .unwrap_or_else(Point::origin)
    };
    match *op {
        Op::Add(x, y) => {
            let item = rect(doc, x as f64, y as f64);
            Some(DesignerCommand::AddItem(AddItem::new(item, None)))
        }
        Op::Move(i, dx, dy) => {
            let id = pick(i)?;
            let stop = Point::new(dx as f64, dy as f64);
            MoveItems::new(doc, vec![id], Point::origin(), stop).map(DesignerCommand::MoveItems)
        }
        Op::Rotate(i, steps) => {
            let id = pick(i)?;
            let cmd = RotateItems::new(doc, vec![id], pivot(doc, id), steps as f64 * 15.0);
            Some(DesignerCommand::RotateItems(cmd))
        }
        Op::Mirror(i) => {
            let id = pick(i)?;
            Some(DesignerCommand::MirrorItems(MirrorItems::new(
                vec![id],
                pivot(doc, id),
            )))
        }
        Op::Pen(i, v) => {
            let id = pick(i)?;
            let pen = Pen::new(Color::rgb(v, 0, 255 - v), 1.0 + v as f64 / 64.0);
            ChangeStyle::for_items(doc, &[id], StyleValue::Pen(pen))
        }
        Op::Group(i, j) => {
            let (a, b) = (pick(i)?, pick(j)?);
            if a == b {
                return None;
            }
            GroupItems::new(doc, &[a, b]).map(DesignerCommand::GroupItems)
        }
        Op::Ungroup(i) => {
            let id = pick(i)?;
            doc.get(id)?
                .is_group()
                .then(|| DesignerCommand::UngroupItems(UngroupItems::new(id)))
        }
        Op::Delete(i) => Some(DesignerCommand::DeleteItems(DeleteItems::new(vec![pick(i)?]))),
    }
}

fn run(doc: &mut Document, history: &mut CommandHistory, ops: &[Op]) {
    for op in ops {
        if let Some(cmd) = command(doc, op) {
            history.push(cmd, doc).unwrap();
        }
    }
}

fn fingerprint(doc: &Document) -> serde_json::Value {
    serde_json::to_value(DesignFile::from_document(doc, "fingerprint").items).unwrap()
}

fn add_net(doc: &mut Document, a: (f64, f64), b: (f64, f64)) -> ItemId {
    let id = doc.generate_id();
    let shape = Shape::Net(DesignNet::new(Point::new(a.0, a.1), Point::new(b.0, b.1)));
    doc.add_item(DrawingItem::new(id, shape), None).unwrap()
}

fn spans(doc: &Document) -> Vec<(f64, f64)> {
    doc.nets()
        .into_iter()
        .filter_map(|n| doc.scene_line(n))
        .map(|l| (l.start.x.min(l.end.x), l.start.x.max(l.end.x)))
        .collect()
}

/// Collinear spans where each one overlaps the previous, so together they
/// form one connected run from 0. Returned in shuffled order.
fn overlapping_run() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0u32..100, 2u32..30), 2..8)
        .prop_map(|raw| {
            let mut spans = Vec::with_capacity(raw.len());
            let (mut start, mut prev_len) = (0u32, 0u32);
            for (i, (frac, len)) in raw.into_iter().enumerate() {
                if i > 0 {
                    start += (prev_len - 1) * frac / 100;
                }
                spans.push((start as f64, (start + len) as f64));
                prev_len = len;
            }
            spans
        })
        .prop_shuffle()
}

fn covered(spans: &[(f64, f64)], x: f64) -> bool {
    spans.iter().any(|(lo, hi)| *lo < x && x < *hi)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_undo_all_restores_initial_document(ops in prop::collection::vec(op(), 1..24)) {
        let mut doc = seeded();
        let mut history = CommandHistory::default();
        let before = fingerprint(&doc);

        run(&mut doc, &mut history, &ops);
        let after = fingerprint(&doc);

        while history.undo(&mut doc).unwrap() {}
        prop_assert_eq!(fingerprint(&doc), before);

        while history.redo(&mut doc).unwrap() {}
        prop_assert_eq!(fingerprint(&doc), after);
    }

    #[test]
    fn test_macro_redo_matches_first_run(ops in prop::collection::vec(op(), 1..16)) {
        let mut doc = seeded();
        let mut history = CommandHistory::default();
        let before = fingerprint(&doc);

        history.begin_macro("Batch");
        run(&mut doc, &mut history, &ops);
        history.end_macro().unwrap();
        let after = fingerprint(&doc);
        prop_assert!(history.len() <= 1);

        history.undo(&mut doc).unwrap();
        prop_assert_eq!(fingerprint(&doc), before);
        history.redo(&mut doc).unwrap();
        prop_assert_eq!(fingerprint(&doc), after);
    }

    #[test]
    fn test_collinear_nets_merge_without_overlap(
        raw in prop::collection::vec((0i32..50, 1i32..20), 1..8)
    ) {
        let mut doc = Document::new();
        let mut history = CommandHistory::default();
        let resolver = NetResolver::new();
        let input: Vec<(f64, f64)> = raw
            .iter()
            .map(|(start, len)| (*start as f64, (*start + *len) as f64))
            .collect();
        for (a, b) in &input {
            add_net(&mut doc, (*a, 0.0), (*b, 0.0));
        }

        resolver.resolve_all(&mut doc, &mut history).unwrap();
        let merged = spans(&doc);

        for (i, a) in merged.iter().enumerate() {
            for b in &merged[i + 1..] {
                prop_assert!(a.1.min(b.1) - a.0.max(b.0) <= 1e-9, "{:?} overlaps {:?}", a, b);
            }
        }
        for step in 0..140 {
            let x = step as f64 * 0.5 + 0.25;
            prop_assert_eq!(covered(&input, x), covered(&merged, x));
        }

        let steps = history.len();
        resolver.resolve_all(&mut doc, &mut history).unwrap();
        prop_assert_eq!(history.len(), steps);
    }

    #[test]
    fn test_overlapping_run_merges_into_one_net(input in overlapping_run()) {
        let mut doc = Document::new();
        let mut history = CommandHistory::default();
        for (a, b) in &input {
            add_net(&mut doc, (*a, 0.0), (*b, 0.0));
        }

        NetResolver::new().resolve_all(&mut doc, &mut history).unwrap();
        let hi = input.iter().map(|s| s.1).fold(0.0, f64::max);
        let merged = spans(&doc);
        prop_assert_eq!(merged.len(), 1);
        prop_assert!(merged[0].0.abs() < 1e-9 && (merged[0].1 - hi).abs() < 1e-9, "{:?}", merged);
        prop_assert!(doc.junction_dots().is_empty());
    }

    #[test]
    fn test_every_crossing_splits_the_net(
        xs in prop::collection::btree_set(1i32..100, 0..6)
    ) {
        let mut doc = Document::new();
        let mut history = CommandHistory::default();
        let main = add_net(&mut doc, (0.0, 0.0), (100.0, 0.0));
        let crossers: Vec<ItemId> = xs
            .iter()
            .map(|x| add_net(&mut doc, (*x as f64, -10.0), (*x as f64, 10.0)))
            .collect();

        let pieces = NetResolver::new()
            .split_nets(&mut doc, &mut history, main, &crossers)
            .unwrap();

        prop_assert_eq!(pieces.len(), xs.len() + 1);
        let total: f64 = pieces
            .iter()
            .map(|p| doc.scene_line(*p).unwrap().length())
            .sum();
        prop_assert!((total - 100.0).abs() < 1e-9);
        prop_assert_eq!(doc.junction_dots().len(), xs.len());
    }
}
