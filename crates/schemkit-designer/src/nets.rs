//! Net connectivity: merging collinear nets, splitting nets at junctions
//! and keeping junction dots in step.
//!
//! Every change goes through [`CommandHistory::push`], so a caller that
//! wraps a call in a macro can undo the whole resolution in one step. All
//! geometry is compared in scene coordinates; only top-level nets take part.

use schemkit_core::{ItemId, StructuralError};
use schemkit_settings::EditorConfig;

use crate::commands::{AddItem, DeleteItems, DesignerCommand, EditNet};
use crate::document::{Document, ItemSnapshot};
use crate::error::{DesignerError, DesignerResult};
use crate::history::CommandHistory;
use crate::model::geometry::EPSILON;
use crate::model::{Brush, Color, Pen, Point, Segment};
use crate::symbols::{dot_prototype, DOT_RADIUS};

#[derive(Debug, Clone)]
pub struct NetResolver {
    /// Coincidence tolerance for points and directions.
    pub tolerance: f64,
    /// Largest distance a net end travels to reach a symbol pin.
    pub pin_snap_threshold: f64,
    dot: ItemSnapshot,
}

impl Default for NetResolver {
    fn default() -> Self {
        Self {
            tolerance: EPSILON,
            pin_snap_threshold: 5.0,
            dot: dot_prototype(DOT_RADIUS, Pen::default(), Brush::solid(Color::BLACK)),
        }
    }
}

fn dot(a: Point, b: Point) -> f64 {
    a.x * b.x + a.y * b.y
}

fn cross(a: Point, b: Point) -> f64 {
    a.x * b.y - a.y * b.x
}

fn direction(line: &Segment) -> Option<Point> {
    let len = line.length();
    if len <= f64::EPSILON {
        return None;
    }
    let d = line.end - line.start;
    Some(Point::new(d.x / len, d.y / len))
}

/// Extent of `other` projected on `line`, measured from `line.start`.
fn projected_span(line: &Segment, u: Point, other: &Segment) -> (f64, f64) {
    let a = dot(other.start - line.start, u);
    let b = dot(other.end - line.start, u);
    (a.min(b), a.max(b))
}

impl NetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        let pen = Pen::new(
            config.style.pen_color.parse().unwrap_or(Color::BLACK),
            config.style.pen_width,
        );
        let brush = Brush::solid(config.style.brush_color.parse().unwrap_or(Color::BLACK));
        Self {
            tolerance: config.nets.tolerance,
            pin_snap_threshold: config.grid.pin_snap_threshold,
            dot: dot_prototype(config.nets.dot_radius, pen, brush),
        }
    }

    /// Replace the junction dot prototype.
    pub fn with_dot(mut self, dot: ItemSnapshot) -> Self {
        self.dot = dot;
        self
    }

    fn parallel(&self, a: &Segment, b: &Segment) -> bool {
        match (direction(a), direction(b)) {
            (Some(u), Some(v)) => cross(u, v).abs() <= self.tolerance,
            _ => false,
        }
    }

    fn perpendicular(&self, a: &Segment, b: &Segment) -> bool {
        match (direction(a), direction(b)) {
            (Some(u), Some(v)) => dot(u, v).abs() <= self.tolerance,
            _ => false,
        }
    }

    fn collinear(&self, a: &Segment, b: &Segment) -> bool {
        let Some(u) = direction(a) else {
            return false;
        };
        self.parallel(a, b)
            && cross(u, b.start - a.start).abs() <= self.tolerance
            && cross(u, b.end - a.start).abs() <= self.tolerance
    }

    /// Top-level nets touching `net`, in paint order.
    pub fn candidates(&self, doc: &Document, net: ItemId) -> Vec<ItemId> {
        let hits = doc.query_collisions(net);
        doc.nets()
            .into_iter()
            .filter(|id| *id != net && hits.contains(id))
            .collect()
    }

    /// Net arms meeting at `p`, ignoring `exclude`. An end counts once, a
    /// net passing through counts twice; symbol pins count once.
    pub fn arms_at(&self, doc: &Document, p: Point, exclude: &[ItemId]) -> usize {
        let tol = self.tolerance;
        let mut arms = 0;
        for id in doc.nets() {
            if exclude.contains(&id) {
                continue;
            }
            let Some(line) = doc.scene_line(id) else {
                continue;
            };
            if line.is_degenerate(tol) {
                continue;
            }
            if line.has_endpoint(&p, tol) {
                arms += 1;
            } else if line.contains_point_strict(&p, tol) {
                arms += 2;
            }
        }
        arms + doc.pins().iter().filter(|pin| pin.approx_eq(&p, tol)).count()
    }

    fn delete(&self, doc: &mut Document, history: &mut CommandHistory, ids: Vec<ItemId>) -> DesignerResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        history.push(DesignerCommand::DeleteItems(DeleteItems::new(ids)), doc)
    }

    /// Add a junction dot at `p` unless one is already there.
    pub fn ensure_dot(&self, doc: &mut Document, history: &mut CommandHistory, p: Point) -> DesignerResult<Option<ItemId>> {
        if !doc.dots_at(p, self.tolerance).is_empty() {
            return Ok(None);
        }
        let mut snapshot = self.dot.with_fresh_ids(&mut || doc.generate_id());
        snapshot.item.pos = p;
        let id = snapshot.id();
        tracing::debug!("Adding junction dot {} at ({}, {})", id, p.x, p.y);
        history.push(
            DesignerCommand::AddItem(AddItem::from_snapshot(snapshot, None)),
            doc,
        )?;
        Ok(Some(id))
    }

    /// Fold every collinear net overlapping `net` into one. Returns the
    /// surviving net, which may be one of the candidates, or `None` when
    /// `net` was degenerate and got deleted.
    pub fn merge_nets(
        &self,
        doc: &mut Document,
        history: &mut CommandHistory,
        net: ItemId,
        candidates: &[ItemId],
    ) -> DesignerResult<Option<ItemId>> {
        let tol = self.tolerance;
        let mut survivor = net;
        loop {
            let line = doc.scene_line(survivor).ok_or(DesignerError::NotANet(survivor))?;
            let Some(u) = direction(&line).filter(|_| !line.is_degenerate(tol)) else {
                tracing::debug!("Dropping zero-length net {}", survivor);
                self.delete(doc, history, vec![survivor])?;
                return Ok(None);
            };
            let len = line.length();

            let mut changed = false;
            for cand in candidates {
                if *cand == survivor || !doc.contains(*cand) {
                    continue;
                }
                let Some(other) = doc.scene_line(*cand) else {
                    continue;
                };
                if other.is_degenerate(tol) || !self.collinear(&line, &other) {
                    continue;
                }
                let (lo, hi) = projected_span(&line, u, &other);
                let overlap = len.min(hi) - lo.max(0.0);
                if overlap < -tol {
                    continue;
                }
                if overlap <= tol {
                    // End to end: only a plain continuation is joined.
                    let join = if hi.abs() <= tol { line.start } else { line.end };
                    if self.arms_at(doc, join, &[survivor, *cand]) > 0 {
                        continue;
                    }
                }

                if lo <= tol && hi >= len - tol {
                    tracing::debug!("Net {} absorbed by {}", survivor, cand);
                    self.delete(doc, history, vec![survivor])?;
                    survivor = *cand;
                } else if lo >= -tol && hi <= len + tol {
                    // Rescan: the absorbed net may have blocked an earlier join.
                    tracing::debug!("Net {} absorbs {}", survivor, cand);
                    self.delete(doc, history, vec![*cand])?;
                } else {
                    let (a, b) = (lo.min(0.0), hi.max(len));
                    let union = Segment::new(
                        Point::new(line.start.x + u.x * a, line.start.y + u.y * a),
                        Point::new(line.start.x + u.x * b, line.start.y + u.y * b),
                    );
                    tracing::debug!("Net {} merges {}", survivor, cand);
                    let edit = EditNet::from_scene(doc, survivor, union)?;
                    history.push(DesignerCommand::EditNet(edit), doc)?;
                    self.delete(doc, history, vec![*cand])?;
                }
                changed = true;
                break;
            }
            if !changed {
                break;
            }
        }

        let line = doc.scene_line(survivor).ok_or(DesignerError::NotANet(survivor))?;
        let inner_dots: Vec<ItemId> = doc
            .junction_dots()
            .into_iter()
            .filter(|d| {
                doc.dot_position(*d)
                    .is_some_and(|p| line.contains_point_strict(&p, tol))
            })
            .collect();
        self.delete(doc, history, inner_dots)?;
        Ok(Some(survivor))
    }

    /// Split nets where `net` forms a T or a crossing with a perpendicular
    /// candidate, adding a dot at each junction. Returns the nets that now
    /// make up `net`.
    pub fn split_nets(
        &self,
        doc: &mut Document,
        history: &mut CommandHistory,
        net: ItemId,
        candidates: &[ItemId],
    ) -> DesignerResult<Vec<ItemId>> {
        let tol = self.tolerance;
        if !doc.contains(net) {
            return Ok(Vec::new());
        }
        let line = doc.scene_line(net).ok_or(DesignerError::NotANet(net))?;

        for (i, cand) in candidates.iter().enumerate() {
            if *cand == net || !doc.contains(*cand) {
                continue;
            }
            let Some(other) = doc.scene_line(*cand) else {
                continue;
            };
            if !self.perpendicular(&line, &other) || line.shares_endpoint(&other, tol) {
                continue;
            }

            // `net` ends on the candidate's interior.
            if let Some(p) = [line.start, line.end]
                .into_iter()
                .find(|p| other.contains_point_strict(p, tol))
            {
                self.split_net(doc, history, *cand, p)?;
                continue;
            }

            let at = [other.start, other.end]
                .into_iter()
                .find(|p| line.contains_point_strict(p, tol))
                .or_else(|| {
                    line.crossing_point(&other, tol).filter(|p| {
                        line.contains_point_strict(p, tol) && other.contains_point_strict(p, tol)
                    })
                });
            let Some(at) = at else {
                continue;
            };
            let (first, second) = self.split_net(doc, history, net, at)?;
            let residual = &candidates[i + 1..];
            let mut pieces = self.split_nets(doc, history, first, residual)?;
            pieces.extend(self.split_nets(doc, history, second, residual)?);
            return Ok(pieces);
        }
        Ok(vec![net])
    }

    /// Replace `net` by two halves meeting at the scene point `at`.
    fn split_net(
        &self,
        doc: &mut Document,
        history: &mut CommandHistory,
        net: ItemId,
        at: Point,
    ) -> DesignerResult<(ItemId, ItemId)> {
        let item = doc
            .get(net)
            .ok_or(StructuralError::not_found(net))?
            .clone();
        let line = item.shape.as_net().ok_or(DesignerError::NotANet(net))?.line;
        let local = doc.map_from_scene(net, at).unwrap_or(at);

        let mut halves = Vec::with_capacity(2);
        for segment in [Segment::new(line.start, local), Segment::new(local, line.end)] {
            let mut half = item.clone();
            half.id = doc.generate_id();
            half.selected = false;
            if let Some(n) = half.shape.as_net_mut() {
                n.line = segment;
                n.companion = None;
            }
            halves.push(half);
        }
        tracing::debug!("Splitting net {} at ({}, {})", net, at.x, at.y);

        self.delete(doc, history, vec![net])?;
        let ids = (halves[0].id, halves[1].id);
        for half in halves {
            history.push(DesignerCommand::AddItem(AddItem::new(half, item.parent)), doc)?;
        }
        self.ensure_dot(doc, history, at)?;
        Ok(ids)
    }

    /// Pull each end of `net` onto a symbol pin within reach, as long as
    /// the net stays horizontal or vertical. Returns whether it moved.
    pub fn snap_to_pins(
        &self,
        doc: &mut Document,
        history: &mut CommandHistory,
        net: ItemId,
        pins: &[Point],
    ) -> DesignerResult<bool> {
        let tol = self.tolerance;
        let line = doc.scene_line(net).ok_or(DesignerError::NotANet(net))?;
        let nearest = |p: Point| {
            pins.iter()
                .copied()
                .map(|pin| (pin, pin.distance_to(&p)))
                .filter(|(_, d)| *d > tol && *d < self.pin_snap_threshold)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(pin, _)| pin)
        };

        let mut snapped = line;
        if let Some(pin) = nearest(line.start) {
            let candidate = Segment::new(pin, snapped.end);
            if self.axis_aligned(&candidate) {
                snapped = candidate;
            }
        }
        if let Some(pin) = nearest(line.end) {
            let candidate = Segment::new(snapped.start, pin);
            if self.axis_aligned(&candidate) {
                snapped = candidate;
            }
        }
        if snapped == line {
            return Ok(false);
        }
        tracing::debug!("Snapping net {} to pins", net);
        let edit = EditNet::from_scene(doc, net, snapped)?;
        history.push(DesignerCommand::EditNet(edit), doc)?;
        Ok(true)
    }

    fn axis_aligned(&self, line: &Segment) -> bool {
        use crate::model::geometry::Orientation;
        matches!(
            line.orientation(self.tolerance),
            Orientation::Horizontal | Orientation::Vertical
        )
    }

    /// Delete junction dots that fewer than three arms reach. Returns the
    /// number removed.
    pub fn prune_dots(&self, doc: &mut Document, history: &mut CommandHistory) -> DesignerResult<usize> {
        let stale: Vec<ItemId> = doc
            .junction_dots()
            .into_iter()
            .filter(|d| {
                doc.dot_position(*d)
                    .is_some_and(|p| self.arms_at(doc, p, &[]) < 3)
            })
            .collect();
        let count = stale.len();
        if count > 0 {
            tracing::debug!("Pruning {} stale junction dots", count);
        }
        self.delete(doc, history, stale)?;
        Ok(count)
    }

    /// Snap, merge and split around `net`. Returns the nets that now stand
    /// for it. Callers wrap this in one macro.
    pub fn resolve(
        &self,
        doc: &mut Document,
        history: &mut CommandHistory,
        net: ItemId,
    ) -> DesignerResult<Vec<ItemId>> {
        if !doc.get(net).ok_or(StructuralError::not_found(net))?.is_net() {
            return Err(DesignerError::NotANet(net));
        }
        let pins = doc.pins();
        if !pins.is_empty() {
            self.snap_to_pins(doc, history, net, &pins)?;
        }

        // A grown net can reach nets that did not touch it before.
        let mut survivor = net;
        loop {
            let before = doc.scene_line(survivor);
            let candidates = self.candidates(doc, survivor);
            match self.merge_nets(doc, history, survivor, &candidates)? {
                None => return Ok(Vec::new()),
                Some(s) if s == survivor && doc.scene_line(s) == before => break,
                Some(s) => survivor = s,
            }
        }

        let candidates = self.candidates(doc, survivor);
        self.split_nets(doc, history, survivor, &candidates)
    }

    /// Resolve every top-level net, then drop stale dots.
    pub fn resolve_all(&self, doc: &mut Document, history: &mut CommandHistory) -> DesignerResult<()> {
        for net in doc.nets() {
            if doc.contains(net) {
                self.resolve(doc, history, net)?;
            }
        }
        self.prune_dots(doc, history)?;
        Ok(())
    }
}
