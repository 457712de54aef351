#![forbid(unsafe_code)]

//! Resolving a description into concrete bounds.
//!
//! # Algorithm
//!
//! 1. Seed all eight attributes of the parent from its bounds.
//! 2. Repeat until nothing changes:
//!    - evaluate every pending constraint whose inputs are all known;
//!    - for every child box, derive missing attributes of an axis from any
//!      two known ones (`left + width → right`, `center + edge → size`, ...),
//!      but only once no pending constraint targets that axis;
//!    - when a pass makes no progress, complete an axis pinned by exactly one
//!      attribute with the box's current size from the [`ParamSource`].
//! 3. Fail if any constraint is still pending or any box lacks an edge.
//!
//! An over-determined axis therefore takes its edges from the constraints,
//! with later declarations winning, and nothing reads a derived value that
//! a constraint overwrites afterwards.
//!
//! Each productive pass settles at least one attribute, so the loop is
//! bounded by the number of child attributes; the explicit pass limit only
//! guards against a logic error.
//!
//! # Failure Modes
//!
//! - Pending constraints that reach each other are reported as
//!   [`LayoutError::Cycle`] with the offending path.
//! - A constraint that reads an attribute nothing determines is reported as
//!   [`LayoutError::Unresolved`] for that attribute.

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use sprig_core::geometry::Rect;
use tracing::{trace, trace_span, warn};

use crate::description::{Constraint, LayoutDescription};
use crate::error::LayoutError;
use crate::expr::{AttrRef, Attribute, Axis, BoxId, ParamSource};

/// Resolved bounds for every child box of a description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolvedLayout {
    rects: BTreeMap<BoxId, Rect>,
}

impl SolvedLayout {
    /// Bounds of `id`, if it was placed.
    #[must_use]
    pub fn get(&self, id: BoxId) -> Option<Rect> {
        self.rects.get(&id).copied()
    }

    /// Iterate `(box, bounds)` in box id order.
    pub fn iter(&self) -> impl Iterator<Item = (BoxId, Rect)> + '_ {
        self.rects.iter().map(|(id, rect)| (*id, *rect))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

impl LayoutDescription {
    /// Resolve every child box against `parent` and the live `params`.
    ///
    /// `parent` is the container in the coordinate space the children are
    /// expressed in (usually its own, with origin at zero).
    pub fn resolve(
        &self,
        parent: Rect,
        params: &dyn ParamSource,
    ) -> Result<SolvedLayout, LayoutError> {
        let _span = trace_span!("layout.resolve", constraints = self.constraints.len()).entered();
        let result = Resolver::new(self, params).run(parent);
        if let Err(err) = &result {
            warn!(%err, "layout resolution failed");
        }
        result
    }
}

/// The four attributes of one axis: (start, end, size, center).
const fn axis_attributes(axis: Axis) -> [Attribute; 4] {
    match axis {
        Axis::X => [Attribute::Left, Attribute::Right, Attribute::Width, Attribute::CenterX],
        Axis::Y => [Attribute::Top, Attribute::Bottom, Attribute::Height, Attribute::CenterY],
    }
}

fn parent_value(parent: Rect, attribute: Attribute) -> f64 {
    match attribute {
        Attribute::Top => parent.top(),
        Attribute::Left => parent.left(),
        Attribute::Right => parent.right(),
        Attribute::Bottom => parent.bottom(),
        Attribute::Width => parent.width,
        Attribute::Height => parent.height,
        Attribute::CenterX => parent.center_x(),
        Attribute::CenterY => parent.center_y(),
    }
}

struct Resolver<'a> {
    description: &'a LayoutDescription,
    params: &'a dyn ParamSource,
    known: FxHashMap<AttrRef, f64>,
    pending: Vec<&'a Constraint>,
}

impl<'a> Resolver<'a> {
    fn new(description: &'a LayoutDescription, params: &'a dyn ParamSource) -> Self {
        Self {
            description,
            params,
            known: FxHashMap::default(),
            pending: description.constraints.iter().collect(),
        }
    }

    fn run(mut self, parent: Rect) -> Result<SolvedLayout, LayoutError> {
        self.check_references()?;

        for attribute in Attribute::ALL {
            self.known.insert(
                AttrRef::new(BoxId::PARENT, attribute),
                parent_value(parent, attribute),
            );
        }

        let description = self.description;
        let max_passes = self.pending.len() + 8 * description.boxes.len() + 1;
        for pass in 0..max_passes {
            let mut progress = self.evaluate_pending()?;
            for &id in &description.boxes {
                progress |= self.derive(id, Axis::X);
                progress |= self.derive(id, Axis::Y);
            }
            if !progress {
                progress = self.apply_size_fallback();
            }
            trace!(pass, pending = self.pending.len(), progress, "resolver pass");
            if !progress {
                break;
            }
        }

        if !self.pending.is_empty() {
            return Err(self.diagnose_pending());
        }
        self.collect()
    }

    fn check_references(&self) -> Result<(), LayoutError> {
        for constraint in &self.description.constraints {
            for dep in constraint.expr.dependencies() {
                if !self.description.contains_box(dep.box_id) {
                    return Err(LayoutError::UnknownBox { box_id: dep.box_id });
                }
            }
        }
        Ok(())
    }

    /// Evaluate every pending constraint whose inputs are known.
    fn evaluate_pending(&mut self) -> Result<bool, LayoutError> {
        let mut progress = false;
        let mut i = 0;
        while i < self.pending.len() {
            let constraint = self.pending[i];
            let known = &self.known;
            let lookup = |attr: AttrRef| known.get(&attr).copied();
            match constraint.expr.eval(&lookup, self.params, constraint.target)? {
                Some(value) => {
                    if !value.is_finite() {
                        return Err(LayoutError::NonFinite {
                            target: constraint.target,
                            value,
                        });
                    }
                    self.known.insert(constraint.target, value);
                    self.pending.remove(i);
                    progress = true;
                }
                None => i += 1,
            }
        }
        Ok(progress)
    }

    fn get(&self, id: BoxId, attribute: Attribute) -> Option<f64> {
        self.known.get(&AttrRef::new(id, attribute)).copied()
    }

    fn axis_targeted(&self, id: BoxId, axis: Axis) -> bool {
        self.pending
            .iter()
            .any(|c| c.target.box_id == id && c.target.attribute.axis() == axis)
    }

    /// Fill in whatever follows from two known attributes on `axis`.
    fn derive(&mut self, id: BoxId, axis: Axis) -> bool {
        if self.axis_targeted(id, axis) {
            return false;
        }
        let [start_attr, end_attr, size_attr, center_attr] = axis_attributes(axis);
        let start = self.get(id, start_attr);
        let end = self.get(id, end_attr);
        let size = self.get(id, size_attr);
        let center = self.get(id, center_attr);

        let (start, end) = match (start, end, size, center) {
            (Some(s), Some(e), _, _) => (s, e),
            (Some(s), None, Some(z), _) => (s, s + z),
            (None, Some(e), Some(z), _) => (e - z, e),
            (None, None, Some(z), Some(c)) => (c - z / 2.0, c + z / 2.0),
            (Some(s), None, None, Some(c)) => (s, 2.0 * c - s),
            (None, Some(e), None, Some(c)) => (2.0 * c - e, e),
            _ => return false,
        };

        let mut progress = false;
        for (attribute, value) in [
            (start_attr, start),
            (end_attr, end),
            (size_attr, end - start),
            (center_attr, start + (end - start) / 2.0),
        ] {
            let key = AttrRef::new(id, attribute);
            if !self.known.contains_key(&key) {
                self.known.insert(key, value);
                progress = true;
            }
        }
        progress
    }

    /// Complete axes pinned by a single attribute with the box's current size.
    fn apply_size_fallback(&mut self) -> bool {
        let description = self.description;
        let mut progress = false;
        for &id in &description.boxes {
            for axis in [Axis::X, Axis::Y] {
                let attrs = axis_attributes(axis);
                let known_count = attrs.iter().filter(|a| self.get(id, **a).is_some()).count();
                if known_count != 1 || self.axis_targeted(id, axis) {
                    continue;
                }
                let Some(size) = self.params.current_size(id) else {
                    continue;
                };
                let extent = match axis {
                    Axis::X => size.width,
                    Axis::Y => size.height,
                };
                let key = AttrRef::new(id, attrs[2]);
                if self.known.contains_key(&key) {
                    continue;
                }
                trace!(box_id = %id, ?axis, extent, "using current size");
                self.known.insert(key, extent);
                progress = true;
            }
        }
        progress
    }

    /// Explain why constraints are still pending: a cycle, or a missing input.
    fn diagnose_pending(&self) -> LayoutError {
        let targets: FxHashSet<AttrRef> = self.pending.iter().map(|c| c.target).collect();

        // Edges from a pending target to the pending targets it waits on.
        // Waiting on a derived attribute means waiting on every pending
        // target of the same box and axis.
        let mut edges: FxHashMap<AttrRef, Vec<AttrRef>> = FxHashMap::default();
        let mut missing: Option<AttrRef> = None;
        for constraint in &self.pending {
            let mut waits = Vec::new();
            for dep in constraint.expr.dependencies() {
                if self.known.contains_key(&dep) {
                    continue;
                }
                if targets.contains(&dep) {
                    waits.push(dep);
                    continue;
                }
                let related: Vec<AttrRef> = self
                    .pending
                    .iter()
                    .map(|c| c.target)
                    .filter(|t| t.box_id == dep.box_id && t.attribute.axis() == dep.attribute.axis())
                    .collect();
                if related.is_empty() {
                    missing.get_or_insert(dep);
                }
                waits.extend(related);
            }
            edges.insert(constraint.target, waits);
        }

        if let Some(path) = find_cycle(&self.pending, &edges) {
            return LayoutError::Cycle { path };
        }
        let attr = missing.unwrap_or(self.pending[0].target);
        LayoutError::Unresolved {
            box_id: attr.box_id,
            attribute: attr.attribute,
        }
    }

    fn collect(&self) -> Result<SolvedLayout, LayoutError> {
        let mut rects = BTreeMap::new();
        for &id in &self.description.boxes {
            let mut edges = [0.0; 4];
            for (slot, attribute) in
                [Attribute::Left, Attribute::Top, Attribute::Right, Attribute::Bottom]
                    .into_iter()
                    .enumerate()
            {
                let Some(value) = self.get(id, attribute) else {
                    return Err(LayoutError::Unresolved {
                        box_id: id,
                        attribute,
                    });
                };
                if !value.is_finite() {
                    return Err(LayoutError::NonFinite {
                        target: AttrRef::new(id, attribute),
                        value,
                    });
                }
                edges[slot] = value;
            }
            let [left, top, right, bottom] = edges;
            rects.insert(id, Rect::from_edges(left, top, right, bottom));
        }
        Ok(SolvedLayout { rects })
    }
}

/// DFS with three-colour marking; returns the first cycle found as a path
/// that starts and ends at the same attribute.
fn find_cycle(
    pending: &[&Constraint],
    edges: &FxHashMap<AttrRef, Vec<AttrRef>>,
) -> Option<Vec<AttrRef>> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Visiting,
        Done,
    }

    let mut marks: FxHashMap<AttrRef, Mark> = FxHashMap::default();
    for start in pending.iter().map(|c| c.target) {
        if marks.contains_key(&start) {
            continue;
        }
        // (node, next edge index)
        let mut stack: Vec<(AttrRef, usize)> = vec![(start, 0)];
        marks.insert(start, Mark::Visiting);
        while let Some(top) = stack.last_mut() {
            let (node, index) = *top;
            top.1 += 1;
            let successors = edges.get(&node).map_or(&[][..], Vec::as_slice);
            if let Some(&succ) = successors.get(index) {
                match marks.get(&succ) {
                    Some(Mark::Visiting) => {
                        let from = stack.iter().position(|(n, _)| *n == succ).unwrap_or(0);
                        let mut path: Vec<AttrRef> = stack[from..].iter().map(|(n, _)| *n).collect();
                        path.push(succ);
                        return Some(path);
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(succ, Mark::Visiting);
                        stack.push((succ, 0));
                    }
                }
            } else {
                marks.insert(node, Mark::Done);
                stack.pop();
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{constrain, fill};
    use crate::expr::{Param, Params};
    use sprig_core::geometry::{Insets, Size};

    const A: BoxId = BoxId::new(1);
    const B: BoxId = BoxId::new(2);

    #[test]
    fn fill_matches_parent() {
        let layout = constrain([A], |c, [a]| fill(c, a));
        let solved = layout
            .resolve(Rect::from_size(300.0, 100.0), &Params::default())
            .unwrap();
        assert_eq!(solved.get(A), Some(Rect::from_size(300.0, 100.0)));
        assert_eq!(solved.len(), 1);
    }

    #[test]
    fn fill_applies_insets() {
        let layout = constrain([A], |c, [a]| fill(c, a));
        let params = Params {
            insets: Insets::new(1.0, 2.0, 3.0, 4.0),
            ..Params::default()
        };
        let solved = layout.resolve(Rect::from_size(100.0, 50.0), &params).unwrap();
        assert_eq!(solved.get(A), Some(Rect::new(2.0, 1.0, 94.0, 46.0)));
    }

    #[test]
    fn resolution_rereads_params() {
        let layout = constrain([A], |c, [a]| {
            let parent = c.parent();
            c.set(a.top(), parent.top());
            c.set(a.bottom(), parent.bottom());
            c.set(a.left(), parent.left());
            c.set(a.width(), parent.width() * Param::Ratio);
        });
        let area = Rect::from_size(200.0, 10.0);
        let half = layout.resolve(area, &Params::default()).unwrap();
        let quarter = layout
            .resolve(area, &Params { ratio: 0.25, ..Params::default() })
            .unwrap();
        assert_eq!(half.get(A).map(|r| r.width), Some(100.0));
        assert_eq!(quarter.get(A).map(|r| r.width), Some(50.0));
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let layout = constrain([A, B], |c, [a, b]| {
            let parent = c.parent();
            c.set(b.left(), a.right());
            c.set(b.right(), parent.right());
            c.set(b.top(), a.top());
            c.set(b.bottom(), a.bottom());
            c.set(a.right(), a.left() + 40.0);
            c.set(a.left(), parent.left());
            c.set(a.top(), parent.top());
            c.set(a.height(), 20.0);
        });
        let solved = layout
            .resolve(Rect::from_size(100.0, 50.0), &Params::default())
            .unwrap();
        assert_eq!(solved.get(A), Some(Rect::new(0.0, 0.0, 40.0, 20.0)));
        assert_eq!(solved.get(B), Some(Rect::new(40.0, 0.0, 60.0, 20.0)));
    }

    #[test]
    fn dependents_never_see_a_value_a_constraint_replaces() {
        const C: BoxId = BoxId::new(3);
        let layout = constrain([A, B, C], |c, [a, b, cc]| {
            let parent = c.parent();
            for bx in [a, b, cc] {
                c.set(bx.top(), parent.top());
                c.set(bx.height(), 10.0);
            }
            c.set(a.left(), parent.left());
            c.set(a.width(), 40.0);
            c.set(b.left(), parent.left());
            c.set(b.width(), 70.0);
            c.set(cc.left(), a.right());
            c.set(cc.right(), parent.right());
            // Over-determines a's x axis; only known once b is derived.
            c.set(a.right(), b.right());
        });
        let solved = layout
            .resolve(Rect::from_size(100.0, 10.0), &Params::default())
            .unwrap();
        assert_eq!(solved.get(A), Some(Rect::new(0.0, 0.0, 70.0, 10.0)));
        assert_eq!(solved.get(C), Some(Rect::new(70.0, 0.0, 30.0, 10.0)));
    }

    #[test]
    fn center_and_current_size() {
        struct WithSize;
        impl ParamSource for WithSize {
            fn param(&self, _: Param) -> f64 {
                0.0
            }
            fn current_size(&self, _: BoxId) -> Option<Size> {
                Some(Size::new(10.0, 999.0))
            }
        }

        let layout = constrain([A], |c, [a]| {
            let parent = c.parent();
            c.set(a.top(), parent.top());
            c.set(a.bottom(), parent.bottom());
            c.set(a.center_x(), parent.center_x());
        });
        let solved = layout.resolve(Rect::from_size(300.0, 100.0), &WithSize).unwrap();
        assert_eq!(solved.get(A), Some(Rect::new(145.0, 0.0, 10.0, 100.0)));
    }

    #[test]
    fn missing_axis_is_unresolved() {
        let layout = constrain([A], |c, [a]| {
            let parent = c.parent();
            c.set(a.top(), parent.top());
            c.set(a.bottom(), parent.bottom());
            c.set(a.left(), parent.left());
        });
        let err = layout
            .resolve(Rect::from_size(10.0, 10.0), &Params::default())
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::Unresolved {
                box_id: A,
                attribute: Attribute::Right
            }
        );
    }

    #[test]
    fn cycle_is_reported_not_looped() {
        let layout = constrain([A, B], |c, [a, b]| {
            let parent = c.parent();
            c.set(a.top(), parent.top());
            c.set(a.bottom(), parent.bottom());
            c.set(b.top(), parent.top());
            c.set(b.bottom(), parent.bottom());
            c.set(a.left(), b.right());
            c.set(b.right(), a.left() + 1.0);
            c.set(a.right(), parent.right());
            c.set(b.left(), parent.left());
        });
        let err = layout
            .resolve(Rect::from_size(10.0, 10.0), &Params::default())
            .unwrap_err();
        let LayoutError::Cycle { path } = err else {
            panic!("expected cycle, got {err:?}");
        };
        assert_eq!(path.first(), path.last());
        assert!(path.contains(&AttrRef::new(A, Attribute::Left)));
        assert!(path.contains(&AttrRef::new(B, Attribute::Right)));
    }

    #[test]
    fn cycle_through_derived_attribute() {
        let layout = constrain([A], |c, [a]| {
            let parent = c.parent();
            c.set(a.top(), parent.top());
            c.set(a.bottom(), parent.bottom());
            c.set(a.left(), parent.left());
            c.set(a.right(), a.left() + a.width());
        });
        let err = layout
            .resolve(Rect::from_size(10.0, 10.0), &Params::default())
            .unwrap_err();
        assert!(matches!(err, LayoutError::Cycle { .. }), "got {err:?}");
    }

    #[test]
    fn division_by_zero_surfaces() {
        let layout = constrain([A], |c, [a]| {
            fill(c, a);
            c.set(a.right(), c.parent().width() / Param::PanelSpacing);
        });
        let err = layout
            .resolve(Rect::from_size(10.0, 10.0), &Params::default())
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::DivisionByZero {
                target: AttrRef::new(A, Attribute::Right)
            }
        );
    }

    #[test]
    fn unknown_box_is_rejected() {
        let stranger = BoxId::new(99);
        let layout = constrain([A], |c, [a]| {
            fill(c, a);
            c.set(a.top(), AttrRef::new(stranger, Attribute::Bottom));
        });
        let err = layout
            .resolve(Rect::from_size(10.0, 10.0), &Params::default())
            .unwrap_err();
        assert_eq!(err, LayoutError::UnknownBox { box_id: stranger });
    }

    #[test]
    fn empty_description_resolves_to_nothing() {
        let solved = LayoutDescription::new()
            .resolve(Rect::from_size(10.0, 10.0), &Params::default())
            .unwrap();
        assert!(solved.is_empty());
    }

    #[test]
    fn solved_layout_serializes() {
        let layout = constrain([A], |c, [a]| fill(c, a));
        let solved = layout
            .resolve(Rect::from_size(4.0, 2.0), &Params::default())
            .unwrap();
        let json = serde_json::to_string(&solved).unwrap();
        let back: SolvedLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(back, solved);
    }
}
