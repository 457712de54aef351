#![forbid(unsafe_code)]

//! Building layout descriptions.
//!
//! A [`LayoutDescription`] is an ordered list of [`Constraint`]s plus the set
//! of boxes they place. It is built with [`constrain`], whose body receives a
//! [`ConstraintScope`] and one [`BoxProxy`] per child. Proxies only produce
//! symbolic [`AttrRef`]s; assignments go through [`ConstraintScope::set`].
//!
//! Descriptions are rebuilt wholesale when the structure of a container
//! changes; they are never patched in place.

use std::fmt;

use tracing::debug;

use crate::expr::{AttrRef, Attribute, BoxId, Expr, Param};

/// `target = expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub target: AttrRef,
    pub expr: Expr,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.target, self.expr)
    }
}

/// Symbolic handle to a box inside a [`constrain`] body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxProxy {
    id: BoxId,
}

impl BoxProxy {
    #[must_use]
    pub const fn id(self) -> BoxId {
        self.id
    }

    #[must_use]
    pub const fn attr(self, attribute: Attribute) -> AttrRef {
        AttrRef::new(self.id, attribute)
    }

    #[must_use]
    pub const fn top(self) -> AttrRef {
        self.attr(Attribute::Top)
    }

    #[must_use]
    pub const fn left(self) -> AttrRef {
        self.attr(Attribute::Left)
    }

    #[must_use]
    pub const fn right(self) -> AttrRef {
        self.attr(Attribute::Right)
    }

    #[must_use]
    pub const fn bottom(self) -> AttrRef {
        self.attr(Attribute::Bottom)
    }

    #[must_use]
    pub const fn width(self) -> AttrRef {
        self.attr(Attribute::Width)
    }

    #[must_use]
    pub const fn height(self) -> AttrRef {
        self.attr(Attribute::Height)
    }

    #[must_use]
    pub const fn center_x(self) -> AttrRef {
        self.attr(Attribute::CenterX)
    }

    #[must_use]
    pub const fn center_y(self) -> AttrRef {
        self.attr(Attribute::CenterY)
    }
}

/// Recording scope passed to a [`constrain`] body.
pub struct ConstraintScope<'a> {
    description: &'a mut LayoutDescription,
}

impl ConstraintScope<'_> {
    /// Proxy for the container itself.
    #[must_use]
    pub const fn parent(&self) -> BoxProxy {
        BoxProxy { id: BoxId::PARENT }
    }

    /// Record `target = value`.
    ///
    /// A later assignment to the same target replaces the earlier one.
    /// The parent's attributes are inputs and cannot be assigned.
    pub fn set(&mut self, target: AttrRef, value: impl Into<Expr>) {
        if target.box_id.is_parent() {
            debug!(%target, "ignoring constraint on parent attribute");
            return;
        }
        let constraint = Constraint {
            target,
            expr: value.into(),
        };
        let constraints = &mut self.description.constraints;
        if let Some(existing) = constraints.iter_mut().find(|c| c.target == target) {
            debug!(%target, "constraint replaced");
            *existing = constraint;
        } else {
            constraints.push(constraint);
        }
        self.description.add_box(target.box_id);
    }
}

/// Constraints plus the boxes they place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutDescription {
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) boxes: Vec<BoxId>,
}

impl LayoutDescription {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add constraints for `boxes` to this description.
    ///
    /// Constraints recorded here may read attributes of any box already in
    /// the description, which is how a divider is positioned relative to an
    /// already-constrained first item.
    pub fn constrain<const N: usize>(
        &mut self,
        boxes: [BoxId; N],
        body: impl FnOnce(&mut ConstraintScope<'_>, [BoxProxy; N]),
    ) -> &mut Self {
        for id in boxes {
            self.add_box(id);
        }
        let before = self.constraints.len();
        let proxies = boxes.map(|id| BoxProxy { id });
        body(&mut ConstraintScope { description: self }, proxies);
        debug!(
            boxes = N,
            added = self.constraints.len().saturating_sub(before),
            total = self.constraints.len(),
            "layout description built"
        );
        self
    }

    /// Constraints in declaration order.
    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Child boxes placed by this description, in first-mention order.
    #[must_use]
    pub fn boxes(&self) -> &[BoxId] {
        &self.boxes
    }

    #[must_use]
    pub fn contains_box(&self, id: BoxId) -> bool {
        id.is_parent() || self.boxes.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    fn add_box(&mut self, id: BoxId) {
        if !id.is_parent() && !self.boxes.contains(&id) {
            self.boxes.push(id);
        }
    }
}

impl fmt::Display for LayoutDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for constraint in &self.constraints {
            writeln!(f, "{constraint}")?;
        }
        Ok(())
    }
}

/// Build a new description for `boxes`.
pub fn constrain<const N: usize>(
    boxes: [BoxId; N],
    body: impl FnOnce(&mut ConstraintScope<'_>, [BoxProxy; N]),
) -> LayoutDescription {
    let mut description = LayoutDescription::new();
    description.constrain(boxes, body);
    description
}

/// Pin all four edges of `child` to the parent's content box.
///
/// The content box is the parent inset by [`Param::InsetTop`] and friends,
/// so with zero insets the child matches the parent exactly.
pub fn fill(scope: &mut ConstraintScope<'_>, child: BoxProxy) {
    let parent = scope.parent();
    scope.set(child.top(), parent.top() + Param::InsetTop);
    scope.set(child.left(), parent.left() + Param::InsetLeft);
    scope.set(child.right(), parent.right() - Param::InsetRight);
    scope.set(child.bottom(), parent.bottom() - Param::InsetBottom);
}
