#![forbid(unsafe_code)]

//! Keyboard focus.
//!
//! [`FocusManager`] is the seam widgets talk to; [`FocusCycle`] is a flat
//! implementation that walks registered views in `(tab_index, id)` order.
//!
//! # Invariants
//!
//! - The focus owner, when present, is registered and focusable.
//! - Forward and backward traversal wrap around the ends of the cycle.
//! - Views that are not focusable, not visible, or disabled are skipped.
//! - `focus_changed` fires only when the owner actually changes.

use rustc_hash::FxHashMap;
use sprig_core::logging::trace;
use sprig_core::observers::PropertyObservers;
use sprig_core::ordered_set::OrderedSet;

use crate::view::{View, ViewId};

/// Tracks which view owns keyboard focus.
pub trait FocusManager {
    fn focus_owner(&self) -> Option<ViewId>;

    /// Whether `view` can currently take focus.
    fn focusable(&self, view: ViewId) -> bool;

    /// Give focus to `view`. Returns `false` if it cannot take focus.
    fn request_focus(&mut self, view: ViewId) -> bool;

    fn clear_focus(&mut self);

    /// Move focus to the next focusable view after the owner.
    fn move_focus_forward(&mut self) -> Option<ViewId> {
        match self.focus_owner() {
            Some(owner) => self.move_focus_forward_from(owner),
            None => self.move_focus_to_default(),
        }
    }

    fn move_focus_forward_from(&mut self, from: ViewId) -> Option<ViewId>;

    /// Move focus to the previous focusable view before the owner.
    fn move_focus_backward(&mut self) -> Option<ViewId> {
        match self.focus_owner() {
            Some(owner) => self.move_focus_backward_from(owner),
            None => self.move_focus_to_default(),
        }
    }

    fn move_focus_backward_from(&mut self, from: ViewId) -> Option<ViewId>;

    /// Focus the first focusable view in traversal order.
    fn move_focus_to_default(&mut self) -> Option<ViewId>;

    /// Observers of `(old owner, new owner)`.
    fn focus_changed(&self) -> &PropertyObservers<Self, Option<ViewId>>
    where
        Self: Sized;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FocusEntry {
    tab_index: i32,
    focusable: bool,
    visible: bool,
    enabled: bool,
}

impl FocusEntry {
    const fn accepts_focus(self) -> bool {
        self.focusable && self.visible && self.enabled
    }
}

/// Flat tab-order focus cycle.
///
/// ```
/// use sprig_widgets::{FocusCycle, FocusManager, View};
///
/// let a = View::new().focusable(true).tab_index(1);
/// let b = View::new().focusable(true).tab_index(2);
/// let mut focus = FocusCycle::new();
/// focus.register(&a);
/// focus.register(&b);
///
/// assert_eq!(focus.move_focus_forward(), Some(a.id()));
/// assert_eq!(focus.move_focus_forward(), Some(b.id()));
/// assert_eq!(focus.move_focus_forward(), Some(a.id()));
/// ```
#[derive(Debug, Default)]
pub struct FocusCycle {
    order: OrderedSet<(i32, ViewId)>,
    entries: FxHashMap<ViewId, FocusEntry>,
    owner: Option<ViewId>,
    focus_changed: PropertyObservers<FocusCycle, Option<ViewId>>,
}

impl FocusCycle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `view`, or refresh its snapshot if already registered.
    ///
    /// Returns `true` if the view was new. If the owner stops accepting
    /// focus, focus is cleared.
    pub fn register(&mut self, view: &View) -> bool {
        let entry = FocusEntry {
            tab_index: view.tab(),
            focusable: view.is_focusable(),
            visible: view.is_visible(),
            enabled: view.is_enabled(),
        };
        let id = view.id();
        let previous = self.entries.insert(id, entry);
        if let Some(previous) = previous {
            self.order.remove(&(previous.tab_index, id));
        }
        self.order.insert((entry.tab_index, id));
        if self.owner == Some(id) && !entry.accepts_focus() {
            self.set_owner(None);
        }
        previous.is_none()
    }

    /// Remove `view`; clears focus if it was the owner.
    pub fn unregister(&mut self, view: ViewId) -> bool {
        let Some(entry) = self.entries.remove(&view) else {
            return false;
        };
        self.order.remove(&(entry.tab_index, view));
        if self.owner == Some(view) {
            self.set_owner(None);
        }
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered views in traversal order.
    pub fn views(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.order.iter().map(|&(_, id)| id)
    }

    fn set_owner(&mut self, owner: Option<ViewId>) {
        if owner == self.owner {
            return;
        }
        let old = std::mem::replace(&mut self.owner, owner);
        trace!(?old, new = ?owner, "focus changed");
        self.focus_changed.notify(self, &old, &owner);
    }

    /// Next focusable view from `from` in the given direction, wrapping.
    ///
    /// An unregistered `from` starts at the corresponding end of the cycle.
    fn candidate(&self, from: Option<ViewId>, forward: bool) -> Option<ViewId> {
        let start = from.and_then(|id| self.entries.get(&id).map(|e| (e.tab_index, id)));
        let mut key = start;
        for _ in 0..self.order.len() {
            let next = match (key, forward) {
                (Some(k), true) => self.order.next_after(&k).or_else(|| self.order.first()),
                (Some(k), false) => self.order.prev_before(&k).or_else(|| self.order.last()),
                (None, true) => self.order.first(),
                (None, false) => self.order.last(),
            }
            .copied()?;
            if Some(next) == start {
                break;
            }
            if self.focusable(next.1) {
                return Some(next.1);
            }
            key = Some(next);
        }
        None
    }

    fn move_to(&mut self, target: Option<ViewId>) -> Option<ViewId> {
        if let Some(target) = target {
            self.set_owner(Some(target));
        }
        self.owner
    }
}

impl FocusManager for FocusCycle {
    fn focus_owner(&self) -> Option<ViewId> {
        self.owner
    }

    fn focusable(&self, view: ViewId) -> bool {
        self.entries.get(&view).is_some_and(|e| e.accepts_focus())
    }

    fn request_focus(&mut self, view: ViewId) -> bool {
        if !self.focusable(view) {
            return false;
        }
        self.set_owner(Some(view));
        true
    }

    fn clear_focus(&mut self) {
        self.set_owner(None);
    }

    fn move_focus_forward_from(&mut self, from: ViewId) -> Option<ViewId> {
        let target = self.candidate(Some(from), true);
        self.move_to(target)
    }

    fn move_focus_backward_from(&mut self, from: ViewId) -> Option<ViewId> {
        let target = self.candidate(Some(from), false);
        self.move_to(target)
    }

    fn move_focus_to_default(&mut self) -> Option<ViewId> {
        let target = self.candidate(None, true);
        self.move_to(target)
    }

    fn focus_changed(&self) -> &PropertyObservers<Self, Option<ViewId>> {
        &self.focus_changed
    }
}
