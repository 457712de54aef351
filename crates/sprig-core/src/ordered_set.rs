#![forbid(unsafe_code)]

//! Ordered set backed by an unbalanced binary search tree.
//!
//! # Design
//!
//! Nodes live in a slot arena (`Vec<Slot<E>>`) and refer to their children by
//! index. Every node is linked from exactly one place (the root link or one
//! parent's `left`/`right`), so the tree stays acyclic and ownership is strictly
//! hierarchical even though the storage is flat. Freed slots are recycled
//! through an intrusive free list.
//!
//! All descents are iterative, so a degenerate tree cannot overflow the stack.
//!
//! ### Complexity
//!
//! | Operation  | Average      | Worst (degenerate) |
//! |------------|--------------|--------------------|
//! | `insert`   | O(log n)     | O(n)               |
//! | `remove`   | O(log n)     | O(n)               |
//! | `contains` | O(log n)     | O(n)               |
//! | `iter`     | O(n) total   | O(n) total         |
//!
//! # Known limitation: no rebalancing
//!
//! The tree is never rebalanced. Inserting elements in sorted (or reverse
//! sorted) order produces a linked list of depth `n`, and every operation
//! becomes linear. Callers that insert adversarial orders and need balanced
//! guarantees should shuffle their input first.
//!
//! # Invariants
//!
//! 1. For every node, elements in the left subtree compare `Less` and elements
//!    in the right subtree compare `Greater` than the node's element.
//! 2. `len()` equals the number of nodes reachable from the root.
//! 3. No two elements compare `Equal`.
//! 4. Iteration is in-order, i.e. strictly ascending.

use std::cmp::Ordering;
use std::fmt;

// ============================================================================
// Comparator
// ============================================================================

/// A total order over `E`.
pub trait Comparator<E> {
    fn compare(&self, a: &E, b: &E) -> Ordering;
}

/// Orders elements by their [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<E: Ord> Comparator<E> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &E, b: &E) -> Ordering {
        a.cmp(b)
    }
}

/// Inverts another comparator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reverse<C>(pub C);

impl<E, C: Comparator<E>> Comparator<E> for Reverse<C> {
    #[inline]
    fn compare(&self, a: &E, b: &E) -> Ordering {
        self.0.compare(b, a)
    }
}

impl<E, F> Comparator<E> for F
where
    F: Fn(&E, &E) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &E, b: &E) -> Ordering {
        self(a, b)
    }
}

// ============================================================================
// Arena
// ============================================================================

/// Index of a node slot in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeIdx(u32);

impl NodeIdx {
    #[inline]
    fn get(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Node<E> {
    value: E,
    left: Option<NodeIdx>,
    right: Option<NodeIdx>,
}

#[derive(Debug, Clone)]
enum Slot<E> {
    Occupied(Node<E>),
    Vacant { next_free: Option<NodeIdx> },
}

/// Where a node is linked from.
#[derive(Debug, Clone, Copy)]
enum Link {
    Root,
    Left(NodeIdx),
    Right(NodeIdx),
}

// ============================================================================
// OrderedSet
// ============================================================================

/// A duplicate-free set that iterates in ascending comparator order.
///
/// See the [module documentation](self) for the rebalancing caveat.
///
/// # Examples
///
/// ```
/// use sprig_core::OrderedSet;
///
/// let mut set = OrderedSet::new();
/// assert!(set.insert(3));
/// assert!(set.insert(1));
/// assert!(!set.insert(3));
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
/// ```
#[derive(Clone)]
pub struct OrderedSet<E, C = NaturalOrder> {
    slots: Vec<Slot<E>>,
    free: Option<NodeIdx>,
    root: Option<NodeIdx>,
    len: usize,
    comparator: C,
}

impl<E: Ord> OrderedSet<E, NaturalOrder> {
    /// Create an empty set ordered by `E: Ord`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<E: Ord> Default for OrderedSet<E, NaturalOrder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, C: Comparator<E>> OrderedSet<E, C> {
    /// Create an empty set ordered by `comparator`.
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            root: None,
            len: 0,
            comparator,
        }
    }

    /// Number of elements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the set holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The comparator this set orders by.
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Insert `element`.
    ///
    /// Returns `false` without touching the set if a comparator-equal element
    /// is already present.
    pub fn insert(&mut self, element: E) -> bool {
        let mut link = Link::Root;
        let mut current = self.root;

        while let Some(idx) = current {
            let node = self.node(idx);
            match self.comparator.compare(&element, &node.value) {
                Ordering::Less => {
                    link = Link::Left(idx);
                    current = node.left;
                }
                Ordering::Greater => {
                    link = Link::Right(idx);
                    current = node.right;
                }
                Ordering::Equal => return false,
            }
        }

        let idx = self.alloc(element);
        self.set_link(link, Some(idx));
        self.len += 1;
        true
    }

    /// Remove the element comparator-equal to `element`.
    ///
    /// Returns `false` if no such element exists.
    pub fn remove(&mut self, element: &E) -> bool {
        self.take(element).is_some()
    }

    /// Remove and return the element comparator-equal to `element`.
    pub fn take(&mut self, element: &E) -> Option<E> {
        let (link, idx) = self.find(element)?;
        Some(self.unlink(link, idx))
    }

    /// True if a comparator-equal element is present.
    #[must_use]
    pub fn contains(&self, element: &E) -> bool {
        self.find(element).is_some()
    }

    /// Return the stored element comparator-equal to `element`.
    #[must_use]
    pub fn get(&self, element: &E) -> Option<&E> {
        self.find(element).map(|(_, idx)| &self.node(idx).value)
    }

    /// Smallest element.
    #[must_use]
    pub fn first(&self) -> Option<&E> {
        let mut idx = self.root?;
        while let Some(left) = self.node(idx).left {
            idx = left;
        }
        Some(&self.node(idx).value)
    }

    /// Largest element.
    #[must_use]
    pub fn last(&self) -> Option<&E> {
        let mut idx = self.root?;
        while let Some(right) = self.node(idx).right {
            idx = right;
        }
        Some(&self.node(idx).value)
    }

    /// Smallest element strictly greater than `element`.
    #[must_use]
    pub fn next_after(&self, element: &E) -> Option<&E> {
        let mut best = None;
        let mut current = self.root;
        while let Some(idx) = current {
            let node = self.node(idx);
            if self.comparator.compare(&node.value, element) == Ordering::Greater {
                best = Some(&node.value);
                current = node.left;
            } else {
                current = node.right;
            }
        }
        best
    }

    /// Largest element strictly less than `element`.
    #[must_use]
    pub fn prev_before(&self, element: &E) -> Option<&E> {
        let mut best = None;
        let mut current = self.root;
        while let Some(idx) = current {
            let node = self.node(idx);
            if self.comparator.compare(&node.value, element) == Ordering::Less {
                best = Some(&node.value);
                current = node.right;
            } else {
                current = node.left;
            }
        }
        best
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.root = None;
        self.len = 0;
    }

    /// Height of the tree (0 when empty). Useful for spotting degenerate input.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeIdx, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((idx, level)) = stack.pop() {
            deepest = deepest.max(level);
            let node = self.node(idx);
            stack.extend(node.left.map(|l| (l, level + 1)));
            stack.extend(node.right.map(|r| (r, level + 1)));
        }
        deepest
    }

    /// Lazy ascending iterator. Call again to restart.
    pub fn iter(&self) -> Iter<'_, E, C> {
        let mut iter = Iter {
            set: self,
            stack: Vec::new(),
            remaining: self.len,
        };
        iter.push_left_path(self.root);
        iter
    }

    /// Ascending traversal that can remove the element it just yielded.
    pub fn cursor(&mut self) -> Cursor<'_, E, C> {
        let mut stack = Vec::new();
        push_left_path(&self.slots, &mut stack, self.root);
        Cursor {
            set: self,
            stack,
            current: None,
        }
    }

    /// Keep only the elements for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&E) -> bool) {
        let mut cursor = self.cursor();
        while let Some(element) = cursor.next() {
            if !keep(element) {
                cursor.remove_current();
            }
        }
    }

    /// Check the structural invariants. Intended for tests and debug assertions.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let mut count = 0usize;
        let mut previous: Option<&E> = None;
        for element in self.iter() {
            if let Some(prev) = previous
                && self.comparator.compare(prev, element) != Ordering::Less
            {
                return false;
            }
            previous = Some(element);
            count += 1;
        }
        let occupied = self
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Occupied(_)))
            .count();
        count == self.len && occupied == self.len
    }

    // ------------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------------

    fn find(&self, element: &E) -> Option<(Link, NodeIdx)> {
        let mut link = Link::Root;
        let mut current = self.root;
        while let Some(idx) = current {
            let node = self.node(idx);
            match self.comparator.compare(element, &node.value) {
                Ordering::Less => {
                    link = Link::Left(idx);
                    current = node.left;
                }
                Ordering::Greater => {
                    link = Link::Right(idx);
                    current = node.right;
                }
                Ordering::Equal => return Some((link, idx)),
            }
        }
        None
    }

    /// Detach the node at `idx` (linked from `link`) and return its value.
    ///
    /// A node with two children keeps its slot: it takes over the value of
    /// its in-order successor, and the successor's slot is unlinked instead.
    fn unlink(&mut self, link: Link, idx: NodeIdx) -> E {
        let (left, right) = {
            let node = self.node(idx);
            (node.left, node.right)
        };

        let removed = match (left, right) {
            (Some(_), Some(right)) => {
                let mut successor_link = Link::Right(idx);
                let mut successor = right;
                while let Some(next) = self.node(successor).left {
                    successor_link = Link::Left(successor);
                    successor = next;
                }
                let successor_right = self.node(successor).right;
                self.set_link(successor_link, successor_right);
                let successor_value = self.release(successor).value;
                std::mem::replace(&mut self.node_mut(idx).value, successor_value)
            }
            (only, None) | (None, only) => {
                self.set_link(link, only);
                self.release(idx).value
            }
        };

        self.len = match self.len.checked_sub(1) {
            Some(len) => len,
            None => panic!("ordered set length underflow: tree mutation is broken"),
        };
        removed
    }

    fn set_link(&mut self, link: Link, target: Option<NodeIdx>) {
        match link {
            Link::Root => self.root = target,
            Link::Left(parent) => self.node_mut(parent).left = target,
            Link::Right(parent) => self.node_mut(parent).right = target,
        }
    }

    fn alloc(&mut self, value: E) -> NodeIdx {
        let node = Node {
            value,
            left: None,
            right: None,
        };
        match self.free {
            Some(idx) => {
                let slot = std::mem::replace(&mut self.slots[idx.get()], Slot::Occupied(node));
                self.free = match slot {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => panic!("free list points at occupied slot {}", idx.0),
                };
                idx
            }
            None => {
                let Ok(raw) = u32::try_from(self.slots.len()) else {
                    panic!("ordered set exceeds u32::MAX nodes");
                };
                let idx = NodeIdx(raw);
                self.slots.push(Slot::Occupied(node));
                idx
            }
        }
    }

    fn release(&mut self, idx: NodeIdx) -> Node<E> {
        let slot = std::mem::replace(
            &mut self.slots[idx.get()],
            Slot::Vacant {
                next_free: self.free,
            },
        );
        self.free = Some(idx);
        match slot {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("released vacant slot {}", idx.0),
        }
    }

    #[inline]
    fn node(&self, idx: NodeIdx) -> &Node<E> {
        node_in(&self.slots, idx)
    }

    #[inline]
    fn node_mut(&mut self, idx: NodeIdx) -> &mut Node<E> {
        match &mut self.slots[idx.get()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("live link points at vacant slot {}", idx.0),
        }
    }
}

#[inline]
fn node_in<E>(slots: &[Slot<E>], idx: NodeIdx) -> &Node<E> {
    match &slots[idx.get()] {
        Slot::Occupied(node) => node,
        Slot::Vacant { .. } => panic!("live link points at vacant slot {}", idx.0),
    }
}

fn push_left_path<E>(slots: &[Slot<E>], stack: &mut Vec<NodeIdx>, from: Option<NodeIdx>) {
    let mut current = from;
    while let Some(idx) = current {
        stack.push(idx);
        current = node_in(slots, idx).left;
    }
}

impl<E: fmt::Debug, C> fmt::Debug for OrderedSet<E, C>
where
    C: Comparator<E>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<E: Ord> FromIterator<E> for OrderedSet<E, NaturalOrder> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<E, C: Comparator<E>> Extend<E> for OrderedSet<E, C> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<'a, E, C: Comparator<E>> IntoIterator for &'a OrderedSet<E, C> {
    type Item = &'a E;
    type IntoIter = Iter<'a, E, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Iteration
// ============================================================================

/// In-order iterator over an [`OrderedSet`].
///
/// Keeps the pending leftmost path on an explicit stack.
pub struct Iter<'a, E, C> {
    set: &'a OrderedSet<E, C>,
    stack: Vec<NodeIdx>,
    remaining: usize,
}

impl<E, C> Iter<'_, E, C> {
    fn push_left_path(&mut self, from: Option<NodeIdx>) {
        push_left_path(&self.set.slots, &mut self.stack, from);
    }
}

impl<'a, E, C> Iterator for Iter<'a, E, C> {
    type Item = &'a E;

    fn next(&mut self) -> Option<&'a E> {
        let idx = self.stack.pop()?;
        let node = node_in(&self.set.slots, idx);
        self.push_left_path(node.right);
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E, C> ExactSizeIterator for Iter<'_, E, C> {}

/// Mutable in-order traversal that supports removing the current element.
///
/// ```
/// use sprig_core::OrderedSet;
///
/// let mut set: OrderedSet<i32> = (1..=6).collect();
/// let mut cursor = set.cursor();
/// while let Some(&n) = cursor.next() {
///     if n % 2 == 0 {
///         cursor.remove_current();
///     }
/// }
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
/// ```
pub struct Cursor<'a, E, C> {
    set: &'a mut OrderedSet<E, C>,
    stack: Vec<NodeIdx>,
    current: Option<NodeIdx>,
}

impl<E, C: Comparator<E>> Cursor<'_, E, C> {
    /// Advance and return the next element in ascending order.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&E> {
        let idx = self.stack.pop()?;
        let right = node_in(&self.set.slots, idx).right;
        push_left_path(&self.set.slots, &mut self.stack, right);
        self.current = Some(idx);
        Some(&node_in(&self.set.slots, idx).value)
    }

    /// Remove the element most recently returned by [`next`](Self::next).
    ///
    /// Returns `None` if nothing has been yielded since the last removal.
    /// Traversal then continues with the elements greater than the removed one.
    pub fn remove_current(&mut self) -> Option<E> {
        let idx = self.current.take()?;
        let removed = {
            let value = &node_in(&self.set.slots, idx).value;
            let (link, found) = self.set.find(value)?;
            self.set.unlink(link, found)
        };
        // Removing a two-child node moves its successor's value into place, so
        // the pending stack may reference a freed slot. Re-seek from the root.
        self.seek_after(&removed);
        Some(removed)
    }

    /// Rebuild the pending stack so the next yield is the least element > `element`.
    fn seek_after(&mut self, element: &E) {
        self.stack.clear();
        let mut current = self.set.root;
        while let Some(idx) = current {
            let node = node_in(&self.set.slots, idx);
            if self.set.comparator.compare(&node.value, element) == Ordering::Greater {
                self.stack.push(idx);
                current = node.left;
            } else {
                current = node.right;
            }
        }
    }
}
