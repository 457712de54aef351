#![forbid(unsafe_code)]

//! Views: the visual components containers arrange.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use sprig_core::geometry::{Point, Rect, Size};
use sprig_layout::BoxId;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique view identifier. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(u64);

impl ViewId {
    /// Allocate a fresh id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The layout box this view is placed as.
    #[must_use]
    pub const fn box_id(self) -> BoxId {
        BoxId::new(self.0)
    }
}

/// A rectangular visual component.
///
/// Bounds are in the coordinate space of the containing view.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    id: ViewId,
    bounds: Rect,
    z_order: i32,
    tab_index: i32,
    visible: bool,
    enabled: bool,
    focusable: bool,
}

impl View {
    /// Create a visible, enabled, non-focusable view with empty bounds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: ViewId::next(),
            bounds: Rect::default(),
            z_order: 0,
            tab_index: 0,
            visible: true,
            enabled: true,
            focusable: false,
        }
    }

    /// Set the initial size, keeping the origin.
    #[must_use]
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.bounds.width = width;
        self.bounds.height = height;
        self
    }

    #[must_use]
    pub const fn z_order(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    /// Position in the focus traversal order.
    #[must_use]
    pub const fn tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = tab_index;
        self
    }

    #[must_use]
    pub const fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }

    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub const fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub const fn id(&self) -> ViewId {
        self.id
    }

    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    #[must_use]
    pub const fn current_size(&self) -> Size {
        self.bounds.size()
    }

    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z_order
    }

    pub fn set_z_order(&mut self, z_order: i32) {
        self.z_order = z_order;
    }

    #[must_use]
    pub const fn tab(&self) -> i32 {
        self.tab_index
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub const fn is_focusable(&self) -> bool {
        self.focusable
    }

    /// Whether `point`, in the parent's coordinates, falls inside this view.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.bounds.contains(point)
    }

    /// Paint-order key: lower z first, ties broken by id.
    #[must_use]
    pub const fn paint_key(&self) -> (i32, ViewId) {
        (self.z_order, self.id)
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}
