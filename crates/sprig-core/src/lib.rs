#![forbid(unsafe_code)]

//! Core: geometry, ordered collections, and change notification.
//!
//! # Role in Sprig
//! `sprig-core` is the leaf crate of the toolkit. It owns the value types
//! every other crate speaks in (rectangles, insets, orientation), the
//! [`OrderedSet`](ordered_set::OrderedSet) used for z-order and focus
//! cycles, and the observer lists widgets use to announce changes.
//!
//! # How it fits in the system
//! `sprig-layout` resolves constraint descriptions into [`geometry::Rect`]s,
//! and `sprig-widgets` builds containers on top of both. Nothing in this
//! crate depends on layout or widgets.

pub mod geometry;
pub mod logging;
pub mod observers;
pub mod ordered_set;

pub use geometry::{Insets, Orientation, Point, Rect, Size};
pub use observers::{ChangeObservers, PropertyObservers, Subscription};
pub use ordered_set::{Comparator, NaturalOrder, OrderedSet};
