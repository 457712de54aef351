#![forbid(unsafe_code)]

//! Declarative constraint layout.
//!
//! A container describes the geometry of its children as equations over
//! box attributes, e.g. `first.right = first.left + (parent.width - spacing) * ratio`.
//! Every operand is symbolic: reading `parent.width` or [`Param::Ratio`]
//! records an [`Expr`] node rather than a number. Nothing is evaluated until
//! [`LayoutDescription::resolve`] runs against the current parent bounds and
//! a [`ParamSource`], so a description never holds a stale value and only
//! needs rebuilding when the *shape* of the equations changes.
//!
//! # Example
//!
//! ```
//! use sprig_core::{Insets, Rect};
//! use sprig_layout::{BoxId, Param, Params, constrain};
//!
//! let (first, last) = (BoxId::new(1), BoxId::new(2));
//! let layout = constrain([first, last], |c, [first, last]| {
//!     let parent = c.parent();
//!     c.set(first.top(), parent.top());
//!     c.set(first.left(), parent.left());
//!     c.set(first.bottom(), parent.bottom());
//!     c.set(first.right(), first.left() + parent.width() * Param::Ratio);
//!     c.set(last.top(), first.top());
//!     c.set(last.bottom(), first.bottom());
//!     c.set(last.left(), first.right());
//!     c.set(last.right(), parent.right());
//! });
//!
//! let params = Params { ratio: 0.25, ..Params::default() };
//! let solved = layout.resolve(Rect::from_size(200.0, 50.0), &params).unwrap();
//! assert_eq!(solved.get(first), Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
//! assert_eq!(solved.get(last), Some(Rect::new(50.0, 0.0, 150.0, 50.0)));
//! ```

pub mod description;
pub mod error;
pub mod expr;
pub mod solver;

pub use description::{BoxProxy, Constraint, ConstraintScope, LayoutDescription, constrain, fill};
pub use error::LayoutError;
pub use expr::{AttrRef, Attribute, Axis, BoxId, Expr, Param, ParamSource, Params};
pub use solver::SolvedLayout;
pub use sprig_core::geometry::{Insets, Orientation, Rect, Size};
