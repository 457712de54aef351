#![forbid(unsafe_code)]

//! Views and containers for Sprig.
//!
//! - [`View`]: a rectangular component with an id, bounds, z-order, and
//!   focus flags.
//! - [`SplitPanel`]: two items separated by an optional divider, laid out by
//!   a constraint description.
//! - [`FocusCycle`]: tab-order focus management behind [`FocusManager`].
//! - [`Canvas`]: the drawing seam render behaviors paint through.

pub mod canvas;
pub mod focus;
pub mod split_panel;
pub mod view;

pub use canvas::{Canvas, Color, DrawCommand, RecordingCanvas};
pub use focus::{FocusCycle, FocusManager};
pub use split_panel::{
    BasicSplitPanelBehavior, ConfigError, DIVIDER_Z_ORDER, SplitConfig, SplitPanel,
    SplitPanelBehavior,
};
pub use view::{View, ViewId};
