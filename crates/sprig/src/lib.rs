#![forbid(unsafe_code)]

//! Sprig public facade crate.
//!
//! Re-exports the commonly used types of the internal crates and a prelude
//! for day-to-day usage.
//!
//! ```
//! use sprig::prelude::*;
//!
//! fn split() -> sprig::Result<SplitPanel> {
//!     let mut panel = SplitPanel::new(Orientation::Vertical, 0.5)?;
//!     panel.set_first_item(Some(View::new()))?;
//!     panel.set_last_item(Some(View::new()))?;
//!     panel.layout(Rect::from_size(300.0, 100.0))?;
//!     Ok(panel)
//! }
//!
//! assert!(split().is_ok());
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use sprig_core::{
    ChangeObservers, Comparator, Insets, NaturalOrder, OrderedSet, Orientation, Point,
    PropertyObservers, Rect, Size, Subscription,
};

// --- Layout re-exports -----------------------------------------------------

pub use sprig_layout::{
    Attribute, BoxId, Expr, LayoutDescription, LayoutError, Param, ParamSource, Params,
    SolvedLayout, constrain, fill,
};

// --- Widget re-exports -----------------------------------------------------

pub use sprig_widgets::{
    BasicSplitPanelBehavior, Canvas, Color, ConfigError, FocusCycle, FocusManager,
    RecordingCanvas, SplitConfig, SplitPanel, SplitPanelBehavior, View, ViewId,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Sprig applications.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid widget configuration.
    Config(ConfigError),
    /// Constraint layout could not be resolved.
    Layout(LayoutError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Layout(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Layout(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

/// Standard result type for Sprig APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Canvas, Error, FocusCycle, FocusManager, Insets, OrderedSet, Orientation, Point, Rect,
        Result, Size, SplitConfig, SplitPanel, SplitPanelBehavior, View, ViewId,
    };

    pub use crate::{core, layout, widgets};
}

pub use sprig_core as core;
pub use sprig_layout as layout;
pub use sprig_widgets as widgets;
