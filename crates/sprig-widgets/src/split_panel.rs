#![forbid(unsafe_code)]

//! Two-pane container with an optional divider.
//!
//! # Layout
//!
//! The panes are placed by a constraint description built from the current
//! children. With content width `w' = parent.width - (spacing + left + right)`
//! a vertical split reads:
//!
//! ```text
//! first.right   = first.left + w' * ratio
//! last.left     = first.right + spacing
//! last.right    = parent.right - insets.right
//! divider.centerX = parent.left + insets.left + w' * ratio + spacing / 2
//! ```
//!
//! A horizontal split is the same along the y axis. One child fills the
//! content box; no children means no description.
//!
//! Ratio, insets, and spacing are read as parameters at resolve time, so
//! changing them only requires another [`SplitPanel::layout`]. Changing a
//! child, the orientation, or the behavior rebuilds the description.
//!
//! # Events
//!
//! | Change        | `contents_changed` | `orientation_changed` | `changed` |
//! |---------------|--------------------|-----------------------|-----------|
//! | first / last  | yes                |                       | yes       |
//! | orientation   |                    | yes                   | yes       |
//! | ratio         |                    |                       | yes       |
//! | insets        |                    |                       |           |

use std::fmt;

use serde::{Deserialize, Serialize};
use sprig_core::geometry::{Insets, Orientation, Point, Rect, Size};
use sprig_core::logging::{debug, debug_span};
use sprig_core::observers::ChangeObservers;
use sprig_core::ordered_set::OrderedSet;
use sprig_layout::{
    BoxId, BoxProxy, ConstraintScope, LayoutDescription, LayoutError, Param, ParamSource,
    SolvedLayout, constrain, fill,
};

use crate::canvas::{Canvas, Color};
use crate::view::{View, ViewId};

/// Z-order given to the divider so it paints above both panes.
pub const DIVIDER_Z_ORDER: i32 = 1;

// ============================================================================
// Configuration
// ============================================================================

/// Invalid split panel configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Ratio outside `0.0..=1.0`, or NaN.
    RatioOutOfRange { ratio: f32 },
    /// A side is negative or not finite.
    InvalidInsets { insets: Insets },
    /// The view already occupies another slot of the panel.
    DuplicateItem { id: ViewId },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RatioOutOfRange { ratio } => {
                write!(f, "split ratio must be in 0 ..= 1, got {ratio}")
            }
            Self::InvalidInsets { insets } => write!(
                f,
                "split insets must be finite and non-negative, got {} {} {} {}",
                insets.top, insets.left, insets.bottom, insets.right
            ),
            Self::DuplicateItem { id } => {
                write!(f, "view {} is already a child of this split panel", id.get())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn check_ratio(ratio: f32) -> Result<f32, ConfigError> {
    if (0.0..=1.0).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(ConfigError::RatioOutOfRange { ratio })
    }
}

fn check_insets(insets: Insets) -> Result<Insets, ConfigError> {
    if insets.is_valid() {
        Ok(insets)
    } else {
        Err(ConfigError::InvalidInsets { insets })
    }
}

/// Serializable split panel settings.
///
/// ```
/// use sprig_widgets::SplitConfig;
///
/// let config: SplitConfig = serde_json::from_str(r#"{"orientation":"horizontal","ratio":0.3}"#).unwrap();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.insets, Default::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub orientation: Orientation,
    pub ratio: f32,
    pub insets: Insets,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            ratio: 0.5,
            insets: Insets::NONE,
        }
    }
}

impl SplitConfig {
    /// Check the ratio range and that every inset is finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_ratio(self.ratio)?;
        check_insets(self.insets)?;
        Ok(())
    }
}

// ============================================================================
// Behavior
// ============================================================================

/// Pluggable rendering strategy for a [`SplitPanel`].
///
/// A behavior may supply a divider view. Its thickness along the split axis
/// becomes the panel spacing when [`divider_visible`](Self::divider_visible)
/// is true.
pub trait SplitPanelBehavior {
    /// Draw the panel.
    fn render(&self, panel: &SplitPanel, canvas: &mut dyn Canvas);

    /// Refine hit testing; only asked for points inside the panel bounds.
    fn contains(&self, panel: &SplitPanel, point: Point) -> bool {
        let _ = (panel, point);
        true
    }

    /// Divider view, asked for once per installation.
    fn divider(&mut self, panel: &SplitPanel) -> Option<View> {
        let _ = panel;
        None
    }

    /// Whether the divider occupies space between the panes.
    fn divider_visible(&self) -> bool {
        true
    }

    fn install(&mut self, panel: &SplitPanel) {
        let _ = panel;
    }

    fn uninstall(&mut self, panel: &SplitPanel) {
        let _ = panel;
    }
}

/// Flat-color behavior: optional background fill and a solid divider.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicSplitPanelBehavior {
    divider_thickness: f64,
    divider_color: Color,
    background: Option<Color>,
}

impl BasicSplitPanelBehavior {
    #[must_use]
    pub fn new(divider_thickness: f64) -> Self {
        Self {
            divider_thickness,
            divider_color: Color::LIGHT_GRAY,
            background: None,
        }
    }

    #[must_use]
    pub const fn divider_color(mut self, color: Color) -> Self {
        self.divider_color = color;
        self
    }

    #[must_use]
    pub const fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }
}

impl SplitPanelBehavior for BasicSplitPanelBehavior {
    fn render(&self, panel: &SplitPanel, canvas: &mut dyn Canvas) {
        if let Some(background) = self.background {
            let size = panel.bounds().size();
            canvas.rect(Rect::from_size(size.width, size.height), background);
        }
        if let Some(divider) = panel.divider() {
            canvas.rect(divider.bounds(), self.divider_color);
        }
    }

    fn divider(&mut self, panel: &SplitPanel) -> Option<View> {
        let size = match panel.orientation() {
            Orientation::Vertical => Size::new(self.divider_thickness, 0.0),
            Orientation::Horizontal => Size::new(0.0, self.divider_thickness),
        };
        Some(View::new().size(size.width, size.height))
    }

    fn divider_visible(&self) -> bool {
        self.divider_thickness > 0.0
    }
}

// ============================================================================
// SplitPanel
// ============================================================================

/// Container splitting its area between two items.
pub struct SplitPanel {
    id: ViewId,
    bounds: Rect,
    orientation: Orientation,
    ratio: f32,
    insets: Insets,
    panel_spacing: f64,
    first_item: Option<View>,
    last_item: Option<View>,
    divider: Option<View>,
    /// Paint order of the current children.
    children: OrderedSet<(i32, ViewId)>,
    behavior: Option<Box<dyn SplitPanelBehavior>>,
    description: Option<LayoutDescription>,
    changed: ChangeObservers<SplitPanel>,
    contents_changed: ChangeObservers<SplitPanel>,
    orientation_changed: ChangeObservers<SplitPanel>,
}

impl SplitPanel {
    /// Create an empty panel.
    ///
    /// Fails if `ratio` is outside `0.0..=1.0`; the value is never clamped.
    pub fn new(orientation: Orientation, ratio: f32) -> Result<Self, ConfigError> {
        Ok(Self {
            id: ViewId::next(),
            bounds: Rect::default(),
            orientation,
            ratio: check_ratio(ratio)?,
            insets: Insets::NONE,
            panel_spacing: 0.0,
            first_item: None,
            last_item: None,
            divider: None,
            children: OrderedSet::new(),
            behavior: None,
            description: None,
            changed: ChangeObservers::new(),
            contents_changed: ChangeObservers::new(),
            orientation_changed: ChangeObservers::new(),
        })
    }

    pub fn from_config(config: SplitConfig) -> Result<Self, ConfigError> {
        let mut panel = Self::new(config.orientation, config.ratio)?;
        panel.insets = check_insets(config.insets)?;
        Ok(panel)
    }

    #[must_use]
    pub fn config(&self) -> SplitConfig {
        SplitConfig {
            orientation: self.orientation,
            ratio: self.ratio,
            insets: self.insets,
        }
    }

    #[must_use]
    pub const fn id(&self) -> ViewId {
        self.id
    }

    /// Bounds given to the last [`layout`](Self::layout).
    #[must_use]
    pub const fn bounds(&self) -> Rect {
        self.bounds
    }

    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub const fn ratio(&self) -> f32 {
        self.ratio
    }

    #[must_use]
    pub const fn insets(&self) -> Insets {
        self.insets
    }

    /// Space reserved for the divider along the split axis.
    #[must_use]
    pub const fn panel_spacing(&self) -> f64 {
        self.panel_spacing
    }

    #[must_use]
    pub fn first_item(&self) -> Option<&View> {
        self.first_item.as_ref()
    }

    #[must_use]
    pub fn last_item(&self) -> Option<&View> {
        self.last_item.as_ref()
    }

    /// Divider supplied by the current behavior.
    #[must_use]
    pub fn divider(&self) -> Option<&View> {
        self.divider.as_ref()
    }

    /// Current layout description, if the panel has children.
    #[must_use]
    pub fn description(&self) -> Option<&LayoutDescription> {
        self.description.as_ref()
    }

    /// Children in paint order: ascending z-order, then id.
    pub fn children(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.children.iter().map(|&(_, id)| id)
    }

    #[must_use]
    pub fn changed(&self) -> &ChangeObservers<SplitPanel> {
        &self.changed
    }

    #[must_use]
    pub fn contents_changed(&self) -> &ChangeObservers<SplitPanel> {
        &self.contents_changed
    }

    #[must_use]
    pub fn orientation_changed(&self) -> &ChangeObservers<SplitPanel> {
        &self.orientation_changed
    }

    /// Replace the first item, returning the previous one.
    ///
    /// Fails without any change if the view is already the last item or the
    /// divider.
    pub fn set_first_item(&mut self, item: Option<View>) -> Result<Option<View>, ConfigError> {
        self.check_unique(item.as_ref(), self.last_item.as_ref())?;
        let old = std::mem::replace(&mut self.first_item, item);
        self.swap_child(old.as_ref(), self.first_item.as_ref().map(View::paint_key));
        self.rebuild();
        self.contents_changed.notify(self);
        self.changed.notify(self);
        Ok(old)
    }

    /// Replace the last item, returning the previous one.
    ///
    /// Fails without any change if the view is already the first item or the
    /// divider.
    pub fn set_last_item(&mut self, item: Option<View>) -> Result<Option<View>, ConfigError> {
        self.check_unique(item.as_ref(), self.first_item.as_ref())?;
        let old = std::mem::replace(&mut self.last_item, item);
        self.swap_child(old.as_ref(), self.last_item.as_ref().map(View::paint_key));
        self.rebuild();
        self.contents_changed.notify(self);
        self.changed.notify(self);
        Ok(old)
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if orientation == self.orientation {
            return;
        }
        self.orientation = orientation;
        // The divider's thickness moves to the other axis.
        if let Some(divider) = &mut self.divider {
            let bounds = divider.bounds();
            divider.set_bounds(Rect::new(bounds.x, bounds.y, bounds.height, bounds.width));
        }
        self.update_panel_spacing();
        self.rebuild();
        self.orientation_changed.notify(self);
        self.changed.notify(self);
    }

    /// Change the split ratio.
    ///
    /// Takes effect on the next [`layout`](Self::layout) without rebuilding
    /// the description.
    pub fn set_ratio(&mut self, ratio: f32) -> Result<(), ConfigError> {
        let ratio = check_ratio(ratio)?;
        if ratio != self.ratio {
            self.ratio = ratio;
            self.changed.notify(self);
        }
        Ok(())
    }

    /// Change the insets. Like the ratio, they apply on the next layout.
    pub fn set_insets(&mut self, insets: Insets) -> Result<(), ConfigError> {
        self.insets = check_insets(insets)?;
        Ok(())
    }

    /// Install `behavior`, tearing down the previous one first.
    pub fn set_behavior(&mut self, behavior: Option<Box<dyn SplitPanelBehavior>>) {
        if let Some(divider) = self.divider.take() {
            self.children.remove(&divider.paint_key());
        }
        if let Some(mut old) = self.behavior.take() {
            old.uninstall(self);
            debug!(panel = self.id.get(), "split panel behavior uninstalled");
        }

        if let Some(mut behavior) = behavior {
            behavior.install(self);
            if let Some(mut divider) = behavior.divider(self) {
                divider.set_z_order(DIVIDER_Z_ORDER);
                self.children.insert(divider.paint_key());
                self.divider = Some(divider);
            }
            self.behavior = Some(behavior);
            debug!(
                panel = self.id.get(),
                divider = self.divider.is_some(),
                "split panel behavior installed"
            );
        }

        self.update_panel_spacing();
        self.rebuild();
    }

    /// Let the behavior draw the panel. Does nothing without a behavior.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        if let Some(behavior) = &self.behavior {
            behavior.render(self, canvas);
        }
    }

    /// Hit test in the parent's coordinates.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.bounds.contains(point)
            && self
                .behavior
                .as_ref()
                .is_none_or(|behavior| behavior.contains(self, point))
    }

    /// Resolve the children against `bounds` and apply the result.
    ///
    /// Children are placed in the panel's own coordinates (origin at zero).
    pub fn layout(&mut self, bounds: Rect) -> Result<SolvedLayout, LayoutError> {
        let _span = debug_span!(
            "split_panel.layout",
            panel = self.id.get(),
            orientation = ?self.orientation,
            ratio = self.ratio
        )
        .entered();

        self.bounds = bounds;
        let Some(description) = &self.description else {
            return Ok(SolvedLayout::default());
        };
        let solved = description.resolve(Rect::from_size(bounds.width, bounds.height), &*self)?;

        for view in [&mut self.first_item, &mut self.last_item, &mut self.divider]
            .into_iter()
            .flatten()
        {
            if let Some(rect) = solved.get(view.id().box_id()) {
                view.set_bounds(rect);
            }
        }
        Ok(solved)
    }

    /// Bounds of a child after the last layout.
    #[must_use]
    pub fn bounds_of(&self, id: ViewId) -> Option<Rect> {
        [&self.first_item, &self.last_item, &self.divider]
            .into_iter()
            .flatten()
            .find(|view| view.id() == id)
            .map(View::bounds)
    }

    fn check_unique(&self, item: Option<&View>, other: Option<&View>) -> Result<(), ConfigError> {
        let Some(item) = item else {
            return Ok(());
        };
        let id = item.id();
        if [other, self.divider.as_ref()]
            .into_iter()
            .flatten()
            .any(|view| view.id() == id)
        {
            return Err(ConfigError::DuplicateItem { id });
        }
        Ok(())
    }

    fn swap_child(&mut self, old: Option<&View>, new: Option<(i32, ViewId)>) {
        if let Some(old) = old {
            self.children.remove(&old.paint_key());
        }
        if let Some(key) = new {
            self.children.insert(key);
        }
    }

    fn update_panel_spacing(&mut self) {
        let visible = self.behavior.as_ref().is_some_and(|b| b.divider_visible());
        self.panel_spacing = match (&self.divider, visible) {
            (Some(divider), true) => {
                let size = divider.current_size();
                match self.orientation {
                    Orientation::Vertical => size.width,
                    Orientation::Horizontal => size.height,
                }
            }
            _ => 0.0,
        };
    }

    fn rebuild(&mut self) {
        self.description = self.build_description();
        debug!(
            panel = self.id.get(),
            constraints = self.description.as_ref().map_or(0, LayoutDescription::len),
            "split panel layout rebuilt"
        );
    }

    fn build_description(&self) -> Option<LayoutDescription> {
        let first = self.first_item.as_ref().map(|v| v.id().box_id());
        let last = self.last_item.as_ref().map(|v| v.id().box_id());
        let orientation = self.orientation;

        let mut description = match (first, last) {
            (None, None) => return None,
            (Some(only), None) | (None, Some(only)) => constrain([only], |c, [only]| fill(c, only)),
            (Some(first), Some(last)) => constrain([first, last], |c, [first, last]| match orientation {
                Orientation::Vertical => split_vertical(c, first, last),
                Orientation::Horizontal => split_horizontal(c, first, last),
            }),
        };

        if let (Some(first), Some(divider)) = (first, self.divider.as_ref()) {
            description.constrain([divider.id().box_id(), first], |c, [divider, first]| {
                place_divider(c, orientation, divider, first);
            });
        }
        Some(description)
    }
}

fn split_vertical(c: &mut ConstraintScope<'_>, first: BoxProxy, last: BoxProxy) {
    let parent = c.parent();
    let content = parent.width() - (Param::PanelSpacing + Param::InsetLeft + Param::InsetRight);
    c.set(first.top(), parent.top() + Param::InsetTop);
    c.set(first.left(), parent.left() + Param::InsetLeft);
    c.set(first.bottom(), parent.bottom() - Param::InsetBottom);
    c.set(first.right(), first.left() + content * Param::Ratio);
    c.set(last.top(), first.top());
    c.set(last.left(), first.right() + Param::PanelSpacing);
    c.set(last.bottom(), first.bottom());
    c.set(last.right(), parent.right() - Param::InsetRight);
}

fn split_horizontal(c: &mut ConstraintScope<'_>, first: BoxProxy, last: BoxProxy) {
    let parent = c.parent();
    let content = parent.height() - (Param::PanelSpacing + Param::InsetTop + Param::InsetBottom);
    c.set(first.top(), parent.top() + Param::InsetTop);
    c.set(first.left(), parent.left() + Param::InsetLeft);
    c.set(first.bottom(), first.top() + content * Param::Ratio);
    c.set(first.right(), parent.right() - Param::InsetRight);
    c.set(last.top(), first.bottom() + Param::PanelSpacing);
    c.set(last.left(), first.left());
    c.set(last.right(), first.right());
    c.set(last.bottom(), parent.bottom() - Param::InsetBottom);
}

/// Cross-axis edges follow the first item; the split-axis center sits in the
/// middle of the spacing. The divider's own size supplies its thickness.
fn place_divider(
    c: &mut ConstraintScope<'_>,
    orientation: Orientation,
    divider: BoxProxy,
    first: BoxProxy,
) {
    let parent = c.parent();
    match orientation {
        Orientation::Vertical => {
            let content =
                parent.width() - (Param::PanelSpacing + Param::InsetLeft + Param::InsetRight);
            c.set(divider.top(), first.top());
            c.set(divider.bottom(), first.bottom());
            c.set(
                divider.center_x(),
                parent.left() + Param::InsetLeft + content * Param::Ratio + Param::PanelSpacing / 2.0,
            );
        }
        Orientation::Horizontal => {
            let content =
                parent.height() - (Param::PanelSpacing + Param::InsetTop + Param::InsetBottom);
            c.set(divider.left(), first.left());
            c.set(divider.right(), first.right());
            c.set(
                divider.center_y(),
                parent.top() + Param::InsetTop + content * Param::Ratio + Param::PanelSpacing / 2.0,
            );
        }
    }
}

impl ParamSource for SplitPanel {
    fn param(&self, param: Param) -> f64 {
        match param {
            Param::InsetTop => self.insets.top,
            Param::InsetLeft => self.insets.left,
            Param::InsetBottom => self.insets.bottom,
            Param::InsetRight => self.insets.right,
            Param::Ratio => f64::from(self.ratio),
            Param::PanelSpacing => self.panel_spacing,
        }
    }

    fn current_size(&self, box_id: BoxId) -> Option<Size> {
        [&self.first_item, &self.last_item, &self.divider]
            .into_iter()
            .flatten()
            .find(|view| view.id().box_id() == box_id)
            .map(View::current_size)
    }
}

impl fmt::Debug for SplitPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitPanel")
            .field("id", &self.id)
            .field("bounds", &self.bounds)
            .field("orientation", &self.orientation)
            .field("ratio", &self.ratio)
            .field("insets", &self.insets)
            .field("panel_spacing", &self.panel_spacing)
            .field("first_item", &self.first_item)
            .field("last_item", &self.last_item)
            .field("divider", &self.divider)
            .field("has_behavior", &self.behavior.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::canvas::{DrawCommand, RecordingCanvas};

    fn panel_with_items(orientation: Orientation) -> (SplitPanel, ViewId, ViewId) {
        let mut panel = SplitPanel::new(orientation, 0.5).unwrap();
        let first = View::new();
        let last = View::new();
        let ids = (first.id(), last.id());
        panel.set_first_item(Some(first)).unwrap();
        panel.set_last_item(Some(last)).unwrap();
        (panel, ids.0, ids.1)
    }

    #[test]
    fn vertical_split_without_divider() {
        let (mut panel, first, last) = panel_with_items(Orientation::Vertical);
        panel.layout(Rect::from_size(300.0, 100.0)).unwrap();
        assert_eq!(panel.bounds_of(first), Some(Rect::new(0.0, 0.0, 150.0, 100.0)));
        assert_eq!(panel.bounds_of(last), Some(Rect::new(150.0, 0.0, 150.0, 100.0)));
    }

    #[test]
    fn vertical_split_with_divider() {
        let (mut panel, first, last) = panel_with_items(Orientation::Vertical);
        panel.set_behavior(Some(Box::new(BasicSplitPanelBehavior::new(10.0))));
        assert_eq!(panel.panel_spacing(), 10.0);

        panel.layout(Rect::from_size(300.0, 100.0)).unwrap();
        assert_eq!(panel.bounds_of(first), Some(Rect::new(0.0, 0.0, 145.0, 100.0)));
        assert_eq!(panel.bounds_of(last), Some(Rect::new(155.0, 0.0, 145.0, 100.0)));
        let divider = panel.divider().unwrap().bounds();
        assert_eq!(divider, Rect::new(145.0, 0.0, 10.0, 100.0));
        assert_eq!(divider.center_x(), 150.0);
    }

    #[test]
    fn horizontal_split_with_insets() {
        let (mut panel, first, last) = panel_with_items(Orientation::Horizontal);
        panel.set_insets(Insets::new(10.0, 5.0, 10.0, 5.0)).unwrap();
        panel.set_behavior(Some(Box::new(BasicSplitPanelBehavior::new(4.0))));
        panel.layout(Rect::from_size(100.0, 104.0)).unwrap();

        // Content height: 104 - (4 + 10 + 10) = 80.
        assert_eq!(panel.bounds_of(first), Some(Rect::new(5.0, 10.0, 90.0, 40.0)));
        assert_eq!(panel.bounds_of(last), Some(Rect::new(5.0, 54.0, 90.0, 40.0)));
        assert_eq!(panel.divider().unwrap().bounds(), Rect::new(5.0, 50.0, 90.0, 4.0));
    }

    #[test]
    fn single_item_fills_content_box() {
        let mut panel = SplitPanel::new(Orientation::Vertical, 0.3).unwrap();
        panel.set_insets(Insets::all(2.0)).unwrap();
        let only = View::new();
        let id = only.id();
        panel.set_first_item(Some(only)).unwrap();
        let solved = panel.layout(Rect::from_size(50.0, 20.0)).unwrap();
        assert_eq!(solved.len(), 1);
        assert_eq!(panel.bounds_of(id), Some(Rect::new(2.0, 2.0, 46.0, 16.0)));
    }

    #[test]
    fn last_item_alone_fills() {
        let mut panel = SplitPanel::new(Orientation::Horizontal, 0.3).unwrap();
        let only = View::new();
        let id = only.id();
        panel.set_last_item(Some(only)).unwrap();
        panel.layout(Rect::from_size(50.0, 20.0)).unwrap();
        assert_eq!(panel.bounds_of(id), Some(Rect::from_size(50.0, 20.0)));
    }

    #[test]
    fn empty_panel_lays_out_nothing() {
        let mut panel = SplitPanel::new(Orientation::Vertical, 0.5).unwrap();
        assert!(panel.description().is_none());
        assert!(panel.layout(Rect::from_size(10.0, 10.0)).unwrap().is_empty());
    }

    #[test]
    fn ratio_range_is_enforced() {
        for bad in [1.5, -0.1, f32::NAN] {
            assert!(matches!(
                SplitPanel::new(Orientation::Vertical, bad),
                Err(ConfigError::RatioOutOfRange { .. })
            ));
        }
        let mut panel = SplitPanel::new(Orientation::Vertical, 0.5).unwrap();
        assert!(panel.set_ratio(2.0).is_err());
        assert_eq!(panel.ratio(), 0.5);
    }

    #[test]
    fn extreme_ratios_collapse_one_side() {
        let (mut panel, first, last) = panel_with_items(Orientation::Vertical);
        panel.set_ratio(0.0).unwrap();
        panel.layout(Rect::from_size(300.0, 100.0)).unwrap();
        assert_eq!(panel.bounds_of(first).unwrap().width, 0.0);
        assert_eq!(panel.bounds_of(last).unwrap().width, 300.0);

        panel.set_ratio(1.0).unwrap();
        panel.layout(Rect::from_size(300.0, 100.0)).unwrap();
        assert_eq!(panel.bounds_of(first).unwrap().width, 300.0);
        assert_eq!(panel.bounds_of(last).unwrap().width, 0.0);
    }

    #[test]
    fn ratio_change_needs_no_rebuild() {
        let (mut panel, first, _) = panel_with_items(Orientation::Vertical);
        let before = panel.description().cloned();
        panel.set_ratio(0.25).unwrap();
        assert_eq!(panel.description().cloned(), before);
        panel.layout(Rect::from_size(300.0, 100.0)).unwrap();
        assert_eq!(panel.bounds_of(first).unwrap().width, 75.0);
    }

    #[test]
    fn events_follow_the_change_table() {
        let (mut panel, _, _) = panel_with_items(Orientation::Vertical);
        let log = Rc::new(RefCell::new(Vec::new()));
        let subs = [
            ("changed", panel.changed()),
            ("contents", panel.contents_changed()),
            ("orientation", panel.orientation_changed()),
        ]
        .map(|(name, observers)| {
            let log = Rc::clone(&log);
            observers.subscribe(move |_| log.borrow_mut().push(name))
        });

        panel.set_ratio(0.3).unwrap();
        assert_eq!(log.take(), vec!["changed"]);

        panel.set_ratio(0.3).unwrap();
        assert!(log.borrow().is_empty());

        panel.set_insets(Insets::all(1.0)).unwrap();
        assert!(log.borrow().is_empty());

        panel.set_orientation(Orientation::Horizontal);
        assert_eq!(log.take(), vec!["orientation", "changed"]);

        panel.set_first_item(None).unwrap();
        assert_eq!(log.take(), vec!["contents", "changed"]);
        drop(subs);
    }

    #[test]
    fn divider_paints_last() {
        let (mut panel, first, last) = panel_with_items(Orientation::Vertical);
        panel.set_behavior(Some(Box::new(BasicSplitPanelBehavior::new(6.0))));
        let divider = panel.divider().unwrap().id();
        assert_eq!(panel.divider().unwrap().z(), DIVIDER_Z_ORDER);
        let order: Vec<ViewId> = panel.children().collect();
        assert_eq!(order, vec![first, last, divider]);

        panel.set_behavior(None);
        assert_eq!(panel.children().count(), 2);
        assert_eq!(panel.panel_spacing(), 0.0);
    }

    struct Probe {
        events: Rc<RefCell<Vec<&'static str>>>,
        inside: bool,
    }

    impl SplitPanelBehavior for Probe {
        fn render(&self, _: &SplitPanel, canvas: &mut dyn Canvas) {
            canvas.line(Point::ORIGIN, Point::new(1.0, 1.0), Color::BLACK);
        }

        fn contains(&self, _: &SplitPanel, _: Point) -> bool {
            self.inside
        }

        fn install(&mut self, _: &SplitPanel) {
            self.events.borrow_mut().push("install");
        }

        fn uninstall(&mut self, _: &SplitPanel) {
            self.events.borrow_mut().push("uninstall");
        }
    }

    #[test]
    fn behavior_lifecycle_and_delegation() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut panel = SplitPanel::new(Orientation::Vertical, 0.5).unwrap();
        panel.layout(Rect::new(10.0, 10.0, 20.0, 20.0)).unwrap();

        let mut canvas = RecordingCanvas::new(Size::new(20.0, 20.0));
        panel.render(&mut canvas);
        assert!(canvas.commands().is_empty());
        assert!(panel.contains(Point::new(15.0, 15.0)));

        panel.set_behavior(Some(Box::new(Probe {
            events: Rc::clone(&events),
            inside: false,
        })));
        panel.render(&mut canvas);
        assert!(matches!(canvas.commands(), [DrawCommand::Line { .. }]));
        assert!(!panel.contains(Point::new(15.0, 15.0)));

        panel.set_behavior(Some(Box::new(Probe {
            events: Rc::clone(&events),
            inside: true,
        })));
        assert!(panel.contains(Point::new(15.0, 15.0)));
        assert!(!panel.contains(Point::new(5.0, 5.0)));
        assert_eq!(*events.borrow(), vec!["install", "uninstall", "install"]);
        assert!(panel.divider().is_none());
    }

    #[test]
    fn basic_behavior_draws_divider() {
        let (mut panel, _, _) = panel_with_items(Orientation::Vertical);
        panel.set_behavior(Some(Box::new(
            BasicSplitPanelBehavior::new(2.0).background(Color::WHITE),
        )));
        panel.layout(Rect::from_size(40.0, 10.0)).unwrap();
        let mut canvas = RecordingCanvas::new(Size::new(40.0, 10.0));
        panel.render(&mut canvas);
        assert_eq!(
            canvas.commands(),
            &[
                DrawCommand::Rect {
                    rect: Rect::from_size(40.0, 10.0),
                    color: Color::WHITE
                },
                DrawCommand::Rect {
                    rect: Rect::new(19.0, 0.0, 2.0, 10.0),
                    color: Color::LIGHT_GRAY
                },
            ]
        );
    }

    #[test]
    fn orientation_change_moves_divider_thickness() {
        let (mut panel, _, _) = panel_with_items(Orientation::Vertical);
        panel.set_behavior(Some(Box::new(BasicSplitPanelBehavior::new(8.0))));
        panel.layout(Rect::from_size(100.0, 60.0)).unwrap();
        panel.set_orientation(Orientation::Horizontal);
        assert_eq!(panel.panel_spacing(), 8.0);
        panel.layout(Rect::from_size(100.0, 60.0)).unwrap();
        assert_eq!(panel.divider().unwrap().bounds(), Rect::new(0.0, 26.0, 100.0, 8.0));
    }

    #[test]
    fn hidden_divider_takes_no_space() {
        let (mut panel, first, _) = panel_with_items(Orientation::Vertical);
        panel.set_behavior(Some(Box::new(BasicSplitPanelBehavior::new(0.0))));
        assert_eq!(panel.panel_spacing(), 0.0);
        panel.layout(Rect::from_size(300.0, 100.0)).unwrap();
        assert_eq!(panel.bounds_of(first).unwrap().width, 150.0);
    }

    #[test]
    fn config_round_trip() {
        let config = SplitConfig {
            orientation: Orientation::Horizontal,
            ratio: 0.25,
            insets: Insets::all(3.0),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SplitConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        let panel = SplitPanel::from_config(back).unwrap();
        assert_eq!(panel.config(), config);

        let bad = SplitConfig {
            ratio: 1.5,
            ..SplitConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::RatioOutOfRange { ratio: 1.5 }));
        assert!(SplitPanel::from_config(bad).is_err());
    }

    #[test]
    fn removed_item_loses_geometry() {
        let (mut panel, first, last) = panel_with_items(Orientation::Vertical);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _sub = panel
            .contents_changed()
            .subscribe(move |_| counter.set(counter.get() + 1));
        let removed = panel.set_last_item(None).unwrap().unwrap();
        assert_eq!(removed.id(), last);
        let solved = panel.layout(Rect::from_size(30.0, 30.0)).unwrap();
        assert!(solved.get(last.box_id()).is_none());
        assert_eq!(solved.get(first.box_id()), Some(Rect::from_size(30.0, 30.0)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn invalid_insets_are_rejected() {
        let negative = Insets::all(-10.0);
        let config = SplitConfig {
            insets: negative,
            ..SplitConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidInsets { insets: negative })
        );
        assert!(SplitPanel::from_config(config).is_err());

        let (mut panel, first, _) = panel_with_items(Orientation::Vertical);
        panel.set_insets(Insets::all(4.0)).unwrap();
        assert!(matches!(
            panel.set_insets(Insets::all(f64::NAN)),
            Err(ConfigError::InvalidInsets { .. })
        ));
        assert!(panel.set_insets(Insets::new(0.0, f64::INFINITY, 0.0, 0.0)).is_err());
        assert_eq!(panel.insets(), Insets::all(4.0));

        panel.layout(Rect::from_size(108.0, 58.0)).unwrap();
        assert_eq!(panel.bounds_of(first), Some(Rect::new(4.0, 4.0, 50.0, 50.0)));
    }

    #[test]
    fn one_view_cannot_fill_both_slots() {
        let mut panel = SplitPanel::new(Orientation::Vertical, 0.5).unwrap();
        let view = View::new();
        let id = view.id();
        panel.set_first_item(Some(view.clone())).unwrap();

        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let _sub = panel
            .changed()
            .subscribe(move |_| counter.set(counter.get() + 1));

        assert_eq!(
            panel.set_last_item(Some(view.clone())),
            Err(ConfigError::DuplicateItem { id })
        );
        assert!(panel.last_item().is_none());
        assert_eq!(panel.children().collect::<Vec<_>>(), vec![id]);
        assert_eq!(calls.get(), 0);

        let solved = panel.layout(Rect::from_size(20.0, 10.0)).unwrap();
        assert_eq!(solved.get(id.box_id()), Some(Rect::from_size(20.0, 10.0)));

        // Re-setting the same slot is a plain replacement.
        let previous = panel.set_first_item(Some(view)).unwrap();
        assert_eq!(previous.map(|v| v.id()), Some(id));
        assert_eq!(panel.children().count(), 1);
    }

    #[test]
    fn divider_cannot_become_an_item() {
        let (mut panel, _, last) = panel_with_items(Orientation::Vertical);
        panel.set_behavior(Some(Box::new(BasicSplitPanelBehavior::new(4.0))));
        let divider = panel.divider().cloned().unwrap();
        assert_eq!(
            panel.set_first_item(Some(divider.clone())),
            Err(ConfigError::DuplicateItem { id: divider.id() })
        );
        assert_eq!(panel.children().count(), 3);
        assert_eq!(panel.last_item().map(View::id), Some(last));
    }
}
