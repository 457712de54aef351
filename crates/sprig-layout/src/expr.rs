#![forbid(unsafe_code)]

//! Symbolic layout expressions.
//!
//! [`Expr`] is a small arithmetic tree whose leaves are literals,
//! configuration parameters, and box attributes. Operators are overloaded on
//! [`Expr`], [`AttrRef`], and [`Param`] so equations read like arithmetic.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};
use sprig_core::geometry::{Insets, Size};

use crate::error::LayoutError;

// ============================================================================
// BoxId
// ============================================================================

/// Identifies a box inside a layout description.
///
/// `0` is reserved for the parent box ([`BoxId::PARENT`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoxId(u64);

impl BoxId {
    /// The container whose children are being laid out.
    pub const PARENT: Self = Self(0);

    /// Create a child box id.
    ///
    /// # Panics
    /// If `raw` is 0, which is reserved for [`BoxId::PARENT`].
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        assert!(raw != 0, "BoxId 0 is reserved for the parent box");
        Self(raw)
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_parent(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_parent() {
            f.write_str("parent")
        } else {
            write!(f, "B{}", self.0)
        }
    }
}

// ============================================================================
// Attribute
// ============================================================================

/// Layout axis an attribute belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// left, right, width, centerX
    X,
    /// top, bottom, height, centerY
    Y,
}

/// Addressable geometric attribute of a box.
///
/// `Width`, `Height`, `CenterX`, and `CenterY` are derived from the edges but
/// may also be constrained directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Top,
    Left,
    Right,
    Bottom,
    Width,
    Height,
    CenterX,
    CenterY,
}

impl Attribute {
    pub const ALL: [Attribute; 8] = [
        Attribute::Top,
        Attribute::Left,
        Attribute::Right,
        Attribute::Bottom,
        Attribute::Width,
        Attribute::Height,
        Attribute::CenterX,
        Attribute::CenterY,
    ];

    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Attribute::Left | Attribute::Right | Attribute::Width | Attribute::CenterX => Axis::X,
            Attribute::Top | Attribute::Bottom | Attribute::Height | Attribute::CenterY => Axis::Y,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Attribute::Top => "top",
            Attribute::Left => "left",
            Attribute::Right => "right",
            Attribute::Bottom => "bottom",
            Attribute::Width => "width",
            Attribute::Height => "height",
            Attribute::CenterX => "centerX",
            Attribute::CenterY => "centerY",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One attribute of one box, e.g. `first.right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttrRef {
    pub box_id: BoxId,
    pub attribute: Attribute,
}

impl AttrRef {
    #[must_use]
    pub const fn new(box_id: BoxId, attribute: Attribute) -> Self {
        Self { box_id, attribute }
    }
}

impl fmt::Display for AttrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.box_id, self.attribute)
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// Configuration literal read when a description is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    InsetTop,
    InsetLeft,
    InsetBottom,
    InsetRight,
    /// Fraction of the content size given to the first item.
    Ratio,
    /// Thickness reserved between items (the divider).
    PanelSpacing,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Param::InsetTop => "insets.top",
            Param::InsetLeft => "insets.left",
            Param::InsetBottom => "insets.bottom",
            Param::InsetRight => "insets.right",
            Param::Ratio => "ratio",
            Param::PanelSpacing => "panelSpacing",
        };
        f.write_str(name)
    }
}

/// Supplies live values at resolve time.
pub trait ParamSource {
    /// Current value of `param`.
    fn param(&self, param: Param) -> f64;

    /// Current size of a child box, used for an axis that its constraints
    /// pin by a single attribute (e.g. a divider positioned by its center).
    fn current_size(&self, box_id: BoxId) -> Option<Size> {
        let _ = box_id;
        None
    }
}

/// Plain parameter snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub insets: Insets,
    pub ratio: f64,
    pub panel_spacing: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            insets: Insets::NONE,
            ratio: 0.5,
            panel_spacing: 0.0,
        }
    }
}

impl ParamSource for Params {
    fn param(&self, param: Param) -> f64 {
        match param {
            Param::InsetTop => self.insets.top,
            Param::InsetLeft => self.insets.left,
            Param::InsetBottom => self.insets.bottom,
            Param::InsetRight => self.insets.right,
            Param::Ratio => self.ratio,
            Param::PanelSpacing => self.panel_spacing,
        }
    }
}

// ============================================================================
// Expr
// ============================================================================

/// Arithmetic expression over literals, parameters, and attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Param(Param),
    Attr(AttrRef),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
}

impl Expr {
    /// Evaluate against the attributes known so far.
    ///
    /// Returns `Ok(None)` while any referenced attribute is still unknown.
    /// `target` is only used to label errors.
    pub fn eval(
        &self,
        known: &dyn Fn(AttrRef) -> Option<f64>,
        params: &dyn ParamSource,
        target: AttrRef,
    ) -> Result<Option<f64>, LayoutError> {
        let value = match self {
            Expr::Const(value) => *value,
            Expr::Param(param) => params.param(*param),
            Expr::Attr(attr) => match known(*attr) {
                Some(value) => value,
                None => return Ok(None),
            },
            Expr::Neg(inner) => match inner.eval(known, params, target)? {
                Some(value) => -value,
                None => return Ok(None),
            },
            Expr::Add(lhs, rhs) | Expr::Sub(lhs, rhs) | Expr::Mul(lhs, rhs) | Expr::Div(lhs, rhs) => {
                let Some(a) = lhs.eval(known, params, target)? else {
                    return Ok(None);
                };
                let Some(b) = rhs.eval(known, params, target)? else {
                    return Ok(None);
                };
                match self {
                    Expr::Add(..) => a + b,
                    Expr::Sub(..) => a - b,
                    Expr::Mul(..) => a * b,
                    _ => {
                        if b == 0.0 {
                            return Err(LayoutError::DivisionByZero { target });
                        }
                        a / b
                    }
                }
            }
        };
        Ok(Some(value))
    }

    /// Every attribute this expression reads, in left-to-right order.
    #[must_use]
    pub fn dependencies(&self) -> Vec<AttrRef> {
        let mut out = Vec::new();
        self.collect_dependencies(&mut out);
        out
    }

    fn collect_dependencies(&self, out: &mut Vec<AttrRef>) {
        match self {
            Expr::Const(_) | Expr::Param(_) => {}
            Expr::Attr(attr) => out.push(*attr),
            Expr::Neg(inner) => inner.collect_dependencies(out),
            Expr::Add(lhs, rhs) | Expr::Sub(lhs, rhs) | Expr::Mul(lhs, rhs) | Expr::Div(lhs, rhs) => {
                lhs.collect_dependencies(out);
                rhs.collect_dependencies(out);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(f, "{value}"),
            Expr::Param(param) => write!(f, "{param}"),
            Expr::Attr(attr) => write!(f, "{attr}"),
            Expr::Neg(inner) => write!(f, "-({inner})"),
            Expr::Add(lhs, rhs) => write!(f, "({lhs} + {rhs})"),
            Expr::Sub(lhs, rhs) => write!(f, "({lhs} - {rhs})"),
            Expr::Mul(lhs, rhs) => write!(f, "{lhs} * {rhs}"),
            Expr::Div(lhs, rhs) => write!(f, "{lhs} / {rhs}"),
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Const(value)
    }
}

impl From<Param> for Expr {
    fn from(param: Param) -> Self {
        Expr::Param(param)
    }
}

impl From<AttrRef> for Expr {
    fn from(attr: AttrRef) -> Self {
        Expr::Attr(attr)
    }
}

macro_rules! impl_binary_ops {
    ($($lhs:ty),+) => {
        $(
            impl<R: Into<Expr>> Add<R> for $lhs {
                type Output = Expr;
                fn add(self, rhs: R) -> Expr {
                    Expr::Add(Box::new(self.into()), Box::new(rhs.into()))
                }
            }

            impl<R: Into<Expr>> Sub<R> for $lhs {
                type Output = Expr;
                fn sub(self, rhs: R) -> Expr {
                    Expr::Sub(Box::new(self.into()), Box::new(rhs.into()))
                }
            }

            impl<R: Into<Expr>> Mul<R> for $lhs {
                type Output = Expr;
                fn mul(self, rhs: R) -> Expr {
                    Expr::Mul(Box::new(self.into()), Box::new(rhs.into()))
                }
            }

            impl<R: Into<Expr>> Div<R> for $lhs {
                type Output = Expr;
                fn div(self, rhs: R) -> Expr {
                    Expr::Div(Box::new(self.into()), Box::new(rhs.into()))
                }
            }

            impl Neg for $lhs {
                type Output = Expr;
                fn neg(self) -> Expr {
                    Expr::Neg(Box::new(self.into()))
                }
            }
        )+
    };
}

impl_binary_ops!(Expr, AttrRef, Param);
