#![forbid(unsafe_code)]

//! Layout resolution errors.

use std::fmt;

use crate::expr::{AttrRef, Attribute, BoxId};

/// Error returned when a description cannot be resolved into bounds.
///
/// All variants are configuration errors: the description or its inputs are
/// wrong, and retrying with the same inputs fails the same way.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// An attribute of a child box is not determined by any constraint.
    Unresolved { box_id: BoxId, attribute: Attribute },
    /// Constraints depend on each other in a loop.
    Cycle { path: Vec<AttrRef> },
    /// A divisor evaluated to zero.
    DivisionByZero { target: AttrRef },
    /// A constraint evaluated to NaN or infinity.
    NonFinite { target: AttrRef, value: f64 },
    /// A constraint reads a box that is not part of the description.
    UnknownBox { box_id: BoxId },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved { box_id, attribute } => {
                write!(f, "layout attribute {box_id}.{attribute} could not be resolved")
            }
            Self::Cycle { path } => {
                f.write_str("layout cycle detected: ")?;
                for (i, attr) in path.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" → ")?;
                    }
                    write!(f, "{attr}")?;
                }
                Ok(())
            }
            Self::DivisionByZero { target } => {
                write!(f, "division by zero while resolving {target}")
            }
            Self::NonFinite { target, value } => {
                write!(f, "{target} resolved to non-finite value {value}")
            }
            Self::UnknownBox { box_id } => {
                write!(f, "constraint references unknown box {box_id}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_display_lists_path() {
        let a = AttrRef::new(BoxId::new(1), Attribute::Left);
        let b = AttrRef::new(BoxId::new(2), Attribute::Right);
        let err = LayoutError::Cycle {
            path: vec![a, b, a],
        };
        assert_eq!(
            err.to_string(),
            "layout cycle detected: B1.left → B2.right → B1.left"
        );
    }

    #[test]
    fn unresolved_display() {
        let err = LayoutError::Unresolved {
            box_id: BoxId::new(3),
            attribute: Attribute::Top,
        };
        assert_eq!(err.to_string(), "layout attribute B3.top could not be resolved");
    }
}
