#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sprig_core::Rect;
use sprig_layout::{AttrRef, Attribute, BoxId, Expr, LayoutDescription, Param, Params};

const ATTRIBUTES: [Attribute; 8] = Attribute::ALL;
const PARAMS: [Param; 6] = [
    Param::InsetTop,
    Param::InsetLeft,
    Param::InsetBottom,
    Param::InsetRight,
    Param::Ratio,
    Param::PanelSpacing,
];

#[derive(Debug, Arbitrary)]
enum Term {
    Const(i16),
    Param(u8),
    /// Box index (0 is the parent) and attribute index.
    Attr(u8, u8),
}

#[derive(Debug, Arbitrary)]
struct Equation {
    target_box: u8,
    target_attr: u8,
    lhs: Term,
    rhs: Option<(u8, Term)>,
}

#[derive(Debug, Arbitrary)]
struct Input {
    width: u16,
    height: u16,
    ratio: u8,
    spacing: u8,
    equations: Vec<Equation>,
}

fn attr(box_index: u8, attr_index: u8) -> AttrRef {
    let box_id = match box_index % 4 {
        0 => BoxId::PARENT,
        n => BoxId::new(u64::from(n)),
    };
    AttrRef::new(box_id, ATTRIBUTES[usize::from(attr_index) % ATTRIBUTES.len()])
}

fn term(term: &Term) -> Expr {
    match *term {
        Term::Const(n) => Expr::Const(f64::from(n)),
        Term::Param(p) => Expr::Param(PARAMS[usize::from(p) % PARAMS.len()]),
        Term::Attr(b, a) => Expr::Attr(attr(b, a)),
    }
}

fuzz_target!(|input: Input| {
    let boxes = [BoxId::new(1), BoxId::new(2), BoxId::new(3)];
    let mut description = LayoutDescription::new();
    description.constrain(boxes, |c, _| {
        for eq in &input.equations {
            let lhs = term(&eq.lhs);
            let expr = match &eq.rhs {
                None => lhs,
                Some((op, rhs)) => {
                    let rhs = term(rhs);
                    match op % 4 {
                        0 => lhs + rhs,
                        1 => lhs - rhs,
                        2 => lhs * rhs,
                        _ => lhs / rhs,
                    }
                }
            };
            c.set(attr(eq.target_box, eq.target_attr), expr);
        }
    });

    let params = Params {
        ratio: f64::from(input.ratio) / 255.0,
        panel_spacing: f64::from(input.spacing),
        ..Params::default()
    };
    let parent = Rect::from_size(f64::from(input.width), f64::from(input.height));

    // Must terminate with either finite bounds or an error.
    if let Ok(solved) = description.resolve(parent, &params) {
        for (_, rect) in solved.iter() {
            assert!(rect.x.is_finite() && rect.y.is_finite());
            assert!(rect.width.is_finite() && rect.height.is_finite());
        }
    }
});
