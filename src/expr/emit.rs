//! Lowers a typed syntax tree to one scalar expression per output component.

use std::collections::HashMap;

use crate::error::ExprError;
use crate::expr::parser::{BinaryOp, Node, UnaryOp};
use crate::expr::Kind;
use crate::math::EPSILON;

/// A scalar expression over numbered input slots
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Const(f64),
    Slot(usize),
    Neg(Box<Scalar>),
    Add(Box<Scalar>, Box<Scalar>),
    Sub(Box<Scalar>, Box<Scalar>),
    Mul(Box<Scalar>, Box<Scalar>),
    Div(Box<Scalar>, Box<Scalar>),
    Sqrt(Box<Scalar>),
    Abs(Box<Scalar>),
    /// `1 / x`, or `0` when `x` is (near) zero
    Recip(Box<Scalar>),
}

/// Result of lowering a node: its kind and 1 or 3 component expressions
#[derive(Debug, Clone)]
pub struct Emitted {
    pub kind: Kind,
    pub components: Vec<Scalar>,
}

/// Maps parameter names to their kind and first input slot
#[derive(Debug, Default)]
pub struct Bindings {
    symbols: HashMap<String, (Kind, usize)>,
    slot_names: Vec<String>,
}

impl Bindings {
    /// Declares a parameter; vectors take three consecutive slots
    pub fn declare(&mut self, name: &str) -> Result<(Kind, usize), ExprError> {
        let kind = Kind::of_identifier(name).ok_or_else(|| ExprError::InvalidParameter(name.to_string()))?;
        if self.symbols.contains_key(name) {
            return Err(ExprError::InvalidParameter(name.to_string()));
        }

        let slot = self.slot_names.len();
        match kind {
            Kind::Scalar => self.slot_names.push(name.to_string()),
            Kind::Vector => {
                for axis in ["x", "y", "z"] {
                    self.slot_names.push(format!("{}.{}", name, axis));
                }
            }
        }
        self.symbols.insert(name.to_string(), (kind, slot));
        Ok((kind, slot))
    }

    pub fn slot_count(&self) -> usize {
        self.slot_names.len()
    }

    pub fn slot_names(&self) -> &[String] {
        &self.slot_names
    }
}

pub fn emit(node: &Node, bindings: &Bindings) -> Result<Emitted, ExprError> {
    match node {
        Node::Number(value) => Ok(scalar(Scalar::Const(*value))),
        Node::Symbol(name) => {
            let (kind, slot) = bindings
                .symbols
                .get(name)
                .copied()
                .ok_or_else(|| ExprError::UnknownSymbol(name.clone()))?;
            Ok(match kind {
                Kind::Scalar => scalar(Scalar::Slot(slot)),
                Kind::Vector => vector([Scalar::Slot(slot), Scalar::Slot(slot + 1), Scalar::Slot(slot + 2)]),
            })
        }
        Node::Literal(elements) => {
            let mut components = Vec::with_capacity(3);
            for element in elements.iter() {
                let lowered = emit(element, bindings)?;
                if lowered.kind != Kind::Scalar {
                    return Err(ExprError::NestedVector);
                }
                components.extend(lowered.components);
            }
            Ok(Emitted { kind: Kind::Vector, components })
        }
        Node::Unary { op, operand } => unary(*op, emit(operand, bindings)?),
        Node::Binary { op, lhs, rhs } => binary(*op, emit(lhs, bindings)?, emit(rhs, bindings)?),
    }
}

fn scalar(component: Scalar) -> Emitted {
    Emitted { kind: Kind::Scalar, components: vec![component] }
}

fn vector(components: [Scalar; 3]) -> Emitted {
    Emitted { kind: Kind::Vector, components: components.into() }
}

fn unary(op: UnaryOp, operand: Emitted) -> Result<Emitted, ExprError> {
    match (op, operand.kind) {
        (UnaryOp::Negate, kind) => Ok(Emitted {
            kind,
            components: operand.components.into_iter().map(neg).collect(),
        }),
        (UnaryOp::Magnitude, Kind::Scalar) => Ok(scalar(abs(first(operand.components)))),
        (UnaryOp::Magnitude, Kind::Vector) => {
            let c = operand.components;
            Ok(scalar(sqrt(dot(&c, &c))))
        }
        (UnaryOp::Normalize, Kind::Vector) => {
            let c = operand.components;
            let inverse = recip(sqrt(dot(&c, &c)));
            Ok(Emitted {
                kind: Kind::Vector,
                components: c.into_iter().map(|ci| mul(ci, inverse.clone())).collect(),
            })
        }
        (UnaryOp::Normalize, Kind::Scalar) => Err(ExprError::InvalidOperand {
            operator: op.symbol(),
            operand: Kind::Scalar,
        }),
    }
}

fn binary(op: BinaryOp, lhs: Emitted, rhs: Emitted) -> Result<Emitted, ExprError> {
    let (left, right) = (lhs.kind, rhs.kind);

    match (op, left, right) {
        (BinaryOp::Add | BinaryOp::Sub, l, r) if l == r => {
            let combine = if op == BinaryOp::Add { add } else { sub };
            Ok(Emitted {
                kind: l,
                components: zip(lhs.components, rhs.components, combine),
            })
        }
        (BinaryOp::Mul, Kind::Scalar, Kind::Scalar) => {
            Ok(scalar(mul(first(lhs.components), first(rhs.components))))
        }
        (BinaryOp::Div, Kind::Scalar, Kind::Scalar) => {
            Ok(scalar(div(first(lhs.components), first(rhs.components))))
        }
        (BinaryOp::Mul | BinaryOp::Div, Kind::Vector, Kind::Scalar) => {
            let factor = first(rhs.components);
            let combine = if op == BinaryOp::Mul { mul } else { div };
            Ok(Emitted {
                kind: Kind::Vector,
                components: lhs.components.into_iter().map(|c| combine(c, factor.clone())).collect(),
            })
        }
        (BinaryOp::Mul, Kind::Scalar, Kind::Vector) => {
            let factor = first(lhs.components);
            Ok(Emitted {
                kind: Kind::Vector,
                components: rhs.components.into_iter().map(|c| mul(factor.clone(), c)).collect(),
            })
        }
        (BinaryOp::Dot, Kind::Vector, Kind::Vector) => Ok(scalar(dot(&lhs.components, &rhs.components))),
        (BinaryOp::Cross, Kind::Vector, Kind::Vector) => {
            let (a, b) = (&lhs.components, &rhs.components);
            let term = |i: usize, j: usize, k: usize, l: usize| {
                sub(mul(a[i].clone(), b[j].clone()), mul(a[k].clone(), b[l].clone()))
            };
            Ok(vector([term(1, 2, 2, 1), term(2, 0, 0, 2), term(0, 1, 1, 0)]))
        }
        _ => Err(ExprError::TypeMismatch {
            operator: op.symbol(),
            left,
            right,
        }),
    }
}

fn first(components: Vec<Scalar>) -> Scalar {
    components.into_iter().next().unwrap_or(Scalar::Const(0.0))
}

fn zip(a: Vec<Scalar>, b: Vec<Scalar>, combine: fn(Scalar, Scalar) -> Scalar) -> Vec<Scalar> {
    a.into_iter().zip(b).map(|(x, y)| combine(x, y)).collect()
}

fn dot(a: &[Scalar], b: &[Scalar]) -> Scalar {
    a.iter()
        .zip(b)
        .map(|(x, y)| mul(x.clone(), y.clone()))
        .reduce(add)
        .unwrap_or(Scalar::Const(0.0))
}

// Constructors below fold constants and the 0/1 identities so that products
// with literal axes collapse to the surviving terms.

fn add(a: Scalar, b: Scalar) -> Scalar {
    match (a, b) {
        (Scalar::Const(x), Scalar::Const(y)) => Scalar::Const(x + y),
        (Scalar::Const(z), other) | (other, Scalar::Const(z)) if z == 0.0 => other,
        (a, b) => Scalar::Add(Box::new(a), Box::new(b)),
    }
}

fn sub(a: Scalar, b: Scalar) -> Scalar {
    match (a, b) {
        (Scalar::Const(x), Scalar::Const(y)) => Scalar::Const(x - y),
        (a, Scalar::Const(z)) if z == 0.0 => a,
        (Scalar::Const(z), b) if z == 0.0 => neg(b),
        (a, b) => Scalar::Sub(Box::new(a), Box::new(b)),
    }
}

fn mul(a: Scalar, b: Scalar) -> Scalar {
    match (a, b) {
        (Scalar::Const(x), Scalar::Const(y)) => Scalar::Const(x * y),
        (Scalar::Const(z), _) | (_, Scalar::Const(z)) if z == 0.0 => Scalar::Const(0.0),
        (Scalar::Const(one), other) | (other, Scalar::Const(one)) if one == 1.0 => other,
        (a, b) => Scalar::Mul(Box::new(a), Box::new(b)),
    }
}

fn div(a: Scalar, b: Scalar) -> Scalar {
    match (a, b) {
        (Scalar::Const(x), Scalar::Const(y)) if y != 0.0 => Scalar::Const(x / y),
        (Scalar::Const(z), _) if z == 0.0 => Scalar::Const(0.0),
        (a, Scalar::Const(one)) if one == 1.0 => a,
        (a, b) => Scalar::Div(Box::new(a), Box::new(b)),
    }
}

fn neg(a: Scalar) -> Scalar {
    match a {
        Scalar::Const(x) => Scalar::Const(-x),
        Scalar::Neg(inner) => *inner,
        other => Scalar::Neg(Box::new(other)),
    }
}

fn sqrt(a: Scalar) -> Scalar {
    match a {
        Scalar::Const(x) => Scalar::Const(x.sqrt()),
        other => Scalar::Sqrt(Box::new(other)),
    }
}

fn abs(a: Scalar) -> Scalar {
    match a {
        Scalar::Const(x) => Scalar::Const(x.abs()),
        other => Scalar::Abs(Box::new(other)),
    }
}

fn recip(a: Scalar) -> Scalar {
    match a {
        Scalar::Const(x) => Scalar::Const(if x > EPSILON { 1.0 / x } else { 0.0 }),
        other => Scalar::Recip(Box::new(other)),
    }
}

impl Scalar {
    /// Renders the expression as source text using the given slot names
    pub fn render(&self, names: &[String]) -> String {
        match self {
            Scalar::Const(value) => format!("{:?}", value),
            Scalar::Slot(slot) => names.get(*slot).cloned().unwrap_or_else(|| format!("${}", slot)),
            Scalar::Neg(a) => format!("(-{})", a.render(names)),
            Scalar::Add(a, b) => format!("({} + {})", a.render(names), b.render(names)),
            Scalar::Sub(a, b) => format!("({} - {})", a.render(names), b.render(names)),
            Scalar::Mul(a, b) => format!("({} * {})", a.render(names), b.render(names)),
            Scalar::Div(a, b) => format!("({} / {})", a.render(names), b.render(names)),
            Scalar::Sqrt(a) => format!("sqrt({})", a.render(names)),
            Scalar::Abs(a) => format!("abs({})", a.render(names)),
            Scalar::Recip(a) => format!("recip({})", a.render(names)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parser::parse;

    fn lower(source: &str, params: &[&str]) -> Result<(Emitted, Bindings), ExprError> {
        let mut bindings = Bindings::default();
        for name in params {
            bindings.declare(name)?;
        }
        let emitted = emit(&parse(source)?, &bindings)?;
        Ok((emitted, bindings))
    }

    #[test]
    fn cross_with_literal_axis_folds_to_two_terms() {
        let (emitted, bindings) = lower("[0, 0, 1] x V", &["V"]).unwrap();
        let text: Vec<String> = emitted
            .components
            .iter()
            .map(|c| c.render(bindings.slot_names()))
            .collect();
        assert_eq!(text, vec!["(-V.y)", "V.x", "0.0"]);
    }

    #[test]
    fn dot_produces_a_single_component() {
        let (emitted, _) = lower("A . B", &["A", "B"]).unwrap();
        assert_eq!(emitted.kind, Kind::Scalar);
        assert_eq!(emitted.components.len(), 1);
    }

    #[test]
    fn adding_scalar_to_vector_is_a_type_error() {
        assert_eq!(
            lower("A + t", &["A", "t"]).unwrap_err(),
            ExprError::TypeMismatch { operator: "+", left: Kind::Vector, right: Kind::Scalar }
        );
    }

    #[test]
    fn normalizing_a_scalar_is_rejected() {
        assert_eq!(
            lower("~t", &["t"]).unwrap_err(),
            ExprError::InvalidOperand { operator: "~", operand: Kind::Scalar }
        );
    }

    #[test]
    fn undeclared_symbols_are_rejected() {
        assert_eq!(lower("A x C", &["A"]).unwrap_err(), ExprError::UnknownSymbol("C".into()));
    }

    #[test]
    fn vectors_inside_literals_are_rejected() {
        assert_eq!(lower("[A, 0, 0]", &["A"]).unwrap_err(), ExprError::NestedVector);
    }

    #[test]
    fn duplicate_parameters_are_rejected() {
        assert_eq!(lower("A", &["A", "A"]).unwrap_err(), ExprError::InvalidParameter("A".into()));
    }
}
