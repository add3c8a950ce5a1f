//! A small vector-algebra language for the kinematics formulas.
//!
//! Source text is tokenized, parsed into a syntax tree, type checked while
//! being lowered to one scalar expression per output component, and finally
//! turned into a set of closures over a flat slice of input slots.

pub mod token;
pub mod parser;
pub mod emit;
mod compile;
pub mod formulas;

use std::fmt;

use crate::math::Vector3;

pub use self::compile::{compile, Formula, FormulaCache, Param, MAX_SLOTS};
pub use self::formulas::{CompiledFormulas, FallbackFormulas, FormulaBackend, KinematicFormulas};

/// Static type of an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    Scalar,
    Vector,
}

impl Kind {
    /// Identifiers containing a lowercase letter name scalars, all-uppercase
    /// identifiers name vectors. The bare word `x` is the cross operator.
    pub fn of_identifier(name: &str) -> Option<Kind> {
        if name == "x" {
            return None;
        }
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return None,
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }

        if name.chars().any(|c| c.is_ascii_lowercase()) {
            Some(Kind::Scalar)
        } else if name.chars().any(|c| c.is_ascii_uppercase()) {
            Some(Kind::Vector)
        } else {
            None
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Kind::Scalar => write!(f, "scalar"),
            Kind::Vector => write!(f, "vector"),
        }
    }
}

/// A formula argument or result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Scalar(f64),
    Vector(Vector3),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Scalar(_) => Kind::Scalar,
            Value::Vector(_) => Kind::Vector,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(value) => Some(*value),
            Value::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vector3> {
        match self {
            Value::Vector(v) => Some(*v),
            Value::Scalar(_) => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(value)
    }
}

impl From<Vector3> for Value {
    fn from(v: Vector3) -> Self {
        Value::Vector(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_case_decides_kind() {
        assert_eq!(Kind::of_identifier("V"), Some(Kind::Vector));
        assert_eq!(Kind::of_identifier("AB2"), Some(Kind::Vector));
        assert_eq!(Kind::of_identifier("mu"), Some(Kind::Scalar));
        assert_eq!(Kind::of_identifier("tA"), Some(Kind::Scalar));
        assert_eq!(Kind::of_identifier("x"), None);
        assert_eq!(Kind::of_identifier("2a"), None);
        assert_eq!(Kind::of_identifier("_"), None);
    }
}
