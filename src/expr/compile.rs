use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::error::ExprError;
use crate::expr::emit::{emit, Bindings, Scalar};
use crate::expr::parser::parse;
use crate::expr::{Kind, Value};
use crate::math::{Vector3, EPSILON};

/// Most input slots a formula may bind (a vector takes three)
pub const MAX_SLOTS: usize = 16;

/// One compiled output component
type Kernel = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// A declared formula parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: Kind,
    pub slot: usize,
}

/// A formula compiled into one closure per output component
pub struct Formula {
    source: String,
    params: Vec<Param>,
    kind: Kind,
    slot_count: usize,
    text: Vec<String>,
    kernels: Vec<Kernel>,
}

/// Compiles `source` into a reusable [`Formula`].
///
/// `params` fixes the argument order; identifiers made of uppercase letters
/// are vectors, those containing lowercase letters are scalars.
pub fn compile(source: &str, params: &[&str], kind: Kind) -> Result<Formula, ExprError> {
    let node = parse(source)?;

    let mut bindings = Bindings::default();
    let mut declared = Vec::with_capacity(params.len());
    for name in params {
        let (param_kind, slot) = bindings.declare(name)?;
        declared.push(Param {
            name: name.to_string(),
            kind: param_kind,
            slot,
        });
    }
    if bindings.slot_count() > MAX_SLOTS {
        return Err(ExprError::TooManySlots {
            slots: bindings.slot_count(),
            max: MAX_SLOTS,
        });
    }

    let emitted = emit(&node, &bindings)?;
    if emitted.kind != kind {
        return Err(ExprError::OutputKind {
            expected: kind,
            found: emitted.kind,
        });
    }

    let text: Vec<String> = emitted
        .components
        .iter()
        .map(|c| c.render(bindings.slot_names()))
        .collect();
    debug!("compiled formula `{}` -> [{}]", source, text.join(", "));

    Ok(Formula {
        source: source.to_string(),
        params: declared,
        kind,
        slot_count: bindings.slot_count(),
        text,
        kernels: emitted.components.iter().map(kernel).collect(),
    })
}

fn kernel(expr: &Scalar) -> Kernel {
    match expr {
        Scalar::Const(value) => {
            let value = *value;
            Box::new(move |_| value)
        }
        Scalar::Slot(slot) => {
            let slot = *slot;
            Box::new(move |slots| slots.get(slot).copied().unwrap_or(0.0))
        }
        Scalar::Neg(a) => {
            let a = kernel(a);
            Box::new(move |s| -a(s))
        }
        Scalar::Add(a, b) => {
            let (a, b) = (kernel(a), kernel(b));
            Box::new(move |s| a(s) + b(s))
        }
        Scalar::Sub(a, b) => {
            let (a, b) = (kernel(a), kernel(b));
            Box::new(move |s| a(s) - b(s))
        }
        Scalar::Mul(a, b) => {
            let (a, b) = (kernel(a), kernel(b));
            Box::new(move |s| a(s) * b(s))
        }
        Scalar::Div(a, b) => {
            let (a, b) = (kernel(a), kernel(b));
            Box::new(move |s| a(s) / b(s))
        }
        Scalar::Sqrt(a) => {
            let a = kernel(a);
            Box::new(move |s| a(s).sqrt())
        }
        Scalar::Abs(a) => {
            let a = kernel(a);
            Box::new(move |s| a(s).abs())
        }
        Scalar::Recip(a) => {
            let a = kernel(a);
            Box::new(move |s| {
                let value = a(s);
                if value > EPSILON {
                    1.0 / value
                } else {
                    0.0
                }
            })
        }
    }
}

impl Formula {
    /// The formula as written
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Emitted source text, one entry per output component
    pub fn components(&self) -> &[String] {
        &self.text
    }

    /// Evaluates the formula with arguments in parameter order
    pub fn eval(&self, args: &[Value]) -> Result<Value, ExprError> {
        if args.len() != self.params.len() {
            return Err(ExprError::ArgumentCount {
                expected: self.params.len(),
                found: args.len(),
            });
        }

        let mut slots = [0.0; MAX_SLOTS];
        for (param, arg) in self.params.iter().zip(args) {
            match (param.kind, arg) {
                (Kind::Scalar, Value::Scalar(value)) => slots[param.slot] = *value,
                (Kind::Vector, Value::Vector(v)) => {
                    slots[param.slot] = v.x;
                    slots[param.slot + 1] = v.y;
                    slots[param.slot + 2] = v.z;
                }
                (expected, _) => {
                    return Err(ExprError::ArgumentKind {
                        name: param.name.clone(),
                        expected,
                    })
                }
            }
        }

        Ok(self.eval_slots(&slots[..self.slot_count]))
    }

    /// Evaluates against pre-flattened input slots, skipping argument checks
    pub fn eval_slots(&self, slots: &[f64]) -> Value {
        match self.kind {
            Kind::Scalar => Value::Scalar(self.scalar_from_slots(slots)),
            Kind::Vector => Value::Vector(self.vector_from_slots(slots)),
        }
    }

    #[inline]
    pub(crate) fn vector_from_slots(&self, slots: &[f64]) -> Vector3 {
        let component = |i: usize| self.kernels.get(i).map_or(0.0, |k| k(slots));
        Vector3::new(component(0), component(1), component(2))
    }

    #[inline]
    pub(crate) fn scalar_from_slots(&self, slots: &[f64]) -> f64 {
        self.kernels.first().map_or(0.0, |k| k(slots))
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Formula")
            .field("source", &self.source)
            .field("params", &self.params)
            .field("kind", &self.kind)
            .field("components", &self.text)
            .finish()
    }
}

/// Compiles each distinct formula once and hands out shared handles
#[derive(Debug, Default)]
pub struct FormulaCache {
    formulas: HashMap<(String, Vec<String>, Kind), Arc<Formula>>,
}

impl FormulaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compile(&mut self, source: &str, params: &[&str], kind: Kind) -> Result<Arc<Formula>, ExprError> {
        let key = (
            source.to_string(),
            params.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
            kind,
        );
        if let Some(formula) = self.formulas.get(&key) {
            return Ok(Arc::clone(formula));
        }

        let formula = Arc::new(compile(source, params, kind)?);
        self.formulas.insert(key, Arc::clone(&formula));
        Ok(formula)
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn scalar_formula_evaluates_with_precedence() {
        let f = compile("a + b * c", &["a", "b", "c"], Kind::Scalar).unwrap();
        let value = f.eval(&[2.0.into(), 3.0.into(), 4.0.into()]).unwrap();
        assert_eq!(value, Value::Scalar(14.0));
    }

    #[test]
    fn magnitude_and_normalize_agree_with_vector_math() {
        let v = Vector3::new(3.0, -4.0, 12.0);
        let len = compile("|V|", &["V"], Kind::Scalar).unwrap();
        let unit = compile("~V", &["V"], Kind::Vector).unwrap();
        assert_relative_eq!(len.eval(&[v.into()]).unwrap().as_scalar().unwrap(), 13.0, epsilon = 1e-12);
        assert_relative_eq!(unit.eval(&[v.into()]).unwrap().as_vector().unwrap(), v.normalize(), epsilon = 1e-12);
    }

    #[test]
    fn normalize_of_zero_vector_is_zero() {
        let unit = compile("~V", &["V"], Kind::Vector).unwrap();
        assert_eq!(unit.eval(&[Vector3::ZERO.into()]).unwrap(), Value::Vector(Vector3::ZERO));
    }

    #[test]
    fn output_kind_is_checked() {
        let err = compile("A . B", &["A", "B"], Kind::Vector).unwrap_err();
        assert_eq!(err, ExprError::OutputKind { expected: Kind::Vector, found: Kind::Scalar });
    }

    #[test]
    fn arguments_are_checked() {
        let f = compile("A * t", &["A", "t"], Kind::Vector).unwrap();
        assert_eq!(
            f.eval(&[Vector3::ZERO.into()]).unwrap_err(),
            ExprError::ArgumentCount { expected: 2, found: 1 }
        );
        assert_eq!(
            f.eval(&[1.0.into(), 1.0.into()]).unwrap_err(),
            ExprError::ArgumentKind { name: "A".into(), expected: Kind::Vector }
        );
    }

    #[test]
    fn too_many_parameters_are_rejected() {
        let names = ["A", "B", "C", "D", "E", "F"];
        assert_eq!(
            compile("A", &names, Kind::Vector).unwrap_err(),
            ExprError::TooManySlots { slots: 18, max: MAX_SLOTS }
        );
    }

    #[test]
    fn cache_compiles_each_formula_once() {
        let mut cache = FormulaCache::new();
        let first = cache.get_or_compile("A x B", &["A", "B"], Kind::Vector).unwrap();
        let second = cache.get_or_compile("A x B", &["A", "B"], Kind::Vector).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }
}
