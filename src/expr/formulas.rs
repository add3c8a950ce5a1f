//! The kinematics formulas used by the regime integrator.

use once_cell::sync::Lazy;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::expr::{compile, Formula, Kind};
use crate::math::{Vector3, TABLE_NORMAL};

/// Source and parameter list of a built-in formula
#[derive(Debug, Clone, Copy)]
pub struct FormulaSpec {
    pub name: &'static str,
    pub source: &'static str,
    pub params: &'static [&'static str],
    pub kind: Kind,
}

pub const DELTA_R: FormulaSpec = FormulaSpec {
    name: "deltaR",
    source: "V * t + A * (t * t / 2)",
    params: &["V", "A", "t"],
    kind: Kind::Vector,
};

pub const DELTA_RU: FormulaSpec = FormulaSpec {
    name: "deltaRU",
    source: "V * t + ~U * (a * t * t / 2)",
    params: &["V", "U", "a", "t"],
    kind: Kind::Vector,
};

pub const DELTA_V: FormulaSpec = FormulaSpec {
    name: "deltaV",
    source: "A * t",
    params: &["A", "t"],
    kind: Kind::Vector,
};

pub const DELTA_VU: FormulaSpec = FormulaSpec {
    name: "deltaVU",
    source: "~U * (a * t)",
    params: &["U", "a", "t"],
    kind: Kind::Vector,
};

pub const CONTACT_VELOCITY: FormulaSpec = FormulaSpec {
    name: "contactVelocity",
    source: "V + [0, 0, r] x W",
    params: &["V", "W", "r"],
    kind: Kind::Vector,
};

pub const IDEAL_W: FormulaSpec = FormulaSpec {
    name: "idealW",
    source: "[0, 0, 1] x V / r + [0, 0, W . [0, 0, 1]]",
    params: &["V", "W", "r"],
    kind: Kind::Vector,
};

pub const DELTA_W: FormulaSpec = FormulaSpec {
    name: "deltaW",
    source: "[0, 0, 1] x ~U * (5 * mu * g * t / (2 * r))",
    params: &["U", "mu", "g", "t", "r"],
    kind: Kind::Vector,
};

/// Every built-in formula, in declaration order
pub const PUBLISHED: [FormulaSpec; 7] = [
    DELTA_R,
    DELTA_RU,
    DELTA_V,
    DELTA_VU,
    CONTACT_VELOCITY,
    IDEAL_W,
    DELTA_W,
];

/// Vector formulas the regime integrator evaluates every segment
pub trait KinematicFormulas: Send + Sync {
    /// Displacement `v·t + ½a·t²`
    fn delta_r(&self, v: Vector3, a: Vector3, t: f64) -> Vector3;

    /// Displacement under a deceleration of magnitude `a` along `û`
    fn delta_r_u(&self, v: Vector3, u: Vector3, a: f64, t: f64) -> Vector3;

    fn delta_v(&self, a: Vector3, t: f64) -> Vector3;

    fn delta_v_u(&self, u: Vector3, a: f64, t: f64) -> Vector3;

    /// Velocity of the ball's table contact point
    fn contact_velocity(&self, v: Vector3, w: Vector3, r: f64) -> Vector3;

    /// Spin that makes the contact velocity vanish, keeping the vertical spin of `w`
    fn ideal_w(&self, v: Vector3, w: Vector3, r: f64) -> Vector3;

    /// Spin change of a sliding ball over `t`
    fn delta_w(&self, u: Vector3, mu: f64, g: f64, t: f64, r: f64) -> Vector3;
}

/// Which implementation of [`KinematicFormulas`] a table integrates with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum FormulaBackend {
    /// Closures produced by the expression compiler
    #[default]
    Compiled,
    /// Hand-written vector code
    Fallback,
}

impl FormulaBackend {
    pub fn formulas(self) -> &'static dyn KinematicFormulas {
        match self {
            FormulaBackend::Compiled => CompiledFormulas::get(),
            FormulaBackend::Fallback => &FallbackFormulas,
        }
    }
}

/// The built-in formulas, compiled once per process
#[derive(Debug)]
pub struct CompiledFormulas {
    delta_r: Formula,
    delta_r_u: Formula,
    delta_v: Formula,
    delta_v_u: Formula,
    contact_velocity: Formula,
    ideal_w: Formula,
    delta_w: Formula,
}

static COMPILED: Lazy<CompiledFormulas> = Lazy::new(CompiledFormulas::build);

impl CompiledFormulas {
    /// Returns the process-wide compiled set, compiling it on first use.
    ///
    /// # Panics
    ///
    /// Panics if a built-in formula fails to compile. The sources are
    /// constants, so this can only happen on the first call.
    pub fn get() -> &'static CompiledFormulas {
        &COMPILED
    }

    fn build() -> Self {
        let build = |spec: FormulaSpec| {
            compile(spec.source, spec.params, spec.kind)
                .unwrap_or_else(|err| panic!("built-in formula {} failed to compile: {}", spec.name, err))
        };

        Self {
            delta_r: build(DELTA_R),
            delta_r_u: build(DELTA_RU),
            delta_v: build(DELTA_V),
            delta_v_u: build(DELTA_VU),
            contact_velocity: build(CONTACT_VELOCITY),
            ideal_w: build(IDEAL_W),
            delta_w: build(DELTA_W),
        }
    }

    /// Looks up a compiled formula by its published name
    pub fn by_name(&self, name: &str) -> Option<&Formula> {
        match name {
            "deltaR" => Some(&self.delta_r),
            "deltaRU" => Some(&self.delta_r_u),
            "deltaV" => Some(&self.delta_v),
            "deltaVU" => Some(&self.delta_v_u),
            "contactVelocity" => Some(&self.contact_velocity),
            "idealW" => Some(&self.ideal_w),
            "deltaW" => Some(&self.delta_w),
            _ => None,
        }
    }
}

impl KinematicFormulas for CompiledFormulas {
    fn delta_r(&self, v: Vector3, a: Vector3, t: f64) -> Vector3 {
        self.delta_r.vector_from_slots(&[v.x, v.y, v.z, a.x, a.y, a.z, t])
    }

    fn delta_r_u(&self, v: Vector3, u: Vector3, a: f64, t: f64) -> Vector3 {
        self.delta_r_u.vector_from_slots(&[v.x, v.y, v.z, u.x, u.y, u.z, a, t])
    }

    fn delta_v(&self, a: Vector3, t: f64) -> Vector3 {
        self.delta_v.vector_from_slots(&[a.x, a.y, a.z, t])
    }

    fn delta_v_u(&self, u: Vector3, a: f64, t: f64) -> Vector3 {
        self.delta_v_u.vector_from_slots(&[u.x, u.y, u.z, a, t])
    }

    fn contact_velocity(&self, v: Vector3, w: Vector3, r: f64) -> Vector3 {
        self.contact_velocity.vector_from_slots(&[v.x, v.y, v.z, w.x, w.y, w.z, r])
    }

    fn ideal_w(&self, v: Vector3, w: Vector3, r: f64) -> Vector3 {
        self.ideal_w.vector_from_slots(&[v.x, v.y, v.z, w.x, w.y, w.z, r])
    }

    fn delta_w(&self, u: Vector3, mu: f64, g: f64, t: f64, r: f64) -> Vector3 {
        self.delta_w.vector_from_slots(&[u.x, u.y, u.z, mu, g, t, r])
    }
}

/// Hand-written equivalents of the compiled formulas
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackFormulas;

impl KinematicFormulas for FallbackFormulas {
    fn delta_r(&self, v: Vector3, a: Vector3, t: f64) -> Vector3 {
        v * t + a * (t * t / 2.0)
    }

    fn delta_r_u(&self, v: Vector3, u: Vector3, a: f64, t: f64) -> Vector3 {
        v * t + u.normalize() * (a * t * t / 2.0)
    }

    fn delta_v(&self, a: Vector3, t: f64) -> Vector3 {
        a * t
    }

    fn delta_v_u(&self, u: Vector3, a: f64, t: f64) -> Vector3 {
        u.normalize() * (a * t)
    }

    fn contact_velocity(&self, v: Vector3, w: Vector3, r: f64) -> Vector3 {
        v + (TABLE_NORMAL * r).cross(&w)
    }

    fn ideal_w(&self, v: Vector3, w: Vector3, r: f64) -> Vector3 {
        TABLE_NORMAL.cross(&v) / r + Vector3::new(0.0, 0.0, w.z)
    }

    fn delta_w(&self, u: Vector3, mu: f64, g: f64, t: f64, r: f64) -> Vector3 {
        TABLE_NORMAL.cross(&u.normalize()) * (5.0 * mu * g * t / (2.0 * r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn every_published_formula_compiles_to_a_vector() {
        for spec in PUBLISHED {
            let formula = compile(spec.source, spec.params, spec.kind).unwrap();
            assert_eq!(formula.components().len(), 3, "{}", spec.name);
            assert!(CompiledFormulas::get().by_name(spec.name).is_some());
        }
    }

    #[test]
    fn ideal_spin_cancels_contact_velocity() {
        let formulas = FormulaBackend::Compiled.formulas();
        let v = Vector3::new(0.7, -0.3, 0.0);
        let w = formulas.ideal_w(v, Vector3::new(4.0, 1.0, 12.0), 0.028575);
        assert_relative_eq!(formulas.contact_velocity(v, w, 0.028575), Vector3::ZERO, epsilon = 1e-12);
        assert_relative_eq!(w.z, 12.0);
    }

    #[test]
    fn ideal_w_drops_horizontal_terms_from_the_emitted_text() {
        let compiled = CompiledFormulas::get().by_name("idealW").unwrap();
        assert_eq!(compiled.components()[2], "W.z");
    }
}
