//! Continuous-time physics for billiard balls.
//!
//! Balls move through closed-form friction regimes (sliding, rolling,
//! spinning, airborne), collide with each other and with polygonal cushions
//! at analytically solved times of impact, and drop into cylindrical pockets.
//! The regime integrator evaluates its vector formulas through a small
//! expression compiler ([`expr`]).

pub mod math;
pub mod expr;
pub mod core;
pub mod bodies;
pub mod shapes;
pub mod collision;

/// Re-export common types for easier usage
pub use crate::core::{BallId, CushionId, PocketId, PhysicsParams, Table, TableData, Collision, BallSnapshot};
pub use crate::bodies::{Ball, BallData, BallState, Shot};
pub use crate::shapes::{Cushion, CushionData, Polygon, Pocket, PocketData};
pub use crate::expr::{compile, Formula, FormulaBackend, Kind, Value};
pub use crate::math::{Quaternion, Vector3};

/// Error types for the physics engine
pub mod error {
    use crate::expr::Kind;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum PhysicsError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Resource not found: {0}")]
        ResourceNotFound(String),

        #[error("Expression error: {0}")]
        Expression(#[from] ExprError),
    }

    /// Failures raised while compiling or invoking a kinematics formula
    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum ExprError {
        #[error("unexpected character '{ch}' at {position}")]
        UnexpectedCharacter { ch: char, position: usize },

        #[error("expected {expected} at {position}, found '{found}'")]
        UnexpectedToken {
            expected: &'static str,
            found: String,
            position: usize,
        },

        #[error("expected {expected}, found end of input")]
        UnexpectedEnd { expected: &'static str },

        #[error("unmatched '{open}' opened at {position}")]
        UnmatchedBracket { open: char, position: usize },

        #[error("vector literal at {position} has {found} components, expected 3")]
        LiteralArity { found: usize, position: usize },

        #[error("unknown symbol '{0}'")]
        UnknownSymbol(String),

        #[error("invalid parameter name '{0}'")]
        InvalidParameter(String),

        #[error("operator '{operator}' cannot combine {left} and {right}")]
        TypeMismatch {
            operator: &'static str,
            left: Kind,
            right: Kind,
        },

        #[error("operator '{operator}' cannot be applied to a {operand}")]
        InvalidOperand { operator: &'static str, operand: Kind },

        #[error("vector literal components must be scalars")]
        NestedVector,

        #[error("formula produces a {found}, expected a {expected}")]
        OutputKind { expected: Kind, found: Kind },

        #[error("formula takes {expected} arguments, got {found}")]
        ArgumentCount { expected: usize, found: usize },

        #[error("argument '{name}' must be a {expected}")]
        ArgumentKind { name: String, expected: Kind },

        #[error("formula needs {slots} input slots, at most {max} are supported")]
        TooManySlots { slots: usize, max: usize },
    }
}

/// Result type for physics engine operations
pub type Result<T> = std::result::Result<T, error::PhysicsError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
