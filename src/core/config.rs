use crate::error::PhysicsError;
use crate::expr::FormulaBackend;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Physical constants and tuning values for one table
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialize", serde(default))]
pub struct PhysicsParams {
    /// Ball radius in metres
    pub ball_radius: f64,

    /// Ball mass in kilograms
    pub ball_mass: f64,

    /// Gravitational acceleration (magnitude, acting along -z)
    pub gravity: f64,

    /// Friction coefficient between a sliding ball and the cloth
    pub friction_slide: f64,

    /// Rolling resistance coefficient
    pub friction_roll: f64,

    /// Friction coefficient decaying vertical spin
    pub friction_spin: f64,

    /// Friction coefficient between two balls
    pub friction_ball: f64,

    /// Scales the sidespin throw off a cushion
    pub friction_cushion: f64,

    /// Restitution between two balls
    pub restitution_ball: f64,

    /// Restitution between a ball and a cushion
    pub restitution_cushion: f64,

    /// Restitution between a ball and the slate
    pub restitution_slate: f64,

    /// Restitution between a ball and a pocket floor
    pub restitution_pocket: f64,

    /// Scales the spin a cue strike imparts
    pub spin_multiplier: f64,

    /// Height of the cushion contact line above the slate
    pub cushion_height: f64,

    /// Fraction of vertical spin kept after a cushion hit
    pub cushion_spin_damping: f64,

    /// Fraction of horizontal speed kept after hitting a pocket wall
    pub pocket_wall_damping: f64,

    /// Tangential contact speed below which ball-ball spins snap to rolling
    pub tangential_snap_speed: f64,

    /// Slowest slate rebound that still leaves the ball airborne
    pub min_bounce_speed: f64,

    /// Speeds and spins below this are treated as zero
    pub epsilon: f64,

    /// Formula implementation used by the regime integrator
    pub formula_backend: FormulaBackend,

    /// Maximum collision events resolved in one `Table::step`
    pub max_collisions_per_step: usize,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            ball_radius: 0.028575,
            ball_mass: 0.17,
            gravity: 9.8,
            friction_slide: 0.2,
            friction_roll: 0.01,
            friction_spin: 0.044,
            friction_ball: 0.06,
            friction_cushion: 0.2,
            restitution_ball: 0.93,
            restitution_cushion: 0.75,
            restitution_slate: 0.5,
            restitution_pocket: 0.3,
            spin_multiplier: 1.0,
            cushion_height: 0.01,
            cushion_spin_damping: 0.75,
            pocket_wall_damping: 0.2,
            tangential_snap_speed: 1.0e-3,
            min_bounce_speed: 0.05,
            epsilon: 1.0e-6,
            formula_backend: FormulaBackend::Compiled,
            max_collisions_per_step: 64,
        }
    }
}

impl PhysicsParams {
    /// Parameters with every friction coefficient set to zero
    pub fn frictionless() -> Self {
        Self {
            friction_slide: 0.0,
            friction_roll: 0.0,
            friction_spin: 0.0,
            friction_ball: 0.0,
            friction_cushion: 0.0,
            ..Self::default()
        }
    }

    /// Moment of inertia of a solid ball, `(2/5)·m·R²`
    pub fn ball_inertia(&self) -> f64 {
        0.4 * self.ball_mass * self.ball_radius * self.ball_radius
    }

    /// Checks that every value is finite and inside its physical range
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("ball_radius", self.ball_radius),
            ("ball_mass", self.ball_mass),
            ("epsilon", self.epsilon),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PhysicsError::InvalidParameter(format!("{} must be positive, got {}", name, value)));
            }
        }

        let non_negative = [
            ("gravity", self.gravity),
            ("friction_slide", self.friction_slide),
            ("friction_roll", self.friction_roll),
            ("friction_spin", self.friction_spin),
            ("friction_ball", self.friction_ball),
            ("friction_cushion", self.friction_cushion),
            ("spin_multiplier", self.spin_multiplier),
            ("cushion_height", self.cushion_height),
            ("tangential_snap_speed", self.tangential_snap_speed),
            ("min_bounce_speed", self.min_bounce_speed),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(PhysicsError::InvalidParameter(format!("{} must be non-negative, got {}", name, value)));
            }
        }

        let unit = [
            ("restitution_ball", self.restitution_ball),
            ("restitution_cushion", self.restitution_cushion),
            ("restitution_slate", self.restitution_slate),
            ("restitution_pocket", self.restitution_pocket),
            ("cushion_spin_damping", self.cushion_spin_damping),
            ("pocket_wall_damping", self.pocket_wall_damping),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(PhysicsError::InvalidParameter(format!("{} must lie in [0, 1], got {}", name, value)));
            }
        }

        if self.max_collisions_per_step == 0 {
            return Err(PhysicsError::InvalidParameter(
                "max_collisions_per_step must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
