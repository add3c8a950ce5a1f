//! Closed-form integration of a ball through its friction regimes.

use log::trace;

use crate::bodies::{Ball, BallState};
use crate::core::PhysicsParams;
use crate::expr::KinematicFormulas;
use crate::math::{duration, Vector3, EPSILON, TABLE_NORMAL};
use crate::shapes::Pocket;

/// Most regime segments a single `evolve` call walks through
const MAX_SEGMENTS: usize = 8;

impl Ball {
    /// Advances the ball by `dt` seconds.
    ///
    /// A descending ball below the slate bounces once first. The remaining
    /// time is then spent regime by regime: each segment runs until the
    /// regime ends or the budget is used up, and the next regime takes over.
    pub fn evolve(&mut self, dt: f64, params: &PhysicsParams, pockets: &[Pocket]) {
        if dt <= 0.0 {
            return;
        }

        match self.state {
            BallState::OutOfPlay => return,
            BallState::Pocketed => {
                if let Some(pocket) = self.pocket.and_then(|id| pockets.iter().find(|p| p.get_id() == id)) {
                    self.evolve_pocketed(dt, params, pocket);
                }
                return;
            }
            _ => {}
        }

        let formulas = params.formula_backend.formulas();
        self.bounce_off_slate(params);

        let mut remaining = dt;
        for _ in 0..MAX_SEGMENTS {
            self.update_state(params);
            let spin_before = self.angular_velocity;

            let used = match self.state {
                BallState::Airborne => self.advance_airborne(remaining, params, formulas),
                BallState::Sliding => self.advance_sliding(remaining, params, formulas),
                BallState::Rolling => self.advance_rolling(remaining, params, formulas),
                BallState::Spinning => self.advance_spinning(remaining, params),
                BallState::Stationary | BallState::Pocketed | BallState::OutOfPlay => break,
            };
            trace!("{} {} for {:.6}s", self.id, self.state, used);

            self.orientation = self
                .orientation
                .integrate((spin_before + self.angular_velocity) * 0.5, used);
            self.minimize(params, formulas);

            remaining -= used;
            if remaining <= EPSILON {
                break;
            }
        }

        self.minimize(params, formulas);
        self.update_state(params);
    }

    /// Reflects a ball that has sunk below the slate while descending
    fn bounce_off_slate(&mut self, params: &PhysicsParams) {
        if self.position.z < 0.0 && self.velocity.z < 0.0 {
            self.position.z = 0.0;
            self.velocity.z = -self.velocity.z * params.restitution_slate;
            if self.velocity.z < params.min_bounce_speed {
                self.velocity.z = 0.0;
            }
        }
    }

    fn advance_airborne(&mut self, dt: f64, params: &PhysicsParams, formulas: &dyn KinematicFormulas) -> f64 {
        let gravity = TABLE_NORMAL * -params.gravity;
        self.position += formulas.delta_r(self.velocity, gravity, dt);
        self.velocity += formulas.delta_v(gravity, dt);
        dt
    }

    fn advance_sliding(&mut self, dt: f64, params: &PhysicsParams, formulas: &dyn KinematicFormulas) -> f64 {
        let slide_end = self.time_to_slide_end(params);
        let t = dt.min(slide_end);
        let u = formulas.contact_velocity(self.velocity, self.angular_velocity, self.radius);
        let decel = -params.friction_slide * params.gravity;

        self.position += formulas.delta_r_u(self.velocity, u, decel, t);
        self.velocity += formulas.delta_v_u(u, decel, t);
        self.angular_velocity += formulas.delta_w(u, params.friction_slide, params.gravity, t, self.radius);
        self.decay_vertical_spin(t, params);

        if t >= slide_end {
            self.angular_velocity = formulas.ideal_w(self.velocity, self.angular_velocity, self.radius);
        }
        t
    }

    fn advance_rolling(&mut self, dt: f64, params: &PhysicsParams, formulas: &dyn KinematicFormulas) -> f64 {
        let roll_end = self.time_to_roll_end(params);
        let t = dt.min(roll_end);
        let decel = -params.friction_roll * params.gravity;
        let v = self.velocity;

        self.position += formulas.delta_r_u(v, v, decel, t);
        if t >= roll_end {
            self.velocity = Vector3::ZERO;
        } else {
            self.velocity += formulas.delta_v_u(v, decel, t);
        }
        self.decay_vertical_spin(t, params);
        self.angular_velocity = formulas.ideal_w(self.velocity, self.angular_velocity, self.radius);
        t
    }

    fn advance_spinning(&mut self, dt: f64, params: &PhysicsParams) -> f64 {
        let t = dt.min(self.time_to_spin_end(params));
        self.decay_vertical_spin(t, params);
        self.angular_velocity.x = 0.0;
        self.angular_velocity.y = 0.0;
        t
    }

    fn spin_deceleration(&self, params: &PhysicsParams) -> f64 {
        5.0 * params.friction_spin * params.gravity / (2.0 * self.radius)
    }

    /// Decays vertical spin without letting it change sign
    fn decay_vertical_spin(&mut self, t: f64, params: &PhysicsParams) {
        let loss = self.spin_deceleration(params) * t;
        let wz = self.angular_velocity.z;
        self.angular_velocity.z = if wz.abs() <= loss { 0.0 } else { wz - wz.signum() * loss };
    }

    /// Snaps near-zero motion to zero and settles spin onto a pure roll.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if the corrected spin still leaves the
    /// contact point slipping.
    pub fn minimize(&mut self, params: &PhysicsParams, formulas: &dyn KinematicFormulas) {
        let eps = params.epsilon;
        self.velocity = self.velocity.minimize(eps);
        self.angular_velocity = self.angular_velocity.minimize(eps);

        if !self.is_grounded(params) {
            return;
        }

        let u = formulas.contact_velocity(self.velocity, self.angular_velocity, self.radius);
        if u.length() < eps {
            self.angular_velocity = formulas
                .ideal_w(self.velocity, self.angular_velocity, self.radius)
                .minimize(eps);
            debug_assert!(
                formulas
                    .contact_velocity(self.velocity, self.angular_velocity, self.radius)
                    .length()
                    < eps,
                "spin correction left {} slipping",
                self.id
            );
        }
    }

    /// Acceleration of the ball's centre in its current regime
    pub fn acceleration(&self, params: &PhysicsParams) -> Vector3 {
        match self.state {
            BallState::Sliding => {
                let u = self.contact_velocity(params).normalize();
                u * (-params.friction_slide * params.gravity)
            }
            BallState::Rolling => self.velocity.normalize() * (-params.friction_roll * params.gravity),
            BallState::Airborne => TABLE_NORMAL * -params.gravity,
            _ => Vector3::ZERO,
        }
    }

    /// Time until the contact point stops slipping
    pub fn time_to_slide_end(&self, params: &PhysicsParams) -> f64 {
        let u = self.contact_velocity(params).length();
        duration(2.0 * u, 7.0 * params.friction_slide * params.gravity)
    }

    /// Time until a rolling ball stops translating
    pub fn time_to_roll_end(&self, params: &PhysicsParams) -> f64 {
        duration(self.velocity.horizontal().length(), params.friction_roll * params.gravity)
    }

    /// Time until vertical spin dies out
    pub fn time_to_spin_end(&self, params: &PhysicsParams) -> f64 {
        duration(self.angular_velocity.z.abs(), self.spin_deceleration(params))
    }

    /// Time until the ball lands on the slate; zero when grounded and not rising
    pub fn time_to_airborne_end(&self, params: &PhysicsParams) -> f64 {
        let (z, vz) = (self.position.z, self.velocity.z);
        if z <= 0.0 && vz <= params.epsilon {
            return 0.0;
        }

        let g = params.gravity;
        if g <= EPSILON {
            return f64::INFINITY;
        }
        // Later root of z + vz·t - ½g·t² = 0
        let discriminant = (vz * vz + 2.0 * g * z).max(0.0);
        ((vz + discriminant.sqrt()) / g).max(0.0)
    }
}
