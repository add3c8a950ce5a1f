use std::f64::consts::FRAC_PI_2;

use crate::bodies::BallState;
use crate::collision::{detection, response};
use crate::core::{BallId, Collision, PhysicsParams, PocketId};
use crate::error::PhysicsError;
use crate::math::{Quaternion, Vector3, TABLE_NORMAL};
use crate::shapes::{Cushion, Pocket};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Transport form of a ball.
///
/// The pocket is carried as an id and must be resolved against the
/// receiver's pockets.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BallData {
    pub id: BallId,
    pub position: Vector3,
    pub velocity: Vector3,
    pub angular_velocity: Vector3,
    pub orientation: Quaternion,
    pub radius: f64,
    pub state: BallState,
    pub pocket_id: Option<PocketId>,
}

/// A cue strike
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Shot {
    /// Aim direction; only its horizontal part is used
    pub direction: Vector3,

    /// Cue ball speed right after the strike
    pub speed: f64,

    /// Fraction of natural roll: 1 rolls immediately, negative values draw
    pub top_spin: f64,

    /// Sidespin in `[-1, 1]`, positive is right english
    pub side_spin: f64,

    /// Cue elevation in radians
    pub lift: f64,
}

impl Shot {
    /// A centre-ball shot with no spin or elevation
    pub fn new(direction: Vector3, speed: f64) -> Self {
        Self {
            direction,
            speed,
            top_spin: 0.0,
            side_spin: 0.0,
            lift: 0.0,
        }
    }

    pub fn with_top_spin(mut self, top_spin: f64) -> Self {
        self.top_spin = top_spin;
        self
    }

    pub fn with_side_spin(mut self, side_spin: f64) -> Self {
        self.side_spin = side_spin;
        self
    }

    pub fn with_lift(mut self, lift: f64) -> Self {
        self.lift = lift;
        self
    }
}

/// A billiard ball.
///
/// `position` is the centre projected so that `z == 0` means resting on the
/// slate. The state is derived from the physical quantities after every
/// change and is never advanced on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub(crate) id: BallId,
    pub(crate) position: Vector3,
    pub(crate) velocity: Vector3,
    pub(crate) angular_velocity: Vector3,
    pub(crate) orientation: Quaternion,
    pub(crate) radius: f64,
    pub(crate) state: BallState,
    pub(crate) pocket: Option<PocketId>,
}

impl Ball {
    /// Creates a stationary ball resting on the slate at `(x, y)`
    pub fn new(id: BallId, x: f64, y: f64, radius: f64) -> Self {
        Self {
            id,
            position: Vector3::new(x, y, 0.0),
            velocity: Vector3::ZERO,
            angular_velocity: Vector3::ZERO,
            orientation: Quaternion::identity(),
            radius,
            state: BallState::Stationary,
            pocket: None,
        }
    }

    /// Creates a ball with the radius from `params`
    pub fn with_params(id: BallId, x: f64, y: f64, params: &PhysicsParams) -> Self {
        Self::new(id, x, y, params.ball_radius)
    }

    /// Hydrates a ball from transported data, resolving its pocket.
    ///
    /// Fails with [`PhysicsError::ResourceNotFound`] when the pocket id is not
    /// among `pockets`.
    pub fn from_data(data: &BallData, pockets: &[Pocket]) -> Result<Self> {
        let mut ball = Self::new(data.id, data.position.x, data.position.y, data.radius);
        ball.sync(data, pockets)?;
        Ok(ball)
    }

    pub fn get_id(&self) -> BallId {
        self.id
    }

    pub fn get_position(&self) -> Vector3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vector3) {
        self.position = position;
    }

    pub fn get_velocity(&self) -> Vector3 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vector3) {
        self.velocity = velocity;
    }

    pub fn get_angular_velocity(&self) -> Vector3 {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: Vector3) {
        self.angular_velocity = angular_velocity;
    }

    pub fn get_orientation(&self) -> Quaternion {
        self.orientation
    }

    pub fn get_radius(&self) -> f64 {
        self.radius
    }

    pub fn get_state(&self) -> BallState {
        self.state
    }

    /// The pocket this ball rests in, if any
    pub fn get_pocket(&self) -> Option<PocketId> {
        self.pocket
    }

    /// Velocity of the point touching the slate, `v + (R·n) × ω`
    pub fn contact_velocity(&self, params: &PhysicsParams) -> Vector3 {
        params
            .formula_backend
            .formulas()
            .contact_velocity(self.velocity, self.angular_velocity, self.radius)
    }

    /// Spin that makes the current velocity a pure roll, keeping vertical spin
    pub fn ideal_angular_velocity(&self, params: &PhysicsParams) -> Vector3 {
        params
            .formula_backend
            .formulas()
            .ideal_w(self.velocity, self.angular_velocity, self.radius)
    }

    /// On the slate and not about to leave it
    pub fn is_grounded(&self, params: &PhysicsParams) -> bool {
        self.position.z.abs() <= params.epsilon && self.velocity.z <= params.epsilon
    }

    /// Recomputes the regime from position, velocity and spin
    pub fn update_state(&mut self, params: &PhysicsParams) {
        if self.state.is_sticky() {
            return;
        }

        let eps = params.epsilon;
        self.state = if self.position.z.abs() > eps || self.velocity.z > eps {
            BallState::Airborne
        } else if self.contact_velocity(params).length() > eps {
            BallState::Sliding
        } else if self.velocity.length() > eps {
            BallState::Rolling
        } else if self.angular_velocity.z.abs() > eps {
            BallState::Spinning
        } else {
            BallState::Stationary
        };
    }

    /// Strikes the ball with the cue. Has no effect on pocketed or
    /// out-of-play balls.
    pub fn hit(&mut self, shot: &Shot, params: &PhysicsParams) {
        if self.state.is_sticky() {
            return;
        }

        let direction = shot.direction.horizontal().normalize();
        let vertical = shot.speed * shot.lift.sin() * (shot.side_spin * FRAC_PI_2).cos();
        self.velocity = direction * (shot.speed * shot.lift.cos()) + TABLE_NORMAL * vertical;

        let spin_rate = shot.speed / self.radius * params.spin_multiplier;
        let top = TABLE_NORMAL.cross(&direction) * (spin_rate * shot.top_spin);
        let side = TABLE_NORMAL * (-shot.side_spin * spin_rate);
        self.angular_velocity = top + side;

        self.update_state(params);
    }

    /// Puts the ball in hand at `(x, y)`, at rest.
    ///
    /// Returns the pocket the ball was taken from so its owner can drop it
    /// from the pocket's list.
    pub fn place(&mut self, x: f64, y: f64) -> Option<PocketId> {
        self.position = Vector3::new(x, y, 0.0);
        self.velocity = Vector3::ZERO;
        self.angular_velocity = Vector3::ZERO;
        self.state = BallState::Stationary;
        self.pocket.take()
    }

    /// Takes the ball out of the game; returns the pocket it left, if any
    pub fn remove_from_play(&mut self) -> Option<PocketId> {
        self.velocity = Vector3::ZERO;
        self.angular_velocity = Vector3::ZERO;
        self.state = BallState::OutOfPlay;
        self.pocket.take()
    }

    /// Resolves a contact with another ball, see [`response::ball_ball`]
    pub fn collide_ball(&mut self, other: &mut Ball, params: &PhysicsParams) -> Option<Collision> {
        response::ball_ball(self, other, params)
    }

    /// Resolves a contact with a cushion, see [`response::ball_cushion`]
    pub fn collide_cushion(&mut self, cushion: &Cushion, params: &PhysicsParams) -> Option<Collision> {
        response::ball_cushion(self, cushion, params)
    }

    /// Captures the ball if it is over the pocket mouth, see [`response::ball_pocket`]
    pub fn collide_pocket(&mut self, pocket: &mut Pocket, params: &PhysicsParams) -> Option<Collision> {
        response::ball_pocket(self, pocket, params)
    }

    /// Time until this ball touches `other` within `dt`, or infinity
    pub fn collision_time(&self, other: &Ball, dt: f64, params: &PhysicsParams) -> f64 {
        detection::ball_ball_time(self, other, dt, params)
    }

    /// Time until this ball touches `cushion` within `dt`, or infinity
    pub fn cushion_collision_time(&self, cushion: &Cushion, dt: f64, params: &PhysicsParams) -> f64 {
        detection::ball_cushion_time(self, cushion, dt, params)
    }

    pub fn serialize(&self) -> BallData {
        BallData {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            angular_velocity: self.angular_velocity,
            orientation: self.orientation,
            radius: self.radius,
            state: self.state,
            pocket_id: self.pocket,
        }
    }

    /// Overwrites this ball with transported data.
    ///
    /// The ball is left untouched when the pocket id cannot be resolved.
    pub fn sync(&mut self, data: &BallData, pockets: &[Pocket]) -> Result<()> {
        let pocket = match data.pocket_id {
            Some(id) => Some(
                pockets
                    .iter()
                    .find(|p| p.get_id() == id)
                    .map(|p| p.get_id())
                    .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{} for {}", id, data.id)))?,
            ),
            None => None,
        };

        self.id = data.id;
        self.position = data.position;
        self.velocity = data.velocity;
        self.angular_velocity = data.angular_velocity;
        self.orientation = data.orientation;
        self.radius = data.radius;
        self.state = data.state;
        self.pocket = pocket;
        Ok(())
    }
}
