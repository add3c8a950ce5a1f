use crate::bodies::{Ball, BallState};
use crate::core::{BallId, CushionId, PocketId};
use crate::math::{Quaternion, Vector3};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Kinematic state of a ball captured just before a collision
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BallSnapshot {
    pub position: Vector3,
    pub velocity: Vector3,
    pub angular_velocity: Vector3,
    pub orientation: Quaternion,
    pub state: BallState,
}

impl BallSnapshot {
    pub fn of(ball: &Ball) -> Self {
        Self {
            position: ball.get_position(),
            velocity: ball.get_velocity(),
            angular_velocity: ball.get_angular_velocity(),
            orientation: ball.get_orientation(),
            state: ball.get_state(),
        }
    }
}

/// A resolved collision, returned to the caller for scoring or animation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Collision {
    /// Two balls struck each other
    BallBall {
        first: BallId,
        second: BallId,
        /// Contact point between the two centres
        position: Vector3,
        /// Magnitude of the normal impulse per unit mass
        impulse: f64,
        /// Pre-collision state of `first` and `second`
        snapshots: [BallSnapshot; 2],
    },

    /// A ball rebounded off a cushion
    BallCushion {
        ball: BallId,
        cushion: CushionId,
        position: Vector3,
        /// Normal velocity change
        impulse: f64,
        snapshot: BallSnapshot,
    },

    /// A ball dropped into a pocket
    BallPocket {
        ball: BallId,
        pocket: PocketId,
        position: Vector3,
        snapshot: BallSnapshot,
    },
}

impl Collision {
    /// Returns whether the given ball took part in this collision
    pub fn involves(&self, id: BallId) -> bool {
        match self {
            Collision::BallBall { first, second, .. } => *first == id || *second == id,
            Collision::BallCushion { ball, .. } | Collision::BallPocket { ball, .. } => *ball == id,
        }
    }

    pub fn position(&self) -> Vector3 {
        match self {
            Collision::BallBall { position, .. }
            | Collision::BallCushion { position, .. }
            | Collision::BallPocket { position, .. } => *position,
        }
    }

    pub fn impulse(&self) -> Option<f64> {
        match self {
            Collision::BallBall { impulse, .. } | Collision::BallCushion { impulse, .. } => Some(*impulse),
            Collision::BallPocket { .. } => None,
        }
    }
}
