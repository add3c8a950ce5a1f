use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Motion regime of a ball, determining how it is integrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum BallState {
    /// At rest on the slate
    #[default]
    Stationary,

    /// The contact point slips over the cloth
    Sliding,

    /// Rolling without slip
    Rolling,

    /// Turning in place about the vertical axis
    Spinning,

    /// Off the slate, under gravity only
    Airborne,

    /// Captured by a pocket
    Pocketed,

    /// Removed from the game; never simulated
    OutOfPlay,
}

impl BallState {
    /// Pocketed and out-of-play balls keep their state until placed again
    pub fn is_sticky(self) -> bool {
        matches!(self, BallState::Pocketed | BallState::OutOfPlay)
    }

    /// Whether the ball is on the playing surface or above it
    pub fn is_in_play(self) -> bool {
        !self.is_sticky()
    }

    pub fn is_moving(self) -> bool {
        matches!(
            self,
            BallState::Sliding | BallState::Rolling | BallState::Spinning | BallState::Airborne
        )
    }
}

impl fmt::Display for BallState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            BallState::Stationary => "stationary",
            BallState::Sliding => "sliding",
            BallState::Rolling => "rolling",
            BallState::Spinning => "spinning",
            BallState::Airborne => "airborne",
            BallState::Pocketed => "pocketed",
            BallState::OutOfPlay => "out of play",
        };
        write!(f, "{}", name)
    }
}
