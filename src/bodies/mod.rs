mod ball;
mod kinematics;
mod pocketed;
mod state;

pub use self::ball::{Ball, BallData, Shot};
pub use self::state::BallState;
