//! Time-of-impact detection and impulse response for balls.

pub mod detection;
pub mod response;

pub use self::detection::{ball_ball_time, ball_cushion_time};
pub use self::response::{ball_ball, ball_cushion, ball_pocket};
