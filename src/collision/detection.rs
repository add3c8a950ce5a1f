//! Time-of-impact solvers.
//!
//! Every solver returns the time from now until first contact within the
//! sub-step, or `f64::INFINITY` when there is none.

use crate::bodies::{Ball, BallState};
use crate::core::PhysicsParams;
use crate::math::roots::{quadratic, smallest_root_in};
use crate::shapes::Cushion;

/// Cushion roots closer than this are the contact just resolved
const MIN_CUSHION_TIME: f64 = 1.0e-9;

/// Time until two balls touch.
///
/// Each ball's velocity is taken as `v + a·dt`, a one-step look-ahead with
/// its current friction acceleration, and the pair must be closing.
/// A closing pair that already overlaps reports zero.
pub fn ball_ball_time(a: &Ball, b: &Ball, dt: f64, params: &PhysicsParams) -> f64 {
    if a.get_id() == b.get_id() {
        return f64::INFINITY;
    }
    if !a.get_state().is_in_play() || !b.get_state().is_in_play() {
        return f64::INFINITY;
    }
    if a.get_state() == BallState::Stationary && b.get_state() == BallState::Stationary {
        return f64::INFINITY;
    }

    let va = a.get_velocity() + a.acceleration(params) * dt;
    let vb = b.get_velocity() + b.acceleration(params) * dt;
    let dr = b.get_position() - a.get_position();
    let dv = vb - va;

    if dr.dot(&dv) >= 0.0 {
        return f64::INFINITY;
    }

    let contact = a.get_radius() + b.get_radius();
    let c = dr.length_squared() - contact * contact;
    if c < 0.0 {
        return 0.0;
    }

    smallest_root_in(dv.length_squared(), 2.0 * dr.dot(&dv), c, 0.0, dt, true).unwrap_or(f64::INFINITY)
}

/// Time until a ball touches one of the cushion's edges.
///
/// Edge ends are not tested; a ball can only meet the finite segment
/// between them.
pub fn ball_cushion_time(ball: &Ball, cushion: &Cushion, dt: f64, params: &PhysicsParams) -> f64 {
    if matches!(
        ball.get_state(),
        BallState::Stationary | BallState::Pocketed | BallState::OutOfPlay
    ) {
        return f64::INFINITY;
    }

    let position = ball.get_position();
    let velocity = ball.get_velocity().horizontal();
    let acceleration = ball.acceleration(params).horizontal();
    let radius = ball.get_radius();

    let reach = velocity.length() * dt + 0.5 * acceleration.length() * dt * dt + radius;
    if !cushion.get_bounds().expand(reach).contains_xy(position) {
        return f64::INFINITY;
    }

    let mut best = dt;
    let mut found = false;
    for edge in cushion.get_edges() {
        let d0 = edge.signed_distance(position);
        let vn = velocity.dot(&edge.normal);
        let an = acceleration.dot(&edge.normal);

        for target in [radius, -radius] {
            for t in quadratic(0.5 * an, vn, d0 - target) {
                if t <= MIN_CUSHION_TIME || t >= best {
                    continue;
                }
                let at = position + velocity * t + acceleration * (0.5 * t * t);
                if (0.0..=1.0).contains(&edge.project(at)) {
                    best = t;
                    found = true;
                }
            }
        }
    }

    if found {
        best
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BallId, CushionId};
    use crate::math::Vector3;
    use crate::shapes::Polygon;
    use approx::assert_relative_eq;

    fn moving(id: u32, x: f64, vx: f64, params: &PhysicsParams) -> Ball {
        let mut ball = Ball::with_params(BallId(id), x, 0.0, params);
        ball.set_velocity(Vector3::new(vx, 0.0, 0.0));
        ball.set_angular_velocity(Vector3::new(0.0, vx / params.ball_radius, 0.0));
        ball.update_state(params);
        ball
    }

    fn rail(x: f64) -> Polygon {
        Polygon::new(
            CushionId(0),
            [
                Vector3::new(x, -0.5, 0.0),
                Vector3::new(x + 0.05, -0.5, 0.0),
                Vector3::new(x + 0.05, 0.5, 0.0),
                Vector3::new(x, 0.5, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn head_on_balls_meet_when_the_gap_closes() {
        let params = PhysicsParams::frictionless();
        let a = moving(0, 0.0, 1.0, &params);
        let b = moving(1, 0.2, -1.0, &params);
        let gap = 0.2 - 2.0 * params.ball_radius;
        assert_relative_eq!(a.collision_time(&b, 1.0, &params), gap / 2.0, epsilon = 1e-12);
        assert_eq!(a.collision_time(&b, gap / 4.0, &params), f64::INFINITY);
    }

    #[test]
    fn separating_or_resting_pairs_never_collide() {
        let params = PhysicsParams::default();
        let a = moving(0, 0.0, -1.0, &params);
        let b = moving(1, 0.2, 1.0, &params);
        assert_eq!(a.collision_time(&b, 1.0, &params), f64::INFINITY);

        let c = Ball::with_params(BallId(2), 0.0, 0.0, &params);
        let d = Ball::with_params(BallId(3), 0.05, 0.0, &params);
        assert_eq!(c.collision_time(&d, 1.0, &params), f64::INFINITY);
        assert_eq!(a.collision_time(&a, 1.0, &params), f64::INFINITY);
    }

    #[test]
    fn overlapping_closing_pair_reports_zero() {
        let params = PhysicsParams::default();
        let a = moving(0, 0.0, 1.0, &params);
        let b = moving(1, 0.05, -1.0, &params);
        assert_eq!(a.collision_time(&b, 0.1, &params), 0.0);
    }

    #[test]
    fn ball_reaches_the_near_face_of_a_rail() {
        let params = PhysicsParams::frictionless();
        let ball = moving(0, 0.0, 2.0, &params);
        let rail = rail(0.5);
        let expected = (0.5 - params.ball_radius) / 2.0;
        assert_relative_eq!(ball.cushion_collision_time(&rail, 1.0, &params), expected, epsilon = 1e-12);
    }

    #[test]
    fn rolling_friction_delays_the_cushion_hit() {
        let params = PhysicsParams::default();
        let ball = moving(0, 0.0, 2.0, &params);
        let t = ball.cushion_collision_time(&rail(0.5), 1.0, &params);
        let gap = 0.5 - params.ball_radius;
        let a = params.friction_roll * params.gravity;
        assert_relative_eq!(2.0 * t - 0.5 * a * t * t, gap, epsilon = 1e-12);
    }

    #[test]
    fn distant_or_resting_balls_skip_cushions() {
        let params = PhysicsParams::default();
        let rail = rail(0.5);
        assert_eq!(moving(0, 0.0, 0.1, &params).cushion_collision_time(&rail, 0.1, &params), f64::INFINITY);
        let resting = Ball::with_params(BallId(1), 0.48, 0.0, &params);
        assert_eq!(resting.cushion_collision_time(&rail, 1.0, &params), f64::INFINITY);
    }

    #[test]
    fn balls_passing_beyond_an_edge_end_are_not_hit() {
        let params = PhysicsParams::frictionless();
        let mut ball = Ball::with_params(BallId(0), 0.0, 0.7, &params);
        ball.set_velocity(Vector3::new(2.0, 0.0, 0.0));
        ball.set_angular_velocity(Vector3::new(0.0, 2.0 / params.ball_radius, 0.0));
        ball.update_state(&params);
        assert_eq!(ball.cushion_collision_time(&rail(0.5), 1.0, &params), f64::INFINITY);
    }
}
