//! Impulse responses for resolved contacts.
//!
//! Each responder checks the contact condition itself and returns `None`
//! when there is nothing to resolve, so they are safe to call on any pair.

use log::debug;

use crate::bodies::{Ball, BallState};
use crate::core::{BallSnapshot, Collision, PhysicsParams};
use crate::math::{Vector3, CONTACT_TOLERANCE, EPSILON, TABLE_NORMAL};
use crate::shapes::{Cushion, Pocket};

/// Share of the overlap each ball is moved back along the contact normal
const SEPARATION_SHARE: f64 = 0.55;

/// Resolves a contact between two balls.
///
/// Overlapping balls are pushed apart first. A closing pair then receives a
/// normal impulse with restitution `restitution_ball` and a tangential
/// impulse from the slip between the two surfaces, capped by Coulomb
/// friction.
pub fn ball_ball(a: &mut Ball, b: &mut Ball, params: &PhysicsParams) -> Option<Collision> {
    if a.id == b.id || !a.state.is_in_play() || !b.state.is_in_play() {
        return None;
    }

    let delta = b.position - a.position;
    let distance = delta.length();
    let contact = a.radius + b.radius;
    if distance <= EPSILON || distance >= contact + CONTACT_TOLERANCE {
        return None;
    }

    let snapshots = [BallSnapshot::of(a), BallSnapshot::of(b)];
    let normal = delta / distance;

    let overlap = contact - distance;
    if overlap > 0.0 {
        a.position -= normal * (SEPARATION_SHARE * overlap);
        b.position += normal * (SEPARATION_SHARE * overlap);
    }

    let approach = (b.velocity - a.velocity).dot(&normal);
    if approach >= 0.0 {
        return None;
    }

    let j = (1.0 + params.restitution_ball) * approach / 2.0;
    a.velocity += normal * j;
    b.velocity -= normal * j;

    apply_ball_friction(a, b, normal, j.abs(), params);

    a.update_state(params);
    b.update_state(params);

    Some(Collision::BallBall {
        first: a.id,
        second: b.id,
        position: a.position + normal * a.radius,
        impulse: j.abs(),
        snapshots,
    })
}

/// Tangential impulse between two touching balls
fn apply_ball_friction(a: &mut Ball, b: &mut Ball, normal: Vector3, normal_impulse: f64, params: &PhysicsParams) {
    let ra = normal * a.radius;
    let rb = normal * -b.radius;

    let ua = a.velocity + a.angular_velocity.cross(&ra);
    let ub = b.velocity + b.angular_velocity.cross(&rb);
    let slip = ua - ub;
    let tangential = slip - normal * slip.dot(&normal);

    if tangential.length() < params.tangential_snap_speed {
        for ball in [a, b] {
            if ball.is_grounded(params) {
                ball.angular_velocity = ball.ideal_angular_velocity(params);
            }
        }
        return;
    }

    // Vertical slip is taken up by the slate
    let sideways = tangential.horizontal();
    let mass = params.ball_mass;
    let inertia = params.ball_inertia();
    let jt = (mass * sideways.length() / 7.0).min(params.friction_ball * mass * normal_impulse);
    let impulse = sideways.normalize() * jt;

    a.velocity -= impulse / mass;
    a.angular_velocity += ra.cross(&-impulse) / inertia;
    b.velocity += impulse / mass;
    b.angular_velocity += rb.cross(&impulse) / inertia;
}

/// Resolves a ball pressing into a cushion.
///
/// The contact point is the closest point of the cushion outline, raised to
/// the rail height (or the ball's height when it is lower). The ball is
/// pushed out, bounces with `restitution_cushion`, rolls off the rail with
/// its sidespin turned into a sideways throw, and keeps a damped share of
/// that sidespin.
pub fn ball_cushion(ball: &mut Ball, cushion: &Cushion, params: &PhysicsParams) -> Option<Collision> {
    if !ball.state.is_in_play() {
        return None;
    }

    let (closest, edge) = cushion.closest_point_xy(ball.position);
    let mut contact = closest;
    contact.z = ball.position.z.min(params.cushion_height);

    let delta = ball.position - contact;
    let distance = delta.length();
    if distance >= ball.radius + CONTACT_TOLERANCE {
        return None;
    }

    let mut normal = delta.horizontal().normalize();
    if normal.is_zero() {
        normal = edge.normal;
    }

    let vn = ball.velocity.dot(&normal);
    if vn >= 0.0 {
        return None;
    }

    let snapshot = BallSnapshot::of(ball);

    let rise = ball.position.z - contact.z;
    let clearance = (ball.radius * ball.radius - rise * rise).max(0.0).sqrt();
    let pushed = contact + normal * clearance;
    ball.position.x = pushed.x;
    ball.position.y = pushed.y;

    ball.velocity -= normal * ((1.0 + params.restitution_cushion) * vn);
    ball.angular_velocity = ball.ideal_angular_velocity(params);

    let wz = ball.angular_velocity.z;
    let throw = TABLE_NORMAL.cross(&normal) * (wz * ball.radius * params.friction_cushion);
    ball.velocity += throw;
    ball.angular_velocity.z = wz * params.cushion_spin_damping;

    ball.update_state(params);

    Some(Collision::BallCushion {
        ball: ball.id,
        cushion: cushion.get_id(),
        position: contact,
        impulse: -(1.0 + params.restitution_cushion) * vn,
        snapshot,
    })
}

/// Captures a ball over the pocket mouth that is not flying above the rails
pub fn ball_pocket(ball: &mut Ball, pocket: &mut Pocket, params: &PhysicsParams) -> Option<Collision> {
    if !ball.state.is_in_play() {
        return None;
    }
    if pocket.distance_xy(ball.position) >= pocket.get_radius() || ball.position.z > params.cushion_height {
        return None;
    }

    let snapshot = BallSnapshot::of(ball);
    ball.state = BallState::Pocketed;
    ball.pocket = Some(pocket.get_id());
    pocket.add_ball(ball.id);
    debug!("{} captured by {}", ball.id, pocket.get_id());

    Some(Collision::BallPocket {
        ball: ball.id,
        pocket: pocket.get_id(),
        position: ball.position,
        snapshot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BallId, CushionId, PocketId};
    use crate::math::Vector3;
    use crate::shapes::Polygon;
    use approx::assert_relative_eq;

    fn rail() -> Polygon {
        Polygon::new(
            CushionId(7),
            [
                Vector3::new(0.5, -0.5, 0.0),
                Vector3::new(0.55, -0.5, 0.0),
                Vector3::new(0.55, 0.5, 0.0),
                Vector3::new(0.5, 0.5, 0.0),
            ],
        )
        .unwrap()
    }

    fn rolling(x: f64, vx: f64, params: &PhysicsParams) -> Ball {
        let mut ball = Ball::with_params(BallId(0), x, 0.0, params);
        ball.set_velocity(Vector3::new(vx, 0.0, 0.0));
        ball.set_angular_velocity(Vector3::new(0.0, vx / params.ball_radius, 0.0));
        ball.update_state(params);
        ball
    }

    #[test]
    fn separating_overlap_is_pushed_apart_without_impulse() {
        let params = PhysicsParams::default();
        let mut a = rolling(0.0, -1.0, &params);
        let mut b = Ball::with_params(BallId(1), 0.05, 0.0, &params);
        assert!(a.collide_ball(&mut b, &params).is_none());
        assert!(b.get_position().x - a.get_position().x >= 2.0 * params.ball_radius);
        assert_eq!(b.get_velocity(), Vector3::ZERO);
    }

    #[test]
    fn cue_ball_transfers_its_speed_to_the_object_ball() {
        let params = PhysicsParams { restitution_ball: 1.0, friction_ball: 0.0, ..Default::default() };
        let mut cue = rolling(0.0, 1.0, &params);
        let mut object = Ball::with_params(BallId(1), 2.0 * params.ball_radius, 0.0, &params);

        let collision = cue.collide_ball(&mut object, &params).unwrap();
        assert_relative_eq!(cue.get_velocity().x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(object.get_velocity().x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(collision.impulse().unwrap(), 1.0, epsilon = 1e-12);
        // Topspin stays with the cue ball, which now slides forward
        assert_eq!(cue.get_state(), BallState::Sliding);
    }

    #[test]
    fn cushion_reverses_normal_velocity() {
        let params = PhysicsParams::default();
        let mut ball = rolling(0.5 - params.ball_radius, 1.0, &params);
        let collision = ball.collide_cushion(&rail(), &params).unwrap();

        assert_relative_eq!(ball.get_velocity().x, -params.restitution_cushion, epsilon = 1e-12);
        assert_relative_eq!(ball.get_position().x, 0.5 - params.ball_radius, epsilon = 1e-12);
        assert!(matches!(collision, Collision::BallCushion { cushion: CushionId(7), .. }));
        // Rolls away from the rail
        assert_relative_eq!(ball.contact_velocity(&params), Vector3::ZERO, epsilon = 1e-9);
    }

    #[test]
    fn sidespin_throws_the_ball_along_the_rail() {
        let params = PhysicsParams::default();
        let mut ball = rolling(0.5 - params.ball_radius, 1.0, &params);
        ball.set_angular_velocity(ball.get_angular_velocity() + Vector3::new(0.0, 0.0, 20.0));
        ball.collide_cushion(&rail(), &params).unwrap();

        // n = -x, so ẑ × n = -y
        let expected = -20.0 * params.ball_radius * params.friction_cushion;
        assert_relative_eq!(ball.get_velocity().y, expected, epsilon = 1e-12);
        assert_relative_eq!(ball.get_angular_velocity().z, 20.0 * params.cushion_spin_damping, epsilon = 1e-12);
    }

    #[test]
    fn ball_moving_away_from_a_cushion_is_ignored() {
        let params = PhysicsParams::default();
        let mut ball = rolling(0.5 - params.ball_radius * 0.5, -1.0, &params);
        assert!(ball.collide_cushion(&rail(), &params).is_none());
        assert_relative_eq!(ball.get_velocity().x, -1.0);
    }

    #[test]
    fn pocket_registers_its_captured_ball() {
        let params = PhysicsParams::default();
        let mut pocket = Pocket::new(PocketId(2), 0.0, 0.0, 0.06, 0.1).unwrap();
        let mut ball = Ball::with_params(BallId(5), 0.01, 0.0, &params);

        let collision = ball.collide_pocket(&mut pocket, &params).unwrap();
        assert!(collision.involves(BallId(5)));
        assert_eq!(ball.get_state(), BallState::Pocketed);
        assert_eq!(ball.get_pocket(), Some(PocketId(2)));
        assert_eq!(pocket.get_balls(), &[BallId(5)]);
        assert!(ball.collide_pocket(&mut pocket, &params).is_none());
    }
}
