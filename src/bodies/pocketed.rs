//! Motion of a ball that has dropped into a pocket.
//!
//! This is a lossy settling model rather than an exact funnel: the ball is
//! steered toward the pocket axis, loses most of its speed on every wall or
//! floor contact and comes to rest quickly.

use crate::bodies::Ball;
use crate::core::PhysicsParams;
use crate::math::{EPSILON, TABLE_NORMAL};
use crate::shapes::Pocket;

impl Ball {
    pub(crate) fn evolve_pocketed(&mut self, dt: f64, params: &PhysicsParams, pocket: &Pocket) {
        let gravity = TABLE_NORMAL * -params.gravity;
        let floor = pocket.floor();
        let offset = pocket.offset_xy(self.position);

        // A pocket narrower than the ball's diameter has no funnel at its axis
        let near_wall = offset.length() > EPSILON && offset.length() > pocket.get_radius() - 2.0 * self.radius;
        let acceleration = if near_wall && self.position.z > floor {
            // Roll down the funnel wall toward the axis
            let wall_normal = (-offset.normalize() + TABLE_NORMAL).normalize();
            gravity - wall_normal * gravity.dot(&wall_normal)
        } else {
            self.angular_velocity *= 0.5;
            gravity
        };

        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
        self.orientation = self.orientation.integrate(self.angular_velocity, dt);

        let offset = pocket.offset_xy(self.position);
        let wall = pocket.get_radius() - self.radius;
        let outward = offset.normalize();
        if offset.length() > wall && self.velocity.dot(&outward) > 0.0 {
            let horizontal = self.velocity.horizontal();
            let reflected = (horizontal - outward * (2.0 * horizontal.dot(&outward))) * params.pocket_wall_damping;
            self.velocity.x = reflected.x;
            self.velocity.y = reflected.y;

            let inside = pocket.get_position() + outward * wall;
            self.position.x = inside.x;
            self.position.y = inside.y;
        }

        if self.position.z < floor {
            self.position.z = floor;
            if self.velocity.z < 0.0 {
                self.velocity.z = -self.velocity.z * params.restitution_pocket;
                if self.velocity.z < params.min_bounce_speed {
                    self.velocity.z = 0.0;
                }
            }
            self.velocity *= 0.5;
        }

        self.velocity = self.velocity.minimize(params.epsilon);
        self.angular_velocity = self.angular_velocity.minimize(params.epsilon);
    }
}
