use crate::core::{BallId, PocketId};
use crate::error::PhysicsError;
use crate::math::Vector3;
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Transport form of a pocket
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct PocketData {
    pub id: PocketId,
    pub position: Vector3,
    pub radius: f64,
    pub depth: f64,
    pub balls: Vec<BallId>,
}

/// A vertical capture cylinder sunk into the table.
///
/// The centre sits half the capture depth below the slate; the floor is at
/// `-depth`. The pocket owns the list of balls resting in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Pocket {
    id: PocketId,
    position: Vector3,
    radius: f64,
    depth: f64,
    balls: Vec<BallId>,
}

impl Pocket {
    /// Creates a pocket whose mouth is centred on `(x, y)` at table level
    pub fn new(id: PocketId, x: f64, y: f64, radius: f64, depth: f64) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!("{} radius must be positive", id)));
        }
        if !(depth.is_finite() && depth > 0.0) {
            return Err(PhysicsError::InvalidParameter(format!("{} depth must be positive", id)));
        }

        Ok(Self {
            id,
            position: Vector3::new(x, y, -depth / 2.0),
            radius,
            depth,
            balls: Vec::new(),
        })
    }

    pub fn from_data(data: &PocketData) -> Result<Self> {
        let mut pocket = Self::new(data.id, data.position.x, data.position.y, data.radius, data.depth)?;
        pocket.position = data.position;
        pocket.balls = data.balls.clone();
        Ok(pocket)
    }

    pub fn get_id(&self) -> PocketId {
        self.id
    }

    pub fn get_position(&self) -> Vector3 {
        self.position
    }

    pub fn get_radius(&self) -> f64 {
        self.radius
    }

    pub fn get_depth(&self) -> f64 {
        self.depth
    }

    /// Height of the pocket floor
    pub fn floor(&self) -> f64 {
        -self.depth
    }

    /// Balls currently resting in the pocket
    pub fn get_balls(&self) -> &[BallId] {
        &self.balls
    }

    pub fn contains(&self, ball: BallId) -> bool {
        self.balls.contains(&ball)
    }

    /// Horizontal offset from the pocket axis to `point`
    pub fn offset_xy(&self, point: Vector3) -> Vector3 {
        (point - self.position).horizontal()
    }

    pub fn distance_xy(&self, point: Vector3) -> f64 {
        self.offset_xy(point).length()
    }

    pub(crate) fn add_ball(&mut self, ball: BallId) {
        if !self.contains(ball) {
            self.balls.push(ball);
        }
    }

    pub(crate) fn remove_ball(&mut self, ball: BallId) -> bool {
        let before = self.balls.len();
        self.balls.retain(|&b| b != ball);
        self.balls.len() != before
    }

    pub(crate) fn clear(&mut self) {
        self.balls.clear();
    }

    pub fn serialize(&self) -> PocketData {
        PocketData {
            id: self.id,
            position: self.position,
            radius: self.radius,
            depth: self.depth,
            balls: self.balls.clone(),
        }
    }

    pub fn sync(&mut self, data: &PocketData) -> Result<()> {
        *self = Self::from_data(data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_is_recessed_by_half_the_depth() {
        let pocket = Pocket::new(PocketId(0), 1.0, 0.5, 0.06, 0.1).unwrap();
        assert_eq!(pocket.get_position(), Vector3::new(1.0, 0.5, -0.05));
        assert_eq!(pocket.floor(), -0.1);
    }

    #[test]
    fn membership_has_no_duplicates() {
        let mut pocket = Pocket::new(PocketId(0), 0.0, 0.0, 0.06, 0.1).unwrap();
        pocket.add_ball(BallId(3));
        pocket.add_ball(BallId(3));
        assert_eq!(pocket.get_balls(), &[BallId(3)]);
        assert!(pocket.remove_ball(BallId(3)));
        assert!(!pocket.remove_ball(BallId(3)));
    }

    #[test]
    fn invalid_dimensions_are_rejected() {
        assert!(Pocket::new(PocketId(0), 0.0, 0.0, 0.0, 0.1).is_err());
        assert!(Pocket::new(PocketId(0), 0.0, 0.0, 0.06, -1.0).is_err());
    }
}
