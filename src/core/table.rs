use log::{debug, warn};

use crate::bodies::{Ball, BallData, BallState, Shot};
use crate::core::{BallId, Collision, CushionId, PhysicsParams, PocketId};
use crate::error::PhysicsError;
use crate::shapes::{Cushion, CushionData, Pocket, PocketData};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Transport form of a whole table
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct TableData {
    pub time: f64,
    pub balls: Vec<BallData>,
    pub cushions: Vec<CushionData>,
    pub pockets: Vec<PocketData>,
}

/// One table: its balls, cushions, pockets and its own copy of the parameters
#[derive(Debug, Clone)]
pub struct Table {
    /// Physical constants for this table
    params: PhysicsParams,

    /// All balls, including pocketed and out-of-play ones
    balls: Vec<Ball>,

    /// Rail segments
    cushions: Vec<Cushion>,

    /// Pockets, each owning the list of balls inside it
    pockets: Vec<Pocket>,

    /// The total elapsed simulation time
    time: f64,
}

impl Table {
    /// Creates an empty table after validating the parameters
    pub fn new(params: PhysicsParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            balls: Vec::new(),
            cushions: Vec::new(),
            pockets: Vec::new(),
            time: 0.0,
        })
    }

    /// Rebuilds a table from transported data
    pub fn from_data(params: PhysicsParams, data: &TableData) -> Result<Self> {
        let mut table = Self::new(params)?;
        table.sync(data)?;
        Ok(table)
    }

    /// Returns the current simulation time
    pub fn get_time(&self) -> f64 {
        self.time
    }

    /// Returns a reference to the table's parameters
    pub fn get_params(&self) -> &PhysicsParams {
        &self.params
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn cushions(&self) -> &[Cushion] {
        &self.cushions
    }

    pub fn pockets(&self) -> &[Pocket] {
        &self.pockets
    }

    /// Adds a ball; ids must be unique on the table
    pub fn add_ball(&mut self, ball: Ball) -> Result<BallId> {
        let id = ball.get_id();
        if self.balls.iter().any(|b| b.get_id() == id) {
            return Err(PhysicsError::InvalidParameter(format!("{} already on the table", id)));
        }
        if let Some(pocket) = ball.get_pocket() {
            self.get_pocket_mut(pocket)?.add_ball(id);
        }
        self.balls.push(ball);
        Ok(id)
    }

    /// Adds a cushion; ids must be unique on the table
    pub fn add_cushion(&mut self, cushion: Cushion) -> Result<CushionId> {
        let id = cushion.get_id();
        if self.cushions.iter().any(|c| c.get_id() == id) {
            return Err(PhysicsError::InvalidParameter(format!("{} already on the table", id)));
        }
        self.cushions.push(cushion);
        Ok(id)
    }

    /// Adds a pocket; ids must be unique on the table
    pub fn add_pocket(&mut self, pocket: Pocket) -> Result<PocketId> {
        let id = pocket.get_id();
        if self.pockets.iter().any(|p| p.get_id() == id) {
            return Err(PhysicsError::InvalidParameter(format!("{} already on the table", id)));
        }
        self.pockets.push(pocket);
        Ok(id)
    }

    /// Gets a reference to a ball by its id
    pub fn get_ball(&self, id: BallId) -> Result<&Ball> {
        self.balls
            .iter()
            .find(|b| b.get_id() == id)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{} not found", id)))
    }

    /// Gets a mutable reference to a ball by its id
    pub fn get_ball_mut(&mut self, id: BallId) -> Result<&mut Ball> {
        self.balls
            .iter_mut()
            .find(|b| b.get_id() == id)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{} not found", id)))
    }

    pub fn get_cushion(&self, id: CushionId) -> Result<&Cushion> {
        self.cushions
            .iter()
            .find(|c| c.get_id() == id)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{} not found", id)))
    }

    pub fn get_pocket(&self, id: PocketId) -> Result<&Pocket> {
        self.pockets
            .iter()
            .find(|p| p.get_id() == id)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{} not found", id)))
    }

    fn get_pocket_mut(&mut self, id: PocketId) -> Result<&mut Pocket> {
        self.pockets
            .iter_mut()
            .find(|p| p.get_id() == id)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{} not found", id)))
    }

    /// Strikes a ball with the cue
    pub fn strike(&mut self, id: BallId, shot: &Shot) -> Result<()> {
        let ball = self
            .balls
            .iter_mut()
            .find(|b| b.get_id() == id)
            .ok_or_else(|| PhysicsError::ResourceNotFound(format!("{} not found", id)))?;
        ball.hit(shot, &self.params);
        Ok(())
    }

    /// Puts a ball in hand at `(x, y)`, taking it out of its pocket if needed
    pub fn place_ball(&mut self, id: BallId, x: f64, y: f64) -> Result<()> {
        let previous = self.get_ball_mut(id)?.place(x, y);
        if let Some(pocket) = previous {
            self.get_pocket_mut(pocket)?.remove_ball(id);
        }
        Ok(())
    }

    /// Takes a ball out of the game, dropping it from its pocket if needed
    pub fn remove_ball_from_play(&mut self, id: BallId) -> Result<()> {
        let previous = self.get_ball_mut(id)?.remove_from_play();
        if let Some(pocket) = previous {
            self.get_pocket_mut(pocket)?.remove_ball(id);
        }
        Ok(())
    }

    /// Whether no ball on the playing surface is moving
    pub fn is_at_rest(&self) -> bool {
        self.balls.iter().all(|b| !b.get_state().is_in_play() || b.get_state() == BallState::Stationary)
    }

    /// Removes every ball and empties the pockets
    pub fn reset(&mut self) {
        self.balls.clear();
        for pocket in &mut self.pockets {
            pocket.clear();
        }
        self.time = 0.0;
    }

    /// Runs the simulation for `dt` seconds and returns the collisions resolved.
    ///
    /// The step is split at every time of impact: all balls advance to the
    /// earliest one, every touching pair is resolved, and the search repeats
    /// on the remaining time. After `max_collisions_per_step` impacts the rest
    /// of the step is integrated without further splitting.
    pub fn step(&mut self, dt: f64) -> Vec<Collision> {
        let mut collisions = Vec::new();
        if dt <= 0.0 {
            return collisions;
        }

        self.resolve_contacts(&mut collisions);

        let mut remaining = dt;
        let mut impacts = 0;
        while remaining > 0.0 {
            let impact = self.earliest_impact(remaining);
            if impact >= remaining {
                self.advance(remaining);
                self.resolve_contacts(&mut collisions);
                break;
            }

            self.advance(impact);
            remaining -= impact;
            self.resolve_contacts(&mut collisions);

            impacts += 1;
            if impacts >= self.params.max_collisions_per_step {
                warn!(
                    "collision budget of {} exhausted with {:.6}s left in the step",
                    self.params.max_collisions_per_step, remaining
                );
                self.advance(remaining);
                self.resolve_contacts(&mut collisions);
                break;
            }
        }

        self.time += dt;
        collisions
    }

    /// Earliest time of impact among all ball pairs and ball/cushion pairs
    fn earliest_impact(&self, dt: f64) -> f64 {
        let mut earliest = f64::INFINITY;
        for (i, ball) in self.balls.iter().enumerate() {
            for other in &self.balls[i + 1..] {
                earliest = earliest.min(ball.collision_time(other, dt, &self.params));
            }
            for cushion in &self.cushions {
                earliest = earliest.min(ball.cushion_collision_time(cushion, dt, &self.params));
            }
        }
        earliest
    }

    /// Evolves every ball by `dt`
    fn advance(&mut self, dt: f64) {
        for ball in &mut self.balls {
            let before = ball.get_state();
            ball.evolve(dt, &self.params, &self.pockets);
            if ball.get_state() != before {
                debug!("{} {} -> {}", ball.get_id(), before, ball.get_state());
            }
        }
    }

    /// Resolves every contact present right now
    fn resolve_contacts(&mut self, collisions: &mut Vec<Collision>) {
        for j in 1..self.balls.len() {
            let (head, tail) = self.balls.split_at_mut(j);
            let second = &mut tail[0];
            for first in head.iter_mut() {
                collisions.extend(first.collide_ball(second, &self.params));
            }
        }

        for ball in &mut self.balls {
            for cushion in &self.cushions {
                collisions.extend(ball.collide_cushion(cushion, &self.params));
            }
            for pocket in &mut self.pockets {
                collisions.extend(ball.collide_pocket(pocket, &self.params));
            }
        }
    }

    /// Produces the transport form of the whole table
    pub fn serialize(&self) -> TableData {
        TableData {
            time: self.time,
            balls: self.balls.iter().map(Ball::serialize).collect(),
            cushions: self.cushions.iter().map(Cushion::serialize).collect(),
            pockets: self.pockets.iter().map(Pocket::serialize).collect(),
        }
    }

    /// Replaces the table's contents with transported data.
    ///
    /// Pockets are rebuilt first so ball pocket ids can be resolved.
    pub fn sync(&mut self, data: &TableData) -> Result<()> {
        let cushions = data
            .cushions
            .iter()
            .map(Cushion::from_data)
            .collect::<Result<Vec<_>>>()?;
        let pockets = data
            .pockets
            .iter()
            .map(Pocket::from_data)
            .collect::<Result<Vec<_>>>()?;
        let balls = data
            .balls
            .iter()
            .map(|b| Ball::from_data(b, &pockets))
            .collect::<Result<Vec<_>>>()?;

        self.cushions = cushions;
        self.pockets = pockets;
        self.balls = balls;
        self.time = data.time;
        Ok(())
    }
}
